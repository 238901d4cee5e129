//! Per-node neighbor collection.

use crate::NodeId;

/// A node's neighbors in insertion order.
///
/// Only [`crate::Mesh`] mutates a link set, always on both endpoints at
/// once, so holders of a `&LinkSet` see a symmetric snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkSet {
    members: Vec<NodeId>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.members
    }

    /// Oldest surviving link.
    pub fn first(&self) -> Option<NodeId> {
        self.members.first().copied()
    }

    pub fn to_vec(&self) -> Vec<NodeId> {
        self.members.clone()
    }

    /// Insert one side of a link. Returns false if already present.
    pub(crate) fn insert(&mut self, id: NodeId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.members.push(id);
        true
    }

    /// Remove one side of a link, preserving the order of the rest.
    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        match self.members.iter().position(|&m| m == id) {
            Some(pos) => {
                self.members.remove(pos);
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
