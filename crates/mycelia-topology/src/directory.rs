//! Per-role membership index.
//!
//! The directory partitions every live node by role and supports uniform
//! random sampling. It stands in for a gossip-based random peer service:
//! a disconnected node asks it for something to attach to.
//!
//! # Consistency
//!
//! [`crate::Mesh::become_role`] keeps the directory in step with node
//! profiles. [`Directory::verify`] re-registers a node whose recorded
//! membership has drifted and reports that it did so; a desync is repaired,
//! never surfaced as an error.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::debug;

use crate::{NodeId, Role};

const SLOTS: usize = Role::LIVE.len();

/// Roles sampled when looking for a hypha to bootstrap from.
pub const NON_BIOMASS: [Role; 4] = [Role::Extending, Role::Branching, Role::Immobile, Role::Bulwark];

/// Roles that other nodes attach to.
pub const HYPHAL: [Role; 3] = [Role::Extending, Role::Branching, Role::Immobile];

/// Five disjoint role sets over the live nodes.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    sets: [BTreeSet<NodeId>; SLOTS],
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `node` under `role`, removing it from every other set.
    /// Registering as `Dead` unregisters.
    pub fn register(&mut self, node: NodeId, role: Role) {
        let Some(slot) = role.slot() else {
            self.unregister(node);
            return;
        };
        for (i, set) in self.sets.iter_mut().enumerate() {
            if i == slot {
                set.insert(node);
            } else {
                set.remove(&node);
            }
        }
    }

    /// Remove `node` from every set. Returns true if it was present.
    pub fn unregister(&mut self, node: NodeId) -> bool {
        let mut found = false;
        for set in self.sets.iter_mut() {
            found |= set.remove(&node);
        }
        found
    }

    /// Role `node` is recorded under, if any.
    pub fn role_of(&self, node: NodeId) -> Option<Role> {
        Role::LIVE
            .iter()
            .zip(self.sets.iter())
            .find(|(_, set)| set.contains(&node))
            .map(|(role, _)| *role)
    }

    /// Repair the membership of `node` if it is not recorded exactly under
    /// `expected`. Returns true if a repair was needed.
    pub fn verify(&mut self, node: NodeId, expected: Role) -> bool {
        let consistent = match expected.slot() {
            Some(slot) => self
                .sets
                .iter()
                .enumerate()
                .all(|(i, set)| set.contains(&node) == (i == slot)),
            None => self.role_of(node).is_none(),
        };
        if consistent {
            return false;
        }
        debug!("{} not properly registered as {}, repairing", node, expected);
        self.register(node, expected);
        true
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.role_of(node).is_some()
    }

    /// Members of one role in id order.
    pub fn members(&self, role: Role) -> impl Iterator<Item = NodeId> + '_ {
        role.slot()
            .map(|slot| self.sets[slot].iter().copied())
            .into_iter()
            .flatten()
    }

    pub fn count(&self, role: Role) -> usize {
        role.slot().map_or(0, |slot| self.sets[slot].len())
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.sets.iter().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(BTreeSet::is_empty)
    }

    /// Uniformly random member of the union of `roles`, skipping `exclude`.
    pub fn pick_uniform<R: Rng + ?Sized>(
        &self,
        roles: &[Role],
        exclude: Option<NodeId>,
        rng: &mut R,
    ) -> Option<NodeId> {
        let candidates = || {
            roles
                .iter()
                .filter_map(|r| r.slot())
                .flat_map(|slot| self.sets[slot].iter().copied())
                .filter(move |&n| Some(n) != exclude)
        };
        let total = candidates().count();
        if total == 0 {
            return None;
        }
        candidates().nth(rng.gen_range(0..total))
    }

    /// Bootstrap target for a disconnected node: any non-biomass node,
    /// `Extending` and `Bulwark` included.
    pub fn stable_hypha<R: Rng + ?Sized>(&self, exclude: NodeId, rng: &mut R) -> Option<NodeId> {
        let picked = self.pick_uniform(&NON_BIOMASS, Some(exclude), rng);
        if picked.is_none() {
            debug!("no hypha available for {}", exclude);
        }
        picked
    }

    /// Any live node other than `exclude`.
    pub fn random_node<R: Rng + ?Sized>(&self, exclude: NodeId, rng: &mut R) -> Option<NodeId> {
        self.pick_uniform(&Role::LIVE, Some(exclude), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn register_moves_between_sets() {
        let mut dir = Directory::new();
        dir.register(NodeId(1), Role::Biomass);
        dir.register(NodeId(1), Role::Immobile);
        assert_eq!(dir.role_of(NodeId(1)), Some(Role::Immobile));
        assert_eq!(dir.count(Role::Biomass), 0);
        assert_eq!(dir.len(), 1);

        dir.register(NodeId(1), Role::Dead);
        assert!(dir.is_empty());
    }

    #[test]
    fn verify_repairs_drift() {
        let mut dir = Directory::new();
        dir.register(NodeId(2), Role::Extending);
        assert!(!dir.verify(NodeId(2), Role::Extending));
        assert!(dir.verify(NodeId(2), Role::Branching));
        assert_eq!(dir.role_of(NodeId(2)), Some(Role::Branching));
        assert!(dir.verify(NodeId(7), Role::Biomass));
        assert!(dir.contains(NodeId(7)));
    }

    #[test]
    fn stable_hypha_skips_biomass_and_self() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut dir = Directory::new();
        dir.register(NodeId(0), Role::Biomass);
        dir.register(NodeId(1), Role::Bulwark);
        assert_eq!(dir.stable_hypha(NodeId(1), &mut rng), None);

        dir.register(NodeId(2), Role::Extending);
        for _ in 0..20 {
            let picked = dir.stable_hypha(NodeId(0), &mut rng);
            assert!(matches!(picked, Some(NodeId(1)) | Some(NodeId(2))));
        }
    }

    #[test]
    fn pick_uniform_reaches_every_member() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut dir = Directory::new();
        for i in 0..5 {
            dir.register(NodeId(i), Role::Branching);
        }
        let mut seen = BTreeSet::new();
        for _ in 0..200 {
            if let Some(n) = dir.pick_uniform(&[Role::Branching], None, &mut rng) {
                seen.insert(n);
            }
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(dir.pick_uniform(&[Role::Immobile], None, &mut rng), None);
    }
}
