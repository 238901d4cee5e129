//! Structural change journal.

use crate::{NodeId, Role};

/// A change to the mesh, in the order it happened.
///
/// The mesh appends to an internal journal; consumers take it with
/// [`crate::Mesh::drain_events`]. Nothing in the mesh waits on consumers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum MeshEvent {
    /// A node entered as biomass
    NodeJoined { node: NodeId, capacity: usize },

    /// A node failed while holding `role`
    NodeFailed { node: NodeId, role: Role, degree: usize },

    /// A node changed role
    RoleChanged { node: NodeId, role: Role, old: Role },

    /// A symmetric link was created
    LinkAdded { a: NodeId, b: NodeId },

    /// A symmetric link was removed
    LinkRemoved { a: NodeId, b: NodeId },
}

