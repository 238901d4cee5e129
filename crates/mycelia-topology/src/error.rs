//! Error types for link mutation and structural checks.

use thiserror::Error;

use crate::{NodeId, Role};

/// Result type for link primitives.
pub type Result<T> = std::result::Result<T, LinkError>;

/// A link primitive refused to act. The mesh is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("{0} cannot link to itself")]
    SelfLink(NodeId),

    #[error("{owner} tried to transfer {neighbor} to itself")]
    SelfTransfer { owner: NodeId, neighbor: NodeId },

    #[error("{a} and {b} are already linked")]
    AlreadyLinked { a: NodeId, b: NodeId },

    #[error("{a} and {b} are not linked")]
    NotLinked { a: NodeId, b: NodeId },

    #[error("{owner} tried to absorb biomass node {target}")]
    AbsorbBiomass { owner: NodeId, target: NodeId },

    #[error("{0} is down")]
    NodeDown(NodeId),

    #[error("{node} is at capacity ({degree}/{capacity} links)")]
    AtCapacity {
        node: NodeId,
        degree: usize,
        capacity: usize,
    },
}

/// A broken structural invariant found by [`crate::Mesh::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{a} links to {b} but {b} does not link back")]
    AsymmetricLink { a: NodeId, b: NodeId },

    #[error("{0} links to itself")]
    SelfLoop(NodeId),

    #[error("{node} lists {neighbor} more than once")]
    DuplicateLink { node: NodeId, neighbor: NodeId },

    #[error("directory records {node} as {recorded:?} but its role is {actual}")]
    DirectoryMismatch {
        node: NodeId,
        recorded: Option<Role>,
        actual: Role,
    },

    #[error("{node} is linked to dead node {dead}")]
    DeadLinked { node: NodeId, dead: NodeId },
}
