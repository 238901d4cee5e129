//! Mycelia Mesh Topology
//!
//! Data model of a self-organising overlay in which nodes of bounded
//! capacity arrange themselves into leaf ("biomass") and branch ("hyphal")
//! roles, and protect the structure after failures by adopting a temporary
//! "bulwark" role under a diffusing alert signal.
//!
//! # Contents
//!
//! - [`Mesh`]: node arena with every bidirectional link primitive
//!   (add, remove, transfer, absorb, swap, grow) and role-filtered views
//! - [`Directory`]: per-role membership sets with uniform sampling
//! - [`AlertSignal`]: per-node concentration with diffusion and decay
//! - [`MeshEvent`]: journal of role and link changes
//!
//! # Invariants
//!
//! After every public mutation: links are symmetric, no node links to
//! itself or lists a neighbor twice, no live node links to a dead one, and
//! the directory records every live node under exactly its current role.
//! [`Mesh::check_invariants`] verifies all of these.

mod directory;
mod error;
mod events;
mod invariants;
mod links;
mod mesh;
mod profile;
mod role;
mod signal;
mod views;

pub use directory::{Directory, HYPHAL, NON_BIOMASS};
pub use error::{InvariantViolation, LinkError, Result};
pub use events::MeshEvent;
pub use links::LinkSet;
pub use mesh::{ControlState, FailureNotice, Mesh, Node, NodeId};
pub use profile::{NodeProfile, ProfileConfig};
pub use role::Role;
pub use signal::{AlertSignal, DiffusionMode, SignalParams};

/// Fraction of its capacity an `Extending` node may fill before foragers
/// stop attaching to it.
pub const FORAGING_MULTIPLIER: f64 = 1.0;

/// Slack over capacity tolerated when any hypha accepts a new attachment.
pub const ATTACHABLE_MULTIPLIER: f64 = 1.05;
