//! State a newly attached node inherits from the hypha it attached to.

use mycelia_topology::{NodeId, Role};
use tracing::debug;

use crate::Turn;

/// Runs once when `entering` has just attached to `connected`.
pub trait JoinStrategy: Send + Sync {
    fn join(&self, turn: &mut Turn<'_>, entering: NodeId, connected: NodeId);
}

/// Inherits nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveJoin;

impl JoinStrategy for PassiveJoin {
    fn join(&self, _turn: &mut Turn<'_>, _entering: NodeId, _connected: NodeId) {}
}

/// Joins an ongoing alert episode: becomes a bulwark if the connected node
/// is one, takes on its alert level and copies its parent target.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorBulwarkJoin;

impl JoinStrategy for MirrorBulwarkJoin {
    fn join(&self, turn: &mut Turn<'_>, entering: NodeId, connected: NodeId) {
        let mesh = &mut *turn.mesh;
        if mesh.role(connected) == Role::Bulwark && mesh.role(entering) != Role::Bulwark {
            debug!("{} mirrors bulwark {}", entering, connected);
            let prior = mesh.become_role(entering, Role::Bulwark);
            mesh.control_mut(entering).prior_role = Some(prior);
        }
        let level = mesh.concentration(connected);
        if level > 0.0 {
            mesh.inject_signal(entering, level, turn.signal);
        }
        let target = mesh.profile(connected).parent_target();
        mesh.profile_mut(entering).set_parent_target(target);
    }
}

/// A node that saw its links vanish tells the connected node how many
/// parents it wanted; otherwise it adopts the connected node's target.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitAlertJoin;

impl JoinStrategy for EmitAlertJoin {
    fn join(&self, turn: &mut Turn<'_>, entering: NodeId, connected: NodeId) {
        let mesh = &mut *turn.mesh;
        if mesh.profile(entering).disconnect_detected {
            let target = mesh.profile(entering).parent_target();
            debug!("{} announces reconnect with target {:.2} to {}", entering, target, connected);
            mesh.profile_mut(connected).record_known_disconnect(target);
            mesh.profile_mut(entering).disconnect_detected = false;
        } else {
            let target = mesh.profile(connected).parent_target();
            mesh.profile_mut(entering).set_parent_target(target);
        }
    }
}
