//! Dwell-time bookkeeping for the adaptive reversion delay.

use mycelia_topology::{NodeId, Role};
use tracing::trace;

use crate::Engine;

impl Engine {
    /// Count cycles since the last bulwark transition and let the
    /// adaptation policy retune the node's reversion delay whenever it
    /// enters or leaves `Bulwark`.
    pub(crate) fn track_reversion(&mut self, node: NodeId) {
        let role = self.mesh.role(node);
        let control = self.mesh.control_mut(node);
        control.elapsed += 1;
        let last = control.last_role.replace(role).unwrap_or(Role::Biomass);
        if role == last {
            return;
        }

        let (entering, elapsed) = if role == Role::Bulwark {
            (true, control.elapsed)
        } else if last == Role::Bulwark {
            (false, 0)
        } else {
            return;
        };
        control.elapsed = 0;

        let profile = self.mesh.profile_mut(node);
        let old = profile.reversion_delay;
        profile.reversion_delay = self
            .policies
            .adaptation
            .adapt(old, elapsed, entering, &mut self.rng)
            .max(0.0);
        if entering {
            profile.bulwark_entries += 1;
        }
        trace!(
            "{} {} bulwark, reversion delay {:.2} -> {:.2}",
            node,
            if entering { "entered" } else { "left" },
            old,
            profile.reversion_delay
        );
    }
}
