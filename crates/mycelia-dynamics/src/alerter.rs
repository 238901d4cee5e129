//! Bulwark promotion and reversion driven by the local alert signal.

use mycelia_topology::{NodeId, Role};
use tracing::{debug, trace};

use crate::Engine;

impl Engine {
    /// One step of the bulwark controller, followed by metabolism.
    ///
    /// A pending switch counts attempts across cycles and goes through only
    /// when the inhibition policy allows it. Promotion severs every link
    /// and notifies the former neighbors as if the node had failed in its
    /// pre-promotion role.
    pub(crate) fn bulwark_control(&mut self, node: NodeId) {
        let role = self.mesh.role(node);
        let concentration = self.mesh.concentration(node);
        let alerting = self
            .policies
            .alerting
            .is_alerting(concentration, self.mesh.profile(node));

        match (alerting, role == Role::Bulwark) {
            (true, false) => {
                let attempts = self.bump_attempts(node);
                if self.policies.inhibition.allow(self.mesh.profile(node), role, attempts) {
                    self.promote(node, role);
                }
            }
            (false, true) => {
                let attempts = self.bump_attempts(node);
                if self.policies.inhibition.allow(self.mesh.profile(node), role, attempts) {
                    self.revert(node);
                }
            }
            _ => self.mesh.control_mut(node).switch_attempts = 0,
        }

        let rate = self.policies.metabolism.rate(self.mesh.role(node));
        self.mesh.metabolize_signal(node, rate, &self.config.signal);
    }

    fn bump_attempts(&mut self, node: NodeId) -> u32 {
        let control = self.mesh.control_mut(node);
        control.switch_attempts += 1;
        control.switch_attempts
    }

    fn promote(&mut self, node: NodeId, prior: Role) {
        let degree = self.mesh.degree(node);
        debug!("{} ({}, degree {}) becomes bulwark", node, prior, degree);
        let former = self.mesh.sever_all(node);
        let control = self.mesh.control_mut(node);
        control.prior_role = Some(prior);
        control.switch_attempts = 0;
        self.mesh.become_role(node, Role::Bulwark);
        for n in former {
            self.neighbor_lost(n, prior, degree);
        }
    }

    fn revert(&mut self, node: NodeId) {
        let control = self.mesh.control_mut(node);
        let back = control.prior_role.take().unwrap_or(Role::Biomass);
        control.switch_attempts = 0;
        debug!("{} reverts from bulwark to {}", node, back);
        self.mesh.become_role(node, back);
        if self.config.clear_on_revert {
            self.mesh.wipe_signal(node);
        }
    }

    /// `observer` lost a neighbor that held `failed_role` with
    /// `failed_degree` links.
    pub(crate) fn neighbor_lost(&mut self, observer: NodeId, failed_role: Role, failed_degree: usize) {
        if !self.mesh.is_up(observer) {
            return;
        }
        let score = self.policies.failure.score(
            self.mesh.role(observer),
            self.mesh.degree(observer),
            failed_role,
            failed_degree,
        );
        if score > 0.0 {
            trace!("{} alerted by loss of a {} neighbor: {:.2}", observer, failed_role, score);
            self.mesh.inject_signal(observer, score, &self.config.signal);
        }
        if self.mesh.is_disconnected(observer) {
            let profile = self.mesh.profile_mut(observer);
            profile.disconnect_detected = true;
            profile.failure_detected = true;
        }
    }
}
