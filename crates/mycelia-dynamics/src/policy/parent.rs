//! Adaptive parent target.
//!
//! The parent target is the number of stable attachments a node tries to
//! hold. It rises by one when a disconnect is detected, either directly
//! (a neighbor failure left the node without links) or through a
//! reconnecting neighbor announcing a larger target, and decays back
//! towards 1 when nothing has gone wrong lately.

use mycelia_topology::NodeProfile;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

/// Runs once per node per cycle, after every other step of the turn.
pub trait ParentTargetStrategy: Send + Sync {
    fn adapt(&self, profile: &mut NodeProfile, rng: &mut StdRng);
}

/// Raise on a fresh failure or a larger announced disconnect. Consumes the
/// failure flag and forgets an announcement once the target has caught up.
fn raise(profile: &mut NodeProfile) -> bool {
    let fresh_failure = std::mem::take(&mut profile.failure_detected);
    let raised = fresh_failure || profile.known_disconnect > profile.parent_target();
    if raised {
        let old = profile.parent_target();
        profile.set_parent_target(old + 1.0);
        trace!("parent target raised {:.2} -> {:.2}", old, profile.parent_target());
    }
    if profile.known_disconnect > 0.0 && profile.parent_target() >= profile.known_disconnect {
        profile.clear_known_disconnect();
    }
    raised
}

fn decay(profile: &mut NodeProfile) {
    let old = profile.parent_target();
    profile.set_parent_target((old - 1.0).max(1.0));
    trace!("parent target decayed {:.2} -> {:.2}", old, profile.parent_target());
}

/// Keeps the target where it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedParentTarget;

impl ParentTargetStrategy for FixedParentTarget {
    fn adapt(&self, profile: &mut NodeProfile, _rng: &mut StdRng) {
        profile.failure_detected = false;
    }
}

/// Decays by one with a fixed probability whenever the announced
/// disconnect magnitude is below the target.
#[derive(Debug, Clone, Copy)]
pub struct KnownFailureParentTarget {
    pub decay_prob: f64,
}

impl Default for KnownFailureParentTarget {
    fn default() -> Self {
        Self { decay_prob: 0.15 }
    }
}

impl ParentTargetStrategy for KnownFailureParentTarget {
    fn adapt(&self, profile: &mut NodeProfile, rng: &mut StdRng) {
        if raise(profile) {
            return;
        }
        if profile.known_disconnect < profile.parent_target()
            && profile.parent_target() > 1.0
            && rng.gen::<f64>() < self.decay_prob
        {
            decay(profile);
        }
    }
}

/// Decays with a probability that grows with the target itself, so large
/// redundancy is shed faster.
#[derive(Debug, Clone, Copy)]
pub struct TotalFailureParentTarget {
    pub stretch: f64,
    pub shift: f64,
}

impl Default for TotalFailureParentTarget {
    fn default() -> Self {
        Self {
            stretch: 2.5,
            shift: -3.0,
        }
    }
}

impl TotalFailureParentTarget {
    /// `1 / (1 + e^-(target / stretch + shift))`
    pub fn decay_probability(&self, target: f64) -> f64 {
        1.0 / (1.0 + (-(target / self.stretch + self.shift)).exp())
    }
}

impl ParentTargetStrategy for TotalFailureParentTarget {
    fn adapt(&self, profile: &mut NodeProfile, rng: &mut StdRng) {
        if raise(profile) {
            return;
        }
        let target = profile.parent_target();
        if profile.known_disconnect < target - 1.0 && rng.gen::<f64>() < self.decay_probability(target) {
            decay(profile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn failure_raises_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = NodeProfile::default();
        p.failure_detected = true;
        let s = KnownFailureParentTarget { decay_prob: 0.0 };
        s.adapt(&mut p, &mut rng);
        assert_eq!(p.parent_target(), 2.0);
        assert!(!p.failure_detected);
        s.adapt(&mut p, &mut rng);
        assert_eq!(p.parent_target(), 2.0);
    }

    #[test]
    fn announcement_raises_until_reached() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = NodeProfile::default();
        p.record_known_disconnect(3.0);
        let s = KnownFailureParentTarget { decay_prob: 0.0 };
        s.adapt(&mut p, &mut rng);
        assert_eq!(p.parent_target(), 2.0);
        s.adapt(&mut p, &mut rng);
        assert_eq!(p.parent_target(), 3.0);
        assert_eq!(p.known_disconnect, 0.0);
    }

    #[test]
    fn certain_decay_stops_at_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = NodeProfile::default();
        p.set_parent_target(2.0);
        let s = KnownFailureParentTarget { decay_prob: 1.0 };
        s.adapt(&mut p, &mut rng);
        assert_eq!(p.parent_target(), 1.0);
        s.adapt(&mut p, &mut rng);
        assert_eq!(p.parent_target(), 1.0);
    }

    #[test]
    fn sigmoid_grows_with_target() {
        let s = TotalFailureParentTarget::default();
        let low = s.decay_probability(1.0);
        let high = s.decay_probability(10.0);
        assert!(low < 0.1);
        assert!(high > 0.7);
        assert!((s.decay_probability(7.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn fixed_only_consumes_flag() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = NodeProfile::default();
        p.failure_detected = true;
        FixedParentTarget.adapt(&mut p, &mut rng);
        assert_eq!(p.parent_target(), 1.0);
        assert!(!p.failure_detected);
    }
}
