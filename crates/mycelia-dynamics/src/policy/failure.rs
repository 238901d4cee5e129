//! Severity of a lost neighbor, in units of alert signal.

use mycelia_topology::Role;

/// Scores the loss of a neighbor as seen by the observer. A positive score
/// is injected as alert signal at the observer.
pub trait FailureSeverity: Send + Sync {
    fn score(&self, observer: Role, observer_degree: usize, failed: Role, failed_degree: usize) -> f64;
}

/// Never alerts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFailure;

impl FailureSeverity for SilentFailure {
    fn score(&self, _observer: Role, _observer_degree: usize, _failed: Role, _failed_degree: usize) -> f64 {
        0.0
    }
}

/// Proportional to the failed node's degree. Biomass and bulwark losses
/// score zero.
#[derive(Debug, Clone, Copy)]
pub struct LinearFailure {
    pub scale: f64,
    /// Used instead of `scale` when the observer is itself a bulwark
    pub bulwark_scale: f64,
}

impl FailureSeverity for LinearFailure {
    fn score(&self, observer: Role, _observer_degree: usize, failed: Role, failed_degree: usize) -> f64 {
        if matches!(failed, Role::Biomass | Role::Bulwark) {
            return 0.0;
        }
        let scale = if observer == Role::Bulwark {
            self.bulwark_scale
        } else {
            self.scale
        };
        failed_degree as f64 * scale
    }
}
