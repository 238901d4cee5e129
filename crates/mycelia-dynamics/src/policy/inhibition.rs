//! Hysteresis on bulwark promotion and reversion.

use mycelia_topology::{NodeProfile, Role};

/// Decides whether a pending role switch may happen now.
///
/// `role` is the node's current role: anything but `Bulwark` means a
/// promotion is pending, `Bulwark` means a reversion is pending. `attempts`
/// counts consecutive cycles the switch has been requested, this one
/// included.
pub trait InhibitionStrategy: Send + Sync {
    fn allow(&self, profile: &NodeProfile, role: Role, attempts: u32) -> bool;
}

/// Every switch goes through on the first request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateInhibition;

impl InhibitionStrategy for ImmediateInhibition {
    fn allow(&self, _profile: &NodeProfile, _role: Role, _attempts: u32) -> bool {
        true
    }
}

/// Fixed delays: a switch is allowed once attempts exceed the delay for its
/// direction.
#[derive(Debug, Clone, Copy)]
pub struct DelayInhibition {
    pub bulwark_delay: u32,
    pub revert_delay: u32,
}

impl InhibitionStrategy for DelayInhibition {
    fn allow(&self, _profile: &NodeProfile, role: Role, attempts: u32) -> bool {
        if role == Role::Bulwark {
            attempts > self.revert_delay
        } else {
            attempts > self.bulwark_delay
        }
    }
}

/// Fixed promotion delay; reversion waits for the node's adaptive
/// `reversion_delay`.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveInhibition {
    pub bulwark_delay: u32,
}

impl InhibitionStrategy for AdaptiveInhibition {
    fn allow(&self, profile: &NodeProfile, role: Role, attempts: u32) -> bool {
        if role == Role::Bulwark {
            f64::from(attempts) > profile.reversion_delay
        } else {
            attempts > self.bulwark_delay
        }
    }
}
