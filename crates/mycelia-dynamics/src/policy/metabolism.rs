//! Background consumption of alert signal.

use mycelia_topology::Role;

/// Fraction of the local concentration consumed each cycle.
pub trait MetabolismStrategy: Send + Sync {
    fn rate(&self, role: Role) -> f64;
}

/// One rate for bulwarks, another for everyone else.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatMetabolism {
    pub normal_rate: f64,
    pub bulwark_rate: f64,
}

impl Default for FlatMetabolism {
    fn default() -> Self {
        Self {
            normal_rate: 0.05,
            bulwark_rate: 0.2,
        }
    }
}

impl MetabolismStrategy for FlatMetabolism {
    fn rate(&self, role: Role) -> f64 {
        if role == Role::Bulwark {
            self.bulwark_rate
        } else {
            self.normal_rate
        }
    }
}
