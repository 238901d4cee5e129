//! When a node considers itself under alert.

use mycelia_topology::NodeProfile;

pub trait AlertingPredicate: Send + Sync {
    fn is_alerting(&self, concentration: f64, profile: &NodeProfile) -> bool;
}

/// Alerting at or above a fixed concentration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdAlerting {
    pub threshold: f64,
}

impl Default for ThresholdAlerting {
    fn default() -> Self {
        Self { threshold: 5.0 }
    }
}

impl AlertingPredicate for ThresholdAlerting {
    fn is_alerting(&self, concentration: f64, _profile: &NodeProfile) -> bool {
        concentration >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        let t = ThresholdAlerting { threshold: 2.0 };
        let p = NodeProfile::default();
        assert!(t.is_alerting(2.0, &p));
        assert!(!t.is_alerting(1.99, &p));
    }
}
