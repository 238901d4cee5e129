//! Engine configuration.
//!
//! Every tunable lives here, with the defaults the engine was calibrated
//! against. Strategy choices are enums so a whole run can be described by
//! one serialized document. [`EngineConfig::validate`] rejects meaningless
//! values before the first cycle; nothing is re-checked afterwards.

use mycelia_topology::{ProfileConfig, SignalParams};

use crate::error::{ConfigError, Result};
use crate::policy::{FlatMetabolism, ThresholdAlerting};

/// How biomass nodes look for parents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BiomassKind {
    /// One same-kind parent, found through foraging hyphae
    #[default]
    Foraging,
    /// Up to the parent target of hyphal parents, no biomass neighbors
    RedundantParents,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum InhibitionConfig {
    Immediate,
    Delay { bulwark_delay: u32, revert_delay: u32 },
    Adaptive { bulwark_delay: u32 },
}

impl Default for InhibitionConfig {
    fn default() -> Self {
        Self::Delay {
            bulwark_delay: 2,
            revert_delay: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum AdaptationConfig {
    #[default]
    Fixed,
    Multiplicative {
        up: f64,
        down: f64,
        cooldown: u64,
        noise: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum FailureConfig {
    Silent,
    Linear { scale: f64, bulwark_scale: f64 },
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self::Linear {
            scale: 1.0,
            bulwark_scale: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum JoinConfig {
    Passive,
    #[default]
    MirrorBulwark,
    EmitAlert,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ParentTargetConfig {
    Fixed,
    KnownFailure { decay_prob: f64 },
    TotalFailure { stretch: f64, shift: f64 },
}

impl Default for ParentTargetConfig {
    fn default() -> Self {
        Self::KnownFailure { decay_prob: 0.15 }
    }
}

/// Configuration for one [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Seed for the engine RNG; equal seeds give equal runs
    pub seed: u64,
    pub profile: ProfileConfig,
    pub signal: SignalParams,
    /// Per-cycle chance that an immobile node grows an extra stable link
    pub spawn_prob: f64,
    pub biomass: BiomassKind,
    pub alerting: ThresholdAlerting,
    pub inhibition: InhibitionConfig,
    pub adaptation: AdaptationConfig,
    pub failure: FailureConfig,
    pub metabolism: FlatMetabolism,
    pub join: JoinConfig,
    pub parent_target: ParentTargetConfig,
    /// Wipe a node's signal when it actually reverts from bulwark
    pub clear_on_revert: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            profile: ProfileConfig::default(),
            signal: SignalParams::default(),
            spawn_prob: 0.05,
            biomass: BiomassKind::default(),
            alerting: ThresholdAlerting::default(),
            inhibition: InhibitionConfig::default(),
            adaptation: AdaptationConfig::default(),
            failure: FailureConfig::default(),
            metabolism: FlatMetabolism::default(),
            join: JoinConfig::default(),
            parent_target: ParentTargetConfig::default(),
            clear_on_revert: false,
        }
    }
}

fn unit(name: &'static str, value: f64) -> Result<()> {
    in_range(name, value, 0.0, 1.0)
}

fn in_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, min, max })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    in_range(name, value, 0.0, f64::MAX)
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

impl EngineConfig {
    /// Reject parameters outside their meaningful ranges.
    pub fn validate(&self) -> Result<()> {
        let signal = &self.signal;
        unit("signal.diffusion_rate", signal.diffusion_rate)?;
        unit("signal.decay_rate", signal.decay_rate)?;
        positive("signal.max_concentration", signal.max_concentration)?;
        in_range("signal.cutoff", signal.cutoff, 0.0, signal.max_concentration)?;
        unit("spawn_prob", self.spawn_prob)?;
        non_negative("alerting.threshold", self.alerting.threshold)?;
        unit("metabolism.normal_rate", self.metabolism.normal_rate)?;
        unit("metabolism.bulwark_rate", self.metabolism.bulwark_rate)?;
        non_negative("profile.reversion_delay", self.profile.reversion_delay)?;
        if self.profile.bulwark_min > self.profile.bulwark_max {
            return Err(ConfigError::EmptyBulwarkBand {
                min: self.profile.bulwark_min,
                max: self.profile.bulwark_max,
            });
        }

        if let AdaptationConfig::Multiplicative { up, down, noise, .. } = self.adaptation {
            non_negative("adaptation.up", up)?;
            non_negative("adaptation.down", down)?;
            non_negative("adaptation.noise", noise)?;
        }
        if let FailureConfig::Linear { scale, bulwark_scale } = self.failure {
            non_negative("failure.scale", scale)?;
            non_negative("failure.bulwark_scale", bulwark_scale)?;
        }
        match self.parent_target {
            ParentTargetConfig::Fixed => {}
            ParentTargetConfig::KnownFailure { decay_prob } => {
                unit("parent_target.decay_prob", decay_prob)?;
            }
            ParentTargetConfig::TotalFailure { stretch, shift } => {
                positive("parent_target.stretch", stretch)?;
                in_range("parent_target.shift", shift, f64::MIN, f64::MAX)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_rates_outside_unit_interval() {
        let mut config = EngineConfig::default();
        config.signal.decay_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { name: "signal.decay_rate", .. })
        ));

        let mut config = EngineConfig::default();
        config.spawn_prob = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_ceiling() {
        let mut config = EngineConfig::default();
        config.signal.max_concentration = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { .. })));
    }

    #[test]
    fn rejects_empty_bulwark_band() {
        let mut config = EngineConfig::default();
        config.profile.bulwark_min = 7;
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyBulwarkBand { min: 7, max: 6 })
        );
    }

    #[test]
    fn rejects_flat_sigmoid() {
        let config = EngineConfig {
            parent_target: ParentTargetConfig::TotalFailure {
                stretch: 0.0,
                shift: -3.0,
            },
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
