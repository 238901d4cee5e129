//! Pluggable decision rules consulted by the engine.
//!
//! Each concern is a small trait with a few stock implementations. The
//! engine holds them as trait objects in [`Policies`], built once from
//! [`EngineConfig`].

mod adaptation;
mod alerting;
mod failure;
mod inhibition;
mod join;
mod metabolism;
mod parent;

pub use adaptation::{AdaptationStrategy, FixedAdaptation, MultiplicativeAdaptation};
pub use alerting::{AlertingPredicate, ThresholdAlerting};
pub use failure::{FailureSeverity, LinearFailure, SilentFailure};
pub use inhibition::{AdaptiveInhibition, DelayInhibition, ImmediateInhibition, InhibitionStrategy};
pub use join::{EmitAlertJoin, JoinStrategy, MirrorBulwarkJoin, PassiveJoin};
pub use metabolism::{FlatMetabolism, MetabolismStrategy};
pub use parent::{
    FixedParentTarget, KnownFailureParentTarget, ParentTargetStrategy, TotalFailureParentTarget,
};

use crate::config::{
    AdaptationConfig, EngineConfig, FailureConfig, InhibitionConfig, JoinConfig,
    ParentTargetConfig,
};

/// The policy set the engine consults outside of role strategies.
pub struct Policies {
    pub alerting: Box<dyn AlertingPredicate>,
    pub inhibition: Box<dyn InhibitionStrategy>,
    pub adaptation: Box<dyn AdaptationStrategy>,
    pub failure: Box<dyn FailureSeverity>,
    pub metabolism: Box<dyn MetabolismStrategy>,
    pub parent_target: Box<dyn ParentTargetStrategy>,
}

impl Policies {
    pub fn from_config(config: &EngineConfig) -> Self {
        let inhibition: Box<dyn InhibitionStrategy> = match config.inhibition {
            InhibitionConfig::Immediate => Box::new(ImmediateInhibition),
            InhibitionConfig::Delay {
                bulwark_delay,
                revert_delay,
            } => Box::new(DelayInhibition {
                bulwark_delay,
                revert_delay,
            }),
            InhibitionConfig::Adaptive { bulwark_delay } => {
                Box::new(AdaptiveInhibition { bulwark_delay })
            }
        };
        let adaptation: Box<dyn AdaptationStrategy> = match config.adaptation {
            AdaptationConfig::Fixed => Box::new(FixedAdaptation),
            AdaptationConfig::Multiplicative {
                up,
                down,
                cooldown,
                noise,
            } => Box::new(MultiplicativeAdaptation {
                up,
                down,
                cooldown,
                noise,
            }),
        };
        let failure: Box<dyn FailureSeverity> = match config.failure {
            FailureConfig::Silent => Box::new(SilentFailure),
            FailureConfig::Linear {
                scale,
                bulwark_scale,
            } => Box::new(LinearFailure {
                scale,
                bulwark_scale,
            }),
        };
        let parent_target: Box<dyn ParentTargetStrategy> = match config.parent_target {
            ParentTargetConfig::Fixed => Box::new(FixedParentTarget),
            ParentTargetConfig::KnownFailure { decay_prob } => {
                Box::new(KnownFailureParentTarget { decay_prob })
            }
            ParentTargetConfig::TotalFailure { stretch, shift } => {
                Box::new(TotalFailureParentTarget { stretch, shift })
            }
        };

        Self {
            alerting: Box::new(config.alerting),
            inhibition,
            adaptation,
            failure,
            metabolism: Box::new(config.metabolism),
            parent_target,
        }
    }
}

/// Join strategy selected by configuration.
pub fn join_strategy(config: JoinConfig) -> Box<dyn JoinStrategy> {
    match config {
        JoinConfig::Passive => Box::new(PassiveJoin),
        JoinConfig::MirrorBulwark => Box::new(MirrorBulwarkJoin),
        JoinConfig::EmitAlert => Box::new(EmitAlertJoin),
    }
}
