//! Mycelia Dynamics
//!
//! Behaviour of the mycelia overlay. Every live node takes one turn per
//! cycle; what it does with that turn depends on its role.
//!
//! # Growth
//!
//! Biomass nodes hang off a hypha. A tip (`Extending`) gathers biomass
//! until it holds more than its capacity, then becomes `Branching` and
//! grows a new tip out of its best biomass child. A branch point that
//! reaches its ideal hyphal degree settles into the `Immobile` core. Larger
//! nodes drift towards branch positions: a hypha swaps places with any
//! biomass child of greater capacity.
//!
//! # Alerts
//!
//! A failure injects alert signal at the failed node's former neighbors.
//! The signal diffuses and decays every cycle. A node whose signal stays
//! above the alerting threshold long enough is promoted to `Bulwark`: it
//! drops its links, keeps a small random degree band, and reverts to its
//! former role once the signal subsides.
//!
//! # Pluggable Policies
//!
//! Inhibition, adaptation, failure severity, metabolism, alerting, join
//! and parent-target behaviour are traits with stock implementations,
//! selected through [`EngineConfig`].

mod alerter;
mod config;
mod engine;
mod error;
pub mod policy;
mod reverter;
pub mod strategy;
mod turn;

pub use config::{
    AdaptationConfig, BiomassKind, EngineConfig, FailureConfig, InhibitionConfig, JoinConfig,
    ParentTargetConfig,
};
pub use engine::Engine;
pub use error::{ConfigError, Result};
pub use policy::Policies;
pub use strategy::{DynamicsStrategy, StrategyMap};
pub use turn::Turn;
