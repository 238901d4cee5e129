//! Simulation configuration, loadable from JSON.

use std::path::Path;

use mycelia_dynamics::EngineConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MYCELIA_CONFIG";

/// How joining nodes get their capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapacityInit {
    /// Every node gets the engine's `max_capacity`
    #[default]
    Fixed,
    /// Uniform in `1..=max`
    Uniform { max: usize },
    /// Heavy-tailed: most nodes small, a few near `max`
    PowerLaw { alpha: f64, max: usize },
}

impl CapacityInit {
    pub fn sample<R: Rng + ?Sized>(&self, fixed: usize, rng: &mut R) -> usize {
        match *self {
            CapacityInit::Fixed => fixed,
            CapacityInit::Uniform { max } => rng.gen_range(1..=max.max(1)),
            CapacityInit::PowerLaw { alpha, max } => {
                let max = max.max(1);
                let u: f64 = rng.gen();
                let drawn = max as f64 * u.powf(1.0 / (alpha + 1.0));
                max.saturating_sub(drawn as usize).clamp(1, max)
            }
        }
    }
}

/// Random alert injection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSchedule {
    /// Nodes hit per injection round
    pub count: usize,
    pub magnitude: f64,
    /// Cycles between rounds
    pub period: u64,
}

impl Default for AlertSchedule {
    fn default() -> Self {
        Self {
            count: 4,
            magnitude: 100.0,
            period: 50,
        }
    }
}

/// Configuration for a [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub engine: EngineConfig,
    /// Initial population
    pub nodes: usize,
    /// Cycles run by [`Simulation::run`](crate::Simulation::run)
    pub cycles: u64,
    pub capacity: CapacityInit,
    /// No injections when absent
    pub alerts: Option<AlertSchedule>,
    /// Cycles between statistics log lines; 0 disables them
    pub report_period: u64,
    /// Keep a timeline of every mesh event
    pub record_events: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            nodes: 100,
            cycles: 200,
            capacity: CapacityInit::default(),
            alerts: None,
            report_period: 10,
            record_events: false,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from the file named by `arg`, else by `MYCELIA_CONFIG`, else
    /// fall back to defaults.
    pub fn load(arg: Option<String>) -> Result<Self> {
        match arg.or_else(|| std::env::var(CONFIG_ENV).ok()) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
