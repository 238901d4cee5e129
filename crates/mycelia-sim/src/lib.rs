//! Mycelia Simulator
//!
//! Reference scheduler for the mycelia overlay.
//!
//! # Architecture
//!
//! - **Simulation**: ticks every live node once per cycle in a shuffled
//!   order, injects scheduled alerts and records a timeline of mesh events
//! - **Report**: role counts and degree statistics of the live population
//! - **SimulationConfig**: one JSON document describing the engine, the
//!   population and the run
//!
//! # Usage
//!
//! ```ignore
//! let mut sim = Simulation::new(SimulationConfig::default())?;
//! let report = sim.run();
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

mod config;
mod error;
mod simulation;
mod stats;

pub use config::{AlertSchedule, CapacityInit, SimulationConfig, CONFIG_ENV};
pub use error::{Result, SimError};
pub use simulation::Simulation;
pub use stats::{DegreeStats, Report};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_run_grows_hyphae() {
        let mut sim = Simulation::new(SimulationConfig {
            nodes: 50,
            cycles: 30,
            report_period: 0,
            ..SimulationConfig::default()
        })
        .unwrap();
        let report = sim.run();
        assert_eq!(report.cycle, 30);
        assert!(report.hypha_degree.count > 0);
        assert_eq!(sim.violations(), 0);
    }
}
