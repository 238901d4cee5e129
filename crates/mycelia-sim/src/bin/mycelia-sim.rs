//! Mycelia Simulator
//!
//! Run a simulation described by a JSON file and print the final report.
//! The file is the first argument, or `MYCELIA_CONFIG`; without either the
//! defaults are used.

use mycelia_sim::{Simulation, SimulationConfig};
use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mycelia_sim=info,mycelia=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimulationConfig::load(env::args().nth(1))?;
    tracing::info!(
        "running {} cycles over {} nodes",
        config.cycles,
        config.nodes
    );

    let mut sim = Simulation::new(config)?;
    let report = sim.run();
    if sim.violations() > 0 {
        tracing::warn!("{} cycles ended with a broken invariant", sim.violations());
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
