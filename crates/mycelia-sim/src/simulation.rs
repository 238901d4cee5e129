//! Cycle-driven simulation with event recording.

use mycelia_dynamics::Engine;
use mycelia_topology::{FailureNotice, Mesh, MeshEvent, NodeId};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::stats::Report;

/// Drives an [`Engine`] cycle by cycle: ticks every live node once per
/// cycle, injects scheduled alerts and keeps a timeline of mesh events.
pub struct Simulation {
    config: SimulationConfig,
    engine: Engine,
    timeline: Vec<(u64, MeshEvent)>,
    violations: usize,
}

impl Simulation {
    /// Build the engine and populate it with `config.nodes` biomass nodes.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let mut engine = Engine::new(config.engine.clone())?;
        engine.mesh_mut().set_event_recording(config.record_events);
        let mut sim = Self {
            config,
            engine,
            timeline: Vec::new(),
            violations: 0,
        };
        for _ in 0..sim.config.nodes {
            sim.join_node();
        }
        sim.collect_events();
        info!(
            "simulation ready: {} nodes, seed {}",
            sim.config.nodes, sim.config.engine.seed
        );
        Ok(sim)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn mesh(&self) -> &Mesh {
        self.engine.mesh()
    }

    pub fn cycle(&self) -> u64 {
        self.engine.cycle()
    }

    /// Events recorded so far, tagged with the cycle they happened in.
    pub fn timeline(&self) -> &[(u64, MeshEvent)] {
        &self.timeline
    }

    /// Cycles that ended with a broken mesh invariant.
    pub fn violations(&self) -> usize {
        self.violations
    }

    /// Add a node with a capacity drawn from the configured initializer.
    pub fn join_node(&mut self) -> NodeId {
        let fixed = self.config.engine.profile.max_capacity;
        let capacity = self.config.capacity.sample(fixed, self.engine.rng_mut());
        self.engine.join_with_capacity(capacity)
    }

    pub fn fail_node(&mut self, node: NodeId) -> Option<FailureNotice> {
        let notice = self.engine.on_node_failed(node)?;
        debug!(
            "{} failed as {} with {} links",
            node, notice.role, notice.degree
        );
        Some(notice)
    }

    /// Fail a uniformly chosen live node.
    pub fn fail_random(&mut self) -> Option<NodeId> {
        let live = self.engine.mesh().live_nodes();
        let victim = *live.choose(self.engine.rng_mut())?;
        self.fail_node(victim).map(|n| n.node)
    }

    /// Inject `magnitude` of alert signal at `count` random live nodes.
    pub fn inject_random_alerts(&mut self, count: usize, magnitude: f64) {
        let live = self.engine.mesh().live_nodes();
        for _ in 0..count {
            let Some(&target) = live.choose(self.engine.rng_mut()) else {
                return;
            };
            debug!("introducing alert {:.1} at {}", magnitude, target);
            self.engine.inject_alert(target, magnitude);
        }
    }

    /// Advance one cycle.
    pub fn step(&mut self) {
        if let Some(alerts) = self.config.alerts {
            if alerts.period > 0 && self.cycle() % alerts.period == 0 {
                self.inject_random_alerts(alerts.count, alerts.magnitude);
            }
        }

        self.engine.run_cycle();
        self.collect_events();

        if let Err(violation) = self.engine.mesh().check_invariants() {
            self.violations += 1;
            warn!("cycle {}: {}", self.cycle(), violation);
        }

        let period = self.config.report_period;
        if period > 0 && self.cycle() % period == 0 {
            let report = self.report();
            info!(
                "cycle {}: {} live, roles {:?}, degree {:.2}±{:.2}, parent target {:.2}, parents {:.2}",
                report.cycle,
                report.live,
                report.roles,
                report.degree.mean,
                report.degree.stddev,
                report.mean_parent_target,
                report.mean_observed_parents
            );
        }
    }

    /// Run the configured number of cycles and return the final report.
    pub fn run(&mut self) -> Report {
        for _ in 0..self.config.cycles {
            self.step();
        }
        self.report()
    }

    pub fn report(&self) -> Report {
        Report::capture(self.engine.mesh(), self.cycle())
    }

    fn collect_events(&mut self) {
        let cycle = self.cycle();
        let events = self.engine.mesh_mut().drain_events();
        self.timeline.extend(events.into_iter().map(|e| (cycle, e)));
    }
}
