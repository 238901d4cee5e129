//! The scheduler-facing entry point.

use mycelia_topology::{FailureNotice, Mesh, NodeId, NodeProfile};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::policy::Policies;
use crate::strategy::StrategyMap;
use crate::Turn;

/// Owns the mesh, the RNG and every strategy, and runs node turns.
///
/// A scheduler drives it through three calls: [`on_node_joined`],
/// [`on_node_failed`] and [`on_cycle_tick`]. [`run_cycle`] is a
/// convenience that ticks every live node once in a shuffled order.
///
/// [`on_node_joined`]: Engine::on_node_joined
/// [`on_node_failed`]: Engine::on_node_failed
/// [`on_cycle_tick`]: Engine::on_cycle_tick
/// [`run_cycle`]: Engine::run_cycle
pub struct Engine {
    pub(crate) mesh: Mesh,
    pub(crate) rng: StdRng,
    pub(crate) strategies: StrategyMap,
    pub(crate) policies: Policies,
    pub(crate) config: EngineConfig,
    cycle: u64,
}

impl Engine {
    /// Validate `config` and build the engine with the strategies it
    /// selects.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let strategies = StrategyMap::from_config(&config);
        let policies = Policies::from_config(&config);
        Self::with_parts(config, strategies, policies)
    }

    /// Build with caller-supplied strategies and policies.
    pub fn with_parts(config: EngineConfig, strategies: StrategyMap, policies: Policies) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            mesh: Mesh::new(),
            rng: StdRng::seed_from_u64(config.seed),
            strategies,
            policies,
            config,
            cycle: 0,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Completed calls to [`run_cycle`](Engine::run_cycle).
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// A new node with the configured default capacity enters as biomass.
    pub fn on_node_joined(&mut self) -> NodeId {
        let profile = self.config.profile.profile();
        self.join_with_profile(profile)
    }

    pub fn join_with_capacity(&mut self, capacity: usize) -> NodeId {
        let profile = self.config.profile.profile_with_capacity(capacity);
        self.join_with_profile(profile)
    }

    pub fn join_with_profile(&mut self, profile: NodeProfile) -> NodeId {
        let id = self.mesh.add_node(profile);
        trace!("{} joined", id);
        id
    }

    /// Mark `node` dead, sever its links and notify every former neighbor.
    /// Returns `None` if it was already dead or never existed.
    pub fn on_node_failed(&mut self, node: NodeId) -> Option<FailureNotice> {
        if !self.mesh.contains(node) {
            debug!("failure reported for unknown node {}", node);
            return None;
        }
        let notice = self.mesh.kill(node)?;
        for &n in &notice.neighbors {
            self.neighbor_lost(n, notice.role, notice.degree);
        }
        Some(notice)
    }

    /// Add alert signal at `node` from outside the mesh.
    pub fn inject_alert(&mut self, node: NodeId, amount: f64) {
        if self.mesh.contains(node) && self.mesh.is_up(node) {
            self.mesh.inject_signal(node, amount, &self.config.signal);
        }
    }

    /// Run one node's turn: signal dynamics, role strategy, directory
    /// check, bulwark control with metabolism, reverter bookkeeping and
    /// parent-target adaptation, in that order. Dead or unknown nodes are
    /// skipped.
    pub fn on_cycle_tick(&mut self, node: NodeId) {
        if !self.mesh.contains(node) || !self.mesh.is_up(node) {
            return;
        }
        self.mesh.signal_dynamics(node, &self.config.signal);

        let role = self.mesh.role(node);
        if let Some(strategy) = self.strategies.get(role) {
            let mut turn = Turn::new(&mut self.mesh, &mut self.rng, &self.config.signal);
            strategy.apply(&mut turn, node);
        }
        if self.mesh.verify_directory(node) {
            debug!("{} directory entry repaired after {} turn", node, role);
        }

        self.bulwark_control(node);
        self.track_reversion(node);
        self.adapt_parent_target(node);
    }

    /// Tick every live node once, in a freshly shuffled order.
    pub fn run_cycle(&mut self) {
        let mut order = self.mesh.live_nodes();
        order.shuffle(&mut self.rng);
        for node in order {
            self.on_cycle_tick(node);
        }
        self.cycle += 1;
    }

    fn adapt_parent_target(&mut self, node: NodeId) {
        let parents = self.mesh.hyphae(node).len() as u32;
        let profile = self.mesh.profile_mut(node);
        profile.observed_parents = parents;
        self.policies.parent_target.adapt(profile, &mut self.rng);
    }
}
