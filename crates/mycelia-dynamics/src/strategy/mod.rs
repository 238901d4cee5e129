//! Per-role topology dynamics.
//!
//! One [`DynamicsStrategy`] per live role. The hyphal roles share
//! [`common_dynamics`], which each of them calls explicitly before its own
//! rules. A strategy may change the node's role mid-turn; the engine does
//! not re-dispatch within the same turn.

mod biomass;
mod branching;
mod bulwark;
mod common;
mod extending;
mod immobile;

pub use biomass::{ForagingBiomass, RedundantParentsBiomass};
pub use branching::BranchingDynamics;
pub use bulwark::BulwarkDynamics;
pub use common::common_dynamics;
pub use extending::ExtendingDynamics;
pub use immobile::ImmobileDynamics;

use mycelia_topology::{NodeId, Role};

use crate::config::{BiomassKind, EngineConfig};
use crate::policy::join_strategy;
use crate::Turn;

/// Growth and pruning rules for one role.
pub trait DynamicsStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, turn: &mut Turn<'_>, node: NodeId);
}

/// One strategy per live role.
pub struct StrategyMap {
    pub biomass: Box<dyn DynamicsStrategy>,
    pub extending: Box<dyn DynamicsStrategy>,
    pub branching: Box<dyn DynamicsStrategy>,
    pub immobile: Box<dyn DynamicsStrategy>,
    pub bulwark: Box<dyn DynamicsStrategy>,
}

impl StrategyMap {
    pub fn from_config(config: &EngineConfig) -> Self {
        let join = join_strategy(config.join);
        let biomass: Box<dyn DynamicsStrategy> = match config.biomass {
            BiomassKind::Foraging => Box::new(ForagingBiomass::new(join)),
            BiomassKind::RedundantParents => Box::new(RedundantParentsBiomass::new(join)),
        };
        Self {
            biomass,
            extending: Box::new(ExtendingDynamics),
            branching: Box::new(BranchingDynamics),
            immobile: Box::new(ImmobileDynamics {
                spawn_prob: config.spawn_prob,
            }),
            bulwark: Box::new(BulwarkDynamics),
        }
    }

    /// Strategy for `role`; `None` for `Dead`.
    pub fn get(&self, role: Role) -> Option<&dyn DynamicsStrategy> {
        let strategy = match role {
            Role::Biomass => &self.biomass,
            Role::Extending => &self.extending,
            Role::Branching => &self.branching,
            Role::Immobile => &self.immobile,
            Role::Bulwark => &self.bulwark,
            Role::Dead => return None,
        };
        Some(strategy.as_ref())
    }
}
