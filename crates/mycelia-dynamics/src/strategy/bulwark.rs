use mycelia_topology::NodeId;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use super::DynamicsStrategy;
use crate::Turn;

/// Keeps a bulwark node's degree inside its `[bulwark_min, bulwark_max]`
/// band, one link per cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulwarkDynamics;

impl DynamicsStrategy for BulwarkDynamics {
    fn name(&self) -> &'static str {
        "bulwark"
    }

    fn apply(&self, turn: &mut Turn<'_>, node: NodeId) {
        let mesh = &mut *turn.mesh;
        let degree = mesh.degree(node);
        let profile = mesh.profile(node);
        let (min, max) = (profile.bulwark_min, profile.bulwark_max);

        if degree < min {
            match mesh.directory().random_node(node, turn.rng) {
                Some(candidate) => {
                    trace!("bulwark {} under {} links, connecting to {}", node, min, candidate);
                    mesh.add_neighbor(node, candidate);
                }
                None => debug!("bulwark {} found no node to connect to", node),
            }
        } else if degree > max {
            let neighbors = mesh.neighbors(node);
            if let Some(&drop) = neighbors.choose(turn.rng) {
                trace!("bulwark {} over {} links, dropping {}", node, max, drop);
                mesh.remove_neighbor(node, drop);
            }
        }
    }
}
