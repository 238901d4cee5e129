use mycelia_topology::{NodeId, Role};
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use super::{common_dynamics, DynamicsStrategy};
use crate::Turn;

/// A branch tip: collapses redundant tips into itself, keeps up to the
/// parent target of stable attachments and turns into a branching node
/// once it holds more biomass than it can serve.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendingDynamics;

impl DynamicsStrategy for ExtendingDynamics {
    fn name(&self) -> &'static str {
        "extending"
    }

    fn apply(&self, turn: &mut Turn<'_>, node: NodeId) {
        if common_dynamics(turn, node).is_break() {
            return;
        }
        let mesh = &mut *turn.mesh;
        let capacity = mesh.profile(node).capacity;

        let mut hyphae = mesh.hyphae(node);
        hyphae.shuffle(turn.rng);
        let tips: Vec<NodeId> = hyphae
            .iter()
            .copied()
            .filter(|&h| mesh.role(h) == Role::Extending)
            .collect();
        for tip in tips {
            if !mesh.are_linked(node, tip) || mesh.role(tip) != Role::Extending {
                continue;
            }
            if mesh.profile(tip).capacity <= capacity {
                if let Err(e) = mesh.absorb_hypha(node, tip) {
                    debug!("{} could not absorb {}: {}", node, tip, e);
                }
            }
        }

        let branching: Vec<NodeId> = hyphae
            .iter()
            .copied()
            .filter(|&h| mesh.role(h) == Role::Branching && mesh.are_linked(node, h))
            .collect();
        if let [_, second, ..] = branching[..] {
            trace!("{} drops second branching parent {}", node, second);
            mesh.remove_neighbor(node, second);
        }

        let target = mesh.profile(node).parent_target().floor() as usize;
        if mesh.stable(node).len() < target {
            match mesh.directory().stable_hypha(node, turn.rng) {
                Some(parent) => {
                    if let Err(e) = mesh.grow_link(node, parent) {
                        debug!("{} could not attach to {}: {}", node, parent, e);
                    }
                }
                None => debug!("{} found no hypha to attach to", node),
            }
        }

        if mesh.is_over_biomass(node) {
            mesh.become_role(node, Role::Branching);
            if let Some(tip) = mesh.grow_hypha(node) {
                let surplus = mesh.same_biomass_degree(node).saturating_sub(capacity);
                mesh.transfer_biomass(node, tip, surplus);
            }
        } else {
            loop {
                let hyphae = mesh.hyphae(node);
                if hyphae.len() <= target {
                    break;
                }
                let Some(&drop) = hyphae.choose(turn.rng) else {
                    break;
                };
                trace!("{} drops surplus hypha {}", node, drop);
                mesh.remove_neighbor(node, drop);
            }
        }
    }
}
