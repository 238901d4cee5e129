use mycelia_topology::{Mesh, NodeId, Role};
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use super::{common_dynamics, DynamicsStrategy};
use crate::Turn;

/// Still linked to `node` and still extending.
fn live_tip(mesh: &Mesh, node: NodeId, tip: Option<NodeId>) -> Option<NodeId> {
    tip.filter(|&t| mesh.are_linked(node, t) && mesh.role(t) == Role::Extending)
}

/// A branch point: keeps one extending child, balances biomass with it and
/// settles into the immobile core once it holds enough hyphal links.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchingDynamics;

impl DynamicsStrategy for BranchingDynamics {
    fn name(&self) -> &'static str {
        "branching"
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
        let mut first = tips.first().copied();
        let mut second = tips.get(1).copied();
        if first.is_none() {
            first = mesh.grow_hypha(node);
        }

        if mesh.is_under_biomass(node) {
            for h in hyphae {
                if !mesh.are_linked(node, h) || !mesh.role(h).is_hyphal() {
                    continue;
                }
                let room = capacity.saturating_sub(mesh.degree(node));
                if capacity > mesh.profile(h).capacity && mesh.degree(h) <= room {
                    if let Err(e) = mesh.absorb_hypha(node, h) {
                        debug!("{} could not absorb {}: {}", node, h, e);
                    }
                }
            }
        }

        first = live_tip(mesh, node, first);
        second = live_tip(mesh, node, second);
        if first.is_none() {
            first = second.take();
        }

        for tip in mesh.extending(node) {
            if !mesh.is_under_biomass(node) {
                break;
            }
            let wanted = mesh.amount_under_biomass(node).max(0) as usize;
            mesh.transfer_biomass(tip, node, wanted);
        }

        if let Some(tip) = first {
            if mesh.is_over_biomass(node) {
                let surplus = mesh.amount_over_biomass(node).max(0) as usize;
                mesh.transfer_biomass(node, tip, surplus);
            }
        }

        if let (Some(keep), Some(extra)) = (first, second) {
            if mesh.transfer_neighbor(node, extra, keep).is_ok() {
                second = None;
            }
        }

        if mesh.is_under_hyphae(node) {
            let candidates: Vec<NodeId> = mesh
                .two_hop_neighbors(node)
                .into_iter()
                .filter(|&n| mesh.role(n).is_hyphal())
                .collect();
            match candidates.choose(turn.rng) {
                Some(&candidate) => {
                    trace!("{} is under hyphae, linking to {}", node, candidate);
                    if let Err(e) = mesh.grow_link(node, candidate) {
                        debug!("{} could not link to {}: {}", node, candidate, e);
                    }
                }
                None => trace!("{} is under hyphae with no candidates nearby", node),
            }
        }

        if mesh.is_at_or_over_hyphae(node) {
            mesh.become_role(node, Role::Immobile);
            // the extra tip is already linked to the kept one
            if let (Some(_), Some(extra)) = (first, second) {
                mesh.remove_neighbor(node, extra);
            }
        }

        if mesh.is_under_biomass(node) {
            mesh.become_role(node, Role::Extending);
        }
    }
}
