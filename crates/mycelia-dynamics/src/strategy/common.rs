use std::ops::ControlFlow;

use mycelia_topology::{NodeId, Role};
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use crate::Turn;

/// Dynamics shared by every hyphal role, run before the role's own rules.
///
/// Reconnects a node cut off from the hyphal layer, steals a larger biomass
/// node from a neighbouring hypha, and swaps places with its own best
/// biomass child when that child has more capacity. Returns `Break` when
/// the node handed its position away and must not continue its turn.
pub fn common_dynamics(turn: &mut Turn<'_>, node: NodeId) -> ControlFlow<()> {
    let mesh = &mut *turn.mesh;
    let role = mesh.role(node);
    let my_capacity = mesh.profile(node).capacity;

    let cut_off = mesh.hyphae(node).is_empty()
        || (mesh.stable(node).is_empty() && role != Role::Extending);
    if cut_off {
        match mesh.directory().stable_hypha(node, turn.rng) {
            Some(stable) => {
                trace!("{} is cut off from the hyphae, connecting to {}", node, stable);
                mesh.add_neighbor(node, stable);
            }
            None => debug!("{} is cut off and found no hypha to connect to", node),
        }
    }

    let mut own_best = mesh.max_biomass(node);
    let own_capacity = own_best.map_or(0, |b| mesh.profile(b).capacity);

    let kind = mesh.profile(node).kind;
    let mut candidate: Option<(NodeId, usize)> = None;
    for n in mesh.two_hop_neighbors(node) {
        let p = mesh.profile(n);
        if p.role() != Role::Biomass || p.kind != kind {
            continue;
        }
        if p.capacity > candidate.map_or(own_capacity, |(_, c)| c) {
            candidate = Some((n, p.capacity));
        }
    }

    if let (Some(_), Some((stolen, capacity))) = (own_best, candidate) {
        if capacity > my_capacity {
            if let Some(owner) = mesh.parent(stolen) {
                debug!("{} steals biomass {} from {}", node, stolen, owner);
                if mesh.transfer_neighbor(owner, stolen, node).is_ok() {
                    own_best = Some(stolen);
                }
            }
        }
    }

    if let Some(best) = own_best {
        if mesh.profile(best).capacity > my_capacity {
            if let Err(e) = mesh.swap_hyphae(node, best) {
                debug!("{} could not swap with {}: {}", node, best, e);
                return ControlFlow::Continue(());
            }
            return ControlFlow::Break(());
        }
    }

    if mesh.same_kind_hyphae(node).is_empty() {
        let mut candidates: Vec<NodeId> = mesh
            .two_hop_neighborhood(node)
            .into_iter()
            .filter(|&n| mesh.role(n).is_hyphal())
            .collect();
        candidates.shuffle(turn.rng);
        match candidates.first() {
            Some(target) => debug!(
                "{} has no same-kind hypha; {} candidates nearby, e.g. {}",
                node,
                candidates.len(),
                target
            ),
            None => trace!("{} has no same-kind hypha and no candidates nearby", node),
        }
    }
    ControlFlow::Continue(())
}
