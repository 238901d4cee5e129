use mycelia_topology::{Mesh, NodeId, Role};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use super::{common_dynamics, DynamicsStrategy};
use crate::Turn;

/// Below this share of its ideal biomass an immobile node steps back to
/// branching.
const OCCUPANCY_FLOOR: f64 = 0.8;

/// The core of the overlay. Behaves like a branching node with two
/// additions: it occasionally grows a spare stable link, and it sheds
/// stable links when it holds too many hyphae.
#[derive(Debug, Clone, Copy)]
pub struct ImmobileDynamics {
    pub spawn_prob: f64,
}

impl Default for ImmobileDynamics {
    fn default() -> Self {
        Self { spawn_prob: 0.05 }
    }
}

fn link_stable(turn: &mut Turn<'_>, node: NodeId, why: &str) {
    match turn.mesh.directory().stable_hypha(node, turn.rng) {
        Some(stable) => {
            trace!("{} links to {} ({})", node, stable, why);
            if let Err(e) = turn.mesh.grow_link(node, stable) {
                debug!("{} could not link to {}: {}", node, stable, e);
            }
        }
        None => debug!("{} found no stable hypha ({})", node, why),
    }
}

fn pull_biomass(mesh: &mut Mesh, node: NodeId, from: Vec<NodeId>) {
    for h in from {
        if !mesh.is_under_biomass(node) {
            break;
        }
        let wanted = mesh.amount_under_biomass(node).max(0) as usize;
        mesh.transfer_biomass(h, node, wanted);
    }
}

impl DynamicsStrategy for ImmobileDynamics {
    fn name(&self) -> &'static str {
        "immobile"
    }

    fn apply(&self, turn: &mut Turn<'_>, node: NodeId) {
        if common_dynamics(turn, node).is_break() {
            return;
        }
        let capacity = turn.mesh.profile(node).capacity;

        let mut hyphae = turn.mesh.hyphae(node);
        hyphae.shuffle(turn.rng);
        let (tip, extra_tip, branch, core) = {
            let mesh = &*turn.mesh;
            let pick = |role: Role, nth: usize| {
                hyphae
                    .iter()
                    .copied()
                    .filter(|&h| mesh.role(h) == role)
                    .nth(nth)
            };
            (
                pick(Role::Extending, 0),
                pick(Role::Extending, 1),
                pick(Role::Branching, 0),
                pick(Role::Immobile, 0),
            )
        };

        if let (Some(keep), Some(extra)) = (tip, extra_tip) {
            if turn.mesh.transfer_neighbor(node, extra, keep).is_ok() {
                trace!("{} hands tip {} to {}", node, extra, keep);
            }
        }

        if turn.mesh.is_under_hyphae(node) {
            link_stable(turn, node, "under hyphae");
        }
        if turn.rng.gen::<f64>() < self.spawn_prob {
            link_stable(turn, node, "spawn");
        }

        let mesh = &mut *turn.mesh;
        if mesh.is_under_biomass(node) {
            for h in mesh.hyphae(node) {
                if !mesh.are_linked(node, h) || !mesh.role(h).is_hyphal() {
                    continue;
                }
                let deficit = mesh.amount_under_biomass(node);
                let load = mesh.same_biomass_degree(h) as isize;
                if capacity > mesh.profile(h).capacity && load <= deficit {
                    if let Err(e) = mesh.absorb_hypha(node, h) {
                        debug!("{} could not absorb {}: {}", node, h, e);
                    }
                }
            }
        }
        if mesh.is_under_biomass(node) {
            let tips = mesh.extending(node);
            pull_biomass(mesh, node, tips);
            let branches = mesh.branching(node);
            pull_biomass(mesh, node, branches);
        }

        let ideal = mesh.profile(node).ideal_biomass;
        if ideal > 0 && (mesh.biomass_degree(node) as f64) / (ideal as f64) < OCCUPANCY_FLOOR {
            mesh.become_role(node, Role::Branching);
        }

        if mesh.is_over_biomass(node) {
            let receiver = [tip, branch, core]
                .into_iter()
                .flatten()
                .find(|&h| mesh.are_linked(node, h));
            if let Some(receiver) = receiver {
                let surplus = mesh.amount_over_biomass(node).max(0) as usize;
                mesh.transfer_biomass(node, receiver, surplus);
            }
        }

        if mesh.is_over_hyphae(node) {
            let stable = mesh.stable(node);
            let pool = if stable.is_empty() { mesh.hyphae(node) } else { stable };
            match pool.choose(turn.rng) {
                Some(&drop) => {
                    trace!("{} is over hyphae, severing {}", node, drop);
                    mesh.remove_neighbor(node, drop);
                }
                None => debug!("{} is over hyphae with nothing to sever", node),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mycelia_topology::{MeshEvent, ProfileConfig, SignalParams};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(strategy: ImmobileDynamics, mesh: &mut Mesh, node: NodeId) {
        let signal = SignalParams::default();
        let mut rng = StdRng::seed_from_u64(9);
        strategy.apply(&mut Turn::new(mesh, &mut rng, &signal), node);
    }

    /// An immobile node with a full biomass load and `hyphae` stable
    /// neighbors, each with room to spare.
    fn loaded(hyphae: usize) -> (Mesh, NodeId) {
        let config = ProfileConfig::default();
        let mut mesh = Mesh::new();
        let core = mesh.add_node(config.profile_with_capacity(20));
        mesh.become_role(core, Role::Immobile);
        for _ in 0..20 {
            let b = mesh.add_node(config.profile_with_capacity(1));
            mesh.add_neighbor(core, b);
        }
        for _ in 0..hyphae {
            let h = mesh.add_node(config.profile_with_capacity(30));
            mesh.become_role(h, Role::Immobile);
            mesh.add_neighbor(core, h);
        }
        (mesh, core)
    }

    #[test]
    fn sheds_a_stable_link_when_over_hyphae() {
        let (mut mesh, core) = loaded(7);
        run(ImmobileDynamics { spawn_prob: 0.0 }, &mut mesh, core);
        assert_eq!(mesh.role(core), Role::Immobile);
        assert_eq!(mesh.hyphae(core).len(), 6);
        assert_eq!(mesh.check_invariants(), Ok(()));
    }

    #[test]
    fn underfull_core_becomes_branching() {
        let config = ProfileConfig::default();
        let mut mesh = Mesh::new();
        let core = mesh.add_node(config.profile_with_capacity(10));
        let anchor = mesh.add_node(config.profile_with_capacity(10));
        mesh.become_role(core, Role::Immobile);
        mesh.become_role(anchor, Role::Immobile);
        mesh.add_neighbor(core, anchor);
        let b = mesh.add_node(config.profile_with_capacity(1));
        mesh.add_neighbor(core, b);

        run(ImmobileDynamics { spawn_prob: 0.0 }, &mut mesh, core);
        assert_eq!(mesh.role(core), Role::Branching);
    }

    /// A core at its hyphal target with room for one more link, and a
    /// stable `peer` it is not linked to, after one turn.
    fn settled(spawn_prob: f64, seed: u64) -> (Mesh, NodeId, NodeId) {
        let config = ProfileConfig::default();
        let mut mesh = Mesh::new();
        let core = mesh.add_node(config.profile_with_capacity(12));
        let anchor = mesh.add_node(config.profile_with_capacity(12));
        let peer = mesh.add_node(config.profile_with_capacity(12));
        for n in [core, anchor, peer] {
            mesh.become_role(n, Role::Immobile);
        }
        mesh.profile_mut(core).ideal_hyphae = 1;
        mesh.add_neighbor(core, anchor);
        for _ in 0..10 {
            let b = mesh.add_node(config.profile_with_capacity(1));
            mesh.add_neighbor(core, b);
        }
        mesh.drain_events();

        let signal = SignalParams::default();
        let mut rng = StdRng::seed_from_u64(seed);
        ImmobileDynamics { spawn_prob }.apply(&mut Turn::new(&mut mesh, &mut rng, &signal), core);
        (mesh, core, peer)
    }

    fn linked_to_peer(mesh: &Mesh, core: NodeId, peer: NodeId) -> bool {
        mesh.events()
            .iter()
            .any(|e| *e == MeshEvent::LinkAdded { a: core, b: peer })
    }

    #[test]
    fn spawn_grows_a_link_without_a_deficit() {
        let mut spawned = 0;
        for seed in 0..16 {
            let (mesh, core, peer) = settled(1.0, seed);
            assert_eq!(mesh.role(core), Role::Immobile);
            assert_eq!(mesh.check_invariants(), Ok(()));
            if linked_to_peer(&mesh, core, peer) {
                spawned += 1;
            }
        }
        assert!(spawned > 0);
    }

    #[test]
    fn no_spawn_without_probability() {
        for seed in 0..16 {
            let (mesh, core, peer) = settled(0.0, seed);
            assert!(!linked_to_peer(&mesh, core, peer));
            assert_eq!(mesh.hyphae(core).len(), 1);
        }
    }
}
