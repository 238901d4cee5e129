use mycelia_topology::{NodeId, Role};
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use super::DynamicsStrategy;
use crate::policy::JoinStrategy;
use crate::Turn;

/// Attach `node` to `hypha` and let the join policy run. Returns false if
/// the join changed the node's role.
fn attach(join: &dyn JoinStrategy, turn: &mut Turn<'_>, node: NodeId, hypha: NodeId) -> bool {
    trace!("{} attaches to {}", node, hypha);
    turn.mesh.add_neighbor(node, hypha);
    join.join(turn, node, hypha);
    turn.mesh.role(node) == Role::Biomass
}

/// Default leaf behaviour: hang off exactly one same-kind hypha, found
/// through the foraging tips first. With nowhere to attach the node starts
/// a branch of its own.
pub struct ForagingBiomass {
    join: Box<dyn JoinStrategy>,
}

impl ForagingBiomass {
    pub fn new(join: Box<dyn JoinStrategy>) -> Self {
        Self { join }
    }
}

impl DynamicsStrategy for ForagingBiomass {
    fn name(&self) -> &'static str {
        "foraging-biomass"
    }

    fn apply(&self, turn: &mut Turn<'_>, node: NodeId) {
        let mesh = &*turn.mesh;
        if mesh.is_disconnected(node) || mesh.same_kind_hyphae(node).is_empty() {
            let found = mesh
                .foraging_hypha(node, turn.rng)
                .or_else(|| mesh.attachable_hypha(node, turn.rng));
            let Some(hypha) = found else {
                debug!("{} found no hypha, starting a branch", node);
                turn.mesh.become_role(node, Role::Extending);
                return;
            };
            if !attach(self.join.as_ref(), turn, node, hypha) {
                return;
            }
        }

        let mesh = &mut *turn.mesh;
        loop {
            let parents = mesh.same_kind_hyphae(node);
            if parents.len() <= 1 {
                break;
            }
            let Some(&extra) = parents.choose(turn.rng) else {
                break;
            };
            trace!("{} drops extra parent {}", node, extra);
            mesh.remove_neighbor(node, extra);
        }
    }
}

/// Leaf behaviour under failure pressure: hold between `floor` and `ceil`
/// of the parent target in hyphal parents and never link to other biomass.
pub struct RedundantParentsBiomass {
    join: Box<dyn JoinStrategy>,
}

impl RedundantParentsBiomass {
    pub fn new(join: Box<dyn JoinStrategy>) -> Self {
        Self { join }
    }
}

impl DynamicsStrategy for RedundantParentsBiomass {
    fn name(&self) -> &'static str {
        "redundant-parents-biomass"
    }

    fn apply(&self, turn: &mut Turn<'_>, node: NodeId) {
        if turn.mesh.hyphae(node).is_empty() {
            let Some(hypha) = turn.mesh.attachable_hypha(node, turn.rng) else {
                debug!("{} found no hypha, starting a branch", node);
                turn.mesh.become_role(node, Role::Extending);
                return;
            };
            if !attach(self.join.as_ref(), turn, node, hypha) {
                return;
            }
        }

        let mesh = &mut *turn.mesh;
        let target = mesh.profile(node).parent_target();
        let (floor, ceil) = (target.floor() as usize, target.ceil() as usize);

        loop {
            let parents = mesh.hyphae(node);
            if parents.len() <= floor {
                break;
            }
            let Some(&extra) = parents.choose(turn.rng) else {
                break;
            };
            trace!("{} drops parent {} above target {:.2}", node, extra, target);
            mesh.remove_neighbor(node, extra);
        }

        let mut pool: Vec<NodeId> = mycelia_topology::HYPHAL
            .iter()
            .flat_map(|&r| mesh.directory().members(r))
            .filter(|&h| h != node && !mesh.are_linked(node, h))
            .collect();
        pool.shuffle(turn.rng);
        for h in pool {
            if mesh.hyphae(node).len() >= ceil {
                break;
            }
            trace!("{} adds redundant parent {}", node, h);
            mesh.add_neighbor(node, h);
        }

        for b in mesh.biomass(node) {
            mesh.remove_neighbor(node, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PassiveJoin;
    use mycelia_topology::{Mesh, ProfileConfig, SignalParams};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(strategy: &dyn DynamicsStrategy, mesh: &mut Mesh, node: NodeId, seed: u64) {
        let signal = SignalParams::default();
        let mut rng = StdRng::seed_from_u64(seed);
        strategy.apply(&mut Turn::new(mesh, &mut rng, &signal), node);
    }

    #[test]
    fn lone_biomass_starts_a_branch() {
        let mut mesh = Mesh::new();
        let n = mesh.add_node(ProfileConfig::default().profile());
        run(&ForagingBiomass::new(Box::new(PassiveJoin)), &mut mesh, n, 1);
        assert_eq!(mesh.role(n), Role::Extending);
    }

    #[test]
    fn forager_attaches_and_keeps_one_parent() {
        let config = ProfileConfig::default();
        let mut mesh = Mesh::new();
        let leaf = mesh.add_node(config.profile());
        let tip = mesh.add_node(config.profile());
        mesh.become_role(tip, Role::Extending);

        let strategy = ForagingBiomass::new(Box::new(PassiveJoin));
        run(&strategy, &mut mesh, leaf, 1);
        assert!(mesh.are_linked(leaf, tip));

        let other = mesh.add_node(config.profile());
        mesh.become_role(other, Role::Immobile);
        mesh.add_neighbor(leaf, other);
        run(&strategy, &mut mesh, leaf, 2);
        assert_eq!(mesh.same_kind_hyphae(leaf).len(), 1);
        assert_eq!(mesh.role(leaf), Role::Biomass);
    }

    #[test]
    fn redundant_parents_follow_target() {
        let config = ProfileConfig::default();
        let mut mesh = Mesh::new();
        let leaf = mesh.add_node(config.profile());
        let cousin = mesh.add_node(config.profile());
        for _ in 0..4 {
            let h = mesh.add_node(config.profile());
            mesh.become_role(h, Role::Immobile);
        }
        mesh.add_neighbor(leaf, cousin);
        mesh.profile_mut(leaf).set_parent_target(2.5);

        run(&RedundantParentsBiomass::new(Box::new(PassiveJoin)), &mut mesh, leaf, 4);
        assert_eq!(mesh.hyphae(leaf).len(), 3);
        assert!(mesh.biomass(leaf).is_empty());
        assert_eq!(mesh.check_invariants(), Ok(()));
    }
}
