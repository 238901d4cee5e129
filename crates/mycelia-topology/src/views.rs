//! Role-filtered neighbor views, degree counts and capacity predicates.
//!
//! Views return owned snapshots: mutating the mesh afterwards does not
//! change a view already taken. "Same" and "different" filter on the node
//! kind, not on role.

use std::collections::BTreeSet;

use crate::{Mesh, Node, NodeId, Role};

impl Mesh {
    fn neighbors_where(&self, id: NodeId, keep: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        self.links(id)
            .iter()
            .filter(|&n| keep(self.node(n)))
            .collect()
    }

    fn count_where(&self, id: NodeId, keep: impl Fn(&Node) -> bool) -> usize {
        self.links(id).iter().filter(|&n| keep(self.node(n))).count()
    }

    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.links(id).to_vec()
    }

    pub fn biomass(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors_where(id, |n| n.role() == Role::Biomass)
    }

    pub fn hyphae(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors_where(id, |n| n.role().is_hyphal())
    }

    pub fn extending(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors_where(id, |n| n.role() == Role::Extending)
    }

    pub fn branching(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors_where(id, |n| n.role() == Role::Branching)
    }

    pub fn immobile(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors_where(id, |n| n.role() == Role::Immobile)
    }

    pub fn stable(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors_where(id, |n| n.role().is_stable())
    }

    pub fn bulwark(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors_where(id, |n| n.role() == Role::Bulwark)
    }

    pub fn same_kind(&self, id: NodeId) -> Vec<NodeId> {
        let kind = self.profile(id).kind;
        self.neighbors_where(id, |n| n.profile().kind == kind)
    }

    pub fn different_kind(&self, id: NodeId) -> Vec<NodeId> {
        let kind = self.profile(id).kind;
        self.neighbors_where(id, |n| n.profile().kind != kind)
    }

    /// Same-kind hyphal neighbors; the peer set a load balancer works on.
    pub fn same_kind_hyphae(&self, id: NodeId) -> Vec<NodeId> {
        let kind = self.profile(id).kind;
        self.neighbors_where(id, |n| n.profile().kind == kind && n.role().is_hyphal())
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.links(id).len()
    }

    pub fn is_disconnected(&self, id: NodeId) -> bool {
        self.links(id).is_empty()
    }

    pub fn same_degree(&self, id: NodeId) -> usize {
        let kind = self.profile(id).kind;
        self.count_where(id, |n| n.profile().kind == kind)
    }

    pub fn different_degree(&self, id: NodeId) -> usize {
        self.degree(id) - self.same_degree(id)
    }

    pub fn hypha_degree(&self, id: NodeId) -> usize {
        self.count_where(id, |n| n.role().is_hyphal())
    }

    pub fn same_hypha_degree(&self, id: NodeId) -> usize {
        let kind = self.profile(id).kind;
        self.count_where(id, |n| n.profile().kind == kind && n.role().is_hyphal())
    }

    pub fn different_hypha_degree(&self, id: NodeId) -> usize {
        self.hypha_degree(id) - self.same_hypha_degree(id)
    }

    pub fn biomass_degree(&self, id: NodeId) -> usize {
        self.count_where(id, |n| n.role() == Role::Biomass)
    }

    pub fn same_biomass_degree(&self, id: NodeId) -> usize {
        let kind = self.profile(id).kind;
        self.count_where(id, |n| n.profile().kind == kind && n.role() == Role::Biomass)
    }

    pub fn is_ideal_hyphae(&self, id: NodeId) -> bool {
        self.hypha_degree(id) == self.profile(id).ideal_hyphae
    }

    pub fn is_over_hyphae(&self, id: NodeId) -> bool {
        self.hypha_degree(id) > self.profile(id).ideal_hyphae
    }

    pub fn is_under_hyphae(&self, id: NodeId) -> bool {
        self.hypha_degree(id) < self.profile(id).ideal_hyphae
    }

    pub fn is_at_or_over_hyphae(&self, id: NodeId) -> bool {
        self.hypha_degree(id) >= self.profile(id).ideal_hyphae
    }

    pub fn is_ideal_same_hyphae(&self, id: NodeId) -> bool {
        self.same_hypha_degree(id) == self.profile(id).ideal_hyphae
    }

    pub fn is_over_same_hyphae(&self, id: NodeId) -> bool {
        self.same_hypha_degree(id) > self.profile(id).ideal_hyphae
    }

    pub fn is_under_same_hyphae(&self, id: NodeId) -> bool {
        self.same_hypha_degree(id) < self.profile(id).ideal_hyphae
    }

    pub fn is_at_or_over_same_hyphae(&self, id: NodeId) -> bool {
        self.same_hypha_degree(id) >= self.profile(id).ideal_hyphae
    }

    pub fn is_ideal_different_hyphae(&self, id: NodeId) -> bool {
        self.different_hypha_degree(id) == self.profile(id).ideal_other_hyphae
    }

    pub fn is_over_different_hyphae(&self, id: NodeId) -> bool {
        self.different_hypha_degree(id) > self.profile(id).ideal_other_hyphae
    }

    pub fn is_under_different_hyphae(&self, id: NodeId) -> bool {
        self.different_hypha_degree(id) < self.profile(id).ideal_other_hyphae
    }

    pub fn is_at_or_over_different_hyphae(&self, id: NodeId) -> bool {
        self.different_hypha_degree(id) >= self.profile(id).ideal_other_hyphae
    }

    pub fn is_over_biomass(&self, id: NodeId) -> bool {
        self.same_biomass_degree(id) > self.profile(id).ideal_biomass
    }

    pub fn is_under_biomass(&self, id: NodeId) -> bool {
        self.same_biomass_degree(id) < self.profile(id).ideal_biomass
    }

    /// Surplus of same-kind biomass over the target; negative when under.
    pub fn amount_over_biomass(&self, id: NodeId) -> isize {
        self.same_biomass_degree(id) as isize - self.profile(id).ideal_biomass as isize
    }

    /// Deficit of same-kind biomass under the target; negative when over.
    pub fn amount_under_biomass(&self, id: NodeId) -> isize {
        -self.amount_over_biomass(id)
    }

    pub fn amount_over_same_hyphae(&self, id: NodeId) -> isize {
        self.same_hypha_degree(id) as isize - self.profile(id).ideal_hyphae as isize
    }

    pub fn amount_under_same_hyphae(&self, id: NodeId) -> isize {
        -self.amount_over_same_hyphae(id)
    }

    /// Nodes reachable through a hyphal neighbor, excluding `id` and its
    /// direct neighbors. Sorted by id.
    pub fn two_hop_neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let direct = self.links(id);
        let mut frontier = BTreeSet::new();
        for h in self.hyphae(id) {
            frontier.extend(self.links(h).iter());
        }
        frontier
            .into_iter()
            .filter(|&n| n != id && !direct.contains(n))
            .collect()
    }

    /// Hyphal neighbors of `id` and everything linked to them, excluding
    /// `id`. Sorted by id.
    pub fn two_hop_neighborhood(&self, id: NodeId) -> Vec<NodeId> {
        let mut reach = BTreeSet::new();
        for h in self.hyphae(id) {
            reach.insert(h);
            reach.extend(self.links(h).iter());
        }
        reach.remove(&id);
        reach.into_iter().collect()
    }
}
