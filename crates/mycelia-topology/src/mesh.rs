//! Node arena and the bidirectional link primitives.
//!
//! # Design
//!
//! Nodes live in a `Vec` addressed by [`NodeId`]; link sets hold ids, never
//! references, so the mutually-linked graph has no ownership cycles. Every
//! primitive here updates both endpoints of a link before returning, which
//! keeps link symmetry intact after any sequence of calls.
//!
//! Primitives that can refuse (transfer, absorb, swap, capacity-gated
//! growth) return [`LinkError`] and leave the mesh untouched. Callers inside
//! a node's turn log the refusal and move on.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::directory::HYPHAL;
use crate::error::Result;
use crate::{AlertSignal, Directory, LinkError, LinkSet, MeshEvent, NodeProfile, Role};

/// Stable index of a node in its [`Mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Per-node memory of the alert controllers.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlState {
    /// Consecutive cycles a pending role switch has been requested
    pub switch_attempts: u32,
    /// Role held before the last promotion to `Bulwark`
    pub prior_role: Option<Role>,
    /// Cycles since the last transition into or out of `Bulwark`
    pub elapsed: u64,
    /// Role observed by the reverter on the previous cycle
    pub last_role: Option<Role>,
}

/// One member of the mesh.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) links: LinkSet,
    pub(crate) profile: NodeProfile,
    pub(crate) signal: Option<AlertSignal>,
    pub(crate) control: ControlState,
}

impl Node {
    pub fn links(&self) -> &LinkSet {
        &self.links
    }

    pub fn profile(&self) -> &NodeProfile {
        &self.profile
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn is_up(&self) -> bool {
        self.profile.role.is_live()
    }

    pub fn signal(&self) -> Option<&AlertSignal> {
        self.signal.as_ref()
    }

    pub fn control(&self) -> &ControlState {
        &self.control
    }
}

/// What the former neighbors of a failed node need to know.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureNotice {
    pub node: NodeId,
    /// Role held at the moment of failure
    pub role: Role,
    /// Degree at the moment of failure
    pub degree: usize,
    pub neighbors: Vec<NodeId>,
}

/// The overlay: node arena, role directory and change journal.
#[derive(Debug, Clone)]
pub struct Mesh {
    nodes: Vec<Node>,
    directory: Directory,
    events: Vec<MeshEvent>,
    record_events: bool,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            directory: Directory::new(),
            events: Vec::new(),
            record_events: true,
        }
    }

    /// Admit a node as biomass and register it in the directory.
    pub fn add_node(&mut self, mut profile: NodeProfile) -> NodeId {
        profile.role = Role::Biomass;
        let id = NodeId(self.nodes.len());
        let capacity = profile.capacity;
        self.nodes.push(Node {
            links: LinkSet::new(),
            profile,
            signal: None,
            control: ControlState::default(),
        });
        self.directory.register(id, Role::Biomass);
        trace!("{} joined with capacity {}", id, capacity);
        self.record(MeshEvent::NodeJoined { node: id, capacity });
        id
    }

    /// Number of nodes ever admitted, dead ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this mesh.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Ids of every node that has not failed.
    pub fn live_nodes(&self) -> Vec<NodeId> {
        self.ids().filter(|&id| self.is_up(id)).collect()
    }

    pub fn profile(&self, id: NodeId) -> &NodeProfile {
        &self.node(id).profile
    }

    /// Mutable targets and flags. The role is not reachable from here; use
    /// [`Mesh::become_role`].
    pub fn profile_mut(&mut self, id: NodeId) -> &mut NodeProfile {
        &mut self.node_mut(id).profile
    }

    pub fn control(&self, id: NodeId) -> &ControlState {
        &self.node(id).control
    }

    pub fn control_mut(&mut self, id: NodeId) -> &mut ControlState {
        &mut self.node_mut(id).control
    }

    pub fn role(&self, id: NodeId) -> Role {
        self.node(id).role()
    }

    pub fn is_up(&self, id: NodeId) -> bool {
        self.node(id).is_up()
    }

    pub fn links(&self, id: NodeId) -> &LinkSet {
        &self.node(id).links
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut Directory {
        &mut self.directory
    }

    /// Repair the directory entry of `id` against its profile.
    pub fn verify_directory(&mut self, id: NodeId) -> bool {
        let role = self.role(id);
        self.directory.verify(id, role)
    }

    /// The single role mutator. Updates the directory and journals the
    /// change before returning the previous role. `Dead` is absorbing.
    pub fn become_role(&mut self, id: NodeId, role: Role) -> Role {
        let old = self.role(id);
        if old == role {
            self.directory.verify(id, role);
            return old;
        }
        if old == Role::Dead {
            debug!("{} is dead, ignoring change to {}", id, role);
            return old;
        }
        self.node_mut(id).profile.role = role;
        self.directory.register(id, role);
        trace!("{} becomes {} (was {})", id, role, old);
        self.record(MeshEvent::RoleChanged { node: id, role, old });
        old
    }

    pub fn are_linked(&self, a: NodeId, b: NodeId) -> bool {
        self.links(a).contains(b)
    }

    /// Link `a` and `b` on both sides.
    pub fn try_link(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        if a == b {
            return Err(LinkError::SelfLink(a));
        }
        for n in [a, b] {
            if !self.is_up(n) {
                return Err(LinkError::NodeDown(n));
            }
        }
        if self.are_linked(a, b) {
            return Err(LinkError::AlreadyLinked { a, b });
        }
        self.node_mut(a).links.insert(b);
        self.node_mut(b).links.insert(a);
        trace!("link {} <-> {}", a, b);
        self.record(MeshEvent::LinkAdded { a, b });
        Ok(())
    }

    /// Link `a` and `b`; a self link, a duplicate or a dead endpoint is a
    /// silent no-op. Returns true if a link was created.
    pub fn add_neighbor(&mut self, a: NodeId, b: NodeId) -> bool {
        self.try_link(a, b).is_ok()
    }

    /// Link on a growth path: refused when either endpoint already holds as
    /// many links, biomass included, as its capacity allows.
    pub fn grow_link(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        for n in [a, b] {
            let degree = self.degree(n);
            let capacity = self.profile(n).capacity;
            if degree >= capacity {
                return Err(LinkError::AtCapacity {
                    node: n,
                    degree,
                    capacity,
                });
            }
        }
        self.try_link(a, b)
    }

    /// Unlink `a` and `b` on both sides. Returns true if they were linked.
    pub fn remove_neighbor(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        let removed = self.node_mut(a).links.remove(b);
        let mirrored = self.node_mut(b).links.remove(a);
        if removed || mirrored {
            trace!("unlink {} <-> {}", a, b);
            self.record(MeshEvent::LinkRemoved { a, b });
        }
        removed || mirrored
    }

    /// Drop every link of `id`, returning the former neighbors.
    pub fn sever_all(&mut self, id: NodeId) -> Vec<NodeId> {
        let former = self.links(id).to_vec();
        for &n in &former {
            self.remove_neighbor(id, n);
        }
        former
    }

    /// Move `neighbor` from `owner` to `new_owner`.
    ///
    /// Refused, leaving everything in place, if `neighbor` is `new_owner`,
    /// is not linked to `owner`, or is already linked to `new_owner`.
    pub fn transfer_neighbor(&mut self, owner: NodeId, neighbor: NodeId, new_owner: NodeId) -> Result<()> {
        let check = if neighbor == new_owner {
            Err(LinkError::SelfTransfer { owner, neighbor })
        } else if !self.are_linked(owner, neighbor) {
            Err(LinkError::NotLinked { a: owner, b: neighbor })
        } else if !self.is_up(new_owner) {
            Err(LinkError::NodeDown(new_owner))
        } else if self.are_linked(neighbor, new_owner) {
            Err(LinkError::AlreadyLinked { a: neighbor, b: new_owner })
        } else {
            Ok(())
        };
        if let Err(e) = check {
            debug!("{} transfer of {} to {} refused: {}", owner, neighbor, new_owner, e);
            return Err(e);
        }
        self.remove_neighbor(owner, neighbor);
        trace!("{} transfers {} to {}", owner, neighbor, new_owner);
        self.try_link(neighbor, new_owner)
    }

    /// Detach `neighbor` from `from` and make sure it is linked to `to`.
    fn rehome(&mut self, from: NodeId, neighbor: NodeId, to: NodeId) {
        self.remove_neighbor(from, neighbor);
        if neighbor != to {
            self.add_neighbor(neighbor, to);
        }
    }

    /// Neighbors of `id` with hyphae first, then everything else.
    fn hyphae_first(&self, id: NodeId) -> Vec<NodeId> {
        let mut ordered = self.hyphae(id);
        ordered.extend(self.links(id).iter().filter(|&n| !self.role(n).is_hyphal()));
        ordered
    }

    /// Take over every neighbor of `target` and demote it to biomass.
    ///
    /// `target` ends with no links at all. Returns the number of neighbors
    /// moved onto `owner`.
    pub fn absorb_hypha(&mut self, owner: NodeId, target: NodeId) -> Result<usize> {
        if owner == target {
            return Err(LinkError::SelfLink(owner));
        }
        for n in [owner, target] {
            if !self.is_up(n) {
                return Err(LinkError::NodeDown(n));
            }
        }
        if self.role(target) == Role::Biomass {
            debug!("{} tried to absorb biomass node {}", owner, target);
            return Err(LinkError::AbsorbBiomass { owner, target });
        }
        trace!("{} ({}) absorbs {} ({})", owner, self.role(owner), target, self.role(target));

        let mut moved = 0;
        for n in self.hyphae_first(target) {
            if n != owner {
                self.rehome(target, n, owner);
                moved += 1;
            }
        }
        self.remove_neighbor(owner, target);
        self.become_role(target, Role::Biomass);
        Ok(moved)
    }

    /// Hand every neighbor and the current role of `owner` to `target`;
    /// `owner` becomes biomass attached to `target`.
    pub fn swap_hyphae(&mut self, owner: NodeId, target: NodeId) -> Result<()> {
        if owner == target {
            return Err(LinkError::SelfLink(owner));
        }
        for n in [owner, target] {
            if !self.is_up(n) {
                return Err(LinkError::NodeDown(n));
            }
        }
        debug!("{} swaps with {}", owner, target);
        for n in self.hyphae_first(owner) {
            if n != target {
                self.rehome(owner, n, target);
            }
        }
        self.add_neighbor(owner, target);
        let role = self.role(owner);
        self.become_role(target, role);
        self.become_role(owner, Role::Biomass);
        Ok(())
    }

    /// Highest-capacity same-kind biomass neighbor of `owner`. Capacity
    /// must be strictly positive; ties keep the earliest link.
    pub fn max_biomass(&self, owner: NodeId) -> Option<NodeId> {
        let kind = self.profile(owner).kind;
        let mut best: Option<(NodeId, usize)> = None;
        for n in self.links(owner).iter() {
            let p = self.profile(n);
            if p.role != Role::Biomass || p.kind != kind {
                continue;
            }
            if p.capacity > best.map_or(0, |(_, c)| c) {
                best = Some((n, p.capacity));
            }
        }
        best.map(|(n, _)| n)
    }

    /// Promote the best biomass neighbor of `owner` to `Extending`.
    pub fn grow_hypha(&mut self, owner: NodeId) -> Option<NodeId> {
        let grown = self.max_biomass(owner)?;
        trace!("{} grows hypha into {}", owner, grown);
        self.become_role(grown, Role::Extending);
        Some(grown)
    }

    /// Move up to `quantity` biomass neighbors from `owner` to `target`.
    /// Returns how many actually moved.
    pub fn transfer_biomass(&mut self, owner: NodeId, target: NodeId, quantity: usize) -> usize {
        let mut moved = 0;
        for b in self.biomass(owner) {
            if moved >= quantity {
                break;
            }
            if self.transfer_neighbor(owner, b, target).is_ok() {
                moved += 1;
            }
        }
        if moved > 0 {
            debug!("{} transferred {} biomass to {}", owner, moved, target);
        }
        moved
    }

    /// First hyphal neighbor of a biomass node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        if self.role(id) != Role::Biomass {
            return None;
        }
        let hyphae = self.hyphae(id);
        if hyphae.len() > 1 {
            trace!("{} has {} hyphal parents", id, hyphae.len());
        }
        hyphae.first().copied()
    }

    /// Degree strictly below `capacity * multiplier`.
    pub fn within_capacity(&self, id: NodeId, multiplier: f64) -> bool {
        (self.degree(id) as f64) < self.profile(id).capacity as f64 * multiplier
    }

    fn attachable_from<R: Rng + ?Sized>(
        &self,
        mut candidates: Vec<NodeId>,
        multiplier: f64,
        seeker: NodeId,
        rng: &mut R,
    ) -> Option<NodeId> {
        let kind = self.profile(seeker).kind;
        candidates.shuffle(rng);
        candidates.into_iter().find(|&n| {
            n != seeker && self.profile(n).kind == kind && self.within_capacity(n, multiplier)
        })
    }

    /// Random same-kind `Extending` node with spare capacity, for `seeker`
    /// to attach to.
    pub fn foraging_hypha<R: Rng + ?Sized>(&self, seeker: NodeId, rng: &mut R) -> Option<NodeId> {
        let candidates = self.directory.members(Role::Extending).collect();
        self.attachable_from(candidates, crate::FORAGING_MULTIPLIER, seeker, rng)
    }

    /// Random same-kind hyphal node whose degree is below 105% of its
    /// capacity.
    pub fn attachable_hypha<R: Rng + ?Sized>(&self, seeker: NodeId, rng: &mut R) -> Option<NodeId> {
        let candidates = HYPHAL
            .iter()
            .flat_map(|&r| self.directory.members(r))
            .collect();
        self.attachable_from(candidates, crate::ATTACHABLE_MULTIPLIER, seeker, rng)
    }

    /// Sever every link of `id`, mark it dead and drop its signal.
    /// Returns `None` if it was already dead.
    pub fn kill(&mut self, id: NodeId) -> Option<FailureNotice> {
        if !self.is_up(id) {
            return None;
        }
        let role = self.role(id);
        let degree = self.degree(id);
        debug!("{} ({}) has been killed", id, role);
        self.record(MeshEvent::NodeFailed { node: id, role, degree });
        let neighbors = self.sever_all(id);
        self.become_role(id, Role::Dead);
        self.wipe_signal(id);
        Some(FailureNotice {
            node: id,
            role,
            degree,
            neighbors,
        })
    }

    /// Stop or resume journaling events.
    pub fn set_event_recording(&mut self, on: bool) {
        self.record_events = on;
    }

    pub fn events(&self) -> &[MeshEvent] {
        &self.events
    }

    /// Take every journaled event, oldest first.
    pub fn drain_events(&mut self) -> Vec<MeshEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: MeshEvent) {
        if self.record_events {
            self.events.push(event);
        }
    }
}
