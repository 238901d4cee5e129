//! Per-node targets and failure-detection state.

use crate::Role;

/// Parameters shared by every node profile built from configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProfileConfig {
    /// Target hyphal-neighbor count
    pub ideal_hyphae: usize,
    /// Target hyphal-neighbor count of other kinds
    pub ideal_other_hyphae: usize,
    /// Link budget used when no per-node capacity is supplied
    pub max_capacity: usize,
    /// Lower degree bound while in `Bulwark`
    pub bulwark_min: usize,
    /// Upper degree bound while in `Bulwark`
    pub bulwark_max: usize,
    /// Initial adaptive reversion delay
    pub reversion_delay: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            ideal_hyphae: 5,
            ideal_other_hyphae: 3,
            max_capacity: 15,
            bulwark_min: 2,
            bulwark_max: 6,
            reversion_delay: 3.0,
        }
    }
}

impl ProfileConfig {
    /// Build a profile with the configured default capacity.
    pub fn profile(&self) -> NodeProfile {
        self.profile_with_capacity(self.max_capacity)
    }

    /// Build a profile with an explicit capacity.
    pub fn profile_with_capacity(&self, capacity: usize) -> NodeProfile {
        NodeProfile {
            capacity,
            ideal_hyphae: self.ideal_hyphae,
            ideal_biomass: capacity,
            ideal_other_hyphae: self.ideal_other_hyphae,
            bulwark_min: self.bulwark_min,
            bulwark_max: self.bulwark_max,
            parent_target: 1.0,
            bulwark_entries: 0,
            reversion_delay: self.reversion_delay.max(0.0),
            role: Role::Biomass,
            kind: 0,
            disconnect_detected: false,
            failure_detected: false,
            known_disconnect: 0.0,
            observed_parents: 0,
        }
    }
}

/// Targets, role and failure flags of a single node.
///
/// `role` is only written by [`crate::Mesh::become_role`]; everything else
/// is owned by the behaviour layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeProfile {
    pub capacity: usize,
    pub ideal_hyphae: usize,
    /// Derived from `capacity`
    pub ideal_biomass: usize,
    pub ideal_other_hyphae: usize,
    pub bulwark_min: usize,
    pub bulwark_max: usize,
    parent_target: f64,
    pub bulwark_entries: u32,
    pub reversion_delay: f64,
    pub(crate) role: Role,
    /// Node type for multi-kind meshes
    pub kind: u16,
    pub disconnect_detected: bool,
    /// Set when a neighbor failure left this node without links; consumed
    /// by parent-target adaptation
    pub failure_detected: bool,
    /// Largest parent target announced by a reconnecting neighbor
    pub known_disconnect: f64,
    /// Hyphal neighbors seen at the end of the node's last turn
    pub observed_parents: u32,
}

impl NodeProfile {
    pub fn role(&self) -> Role {
        self.role
    }

    /// Change capacity, re-deriving the biomass target.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.ideal_biomass = capacity;
    }

    /// Desired stable-parent count, never below 1.
    pub fn parent_target(&self) -> f64 {
        self.parent_target
    }

    /// Set the parent target, clamped to at least 1.
    pub fn set_parent_target(&mut self, target: f64) {
        self.parent_target = if target.is_finite() { target.max(1.0) } else { 1.0 };
    }

    /// Keep the larger of the recorded and announced disconnect magnitude.
    pub fn record_known_disconnect(&mut self, parents: f64) {
        self.known_disconnect = self.known_disconnect.max(parents);
    }

    pub fn clear_known_disconnect(&mut self) {
        self.known_disconnect = 0.0;
    }
}

impl Default for NodeProfile {
    fn default() -> Self {
        ProfileConfig::default().profile()
    }
}
