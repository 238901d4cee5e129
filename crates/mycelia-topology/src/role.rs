//! Structural roles.
//!
//! Every node holds exactly one role. `Extending`, `Branching` and
//! `Immobile` are the hyphal roles other nodes attach to; `Branching` and
//! `Immobile` are additionally stable. `Bulwark` is the protective overlay
//! role and `Dead` is absorbing.

use std::fmt;

/// Role of a node in the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// Leaf capacity attached to a hypha
    #[default]
    Biomass,
    /// Transient branch tip
    Extending,
    /// Stable branch with room for more hyphal links
    Branching,
    /// Stable branch at its hyphal target
    Immobile,
    /// Temporary protective role adopted under alert
    Bulwark,
    /// Failed node
    Dead,
}

impl Role {
    /// Every role a live node can hold, in directory slot order.
    pub const LIVE: [Role; 5] = [
        Role::Biomass,
        Role::Extending,
        Role::Branching,
        Role::Immobile,
        Role::Bulwark,
    ];

    /// `Extending`, `Branching` or `Immobile`.
    pub const fn is_hyphal(self) -> bool {
        matches!(self, Role::Extending | Role::Branching | Role::Immobile)
    }

    /// `Branching` or `Immobile`.
    pub const fn is_stable(self) -> bool {
        matches!(self, Role::Branching | Role::Immobile)
    }

    pub const fn is_live(self) -> bool {
        !matches!(self, Role::Dead)
    }

    /// Index of this role's directory set, `None` for `Dead`.
    pub(crate) const fn slot(self) -> Option<usize> {
        match self {
            Role::Biomass => Some(0),
            Role::Extending => Some(1),
            Role::Branching => Some(2),
            Role::Immobile => Some(3),
            Role::Bulwark => Some(4),
            Role::Dead => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Role::Biomass => "biomass",
            Role::Extending => "extending",
            Role::Branching => "branching",
            Role::Immobile => "immobile",
            Role::Bulwark => "bulwark",
            Role::Dead => "dead",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
