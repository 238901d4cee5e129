//! Structural invariant checks.

use std::collections::BTreeSet;

use crate::{InvariantViolation, Mesh};

impl Mesh {
    /// Verify link symmetry, the absence of self-loops, duplicates and
    /// links to dead nodes, and directory agreement with every profile.
    /// Reports the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for id in self.ids() {
            let node = self.node(id);
            let mut seen = BTreeSet::new();
            for n in node.links().iter() {
                if n == id {
                    return Err(InvariantViolation::SelfLoop(id));
                }
                if !seen.insert(n) {
                    return Err(InvariantViolation::DuplicateLink { node: id, neighbor: n });
                }
                let other = self.node(n);
                if !other.links().contains(id) {
                    return Err(InvariantViolation::AsymmetricLink { a: id, b: n });
                }
                if node.is_up() && !other.is_up() {
                    return Err(InvariantViolation::DeadLinked { node: id, dead: n });
                }
            }
            let recorded = self.directory().role_of(id);
            let expected = node.is_up().then(|| node.role());
            if recorded != expected {
                return Err(InvariantViolation::DirectoryMismatch {
                    node: id,
                    recorded,
                    actual: node.role(),
                });
            }
        }
        Ok(())
    }
}
