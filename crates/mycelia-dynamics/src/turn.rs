//! What a strategy gets to work with during one node's turn.

use mycelia_topology::{Mesh, SignalParams};
use rand::rngs::StdRng;

/// Exclusive access to the mesh and the engine RNG for the duration of a
/// single node's turn. Nothing else runs until the turn ends, and the turn
/// must leave links symmetric.
pub struct Turn<'a> {
    pub mesh: &'a mut Mesh,
    pub rng: &'a mut StdRng,
    pub signal: &'a SignalParams,
}

impl<'a> Turn<'a> {
    pub fn new(mesh: &'a mut Mesh, rng: &'a mut StdRng, signal: &'a SignalParams) -> Self {
        Self { mesh, rng, signal }
    }
}
