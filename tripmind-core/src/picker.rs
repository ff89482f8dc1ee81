//! Choosing one move out of the legal set.
//!
//! The session only needs a uniformly sampled legal move; smarter policies plug
//! in through [`MovePicker`].

use crate::moves::LegalMove;
use crate::state::WorldGraph;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Move-selection policy.
///
/// `moves` is the full legal set for the current prompt. Returning `None`
/// passes. Implementations must be deterministic given the same RNG seed.
pub trait MovePicker: Send {
    fn pick<'m>(&mut self, graph: &WorldGraph, moves: &'m [LegalMove]) -> Option<&'m LegalMove>;
}

/// Uniform random choice.
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl MovePicker for RandomPicker {
    fn pick<'m>(&mut self, _graph: &WorldGraph, moves: &'m [LegalMove]) -> Option<&'m LegalMove> {
        moves.choose(&mut self.rng)
    }
}
