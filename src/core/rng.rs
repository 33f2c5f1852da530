//! Deterministic random number generation for pile shuffles.
//!
//! Judgment outcomes and draws come from the draw pile, so the only source
//! of randomness in a room is how that pile is shuffled. A room seeded with
//! the same value deals the same cards in the same order.
//!
//! ```
//! use rust_sgs::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! let mut pile_a = vec![1, 2, 3, 4, 5, 6];
//! let mut pile_b = pile_a.clone();
//! a.shuffle(&mut pile_a);
//! b.shuffle(&mut pile_b);
//! assert_eq!(pile_a, pile_b);
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded ChaCha8 generator owned by a single room.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    shuffles: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            shuffles: 0,
        }
    }

    /// Shuffle a pile in place.
    pub fn shuffle<T>(&mut self, pile: &mut [T]) {
        use rand::seq::SliceRandom;
        pile.shuffle(&mut self.inner);
        self.shuffles += 1;
    }

    /// Number of shuffles performed so far.
    #[must_use]
    pub fn shuffles(&self) -> u64 {
        self.shuffles
    }

    /// Capture the generator position for a room snapshot.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
            shuffles: self.shuffles,
        }
    }

    /// Restore a generator captured with [`GameRng::state`].
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
            shuffles: state.shuffles,
        }
    }
}

/// Serializable RNG position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed.
    pub seed: u64,
    /// ChaCha8 word position.
    pub word_pos: u128,
    /// Shuffle counter.
    pub shuffles: u64,
}
