//! Deterministic random number generation for random built-ins.
//!
//! Effects like `teleportRandom` and providers like `randomEmptyTile` draw
//! from the engine's [`RuleRng`]. Seeding it from
//! [`EngineConfig::seed`](super::EngineConfig) makes a replayed game take the
//! same random choices, and [`RuleRng::state`] lets the position in the
//! stream travel with an engine snapshot.
//!
//! ```
//! use variant_engine::RuleRng;
//!
//! let mut rng1 = RuleRng::new(7);
//! let mut rng2 = RuleRng::new(7);
//! let tiles = ["a1", "b2", "c3", "d4"];
//! assert_eq!(rng1.choose(&tiles), rng2.choose(&tiles));
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded ChaCha8 generator owned by one engine.
#[derive(Clone, Debug)]
pub struct RuleRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl RuleRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> RuleRngState {
        RuleRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &RuleRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state.
///
/// Uses the ChaCha8 word position, so saving is O(1) regardless of how many
/// numbers have been drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRngState {
    pub seed: u64,
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(rng: &mut RuleRng) -> usize {
        let values: Vec<usize> = (0..1000).collect();
        rng.choose(&values).copied().unwrap()
    }

    #[test]
    fn test_determinism() {
        let mut rng1 = RuleRng::new(42);
        let mut rng2 = RuleRng::new(42);

        for _ in 0..100 {
            assert_eq!(draw(&mut rng1), draw(&mut rng2));
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = RuleRng::new(1);
        let mut rng2 = RuleRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| draw(&mut rng1)).collect();
        let seq2: Vec<_> = (0..10).map(|_| draw(&mut rng2)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_choose() {
        let mut rng = RuleRng::new(42);
        let items = vec![1, 2, 3, 4, 5];

        let chosen = rng.choose(&items);
        assert!(items.contains(chosen.unwrap()));

        let empty: Vec<i32> = vec![];
        assert!(rng.choose(&empty).is_none());
    }

    #[test]
    fn test_state_round_trip() {
        let mut rng = RuleRng::new(42);
        for _ in 0..50 {
            draw(&mut rng);
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| draw(&mut rng)).collect();

        let mut restored = RuleRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| draw(&mut restored)).collect();

        assert_eq!(expected, actual);
    }
}
