//! Seeded randomness for contexts and playouts.
//!
//! A context's `GameRng` drives stochastic rules; a playout engine keeps its
//! own for move selection, so sampling never shifts the game's stream.
//!
//! Checkpoints ([`GameRngState`]) are the seed plus the ChaCha8 word
//! position. Trials keep the one taken at game start for replay, and the
//! undo stack keeps one per ply.
//!
//! ```
//! use ludeme_sim::core::GameRng;
//!
//! let mut rng = GameRng::new(7);
//! let checkpoint = rng.state();
//! let first = rng.gen_range_usize(0..1000);
//!
//! let mut restored = GameRng::from_state(&checkpoint);
//! assert_eq!(restored.gen_range_usize(0..1000), first);
//! ```

use std::ops::Range;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// ChaCha8 stream that remembers its seed.
#[derive(Clone, Debug)]
pub struct GameRng {
    seed: u64,
    stream: ChaCha8Rng,
}

/// Where a [`GameRng`] stands: enough to rebuild it exactly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    pub word_pos: u128,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            stream: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Rebuild the generator at a checkpoint.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut rng = Self::new(state.seed);
        rng.stream.set_word_pos(state.word_pos);
        rng
    }

    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.stream.get_word_pos(),
        }
    }

    /// Uniform index in `range`.
    pub fn gen_range_usize(&mut self, range: Range<usize>) -> usize {
        self.stream.gen_range(range)
    }

    #[must_use]
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.stream)
    }

    /// Index drawn with probability proportional to its weight. Non-positive
    /// weights are never drawn; `None` when no weight is positive.
    pub fn choose_weighted(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().copied().filter(|w| *w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }

        let mut remaining = self.stream.gen::<f32>() * total;
        let mut fallback = None;
        for (index, weight) in weights.iter().copied().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            remaining -= weight;
            if remaining <= 0.0 {
                return Some(index);
            }
            fallback = Some(index);
        }
        // Float rounding can leave a sliver past the last positive weight.
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_fixes_stream() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);
        let xs: Vec<_> = (0..50).map(|_| a.gen_range_usize(0..1 << 20)).collect();
        let ys: Vec<_> = (0..50).map(|_| b.gen_range_usize(0..1 << 20)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_checkpoint_mid_stream() {
        let mut rng = GameRng::new(9);
        for _ in 0..37 {
            rng.gen_range_usize(0..100);
        }
        let checkpoint = rng.state();
        let expected: Vec<_> = (0..8).map(|_| rng.gen_range_usize(0..6)).collect();

        let mut restored = GameRng::from_state(&checkpoint);
        let actual: Vec<_> = (0..8).map(|_| restored.gen_range_usize(0..6)).collect();
        assert_eq!(expected, actual);
        assert_eq!(restored.state(), rng.state());
    }

    #[test]
    fn test_choose_weighted_skips_zero() {
        let mut rng = GameRng::new(3);
        for _ in 0..20 {
            assert_eq!(rng.choose_weighted(&[0.0, 5.0, 0.0]), Some(1));
        }
        assert_eq!(rng.choose_weighted(&[]), None);
        assert_eq!(rng.choose_weighted(&[0.0, -1.0]), None);
    }

    #[test]
    fn test_choose_empty() {
        let mut rng = GameRng::new(1);
        assert_eq!(rng.choose::<u8>(&[]), None);
        assert_eq!(rng.choose(&[4]), Some(&4));
    }

    #[test]
    fn test_checkpoint_json() {
        let state = GameRng::new(5).state();
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(serde_json::from_str::<GameRngState>(&json).unwrap(), state);
    }
}
