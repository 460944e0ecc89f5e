//! Seedable randomness for combat rolls.
//!
//! Every probabilistic decision in a battle (crit, effect trigger, damage
//! jitter, random targeting, starting initiative) goes through the [`Dice`]
//! trait. The battle owns a [`BattleRng`], a ChaCha8 stream that serializes
//! with the battle state, so a server can replay any battle from its seed and
//! its action log and get the same numbers.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Source of combat randomness.
///
/// Implementations must be deterministic for a given construction so that a
/// battle can be replayed.
pub trait Dice {
    /// Bernoulli trial succeeding with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool;

    /// Uniform value in `[low, high)`; returns `low` when the range is empty.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Uniform index in `0..len`; returns 0 when `len` is 0.
    fn pick(&mut self, len: usize) -> usize;

    /// Uniform integer in `0..=max`.
    fn up_to(&mut self, max: u32) -> u32;
}

/// The battle's random stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl BattleRng {
    /// Creates a stream from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Returns the seed the stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of 32-bit words consumed so far.
    ///
    /// Two streams from the same seed at the same position produce the same
    /// future rolls.
    #[must_use]
    pub fn position(&self) -> u128 {
        self.rng.get_word_pos()
    }
}

impl Dice for BattleRng {
    fn chance(&mut self, p: f64) -> bool {
        let roll: f64 = self.rng.gen();
        roll < p.clamp(0.0, 1.0)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            self.rng.gen_range(low..high)
        } else {
            low
        }
    }

    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.rng.gen_range(0..len)
        }
    }

    fn up_to(&mut self, max: u32) -> u32 {
        self.rng.gen_range(0..=max)
    }
}
