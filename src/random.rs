//! Injectable randomness for the simulated providers.
//!
//! Production scoring uses [`NumberSeededRandom`], which derives a fresh RNG
//! from `(seed, key)` so the same number always draws the same values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub trait RandomSource: Send + Sync {
    /// A value in `0..bound` for the given key. `bound` must be non-zero.
    fn below(&self, key: &str, bound: u32) -> u32;
}

#[derive(Debug, Clone, Default)]
pub struct NumberSeededRandom {
    seed: u64,
}

impl NumberSeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl RandomSource for NumberSeededRandom {
    fn below(&self, key: &str, bound: u32) -> u32 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());
        rng.gen_range(0..bound.max(1))
    }
}

/// Always returns the same value, capped to the bound
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub u32);

impl RandomSource for FixedRandom {
    fn below(&self, _key: &str, bound: u32) -> u32 {
        self.0.min(bound.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_random_is_stable_per_key() {
        let random = NumberSeededRandom::new(42);
        let first = random.below("+33611223344/spam", 30);
        for _ in 0..10 {
            assert_eq!(random.below("+33611223344/spam", 30), first);
        }
        assert!(first < 30);
    }

    #[test]
    fn test_bounds_respected() {
        let seeded = NumberSeededRandom::new(7);
        for i in 0..200 {
            assert!(seeded.below(&format!("key-{i}"), 10) < 10);
        }
        assert_eq!(FixedRandom(50).below("x", 30), 29);
        assert_eq!(FixedRandom(3).below("x", 30), 3);
        assert_eq!(FixedRandom(3).below("x", 0), 0);
    }
}
