//! Deterministic utilities for reproducible training
//!
//! Provides a seedable LCG, per-stream seed mixing and split tie-breaking so
//! that the same dataset and seed always produce the same forest, however
//! many threads grow it.

use std::num::Wrapping;

/// 64-bit Linear Congruential Generator (Knuth MMIX constants).
///
/// Only the high 32 bits of the state are handed out; the low bits of a
/// power-of-two LCG have short periods.
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: Wrapping(mix_seed(seed, 0)),
        };
        rng.next_u32();
        rng
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        (self.state.0 >> 32) as u32
    }

    /// Uniform value in `[0, max)`; 0 when `max == 0`.
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as usize
    }

    /// In-place Fisher–Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_range(i + 1);
            items.swap(i, j);
        }
    }
}

/// Derive an independent seed for `stream` (e.g. a tree index) from a base
/// seed, using xxhash64-style avalanche mixing.
pub fn mix_seed(seed: u64, stream: u64) -> u64 {
    const PRIME1: u64 = 0x9E3779B185EBCA87;
    const PRIME2: u64 = 0xC2B2AE3D27D4EB4F;
    const PRIME3: u64 = 0x165667B19E3779F9;
    const PRIME5: u64 = 0x85EBCA77C2B2AE63;

    let mut h = seed.wrapping_add(PRIME5);
    h = h.wrapping_add(stream.wrapping_mul(PRIME3));
    h = h.rotate_left(17).wrapping_mul(PRIME2);

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME1);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 32;

    h
}

/// Ordering key for equal-gain split candidates: the lower feature index
/// wins, then the lower threshold position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub position: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, position: usize) -> Self {
        Self {
            feature_idx,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_determinism() {
        let mut rng1 = LcgRng::new(42);
        let mut rng2 = LcgRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_lcg_range() {
        let mut rng = LcgRng::new(42);
        let mut seen = [false; 10];
        for _ in 0..1000 {
            let val = rng.next_range(10);
            assert!(val < 10);
            seen[val] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = LcgRng::new(7);
        let mut items: Vec<usize> = (0..50).collect();
        rng.shuffle(&mut items);

        assert_ne!(items, (0..50).collect::<Vec<_>>());
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_mix_seed_streams_differ() {
        assert_eq!(mix_seed(42, 3), mix_seed(42, 3));
        assert_ne!(mix_seed(42, 3), mix_seed(42, 4));
        assert_ne!(mix_seed(42, 3), mix_seed(43, 3));
    }

    #[test]
    fn test_tie_breaker_ordering() {
        let t1 = SplitTieBreaker::new(0, 5);
        let t2 = SplitTieBreaker::new(0, 6);
        let t3 = SplitTieBreaker::new(1, 0);

        assert!(t1 < t2);
        assert!(t1 < t3);
        assert!(t2 < t3);
    }
}
