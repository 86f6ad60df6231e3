//! # Seeded Random Stream
//!
//! A 31-bit Lehmer generator (`next = 48271 * state mod (2^31 - 1)`).
//!
//! ## Determinism Guarantee
//!
//! Every stochastic decision of the generator draws from a `Random` passed
//! by reference. The *order* of draws is part of the reproducibility
//! contract: reordering two calls changes the city even for the same seed.
//!
//! ## Checkpoints
//!
//! `save()`/`restore()` form a stack, so a stage can peek ahead without
//! perturbing the caller even when checkpoints nest. Subsystems that should
//! not share a stream at all use [`Random::derive`].

/// Modulus of the generator, `2^31 - 1`.
pub const MODULUS: u32 = 2_147_483_647;

/// Multiplier of the generator.
pub const MULTIPLIER: u64 = 48_271;

/// Seeded uniform random stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Random {
    /// Current state, always in `1..MODULUS`.
    seed: u32,
    /// Saved states, innermost last.
    saved: Vec<u32>,
}

impl Random {
    /// Creates a stream from a seed. Seed `0` requests an entropy seed.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        let seed = seed % MODULUS;
        if seed == 0 {
            Self::from_entropy()
        } else {
            Self { seed, saved: Vec::new() }
        }
    }

    /// Creates a stream seeded from system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        let seed = rand::random::<u32>() % (MODULUS - 1) + 1;
        Self { seed, saved: Vec::new() }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Steps the generator and returns the new state.
    #[inline]
    pub fn next_seed(&mut self) -> u32 {
        self.seed = ((MULTIPLIER * u64::from(self.seed)) % u64::from(MODULUS)) as u32;
        self.seed
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn float(&mut self) -> f64 {
        f64::from(self.next_seed()) / f64::from(MODULUS)
    }

    /// `true` with probability `chance`.
    #[inline]
    pub fn bool(&mut self, chance: f64) -> bool {
        self.float() < chance
    }

    /// Integer in `[min, max)`.
    #[inline]
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        (f64::from(min) + self.float() * f64::from(max - min)).floor() as i32
    }

    /// Mean of three draws, a bell-shaped value in `[0, 1)`.
    #[inline]
    pub fn avg3(&mut self) -> f64 {
        (self.float() + self.float() + self.float()) / 3.0
    }

    /// `sum of four draws / 2 - 1`, a bell-shaped value in `[-1, 1)`.
    #[inline]
    pub fn spread4(&mut self) -> f64 {
        (self.float() + self.float() + self.float() + self.float()) / 2.0 - 1.0
    }

    // =========================================================================
    // CHECKPOINTS
    // =========================================================================

    /// Pushes the current state.
    pub fn save(&mut self) {
        self.saved.push(self.seed);
    }

    /// Pops the innermost saved state. Without a saved state nothing happens.
    pub fn restore(&mut self) {
        if let Some(seed) = self.saved.pop() {
            self.seed = seed;
        }
    }

    /// Current state as a token for [`Random::reset_to`].
    #[inline]
    #[must_use]
    pub const fn checkpoint(&self) -> u32 {
        self.seed
    }

    /// Jumps to a state obtained from [`Random::checkpoint`] or a stored seed.
    pub fn reset_to(&mut self, seed: u32) {
        let seed = seed % MODULUS;
        self.seed = if seed == 0 { 1 } else { seed };
    }

    /// Independent stream for a purpose, leaving `self` untouched.
    #[must_use]
    pub fn derive(&self, purpose: u64) -> Self {
        let mut hash = u64::from(self.seed);
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        let seed = (hash % u64::from(MODULUS - 1)) as u32 + 1;
        Self { seed, saved: Vec::new() }
    }

    // =========================================================================
    // COLLECTIONS
    // =========================================================================

    /// Random index below `len`.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let i = (self.float() * len as f64) as usize;
        Some(i.min(len - 1))
    }

    /// Random element of a slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).map(|i| &items[i])
    }

    /// Removes and returns a random element.
    pub fn take<T>(&mut self, items: &mut Vec<T>) -> Option<T> {
        self.index(items.len()).map(|i| items.remove(i))
    }

    /// Index drawn proportionally to non-negative weights.
    ///
    /// Returns `None` when every weight is zero.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let target = self.float() * total;
        let mut acc = 0.0;
        let mut last = None;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            acc += w;
            last = Some(i);
            if target < acc {
                return Some(i);
            }
        }
        last
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = ((self.float() * (i + 1) as f64) as usize).min(i);
            items.swap(i, j);
        }
    }

    /// Random subset of at most `n` elements.
    pub fn subset<T: Clone>(&mut self, items: &[T], n: usize) -> Vec<T> {
        let mut all = items.to_vec();
        self.shuffle(&mut all);
        all.truncate(n);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lehmer_sequence() {
        let mut rng = Random::new(1);
        assert_eq!(rng.next_seed(), 48_271);
        assert_eq!(rng.next_seed(), 182_605_794);
    }

    #[test]
    fn test_float_range() {
        let mut rng = Random::new(12345);
        for _ in 0..10_000 {
            let f = rng.float();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_nested_checkpoints() {
        let mut rng = Random::new(7);
        rng.save();
        let a = rng.float();
        rng.save();
        let _ = rng.float();
        rng.restore();
        let b = rng.float();
        rng.restore();
        let c = rng.float();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_derive_is_independent() {
        let rng = Random::new(99);
        let mut a = rng.derive(1);
        let mut b = rng.derive(2);
        assert_ne!(a.float(), b.float());
        assert_eq!(rng.seed(), 99);
        assert_eq!(rng.derive(1), Random::new(99).derive(1));
    }

    #[test]
    fn test_weighted_skips_zero() {
        let mut rng = Random::new(3);
        for _ in 0..200 {
            let i = rng.weighted_index(&[0.0, 1.0, 0.0, 2.0]).unwrap();
            assert!(i == 1 || i == 3);
        }
        assert_eq!(rng.weighted_index(&[0.0, 0.0]), None);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = Random::new(5);
        let mut items: Vec<u32> = (0..50).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }
}
