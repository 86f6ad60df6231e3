//! # Perlin Noise
//!
//! Gradient noise used to roughen the coastline and thin out trees.
//!
//! ## Determinism Guarantee
//!
//! A noise field takes its permutation from a [`Random`] draw, so the
//! same stream position always produces the same field. Building a
//! [`FractalNoise`] consumes exactly one draw per octave.

use bastion_core::Random;

/// Pre-computed permutation table for noise.
///
/// 256 entries, doubled so that `perm[perm[x] + y]` never wraps.
struct PermutationTable {
    perm: [u8; 512],
}

impl PermutationTable {
    /// Identity permutation shuffled by a stream seeded with `seed`.
    fn new(seed: u32) -> Self {
        let mut perm = [0u8; 512];
        for (i, p) in perm.iter_mut().take(256).enumerate() {
            *p = i as u8;
        }
        let mut rng = Random::new(seed.max(1));
        rng.shuffle(&mut perm[..256]);
        for i in 0..256 {
            perm[256 + i] = perm[i];
        }
        Self { perm }
    }

    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }
}

/// One octave of 2D Perlin noise.
///
/// Coordinates are scaled by `grid` before sampling; the result is scaled
/// by `amplitude` and stays within `[-amplitude, amplitude]`.
pub struct PerlinNoise {
    table: PermutationTable,
    grid: f64,
    amplitude: f64,
}

impl PerlinNoise {
    /// Octave with its own permutation.
    #[must_use]
    pub fn new(seed: u32, grid: f64, amplitude: f64) -> Self {
        Self {
            table: PermutationTable::new(seed),
            grid,
            amplitude,
        }
    }

    /// Samples the octave.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x = wrap(x * self.grid);
        let y = wrap(y * self.grid);
        let xi = x.floor();
        let yi = y.floor();
        let (fx, fy) = (x - xi, y - yi);
        let (ix, iy) = (xi as usize & 255, yi as usize & 255);

        let u = fade(fx);
        let v = fade(fy);

        let aa = self.table.get(self.table.get(ix) + iy);
        let ab = self.table.get(self.table.get(ix) + iy + 1);
        let ba = self.table.get(self.table.get(ix + 1) + iy);
        let bb = self.table.get(self.table.get(ix + 1) + iy + 1);

        let x0 = lerp(grad(aa, fx, fy), grad(ba, fx - 1.0, fy), u);
        let x1 = lerp(grad(ab, fx, fy - 1.0), grad(bb, fx - 1.0, fy - 1.0), u);
        self.amplitude * lerp(x0, x1, v)
    }
}

/// Sum of Perlin octaves, each twice as fine and half as strong as the
/// previous one.
pub struct FractalNoise {
    octaves: Vec<PerlinNoise>,
}

impl FractalNoise {
    /// Draws one seed per octave from `rng`.
    #[must_use]
    pub fn new(rng: &mut Random, octaves: usize) -> Self {
        let mut grid = 1.0;
        let mut amplitude = 1.0;
        let mut list = Vec::with_capacity(octaves);
        for _ in 0..octaves {
            list.push(PerlinNoise::new(rng.next_seed(), grid, amplitude));
            grid *= 2.0;
            amplitude *= 0.5;
        }
        Self { octaves: list }
    }

    /// Samples the sum of all octaves.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.octaves.iter().map(|o| o.sample(x, y)).sum()
    }
}

/// Keeps lattice indices non-negative.
#[inline]
fn wrap(v: f64) -> f64 {
    if v < 0.0 {
        v.rem_euclid(256.0)
    } else {
        v
    }
}

/// Quintic smoothstep.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Dot product with one of the four diagonal gradients.
#[inline]
fn grad(hash: usize, x: f64, y: f64) -> f64 {
    match hash & 3 {
        0 => x + y,
        1 => x - y,
        2 => -x + y,
        _ => -x - y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = FractalNoise::new(&mut Random::new(42), 6);
        let b = FractalNoise::new(&mut Random::new(42), 6);
        for i in 0..100 {
            let x = f64::from(i) * 0.013;
            assert_eq!(a.sample(x, 1.0 - x), b.sample(x, 1.0 - x));
        }
    }

    #[test]
    fn test_zero_on_lattice() {
        let n = PerlinNoise::new(7, 4.0, 1.0);
        assert!(n.sample(0.25, 0.5).abs() < 1e-12);
        assert!(n.sample(0.0, 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounded() {
        let n = FractalNoise::new(&mut Random::new(3), 6);
        let mut seen_pos = false;
        let mut seen_neg = false;
        for i in 0..400 {
            let v = n.sample(f64::from(i % 20) / 20.0 + 0.01, f64::from(i / 20) / 20.0 + 0.02);
            assert!(v.abs() <= 4.0);
            seen_pos |= v > 0.0;
            seen_neg |= v < 0.0;
        }
        assert!(seen_pos && seen_neg);
    }

    #[test]
    fn test_draws_one_seed_per_octave() {
        let mut a = Random::new(11);
        let _ = FractalNoise::new(&mut a, 6);
        let mut b = Random::new(11);
        for _ in 0..6 {
            b.next_seed();
        }
        assert_eq!(a.seed(), b.seed());
    }
}
