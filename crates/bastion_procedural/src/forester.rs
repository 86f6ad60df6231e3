//! # Trees
//!
//! Tree points for parks, courtyards and field edges. Candidates come from
//! a jittered grid or a jittered line; a noise field thins them so that
//! trees gather in groves instead of covering everything evenly.

use bastion_core::geom::polygon::contains;
use bastion_core::{Point, Polygon, Random};

use crate::noise::PerlinNoise;

/// Distance between neighbouring trees.
const SPACING: f64 = 3.0;

/// Noise lattice cells per unit of distance.
const GROVE_SCALE: f64 = 1.0 / 24.0;

/// Places trees by a density in `[0, 1]`.
pub struct Forester {
    noise: PerlinNoise,
}

impl Forester {
    /// Forester with its own grove pattern.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self {
            noise: PerlinNoise::new(seed, GROVE_SCALE, 1.0),
        }
    }

    fn keeps(&self, p: Point, density: f64) -> bool {
        (self.noise.sample(p.x, p.y) + 1.0) / 2.0 < density
    }

    /// Trees covering a polygon.
    pub fn fill_area(&self, poly: &[Point], density: f64, rng: &mut Random) -> Vec<Point> {
        if poly.len() < 3 || density <= 0.0 {
            return Vec::new();
        }
        let (mut lo, mut hi) = (poly[0], poly[0]);
        for p in poly {
            lo = Point::new(lo.x.min(p.x), lo.y.min(p.y));
            hi = Point::new(hi.x.max(p.x), hi.y.max(p.y));
        }
        let cols = ((hi.x - lo.x) / SPACING).ceil() as usize;
        let rows = ((hi.y - lo.y) / SPACING).ceil() as usize;
        let mut trees = Vec::new();
        for y in 0..rows {
            for x in 0..cols {
                let jitter = Point::new(rng.float(), rng.float());
                let p = lo + Point::new((x as f64 + jitter.x) * SPACING, (y as f64 + jitter.y) * SPACING);
                if contains(poly, p) && self.keeps(p, density) {
                    trees.push(p);
                }
            }
        }
        trees
    }

    /// Trees along a segment.
    pub fn fill_line(&self, a: Point, b: Point, density: f64, rng: &mut Random) -> Vec<Point> {
        let n = (a.distance(b) / SPACING).ceil() as usize;
        let mut trees = Vec::new();
        for i in 0..n {
            let p = Point::lerp(a, b, (i as f64 + rng.float()) / n as f64);
            if self.keeps(p, density) {
                trees.push(p);
            }
        }
        trees
    }

    /// Trees along every side of a closed polygon.
    pub fn fill_outline(&self, poly: &Polygon, density: f64, rng: &mut Random) -> Vec<Point> {
        let n = poly.len();
        let mut trees = Vec::new();
        for i in 0..n {
            trees.extend(self.fill_line(poly[i], poly[(i + 1) % n], density, rng));
        }
        trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::geom::polygon::rect;

    #[test]
    fn test_trees_stay_inside() {
        let forester = Forester::new(9);
        let mut rng = Random::new(4);
        let area = rect(30.0, 20.0);
        let trees = forester.fill_area(&area, 1.0, &mut rng);
        assert!(!trees.is_empty());
        assert!(trees.iter().all(|&p| contains(&area, p)));
    }

    #[test]
    fn test_zero_density_is_bare() {
        let forester = Forester::new(9);
        let mut rng = Random::new(4);
        assert!(forester.fill_area(&rect(30.0, 20.0), 0.0, &mut rng).is_empty());
        assert!(forester
            .fill_line(Point::ZERO, Point::new(30.0, 0.0), 0.0, &mut rng)
            .is_empty());
    }

    #[test]
    fn test_full_density_lines_are_dense() {
        let forester = Forester::new(2);
        let mut rng = Random::new(8);
        let trees = forester.fill_line(Point::ZERO, Point::new(30.0, 0.0), 1.0 + 1e-9, &mut rng);
        assert_eq!(trees.len(), 10);
    }
}
