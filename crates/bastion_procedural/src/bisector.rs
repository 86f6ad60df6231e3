//! # Bisector
//!
//! Recursive partitioning of a polygon into pieces of a target area.
//!
//! Every step cuts the current piece across its oriented bounding box,
//! near the middle of the long side and roughly perpendicular to it. The
//! cut may bend once inside the piece; a [`CutPolicy`] decides how wide
//! the gap left by a cut is, may reshape the cut line and may declare a
//! piece finished before it reaches the target area.
//!
//! Pieces are kept on an explicit stack, so pathological input cannot
//! exhaust the call stack.

use bastion_core::geom::cut::{longest_chord, pierce, split_along};
use bastion_core::geom::polygon::{area, is_simple};
use bastion_core::geom::{inset, obb};
use bastion_core::{Point, Polygon, Random};

/// Cut offset along the long side, as a spread around the middle.
const OFFSET_SPREAD: f64 = 0.2;

/// Upper bound of bisection steps for a single partition.
const MAX_STEPS: usize = 4096;

/// How a [`Bisector`] treats gaps, cut lines and finished pieces.
pub trait CutPolicy {
    /// Width of the strip a cut leaves between its two pieces.
    fn gap(&self, _cut: &[Point]) -> f64 {
        0.0
    }

    /// Reshapes a cut line; the ends must stay where they are.
    fn process_cut(&self, cut: Polygon, _rng: &mut Random) -> Polygon {
        cut
    }

    /// Overrides the area test: `Some(true)` keeps a piece whole.
    fn is_atomic(&self, _piece: &[Point]) -> Option<bool> {
        None
    }
}

/// Straight cuts, no gaps.
pub struct PlainCuts;

impl CutPolicy for PlainCuts {}

/// Recursive polygon partitioner.
pub struct Bisector<'a, P: CutPolicy> {
    shape: Polygon,
    min_area: f64,
    /// Largest deviation of a cut from the perpendicular, in degrees.
    variance: f64,
    /// Largest sideways offset of the bend, relative to the cut length.
    pub min_turn_offset: f64,
    /// Cut lines made so far.
    pub cuts: Vec<Polygon>,
    policy: &'a P,
}

impl<'a, P: CutPolicy> Bisector<'a, P> {
    /// Partitioner for `shape` aiming at pieces of about `min_area`.
    #[must_use]
    pub fn new(shape: Polygon, min_area: f64, variance: f64, policy: &'a P) -> Self {
        Self {
            shape,
            min_area,
            variance,
            min_turn_offset: 0.0,
            cuts: Vec::new(),
            policy,
        }
    }

    /// Cuts the shape down to finished pieces, in creation order.
    pub fn partition(&mut self, rng: &mut Random) -> Vec<Polygon> {
        let mut done = Vec::new();
        let mut pending = vec![self.shape.clone()];
        let mut steps = 0;
        while let Some(piece) = pending.pop() {
            steps += 1;
            if steps > MAX_STEPS || self.atomic(&piece, rng) {
                done.push(piece);
                continue;
            }
            match self.bisect(&piece, rng) {
                Some(parts) => pending.extend(parts.into_iter().rev()),
                None => done.push(piece),
            }
        }
        done
    }

    fn atomic(&self, piece: &[Point], rng: &mut Random) -> bool {
        if let Some(atomic) = self.policy.is_atomic(piece) {
            return atomic;
        }
        area(piece).abs() < self.min_area * (1.0 + rng.float())
    }

    /// One cut; `None` when the piece cannot be split.
    fn bisect(&mut self, piece: &[Point], rng: &mut Random) -> Option<Vec<Polygon>> {
        let b = obb(piece);
        let axis = usize::from(b[0].distance(b[1]) <= b[1].distance(b[2]));
        let ratio = 0.5 + OFFSET_SPREAD * (rng.avg3() * 2.0 - 1.0);
        let across = b[axis + 2] - b[axis + 1];
        let start = Point::lerp(b[axis], b[axis + 1], ratio) + across * 0.5;
        let along = b[axis + 1] - b[axis];
        let twist = self.variance.to_radians() * (rng.avg3() * 2.0 - 1.0);
        let dir = along.perp().rotate(twist);

        let (a, z) = pierce(piece, start, start + dir).or_else(|| longest_chord(piece, start, dir))?;
        let mut line = vec![a, z];
        if self.min_turn_offset > 0.0 {
            let t = 0.3 + 0.4 * rng.float();
            let side = self.min_turn_offset * (rng.float() * 2.0 - 1.0) * 0.25;
            let bend = Point::lerp(a, z, t) + (z - a).perp() * side;
            line = vec![a, bend, z];
        }
        let line = self.policy.process_cut(line, rng);

        let (parts, cut) = match split_checked(piece, &line) {
            Some(parts) => (parts, line),
            None => (split_checked(piece, &[a, z])?, vec![a, z]),
        };
        let gap = self.policy.gap(&cut);
        let k = cut.len() - 1;
        let mut out = Vec::with_capacity(2);
        for part in parts {
            if gap <= 0.0 {
                out.push(part);
                continue;
            }
            let mut d = vec![0.0; part.len()];
            for x in d.iter_mut().take(k) {
                *x = gap / 2.0;
            }
            if let Some(p) = inset(&part, &d) {
                out.push(p);
            }
        }
        self.cuts.push(cut);
        Some(out)
    }
}

/// Splits along a line and checks that both pieces are simple and make up
/// the whole.
fn split_checked(piece: &[Point], line: &[Point]) -> Option<[Polygon; 2]> {
    let parts = split_along(piece, line)?;
    let total = area(piece).abs();
    let sum: f64 = parts.iter().map(|p| area(p).abs()).sum();
    if parts.iter().all(|p| is_simple(p)) && (sum - total).abs() <= 1e-6 * (1.0 + total) {
        Some(parts)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::geom::polygon::rect;

    struct Alleys;

    impl CutPolicy for Alleys {
        fn gap(&self, _cut: &[Point]) -> f64 {
            1.2
        }
    }

    #[test]
    fn test_pieces_cover_shape() {
        let shape = rect(40.0, 30.0);
        let mut rng = Random::new(21);
        let mut bisector = Bisector::new(shape.clone(), 50.0, 10.0, &PlainCuts);
        let pieces = bisector.partition(&mut rng);
        assert!(pieces.len() > 4);
        let sum: f64 = pieces.iter().map(|p| area(p)).sum();
        assert!((sum - area(&shape)).abs() < 1e-6, "pieces cover {sum}");
        assert_eq!(bisector.cuts.len(), pieces.len() - 1);
    }

    #[test]
    fn test_pieces_respect_min_area() {
        let mut rng = Random::new(5);
        let mut bisector = Bisector::new(rect(40.0, 30.0), 50.0, 0.0, &PlainCuts);
        for piece in bisector.partition(&mut rng) {
            // A piece is only split while at least its target area.
            assert!(area(&piece) < 100.0 + 1e-6, "area {}", area(&piece));
        }
    }

    #[test]
    fn test_gaps_shrink_total_area() {
        let shape = rect(40.0, 30.0);
        let mut rng = Random::new(5);
        let mut bisector = Bisector::new(shape.clone(), 50.0, 5.0, &Alleys);
        let pieces = bisector.partition(&mut rng);
        let sum: f64 = pieces.iter().map(|p| area(p)).sum();
        assert!(sum < area(&shape));
        assert!(pieces.iter().all(|p| is_simple(p)));
    }

    #[test]
    fn test_bent_cuts_are_three_points() {
        let mut rng = Random::new(13);
        let mut bisector = Bisector::new(rect(40.0, 30.0), 100.0, 5.0, &PlainCuts);
        bisector.min_turn_offset = 0.5;
        let pieces = bisector.partition(&mut rng);
        assert!(pieces.len() > 1);
        assert!(bisector.cuts.iter().all(|c| c.len() == 2 || c.len() == 3));
    }

    #[test]
    fn test_atomic_policy_stops_partition() {
        struct Whole;
        impl CutPolicy for Whole {
            fn is_atomic(&self, _piece: &[Point]) -> Option<bool> {
                Some(true)
            }
        }
        let mut rng = Random::new(1);
        let mut bisector = Bisector::new(rect(40.0, 30.0), 1.0, 0.0, &Whole);
        assert_eq!(bisector.partition(&mut rng).len(), 1);
        assert!(bisector.cuts.is_empty());
    }
}
