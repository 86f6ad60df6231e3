//! Boolean operations against convex polygons.
//!
//! The generator only ever clips by convex shapes (half-planes, tower
//! clearances, translated blocks), so both operations take a convex clip
//! polygon and an arbitrary simple subject.

use bastion_shared::{Point, Polygon};

use super::polygon::{area, dedup, is_simple};
use super::segment::intersect_lines;
use super::EPSILON;

/// Counter-clockwise copy of a convex polygon.
fn ccw(convex: &[Point]) -> Polygon {
    let mut c = convex.to_vec();
    if area(&c) < 0.0 {
        c.reverse();
    }
    c
}

/// Side of `p` relative to the directed edge `a → b`, positive on the left.
#[inline]
fn side(a: Point, b: Point, p: Point) -> f64 {
    (b - a).cross(p - a)
}

fn strictly_inside(convex: &[Point], p: Point) -> bool {
    let m = convex.len();
    (0..m).all(|i| side(convex[i], convex[(i + 1) % m], p) > EPSILON)
}

/// Intersection of a polygon with a convex polygon.
///
/// A concave subject whose intersection falls apart comes back as one
/// polygon joined along the clip boundary.
#[must_use]
pub fn intersect_convex(subject: &[Point], convex: &[Point]) -> Option<Polygon> {
    let clip = ccw(convex);
    let m = clip.len();
    let mut output = subject.to_vec();
    for i in 0..m {
        if output.is_empty() {
            break;
        }
        let a = clip[i];
        let b = clip[(i + 1) % m];
        let input = std::mem::take(&mut output);
        let k = input.len();
        for j in 0..k {
            let p = input[j];
            let q = input[(j + 1) % k];
            let sp = side(a, b, p);
            let sq = side(a, b, q);
            if sp >= 0.0 {
                output.push(p);
            }
            if (sp >= 0.0) != (sq >= 0.0) {
                if let Some((t, _)) = intersect_lines(p, q - p, a, b - a) {
                    output.push(Point::lerp(p, q, t));
                }
            }
        }
    }
    dedup(&mut output, EPSILON);
    if output.len() < 3 || area(&output).abs() < EPSILON {
        None
    } else {
        Some(output)
    }
}

/// A crossing of the subject boundary with the clip boundary.
struct Crossing {
    /// Parameter along the subject edge.
    t: f64,
    /// Clip edge index.
    edge: usize,
    /// Parameter along the clip edge.
    s: f64,
}

/// Difference of a counter-clockwise polygon and a convex polygon.
///
/// Returns `None` when nothing remains or when the difference would not be a
/// single simple polygon.
#[must_use]
pub fn subtract_convex(subject: &[Point], convex: &[Point]) -> Option<Polygon> {
    let clip = ccw(convex);
    let m = clip.len();
    let n = subject.len();
    if n < 3 || m < 3 {
        return None;
    }
    let start = (0..n).find(|&i| !strictly_inside(&clip, subject[i]))?;

    let mut out: Polygon = Vec::with_capacity(n + m);
    // Clip edge and parameter where the walk entered the clip polygon.
    let mut entry: Option<(usize, f64)> = None;

    for step in 0..n {
        let a = subject[(start + step) % n];
        let b = subject[(start + step + 1) % n];
        if entry.is_none() {
            out.push(a);
        }

        let mut hits: Vec<Crossing> = Vec::new();
        for e in 0..m {
            let c = clip[e];
            let d = clip[(e + 1) % m];
            if let Some((t, s)) = intersect_lines(a, b - a, c, d - c) {
                if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s) {
                    hits.push(Crossing { t, edge: e, s });
                }
            }
        }
        hits.sort_by(|x, y| x.t.total_cmp(&y.t));

        let mut prev_t = 0.0;
        for h in hits {
            if h.t - prev_t < EPSILON && prev_t > 0.0 {
                continue;
            }
            // State right after this crossing.
            let sample = Point::lerp(a, b, (h.t + 1e-6).min(1.0));
            let now_inside = strictly_inside(&clip, sample) && h.t < 1.0;
            let p = Point::lerp(a, b, h.t);
            match (entry, now_inside) {
                (None, true) => {
                    out.push(p);
                    entry = Some((h.edge, h.s));
                }
                (Some((e_in, s_in)), false) => {
                    walk_clockwise(&clip, e_in, s_in, h.edge, h.s, &mut out);
                    out.push(p);
                    entry = None;
                }
                _ => {}
            }
            prev_t = h.t;
        }
    }
    if entry.is_some() {
        return None;
    }

    dedup(&mut out, EPSILON);
    if out.len() < 3 || area(&out) <= EPSILON || !is_simple(&out) {
        None
    } else {
        Some(out)
    }
}

/// Clip vertices met walking clockwise from the entry to the exit crossing.
fn walk_clockwise(clip: &[Point], e_in: usize, s_in: f64, e_out: usize, s_out: f64, out: &mut Polygon) {
    let m = clip.len();
    if e_in == e_out && s_out <= s_in {
        return;
    }
    let stop = (e_out + 1) % m;
    let mut idx = e_in;
    for _ in 0..m {
        out.push(clip[idx]);
        if idx == stop {
            break;
        }
        idx = (idx + m - 1) % m;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::polygon::{rect, regular, translate};

    #[test]
    fn test_intersect_overlapping_squares() {
        let a = rect(2.0, 2.0);
        let b = translate(&a, Point::new(1.0, 1.0));
        let i = intersect_convex(&a, &b).unwrap();
        assert!((area(&i) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersect_disjoint() {
        let a = rect(2.0, 2.0);
        let b = translate(&a, Point::new(5.0, 0.0));
        assert!(intersect_convex(&a, &b).is_none());
    }

    #[test]
    fn test_subtract_corner() {
        let a = rect(4.0, 4.0);
        let corner = translate(&rect(2.0, 2.0), Point::new(2.0, 2.0));
        let d = subtract_convex(&a, &corner).unwrap();
        assert!((area(&d) - 15.0).abs() < 1e-9);
        assert!(is_simple(&d));
    }

    #[test]
    fn test_subtract_circle_at_vertex() {
        let a = rect(10.0, 10.0);
        let circle = translate(&regular(9, 2.0, 0.3), Point::new(-5.0, -5.0));
        let d = subtract_convex(&a, &circle).unwrap();
        assert!(area(&d) < 100.0);
        assert!(area(&d) > 95.0);
    }

    #[test]
    fn test_subtract_disjoint_and_covering() {
        let a = rect(2.0, 2.0);
        let far = translate(&a, Point::new(10.0, 0.0));
        let same = subtract_convex(&a, &far).unwrap();
        assert!((area(&same) - 4.0).abs() < 1e-9);
        assert!(subtract_convex(&a, &rect(3.0, 3.0)).is_none());
    }
}
