//! Lines and segments.

use bastion_shared::Point;

use super::EPSILON;

/// Intersection of two parametric lines `p1 + d1·t` and `p2 + d2·s`.
///
/// Returns `(t, s)`, or `None` for parallel lines.
#[must_use]
pub fn intersect_lines(p1: Point, d1: Point, p2: Point, d2: Point) -> Option<(f64, f64)> {
    let denom = d1.cross(d2);
    if denom.abs() < EPSILON * EPSILON {
        return None;
    }
    let w = p2 - p1;
    Some((w.cross(d2) / denom, w.cross(d1) / denom))
}

/// Proper intersection of segments `ab` and `cd`.
///
/// Returns the parameter along `ab` and the intersection point.
#[must_use]
pub fn intersect_segments(a: Point, b: Point, c: Point, d: Point) -> Option<(f64, Point)> {
    let (t, s) = intersect_lines(a, b - a, c, d - c)?;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s) {
        Some((t, Point::lerp(a, b, t)))
    } else {
        None
    }
}

/// Parameter of the projection of `p` on the line through `a` and `b`.
#[must_use]
pub fn project(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 < EPSILON * EPSILON {
        0.0
    } else {
        (p - a).dot(ab) / len2
    }
}

/// Distance from `p` to the segment `ab`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let t = project(p, a, b).clamp(0.0, 1.0);
    p.distance(Point::lerp(a, b, t))
}

/// Whether segments `ab` and `cd` lie on the same line and overlap.
#[must_use]
pub fn converge(a: Point, b: Point, c: Point, d: Point) -> bool {
    const TOLERANCE: f64 = 1e-6;
    let cd = d - c;
    let len = cd.length();
    if len < EPSILON || a.distance(b) < EPSILON {
        return false;
    }
    let off_a = cd.cross(a - c).abs() / len;
    let off_b = cd.cross(b - c).abs() / len;
    if off_a > TOLERANCE || off_b > TOLERANCE {
        return false;
    }
    let ta = project(a, c, d);
    let tb = project(b, c, d);
    let (lo, hi) = if ta < tb { (ta, tb) } else { (tb, ta) };
    hi.min(1.0) - lo.max(0.0) > TOLERANCE / len
}

/// Barycentric coordinates of `p` in triangle `abc`.
#[must_use]
pub fn barycentric(a: Point, b: Point, c: Point, p: Point) -> (f64, f64, f64) {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let denom = v0.cross(v1);
    if denom.abs() < EPSILON * EPSILON {
        return (f64::NAN, f64::NAN, f64::NAN);
    }
    let v = v2.cross(v1) / denom;
    let w = v0.cross(v2) / denom;
    (1.0 - v - w, v, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_segments() {
        let hit = intersect_segments(
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 0.0),
        );
        let (t, p) = hit.unwrap();
        assert!((t - 0.5).abs() < 1e-12);
        assert!(p.distance(Point::new(1.0, 1.0)) < 1e-12);
        assert!(intersect_segments(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0)
        )
        .is_none());
    }

    #[test]
    fn test_converge() {
        let a = Point::new(1.0, 0.0);
        let b = Point::new(2.0, 0.0);
        assert!(converge(a, b, Point::new(0.0, 0.0), Point::new(5.0, 0.0)));
        assert!(!converge(a, b, Point::new(3.0, 0.0), Point::new(5.0, 0.0)));
        assert!(!converge(a, b, Point::new(0.0, 0.1), Point::new(5.0, 0.1)));
    }

    #[test]
    fn test_barycentric_sums_to_one() {
        let (u, v, w) = barycentric(
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
            Point::new(1.0, 1.0),
        );
        assert!((u + v + w - 1.0).abs() < 1e-12);
        assert!(u > 0.0 && v > 0.0 && w > 0.0);
    }
}
