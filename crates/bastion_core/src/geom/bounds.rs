//! Bounding and inscribed rectangles.
//!
//! Rectangles are returned as four counter-clockwise corners. For [`obb`]
//! the first edge runs along the hull edge the box was fitted to; for
//! [`lir`] it lies on the requested polygon edge.

use bastion_shared::{Point, Polygon};

use super::polygon::contains_polygon;
use super::EPSILON;

/// Subdivisions of the frontage tried by [`lir`].
const LIR_STEPS: usize = 8;

/// Bisection rounds of the height search in [`lir`].
const LIR_ROUNDS: usize = 24;

/// Convex hull, counter-clockwise, without collinear points.
#[must_use]
pub fn convex_hull(points: &[Point]) -> Polygon {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for pass in 0..2 {
        let start = hull.len();
        let iter: Box<dyn Iterator<Item = &Point>> = if pass == 0 {
            Box::new(pts.iter())
        } else {
            Box::new(pts.iter().rev())
        };
        for &p in iter {
            while hull.len() >= start + 2 {
                let a = hull[hull.len() - 2];
                let b = hull[hull.len() - 1];
                if (b - a).cross(p - b) <= 0.0 {
                    hull.pop();
                } else {
                    break;
                }
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

/// Area of a rectangle given as four corners.
#[must_use]
pub fn rect_area(rect: &[Point]) -> f64 {
    if rect.len() < 4 {
        return 0.0;
    }
    rect[0].distance(rect[1]) * rect[1].distance(rect[2])
}

/// Minimum-area oriented bounding box.
#[must_use]
pub fn obb(poly: &[Point]) -> [Point; 4] {
    let hull = convex_hull(poly);
    let n = hull.len();
    let mut best = [Point::ZERO; 4];
    let mut best_area = f64::INFINITY;
    for i in 0..n {
        let edge = hull[(i + 1) % n] - hull[i];
        if edge.length() < EPSILON {
            continue;
        }
        let u = edge.normalized(1.0);
        let v = u.perp();
        let (mut u0, mut u1, mut v0, mut v1) = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for &p in &hull {
            let d = p - hull[i];
            let pu = d.dot(u);
            let pv = d.dot(v);
            u0 = u0.min(pu);
            u1 = u1.max(pu);
            v0 = v0.min(pv);
            v1 = v1.max(pv);
        }
        let a = (u1 - u0) * (v1 - v0);
        if a < best_area {
            best_area = a;
            let o = hull[i];
            best = [
                o + u * u0 + v * v0,
                o + u * u1 + v * v0,
                o + u * u1 + v * v1,
                o + u * u0 + v * v1,
            ];
        }
    }
    if best_area.is_infinite() {
        let p = poly.first().copied().unwrap_or(Point::ZERO);
        return [p; 4];
    }
    best
}

/// Large inscribed rectangle standing on edge `edge` of a counter-clockwise
/// polygon.
///
/// The frontage is searched on a fixed subdivision of the edge and the depth
/// by bisection, so the result is a good inscribed rectangle rather than the
/// provably largest one.
#[must_use]
pub fn lir(poly: &[Point], edge: usize) -> Polygon {
    let n = poly.len();
    let a = poly[edge % n];
    let b = poly[(edge + 1) % n];
    let len = a.distance(b);
    if n < 3 || len < EPSILON {
        return vec![a, b, b, a];
    }
    let u = (b - a).normalized(1.0);
    let v = u.perp();
    let depth = poly
        .iter()
        .map(|&p| (p - a).dot(v))
        .fold(0.0_f64, f64::max);

    let make = |u0: f64, u1: f64, h: f64| -> Polygon {
        vec![
            a + u * u0,
            a + u * u1,
            a + u * u1 + v * h,
            a + u * u0 + v * h,
        ]
    };
    let tolerance = 1e-7 * (1.0 + len);

    let mut best = make(0.0, len, 0.0);
    let mut best_area = 0.0;
    for i in 0..LIR_STEPS {
        for j in (i + 1)..=LIR_STEPS {
            let u0 = len * i as f64 / LIR_STEPS as f64;
            let u1 = len * j as f64 / LIR_STEPS as f64;
            let width = u1 - u0;
            if width * depth <= best_area {
                continue;
            }
            let (mut lo, mut hi) = (0.0, depth);
            for _ in 0..LIR_ROUNDS {
                let mid = (lo + hi) / 2.0;
                if contains_polygon(poly, &make(u0, u1, mid), tolerance) {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            if width * lo > best_area {
                best_area = width * lo;
                best = make(u0, u1, lo);
            }
        }
    }
    best
}

/// Largest of the [`lir`] rectangles over all edges.
#[must_use]
pub fn lira(poly: &[Point]) -> Polygon {
    let mut best = Vec::new();
    let mut best_area = -1.0;
    for i in 0..poly.len() {
        let r = lir(poly, i);
        let a = rect_area(&r);
        if a > best_area {
            best_area = a;
            best = r;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::polygon::{area, rect, rotate_yx};

    #[test]
    fn test_hull_drops_interior() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(area(&hull) > 0.0);
    }

    #[test]
    fn test_obb_of_rotated_rect() {
        let (s, c) = 0.5_f64.sin_cos();
        let r = rotate_yx(&rect(6.0, 2.0), s, c);
        let bb = obb(&r);
        assert!((rect_area(&bb) - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_lir_of_rect_is_rect() {
        let r = rect(4.0, 2.0);
        let inner = lir(&r, 0);
        assert!((rect_area(&inner) - 8.0).abs() < 1e-3);
        assert!(contains_polygon(&r, &inner, 1e-6));
    }

    #[test]
    fn test_lira_in_l_shape() {
        let l = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let r = lira(&l);
        assert!(rect_area(&r) >= 4.0 - 1e-3);
        assert!(contains_polygon(&l, &r, 1e-6));
    }
}
