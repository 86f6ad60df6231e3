//! Measurements and simple transforms of closed polygons.

use std::f64::consts::TAU;

use bastion_shared::{Point, Polygon};

use super::segment::intersect_segments;
use super::EPSILON;

/// Signed area, positive for counter-clockwise polygons.
#[must_use]
pub fn area(poly: &[Point]) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        sum += poly[i].cross(poly[(i + 1) % n]);
    }
    sum / 2.0
}

/// Mean of the vertices.
#[must_use]
pub fn center(poly: &[Point]) -> Point {
    if poly.is_empty() {
        return Point::ZERO;
    }
    let mut sum = Point::ZERO;
    for &p in poly {
        sum += p;
    }
    sum * (1.0 / poly.len() as f64)
}

/// Area-weighted centroid. Degenerate polygons fall back to [`center`].
#[must_use]
pub fn centroid(poly: &[Point]) -> Point {
    let n = poly.len();
    let a = area(poly);
    if a.abs() < EPSILON {
        return center(poly);
    }
    let (mut x, mut y) = (0.0, 0.0);
    for i in 0..n {
        let p = poly[i];
        let q = poly[(i + 1) % n];
        let f = p.cross(q);
        x += (p.x + q.x) * f;
        y += (p.y + q.y) * f;
    }
    Point::new(x / (6.0 * a), y / (6.0 * a))
}

/// Length of the closed boundary.
#[must_use]
pub fn perimeter(poly: &[Point]) -> f64 {
    let n = poly.len();
    (0..n).map(|i| poly[i].distance(poly[(i + 1) % n])).sum()
}

/// Isoperimetric quotient, `1` for a disc and smaller for elongated shapes.
#[must_use]
pub fn compactness(poly: &[Point]) -> f64 {
    let p = perimeter(poly);
    if p < EPSILON {
        0.0
    } else {
        4.0 * std::f64::consts::PI * area(poly).abs() / (p * p)
    }
}

/// Even-odd point containment.
#[must_use]
pub fn contains(poly: &[Point], p: Point) -> bool {
    let n = poly.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = poly[i];
        let b = poly[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Whether `p` lies on the boundary within `tolerance`.
#[must_use]
pub fn on_boundary(poly: &[Point], p: Point, tolerance: f64) -> bool {
    let n = poly.len();
    (0..n).any(|i| super::segment::distance_to_segment(p, poly[i], poly[(i + 1) % n]) <= tolerance)
}

/// Whether `inner` lies inside `outer`, boundary contact allowed.
#[must_use]
pub fn contains_polygon(outer: &[Point], inner: &[Point], tolerance: f64) -> bool {
    if inner
        .iter()
        .any(|&p| !contains(outer, p) && !on_boundary(outer, p, tolerance))
    {
        return false;
    }
    // Edges may leave and re-enter between inside vertices.
    let n = inner.len();
    for i in 0..n {
        let mid = Point::midpoint(inner[i], inner[(i + 1) % n]);
        if !contains(outer, mid) && !on_boundary(outer, mid, tolerance) {
            return false;
        }
    }
    !outer
        .iter()
        .any(|&p| contains(inner, p) && !on_boundary(inner, p, tolerance))
}

/// Whether vertex `i` of a counter-clockwise polygon is convex.
#[must_use]
pub fn is_convex_vertex(poly: &[Point], i: usize) -> bool {
    let n = poly.len();
    let prev = poly[(i + n - 1) % n];
    let next = poly[(i + 1) % n];
    (poly[i] - prev).cross(next - poly[i]) > 0.0
}

/// Whether every vertex of a counter-clockwise polygon is convex.
#[must_use]
pub fn is_convex(poly: &[Point]) -> bool {
    (0..poly.len()).all(|i| is_convex_vertex(poly, i))
}

/// Whether no two non-adjacent edges intersect.
#[must_use]
pub fn is_simple(poly: &[Point]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let c = poly[j];
            let d = poly[(j + 1) % n];
            if intersect_segments(a, b, c, d).is_some() {
                return false;
            }
        }
    }
    true
}

/// Index of the edge starting at the returned vertex with the largest length.
#[must_use]
pub fn longest_edge(poly: &[Point]) -> usize {
    let n = poly.len();
    let mut best = 0;
    let mut best_len = -1.0;
    for i in 0..n {
        let len = poly[i].distance_squared(poly[(i + 1) % n]);
        if len > best_len {
            best_len = len;
            best = i;
        }
    }
    best
}

/// Index of a vertex equal to `p`.
#[must_use]
pub fn index_of(poly: &[Point], p: Point) -> Option<usize> {
    poly.iter().position(|&q| q == p)
}

/// Removes the vertex spanning the smallest triangle with its neighbours.
pub fn simplify_closed(poly: &mut Polygon) {
    let n = poly.len();
    if n <= 3 {
        return;
    }
    let mut best = 0;
    let mut best_area = f64::INFINITY;
    for i in 0..n {
        let prev = poly[(i + n - 1) % n];
        let next = poly[(i + 1) % n];
        let a = (poly[i] - prev).cross(next - prev).abs();
        if a < best_area {
            best_area = a;
            best = i;
        }
    }
    poly.remove(best);
}

/// Drops consecutive duplicates, including the closing pair.
pub fn dedup(poly: &mut Polygon, tolerance: f64) {
    poly.dedup_by(|a, b| a.distance(*b) <= tolerance);
    while poly.len() > 1 && poly[0].distance(poly[poly.len() - 1]) <= tolerance {
        poly.pop();
    }
}

/// Vertex `i` pulled halfway towards the midpoint of its neighbours.
#[must_use]
pub fn lerp_vertex(poly: &[Point], i: usize) -> Point {
    let n = poly.len();
    let prev = poly[(i + n - 1) % n];
    let next = poly[(i + 1) % n];
    Point::lerp(poly[i], Point::midpoint(prev, next), 0.5)
}

// =============================================================================
// CONSTRUCTORS & TRANSFORMS
// =============================================================================

/// Axis-aligned rectangle centred on the origin.
#[must_use]
pub fn rect(width: f64, height: f64) -> Polygon {
    let (w, h) = (width / 2.0, height / 2.0);
    vec![
        Point::new(-w, -h),
        Point::new(w, -h),
        Point::new(w, h),
        Point::new(-w, h),
    ]
}

/// Regular `n`-gon of circumradius `radius`, rotated by `phase` turns.
#[must_use]
pub fn regular(n: usize, radius: f64, phase: f64) -> Polygon {
    (0..n)
        .map(|i| Point::polar(radius, (phase + i as f64 / n as f64) * TAU))
        .collect()
}

/// Translated copy.
#[must_use]
pub fn translate(poly: &[Point], offset: Point) -> Polygon {
    poly.iter().map(|&p| p + offset).collect()
}

/// Rotated copy, the angle given as its sine and cosine.
#[must_use]
pub fn rotate_yx(poly: &[Point], sin: f64, cos: f64) -> Polygon {
    poly.iter().map(|&p| p.rotate_yx(sin, cos)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ]
    }

    #[test]
    fn test_area_orientation() {
        let mut sq = square();
        assert!((area(&sq) - 4.0).abs() < 1e-12);
        sq.reverse();
        assert!((area(&sq) + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_and_contains() {
        let sq = square();
        assert!(centroid(&sq).distance(Point::new(1.0, 1.0)) < 1e-12);
        assert!(contains(&sq, Point::new(1.0, 1.5)));
        assert!(!contains(&sq, Point::new(3.0, 1.0)));
    }

    #[test]
    fn test_contains_polygon() {
        let outer = square();
        let inner = translate(&rect(1.0, 1.0), Point::new(1.0, 1.0));
        assert!(contains_polygon(&outer, &inner, 1e-9));
        assert!(contains_polygon(&outer, &outer, 1e-9));
        let shifted = translate(&inner, Point::new(1.0, 0.0));
        assert!(!contains_polygon(&outer, &shifted, 1e-9));
    }

    #[test]
    fn test_simplify_removes_collinear_first() {
        let mut poly = square();
        poly.insert(1, Point::new(1.0, 0.0));
        simplify_closed(&mut poly);
        assert_eq!(poly, square());
    }

    #[test]
    fn test_regular_is_ccw() {
        let hex = regular(6, 1.0, 0.0);
        assert!(area(&hex) > 0.0);
        assert!(is_convex(&hex));
        assert!(is_simple(&hex));
    }

    #[test]
    fn test_compactness() {
        let disc = regular(64, 1.0, 0.0);
        assert!(compactness(&disc) > 0.99);
        assert!(compactness(&rect(10.0, 1.0)) < 0.3);
    }
}
