//! Relaxation and corner cutting.

use bastion_shared::{Point, Polygon};

/// Laplacian relaxation of a closed polygon.
///
/// Every vertex not listed in `fixed` moves halfway towards the midpoint of
/// its neighbours, `iterations` times. The vertex count never changes, so
/// the result can be written back vertex by vertex.
#[must_use]
pub fn smooth(poly: &[Point], fixed: &[Point], iterations: usize) -> Polygon {
    let n = poly.len();
    let mut cur = poly.to_vec();
    if n < 3 {
        return cur;
    }
    let pinned: Vec<bool> = poly.iter().map(|p| fixed.contains(p)).collect();
    for _ in 0..iterations {
        let prev = cur.clone();
        for i in 0..n {
            if pinned[i] {
                continue;
            }
            let mid = Point::midpoint(prev[(i + n - 1) % n], prev[(i + 1) % n]);
            cur[i] = Point::lerp(prev[i], mid, 0.5);
        }
    }
    cur
}

/// [`smooth`] for an open polyline; both ends stay in place.
#[must_use]
pub fn smooth_open(line: &[Point], fixed: &[Point], iterations: usize) -> Polygon {
    let n = line.len();
    let mut cur = line.to_vec();
    if n < 3 {
        return cur;
    }
    let pinned: Vec<bool> = line.iter().map(|p| fixed.contains(p)).collect();
    for _ in 0..iterations {
        let prev = cur.clone();
        for i in 1..n - 1 {
            if pinned[i] {
                continue;
            }
            let mid = Point::midpoint(prev[i - 1], prev[i + 1]);
            cur[i] = Point::lerp(prev[i], mid, 0.5);
        }
    }
    cur
}

/// Chaikin corner cutting.
///
/// Vertices listed in `fixed` survive as sharp corners. Open polylines keep
/// their ends.
#[must_use]
pub fn chaikin(poly: &[Point], closed: bool, iterations: usize, fixed: &[Point]) -> Polygon {
    let mut cur = poly.to_vec();
    for _ in 0..iterations {
        let n = cur.len();
        if n < 3 {
            break;
        }
        let mut next = Vec::with_capacity(n * 2);
        for i in 0..n {
            let p = cur[i];
            let is_end = !closed && (i == 0 || i == n - 1);
            if is_end || fixed.contains(&p) {
                next.push(p);
                continue;
            }
            let prev = cur[(i + n - 1) % n];
            let after = cur[(i + 1) % n];
            next.push(Point::lerp(p, prev, 0.25));
            next.push(Point::lerp(p, after, 0.25));
        }
        cur = next;
    }
    cur
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::polygon::{area, rect};

    #[test]
    fn test_smooth_keeps_count_and_fixed() {
        let sq = rect(2.0, 2.0);
        let out = smooth(&sq, &[sq[0]], 3);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], sq[0]);
        assert!(area(&out) < area(&sq));
    }

    #[test]
    fn test_smooth_open_keeps_ends() {
        let line = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)];
        let out = smooth_open(&line, &[], 2);
        assert_eq!(out[0], line[0]);
        assert_eq!(out[2], line[2]);
        assert!(out[1].y < 1.0);
    }

    #[test]
    fn test_chaikin_doubles_vertices() {
        let sq = rect(2.0, 2.0);
        let out = chaikin(&sq, true, 2, &[]);
        assert_eq!(out.len(), 16);
        assert!(area(&out) < 4.0 && area(&out) > 3.0);
    }
}
