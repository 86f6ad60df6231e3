//! Insetting and splitting polygons.

use bastion_shared::{Point, Polygon};

use super::polygon::{area, dedup, is_simple};
use super::segment::{distance_to_segment, intersect_lines, project};
use super::EPSILON;

/// One offset edge line during [`inset`].
#[derive(Clone, Copy)]
struct OffsetLine {
    origin: Point,
    dir: Point,
}

/// Moves every edge inwards by its own distance.
///
/// Edges that collapse are dropped and their neighbours meet directly.
/// Returns `None` when fewer than three edges survive or the result is not
/// a simple polygon of the input's orientation.
#[must_use]
pub fn inset(poly: &[Point], distances: &[f64]) -> Option<Polygon> {
    let n = poly.len();
    if n < 3 {
        return None;
    }
    let sign = if area(poly) >= 0.0 { 1.0 } else { -1.0 };

    let mut lines = Vec::with_capacity(n);
    let mut anchors = Vec::with_capacity(n);
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let dir = b - a;
        if dir.length() < EPSILON {
            continue;
        }
        let d = distances.get(i).copied().unwrap_or(0.0);
        let normal = dir.perp().normalized(sign * d);
        lines.push(OffsetLine { origin: a + normal, dir });
        anchors.push(a);
    }

    loop {
        let m = lines.len();
        if m < 3 {
            return None;
        }
        let mut pts = Vec::with_capacity(m);
        for k in 0..m {
            let prev = lines[(k + m - 1) % m];
            let cur = lines[k];
            let p = match intersect_lines(prev.origin, prev.dir, cur.origin, cur.dir) {
                Some((t, _)) => prev.origin + prev.dir * t,
                None => cur.origin + cur.dir * project(anchors[k], cur.origin, cur.origin + cur.dir),
            };
            pts.push(p);
        }

        // The edge that reversed the most collapses first.
        let mut worst = None;
        let mut worst_dot = 0.0;
        for k in 0..m {
            let seg = pts[(k + 1) % m] - pts[k];
            let dot = seg.dot(lines[k].dir) / lines[k].dir.length_squared();
            if dot < worst_dot - EPSILON {
                worst_dot = dot;
                worst = Some(k);
            }
        }
        match worst {
            Some(k) => {
                lines.remove(k);
                anchors.remove(k);
            }
            None => {
                dedup(&mut pts, EPSILON);
                if pts.len() < 3 || area(&pts) * sign <= EPSILON || !is_simple(&pts) {
                    return None;
                }
                return Some(pts);
            }
        }
    }
}

/// [`inset`] with the same distance for every edge.
#[must_use]
pub fn shrink_eq(poly: &[Point], distance: f64) -> Option<Polygon> {
    inset(poly, &vec![distance; poly.len()])
}

/// Index of the edge of `poly` closest to `p`.
fn nearest_edge(poly: &[Point], p: Point) -> (usize, f64) {
    let n = poly.len();
    let mut best = (0, f64::INFINITY);
    for i in 0..n {
        let d = distance_to_segment(p, poly[i], poly[(i + 1) % n]);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Splits a polygon along a polyline whose ends lie on its boundary.
///
/// The first piece is bounded by the polyline in its own direction, the
/// second by the polyline reversed. In both pieces the cut edges come first:
/// edges `0..polyline.len() - 1` of each piece are the cut.
#[must_use]
pub fn split_along(poly: &[Point], polyline: &[Point]) -> Option<[Polygon; 2]> {
    let n = poly.len();
    let k = polyline.len();
    if n < 3 || k < 2 {
        return None;
    }
    let tolerance = 1e-6 * (1.0 + super::polygon::perimeter(poly));
    let start = polyline[0];
    let end = polyline[k - 1];
    let (i, di) = nearest_edge(poly, start);
    let (j, dj) = nearest_edge(poly, end);
    if di > tolerance || dj > tolerance || i == j {
        return None;
    }

    let mut first: Polygon = polyline.to_vec();
    let mut e = (j + 1) % n;
    loop {
        first.push(poly[e]);
        if e == i {
            break;
        }
        e = (e + 1) % n;
    }

    let mut second: Polygon = polyline.iter().rev().copied().collect();
    let mut e = (i + 1) % n;
    loop {
        second.push(poly[e]);
        if e == j {
            break;
        }
        e = (e + 1) % n;
    }

    // Ends landing on a vertex leave a zero-length edge after the cut.
    for piece in [&mut first, &mut second] {
        let mut w = k;
        while w < piece.len() {
            let prev = piece[w - 1];
            if piece[w].distance(prev) <= EPSILON {
                piece.remove(w);
            } else {
                w += 1;
            }
        }
        if piece.len() > k && piece[piece.len() - 1].distance(piece[0]) <= EPSILON {
            piece.pop();
        }
        if piece.len() < 3 || area(piece) <= EPSILON {
            return None;
        }
    }
    Some([first, second])
}

/// The crossing points of the line `p1 → p2` with the boundary bracketing
/// `p1`, as a segment through the polygon's interior.
#[must_use]
pub fn pierce(poly: &[Point], p1: Point, p2: Point) -> Option<(Point, Point)> {
    let n = poly.len();
    let dir = p2 - p1;
    let mut hits: Vec<f64> = Vec::new();
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        if let Some((t, s)) = intersect_lines(p1, dir, a, b - a) {
            if (0.0..1.0).contains(&s) {
                hits.push(t);
            }
        }
    }
    hits.sort_by(f64::total_cmp);
    hits.dedup_by(|a, b| (*a - *b).abs() < EPSILON);
    let before = hits.iter().rev().find(|&&t| t <= 0.0).copied();
    let after = hits.iter().find(|&&t| t > 0.0).copied();
    match (before, after) {
        (Some(t0), Some(t1)) if t1 - t0 > EPSILON => Some((p1 + dir * t0, p1 + dir * t1)),
        _ => None,
    }
}

/// Every stretch of the infinite line through `p` along `dir` that lies
/// inside the polygon, ordered along `dir`.
#[must_use]
pub fn chords(poly: &[Point], p: Point, dir: Point) -> Vec<(Point, Point)> {
    let n = poly.len();
    let mut hits: Vec<f64> = Vec::new();
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        if let Some((t, s)) = intersect_lines(p, dir, a, b - a) {
            if (0.0..1.0).contains(&s) {
                hits.push(t);
            }
        }
    }
    hits.sort_by(f64::total_cmp);
    hits.dedup_by(|a, b| (*a - *b).abs() < EPSILON);
    hits.chunks_exact(2)
        .filter(|pair| pair[1] - pair[0] > EPSILON)
        .map(|pair| (p + dir * pair[0], p + dir * pair[1]))
        .collect()
}

/// The longest of [`chords`].
#[must_use]
pub fn longest_chord(poly: &[Point], p: Point, dir: Point) -> Option<(Point, Point)> {
    chords(poly, p, dir)
        .into_iter()
        .max_by(|a, b| a.0.distance(a.1).total_cmp(&b.0.distance(b.1)))
}

/// Splits a polygon by the line through `p1` and `p2`, leaving a strip of
/// width `gap` between the pieces.
///
/// The chord bracketing `p1` is used when `p1` is inside, the longest
/// chord of the line otherwise. Returns the pieces on the left and right
/// of the line, or the polygon itself when the line misses it.
#[must_use]
pub fn cut(poly: &[Point], p1: Point, p2: Point, gap: f64) -> Vec<Polygon> {
    let Some((a, b)) = pierce(poly, p1, p2).or_else(|| longest_chord(poly, p1, p2 - p1)) else {
        return vec![poly.to_vec()];
    };
    let Some(pieces) = split_along(poly, &[a, b]) else {
        return vec![poly.to_vec()];
    };
    if gap <= 0.0 {
        return pieces.to_vec();
    }
    let mut result = Vec::with_capacity(2);
    for piece in pieces {
        let mut d = vec![0.0; piece.len()];
        d[0] = gap / 2.0;
        if let Some(p) = inset(&piece, &d) {
            result.push(p);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::polygon::rect;

    #[test]
    fn test_inset_square() {
        let sq = rect(4.0, 4.0);
        let inner = shrink_eq(&sq, 1.0).unwrap();
        assert_eq!(inner.len(), 4);
        assert!((area(&inner) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_inset_collapses() {
        let sq = rect(2.0, 2.0);
        assert!(shrink_eq(&sq, 1.5).is_none());
    }

    #[test]
    fn test_inset_single_edge() {
        let sq = rect(4.0, 4.0);
        let inner = inset(&sq, &[1.0, 0.0, 0.0, 0.0]).unwrap();
        assert!((area(&inner) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_inset_drops_short_edge() {
        // A trapezoid whose short top edge disappears under a deep inset.
        let trap = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.5, 4.0),
            Point::new(4.5, 4.0),
        ];
        let inner = shrink_eq(&trap, 1.5).unwrap();
        assert_eq!(inner.len(), 3);
        assert!(area(&inner) > 0.0);
    }

    #[test]
    fn test_split_along_conserves_area() {
        let sq = rect(4.0, 4.0);
        let line = [Point::new(0.0, -2.0), Point::new(0.5, 0.0), Point::new(0.0, 2.0)];
        let [a, b] = split_along(&sq, &line).unwrap();
        assert!((area(&a) + area(&b) - 16.0).abs() < 1e-9);
        assert!(area(&a) > 0.0 && area(&b) > 0.0);
    }

    #[test]
    fn test_chords_of_concave_shape() {
        // A U shape: the line y = 3 crosses both arms.
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(6.0, 0.0),
            Point::new(6.0, 4.0),
            Point::new(4.0, 4.0),
            Point::new(4.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let found = chords(&u, Point::new(-1.0, 3.0), Point::new(1.0, 0.0));
        assert_eq!(found.len(), 2);
        assert!((found[0].0.x - 0.0).abs() < 1e-9 && (found[0].1.x - 2.0).abs() < 1e-9);
        assert!((found[1].0.x - 4.0).abs() < 1e-9 && (found[1].1.x - 6.0).abs() < 1e-9);
        assert!(chords(&u, Point::new(-1.0, 9.0), Point::new(1.0, 0.0)).is_empty());
    }

    #[test]
    fn test_cut_from_outside_point() {
        let sq = rect(4.0, 4.0);
        let pieces = cut(&sq, Point::new(0.0, -5.0), Point::new(0.0, -4.0), 0.0);
        assert_eq!(pieces.len(), 2);
    }

    #[test]
    fn test_cut_with_gap() {
        let sq = rect(4.0, 4.0);
        let pieces = cut(&sq, Point::new(0.0, 0.0), Point::new(0.0, 1.0), 1.0);
        assert_eq!(pieces.len(), 2);
        let total: f64 = pieces.iter().map(|p| area(p)).sum();
        assert!((total - 12.0).abs() < 1e-9);
    }
}
