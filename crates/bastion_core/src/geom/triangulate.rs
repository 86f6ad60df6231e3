//! Ear-clipping triangulation.

use bastion_shared::Point;

use super::polygon::area;
use super::segment::barycentric;

/// Triangulates a simple polygon into index triples.
///
/// The triangles share the polygon's orientation.
#[must_use]
pub fn earcut(poly: &[Point]) -> Vec<[usize; 3]> {
    let n = poly.len();
    if n < 3 {
        return Vec::new();
    }
    let sign = if area(poly) >= 0.0 { 1.0 } else { -1.0 };
    let mut idx: Vec<usize> = (0..n).collect();
    let mut tris = Vec::with_capacity(n - 2);

    let mut guard = 0;
    while idx.len() > 3 && guard < n * n {
        guard += 1;
        let m = idx.len();
        let mut clipped = false;
        for k in 0..m {
            let ia = idx[(k + m - 1) % m];
            let ib = idx[k];
            let ic = idx[(k + 1) % m];
            let (a, b, c) = (poly[ia], poly[ib], poly[ic]);
            if (b - a).cross(c - b) * sign <= 0.0 {
                continue;
            }
            let blocked = idx.iter().any(|&j| {
                if j == ia || j == ib || j == ic {
                    return false;
                }
                let (u, v, w) = barycentric(a, b, c, poly[j]);
                u >= 0.0 && v >= 0.0 && w >= 0.0
            });
            if blocked {
                continue;
            }
            tris.push([ia, ib, ic]);
            idx.remove(k);
            clipped = true;
            break;
        }
        if !clipped {
            // Degenerate remainder: fan it out.
            break;
        }
    }
    if idx.len() >= 3 {
        for k in 1..idx.len() - 1 {
            tris.push([idx[0], idx[k], idx[k + 1]]);
        }
    }
    tris
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_shared::Point;

    #[test]
    fn test_earcut_concave() {
        let l = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let tris = earcut(&l);
        assert_eq!(tris.len(), 4);
        let total: f64 = tris
            .iter()
            .map(|t| area(&[l[t[0]], l[t[1]], l[t[2]]]))
            .sum();
        assert!((total - area(&l)).abs() < 1e-9);
    }
}
