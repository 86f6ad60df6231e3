//! # Voronoi Diagram
//!
//! Incremental Bowyer-Watson Delaunay triangulation and its dual.
//!
//! Sites on the convex hull have unbounded cells and get none; callers that
//! want every real site to have a cell surround them with frame sites.

use bastion_shared::Point;

/// A Delaunay triangle with its circumcircle.
#[derive(Clone, Copy, Debug)]
struct Triangle {
    /// Counter-clockwise corner indices into the point list.
    v: [usize; 3],
    /// Circumcenter.
    c: Point,
    /// Squared circumradius.
    r2: f64,
}

impl Triangle {
    fn new(points: &[Point], a: usize, b: usize, c: usize) -> Self {
        let (pa, pb, pc) = (points[a], points[b], points[c]);
        let v = if (pb - pa).cross(pc - pa) < 0.0 {
            [a, c, b]
        } else {
            [a, b, c]
        };
        let d = 2.0 * (pa.x * (pb.y - pc.y) + pb.x * (pc.y - pa.y) + pc.x * (pa.y - pb.y));
        let center = if d.abs() < f64::EPSILON {
            Point::new(f64::INFINITY, f64::INFINITY)
        } else {
            let (a2, b2, c2) = (pa.length_squared(), pb.length_squared(), pc.length_squared());
            Point::new(
                (a2 * (pb.y - pc.y) + b2 * (pc.y - pa.y) + c2 * (pa.y - pb.y)) / d,
                (a2 * (pc.x - pb.x) + b2 * (pa.x - pc.x) + c2 * (pb.x - pa.x)) / d,
            )
        };
        Self {
            v,
            c: center,
            r2: center.distance_squared(pa),
        }
    }

    fn has(&self, i: usize) -> bool {
        self.v.contains(&i)
    }
}

/// Voronoi diagram of a point set.
#[derive(Clone, Debug)]
pub struct Voronoi {
    /// Input sites.
    pub sites: Vec<Point>,
    /// Cell corners (circumcenters of the Delaunay triangles).
    pub vertices: Vec<Point>,
    /// Cell of every site as counter-clockwise indices into `vertices`,
    /// `None` for hull sites and duplicates.
    pub cells: Vec<Option<Vec<usize>>>,
}

impl Voronoi {
    /// Builds the diagram. Sites are inserted in order.
    #[must_use]
    pub fn build(sites: &[Point]) -> Self {
        let n = sites.len();
        let mut points = sites.to_vec();

        // Super triangle around everything.
        let (mut min, mut max) = (Point::new(f64::MAX, f64::MAX), Point::new(f64::MIN, f64::MIN));
        for p in sites {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        if n == 0 {
            return Self {
                sites: Vec::new(),
                vertices: Vec::new(),
                cells: Vec::new(),
            };
        }
        let mid = Point::midpoint(min, max);
        let span = (max.x - min.x).max(max.y - min.y).max(1.0) * 20.0;
        points.push(mid + Point::new(-span, -span));
        points.push(mid + Point::new(span, -span));
        points.push(mid + Point::new(0.0, span));

        let mut triangles = vec![Triangle::new(&points, n, n + 1, n + 2)];
        let mut skipped = vec![false; n];

        for i in 0..n {
            let p = points[i];
            if (0..i).any(|j| !skipped[j] && points[j].distance_squared(p) < 1e-18) {
                skipped[i] = true;
                continue;
            }
            let (bad, good): (Vec<Triangle>, Vec<Triangle>) =
                triangles.into_iter().partition(|t| t.c.distance_squared(p) < t.r2);
            triangles = good;

            // Edges of the cavity are the bad-triangle edges seen once.
            let mut edges: Vec<(usize, usize)> = Vec::new();
            for t in &bad {
                for k in 0..3 {
                    let e = (t.v[k], t.v[(k + 1) % 3]);
                    if let Some(pos) = edges.iter().position(|&(a, b)| a == e.1 && b == e.0) {
                        edges.remove(pos);
                    } else {
                        edges.push(e);
                    }
                }
            }
            for (a, b) in edges {
                triangles.push(Triangle::new(&points, a, b, i));
            }
        }

        let is_real = |t: &Triangle| t.v.iter().all(|&v| v < n);
        let mut hull = vec![false; n];
        let mut vertices = Vec::new();
        let mut vertex_of = vec![usize::MAX; triangles.len()];
        for (k, t) in triangles.iter().enumerate() {
            if is_real(t) {
                vertex_of[k] = vertices.len();
                vertices.push(t.c);
            } else {
                for &v in &t.v {
                    if v < n {
                        hull[v] = true;
                    }
                }
            }
        }

        let cells = (0..n)
            .map(|i| {
                if hull[i] || skipped[i] {
                    return None;
                }
                let site = points[i];
                let mut around: Vec<(f64, usize)> = triangles
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.has(i))
                    .map(|(k, t)| ((t.c - site).atan2(), vertex_of[k]))
                    .collect();
                if around.len() < 3 {
                    return None;
                }
                around.sort_by(|a, b| a.0.total_cmp(&b.0));
                Some(around.into_iter().map(|(_, v)| v).collect())
            })
            .collect();

        Self {
            sites: sites.to_vec(),
            vertices,
            cells,
        }
    }

    /// Polygon of the cell of site `i`.
    #[must_use]
    pub fn cell_polygon(&self, i: usize) -> Option<Vec<Point>> {
        self.cells[i]
            .as_ref()
            .map(|cell| cell.iter().map(|&v| self.vertices[v]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::polygon::{area, regular};

    #[test]
    fn test_center_cell_of_hexagon() {
        let mut sites = vec![Point::ZERO];
        sites.extend(regular(6, 2.0, 0.0));
        let v = Voronoi::build(&sites);
        let cell = v.cell_polygon(0).unwrap();
        assert_eq!(cell.len(), 6);
        assert!(area(&cell) > 0.0);
        for i in 1..7 {
            assert!(v.cells[i].is_none());
        }
    }

    #[test]
    fn test_cells_tile_the_interior() {
        // A 5×5 lattice, slightly perturbed; the 3×3 interior has cells.
        let mut sites = Vec::new();
        for y in 0..5 {
            for x in 0..5 {
                let jitter = f64::from(x * 7 + y * 3) * 0.01;
                sites.push(Point::new(f64::from(x) + jitter, f64::from(y) - jitter));
            }
        }
        let v = Voronoi::build(&sites);
        let cells = v.cells.iter().filter(|c| c.is_some()).count();
        assert_eq!(cells, 9);
        let total: f64 = (0..sites.len()).filter_map(|i| v.cell_polygon(i)).map(|c| area(&c)).sum();
        assert!(total > 8.0 && total < 10.0);
    }
}
