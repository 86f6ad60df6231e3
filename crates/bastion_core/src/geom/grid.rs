//! Quad grids over four-sided shapes.

use bastion_shared::{Point, Polygon};

use crate::random::Random;

/// A `cols × rows` bilinear grid spanning a quadrilateral.
///
/// Points are shared between neighbouring cells, so cell outlines can be
/// merged by index. Columns run along the first edge of the quad, rows
/// along the last one.
#[derive(Clone, Debug)]
pub struct QuadGrid {
    /// Grid points, `(cols + 1) × (rows + 1)` row by row.
    pub points: Vec<Point>,
    /// Columns.
    pub cols: usize,
    /// Rows.
    pub rows: usize,
}

impl QuadGrid {
    /// Builds a grid over `quad`, jittering interior points by `chaos`
    /// of a cell.
    #[must_use]
    pub fn new(quad: &[Point; 4], cols: usize, rows: usize, chaos: f64, rng: &mut Random) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let mut points = Vec::with_capacity((cols + 1) * (rows + 1));
        for y in 0..=rows {
            for x in 0..=cols {
                let mut u = x as f64 / cols as f64;
                let mut v = y as f64 / rows as f64;
                if chaos > 0.0 && x > 0 && x < cols && y > 0 && y < rows {
                    u += (rng.float() - 0.5) * chaos / cols as f64;
                    v += (rng.float() - 0.5) * chaos / rows as f64;
                }
                let bottom = Point::lerp(quad[0], quad[1], u);
                let top = Point::lerp(quad[3], quad[2], u);
                points.push(Point::lerp(bottom, top, v));
            }
        }
        Self { points, cols, rows }
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.cols * self.rows
    }

    /// Whether the grid has no cells.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point index of grid corner `(x, y)`.
    #[inline]
    #[must_use]
    pub const fn point_index(&self, x: usize, y: usize) -> usize {
        x + y * (self.cols + 1)
    }

    /// Corner indices of cell `x + y·cols`, in the quad's orientation.
    #[must_use]
    pub const fn cell(&self, index: usize) -> [usize; 4] {
        let x = index % self.cols;
        let y = index / self.cols;
        [
            self.point_index(x, y),
            self.point_index(x + 1, y),
            self.point_index(x + 1, y + 1),
            self.point_index(x, y + 1),
        ]
    }

    /// Polygon of one cell.
    #[must_use]
    pub fn cell_polygon(&self, index: usize) -> Polygon {
        self.cell(index).iter().map(|&i| self.points[i]).collect()
    }

    /// Outer boundary of the union of the selected cells.
    ///
    /// Cells touching only at a corner are joined through that corner.
    /// Straight runs collapse to their end points.
    #[must_use]
    pub fn outline(&self, selected: &[bool]) -> Polygon {
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (i, _) in selected.iter().enumerate().filter(|(_, s)| **s) {
            let c = self.cell(i);
            for k in 0..4 {
                edges.push((c[k], c[(k + 1) % 4]));
            }
        }
        let boundary: Vec<(usize, usize)> = edges
            .iter()
            .copied()
            .filter(|&(a, b)| !edges.contains(&(b, a)))
            .collect();
        let Some(&first) = boundary.iter().min() else {
            return Vec::new();
        };

        let cols = self.cols + 1;
        let dir = |(a, b): (usize, usize)| -> (i64, i64) {
            ((b % cols) as i64 - (a % cols) as i64, (b / cols) as i64 - (a / cols) as i64)
        };

        let mut used = vec![false; boundary.len()];
        let mut loop_idx: Vec<usize> = Vec::new();
        let mut cur = first;
        for _ in 0..boundary.len() {
            let Some(pos) = boundary.iter().position(|&e| e == cur) else {
                break;
            };
            if used[pos] {
                break;
            }
            used[pos] = true;
            loop_idx.push(cur.0);
            let (dx, dy) = dir(cur);
            // Rightmost turn keeps corner-touching cells on one loop.
            let next = boundary
                .iter()
                .enumerate()
                .filter(|(i, e)| e.0 == cur.1 && !used[*i])
                .min_by_key(|(_, e)| {
                    let (ex, ey) = dir(**e);
                    let turn = dx * ey - dy * ex;
                    let straight = dx * ex + dy * ey;
                    (turn, -straight)
                })
                .map(|(_, e)| *e);
            match next {
                Some(e) => cur = e,
                None => break,
            }
        }

        let mut poly: Polygon = loop_idx.iter().map(|&i| self.points[i]).collect();
        remove_straight(&mut poly);
        poly
    }
}

/// Removes vertices whose edges continue in nearly the same direction.
fn remove_straight(poly: &mut Polygon) {
    let mut i = 0;
    while poly.len() > 3 && i < poly.len() {
        let n = poly.len();
        let prev = poly[(i + n - 1) % n];
        let next = poly[(i + 1) % n];
        let a = (poly[i] - prev).normalized(1.0);
        let b = (next - poly[i]).normalized(1.0);
        if a.dot(b) > 0.999 {
            poly.remove(i);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::polygon::area;

    fn unit_grid(cols: usize, rows: usize) -> QuadGrid {
        let quad = [
            Point::new(0.0, 0.0),
            Point::new(cols as f64, 0.0),
            Point::new(cols as f64, rows as f64),
            Point::new(0.0, rows as f64),
        ];
        QuadGrid::new(&quad, cols, rows, 0.0, &mut Random::new(1))
    }

    #[test]
    fn test_outline_of_l_shape() {
        let grid = unit_grid(2, 2);
        let outline = grid.outline(&[true, true, true, false]);
        assert_eq!(outline.len(), 6);
        assert!((area(&outline) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_outline_of_full_grid() {
        let grid = unit_grid(3, 2);
        let outline = grid.outline(&[true; 6]);
        assert_eq!(outline.len(), 4);
        assert!((area(&outline) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_outline_joins_diagonal_cells() {
        let grid = unit_grid(2, 2);
        let outline = grid.outline(&[true, false, false, true]);
        assert!((area(&outline) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_chaos_keeps_border() {
        let quad = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let grid = QuadGrid::new(&quad, 4, 4, 0.5, &mut Random::new(9));
        let full = grid.outline(&[true; 16]);
        assert!((area(&full) - 16.0).abs() < 1e-9);
    }
}
