//! # Building Footprints
//!
//! A footprint grows on a grid laid over a four-sided lot. Cells are added
//! one at a time next to already occupied ones, then the occupied cells
//! are traced back into a single outline.
//!
//! ## Plans
//!
//! | plan | grows from | stops |
//! |------|------------|-------|
//! | organic | one random cell | once it spans the grid, by chance |
//! | front | the whole first row | once it reaches the last row, by chance |
//! | symmetric | organic without stop chance | mirrored across the middle column |
//!
//! A grid of one column or one row, or a plan covering every cell, yields
//! no building: the caller falls back to the lot itself.

use bastion_core::geom::QuadGrid;
use bastion_core::{Point, Polygon, Random};

/// Cosine above which a corner counts as a straight run.
const STRAIGHT: f64 = 0.999;

/// Chance to keep growing once the organic plan spans the grid.
const GROW_ON: f64 = 0.5;

/// Builds a footprint inside `quad` with cells of about `min_sq` area.
///
/// `front` keeps the first row (the street side) fully built; `symmetric`
/// mirrors the plan. `chaos` jitters the grid.
pub fn create(quad: &[Point], min_sq: f64, front: bool, symmetric: bool, chaos: f64, rng: &mut Random) -> Option<Polygon> {
    let &[q0, q1, q2, q3] = quad else {
        return None;
    };
    let side = min_sq.sqrt();
    if side <= 0.0 {
        return None;
    }
    let cols = (q0.distance(q1).min(q2.distance(q3)) / side).ceil() as usize;
    let rows = (q1.distance(q2).min(q3.distance(q0)) / side).ceil() as usize;
    if cols <= 1 || rows <= 1 {
        return None;
    }

    let plan = if symmetric {
        plan_symmetric(cols, rows, rng)
    } else if front {
        plan_front(cols, rows, rng)
    } else {
        plan_organic(cols, rows, GROW_ON, rng)
    };
    if plan.iter().all(|&c| c) {
        return None;
    }

    let grid = QuadGrid::new(&[q0, q1, q2, q3], cols, rows, chaos, rng);
    let outline = drop_straight(grid.outline(&plan));
    (outline.len() >= 3).then_some(outline)
}

/// Random walk of cells from a random seed cell.
fn plan_organic(cols: usize, rows: usize, grow_on: f64, rng: &mut Random) -> Vec<bool> {
    let mut plan = vec![false; cols * rows];
    let x = (rng.float() * cols as f64) as usize;
    let y = (rng.float() * rows as f64) as usize;
    plan[x + y * cols] = true;
    let mut free = cols * rows - 1;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (x, x, y, y);

    loop {
        let x = (rng.float() * cols as f64) as usize;
        let y = (rng.float() * rows as f64) as usize;
        let i = x + y * cols;
        if !plan[i] && touches(&plan, cols, rows, x, y) {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
            plan[i] = true;
            free -= 1;
        }
        let spans = min_x == 0 && max_x == cols - 1 && min_y == 0 && max_y == rows - 1;
        let more = if !spans {
            true
        } else if free > 0 {
            rng.float() < grow_on
        } else {
            false
        };
        if !more {
            break;
        }
    }
    plan
}

/// Street row built, the rest grown back from it.
fn plan_front(cols: usize, rows: usize, rng: &mut Random) -> Vec<bool> {
    let mut plan: Vec<bool> = (0..cols * rows).map(|i| i < cols).collect();
    let mut free = cols * rows - cols;
    let mut depth = 0;
    loop {
        let x = (rng.float() * cols as f64) as usize;
        let y = (1.0 + rng.float() * (rows - 1) as f64) as usize;
        let i = x + y * cols;
        if i < plan.len() && !plan[i] && touches(&plan, cols, rows, x, y) {
            depth = depth.max(y);
            plan[i] = true;
            free -= 1;
        }
        let more = if depth < rows - 1 {
            true
        } else if free > 0 {
            rng.float() < GROW_ON
        } else {
            false
        };
        if !more {
            break;
        }
    }
    plan
}

/// Organic plan mirrored left to right.
fn plan_symmetric(cols: usize, rows: usize, rng: &mut Random) -> Vec<bool> {
    let mut plan = plan_organic(cols, rows, 0.0, rng);
    for y in 0..rows {
        for x in 0..cols {
            let a = y * cols + x;
            let b = (y + 1) * cols - 1 - x;
            let both = plan[a] || plan[b];
            plan[a] = both;
            plan[b] = both;
        }
    }
    plan
}

/// Whether a cell has an occupied side neighbour.
fn touches(plan: &[bool], cols: usize, rows: usize, x: usize, y: usize) -> bool {
    let i = x + y * cols;
    (x > 0 && plan[i - 1]) || (y > 0 && plan[i - cols]) || (x + 1 < cols && plan[i + 1]) || (y + 1 < rows && plan[i + cols])
}

/// Removes vertices on nearly straight runs.
fn drop_straight(poly: Polygon) -> Polygon {
    let n = poly.len();
    if n <= 3 {
        return poly;
    }
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev = poly[(i + n - 1) % n];
        let cur = poly[i];
        let next = poly[(i + 1) % n];
        let a = cur - prev;
        let b = next - cur;
        let (la, lb) = (a.length(), b.length());
        if la > 0.0 && lb > 0.0 && a.dot(b) / la / lb > STRAIGHT {
            continue;
        }
        out.push(cur);
    }
    if out.len() < 3 {
        poly
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::geom::polygon::{area, rect};
    use bastion_core::geom::contains;

    fn lot() -> Polygon {
        rect(12.0, 8.0)
    }

    #[test]
    fn test_footprint_inside_lot() {
        let quad = lot();
        for seed in 1..20 {
            let mut rng = Random::new(seed);
            if let Some(b) = create(&quad, 4.0, false, false, 0.3, &mut rng) {
                assert!(b.len() >= 3);
                let a = area(&b);
                assert!(a > 0.0 && a < area(&quad), "seed {seed}: area {a}");
                let c = b.iter().fold(Point::ZERO, |acc, &p| acc + p) * (1.0 / b.len() as f64);
                assert!(contains(&quad, c) || b.iter().all(|&p| p.x.abs() <= 6.0 + 1e-6 && p.y.abs() <= 4.0 + 1e-6));
            }
        }
    }

    #[test]
    fn test_tiny_lot_has_no_building() {
        let mut rng = Random::new(7);
        assert!(create(&rect(2.0, 2.0), 4.0, false, false, 0.0, &mut rng).is_none());
        assert!(create(&rect(2.0, 2.0)[..3], 0.1, false, false, 0.0, &mut rng).is_none());
    }

    #[test]
    fn test_front_plan_keeps_first_row() {
        let mut rng = Random::new(3);
        let plan = plan_front(5, 4, &mut rng);
        assert!(plan[..5].iter().all(|&c| c));
        // Grows until the last row is reached.
        assert!(plan[15..].iter().any(|&c| c));
    }

    #[test]
    fn test_symmetric_plan_is_mirrored() {
        let mut rng = Random::new(11);
        let plan = plan_symmetric(6, 3, &mut rng);
        for y in 0..3 {
            for x in 0..6 {
                assert_eq!(plan[y * 6 + x], plan[y * 6 + 5 - x]);
            }
        }
    }

    #[test]
    fn test_organic_plan_spans_grid() {
        let mut rng = Random::new(5);
        let plan = plan_organic(4, 4, 0.0, &mut rng);
        let cols: Vec<bool> = (0..4).map(|x| (0..4).any(|y| plan[x + y * 4])).collect();
        assert!(cols.iter().all(|&c| c));
    }
}
