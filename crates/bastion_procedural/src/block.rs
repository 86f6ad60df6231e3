//! # Blocks
//!
//! A block is the land between alleys. It is cut into lots by a twisting
//! bisection, lots that don't reach the street become courtyards, and
//! every remaining lot gets a rectangle and a building inside it.

use bastion_core::geom::polygon::{area, contains_polygon, on_boundary, perimeter, simplify_closed};
use bastion_core::geom::segment::converge;
use bastion_core::geom::{lir, lira, obb, rect_area};
use bastion_core::{Point, Polygon, Random};
use bastion_shared::ALLEY;

/// Share of the district's minimum frontage a lot must have on the street.
const MIN_FRONT_SHARE: f64 = 0.5;
/// Longest to shortest side of a lot's bounding box.
const MAX_ASPECT: f64 = 4.0;

use crate::bisector::{Bisector, PlainCuts};
use crate::building;
use crate::district::AlleyParams;

/// A block of lots.
#[derive(Clone, Debug)]
pub struct Block {
    /// Outline.
    pub shape: Polygon,
    /// Building lots facing the street.
    pub lots: Vec<Polygon>,
    /// Rectangle inside each lot.
    pub rects: Vec<Polygon>,
    /// Building footprint of each lot.
    pub buildings: Vec<Polygon>,
    /// Lots cut off from the street.
    pub courtyards: Vec<Polygon>,
}

impl Block {
    /// Subdivides `shape`; a `single` block is one lot.
    pub fn new(shape: Polygon, single: bool, params: &AlleyParams, rng: &mut Random) -> Self {
        let (lots, courtyards) = if single {
            (vec![shape.clone()], Vec::new())
        } else {
            create_lots(&shape, params, rng)
        };
        let rects: Vec<Polygon> = lots.iter().map(|lot| create_rect(lot, &shape)).collect();
        let min_sq = params.min_sq / 4.0 * params.shape_factor;
        let buildings = lots
            .iter()
            .zip(&rects)
            .map(|(lot, rect)| create_building(lot, rect, min_sq, rng))
            .collect();
        Self {
            shape,
            lots,
            rects,
            buildings,
            courtyards,
        }
    }

    /// Keeps the lots for which `keep` holds, with their rectangles and
    /// buildings.
    pub fn retain_lots(&mut self, mut keep: impl FnMut(&[Point]) -> bool) {
        let mut i = 0;
        while i < self.lots.len() {
            if keep(&self.lots[i]) {
                i += 1;
            } else {
                self.lots.remove(i);
                self.rects.remove(i);
                self.buildings.remove(i);
            }
        }
    }
}

/// Lots and courtyards of a block.
fn create_lots(shape: &Polygon, params: &AlleyParams, rng: &mut Random) -> (Vec<Polygon>, Vec<Polygon>) {
    let mut bisector = Bisector::new(shape.clone(), params.min_sq, (4.0 * params.size_chaos).max(ALLEY), &PlainCuts);
    bisector.min_turn_offset = 0.5;
    let pieces = bisector.partition(rng);

    let tolerance = 1e-6 * (1.0 + perimeter(shape));
    let (lots, courtyards): (Vec<Polygon>, Vec<Polygon>) = pieces
        .into_iter()
        .partition(|lot| lot.iter().any(|&p| on_boundary(shape, p, tolerance)));

    let lots = lots
        .into_iter()
        .filter(|lot| {
            if lot.len() < 4 {
                return false;
            }
            let a = area(lot).abs();
            let b = obb(lot);
            let (w, h) = (b[0].distance(b[1]), b[1].distance(b[2]));
            a >= params.min_sq / 4.0
                && w.min(h) >= ALLEY
                && w.max(h) <= MAX_ASPECT * w.min(h)
                && a / rect_area(&b) > 0.5
                && frontage(lot, shape) >= MIN_FRONT_SHARE * params.min_front
        })
        .collect();
    (lots, courtyards)
}

/// Length of the lot's outline that lies on the block's outline.
fn frontage(lot: &[Point], block: &[Point]) -> f64 {
    let n = lot.len();
    let m = block.len();
    (0..n)
        .filter(|&i| (0..m).any(|j| converge(lot[i], lot[(i + 1) % n], block[j], block[(j + 1) % m])))
        .map(|i| lot[i].distance(lot[(i + 1) % n]))
        .sum()
}

/// Rectangle for a lot: the lot itself when it already is one, else the
/// largest rectangle standing on its street side.
fn create_rect(lot: &Polygon, block: &[Point]) -> Polygon {
    let a = area(lot).abs();
    if lot.len() == 4 && a / rect_area(&obb(lot)) > 0.75 {
        return lot.clone();
    }

    let n = lot.len();
    let m = block.len();
    let street: Vec<usize> = (0..n)
        .filter(|&i| (0..m).any(|j| converge(lot[i], lot[(i + 1) % n], block[j], block[(j + 1) % m])))
        .collect();
    let rect = match street.as_slice() {
        [edge] => lir(lot, *edge),
        [] => lira(lot),
        _ => return lot.clone(),
    };
    let min_side = ALLEY.max(a.sqrt() / 2.0);
    if rect.len() == 4 && rect[0].distance(rect[1]) >= min_side && rect[1].distance(rect[2]) >= min_side {
        rect
    } else {
        lot.clone()
    }
}

/// Building for a lot, planned on its rectangle. Anything that would
/// stick out of the lot falls back to a shape that doesn't.
fn create_building(lot: &Polygon, rect: &Polygon, min_sq: f64, rng: &mut Random) -> Polygon {
    let tolerance = 1e-6 * (1.0 + perimeter(lot));
    let inside = |shape: &[Point]| contains_polygon(lot, shape, tolerance);
    let fallback = || if inside(rect) { rect.clone() } else { lot.clone() };

    let mut quad = rect.clone();
    while quad.len() > 4 {
        simplify_closed(&mut quad);
    }
    if quad.len() != 4 || !inside(&quad) {
        return fallback();
    }
    match building::create(&quad, min_sq, true, false, 0.6, rng) {
        Some(footprint) if inside(&footprint) => footprint,
        _ => quad,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::geom::polygon::rect;

    fn params() -> AlleyParams {
        AlleyParams {
            min_sq: 30.0,
            grid_chaos: 0.4,
            size_chaos: 0.5,
            shape_factor: 1.0,
            inset: 0.3,
            block_size: 8.0,
            min_front: 30f64.sqrt(),
            greenery: 0.2,
        }
    }

    #[test]
    fn test_single_block_has_one_lot() {
        let mut rng = Random::new(3);
        let block = Block::new(rect(12.0, 8.0), true, &params(), &mut rng);
        assert_eq!(block.lots.len(), 1);
        assert_eq!(block.buildings.len(), 1);
        assert!(block.courtyards.is_empty());
    }

    #[test]
    fn test_lots_face_the_street() {
        let mut rng = Random::new(8);
        let shape = rect(40.0, 30.0);
        let block = Block::new(shape.clone(), false, &params(), &mut rng);
        assert!(!block.lots.is_empty());
        assert_eq!(block.lots.len(), block.rects.len());
        assert_eq!(block.lots.len(), block.buildings.len());
        for lot in &block.lots {
            assert!(lot.iter().any(|&p| on_boundary(&shape, p, 1e-6)));
        }
    }

    #[test]
    fn test_buildings_stay_in_lots() {
        let mut rng = Random::new(12);
        let block = Block::new(rect(40.0, 30.0), false, &params(), &mut rng);
        for (lot, b) in block.lots.iter().zip(&block.buildings) {
            assert!(area(b).abs() <= area(lot).abs() + 1e-6);
            assert!(contains_polygon(lot, b, 1e-6 * (1.0 + perimeter(lot))));
        }
    }

    #[test]
    fn test_building_outside_lot_falls_back_to_lot() {
        let mut rng = Random::new(4);
        let lot = rect(6.0, 4.0);
        // A rectangle poking out of the lot must not become the building.
        let rect_out: Polygon = lot.iter().map(|&p| p * 1.5).collect();
        let b = create_building(&lot, &rect_out, 4.0, &mut rng);
        assert_eq!(b, lot);
    }

    #[test]
    fn test_many_blocks_keep_buildings_inside() {
        for seed in 1..20 {
            let mut rng = Random::new(seed);
            let shape = vec![
                Point::new(0.0, 0.0),
                Point::new(36.0, -4.0),
                Point::new(44.0, 22.0),
                Point::new(14.0, 34.0),
                Point::new(-6.0, 18.0),
            ];
            let block = Block::new(shape, false, &params(), &mut rng);
            for (lot, b) in block.lots.iter().zip(&block.buildings) {
                assert!(contains_polygon(lot, b, 1e-6 * (1.0 + perimeter(lot))), "seed {seed}");
            }
        }
    }

    #[test]
    fn test_lots_have_frontage_and_proportion() {
        let mut rng = Random::new(8);
        let shape = rect(40.0, 30.0);
        let p = params();
        let block = Block::new(shape.clone(), false, &p, &mut rng);
        for lot in &block.lots {
            assert!(frontage(lot, &shape) >= MIN_FRONT_SHARE * p.min_front);
            let b = obb(lot);
            let (w, h) = (b[0].distance(b[1]), b[1].distance(b[2]));
            assert!(w.max(h) <= MAX_ASPECT * w.min(h) + 1e-9);
        }
    }

    #[test]
    fn test_frontage_of_corner_lot() {
        let block = rect(20.0, 20.0);
        let lot = vec![
            Point::new(-10.0, -10.0),
            Point::new(-5.0, -10.0),
            Point::new(-5.0, -6.0),
            Point::new(-10.0, -6.0),
        ];
        assert!((frontage(&lot, &block) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_rectangular_lot_is_its_own_rect() {
        let lot = rect(6.0, 4.0);
        assert_eq!(create_rect(&lot, &rect(20.0, 20.0)), lot);
    }

    #[test]
    fn test_retain_lots_keeps_alignment() {
        let mut rng = Random::new(8);
        let mut block = Block::new(rect(40.0, 30.0), false, &params(), &mut rng);
        let before = block.lots.len();
        let mut flip = false;
        block.retain_lots(|_| {
            flip = !flip;
            flip
        });
        assert_eq!(block.lots.len(), (before + 1) / 2);
        assert_eq!(block.lots.len(), block.buildings.len());
        assert_eq!(block.lots.len(), block.rects.len());
    }
}
