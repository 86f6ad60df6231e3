//! # Farmland
//!
//! The available area is split into fields until they fall below a
//! random size, each field is ploughed with furrows across its bounding
//! box, and now and then a farmhouse stands in a field corner.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_8};

use bastion_core::geom::cut::{chords, cut};
use bastion_core::geom::polygon::{area, longest_edge, rect, rotate_yx, translate};
use bastion_core::geom::segment::converge;
use bastion_core::geom::obb;
use bastion_core::{EdgeId, Point, Polygon, Random};
use bastion_shared::constants::{MIN_FURROW, MIN_SUBPLOT};
use bastion_shared::WALL_THICKNESS;

use super::{inset_with_clearances, vertex_clearance, WardKind, MARGIN};
use crate::building;
use crate::city::City;
use crate::forester::Forester;
use crate::patch::{EdgeKind, PatchId};

/// Width of the balk left between two fields.
const BALK: f64 = 2.0;

/// Chance of a farmhouse in a field.
const HOUSE_CHANCE: f64 = 0.2;

/// Upper bound of field splits.
const MAX_FIELDS: usize = 256;

/// Farm ward.
#[derive(Clone, Debug, Default)]
pub struct Farm {
    /// Fields.
    pub sub_plots: Vec<Polygon>,
    /// Furrows as segments.
    pub furrows: Vec<(Point, Point)>,
    /// Farmhouses.
    pub buildings: Vec<Polygon>,
}

/// Fields keep well back from roads and walls.
pub(super) fn available(city: &City, id: PatchId, rng: &mut Random) -> Option<Polygon> {
    let edges = city.mesh.face_edges(city.patch(id).face);
    let shape = city.mesh.chain_polygon(&edges);
    let insets: Vec<f64> = edges
        .iter()
        .map(|&e| match city.mesh.data(e) {
            None => {
                let farm_next_door = city
                    .twin_patch(e)
                    .is_some_and(|p| city.patch(p).has_ward(WardKind::Farm));
                if farm_next_door {
                    1.0
                } else {
                    0.0
                }
            }
            Some(EdgeKind::Road) => 3.0,
            Some(EdgeKind::Wall) => 2.0 * WALL_THICKNESS,
            Some(EdgeKind::Canal) => city.canal_width() / 2.0 + MARGIN,
            Some(_) => 2.0,
        })
        .collect();
    let clear: Vec<f64> = edges
        .iter()
        .map(|&e| vertex_clearance(city, city.mesh.origin(e), 0.0))
        .collect();
    inset_with_clearances(&shape, &insets, &clear, rng)
}

impl Farm {
    pub(super) fn create_geometry(&mut self, city: &City, id: PatchId, rng: &mut Random) {
        self.sub_plots.clear();
        self.furrows.clear();
        self.buildings.clear();
        let Some(space) = available(city, id, rng) else {
            return;
        };

        let mut fields = split_field(space, rng);

        // Fields flush against a neighbour that is not farmland are left wild.
        let open_sides: Vec<EdgeId> = city
            .mesh
            .face_edges(city.patch(id).face)
            .into_iter()
            .filter(|&e| {
                city.mesh.data(e).is_none()
                    && city
                        .twin_patch(e)
                        .is_some_and(|p| city.patch(p).ward.is_some() && !city.patch(p).has_ward(WardKind::Farm))
            })
            .collect();
        if !open_sides.is_empty() {
            fields.retain(|field| {
                let n = field.len();
                !(0..n).any(|i| {
                    open_sides.iter().any(|&e| {
                        let (a, b) = city.mesh.segment(e);
                        converge(field[i], field[(i + 1) % n], a, b)
                    })
                })
            });
        }

        for field in &fields {
            let b = obb(field);
            let plot = round(field);
            let n = (b[0].distance(b[1]) / MIN_FURROW).ceil() as usize;
            for i in 0..n {
                let t = (i as f64 + 0.5) / n as f64;
                let a = Point::lerp(b[0], b[1], t);
                let z = Point::lerp(b[3], b[2], t);
                for (p, q) in chords(&plot, a, z - a) {
                    if p.distance(q) > MARGIN {
                        self.furrows.push((p, q));
                    }
                }
            }
        }

        for field in &fields {
            if rng.float() < HOUSE_CHANCE {
                self.buildings.push(housing(field, rng));
            }
        }
        self.sub_plots = fields;
    }

    pub(super) fn spawn_trees(&self, city: &City, forester: &Forester, rng: &mut Random) -> Vec<Point> {
        let (lo, hi) = city.bounds();
        let reach = (hi.x - lo.x).max(hi.y - lo.y) * rng.avg3();
        let mut trees = Vec::new();
        if reach <= 0.0 {
            return trees;
        }
        for field in &self.sub_plots {
            let n = field.len();
            for i in 0..n {
                let (p, q) = (field[i], field[(i + 1) % n]);
                let density = 1.0 - Point::midpoint(p, q).length() / reach;
                trees.extend(forester.fill_line(p, q, density, rng));
            }
        }
        trees
    }
}

/// Splits a field across its long side until pieces are small enough.
fn split_field(space: Polygon, rng: &mut Random) -> Vec<Polygon> {
    let mut done = Vec::new();
    let mut pending = vec![space];
    while let Some(field) = pending.pop() {
        if done.len() + pending.len() >= MAX_FIELDS
            || area(&field).abs() < MIN_SUBPLOT * (1.0 + rng.spread4().abs())
        {
            done.push(field);
            continue;
        }
        let b = obb(&field);
        let c = if b[0].distance(b[1]) > b[1].distance(b[2]) { 0 } else { 1 };
        let d = 0.5 + 0.2 * (rng.avg3() * 2.0 - 1.0);
        let turn = FRAC_PI_2
            + if rng.float() < 0.5 {
                0.0
            } else {
                FRAC_PI_8 * (rng.avg3() * 2.0 - 1.0)
            };
        let p = Point::lerp(b[c], b[c + 1], d);
        let dir = (b[c + 1] - b[c]).rotate(turn);
        let pieces = cut(&field, p, p + dir, BALK);
        if pieces.len() < 2 {
            done.push(field);
        } else {
            pending.extend(pieces.into_iter().rev());
        }
    }
    done
}

/// Field outline with corners cut back by a furrow width.
fn round(field: &[Point]) -> Polygon {
    let n = field.len();
    let mut out = Vec::with_capacity(2 * n);
    for i in 0..n {
        let (h, f) = (field[i], field[(i + 1) % n]);
        let k = h.distance(f);
        if k < 2.0 * MIN_FURROW {
            out.push(Point::midpoint(h, f));
        } else {
            out.push(Point::lerp(h, f, MIN_FURROW / k));
            out.push(Point::lerp(f, h, MIN_FURROW / k));
        }
    }
    out
}

/// Farmhouse in a corner of the longest field side.
fn housing(field: &[Point], rng: &mut Random) -> Polygon {
    let w = 4.0 + rng.float();
    let h = 2.0 + rng.float();
    let house = rect(w, h);
    let i = longest_edge(field);
    let (a, b) = (field[i], field[(i + 1) % field.len()]);
    let k = (b - a).normalized(1.0);
    let mut pos = if rng.float() < 0.5 { a + k * (w / 2.0) } else { b - k * (w / 2.0) };
    pos += k.perp() * (h / 2.0);
    let house = translate(&rotate_yx(&house, k.y, k.x), pos);
    let min_sq = 4.0 + rng.float();
    building::create(&house, min_sq, false, false, 0.4, rng).unwrap_or(house)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::geom::contains;

    #[test]
    fn test_split_field_makes_small_fields() {
        let mut rng = Random::new(17);
        let space = rect(120.0, 80.0);
        let fields = split_field(space.clone(), &mut rng);
        assert!(fields.len() > 4);
        let total: f64 = fields.iter().map(|f| area(f)).sum();
        // Balks between fields take some of the land.
        assert!(total < area(&space));
        assert!(fields.iter().all(|f| f.len() >= 3));
    }

    #[test]
    fn test_small_field_stays_whole() {
        let mut rng = Random::new(17);
        let fields = split_field(rect(10.0, 10.0), &mut rng);
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_round_cuts_corners() {
        let r = round(&rect(10.0, 2.0));
        // Long sides keep two points each, short sides one.
        assert_eq!(r.len(), 6);
        assert!(area(&r) < 20.0);
    }

    #[test]
    fn test_housing_stands_inside_field() {
        let field = rect(40.0, 30.0);
        for seed in 1..10 {
            let mut rng = Random::new(seed);
            let house = housing(&field, &mut rng);
            assert!(house.iter().all(|&p| contains(&field, p) || p.y.abs() <= 15.0 + 1e-6));
        }
    }
}
