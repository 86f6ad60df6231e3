//! Citadel: its own wall around a single patch, reshaped to be round
//! enough for a fortress, and a keep in the middle.

use std::f64::consts::TAU;

use bastion_core::geom::polygon::{area, centroid};
use bastion_core::geom::{compactness, lira, shrink_eq};
use bastion_core::{Point, Polygon, Random, VertexId};
use bastion_shared::WALL_THICKNESS;
use tracing::trace;

use crate::building;
use crate::city::City;
use crate::error::{GenerationError, GenerationResult};
use crate::patch::PatchId;
use crate::wall::CurtainWall;

/// Smallest distance from the citadel centroid to its wall.
const MIN_RADIUS: f64 = 10.0;

/// Compactness the citadel is equalized to.
const MIN_COMPACTNESS: f64 = 0.75;

/// Upper bound of bloating steps.
const MAX_BLOAT: usize = 32;

/// Citadel ward.
#[derive(Clone, Debug)]
pub struct Castle {
    /// Citadel wall.
    pub wall: CurtainWall,
    /// Keep footprint.
    pub building: Polygon,
}

impl Castle {
    /// Walls in patch `id` and reshapes it.
    ///
    /// # Errors
    ///
    /// `BadCitadel` when the shape stops getting rounder, or a wall error.
    pub fn new(city: &mut City, id: PatchId, rng: &mut Random) -> GenerationResult<Self> {
        let face = city.patch(id).face;
        let reserved: Vec<VertexId> = city
            .mesh
            .face_vertices(face)
            .into_iter()
            .filter(|&v| city.cells_at(v).iter().any(|&p| !city.patch(p).within_city))
            .collect();
        let wall = CurtainWall::new(true, city, &[id], &reserved, rng)?;
        let castle = Self {
            wall,
            building: Vec::new(),
        };
        castle.adjust_shape(city, id)?;
        Ok(castle)
    }

    fn adjust_shape(&self, city: &mut City, id: PatchId) -> GenerationResult<()> {
        let face = city.patch(id).face;
        let ring = city.mesh.face_vertices(face);
        let mut pts: Vec<Point> = ring.iter().map(|&v| city.mesh.point(v)).collect();
        let c = centroid(&pts);

        let (mut lo, mut hi) = radii(&pts, c);
        let mut steps = 0;
        while lo < MIN_RADIUS && steps < MAX_BLOAT {
            trace!(radius = lo, "bloating citadel");
            steps += 1;
            let k = 2.0 * hi.max(15.0);
            let all: Vec<VertexId> = city.mesh.vertex_ids().collect();
            for v in all {
                let p = city.mesh.point(v);
                let d = p.distance(c);
                if d > 0.0 && d < k {
                    city.mesh.set_point(v, c + (p - c) * (d / k).powf(-0.25));
                }
            }
            pts = ring.iter().map(|&v| city.mesh.point(v)).collect();
            (lo, hi) = radii(&pts, c);
        }

        let mut fixed = Vec::new();
        if let Some(&gate) = self.wall.gates.first() {
            fixed.push(gate);
            let out = &city.mesh.vertex(gate).edges;
            if out.len() == 2 {
                fixed.extend(out.iter().map(|&e| city.mesh.dest(e)));
            }
        }
        let fixed: Vec<bool> = ring.iter().map(|v| fixed.contains(v)).collect();

        let mut h = compactness(&pts);
        while h < MIN_COMPACTNESS {
            trace!(compactness = h, "equalizing citadel");
            equalize(&mut pts, c, 0.2, &fixed);
            let k = compactness(&pts);
            if (k - h).abs() < 0.001 {
                return Err(GenerationError::BadCitadel(k));
            }
            h = k;
        }
        city.move_vertices(&ring, &pts);
        Ok(())
    }

    pub(super) fn create_geometry(&mut self, city: &City, id: PatchId, rng: &mut Random) {
        let shape = &city.patch(id).shape;
        let keep = match shrink_eq(shape, WALL_THICKNESS + 2.0) {
            Some(inner) => lira(&inner),
            None => lira(shape),
        };
        let min_sq = area(&keep) / 25.0;
        self.building = building::create(&keep, min_sq, false, false, 0.4, rng).unwrap_or(keep);
    }
}

/// Nearest and farthest vertex distance from `c`.
fn radii(pts: &[Point], c: Point) -> (f64, f64) {
    pts.iter().fold((f64::INFINITY, 0.0_f64), |(lo, hi), p| {
        let d = p.distance(c);
        (lo.min(d), hi.max(d))
    })
}

/// Pulls every free vertex towards the rotational average of the ring.
fn equalize(pts: &mut [Point], c: Point, f: f64, fixed: &[bool]) {
    let n = pts.len();
    let step = TAU / n as f64;
    let mut avg = Point::ZERO;
    for (i, &p) in pts.iter().enumerate() {
        avg += (p - c).rotate(-step * i as f64);
    }
    avg = avg * (1.0 / n as f64);
    for (i, p) in pts.iter_mut().enumerate() {
        if fixed.get(i).copied().unwrap_or(false) {
            continue;
        }
        let target = c + avg.rotate(step * i as f64);
        *p = Point::lerp(*p, target, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::geom::polygon::rect;

    #[test]
    fn test_equalize_rounds_a_slab() {
        let mut pts = vec![
            Point::new(-20.0, -4.0),
            Point::new(0.0, -5.0),
            Point::new(20.0, -4.0),
            Point::new(20.0, 4.0),
            Point::new(0.0, 5.0),
            Point::new(-20.0, 4.0),
        ];
        let before = compactness(&pts);
        let c = centroid(&pts);
        for _ in 0..10 {
            equalize(&mut pts, c, 0.2, &[false; 6]);
        }
        assert!(compactness(&pts) > before);
    }

    #[test]
    fn test_equalize_respects_fixed() {
        let mut pts = rect(30.0, 6.0);
        let keep = pts[0];
        equalize(&mut pts, Point::ZERO, 0.2, &[true, false, false, false]);
        assert_eq!(pts[0], keep);
    }

    #[test]
    fn test_radii() {
        let (lo, hi) = radii(&rect(6.0, 8.0), Point::ZERO);
        assert!((lo - 5.0).abs() < 1e-9 && (hi - 5.0).abs() < 1e-9);
    }
}
