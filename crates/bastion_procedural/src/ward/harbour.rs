//! Piers reaching into the water from the landing side of a water patch.

use bastion_core::{Point, VertexId};

use crate::city::City;
use crate::patch::PatchId;

/// Spacing of piers along the quay.
const PIER_SPACING: f64 = 6.0;

/// Length of a pier.
const PIER_LENGTH: f64 = 8.0;

/// Harbour ward.
#[derive(Clone, Debug, Default)]
pub struct Harbour {
    /// Piers as segments from the quay outwards.
    pub piers: Vec<(Point, Point)>,
}

impl Harbour {
    pub(super) fn create_geometry(&mut self, city: &City, id: PatchId) {
        self.piers.clear();
        let mouths: Vec<VertexId> = city.canals.iter().filter_map(|c| c.mouth(&city.mesh)).collect();

        let mut quay: Option<(Point, Point)> = None;
        for e in city.mesh.face_edges(city.patch(id).face) {
            let landing = city.twin_patch(e).is_some_and(|p| city.patch(p).landing);
            if !landing {
                continue;
            }
            let (a, b) = city.mesh.segment(e);
            // Piers keep clear of a canal mouth.
            let seg = if mouths.contains(&city.mesh.origin(e)) {
                (Point::midpoint(a, b), b)
            } else if mouths.contains(&city.mesh.dest(e)) {
                (a, Point::midpoint(a, b))
            } else {
                (a, b)
            };
            if quay.map_or(true, |q| q.0.distance(q.1) < seg.0.distance(seg.1)) {
                quay = Some(seg);
            }
        }
        let Some((start, end)) = quay else {
            return;
        };

        let len = start.distance(end);
        let n = (len / PIER_SPACING).floor() as usize;
        if n == 0 {
            return;
        }
        let span = PIER_SPACING * (n - 1) as f64;
        let mut t = (1.0 - span / len) / 2.0;
        let step = if n > 1 { span / (n - 1) as f64 / len } else { 0.0 };
        let out = (end - start).perp().normalized(PIER_LENGTH);
        for _ in 0..n {
            let p = Point::lerp(start, end, t);
            self.piers.push((p, p + out));
            t += step;
        }
    }
}
