//! Market square: open space with a statue or a fountain.

use bastion_core::geom::polygon::{centroid, longest_edge, rect, regular, rotate_yx, translate};
use bastion_core::{Point, Polygon, Random};

use super::inset_with_clearances;
use crate::city::City;
use crate::patch::{EdgeKind, PatchId};

/// Market ward.
#[derive(Clone, Debug, Default)]
pub struct Market {
    /// Open space of the square.
    pub space: Polygon,
    /// Statue plinth or fountain basin.
    pub monument: Polygon,
}

/// A square only keeps clear of canal banks.
pub(super) fn available(city: &City, id: PatchId, rng: &mut Random) -> Option<Polygon> {
    let edges = city.mesh.face_edges(city.patch(id).face);
    let shape = city.mesh.chain_polygon(&edges);
    let half = city.canal_width() / 2.0;
    let insets: Vec<f64> = edges
        .iter()
        .map(|&e| if city.mesh.data(e) == Some(EdgeKind::Canal) { half } else { 0.0 })
        .collect();
    let clear: Vec<f64> = edges
        .iter()
        .map(|&e| city.canal_clearance(city.mesh.origin(e), 0.0).unwrap_or(0.0))
        .collect();
    inset_with_clearances(&shape, &insets, &clear, rng)
}

impl Market {
    pub(super) fn create_geometry(&mut self, city: &City, id: PatchId, rng: &mut Random) {
        self.space = available(city, id, rng).unwrap_or_else(|| city.patch(id).shape.clone());

        let statue = rng.float() < 0.6;
        let offset = statue || rng.float() < 0.3;

        let mut side = None;
        if statue || offset {
            let i = longest_edge(&self.space);
            side = Some((self.space[i], self.space[(i + 1) % self.space.len()]));
        }

        let monument = match side {
            Some((c, d)) if statue => {
                let plinth = rect(1.0 + rng.float(), 1.0 + rng.float());
                let dir = (d - c).normalized(1.0);
                rotate_yx(&plinth, dir.y, dir.x)
            }
            _ => regular(8, 1.0 + rng.float(), 0.0),
        };

        let mid = centroid(&self.space);
        let at = match side {
            Some((c, d)) if offset => Point::lerp(mid, Point::midpoint(c, d), 0.2 + rng.float() * 0.4),
            _ => mid,
        };
        self.monument = translate(&monument, at);
    }
}
