//! Public green: the available area with its corners rounded off.

use bastion_core::geom::chaikin;
use bastion_core::{Point, Polygon, Random};

use super::base_available;
use crate::city::City;
use crate::forester::Forester;
use crate::patch::PatchId;

/// Park ward.
#[derive(Clone, Debug, Default)]
pub struct Park {
    /// Outline of the green.
    pub green: Polygon,
}

impl Park {
    pub(super) fn create_geometry(&mut self, city: &City, id: PatchId, rng: &mut Random) {
        let Some(space) = base_available(city, id, rng) else {
            self.green.clear();
            return;
        };
        let n = space.len();
        let mut outline = Vec::with_capacity(2 * n);
        for i in 0..n {
            let next = space[(i + 1) % n];
            outline.push(space[i]);
            outline.push(Point::midpoint(space[i], next));
        }
        self.green = chaikin(&outline, true, 3, &[]);
    }

    pub(super) fn spawn_trees(&self, city: &City, id: PatchId, forester: &Forester, rng: &mut Random) -> Vec<Point> {
        let greenery = city
            .patch(id)
            .district
            .and_then(|d| city.districts.get(d))
            .map_or(0.5, |d| d.params.greenery);
        forester.fill_area(&self.green, greenery, rng)
    }
}
