//! Main temple: one symmetric building filling the largest rectangle of
//! the available area.

use bastion_core::geom::lira;
use bastion_core::{Polygon, Random};

use super::base_available;
use crate::building;
use crate::city::City;
use crate::patch::PatchId;

/// Cell area of the temple plan.
const CELL_AREA: f64 = 20.0;

/// Temple ward.
#[derive(Clone, Debug, Default)]
pub struct Cathedral {
    /// Temple footprint, empty when the patch has no room.
    pub building: Polygon,
}

impl Cathedral {
    pub(super) fn create_geometry(&mut self, city: &City, id: PatchId, rng: &mut Random) {
        self.building = match base_available(city, id, rng) {
            Some(space) => {
                let rect = lira(&space);
                building::create(&rect, CELL_AREA, false, true, 0.2, rng).unwrap_or(rect)
            }
            None => Vec::new(),
        };
    }
}
