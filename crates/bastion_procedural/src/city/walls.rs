//! Curtain wall, citadel and towers.

use bastion_core::{Random, VertexId};

use super::City;
use crate::error::GenerationResult;
use crate::patch::EdgeKind;
use crate::wall::CurtainWall;
use crate::ward::{Castle, Ward};

impl City {
    /// Builds the border (real only with walls) and the citadel.
    pub(super) fn build_walls(&mut self, rng: &mut Random) -> GenerationResult<()> {
        rng.save();
        let result = self.build_walls_inner(rng);
        rng.restore();
        result
    }

    fn build_walls_inner(&mut self, rng: &mut Random) -> GenerationResult<()> {
        let mut reserved: Vec<VertexId> = self.water_edge.iter().map(|&e| self.mesh.origin(e)).collect();
        if let Some(citadel) = self.citadel {
            reserved.extend(self.mesh.face_vertices(self.patch(citadel).face));
        }

        let inner = self.inner.clone();
        let border = CurtainWall::new(self.blueprint.walls, self, &inner, &reserved, rng)?;
        self.gates = border.gates.clone();
        self.border = Some(border);

        if let Some(citadel) = self.citadel {
            let mut castle = Castle::new(self, citadel, rng)?;
            castle.wall.build_towers(self);
            self.gates.extend(castle.wall.gates.iter().copied());
            self.patch_mut(citadel).ward = Some(Ward::Castle(castle));
            // A castle gate may have split a segment of the curtain wall.
            if let Some(mut border) = self.border.take() {
                border.resync(self);
                self.border = Some(border);
            }
        }
        Ok(())
    }

    /// Suppresses wall segments along the coast and the citadel, then
    /// places towers.
    pub(super) fn build_city_towers(&mut self) {
        let Some(mut wall) = self.border.take() else {
            return;
        };
        if self.blueprint.walls {
            let citadel = self.citadel;
            for (i, &e) in wall.edges.iter().enumerate() {
                let coastal = self.mesh.data(e) == Some(EdgeKind::Coast);
                let castle_side = citadel.is_some() && self.twin_patch(e) == citadel;
                wall.segments[i] = !(coastal || castle_side);
            }
            wall.build_towers(self);
            if let Some(castle) = self.castle_wall() {
                let taken = castle.towers.clone();
                wall.towers.retain(|t| !taken.contains(t));
            }
        }
        self.border = Some(wall);
    }
}
