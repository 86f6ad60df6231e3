//! Horizon, landmass, water body and shoreline.

use bastion_core::geom::smooth;
use bastion_core::{EdgeId, FaceId, Random};

use super::City;
use crate::error::{GenerationError, GenerationResult};
use crate::patch::EdgeKind;

/// Shortest horizon that still encloses a landmass.
const MIN_HORIZON: usize = 6;

impl City {
    /// Extracts the horizon and, on the coast, the land/water boundaries.
    pub(super) fn build_domains(&mut self, rng: &mut Random) -> GenerationResult<()> {
        let all: Vec<FaceId> = self.mesh.faces().collect();
        let start = self.mesh.edge_ids().find(|&e| self.mesh.twin(e).is_none());
        let horizon = self.mesh.circumference(start, &all)?;
        if horizon.len() < MIN_HORIZON {
            return Err(GenerationError::NoHorizon(horizon.len()));
        }
        self.mesh.assign_data(&horizon, EdgeKind::Horizon, true);
        self.horizon = horizon;

        if !self.blueprint.coast {
            self.earth_edge = self.horizon.clone();
            self.water_edge.clear();
            self.shore.clear();
            return Ok(());
        }

        let (water, land): (Vec<FaceId>, Vec<FaceId>) = all
            .iter()
            .copied()
            .partition(|&f| self.patch_at(f).is_some_and(|p| self.patch(p).waterbody));
        let land = largest(self.mesh.split(&land));
        let water = largest(self.mesh.split(&water));
        if water.is_empty() || land.is_empty() {
            return Err(GenerationError::NoWater);
        }

        self.earth_edge = self.mesh.circumference(None, &land)?;
        let water_edge = self.mesh.circumference(None, &water)?;
        if water_edge.iter().all(|&e| self.mesh.twin(e).is_some()) {
            return Err(GenerationError::WaterOffHorizon);
        }
        let iterations = (1.0 + rng.float() * 3.0).floor() as usize;
        let shape = self.mesh.chain_polygon(&water_edge);
        let smoothed = smooth(&shape, &[], iterations);
        self.move_chain(&water_edge, &smoothed);
        self.water_edge = water_edge;

        self.shore = shore_run(&self.earth_edge, |e| self.mesh.twin(e).is_some());
        if self.shore.is_empty() {
            return Err(GenerationError::NoWater);
        }
        self.mesh.assign_data(&self.shore, EdgeKind::Coast, true);
        Ok(())
    }
}

/// Biggest component, the first one on ties.
fn largest(groups: Vec<Vec<FaceId>>) -> Vec<FaceId> {
    let mut best: Vec<FaceId> = Vec::new();
    for g in groups {
        if g.len() > best.len() {
            best = g;
        }
    }
    best
}

/// The run of twinned edges that follows the first run of twinless ones.
fn shore_run(earth: &[EdgeId], twinned: impl Fn(EdgeId) -> bool) -> Vec<EdgeId> {
    let n = earth.len();
    if n == 0 {
        return Vec::new();
    }
    if earth.iter().all(|&e| twinned(e)) {
        return earth.to_vec();
    }
    if !earth.iter().any(|&e| twinned(e)) {
        return Vec::new();
    }
    let mut i = 0;
    while twinned(earth[i]) {
        i = (i + 1) % n;
    }
    while !twinned(earth[i]) {
        i = (i + 1) % n;
    }
    let mut run = Vec::new();
    while twinned(earth[i]) {
        run.push(earth[i]);
        i = (i + 1) % n;
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shore_run_wraps() {
        let earth: Vec<EdgeId> = (0..8).map(EdgeId).collect();
        // Twinned: 6, 7, 0, 1; open: 2..6.
        let shore = shore_run(&earth, |e| matches!(e.0, 6 | 7 | 0 | 1));
        assert_eq!(shore, vec![EdgeId(6), EdgeId(7), EdgeId(0), EdgeId(1)]);
    }

    #[test]
    fn test_shore_run_degenerate() {
        let earth: Vec<EdgeId> = (0..4).map(EdgeId).collect();
        assert_eq!(shore_run(&earth, |_| true).len(), 4);
        assert!(shore_run(&earth, |_| false).is_empty());
        assert!(shore_run(&[], |_| true).is_empty());
    }

    #[test]
    fn test_largest_prefers_first_on_ties() {
        let groups = vec![vec![FaceId(1)], vec![FaceId(2), FaceId(3)], vec![FaceId(4), FaceId(5)]];
        assert_eq!(largest(groups), vec![FaceId(2), FaceId(3)]);
    }
}
