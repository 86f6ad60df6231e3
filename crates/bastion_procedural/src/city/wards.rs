//! Ward assignment: what every patch is used for.

use bastion_core::geom::polygon::center;
use bastion_core::{Point, Random, VertexId};
use tracing::debug;

use super::City;
use crate::patch::PatchId;
use crate::ward::{Cathedral, Farm, Harbour, Park, Ward, WardKind};

impl City {
    pub(super) fn create_wards(&mut self, rng: &mut Random) {
        let size = self.blueprint.patches() as f64;

        if self.blueprint.greens {
            self.add_greens(size, rng);
        }

        if !self.shore.is_empty() && self.max_docks > 0 {
            for p in self.inner.clone() {
                if self.borders_shore(p) {
                    self.patch_mut(p).landing = true;
                    self.max_docks -= 1;
                    if self.max_docks <= 0 {
                        break;
                    }
                }
            }
        }

        if self.blueprint.temple {
            let free = self
                .inner
                .iter()
                .copied()
                .filter(|&p| self.patch(p).ward.is_none())
                .min_by(|&a, &b| {
                    let da = center(&self.patch(a).shape).length();
                    let db = center(&self.patch(b).shape).length();
                    da.total_cmp(&db)
                });
            if let Some(p) = free {
                self.patch_mut(p).ward = Some(Ward::Cathedral(Cathedral::default()));
            }
        }

        for p in self.inner.clone() {
            if self.patch(p).ward.is_none() {
                self.patch_mut(p).ward = Some(Ward::alleys());
            }
        }

        if let Some(gates) = self.wall().map(|w| w.gates.clone()) {
            for gate in gates {
                if rng.float() < 1.0 / (size - 5.0) {
                    continue;
                }
                for p in self.cells_at(gate) {
                    if self.patch(p).ward.is_some() {
                        continue;
                    }
                    self.patch_mut(p).within_city = true;
                    if self.borders_shore(p) {
                        if self.max_docks > 0 {
                            self.patch_mut(p).landing = true;
                        }
                        self.max_docks -= 1;
                    }
                    self.patch_mut(p).ward = Some(Ward::alleys());
                }
            }
        }

        if self.blueprint.shanty {
            self.build_shanty_towns(size, rng);
        }

        self.propagate_landings();
        for p in self.patch_ids().collect::<Vec<_>>() {
            if self.patch(p).landing {
                self.add_harbour(p);
            }
        }
        self.build_farms(rng);
        debug!(
            alleys = self.patches_with(WardKind::Alleys).len(),
            farms = self.patches_with(WardKind::Farm).len(),
            "wards assigned"
        );
    }

    /// Parks by the citadel gate and a few more scattered inside.
    fn add_greens(&mut self, size: f64, rng: &mut Random) {
        let mut placed = 0;
        if let Some(&gate) = self.castle_wall().and_then(|w| w.gates.first()) {
            let around = self.cells_at(gate);
            if around.len() == 3 && rng.float() < 1.0 - 2.0 / (size - 1.0) {
                for p in around {
                    if self.patch(p).ward.is_none() {
                        self.patch_mut(p).ward = Some(Ward::Park(Park::default()));
                        placed += 1;
                    }
                }
            }
        }

        let quota = (size - 10.0) / 20.0;
        let whole = quota.floor();
        let extra = i32::from(rng.float() < quota - whole);
        let count = whole as i32 + extra - placed;
        for _ in 0..count.max(0) {
            let free: Vec<PatchId> = self
                .inner
                .iter()
                .copied()
                .filter(|&p| self.patch(p).ward.is_none())
                .collect();
            let Some(&p) = rng.pick(&free) else {
                break;
            };
            self.patch_mut(p).ward = Some(Ward::Park(Park::default()));
        }
    }

    /// Annexes outer patches next to the city, preferring ones hemmed in by
    /// city patches and close to roads, the shore and canals.
    fn build_shanty_towns(&mut self, size: f64, rng: &mut Random) {
        let mut candidates: Vec<PatchId> = Vec::new();
        let mut weights: Vec<f64> = Vec::new();
        for p in self.city_patches() {
            self.add_shanty_candidates(p, &mut candidates, &mut weights);
        }

        let r = rng.float();
        let mut budget = size * (1.0 + r * r * r) * 0.5;
        while budget > 0.0 && !candidates.is_empty() {
            let Some(i) = rng.weighted_index(&weights) else {
                break;
            };
            let p = candidates.remove(i);
            weights.remove(i);
            self.patch_mut(p).within_city = true;
            if self.max_docks > 0 && self.borders_shore(p) {
                self.patch_mut(p).landing = true;
                self.max_docks -= 1;
            }
            self.patch_mut(p).ward = Some(Ward::alleys());
            budget -= 1.0;
            self.add_shanty_candidates(p, &mut candidates, &mut weights);
        }
    }

    fn add_shanty_candidates(&self, p: PatchId, candidates: &mut Vec<PatchId>, weights: &mut Vec<f64>) {
        for q in self.neighbours(p) {
            let patch = self.patch(q);
            if patch.within_city || patch.waterbody || self.on_horizon(q) || candidates.contains(&q) {
                continue;
            }
            let hemmed = self
                .neighbours(q)
                .into_iter()
                .filter(|&n| self.patch(n).within_city)
                .count();
            if hemmed > 1 {
                let k = hemmed as f64;
                candidates.push(q);
                weights.push(k * k / self.shanty_distance(center(&patch.shape)));
            }
        }
    }

    /// Squared distance to whatever attracts shanties.
    fn shanty_distance(&self, p: Point) -> f64 {
        let mut d = 3.0 * p.distance(self.mesh.point(self.center));
        for road in &self.roads {
            for &v in road {
                d = d.min(2.0 * self.mesh.point(v).distance(p));
            }
        }
        for &e in &self.shore {
            d = d.min(self.mesh.point(self.mesh.origin(e)).distance(p));
        }
        for canal in &self.canals {
            for &e in &canal.course {
                d = d.min(self.mesh.point(self.mesh.origin(e)).distance(p));
            }
        }
        (d * d).max(f64::EPSILON)
    }

    /// A city patch between two landings along the shore is a landing too.
    fn propagate_landings(&mut self) {
        let mut shore: Vec<VertexId> = self.shore.iter().map(|&e| self.mesh.origin(e)).collect();
        if let Some(&last) = self.shore.last() {
            shore.push(self.mesh.dest(last));
        }
        for v in shore {
            for p in self.cells_at(v) {
                let patch = self.patch(p);
                if !patch.within_city || patch.landing {
                    continue;
                }
                let Some(into) = self
                    .mesh
                    .face_edges(patch.face)
                    .into_iter()
                    .find(|&e| self.mesh.dest(e) == v)
                else {
                    continue;
                };
                let out = self.mesh.next(into);
                let landing = |e| self.twin_patch(e).is_some_and(|q| self.patch(q).landing);
                if landing(into) && landing(out) {
                    self.patch_mut(p).landing = true;
                    break;
                }
            }
        }
    }

    /// Harbours on the open water next to a landing.
    fn add_harbour(&mut self, landing: PatchId) {
        for q in self.neighbours(landing) {
            let patch = self.patch(q);
            if patch.waterbody && patch.ward.is_none() {
                self.patch_mut(q).ward = Some(Ward::Harbour(Harbour::default()));
            }
        }
    }

    /// Farms around the city out to a wobbly radius, wilderness beyond and
    /// along the shore.
    fn build_farms(&mut self, rng: &mut Random) {
        let a = rng.avg3() * 2.0;
        let b = rng.avg3();
        let phase1 = rng.float() * std::f64::consts::TAU;
        let phase2 = rng.float() * std::f64::consts::TAU;

        let origin = self.mesh.point(self.center);
        let mut reach: f64 = 0.0;
        for &p in &self.inner {
            for q in &self.patch(p).shape {
                reach = reach.max(q.distance(origin));
            }
        }

        for p in self.patch_ids().collect::<Vec<_>>() {
            let patch = self.patch(p);
            if patch.ward.is_some() {
                continue;
            }
            let ward = if patch.waterbody {
                Ward::Water
            } else if self.borders_shore(p) {
                Ward::Wilderness
            } else {
                let off = center(&patch.shape) - origin;
                let angle = off.atan2();
                let wobble = a * (angle + phase1).sin() + b * (2.0 * angle + phase2).sin();
                if off.length() < (wobble + 1.0) * reach {
                    Ward::Farm(Farm::default())
                } else {
                    Ward::Wilderness
                }
            };
            self.patch_mut(p).ward = Some(ward);
        }
    }
}
