//! Streets from the gates to the center, roads from the horizon to the
//! gates, merged into arteries.

use bastion_core::geom::smooth_open;
use bastion_core::{EdgeId, FaceId, Point, VertexId};
use tracing::trace;

use super::City;
use crate::error::GenerationResult;
use crate::patch::EdgeKind;
use crate::topology::Topology;
use crate::ward::Ward;

impl City {
    pub(super) fn build_streets(&mut self) -> GenerationResult<()> {
        let inside: Vec<FaceId> = self.patches.iter().filter(|p| p.within_city).map(|p| p.face).collect();
        let outside: Vec<FaceId> = self
            .patches
            .iter()
            .filter(|p| !p.within_city && !p.waterbody)
            .map(|p| p.face)
            .collect();
        let mut streets = Topology::new(&self.mesh, &inside);
        let mut roads = Topology::new(&self.mesh, &outside);

        let shore: Vec<VertexId> = self.shore.iter().map(|&e| self.mesh.origin(e)).collect();
        streets.exclude_points(&shore);
        roads.exclude_points(&shore);

        let mut walled: Vec<VertexId> = Vec::new();
        for wall in self.walls() {
            for v in wall.vertices(self) {
                if !walled.contains(&v) && !self.gates.contains(&v) {
                    walled.push(v);
                }
            }
        }
        streets.exclude_points(&walled);
        roads.exclude_points(&walled);

        let mut entries: Vec<EdgeId> = self
            .earth_edge
            .iter()
            .copied()
            .filter(|e| !self.shore.contains(e) && roads.contains(self.mesh.origin(*e)))
            .collect();

        let city_gates: Vec<VertexId> = self.border.as_ref().map(|b| b.gates.clone()).unwrap_or_default();
        for gate in self.gates.clone() {
            let at = self.mesh.point(gate);
            let target = match self.plaza {
                Some(plaza) => self
                    .mesh
                    .face_vertices(self.patch(plaza).face)
                    .into_iter()
                    .min_by(|&a, &b| {
                        let da = self.mesh.point(a).distance(at);
                        let db = self.mesh.point(b).distance(at);
                        da.total_cmp(&db)
                    })
                    .unwrap_or(self.center),
                None => self.center,
            };
            let Some(street) = streets.build_path(gate, target) else {
                trace!(?gate, "unable to build a street");
                continue;
            };
            self.streets.push(street);

            if !city_gates.contains(&gate) {
                continue;
            }
            let mut road = None;
            if roads.contains(gate) {
                entries.sort_by(|&a, &b| {
                    let key = |e: EdgeId| {
                        let p = self.mesh.point(self.mesh.origin(e));
                        -at.dot(p) / p.length()
                    };
                    key(a).total_cmp(&key(b))
                });
                road = entries
                    .iter()
                    .find_map(|&e| roads.build_path(self.mesh.origin(e), gate));
            }
            match road {
                Some(road) => {
                    roads.exclude_polygon(&road);
                    self.roads.push(road);
                }
                None if self.wall().is_some() => self.add_harbour_suburb(gate),
                None => {}
            }
        }

        self.tidy_up_roads()?;
        let fixed: Vec<Point> = if self.blueprint.walls {
            self.gates.iter().map(|&g| self.mesh.point(g)).collect()
        } else {
            Vec::new()
        };
        for artery in self.arteries.clone() {
            self.mesh.assign_data(&artery, EdgeKind::Road, true);
            let line = self.mesh.chain_polygon(&artery);
            let smoothed = smooth_open(&line, &fixed, 2);
            self.move_chain(&artery, &smoothed);
        }
        Ok(())
    }

    /// Outer shore patches at a gate that no road reaches become landings.
    fn add_harbour_suburb(&mut self, gate: VertexId) {
        for p in self.cells_at(gate) {
            if self.patch(p).within_walls || !self.borders_shore(p) {
                continue;
            }
            let patch = self.patch_mut(p);
            patch.landing = true;
            patch.within_city = true;
            patch.ward = Some(Ward::alleys());
            self.max_docks -= 1;
            trace!(patch = p.0, "harbour suburb");
        }
    }

    /// Merges the edges of every street and road into continuous chains.
    fn tidy_up_roads(&mut self) -> GenerationResult<()> {
        let mut edges: Vec<EdgeId> = Vec::new();
        for path in self.streets.iter().chain(&self.roads) {
            for e in self.mesh.vertices_to_chain(path)? {
                if !edges.contains(&e) {
                    edges.push(e);
                }
            }
        }

        let mut arteries: Vec<Vec<EdgeId>> = Vec::new();
        while let Some(e) = edges.pop() {
            let (from, to) = (self.mesh.origin(e), self.mesh.dest(e));
            let joined = arteries.iter_mut().find_map(|a| {
                if a.first().is_some_and(|&f| self.mesh.origin(f) == to) {
                    a.insert(0, e);
                    Some(())
                } else if a.last().is_some_and(|&l| self.mesh.dest(l) == from) {
                    a.push(e);
                    Some(())
                } else {
                    None
                }
            });
            if joined.is_none() {
                arteries.push(vec![e]);
            }
        }
        self.arteries = arteries;
        Ok(())
    }
}
