//! Spiral Voronoi patches, coast classification and junction cleanup.

use std::f64::consts::{PI, TAU};

use bastion_core::geom::polygon::{centroid, perimeter, regular};
use bastion_core::{Point, Random, Voronoi};
use bastion_shared::LTOWER_RADIUS;
use tracing::{debug, trace};

use super::City;
use crate::blueprint::Blueprint;
use crate::error::{GenerationError, GenerationResult};
use crate::noise::FractalNoise;
use crate::patch::{CityMesh, PatchId};
use crate::ward::{Market, Ward};

/// Octaves of the coastline noise.
const COAST_OCTAVES: usize = 6;

impl City {
    /// Scatters sites, builds the mesh and classifies the patches.
    pub(super) fn build_patches(mut blueprint: Blueprint, rng: &mut Random) -> GenerationResult<Self> {
        let size = blueprint.patches();

        // Spiral of sites around the origin.
        let a0 = TAU * rng.float();
        let mut sites = vec![Point::ZERO];
        let mut max_r: f64 = 0.0;
        for k in 1..8 * size {
            let r = 10.0 + k as f64 * (2.0 + rng.float());
            sites.push(Point::polar(r, a0 + 5.0 * (k as f64).sqrt()));
            max_r = max_r.max(r);
        }
        if blueprint.plaza && sites.len() > 4 {
            rng.save();
            let r1 = 8.0 + rng.float() * 8.0;
            let r2 = r1 * (1.0 + rng.float());
            max_r = max_r.max(r2);
            sites[1] = Point::polar(r1, a0);
            sites[2] = Point::polar(r2, a0 + PI / 2.0);
            sites[3] = Point::polar(r1, a0 + PI);
            sites[4] = Point::polar(r2, a0 + 3.0 * PI / 2.0);
            rng.restore();
        }
        let real = sites.len();
        sites.extend(regular(6, 2.0 * max_r, 0.0));

        let voronoi = Voronoi::build(&sites);
        let cells: Vec<Vec<usize>> = voronoi.cells[..real]
            .iter()
            .flatten()
            .filter(|cell| cell.iter().all(|&v| voronoi.vertices[v].length() <= max_r))
            .cloned()
            .collect();
        if cells.len() <= size + 1 {
            return Err(GenerationError::TooFewPatches(cells.len()));
        }
        let mesh = CityMesh::from_indexed(&voronoi.vertices, &cells)?;

        let mut city = Self {
            blueprint: blueprint.clone(),
            seed: 0,
            attempts: 0,
            mesh,
            patches: Vec::new(),
            face_patch: Vec::new(),
            inner: Vec::new(),
            center: bastion_core::VertexId(0),
            plaza: None,
            citadel: None,
            coast_dir: blueprint.coast_dir.unwrap_or(0.0),
            horizon: Vec::new(),
            earth_edge: Vec::new(),
            water_edge: Vec::new(),
            shore: Vec::new(),
            border: None,
            gates: Vec::new(),
            streets: Vec::new(),
            roads: Vec::new(),
            arteries: Vec::new(),
            canals: Vec::new(),
            districts: Vec::new(),
            max_docks: (size as f64 / 2.0).sqrt() as i32 + if blueprint.river { 2 } else { 0 },
        };

        let faces: Vec<_> = city.mesh.faces().collect();
        for face in faces {
            city.add_patch(face, rng);
        }
        // Innermost first; ties keep mesh order.
        let mut order: Vec<(f64, PatchId)> = city
            .patch_ids()
            .map(|p| (centroid(&city.patch(p).shape).length_squared(), p))
            .collect();
        order.sort_by(|a, b| a.0.total_cmp(&b.0));
        let order: Vec<PatchId> = order.into_iter().map(|(_, p)| p).collect();

        if blueprint.coast {
            city.classify_coast(&order, max_r, &mut blueprint, rng);
        }
        city.blueprint.coast_dir = blueprint.coast_dir;

        for &p in &order {
            if city.patch(p).waterbody {
                continue;
            }
            let patch = city.patch_mut(p);
            patch.within_city = true;
            patch.within_walls = blueprint.walls;
            city.inner.push(p);
            if city.inner.len() > size {
                break;
            }
        }
        let Some(&first) = city.inner.first() else {
            return Err(GenerationError::TooFewPatches(0));
        };
        city.center = city.nearest_to_origin(first);

        if blueprint.plaza {
            city.plaza = Some(first);
            city.patch_mut(first).ward = Some(Ward::Market(Market::default()));
        }

        if blueprint.citadel {
            let citadel = if blueprint.urban_castle {
                let candidates: Vec<PatchId> = city
                    .inner
                    .iter()
                    .copied()
                    .filter(|&p| Some(p) != city.plaza && city.surrounded_by_city(p))
                    .collect();
                match rng.pick(&candidates) {
                    Some(&p) => p,
                    None => {
                        trace!("no site for an urban castle");
                        *city.inner.last().unwrap_or(&first)
                    }
                }
            } else {
                *city.inner.last().unwrap_or(&first)
            };
            let patch = city.patch_mut(citadel);
            patch.within_city = true;
            patch.within_walls = true;
            city.inner.retain(|&p| p != citadel);
            city.citadel = Some(citadel);
        }
        debug!(inner = city.inner.len(), citadel = city.citadel.is_some(), "patches classified");
        Ok(city)
    }

    /// Floods patches near a noisy offset shoreline.
    fn classify_coast(&mut self, order: &[PatchId], max_r: f64, blueprint: &mut Blueprint, rng: &mut Random) {
        rng.save();
        let noise = FractalNoise::new(rng, COAST_OCTAVES);
        let f = 20.0 + rng.float() * 40.0;
        let k = 0.3 * max_r * (rng.avg3() * 2.0 - 1.0);
        let n = max_r * (0.2 + rng.spread4().abs());
        if blueprint.coast_dir.is_none() {
            blueprint.coast_dir = Some((rng.float() * 20.0).floor() / 10.0);
        }
        rng.restore();

        let dir = blueprint.coast_dir.unwrap_or(0.0);
        self.coast_dir = dir;
        let (sin, cos) = (dir * PI).sin_cos();
        let focus = Point::new(n + f, k);
        for &p in order {
            let c = centroid(&self.patch(p).shape);
            let r = c.rotate_yx(sin, cos);
            let mut u = focus.distance(r) - n;
            if r.x > focus.x {
                u = u.min((r.y - k).abs() - n);
            }
            let wobble = noise.sample((r.x + max_r) / (2.0 * max_r), (r.y + max_r) / (2.0 * max_r))
                * n
                * (r.length() / max_r).sqrt();
            if u + wobble < 0.0 {
                self.patch_mut(p).waterbody = true;
            }
        }
    }

    /// Vertex of a patch closest to the origin.
    pub(crate) fn nearest_to_origin(&self, p: PatchId) -> bastion_core::VertexId {
        let verts = self.mesh.face_vertices(self.patch(p).face);
        let mut best = verts[0];
        let mut best_d = f64::INFINITY;
        for v in verts {
            let d = self.mesh.point(v).length_squared();
            if d < best_d {
                best_d = d;
                best = v;
            }
        }
        best
    }

    /// Whether every patch around the vertices of `p` is `p`, water or city.
    fn surrounded_by_city(&self, p: PatchId) -> bool {
        self.mesh.face_vertices(self.patch(p).face).into_iter().all(|v| {
            self.cells_at(v).into_iter().all(|q| {
                let other = self.patch(q);
                q == p || other.waterbody || other.within_city
            })
        })
    }

    /// Collapses short edges between large patches until none remain.
    pub(super) fn optimize_junctions(&mut self) {
        let citadel_face = self.citadel.map(|c| self.patch(c).face);
        let mut collapsed = 0;
        let mut center_lost = false;
        loop {
            let mut changed = false;
            let faces: Vec<_> = self.mesh.faces().collect();
            for face in faces {
                let edges = self.mesh.face_edges(face);
                if edges.len() <= 4 {
                    continue;
                }
                let shape = self.mesh.face_polygon(face);
                let threshold = (3.0 * LTOWER_RADIUS).max(perimeter(&shape) / shape.len() as f64 / 3.0);
                let on_citadel: Vec<_> = citadel_face
                    .map(|f| self.mesh.face_vertices(f))
                    .unwrap_or_default();
                for e in edges {
                    let Some(twin_face) = self.mesh.twin_face(e) else {
                        continue;
                    };
                    if self.mesh.face_edges(twin_face).len() <= 4 {
                        continue;
                    }
                    if on_citadel.contains(&self.mesh.origin(e)) != on_citadel.contains(&self.mesh.dest(e)) {
                        continue;
                    }
                    let (a, b) = self.mesh.segment(e);
                    if a.distance(b) >= threshold {
                        continue;
                    }
                    if let Some(collapse) = self.mesh.collapse_edge(e) {
                        center_lost |= collapse.removed == self.center;
                        for f in collapse.faces {
                            if let Some(p) = self.patch_at(f) {
                                self.patches[p.index()].refresh(&self.mesh);
                            }
                        }
                        collapsed += 1;
                        changed = true;
                        break;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        if center_lost {
            if let Some(&first) = self.inner.first() {
                self.center = self.nearest_to_origin(first);
            }
        }
        if collapsed > 0 {
            self.refresh_shapes();
        }
        debug!(collapsed, "junctions optimized");
    }
}
