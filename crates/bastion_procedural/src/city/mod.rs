//! # City
//!
//! The model of one generated city and the pipeline that builds it.
//!
//! ## Pipeline
//!
//! ```text
//! patches -> junctions -> domains -> walls -> streets -> canals
//!         -> wards -> towers -> geometry
//! ```
//!
//! Every stage reads what earlier stages committed to the mesh, so the
//! order is fixed. All stages draw from one [`Random`]; a structural
//! failure anywhere throws the whole attempt away and
//! [`City::generate`] starts over on the same stream.

mod domains;
mod patches;
mod streets;
mod walls;
mod wards;

use bastion_core::{EdgeId, FaceId, Point, Random, VertexId};
use bastion_shared::ALLEY;
use tracing::{debug, info, warn};

use crate::blueprint::Blueprint;
use crate::canal::Canal;
use crate::config::CityConfig;
use crate::district::{District, DistrictBuilder};
use crate::error::{GenerationError, GenerationResult};
use crate::patch::{CityMesh, EdgeKind, Patch, PatchId};
use crate::wall::CurtainWall;
use crate::ward::{Ward, WardKind};

/// A generated city.
pub struct City {
    /// Resolved blueprint this city was built from.
    pub blueprint: Blueprint,
    /// Seed the generator started from.
    pub seed: u32,
    /// Attempts it took.
    pub attempts: u32,
    /// The shared planar mesh.
    pub mesh: CityMesh,
    /// Patches, one per live face.
    pub patches: Vec<Patch>,
    face_patch: Vec<Option<PatchId>>,
    /// City patches ordered from the center outwards, citadel excluded.
    pub inner: Vec<PatchId>,
    /// Vertex at the heart of the city.
    pub center: VertexId,
    /// Market square.
    pub plaza: Option<PatchId>,
    /// Fortified citadel.
    pub citadel: Option<PatchId>,
    /// Direction of the sea in half turns.
    pub coast_dir: f64,
    /// Outer boundary of the mesh.
    pub horizon: Vec<EdgeId>,
    /// Boundary of the landmass.
    pub earth_edge: Vec<EdgeId>,
    /// Boundary of the water body.
    pub water_edge: Vec<EdgeId>,
    /// Part of the earth edge facing water.
    pub shore: Vec<EdgeId>,
    /// Boundary of the city; only built when the blueprint has walls.
    pub border: Option<CurtainWall>,
    /// Every entrance: the border's gates and the citadel's. Without walls
    /// the border is not real and its gates are plain street entrances;
    /// [`City::wall_gates`] has the gates of a real wall only.
    pub gates: Vec<VertexId>,
    /// Streets from gates to the center.
    pub streets: Vec<Vec<VertexId>>,
    /// Roads from gates to the horizon.
    pub roads: Vec<Vec<VertexId>>,
    /// Streets and roads merged into continuous edge chains.
    pub arteries: Vec<Vec<EdgeId>>,
    /// Rivers and canals.
    pub canals: Vec<Canal>,
    /// Districts of city patches.
    pub districts: Vec<District>,
    /// Landings still allowed.
    pub max_docks: i32,
}

impl City {
    // =========================================================================
    // ORCHESTRATION
    // =========================================================================

    /// Generates a city, retrying structural failures.
    ///
    /// # Errors
    ///
    /// Non-structural errors surface at once; structural ones only after
    /// `max_attempts` failed attempts, as `RetriesExhausted`.
    pub fn generate(config: &CityConfig) -> GenerationResult<Self> {
        config.blueprint.validate()?;
        let mut rng = Random::new(config.blueprint.seed);
        let seed = rng.seed();
        let blueprint = config.blueprint.resolve(&mut rng);
        let max = config.generation.max_attempts.max(1);

        let mut last = GenerationError::NoGates;
        for attempt in 1..=max {
            info!(attempt, seed, size = blueprint.patches(), "generating city");
            match Self::build_once(blueprint.clone(), &mut rng) {
                Ok(mut city) => {
                    city.seed = seed;
                    city.attempts = attempt;
                    info!(
                        attempt,
                        patches = city.patches.len(),
                        districts = city.districts.len(),
                        "city generated"
                    );
                    return Ok(city);
                }
                Err(e) if e.is_structural() => {
                    warn!(attempt, error = %e, "attempt failed, retrying");
                    last = e;
                }
                Err(e) => return Err(e),
            }
        }
        Err(GenerationError::RetriesExhausted {
            attempts: max,
            last: Box::new(last),
        })
    }

    /// One attempt on a resolved blueprint.
    ///
    /// # Errors
    ///
    /// The first error of any stage.
    pub fn build_once(blueprint: Blueprint, rng: &mut Random) -> GenerationResult<Self> {
        blueprint.validate()?;
        let seed = rng.seed();
        let mut city = Self::build_patches(blueprint, rng)?;
        city.seed = seed;
        debug!(patches = city.patches.len(), "patches built");
        city.optimize_junctions();
        city.build_domains(rng)?;
        debug!(horizon = city.horizon.len(), shore = city.shore.len(), "domains built");
        city.build_walls(rng)?;
        debug!(gates = city.gates.len(), "walls built");
        city.build_streets()?;
        debug!(arteries = city.arteries.len(), "streets built");
        city.build_canals(rng)?;
        city.create_wards(rng);
        city.build_city_towers();
        city.build_geometry(rng);
        debug!(districts = city.districts.len(), "geometry built");
        Ok(city)
    }

    fn build_canals(&mut self, rng: &mut Random) -> GenerationResult<()> {
        rng.save();
        let result = if self.blueprint.river {
            Canal::create_river(self, rng).map(|canal| vec![canal])
        } else {
            Ok(Vec::new())
        };
        rng.restore();
        self.canals = result?;
        debug!(canals = self.canals.len(), "canals built");
        Ok(())
    }

    fn build_geometry(&mut self, rng: &mut Random) {
        let mut canals = std::mem::take(&mut self.canals);
        for canal in &mut canals {
            canal.update_state(self, rng);
        }
        self.canals = canals;

        self.districts = DistrictBuilder::new(self).build(self, rng);

        for i in 0..self.patches.len() {
            let Some(mut ward) = self.patches[i].ward.take() else {
                continue;
            };
            ward.create_geometry(self, PatchId(i as u32));
            self.patches[i].ward = Some(ward);
        }

        let mut districts = std::mem::take(&mut self.districts);
        for district in &mut districts {
            district.create_geometry(self);
        }
        self.districts = districts;
    }

    // =========================================================================
    // PATCH ACCESS
    // =========================================================================

    /// Patch record.
    #[inline]
    #[must_use]
    pub fn patch(&self, id: PatchId) -> &Patch {
        &self.patches[id.index()]
    }

    /// Mutable patch record.
    #[inline]
    pub fn patch_mut(&mut self, id: PatchId) -> &mut Patch {
        &mut self.patches[id.index()]
    }

    /// Patch of a mesh face.
    #[must_use]
    pub fn patch_at(&self, face: FaceId) -> Option<PatchId> {
        self.face_patch.get(face.index()).copied().flatten()
    }

    /// Patch across a half-edge.
    #[must_use]
    pub fn twin_patch(&self, e: EdgeId) -> Option<PatchId> {
        self.mesh.twin_face(e).and_then(|f| self.patch_at(f))
    }

    /// Patch on the left of a half-edge.
    #[must_use]
    pub fn edge_patch(&self, e: EdgeId) -> Option<PatchId> {
        self.patch_at(self.mesh.face_of(e))
    }

    /// Patches around a vertex.
    #[must_use]
    pub fn cells_at(&self, v: VertexId) -> Vec<PatchId> {
        self.mesh
            .faces_at(v)
            .into_iter()
            .filter_map(|f| self.patch_at(f))
            .collect()
    }

    /// All patch ids in order.
    pub fn patch_ids(&self) -> impl Iterator<Item = PatchId> {
        (0..self.patches.len() as u32).map(PatchId)
    }

    /// Faces of a patch list.
    #[must_use]
    pub fn faces_of(&self, ids: &[PatchId]) -> Vec<FaceId> {
        ids.iter().map(|&p| self.patch(p).face).collect()
    }

    /// Patches sharing an edge with `id`.
    #[must_use]
    pub fn neighbours(&self, id: PatchId) -> Vec<PatchId> {
        let mut out = Vec::new();
        for e in self.mesh.face_edges(self.patch(id).face) {
            if let Some(p) = self.twin_patch(e) {
                if !out.contains(&p) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Whether the patch touches the shoreline.
    #[must_use]
    pub fn borders_shore(&self, id: PatchId) -> bool {
        let face = self.patch(id).face;
        self.shore
            .iter()
            .any(|&e| self.mesh.face_of(e) == face)
    }

    /// Whether the patch has an edge on the horizon.
    #[must_use]
    pub fn on_horizon(&self, id: PatchId) -> bool {
        let face = self.patch(id).face;
        self.mesh
            .face_edges(face)
            .into_iter()
            .any(|e| self.mesh.data(e) == Some(EdgeKind::Horizon) || self.mesh.twin(e).is_none())
    }

    /// Registers a patch for a face, drawing its seed.
    pub(crate) fn add_patch(&mut self, face: FaceId, rng: &mut Random) -> PatchId {
        let id = PatchId(self.patches.len() as u32);
        let patch = Patch::new(&self.mesh, face, rng.next_seed());
        self.patches.push(patch);
        if self.face_patch.len() <= face.index() {
            self.face_patch.resize(face.index() + 1, None);
        }
        self.face_patch[face.index()] = Some(id);
        id
    }

    /// Re-reads every patch shape from the mesh.
    pub(crate) fn refresh_shapes(&mut self) {
        for patch in &mut self.patches {
            patch.refresh(&self.mesh);
        }
    }

    /// Moves the origins of an edge chain to new positions.
    pub(crate) fn move_chain(&mut self, chain: &[EdgeId], points: &[Point]) {
        for (&e, &p) in chain.iter().zip(points) {
            let v = self.mesh.origin(e);
            self.mesh.set_point(v, p);
        }
        self.refresh_shapes();
    }

    /// Moves vertices to new positions.
    pub(crate) fn move_vertices(&mut self, vertices: &[VertexId], points: &[Point]) {
        for (&v, &p) in vertices.iter().zip(points) {
            self.mesh.set_point(v, p);
        }
        self.refresh_shapes();
    }

    // =========================================================================
    // WALLS
    // =========================================================================

    /// The curtain wall, if the city has one.
    #[must_use]
    pub fn wall(&self) -> Option<&CurtainWall> {
        if self.blueprint.walls {
            self.border.as_ref()
        } else {
            None
        }
    }

    /// Gates of the real curtain wall; none without walls.
    #[must_use]
    pub fn wall_gates(&self) -> &[VertexId] {
        match self.wall() {
            Some(wall) => &wall.gates,
            None => &[],
        }
    }

    /// The citadel wall.
    #[must_use]
    pub fn castle_wall(&self) -> Option<&CurtainWall> {
        let citadel = self.citadel?;
        match &self.patch(citadel).ward {
            Some(Ward::Castle(castle)) => Some(&castle.wall),
            _ => None,
        }
    }

    /// Every real wall: curtain first, then citadel.
    pub fn walls(&self) -> impl Iterator<Item = &CurtainWall> {
        self.wall().into_iter().chain(self.castle_wall())
    }

    /// Largest tower radius at a vertex over all walls.
    #[must_use]
    pub fn tower_radius(&self, v: VertexId) -> f64 {
        self.walls().map(|w| w.tower_radius(v)).fold(0.0, f64::max)
    }

    /// Vertices of every real wall.
    #[must_use]
    pub fn wall_vertices(&self) -> Vec<VertexId> {
        let mut out = Vec::new();
        for wall in self.walls() {
            for &e in &wall.edges {
                let v = self.mesh.origin(e);
                if !out.contains(&v) {
                    out.push(v);
                }
            }
        }
        out
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Patches with the given ward.
    #[must_use]
    pub fn patches_with(&self, kind: WardKind) -> Vec<PatchId> {
        self.patch_ids().filter(|&p| self.patch(p).has_ward(kind)).collect()
    }

    /// Patches inside the city.
    #[must_use]
    pub fn city_patches(&self) -> Vec<PatchId> {
        self.patch_ids().filter(|&p| self.patch(p).within_city).collect()
    }

    /// Whether a vertex is an origin on the shoreline.
    #[must_use]
    pub fn on_shore(&self, v: VertexId) -> bool {
        self.shore.iter().any(|&e| self.mesh.origin(e) == v)
    }

    /// Width of the main canal, zero without one.
    #[must_use]
    pub fn canal_width(&self) -> f64 {
        self.canals.first().map_or(0.0, |c| c.width)
    }

    /// Bank clearance at a vertex on a canal course: half the width plus
    /// `margin`, plus an alley width at the mouth.
    #[must_use]
    pub fn canal_clearance(&self, v: VertexId, margin: f64) -> Option<f64> {
        let canal = self.canals.iter().find(|c| c.has_vertex(&self.mesh, v))?;
        let mouth = if canal.mouth(&self.mesh) == Some(v) { ALLEY } else { 0.0 };
        Some(canal.width / 2.0 + margin + mouth)
    }

    /// Corners of the box around every city patch.
    #[must_use]
    pub fn bounds(&self) -> (Point, Point) {
        let mut lo = Point::new(f64::INFINITY, f64::INFINITY);
        let mut hi = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for patch in self.patches.iter().filter(|p| p.within_city) {
            for p in &patch.shape {
                lo = Point::new(lo.x.min(p.x), lo.y.min(p.y));
                hi = Point::new(hi.x.max(p.x), hi.y.max(p.y));
            }
        }
        if lo.x > hi.x {
            (Point::ZERO, Point::ZERO)
        } else {
            (lo, hi)
        }
    }

    /// Number of blocks, lots and buildings over all districts.
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut blocks = 0;
        let mut lots = 0;
        let mut buildings = 0;
        for district in &self.districts {
            for group in &district.groups {
                blocks += group.blocks.len();
                for block in &group.blocks {
                    lots += block.lots.len();
                    buildings += block.buildings.len();
                }
            }
        }
        (blocks, lots, buildings)
    }
}
