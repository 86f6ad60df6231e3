//! # Curtain Walls
//!
//! A wall follows the boundary of a patch set: the face loop of a single
//! patch for a citadel, the circumference of the union otherwise.
//!
//! ## Gates
//!
//! Gates are drawn by weight from the wall vertices. A vertex is eligible
//! when it is not reserved and at least two enclosed patches meet there,
//! so a street can actually come through. After every pick the weights of
//! nearby vertices drop, which spreads the gates around the ring.
//!
//! A wall that is not `real` only exists to route streets: it has gates
//! but moves no vertex and labels no edge.

use bastion_core::geom::polygon::lerp_vertex;
use bastion_core::geom::smooth;
use bastion_core::{EdgeId, Point, Random, VertexId};
use bastion_shared::{LTOWER_RADIUS, TOWER_RADIUS};
use tracing::trace;

use crate::city::City;
use crate::error::{GenerationError, GenerationResult};
use crate::patch::{EdgeKind, PatchId};

/// Wall around a set of patches.
#[derive(Clone, Debug)]
pub struct CurtainWall {
    /// Whether the wall is built.
    pub real: bool,
    /// Enclosed patches.
    pub patches: Vec<PatchId>,
    /// Boundary, counter-clockwise.
    pub edges: Vec<EdgeId>,
    /// Gate vertices.
    pub gates: Vec<VertexId>,
    /// Gates where a canal passes.
    pub watergates: Vec<VertexId>,
    /// Tower vertices.
    pub towers: Vec<VertexId>,
    /// Whether the segment starting at each edge is built.
    pub segments: Vec<bool>,
}

impl CurtainWall {
    /// Builds a wall and its gates.
    ///
    /// `reserved` vertices never become gates and stay put while the wall
    /// is smoothed.
    ///
    /// # Errors
    ///
    /// `NoGateVertices` or `NoGates` when a multi-patch wall finds no place
    /// for a gate, or a mesh error.
    pub fn new(
        real: bool,
        city: &mut City,
        patches: &[PatchId],
        reserved: &[VertexId],
        rng: &mut Random,
    ) -> GenerationResult<Self> {
        let edges = if patches.len() == 1 {
            city.mesh.face_edges(city.patch(patches[0]).face)
        } else {
            let faces = city.faces_of(patches);
            city.mesh.circumference(None, &faces)?
        };

        if real {
            city.mesh.assign_data(&edges, EdgeKind::Wall, false);
            if patches.len() > 1 {
                let fixed: Vec<Point> = reserved.iter().map(|&v| city.mesh.point(v)).collect();
                let shape = smooth(&city.mesh.chain_polygon(&edges), &fixed, 3);
                city.move_chain(&edges, &shape);
            }
        }

        let segments = vec![true; edges.len()];
        let mut wall = Self {
            real,
            patches: patches.to_vec(),
            edges,
            gates: Vec::new(),
            watergates: Vec::new(),
            towers: Vec::new(),
            segments,
        };
        if patches.len() == 1 {
            wall.build_castle_gate(city, reserved);
        } else {
            wall.build_city_gates(city, reserved, rng)?;
        }
        Ok(wall)
    }

    /// Wall vertices in boundary order.
    #[must_use]
    pub fn vertices(&self, city: &City) -> Vec<VertexId> {
        self.edges.iter().map(|&e| city.mesh.origin(e)).collect()
    }

    /// Current wall polygon.
    #[must_use]
    pub fn shape(&self, city: &City) -> Vec<Point> {
        city.mesh.chain_polygon(&self.edges)
    }

    /// Whether a vertex is on the wall.
    #[must_use]
    pub fn has_vertex(&self, city: &City, v: VertexId) -> bool {
        self.edges.iter().any(|&e| city.mesh.origin(e) == v)
    }

    // =========================================================================
    // GATES
    // =========================================================================

    fn build_city_gates(&mut self, city: &mut City, reserved: &[VertexId], rng: &mut Random) -> GenerationResult<()> {
        let n = self.edges.len();
        let mut weights: Vec<f64> = self
            .edges
            .iter()
            .map(|&e| {
                let v = city.mesh.origin(e);
                let enclosed = city.cells_at(v).iter().filter(|p| self.patches.contains(p)).count();
                if reserved.contains(&v) || enclosed < 2 {
                    0.0
                } else {
                    1.0
                }
            })
            .collect();
        let mut sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            return Err(GenerationError::NoGateVertices {
                patches: self.patches.len(),
            });
        }

        let target = if city.blueprint.gates > -1 {
            city.blueprint.gates as usize
        } else if city.blueprint.hub {
            n
        } else {
            let density = if city.shore.is_empty() { 1.0 } else { 0.75 };
            2 + (self.patches.len() as f64 / 12.0 * density).floor() as usize
        };

        while self.gates.len() < target && sum > 0.0 {
            let Some(d) = rng.weighted_index(&weights) else {
                break;
            };
            let gate = city.mesh.origin(self.edges[d]);
            if self.real {
                self.open_outer_cell(city, d, gate, reserved, rng);
            }
            self.gates.push(gate);

            for (i, w) in weights.iter_mut().enumerate() {
                let k = i.abs_diff(d);
                let g = k.min(n - k);
                *w *= if g <= 1 { 0.0 } else { (g - 1) as f64 };
            }
            sum = weights.iter().sum();
        }

        if self.gates.is_empty() && target > 0 {
            return Err(GenerationError::NoGates);
        }

        if self.real {
            let shape = self.shape(city);
            let vertices = self.vertices(city);
            let mut moved = Vec::with_capacity(self.gates.len());
            for &g in &self.gates {
                if let Some(i) = vertices.iter().position(|&v| v == g) {
                    moved.push(lerp_vertex(&shape, i));
                } else {
                    moved.push(city.mesh.point(g));
                }
            }
            city.move_vertices(&self.gates, &moved);
        }
        Ok(())
    }

    /// Splits the single outer patch at a gate so a road can leave it
    /// straight away from the wall.
    fn open_outer_cell(&self, city: &mut City, d: usize, gate: VertexId, reserved: &[VertexId], rng: &mut Random) {
        let outer: Vec<PatchId> = city
            .cells_at(gate)
            .into_iter()
            .filter(|p| !self.patches.contains(p))
            .collect();
        let [k] = outer.as_slice() else {
            return;
        };
        let k = *k;
        let face = city.patch(k).face;
        let on_wall = self.vertices(city);
        let loop_vertices = city.mesh.face_vertices(face);
        let m = loop_vertices.len();
        let Some(at) = loop_vertices.iter().position(|&v| v == gate) else {
            return;
        };
        let beside = [loop_vertices[(at + 1) % m], loop_vertices[(at + m - 1) % m]];
        let candidates: Vec<VertexId> = loop_vertices
            .iter()
            .copied()
            .filter(|v| !reserved.contains(v) && !on_wall.contains(v) && !beside.contains(v))
            .collect();
        if candidates.is_empty() {
            return;
        }

        let n = self.edges.len();
        let p0 = city.mesh.point(gate);
        let prev = city.mesh.point(city.mesh.origin(self.edges[(d + n - 1) % n]));
        let next = city.mesh.point(city.mesh.origin(self.edges[(d + 1) % n]));
        let dir = p0 - Point::midpoint(prev, next);
        let mut best = candidates[0];
        let mut best_score = f64::NEG_INFINITY;
        for &v in &candidates {
            let off = city.mesh.point(v) - p0;
            let score = off.dot(dir) / off.length();
            if score > best_score {
                best_score = score;
                best = v;
            }
        }

        match city.mesh.split_face(face, gate, best) {
            Ok(fresh) => {
                let new_face = city.mesh.face_of(fresh);
                let flags = city.patch(k).clone();
                let seed = rng.next_seed();
                let kept = city.patch_mut(k);
                kept.seed = seed;
                let added = city.add_patch(new_face, rng);
                let patch = city.patch_mut(added);
                patch.waterbody = flags.waterbody;
                patch.within_city = flags.within_city;
                patch.within_walls = flags.within_walls;
                patch.landing = flags.landing;
                city.refresh_shapes();
            }
            Err(e) => trace!(error = %e, "outer patch not split at gate"),
        }
    }

    fn build_castle_gate(&mut self, city: &mut City, reserved: &[VertexId]) {
        let plaza_edge = self
            .edges
            .iter()
            .copied()
            .find(|&e| city.plaza.is_some() && city.twin_patch(e) == city.plaza);
        if let Some(e) = plaza_edge {
            self.split_segment(city, e);
            return;
        }

        let shape = self.shape(city);
        let vertices = self.vertices(city);
        let free: Vec<usize> = (0..vertices.len()).filter(|&i| !reserved.contains(&vertices[i])).collect();
        if free.is_empty() {
            let facing: Vec<EdgeId> = self
                .edges
                .iter()
                .copied()
                .filter(|&e| city.twin_patch(e).is_some_and(|p| city.patch(p).within_city))
                .collect();
            if facing.is_empty() {
                let mut shortest = self.edges[0];
                let mut len = f64::INFINITY;
                for &e in &self.edges {
                    let (a, b) = city.mesh.segment(e);
                    if a.distance(b) < len {
                        len = a.distance(b);
                        shortest = e;
                    }
                }
                self.gates.push(city.mesh.origin(shortest));
            } else {
                let mut best = facing[0];
                let mut best_d = f64::INFINITY;
                for &e in &facing {
                    let (a, b) = city.mesh.segment(e);
                    let d = Point::midpoint(a, b).length();
                    if d < best_d {
                        best_d = d;
                        best = e;
                    }
                }
                self.split_segment(city, best);
            }
        } else {
            let mut best = free[0];
            let mut best_d = f64::INFINITY;
            for &i in &free {
                let d = shape[i].length();
                if d < best_d {
                    best_d = d;
                    best = i;
                }
            }
            let gate = vertices[best];
            city.move_vertices(&[gate], &[lerp_vertex(&shape, best)]);
            self.gates.push(gate);
        }
    }

    /// Puts a gate in the middle of a wall segment.
    fn split_segment(&mut self, city: &mut City, e: EdgeId) {
        let gate = city.mesh.split_edge(e);
        let face = city.mesh.face_of(e);
        self.edges = city.mesh.face_edges(face);
        city.mesh.assign_data(&self.edges, EdgeKind::Wall, false);
        self.segments = vec![true; self.edges.len()];
        city.refresh_shapes();
        self.gates.push(gate);
    }

    /// Re-inserts edges created by splits of wall segments from outside.
    pub fn resync(&mut self, city: &City) {
        let mut i = 0;
        let mut guard = 0;
        while i < self.edges.len() && guard < 4 * self.edges.len() + 16 {
            guard += 1;
            let e = self.edges[i];
            let following = self.edges[(i + 1) % self.edges.len()];
            if city.mesh.dest(e) != city.mesh.origin(following) {
                let inserted = city.mesh.next(e);
                self.edges.insert(i + 1, inserted);
                self.segments.insert(i + 1, self.segments[i]);
            }
            i += 1;
        }
    }

    // =========================================================================
    // TOWERS
    // =========================================================================

    /// Puts a tower on every non-gate vertex next to a built segment.
    pub fn build_towers(&mut self, city: &City) {
        let n = self.edges.len();
        self.towers.clear();
        if !self.real {
            return;
        }
        for i in 0..n {
            let d = (i + n - 1) % n;
            let v = city.mesh.origin(self.edges[i]);
            if !self.gates.contains(&v) && (self.segments[d] || self.segments[i]) {
                self.towers.push(v);
            }
        }
    }

    /// Clearance a vertex needs for the wall structure on it.
    #[must_use]
    pub fn tower_radius(&self, v: VertexId) -> f64 {
        if !self.real {
            0.0
        } else if self.towers.contains(&v) {
            LTOWER_RADIUS
        } else if self.gates.contains(&v) {
            1.0 + 2.0 * TOWER_RADIUS
        } else {
            0.0
        }
    }

    /// Turns a vertex into a gate for water.
    pub fn add_watergate(&mut self, v: VertexId) {
        if !self.watergates.contains(&v) {
            self.watergates.push(v);
        }
        self.towers.retain(|&t| t != v);
    }
}
