//! # Half-Edge Mesh
//!
//! A doubly-connected edge list stored as three index arenas. Elements are
//! addressed by typed ids and never move; removed elements are tombstoned so
//! that ids held elsewhere stay valid for the lifetime of the mesh.
//!
//! ## Invariants
//!
//! - Every live half-edge belongs to exactly one face loop (`next` cycle).
//! - `twin` is symmetric: `twin(twin(e)) == e`.
//! - `origin(twin(e)) == dest(e)`.
//! - Faces are counter-clockwise.
//! - Edge payloads are the same on both halves of a twinned pair when set
//!   through [`Mesh::assign_data`].

use std::collections::HashMap;

use bastion_shared::{Point, Polygon};

use crate::error::{CoreError, CoreResult};

macro_rules! mesh_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Position in the arena.
            #[inline]
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

mesh_id!(
    /// Vertex handle.
    VertexId
);
mesh_id!(
    /// Half-edge handle.
    EdgeId
);
mesh_id!(
    /// Face handle.
    FaceId
);

/// A mesh vertex.
#[derive(Clone, Debug)]
pub struct Vertex {
    /// Position.
    pub point: Point,
    /// Outgoing half-edges.
    pub edges: Vec<EdgeId>,
    removed: bool,
}

/// One direction of an edge, owned by the face on its left.
#[derive(Clone, Debug)]
pub struct HalfEdge<T> {
    /// Start vertex.
    pub origin: VertexId,
    /// Opposite half, absent on the mesh boundary.
    pub twin: Option<EdgeId>,
    /// Next half-edge around the same face.
    pub next: EdgeId,
    /// Face on the left.
    pub face: FaceId,
    /// Payload.
    pub data: Option<T>,
    removed: bool,
}

/// A face, represented by any one of its half-edges.
#[derive(Clone, Debug)]
pub struct Face {
    /// Entry point into the face loop.
    pub half_edge: EdgeId,
    removed: bool,
}

/// Outcome of [`Mesh::collapse_edge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collapse {
    /// Surviving vertex, now at the old edge midpoint.
    pub kept: VertexId,
    /// Vertex merged into `kept`.
    pub removed: VertexId,
    /// Faces around the surviving vertex.
    pub faces: Vec<FaceId>,
}

/// Half-edge mesh with an optional payload of type `T` on every half-edge.
#[derive(Clone, Debug)]
pub struct Mesh<T> {
    vertices: Vec<Vertex>,
    edges: Vec<HalfEdge<T>>,
    faces: Vec<Face>,
}

impl<T: Copy + PartialEq> Mesh<T> {
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Builds a mesh from shared points and counter-clockwise index cycles.
    ///
    /// Face `i` of the mesh is `cells[i]`. Points not used by any cell do
    /// not become vertices.
    ///
    /// # Errors
    ///
    /// `Degenerate` if a cell has fewer than three vertices, refers to a
    /// missing point, or two cells traverse the same edge in the same
    /// direction.
    pub fn from_indexed(points: &[Point], cells: &[Vec<usize>]) -> CoreResult<Self> {
        let mut used = vec![false; points.len()];
        for cell in cells {
            if cell.len() < 3 {
                return Err(CoreError::Degenerate(format!(
                    "cell with {} vertices",
                    cell.len()
                )));
            }
            for &i in cell {
                match used.get_mut(i) {
                    Some(flag) => *flag = true,
                    None => {
                        return Err(CoreError::Degenerate(format!("point index {i} out of range")));
                    }
                }
            }
        }

        let mut remap = vec![u32::MAX; points.len()];
        let mut vertices = Vec::new();
        for (i, &p) in points.iter().enumerate() {
            if used[i] {
                remap[i] = vertices.len() as u32;
                vertices.push(Vertex {
                    point: p,
                    edges: Vec::new(),
                    removed: false,
                });
            }
        }

        let mut edges: Vec<HalfEdge<T>> = Vec::new();
        let mut faces = Vec::with_capacity(cells.len());
        let mut directed: HashMap<(u32, u32), EdgeId> = HashMap::new();

        for (f, cell) in cells.iter().enumerate() {
            let face = FaceId(f as u32);
            let first = edges.len() as u32;
            let n = cell.len() as u32;
            for k in 0..cell.len() {
                let a = remap[cell[k]];
                let b = remap[cell[(k + 1) % cell.len()]];
                let id = EdgeId(edges.len() as u32);
                if a == b || directed.insert((a, b), id).is_some() {
                    return Err(CoreError::Degenerate(format!("edge {a}->{b} repeated")));
                }
                edges.push(HalfEdge {
                    origin: VertexId(a),
                    twin: None,
                    next: EdgeId(first + (k as u32 + 1) % n),
                    face,
                    data: None,
                    removed: false,
                });
                vertices[a as usize].edges.push(id);
            }
            faces.push(Face {
                half_edge: EdgeId(first),
                removed: false,
            });
        }

        for i in 0..edges.len() {
            let a = edges[i].origin.0;
            let b = edges[edges[i].next.index()].origin.0;
            edges[i].twin = directed.get(&(b, a)).copied();
        }

        Ok(Self {
            vertices,
            edges,
            faces,
        })
    }

    /// Builds a mesh from polygons, merging vertices with identical
    /// coordinates.
    ///
    /// # Errors
    ///
    /// See [`Mesh::from_indexed`].
    pub fn from_polygons(polygons: &[Polygon]) -> CoreResult<Self> {
        let mut index: HashMap<(u64, u64), usize> = HashMap::new();
        let mut points = Vec::new();
        let mut cells = Vec::with_capacity(polygons.len());
        for poly in polygons {
            let mut cell = Vec::with_capacity(poly.len());
            for &p in poly {
                let i = *index.entry(p.bits()).or_insert_with(|| {
                    points.push(p);
                    points.len() - 1
                });
                cell.push(i);
            }
            cells.push(cell);
        }
        Self::from_indexed(&points, &cells)
    }

    // =========================================================================
    // ACCESS
    // =========================================================================

    /// Vertex record.
    #[inline]
    #[must_use]
    pub fn vertex(&self, v: VertexId) -> &Vertex {
        &self.vertices[v.index()]
    }

    /// Vertex position.
    #[inline]
    #[must_use]
    pub fn point(&self, v: VertexId) -> Point {
        self.vertices[v.index()].point
    }

    /// Moves a vertex. Every face using it sees the new position.
    #[inline]
    pub fn set_point(&mut self, v: VertexId, p: Point) {
        self.vertices[v.index()].point = p;
    }

    /// Half-edge record.
    #[inline]
    #[must_use]
    pub fn edge(&self, e: EdgeId) -> &HalfEdge<T> {
        &self.edges[e.index()]
    }

    /// Face record.
    #[inline]
    #[must_use]
    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f.index()]
    }

    /// Start vertex of a half-edge.
    #[inline]
    #[must_use]
    pub fn origin(&self, e: EdgeId) -> VertexId {
        self.edges[e.index()].origin
    }

    /// End vertex of a half-edge.
    #[inline]
    #[must_use]
    pub fn dest(&self, e: EdgeId) -> VertexId {
        self.edges[self.edges[e.index()].next.index()].origin
    }

    /// Opposite half-edge.
    #[inline]
    #[must_use]
    pub fn twin(&self, e: EdgeId) -> Option<EdgeId> {
        self.edges[e.index()].twin
    }

    /// Next half-edge around the face.
    #[inline]
    #[must_use]
    pub fn next(&self, e: EdgeId) -> EdgeId {
        self.edges[e.index()].next
    }

    /// Face on the left of a half-edge.
    #[inline]
    #[must_use]
    pub fn face_of(&self, e: EdgeId) -> FaceId {
        self.edges[e.index()].face
    }

    /// Face on the other side, if any.
    #[inline]
    #[must_use]
    pub fn twin_face(&self, e: EdgeId) -> Option<FaceId> {
        self.twin(e).map(|t| self.face_of(t))
    }

    /// Payload of a half-edge.
    #[inline]
    #[must_use]
    pub fn data(&self, e: EdgeId) -> Option<T> {
        self.edges[e.index()].data
    }

    /// Sets the payload of one half only.
    #[inline]
    pub fn set_data(&mut self, e: EdgeId, data: Option<T>) {
        self.edges[e.index()].data = data;
    }

    /// Previous half-edge around the face.
    #[must_use]
    pub fn prev(&self, e: EdgeId) -> EdgeId {
        let mut cur = e;
        loop {
            let n = self.next(cur);
            if n == e {
                return cur;
            }
            cur = n;
        }
    }

    /// Segment end points of a half-edge.
    #[must_use]
    pub fn segment(&self, e: EdgeId) -> (Point, Point) {
        (self.point(self.origin(e)), self.point(self.dest(e)))
    }

    /// Live faces in id order.
    pub fn faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.removed)
            .map(|(i, _)| FaceId(i as u32))
    }

    /// Live vertices in id order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.removed)
            .map(|(i, _)| VertexId(i as u32))
    }

    /// Live half-edges in id order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.removed)
            .map(|(i, _)| EdgeId(i as u32))
    }

    /// Number of live faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.iter().filter(|f| !f.removed).count()
    }

    /// Half-edges of a face, starting from its entry edge.
    #[must_use]
    pub fn face_edges(&self, f: FaceId) -> Vec<EdgeId> {
        let start = self.faces[f.index()].half_edge;
        let mut out = vec![start];
        let mut cur = self.next(start);
        while cur != start && out.len() <= self.edges.len() {
            out.push(cur);
            cur = self.next(cur);
        }
        out
    }

    /// Vertices of a face in order.
    #[must_use]
    pub fn face_vertices(&self, f: FaceId) -> Vec<VertexId> {
        self.face_edges(f).into_iter().map(|e| self.origin(e)).collect()
    }

    /// Current shape of a face.
    #[must_use]
    pub fn face_polygon(&self, f: FaceId) -> Polygon {
        self.face_edges(f)
            .into_iter()
            .map(|e| self.point(self.origin(e)))
            .collect()
    }

    /// Polygon through the origins of an edge chain.
    #[must_use]
    pub fn chain_polygon(&self, chain: &[EdgeId]) -> Polygon {
        chain.iter().map(|&e| self.point(self.origin(e))).collect()
    }

    /// Half-edge from `a` to `b`.
    #[must_use]
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.vertices[a.index()]
            .edges
            .iter()
            .copied()
            .find(|&e| self.dest(e) == b)
    }

    /// Faces around a vertex.
    #[must_use]
    pub fn faces_at(&self, v: VertexId) -> Vec<FaceId> {
        self.vertices[v.index()]
            .edges
            .iter()
            .map(|&e| self.face_of(e))
            .collect()
    }

    /// Whether a vertex lies on the mesh boundary.
    #[must_use]
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        self.vertices[v.index()]
            .edges
            .iter()
            .any(|&e| self.twin(e).is_none() || self.twin(self.prev(e)).is_none())
    }

    /// Whether two faces share an edge.
    #[must_use]
    pub fn are_neighbours(&self, a: FaceId, b: FaceId) -> bool {
        self.face_edges(a)
            .into_iter()
            .any(|e| self.twin_face(e) == Some(b))
    }

    // =========================================================================
    // EDGE CHAINS
    // =========================================================================

    /// Half-edges joining consecutive vertices of a path.
    ///
    /// # Errors
    ///
    /// `NotAdjacent` if two consecutive vertices share no edge.
    pub fn vertices_to_chain(&self, path: &[VertexId]) -> CoreResult<Vec<EdgeId>> {
        path.windows(2)
            .map(|w| {
                self.find_edge(w[0], w[1])
                    .ok_or(CoreError::NotAdjacent(w[0].0, w[1].0))
            })
            .collect()
    }

    /// Labels every edge of a chain and its twin.
    ///
    /// Without `overwrite`, halves that already carry a payload keep it.
    pub fn assign_data(&mut self, chain: &[EdgeId], data: T, overwrite: bool) {
        for &e in chain {
            let halves = [Some(e), self.twin(e)];
            for h in halves.into_iter().flatten() {
                let slot = &mut self.edges[h.index()].data;
                if overwrite || slot.is_none() {
                    *slot = Some(data);
                }
            }
        }
    }

    /// Boundary loop of a set of faces.
    ///
    /// An edge is on the boundary when it has no twin or its twin belongs
    /// to a face outside the set. The walk starts at `start`, or at the
    /// first boundary edge found, and follows the loop counter-clockwise.
    ///
    /// # Errors
    ///
    /// `NoBoundary` if the set has no boundary edge.
    pub fn circumference(&self, start: Option<EdgeId>, faces: &[FaceId]) -> CoreResult<Vec<EdgeId>> {
        let mut member = vec![false; self.faces.len()];
        for &f in faces {
            member[f.index()] = true;
        }
        let on_boundary = |e: EdgeId| match self.twin(e) {
            None => true,
            Some(t) => !member[self.face_of(t).index()],
        };

        let start = match start {
            Some(e) => e,
            None => faces
                .iter()
                .flat_map(|&f| self.face_edges(f))
                .find(|&e| on_boundary(e))
                .ok_or(CoreError::NoBoundary { faces: faces.len() })?,
        };

        let mut chain = Vec::new();
        let mut e = start;
        loop {
            chain.push(e);
            let mut n = self.next(e);
            let mut spin = 0;
            while !on_boundary(n) {
                // Rotate around the shared vertex until the loop continues.
                let Some(t) = self.twin(n) else { break };
                n = self.next(t);
                spin += 1;
                if spin > self.edges.len() {
                    return Err(CoreError::NoBoundary { faces: faces.len() });
                }
            }
            e = n;
            if e == start || chain.len() > self.edges.len() {
                break;
            }
        }
        Ok(chain)
    }

    /// Splits a face set into edge-connected components.
    ///
    /// Components are ordered by their first face in `faces`.
    #[must_use]
    pub fn split(&self, faces: &[FaceId]) -> Vec<Vec<FaceId>> {
        let mut member = vec![false; self.faces.len()];
        for &f in faces {
            member[f.index()] = true;
        }
        let mut seen = vec![false; self.faces.len()];
        let mut groups = Vec::new();
        for &f in faces {
            if seen[f.index()] {
                continue;
            }
            seen[f.index()] = true;
            let mut group = Vec::new();
            let mut stack = vec![f];
            while let Some(cur) = stack.pop() {
                group.push(cur);
                for e in self.face_edges(cur) {
                    if let Some(g) = self.twin_face(e) {
                        if member[g.index()] && !seen[g.index()] {
                            seen[g.index()] = true;
                            stack.push(g);
                        }
                    }
                }
            }
            groups.push(group);
        }
        groups
    }

    // =========================================================================
    // EDITING
    // =========================================================================

    fn new_edge(&mut self, edge: HalfEdge<T>) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.vertices[edge.origin.index()].edges.push(id);
        self.edges.push(edge);
        id
    }

    /// Inserts a vertex at the midpoint of an edge, splitting both halves.
    pub fn split_edge(&mut self, e: EdgeId) -> VertexId {
        let a = self.origin(e);
        let b = self.dest(e);
        let mid = Point::midpoint(self.point(a), self.point(b));
        let m = VertexId(self.vertices.len() as u32);
        self.vertices.push(Vertex {
            point: mid,
            edges: Vec::new(),
            removed: false,
        });

        let old = self.edges[e.index()].clone();
        let e2 = self.new_edge(HalfEdge {
            origin: m,
            twin: old.twin,
            next: old.next,
            face: old.face,
            data: old.data,
            removed: false,
        });
        self.edges[e.index()].next = e2;

        if let Some(t) = old.twin {
            let told = self.edges[t.index()].clone();
            let t2 = self.new_edge(HalfEdge {
                origin: m,
                twin: Some(e),
                next: told.next,
                face: told.face,
                data: told.data,
                removed: false,
            });
            self.edges[t.index()].next = t2;
            self.edges[t.index()].twin = Some(e2);
            self.edges[e.index()].twin = Some(t2);
        }
        m
    }

    /// Splits a face by a new edge between two of its vertices.
    ///
    /// The face keeps the loop running from `v1` to `v2`; the loop from
    /// `v2` back to `v1` becomes a new face. Returns the new half-edge
    /// `v1 → v2`, which belongs to the new face.
    ///
    /// # Errors
    ///
    /// `VertexNotOnFace` if either vertex is not on the face, `Degenerate`
    /// if the vertices coincide or are already joined along the face.
    pub fn split_face(&mut self, face: FaceId, v1: VertexId, v2: VertexId) -> CoreResult<EdgeId> {
        let loop_edges = self.face_edges(face);
        let find = |v: VertexId| loop_edges.iter().copied().find(|&e| self.origin(e) == v);
        let e1 = find(v1).ok_or(CoreError::VertexNotOnFace { vertex: v1.0, face: face.0 })?;
        let e2 = find(v2).ok_or(CoreError::VertexNotOnFace { vertex: v2.0, face: face.0 })?;
        if v1 == v2 || self.dest(e1) == v2 || self.dest(e2) == v1 {
            return Err(CoreError::Degenerate(format!(
                "split of face {} between adjacent vertices",
                face.0
            )));
        }
        let p1 = self.prev(e1);
        let p2 = self.prev(e2);
        let new_face = FaceId(self.faces.len() as u32);

        let kept = self.new_edge(HalfEdge {
            origin: v2,
            twin: None,
            next: e1,
            face,
            data: None,
            removed: false,
        });
        let fresh = self.new_edge(HalfEdge {
            origin: v1,
            twin: Some(kept),
            next: e2,
            face: new_face,
            data: None,
            removed: false,
        });
        self.edges[kept.index()].twin = Some(fresh);
        self.edges[p2.index()].next = kept;
        self.edges[p1.index()].next = fresh;

        self.faces[face.index()].half_edge = e1;
        self.faces.push(Face {
            half_edge: e2,
            removed: false,
        });
        let mut cur = e2;
        loop {
            self.edges[cur.index()].face = new_face;
            cur = self.next(cur);
            if cur == e2 {
                break;
            }
        }
        Ok(fresh)
    }

    /// Merges the end vertex of an interior edge into its start vertex,
    /// which moves to the edge midpoint.
    ///
    /// Returns `None` without touching the mesh when the collapse would
    /// break the mesh: boundary edges, edges joining two boundary vertices,
    /// and edges of triangles are refused.
    pub fn collapse_edge(&mut self, e: EdgeId) -> Option<Collapse> {
        let t = self.twin(e)?;
        let a = self.origin(e);
        let b = self.dest(e);
        if self.is_boundary_vertex(a) && self.is_boundary_vertex(b) {
            return None;
        }
        let f = self.face_of(e);
        let g = self.face_of(t);
        if self.face_edges(f).len() <= 3 || self.face_edges(g).len() <= 3 {
            return None;
        }
        // Vertices sharing a third neighbour would produce a doubled edge.
        let around = |v: VertexId| -> Vec<VertexId> {
            self.vertices[v.index()].edges.iter().map(|&x| self.dest(x)).collect()
        };
        let na = around(a);
        if around(b).iter().any(|v| *v != a && na.contains(v)) {
            return None;
        }

        let pe = self.prev(e);
        let pt = self.prev(t);
        let ne = self.next(e);
        let nt = self.next(t);
        self.edges[pe.index()].next = ne;
        self.edges[pt.index()].next = nt;
        if self.faces[f.index()].half_edge == e {
            self.faces[f.index()].half_edge = ne;
        }
        if self.faces[g.index()].half_edge == t {
            self.faces[g.index()].half_edge = nt;
        }

        let mid = Point::midpoint(self.point(a), self.point(b));
        self.vertices[a.index()].point = mid;
        self.vertices[a.index()].edges.retain(|&x| x != e);
        let moved: Vec<EdgeId> = self.vertices[b.index()]
            .edges
            .iter()
            .copied()
            .filter(|&x| x != t)
            .collect();
        for &x in &moved {
            self.edges[x.index()].origin = a;
        }
        self.vertices[a.index()].edges.extend(moved);
        self.vertices[b.index()].edges.clear();
        self.vertices[b.index()].removed = true;
        self.edges[e.index()].removed = true;
        self.edges[t.index()].removed = true;

        Some(Collapse {
            kept: a,
            removed: b,
            faces: self.faces_at(a),
        })
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Checks the structural invariants of the mesh.
    ///
    /// # Errors
    ///
    /// `Degenerate` describing the first violated invariant.
    pub fn validate(&self) -> CoreResult<()> {
        for e in self.edge_ids() {
            let edge = self.edge(e);
            if let Some(t) = edge.twin {
                if self.edge(t).removed || self.twin(t) != Some(e) {
                    return Err(CoreError::Degenerate(format!("twin of edge {} is not mutual", e.0)));
                }
                if self.origin(t) != self.dest(e) {
                    return Err(CoreError::Degenerate(format!("twin of edge {} is not reversed", e.0)));
                }
            }
            if self.edge(edge.next).removed || self.face_of(edge.next) != edge.face {
                return Err(CoreError::Degenerate(format!("edge {} leaves its face", e.0)));
            }
            if !self.vertex(edge.origin).edges.contains(&e) {
                return Err(CoreError::Degenerate(format!("edge {} missing from its origin", e.0)));
            }
        }
        for f in self.faces() {
            let edges = self.face_edges(f);
            if edges.len() < 3 || edges.iter().any(|&e| self.face_of(e) != f) {
                return Err(CoreError::Degenerate(format!("face {} loop is broken", f.0)));
            }
        }
        Ok(())
    }
}
