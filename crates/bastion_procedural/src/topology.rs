//! # Routing Topology
//!
//! A disposable graph over the vertices of a patch subset. Only edges that
//! carry no [`EdgeKind`](crate::patch::EdgeKind) are routable, so walls,
//! roads and coasts laid down earlier are never crossed lengthwise.
//!
//! Build a fresh topology for every purpose: exclusions differ between
//! streets, roads and rivers, and any mesh edit invalidates it.

use std::collections::HashMap;

use bastion_core::{EdgeId, FaceId, Graph, NodeId, Point, VertexId};

use crate::patch::CityMesh;

/// Weighted vertex graph for path finding.
pub struct Topology {
    graph: Graph<VertexId>,
    nodes: HashMap<VertexId, NodeId>,
    points: Vec<Point>,
}

impl Topology {
    /// Graph over the unclassified edges of `faces`.
    #[must_use]
    pub fn new(mesh: &CityMesh, faces: &[FaceId]) -> Self {
        let mut topo = Self {
            graph: Graph::new(),
            nodes: HashMap::new(),
            points: Vec::new(),
        };
        for &f in faces {
            for e in mesh.face_edges(f) {
                if mesh.data(e).is_some() {
                    continue;
                }
                let a = topo.node_for(mesh, mesh.origin(e));
                let b = topo.node_for(mesh, mesh.dest(e));
                let (pa, pb) = mesh.segment(e);
                topo.graph.link(a, b, pa.distance(pb));
            }
        }
        topo
    }

    fn node_for(&mut self, mesh: &CityMesh, v: VertexId) -> NodeId {
        if let Some(&n) = self.nodes.get(&v) {
            return n;
        }
        let n = self.graph.add_node(v);
        self.nodes.insert(v, n);
        self.points.push(mesh.point(v));
        n
    }

    /// Whether a vertex is part of the graph.
    #[must_use]
    pub fn contains(&self, v: VertexId) -> bool {
        self.nodes.contains_key(&v)
    }

    /// Number of routable vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Whether nothing is routable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Cuts every link of the given vertices.
    pub fn exclude_points(&mut self, vertices: &[VertexId]) {
        for v in vertices {
            if let Some(&n) = self.nodes.get(v) {
                self.graph.unlink_all(n);
            }
        }
    }

    /// Cuts the links along a vertex path.
    pub fn exclude_polygon(&mut self, path: &[VertexId]) {
        for w in path.windows(2) {
            if let (Some(&a), Some(&b)) = (self.nodes.get(&w[0]), self.nodes.get(&w[1])) {
                self.graph.unlink(a, b);
            }
        }
    }

    /// [`Topology::exclude_polygon`] over the origins of an edge chain,
    /// including its last destination.
    pub fn exclude_chain(&mut self, mesh: &CityMesh, chain: &[EdgeId]) {
        let mut path: Vec<VertexId> = chain.iter().map(|&e| mesh.origin(e)).collect();
        if let Some(&last) = chain.last() {
            path.push(mesh.dest(last));
        }
        self.exclude_polygon(&path);
    }

    /// Shortest path from `from` to `to`, both included.
    #[must_use]
    pub fn build_path(&self, from: VertexId, to: VertexId) -> Option<Vec<VertexId>> {
        let start = *self.nodes.get(&from)?;
        let goal = *self.nodes.get(&to)?;
        let target = self.points[goal.index()];
        let path = self
            .graph
            .a_star(start, goal, &[], |n| self.points[n.index()].distance(target))?;
        Some(path.into_iter().map(|n| self.graph.node(n).data).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::EdgeKind;
    use bastion_core::Polygon;

    /// A 3×3 grid of unit squares.
    fn grid() -> CityMesh {
        let mut polys: Vec<Polygon> = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                let (x, y) = (f64::from(x), f64::from(y));
                polys.push(vec![
                    Point::new(x, y),
                    Point::new(x + 1.0, y),
                    Point::new(x + 1.0, y + 1.0),
                    Point::new(x, y + 1.0),
                ]);
            }
        }
        CityMesh::from_polygons(&polys).unwrap()
    }

    fn vertex_at(mesh: &CityMesh, p: Point) -> VertexId {
        mesh.vertex_ids().find(|&v| mesh.point(v) == p).unwrap()
    }

    #[test]
    fn test_straight_path() {
        let mesh = grid();
        let faces: Vec<FaceId> = mesh.faces().collect();
        let topo = Topology::new(&mesh, &faces);
        assert_eq!(topo.len(), 16);
        let a = vertex_at(&mesh, Point::new(0.0, 0.0));
        let b = vertex_at(&mesh, Point::new(3.0, 0.0));
        let path = topo.build_path(a, b).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path[0], a);
        assert_eq!(path[3], b);
    }

    #[test]
    fn test_classified_edges_are_not_routable() {
        let mut mesh = grid();
        let a = vertex_at(&mesh, Point::new(0.0, 1.0));
        let b = vertex_at(&mesh, Point::new(1.0, 1.0));
        let e = mesh.find_edge(a, b).unwrap();
        mesh.assign_data(&[e], EdgeKind::Wall, true);
        let faces: Vec<FaceId> = mesh.faces().collect();
        let topo = Topology::new(&mesh, &faces);
        let path = topo.build_path(a, b).unwrap();
        assert!(path.len() > 2);
    }

    #[test]
    fn test_exclusions() {
        let mesh = grid();
        let faces: Vec<FaceId> = mesh.faces().collect();
        let mut topo = Topology::new(&mesh, &faces);
        let a = vertex_at(&mesh, Point::new(0.0, 0.0));
        let m = vertex_at(&mesh, Point::new(1.0, 0.0));
        let b = vertex_at(&mesh, Point::new(2.0, 0.0));
        topo.exclude_points(&[m]);
        let path = topo.build_path(a, b).unwrap();
        assert!(!path.contains(&m));

        let c = vertex_at(&mesh, Point::new(0.0, 1.0));
        topo.exclude_polygon(&[a, c]);
        assert!(topo.build_path(a, b).is_none());
    }

    #[test]
    fn test_unknown_vertex() {
        let mesh = grid();
        let first = mesh.faces().next().unwrap();
        let topo = Topology::new(&mesh, &[first]);
        let far = vertex_at(&mesh, Point::new(3.0, 3.0));
        let near = vertex_at(&mesh, Point::new(0.0, 0.0));
        assert!(!topo.contains(far));
        assert!(topo.build_path(near, far).is_none());
    }
}
