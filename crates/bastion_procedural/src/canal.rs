//! # Canals
//!
//! A river runs through the city along mesh edges. It is routed once,
//! right after the streets, over a topology that keeps it off walls, gates
//! and streets; later stages read its course through the `Canal` edge
//! kind.
//!
//! ## Routing
//!
//! - **Delta**: with a shoreline, the river starts at a shore vertex,
//!   runs inland to the center and on to the earth edge vertex that lies
//!   most squarely across from the coast there.
//! - **Regular**: inland, the river enters at one horizon vertex, passes
//!   next to the center and leaves at the horizon vertex most opposite the
//!   entry.
//!
//! A course is only kept if it is long enough, touches the shore at its
//! ends only and crosses every wall and street it meets instead of
//! glancing off them.

use bastion_core::geom::polygon::index_of;
use bastion_core::geom::segment::intersect_lines;
use bastion_core::geom::smooth_open;
use bastion_core::{EdgeId, FaceId, Point, Polygon, Random, VertexId};
use tracing::{debug, trace};

use crate::city::City;
use crate::error::{GenerationError, GenerationResult};
use crate::patch::{CityMesh, EdgeKind, PatchId};
use crate::topology::Topology;

/// A river or canal.
#[derive(Clone, Debug)]
pub struct Canal {
    /// Half-edges from the mouth upstream.
    pub course: Vec<EdgeId>,
    /// Width; set once wards are known.
    pub width: f64,
    /// Whether no city patch lines the course.
    pub rural: bool,
    /// Crossings, with the index of the artery they carry.
    pub bridges: Vec<(VertexId, Option<usize>)>,
    /// Where the course passes the curtain wall.
    pub gates: Vec<VertexId>,
}

impl Canal {
    /// Routes a river and settles its course into the mesh.
    ///
    /// # Errors
    ///
    /// `NoCanalCourse` when every candidate course was rejected.
    pub fn create_river(city: &mut City, rng: &mut Random) -> GenerationResult<Self> {
        let topology = Self::build_topology(city);
        let course = if city.shore.is_empty() {
            Self::regular_course(city, &topology, rng)
        } else {
            Self::delta_course(city, &topology, rng)
        };
        let course = course.ok_or(GenerationError::NoCanalCourse)?;
        debug!(edges = course.len(), "canal course found");
        Ok(Self::new(city, course))
    }

    fn build_topology(city: &City) -> Topology {
        let land: Vec<FaceId> = city
            .patches
            .iter()
            .filter(|p| !p.waterbody)
            .map(|p| p.face)
            .collect();
        let mut topology = Topology::new(&city.mesh, &land);
        if let Some(wall) = city.wall() {
            let mut ring = wall.vertices(city);
            if let Some(&first) = ring.first() {
                ring.push(first);
            }
            topology.exclude_polygon(&ring);
        }
        if let Some(castle) = city.castle_wall() {
            topology.exclude_points(&castle.vertices(city));
        }
        topology.exclude_points(&city.gates);
        for artery in &city.arteries {
            topology.exclude_chain(&city.mesh, artery);
        }
        topology
    }

    fn regular_course(city: &City, topology: &Topology, rng: &mut Random) -> Option<Vec<EdgeId>> {
        let mut candidates: Vec<VertexId> = city
            .horizon
            .iter()
            .map(|&e| city.mesh.origin(e))
            .filter(|&v| city.cells_at(v).len() > 1)
            .collect();

        while candidates.len() > 1 {
            let entry = *rng.pick(&candidates)?;
            let from = city.mesh.point(entry);
            let exit = candidates
                .iter()
                .copied()
                .min_by(|&a, &b| {
                    let da = from.dot(city.mesh.point(a).normalized(1.0));
                    let db = from.dot(city.mesh.point(b).normalized(1.0));
                    da.total_cmp(&db)
                })?;
            if let Some(course) = Self::through_center(city, topology, entry, exit, rng) {
                return Some(course);
            }
            trace!(?entry, ?exit, "discarding canal candidate");
            candidates.retain(|&v| v != entry && v != exit);
        }
        None
    }

    fn delta_course(city: &City, topology: &Topology, rng: &mut Random) -> Option<Vec<EdgeId>> {
        let shore: Vec<VertexId> = city.shore.iter().map(|&e| city.mesh.origin(e)).collect();
        let mut mouths: Vec<usize> = (1..shore.len().saturating_sub(1))
            .filter(|&i| {
                city.cells_at(shore[i])
                    .iter()
                    .filter(|&&p| !city.patch(p).waterbody)
                    .count()
                    > 1
            })
            .collect();
        mouths.sort_by(|&a, &b| {
            let da = city.mesh.point(shore[a]).length();
            let db = city.mesh.point(shore[b]).length();
            da.total_cmp(&db)
        });

        let mut sources: Vec<VertexId> = city
            .earth_edge
            .iter()
            .filter(|e| !city.shore.contains(e))
            .map(|&e| city.mesh.origin(e))
            .filter(|&v| city.cells_at(v).len() > 1)
            .collect();

        for i in mouths {
            let mouth = shore[i];
            let at = city.mesh.point(mouth);
            let inland = (city.mesh.point(shore[i + 1]) - city.mesh.point(shore[i - 1]))
                .normalized(1.0)
                .perp();
            let source = sources.iter().copied().max_by(|&a, &b| {
                let da = inland.dot((city.mesh.point(a) - at).normalized(1.0));
                let db = inland.dot((city.mesh.point(b) - at).normalized(1.0));
                da.total_cmp(&db)
            })?;
            if let Some(course) = Self::through_center(city, topology, mouth, source, rng) {
                return Some(course);
            }
            trace!(?mouth, ?source, "discarding canal candidate");
            sources.retain(|&v| v != source);
        }
        None
    }

    /// Course from `entry` to a vertex next to the center and on to
    /// `exit`, spliced where the two legs first meet.
    fn through_center(
        city: &City,
        topology: &Topology,
        entry: VertexId,
        exit: VertexId,
        rng: &mut Random,
    ) -> Option<Vec<EdgeId>> {
        let hub = rng
            .pick(&city.mesh.vertex(city.center).edges)
            .map(|&e| city.mesh.dest(e))?;
        let inbound = topology.build_path(entry, hub)?;
        let outbound = topology.build_path(hub, exit)?;
        let (p, g) = inbound
            .iter()
            .enumerate()
            .find_map(|(p, v)| outbound.iter().position(|w| w == v).map(|g| (p, g)))?;
        let mut path = inbound[..p].to_vec();
        path.extend_from_slice(&outbound[g..]);
        let course = city.mesh.vertices_to_chain(&path).ok()?;
        Self::validate_course(city, &course).then_some(course)
    }

    fn validate_course(city: &City, course: &[EdgeId]) -> bool {
        if course.len() < 2 || (course.len() as f64) < city.earth_edge.len() as f64 / 5.0 {
            return false;
        }
        if course[1..].iter().any(|&e| city.on_shore(city.mesh.origin(e))) {
            return false;
        }
        let interior = |v: VertexId| index_by_origin(&city.mesh, course, v).filter(|&d| d > 0);

        if let Some(wall) = city.wall() {
            for &e in &wall.edges {
                if let Some(d) = interior(city.mesh.origin(e)) {
                    if !crosses(&city.mesh, &wall.edges, e, course, course[d]) {
                        return false;
                    }
                }
            }
        }
        for artery in &city.arteries {
            for &e in artery.iter().take(artery.len().saturating_sub(1)).skip(1) {
                if let Some(d) = interior(city.mesh.origin(e)) {
                    if !crosses(&city.mesh, artery, e, course, course[d]) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Settles a validated course: eases the mouth into the coast, smooths
    /// the course and lines it up with the wall where it passes through.
    fn new(city: &mut City, course: Vec<EdgeId>) -> Self {
        let vertices = chain_vertices(&city.mesh, &course);
        let mut points: Polygon = vertices.iter().map(|&v| city.mesh.point(v)).collect();

        if !city.water_edge.is_empty() && points.len() > 1 {
            let mouth = Point::midpoint(points[0], points[1]);
            city.mesh.set_point(vertices[0], mouth);
            points[0] = mouth;

            let shore = chain_vertices(&city.mesh, &city.shore);
            if let Some(h) = shore.iter().position(|&v| v == vertices[0]) {
                let ease = |city: &mut City, at: usize, beyond: usize| {
                    let p = city.mesh.point(shore[at]);
                    let q = Point::midpoint(city.mesh.point(shore[beyond]), mouth);
                    city.mesh.set_point(shore[at], Point::midpoint(p, q));
                };
                if h >= 2 {
                    ease(city, h - 1, h - 2);
                }
                if h + 2 < shore.len() {
                    ease(city, h + 1, h + 2);
                }
            }
        }

        let smoothed = smooth_open(&points, &[], 1);
        city.move_vertices(&vertices, &smoothed);
        city.mesh.assign_data(&course, EdgeKind::Canal, true);

        if let Some(ring) = city.wall().map(|w| w.shape(city)) {
            let m = ring.len();
            let mut points: Polygon = vertices.iter().map(|&v| city.mesh.point(v)).collect();
            for h in 1..course.len() {
                let Some(p) = index_of(&ring, points[h]) else {
                    continue;
                };
                let g = points[h - 1];
                let q = points[h + 1] - g;
                let u = ring[(p + m - 1) % m];
                let w = ring[(p + 1) % m];
                if let Some((t, _)) = intersect_lines(g, q, u, w - u) {
                    points[h] = Point::midpoint(points[h], g + q * t);
                }
            }
            city.move_vertices(&vertices, &points);
        }

        Self {
            course,
            width: 0.0,
            rural: true,
            bridges: Vec::new(),
            gates: Vec::new(),
        }
    }

    /// Places water gates and bridges and sizes the canal. Runs once the
    /// wards are assigned.
    pub fn update_state(&mut self, city: &mut City, rng: &mut Random) {
        let n = self.course.len();
        let interior = |city: &City, v: VertexId| index_by_origin(&city.mesh, &self.course, v).filter(|&d| d > 0);

        self.gates.clear();
        let mut watergates = Vec::new();
        if let Some(wall) = city.wall() {
            for &e in &wall.edges {
                let v = city.mesh.origin(e);
                if interior(city, v).is_some() {
                    watergates.push(v);
                }
            }
        }
        if let Some(wall) = city.border.as_mut() {
            for &v in &watergates {
                wall.add_watergate(v);
            }
        }
        self.gates = watergates;

        self.bridges.clear();
        for (a, artery) in city.arteries.iter().enumerate() {
            for (k, &e) in artery.iter().enumerate() {
                let v = city.mesh.origin(e);
                let Some(f) = interior(city, v) else {
                    continue;
                };
                if (k == 0 || crosses(&city.mesh, artery, e, &self.course, self.course[f]))
                    && !self.bridges.iter().any(|b| b.0 == v)
                {
                    self.bridges.push((v, Some(a)));
                }
            }
        }

        let in_city = |p: Option<PatchId>| p.is_some_and(|p| city.inner.contains(&p));
        let mut banks: Vec<VertexId> = Vec::new();
        for &e in self.course.iter().take(n.saturating_sub(1)).skip(2) {
            if in_city(city.edge_patch(e)) || in_city(city.twin_patch(e)) {
                let v = city.mesh.origin(e);
                if !banks.contains(&v) {
                    banks.push(v);
                }
            }
        }
        banks.retain(|v| !self.gates.contains(v));
        let lined = banks.len();
        self.rural = lined == 0;
        let rural = if self.rural { 1.5 } else { 1.0 };
        self.width = (3.0 + city.inner.len() as f64 / 5.0) * (0.8 + rng.float() * 0.4) * rural;

        if !self.rural {
            let mut built = banks.iter().filter(|v| self.bridges.iter().any(|b| b.0 == **v)).count();
            banks.retain(|v| !self.bridges.iter().any(|b| b.0 == *v));
            while rng.float() < 1.0 - 2.0 * built as f64 / lined as f64 {
                let weights: Vec<f64> = banks
                    .iter()
                    .map(|&v| 1.0 / city.mesh.vertex(v).edges.len().max(1) as f64)
                    .collect();
                let Some(i) = rng.weighted_index(&weights) else {
                    break;
                };
                self.bridges.push((banks.remove(i), None));
                built += 1;
            }
        }
        city.mesh.assign_data(&self.course, EdgeKind::Canal, true);
        debug!(width = self.width, bridges = self.bridges.len(), rural = self.rural, "canal settled");
    }

    /// Course vertices from the mouth, including the last destination.
    #[must_use]
    pub fn vertices(&self, mesh: &CityMesh) -> Vec<VertexId> {
        chain_vertices(mesh, &self.course)
    }

    /// Course as a polyline.
    #[must_use]
    pub fn polyline(&self, mesh: &CityMesh) -> Polygon {
        self.vertices(mesh).into_iter().map(|v| mesh.point(v)).collect()
    }

    /// Whether the course passes a vertex.
    #[must_use]
    pub fn has_vertex(&self, mesh: &CityMesh, v: VertexId) -> bool {
        self.course.iter().any(|&e| mesh.origin(e) == v)
            || self.course.last().is_some_and(|&e| mesh.dest(e) == v)
    }

    /// First vertex of the course.
    #[must_use]
    pub fn mouth(&self, mesh: &CityMesh) -> Option<VertexId> {
        self.course.first().map(|&e| mesh.origin(e))
    }
}

/// Origins of a chain plus its last destination.
fn chain_vertices(mesh: &CityMesh, chain: &[EdgeId]) -> Vec<VertexId> {
    let mut out: Vec<VertexId> = chain.iter().map(|&e| mesh.origin(e)).collect();
    if let Some(&last) = chain.last() {
        out.push(mesh.dest(last));
    }
    out
}

/// Position of the chain edge starting at `v`.
fn index_by_origin(mesh: &CityMesh, chain: &[EdgeId], v: VertexId) -> Option<usize> {
    chain.iter().position(|&e| mesh.origin(e) == v)
}

/// Whether chain `c` passes through chain `a` at the shared vertex where
/// `b` (in `a`) and `d` (in `c`) start, rather than touching it.
///
/// Turning around the vertex from the edge entering along `a`, exactly
/// one edge of `c` has to come before the edge leaving along `a`.
fn crosses(mesh: &CityMesh, a: &[EdgeId], b: EdgeId, c: &[EdgeId], d: EdgeId) -> bool {
    let (Some(bi), Some(di)) = (a.iter().position(|&e| e == b), c.iter().position(|&e| e == d)) else {
        return false;
    };
    let a_in = a[(bi + a.len() - 1) % a.len()];
    let c_in = c[(di + c.len() - 1) % c.len()];
    let (Some(b_back), Some(d_back)) = (mesh.twin(b), mesh.twin(d)) else {
        return false;
    };
    let stops = [c_in, b_back, d_back];
    let limit = mesh.vertex(mesh.origin(b)).edges.len() + 2;

    let turn = |from: EdgeId| -> Option<EdgeId> {
        let mut e = from;
        for _ in 0..limit {
            e = mesh.twin(mesh.next(e))?;
            if stops.contains(&e) {
                return Some(e);
            }
        }
        None
    };
    let Some(first) = turn(a_in) else {
        return false;
    };
    if first == b_back {
        return false;
    }
    turn(first) == Some(b_back)
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn chain(mesh: &CityMesh, pts: &[(f64, f64)]) -> Vec<EdgeId> {
        let vs: Vec<VertexId> = pts
            .iter()
            .map(|&(x, y)| mesh.vertex_ids().find(|&v| mesh.point(v) == Point::new(x, y)).unwrap())
            .collect();
        mesh.vertices_to_chain(&vs).unwrap()
    }

    #[test]
    fn test_crossing_chains() {
        let mesh = grid();
        // Horizontal and vertical lines through (1, 1).
        let a = chain(&mesh, &[(0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]);
        let c = chain(&mesh, &[(1.0, 0.0), (1.0, 1.0), (1.0, 2.0)]);
        assert!(crosses(&mesh, &a, a[1], &c, c[1]));
        assert!(crosses(&mesh, &c, c[1], &a, a[1]));
    }

    #[test]
    fn test_touching_chains() {
        // A fan of six triangles around the origin.
        let ring: Vec<Point> = (0..6)
            .map(|k| Point::polar(1.0, f64::from(k) * std::f64::consts::TAU / 6.0))
            .collect();
        let tris: Vec<Polygon> = (0..6).map(|k| vec![Point::ZERO, ring[k], ring[(k + 1) % 6]]).collect();
        let mesh = CityMesh::from_polygons(&tris).unwrap();
        let at = |p: Point| mesh.vertex_ids().find(|&v| mesh.point(v) == p).unwrap();
        let hub = at(Point::ZERO);
        let a = mesh.vertices_to_chain(&[at(ring[3]), hub, at(ring[0])]).unwrap();
        // Both ends of `c` lie north of `a`.
        let c = mesh.vertices_to_chain(&[at(ring[1]), hub, at(ring[2])]).unwrap();
        assert!(!crosses(&mesh, &a, a[1], &c, c[1]));
        let d = mesh.vertices_to_chain(&[at(ring[1]), hub, at(ring[4])]).unwrap();
        assert!(crosses(&mesh, &a, a[1], &d, d[1]));
    }

    #[test]
    fn test_chain_vertices() {
        let mesh = grid();
        let a = chain(&mesh, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let vs = chain_vertices(&mesh, &a);
        assert_eq!(vs.len(), 3);
        assert_eq!(mesh.point(vs[2]), Point::new(2.0, 0.0));
        assert_eq!(index_by_origin(&mesh, &a, vs[1]), Some(1));
        assert_eq!(index_by_origin(&mesh, &a, vs[2]), None);
    }
}
