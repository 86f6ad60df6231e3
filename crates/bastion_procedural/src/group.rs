//! # Ward Groups
//!
//! Neighbouring Alleys patches of one district are merged into a ward
//! group and built up together, so alleys run across patch borders. The
//! group's available area is cut into blocks along alleys; one block of
//! moderate size becomes the church block.
//!
//! Groups that are not fully urban thin their lots out by a density field
//! that is high next to the city and low toward the open country.

use bastion_core::geom::polygon::{area, center, compactness};
use bastion_core::geom::segment::{barycentric, intersect_lines};
use bastion_core::geom::{cut, earcut, obb};
use bastion_core::{EdgeId, Point, Polygon, Random, VertexId};
use bastion_shared::ALLEY;
use tracing::trace;

use crate::bisector::{Bisector, CutPolicy};
use crate::block::Block;
use crate::city::City;
use crate::district::AlleyParams;
use crate::forester::Forester;
use crate::patch::{EdgeKind, PatchId};
use crate::ward::{edge_inset, inset_with_clearances, vertex_clearance, WardKind, MARGIN};

/// Attempts at a set of blocks with at least one lot.
const MAX_ATTEMPTS: usize = 20;

/// Runs `attempt` until it succeeds, at most `MAX_ATTEMPTS` times.
/// Returns the number of runs.
fn bounded(mut attempt: impl FnMut() -> bool) -> usize {
    for run in 1..=MAX_ATTEMPTS {
        if attempt() {
            return run;
        }
    }
    MAX_ATTEMPTS
}

/// Contiguous Alleys patches built as one.
#[derive(Clone, Debug)]
pub struct WardGroup {
    /// Member patches; the first one seeds the geometry.
    pub patches: Vec<PatchId>,
    /// Patch whose seed drives the geometry.
    pub core: PatchId,
    /// Boundary, counter-clockwise.
    pub border: Vec<EdgeId>,
    /// Border vertices fully surrounded by the city.
    pub inner: Vec<VertexId>,
    /// Whether every border vertex is inner.
    pub urban: bool,
    /// Blocks.
    pub blocks: Vec<Block>,
    /// Alley center lines.
    pub alleys: Vec<Polygon>,
    /// Index of the church block.
    pub church: Option<usize>,
}

impl WardGroup {
    /// Group of `patches` inside a district with the given border and
    /// patch count.
    #[must_use]
    pub fn new(city: &City, patches: Vec<PatchId>, district_border: &[EdgeId], district_len: usize) -> Self {
        let core = patches[0];
        let border = if patches.len() == 1 {
            city.mesh.face_edges(city.patch(core).face)
        } else if patches.len() < district_len || district_border.is_empty() {
            city.mesh
                .circumference(None, &city.faces_of(&patches))
                .unwrap_or_default()
        } else {
            district_border.to_vec()
        };

        let inner: Vec<VertexId> = border
            .iter()
            .filter(|&&e| {
                let walled = city.edge_patch(e).is_some_and(|p| city.patch(p).within_walls);
                let v = city.mesh.origin(e);
                walled
                    || city
                        .cells_at(v)
                        .iter()
                        .all(|&p| city.patch(p).within_city || city.patch(p).waterbody)
            })
            .map(|&e| city.mesh.origin(e))
            .collect();
        let urban = inner.len() == border.len();

        Self {
            patches,
            core,
            border,
            inner,
            urban,
            blocks: Vec::new(),
            alleys: Vec::new(),
            church: None,
        }
    }

    /// Current outline.
    #[must_use]
    pub fn shape(&self, city: &City) -> Polygon {
        city.mesh.chain_polygon(&self.border)
    }

    /// Buildable space: the outline minus street frontage and clearances.
    fn available(&self, city: &City, rng: &mut Random) -> Option<Polygon> {
        let shape = self.shape(city);
        let insets: Vec<f64> = self
            .border
            .iter()
            .map(|&e| city.edge_patch(e).map_or(0.0, |own| edge_inset(city, own, e)))
            .collect();
        let clear: Vec<f64> = self
            .border
            .iter()
            .map(|&e| vertex_clearance(city, city.mesh.origin(e), MARGIN))
            .collect();
        inset_with_clearances(&shape, &insets, &clear, rng)
    }

    /// Cuts the group into blocks, lots and buildings.
    pub fn create_geometry(&mut self, city: &City, params: &AlleyParams) {
        self.blocks.clear();
        self.alleys.clear();
        self.church = None;
        if self.border.is_empty() {
            return;
        }
        let mut rng = Random::new(city.patch(self.core).seed);
        let Some(space) = self.available(city, &mut rng) else {
            trace!(core = self.core.0, "ward group has no available area");
            return;
        };

        let shape = self.shape(city);
        let block_m: Vec<f64> = self
            .border
            .iter()
            .map(|&e| if self.inner.contains(&city.mesh.origin(e)) { 1.0 } else { 9.0 })
            .collect();
        let field = (!self.urban).then(|| DensityField::new(&shape, block_m));
        let lot_density = (!self.urban).then(|| DensityField::new(&shape, self.lot_densities(city)));

        let runs = bounded(|| {
            self.blocks.clear();
            self.alleys.clear();
            self.church = None;
            let threshold = params.min_sq * 2f64.powf(params.size_chaos * (2.0 * rng.float() - 1.0)) * params.block_size;
            if area(&space) > threshold {
                self.create_alleys(space.clone(), params, field.as_ref(), &mut rng);
            } else {
                self.blocks.push(Block::new(space.clone(), false, params, &mut rng));
            }
            if let Some(density) = &lot_density {
                self.filter(density, &mut rng);
            }
            self.blocks.iter().any(|b| !b.lots.is_empty())
        });
        if self.blocks.is_empty() {
            trace!(core = self.core.0, runs, "ward group produced no blocks");
        }
    }

    fn create_alleys(&mut self, space: Polygon, params: &AlleyParams, field: Option<&DensityField>, rng: &mut Random) {
        let policy = AlleyCuts { params, field };
        let mut bisector = Bisector::new(space, params.min_sq * params.block_size, 16.0 * params.grid_chaos, &policy);
        bisector.min_turn_offset = params.grid_chaos;
        let pieces = bisector.partition(rng);

        for piece in pieces {
            let a = area(&piece).abs();
            let t = params.min_sq * 2f64.powf(params.size_chaos * (2.0 * rng.float() - 1.0));
            if a < t {
                self.blocks.push(Block::new(piece, true, params, rng));
            } else if self.church.is_none() && a <= 4.0 * t {
                let church = church_plot(&piece, params, rng);
                self.church = Some(self.blocks.len());
                self.blocks.push(Block::new(church, true, params, rng));
            } else {
                self.blocks.push(Block::new(piece, false, params, rng));
            }
        }
        self.alleys = bisector.cuts;
    }

    /// Lot density at each border vertex: full next to the city, partial
    /// along streets, walls and canals, none elsewhere.
    fn lot_densities(&self, city: &City) -> Vec<f64> {
        let weight = |e: EdgeId| match city.mesh.data(e) {
            Some(EdgeKind::Road) => 0.3,
            Some(EdgeKind::Wall) => 0.5,
            Some(EdgeKind::Canal) => 0.1,
            _ => 0.0,
        };
        let n = self.border.len();
        (0..n)
            .map(|i| {
                let e = self.border[i];
                if self.inner.contains(&city.mesh.origin(e)) {
                    1.0
                } else {
                    f64::max(weight(e), weight(self.border[(i + n - 1) % n]))
                }
            })
            .collect()
    }

    /// Thins lots out by the density field; empty blocks go.
    fn filter(&mut self, density: &DensityField, rng: &mut Random) {
        let f = (self.patches.len() as f64).sqrt();
        let k = 0.5 * f - 0.5;
        for block in &mut self.blocks {
            block.retain_lots(|lot| {
                let n = density.sample(center(lot));
                !n.is_nan() && rng.float() < n * f - k
            });
        }
        let church = self.church.take();
        let mut kept = Vec::with_capacity(self.blocks.len());
        for (i, block) in std::mem::take(&mut self.blocks).into_iter().enumerate() {
            if block.lots.is_empty() {
                continue;
            }
            if church == Some(i) {
                self.church = Some(kept.len());
            }
            kept.push(block);
        }
        self.blocks = kept;
    }

    /// Trees in the courtyards of every block.
    #[must_use]
    pub fn spawn_trees(&self, city: &City, forester: &Forester, rng: &mut Random) -> Vec<Point> {
        let greenery = city
            .patch(self.core)
            .district
            .and_then(|d| city.districts.get(d))
            .map_or(0.0, |d| d.params.greenery);
        let density = if self.urban { greenery } else { greenery * 0.1 };
        let mut trees = Vec::new();
        for block in &self.blocks {
            for yard in &block.courtyards {
                trees.extend(forester.fill_area(yard, density, rng));
            }
        }
        trees
    }
}

// =============================================================================
// DENSITY FIELD
// =============================================================================

/// Values at the vertices of a polygon, interpolated linearly over a
/// triangulation of it.
struct DensityField {
    shape: Polygon,
    triangles: Vec<[usize; 3]>,
    values: Vec<f64>,
}

impl DensityField {
    fn new(shape: &[Point], values: Vec<f64>) -> Self {
        Self {
            shape: shape.to_vec(),
            triangles: earcut(shape),
            values,
        }
    }

    /// Interpolated value, NaN outside the polygon.
    fn sample(&self, p: Point) -> f64 {
        const SLACK: f64 = -1e-9;
        for &[a, b, c] in &self.triangles {
            let (u, v, w) = barycentric(self.shape[a], self.shape[b], self.shape[c], p);
            if u >= SLACK && v >= SLACK && w >= SLACK {
                return u * self.values[a] + v * self.values[b] + w * self.values[c];
            }
        }
        f64::NAN
    }
}

// =============================================================================
// ALLEY CUTS
// =============================================================================

/// Cut policy of alleys: a gap of an alley's width, elbows rounded into
/// arcs, and outside the city pieces sized by the density field.
struct AlleyCuts<'a> {
    params: &'a AlleyParams,
    field: Option<&'a DensityField>,
}

impl CutPolicy for AlleyCuts<'_> {
    fn gap(&self, _cut: &[Point]) -> f64 {
        ALLEY
    }

    fn process_cut(&self, cut: Polygon, rng: &mut Random) -> Polygon {
        semi_smooth(cut, self.params.min_front, rng)
    }

    fn is_atomic(&self, piece: &[Point]) -> Option<bool> {
        let field = self.field?;
        let m = field.sample(center(piece));
        Some(area(piece).abs() < self.params.min_sq * self.params.block_size * m)
    }
}

/// Rounds the elbow of a three-point cut into an arc when the turn is
/// gentle and the legs are long enough.
fn semi_smooth(cut: Polygon, min_front: f64, rng: &mut Random) -> Polygon {
    let &[b, c, d] = cut.as_slice() else {
        return cut;
    };
    let span = b.distance(d);
    let bulge = area(&[b, c, d]).abs();
    if span <= 0.0 || bulge / span < 1.0 || bulge / (span * span) < 0.01 {
        return vec![b, d];
    }

    let h = c - b;
    let k = d - c;
    let (n, p) = (h.length(), k.length());
    let cos = h.dot(k) / n / p;
    if rng.float() < (1.0 - cos) / 2.0 || rng.float() < min_front / n.min(p) {
        return cut;
    }

    if n < p {
        let c1 = c + k * (n / p);
        let Some((o, r)) = tangent_circle(b, h, c1, k) else {
            return cut;
        };
        match arc(o, r, b, c1, min_front) {
            Some(mut line) => {
                line.push(d);
                line
            }
            None => cut,
        }
    } else {
        let c1 = c - h * (p / n);
        let Some((o, r)) = tangent_circle(c1, h, d, k) else {
            return cut;
        };
        match arc(o, r, c1, d, min_front) {
            Some(line) => {
                let mut out = vec![b];
                out.extend(line);
                out
            }
            None => cut,
        }
    }
}

/// Circle touching the line through `a` along `da` at `a` and the line
/// through `c` along `dc` at `c`.
fn tangent_circle(a: Point, da: Point, c: Point, dc: Point) -> Option<(Point, f64)> {
    let (t, _) = intersect_lines(a, da.perp(), c, dc.perp())?;
    let o = a + da.perp() * t;
    Some((o, (da.length() * t).abs()))
}

/// Points on the arc of circle `(o, r)` from `from` to `to`, the ends
/// exact; `None` when the arc is too short to be worth it.
fn arc(o: Point, r: f64, from: Point, to: Point, step: f64) -> Option<Polygon> {
    let a1 = (from - o).atan2();
    let mut a2 = (to - o).atan2();
    while a2 - a1 > std::f64::consts::PI {
        a2 -= std::f64::consts::TAU;
    }
    while a1 - a2 > std::f64::consts::PI {
        a2 += std::f64::consts::TAU;
    }
    let n = ((a1 - a2).abs() * r / step).floor() as usize;
    if n <= 2 {
        return None;
    }
    let mut out: Polygon = (0..n)
        .map(|i| o + Point::polar(r, a1 + (a2 - a1) * i as f64 / (n - 1) as f64))
        .collect();
    out[0] = from;
    out[n - 1] = to;
    Some(out)
}

/// The most compact piece left after cutting a church plot off the short
/// end of `piece`.
fn church_plot(piece: &[Point], params: &AlleyParams, rng: &mut Random) -> Polygon {
    let b = obb(piece);
    let side_a = b[0] - b[1];
    let side_b = b[2] - b[1];
    let long = if side_a.length() > side_b.length() { side_a } else { side_b };
    let mut d = params.min_front / long.length();
    d = if d > 0.5 { 0.5 } else { d + (1.0 - 2.0 * d) * rng.avg3() };
    let p = b[1] + long * d;
    cut(piece, p, p + long.perp(), 0.0)
        .into_iter()
        .max_by(|x, y| compactness(x).total_cmp(&compactness(y)))
        .unwrap_or_else(|| piece.to_vec())
}

/// Points of a district outline that smoothing must not move.
pub(crate) fn fixed_points(city: &City, border: &[EdgeId]) -> Vec<Point> {
    let mut out = Vec::new();
    for &e in border {
        let v = city.mesh.origin(e);
        let classified = city
            .mesh
            .vertex(v)
            .edges
            .iter()
            .any(|&o| city.mesh.data(o).is_some_and(|k| k != EdgeKind::Horizon));
        let foreign = city
            .cells_at(v)
            .iter()
            .any(|&p| !city.patch(p).has_ward(WardKind::Alleys));
        if classified || foreign {
            out.push(city.mesh.point(v));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::geom::polygon::{centroid, rect};

    #[test]
    fn test_block_attempts_are_bounded() {
        let mut calls = 0;
        let runs = bounded(|| {
            calls += 1;
            false
        });
        assert_eq!(runs, MAX_ATTEMPTS);
        assert_eq!(calls, MAX_ATTEMPTS);

        let mut calls = 0;
        let runs = bounded(|| {
            calls += 1;
            calls == 3
        });
        assert_eq!(runs, 3);
    }

    #[test]
    fn test_density_field_interpolates() {
        let shape = rect(10.0, 10.0);
        let field = DensityField::new(&shape, vec![0.0, 1.0, 1.0, 0.0]);
        let mid = field.sample(Point::ZERO);
        assert!((mid - 0.5).abs() < 1e-9);
        assert!((field.sample(Point::new(5.0, 0.0)) - 1.0).abs() < 1e-9);
        assert!(field.sample(Point::new(50.0, 0.0)).is_nan());
    }

    #[test]
    fn test_straight_cut_stays_straight() {
        let mut rng = Random::new(1);
        let cut = vec![Point::new(0.0, 0.0), Point::new(5.0, 0.01), Point::new(10.0, 0.0)];
        assert_eq!(semi_smooth(cut, 2.0, &mut rng).len(), 2);
    }

    #[test]
    fn test_arc_keeps_ends() {
        let from = Point::new(10.0, 0.0);
        let to = Point::new(0.0, 10.0);
        let line = arc(Point::ZERO, 10.0, from, to, 1.0).unwrap();
        assert_eq!(line[0], from);
        assert_eq!(*line.last().unwrap(), to);
        assert!(line.iter().all(|p| (p.length() - 10.0).abs() < 1e-6));
        assert!(arc(Point::ZERO, 10.0, from, to, 100.0).is_none());
    }

    #[test]
    fn test_tangent_circle() {
        // y = 0 at the origin and x = 5 at (5, 5).
        let (o, r) = tangent_circle(Point::ZERO, Point::new(1.0, 0.0), Point::new(5.0, 5.0), Point::new(0.0, 1.0)).unwrap();
        assert!((o.x - 0.0).abs() < 1e-9 && (o.y - 5.0).abs() < 1e-9);
        assert!((r - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_church_plot_is_smaller() {
        let mut rng = Random::new(4);
        let params = AlleyParams {
            min_sq: 30.0,
            grid_chaos: 0.4,
            size_chaos: 0.5,
            shape_factor: 1.0,
            inset: 0.3,
            block_size: 8.0,
            min_front: 5.0,
            greenery: 0.2,
        };
        let piece = rect(40.0, 10.0);
        let plot = church_plot(&piece, &params, &mut rng);
        assert!(area(&plot) < area(&piece));
        assert!(centroid(&plot).x.abs() > 0.0);
    }
}
