//! # Districts
//!
//! Every city patch ends up in exactly one district. Districts are seeded
//! at the places that give a town its structure (the citadel gate, the
//! market, parks, wall gates, bridges, canal banks and the docks) plus a
//! handful of random patches, and then grown patch by patch.
//!
//! ## Growth
//!
//! Growers take turns in a shuffled round robin. A grower may skip its
//! turn (slow growers skip often), otherwise it looks at every unclaimed
//! neighbour of its district and claims one of those that pass a random
//! test weighted by the patch and by the edge between them. Roads slow
//! growth down; walls and canals stop it. A grower that finds nothing
//! drops out. Patches nobody reached become districts of their own.
//!
//! ## Groups
//!
//! Inside a grown district, neighbouring Alleys patches are merged into
//! ward groups. A group whose outline pinches or encloses a hole falls
//! back to a single patch.

use bastion_core::geom::polygon::{center, centroid};
use bastion_core::geom::smooth;
use bastion_core::{EdgeId, FaceId, Point, Polygon, Random, VertexId};
use tracing::{debug, trace};

use crate::city::City;
use crate::group::{fixed_points, WardGroup};
use crate::patch::{EdgeKind, PatchId};
use crate::ward::{Ward, WardKind};

/// Role of a district.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistrictKind {
    /// The market square or the center of town.
    Center,
    /// The citadel.
    Castle,
    /// Waterfront.
    Docks,
    /// Around a bridge.
    Bridge,
    /// Behind a wall gate.
    Gate,
    /// Along a canal.
    Bank,
    /// Parkland.
    Park,
    /// Unwalled outskirts.
    Sprawl,
    /// Anything else inside.
    Regular,
}

impl DistrictKind {
    /// Chance of a grower of this kind to take its turn.
    #[must_use]
    pub const fn growth_rate(self) -> f64 {
        match self {
            Self::Castle | Self::Bridge | Self::Gate => 0.1,
            Self::Bank => 0.5,
            _ => 1.0,
        }
    }
}

/// Shape of the alleys, blocks and lots in a district.
#[derive(Clone, Copy, Debug)]
pub struct AlleyParams {
    /// Typical lot area.
    pub min_sq: f64,
    /// How far alleys deviate from a grid.
    pub grid_chaos: f64,
    /// Spread of block sizes, as an exponent of two.
    pub size_chaos: f64,
    /// Building size relative to the lot.
    pub shape_factor: f64,
    /// Building inset from the lot.
    pub inset: f64,
    /// Block area in lots.
    pub block_size: f64,
    /// Least street frontage of a lot.
    pub min_front: f64,
    /// Share of open ground that gets trees.
    pub greenery: f64,
}

impl AlleyParams {
    /// Draws the parameters of a district of the given kind.
    pub fn random(kind: DistrictKind, rng: &mut Random) -> Self {
        let min_sq = 15.0 + 40.0 * rng.spread4().abs();
        let grid_chaos = 0.2 + rng.avg3() * 0.8;
        let size_chaos = 0.4 + rng.avg3() * 0.6;
        let shape_factor = 0.25 + rng.avg3() * 2.0;
        let inset = 0.6 * (1.0 - rng.spread4().abs());
        let block_size = 4.0 + 10.0 * rng.avg3();
        let exponent = if kind == DistrictKind::Park { 1 } else { 2 };
        let greenery = rng.avg3().powi(exponent);

        let mut params = Self {
            min_sq,
            grid_chaos,
            size_chaos,
            shape_factor,
            inset,
            block_size,
            min_front: min_sq.sqrt(),
            greenery,
        };
        if kind == DistrictKind::Sprawl {
            params.grid_chaos *= 0.5;
            params.block_size *= 2.0;
            params.greenery = (1.0 + params.greenery) / 2.0;
        }
        params
    }
}

/// What a naming layer needs to know about a district.
#[derive(Clone, Debug)]
pub struct DistrictContext {
    /// Role.
    pub kind: DistrictKind,
    /// Number of patches.
    pub faces: usize,
    /// Outline.
    pub border: Polygon,
    /// Direction from the city center to the middle of the outline, in
    /// radians.
    pub bearing: f64,
}

/// A contiguous group of city patches with a common role.
#[derive(Clone, Debug)]
pub struct District {
    /// Role.
    pub kind: DistrictKind,
    /// Member patches in the order they were claimed.
    pub patches: Vec<PatchId>,
    /// Outline, empty if it could not be traced.
    pub border: Vec<EdgeId>,
    /// Alley shape.
    pub params: AlleyParams,
    /// Ward groups of the Alleys patches.
    pub groups: Vec<WardGroup>,
}

impl District {
    fn new(kind: DistrictKind, patches: Vec<PatchId>, rng: &mut Random) -> Self {
        Self {
            kind,
            patches,
            border: Vec::new(),
            params: AlleyParams::random(kind, rng),
            groups: Vec::new(),
        }
    }

    /// Outline as a polygon.
    #[must_use]
    pub fn shape(&self, city: &City) -> Polygon {
        city.mesh.chain_polygon(&self.border)
    }

    /// Summary for naming.
    #[must_use]
    pub fn context(&self, city: &City) -> DistrictContext {
        let border = self.shape(city);
        let middle = if border.is_empty() {
            self.patches
                .first()
                .map_or(Point::ZERO, |&p| centroid(&city.patch(p).shape))
        } else {
            center(&border)
        };
        DistrictContext {
            kind: self.kind,
            faces: self.patches.len(),
            bearing: (middle - city.mesh.point(city.center)).atan2(),
            border,
        }
    }

    /// Builds the blocks of every ward group.
    pub fn create_geometry(&mut self, city: &City) {
        for group in &mut self.groups {
            group.create_geometry(city, &self.params);
        }
        trace!(kind = ?self.kind, groups = self.groups.len(), "district geometry built");
    }

    fn update_border(&mut self, city: &City) {
        self.border = if let [only] = self.patches.as_slice() {
            city.mesh.face_edges(city.patch(*only).face)
        } else {
            city.mesh
                .circumference(None, &city.faces_of(&self.patches))
                .unwrap_or_default()
        };
    }

    /// Splits the Alleys patches into ward groups and smooths the outlines
    /// of the larger ones.
    fn create_groups(&mut self, city: &mut City, rng: &mut Random) {
        let mut pool: Vec<PatchId> = self
            .patches
            .iter()
            .copied()
            .filter(|&p| city.patch(p).has_ward(WardKind::Alleys))
            .collect();
        let mut groups = Vec::new();
        while !pool.is_empty() {
            let picked = pick_faces(city, &mut pool, rng);
            groups.push(WardGroup::new(city, picked, &self.border, self.patches.len()));
        }

        for group in &groups {
            if group.patches.len() < 2 || group.border.is_empty() {
                continue;
            }
            let fixed = fixed_points(city, &group.border);
            let smoothed = smooth(&group.shape(city), &fixed, 2);
            city.move_chain(&group.border, &smoothed);
        }
        self.groups = groups;
    }
}

/// Draws a connected set of patches from `pool`, removing them from it.
fn pick_faces(city: &City, pool: &mut Vec<PatchId>, rng: &mut Random) -> Vec<PatchId> {
    let Some(first) = rng.take(pool) else {
        return Vec::new();
    };
    let mut picked = vec![first];
    loop {
        let n = picked.len() as f64;
        if pool.len() > 1 && rng.float() < (n - 3.0) / n {
            break;
        }
        let mut candidates = Vec::new();
        for &p in &picked {
            for e in city.mesh.face_edges(city.patch(p).face) {
                if city.mesh.data(e).is_some() {
                    continue;
                }
                if let Some(q) = city.twin_patch(e) {
                    if pool.contains(&q) && !picked.contains(&q) {
                        candidates.push(q);
                    }
                }
            }
        }
        let Some(&next) = rng.pick(&candidates) else {
            break;
        };
        pool.retain(|&p| p != next);
        picked.push(next);
    }

    if picked.len() > 1 && has_holes(city, &city.faces_of(&picked)) {
        trace!(patches = picked.len(), "ward group encloses a hole, splitting");
        pool.extend(picked.drain(1..));
    }
    picked
}

/// Whether the outline of `faces` pinches at a vertex or has more than
/// one loop.
fn has_holes(city: &City, faces: &[FaceId]) -> bool {
    let mesh = &city.mesh;
    let mut boundary = Vec::new();
    let mut origins: Vec<VertexId> = Vec::new();
    for &f in faces {
        for e in mesh.face_edges(f) {
            let inside = mesh.twin_face(e).is_some_and(|t| faces.contains(&t));
            if inside {
                continue;
            }
            let v = mesh.origin(e);
            if origins.contains(&v) {
                return true;
            }
            boundary.push(e);
            origins.push(v);
        }
    }
    let Some(&start) = boundary.first() else {
        return false;
    };

    let mut count = 0;
    let mut e = start;
    loop {
        count += 1;
        e = mesh.next(e);
        while !boundary.contains(&e) {
            let Some(t) = mesh.twin(e) else {
                return true;
            };
            e = mesh.next(t);
        }
        if e == start || count > boundary.len() {
            break;
        }
    }
    boundary.len() > count
}

// =============================================================================
// BUILDER
// =============================================================================

/// Where a district starts.
#[derive(Clone, Copy, Debug)]
enum Seed {
    Patch(PatchId, DistrictKind),
    Vertex(VertexId, DistrictKind),
}

impl Seed {
    const fn kind(self) -> DistrictKind {
        match self {
            Self::Patch(_, kind) | Self::Vertex(_, kind) => kind,
        }
    }
}

/// Grows districts over the city patches.
pub struct DistrictBuilder {
    city: Vec<PatchId>,
    unassigned: Vec<PatchId>,
    districts: Vec<District>,
}

impl DistrictBuilder {
    /// Builder over the city patches of `city`.
    #[must_use]
    pub fn new(city: &City) -> Self {
        let patches = city.city_patches();
        Self {
            unassigned: patches.clone(),
            city: patches,
            districts: Vec::new(),
        }
    }

    /// Seeds, grows and orders the districts, then splits them into ward
    /// groups. Every patch gets its district index.
    pub fn build(mut self, city: &mut City, rng: &mut Random) -> Vec<District> {
        for patch in &mut city.patches {
            patch.district = None;
        }
        if self.city.is_empty() {
            return Vec::new();
        }

        let seeds = self.seeds(city, rng);
        for seed in seeds {
            match seed {
                Seed::Patch(p, kind) => {
                    self.from_patch(p, kind, rng);
                }
                Seed::Vertex(v, kind) => {
                    self.from_vertex(city, v, kind, rng);
                }
            }
        }
        self.grow_all(city, rng);

        let mut districts = self.districts;
        for (i, district) in districts.iter().enumerate() {
            for &p in &district.patches {
                city.patch_mut(p).district = Some(i);
            }
        }
        for district in &mut districts {
            district.update_border(city);
            district.create_groups(city, rng);
        }
        // Smoothing moved vertices after the borders were traced; the
        // chains are still valid, only their points changed.
        sort(city, &mut districts);

        for (d, district) in districts.iter().enumerate() {
            for &p in &district.patches {
                city.patch_mut(p).district = Some(d);
            }
            for (g, group) in district.groups.iter().enumerate() {
                for &p in &group.patches {
                    if let Some(Ward::Alleys(alleys)) = city.patch_mut(p).ward.as_mut() {
                        alleys.group = Some((d, g));
                    }
                }
            }
        }
        debug!(districts = districts.len(), "districts grown");
        districts
    }

    /// Default kind of a district started at `p`.
    fn kind_of(city: &City, p: PatchId) -> DistrictKind {
        let patch = city.patch(p);
        if patch.has_ward(WardKind::Castle) {
            DistrictKind::Castle
        } else if patch.has_ward(WardKind::Park) {
            DistrictKind::Park
        } else if patch.landing && patch.has_ward(WardKind::Alleys) {
            DistrictKind::Docks
        } else if city.inner.contains(&p) {
            DistrictKind::Regular
        } else {
            DistrictKind::Sprawl
        }
    }

    /// One seed for each structural feature, then at least one random
    /// fill seed per square root of the city size. Only one docks seed
    /// survives.
    fn seeds(&self, city: &City, rng: &mut Random) -> Vec<Seed> {
        let mut seeds = Vec::new();
        if let Some(&gate) = city.castle_wall().and_then(|w| w.gates.first()) {
            seeds.push(Seed::Vertex(gate, DistrictKind::Castle));
        }
        match city.plaza {
            Some(plaza) => seeds.push(Seed::Patch(plaza, DistrictKind::Center)),
            None => seeds.push(Seed::Vertex(city.center, DistrictKind::Center)),
        }
        for &p in &self.unassigned {
            if city.patch(p).has_ward(WardKind::Park) {
                seeds.push(Seed::Patch(p, DistrictKind::Park));
            }
        }
        if let Some(wall) = city.wall() {
            for &gate in &wall.gates {
                seeds.push(Seed::Vertex(gate, DistrictKind::Gate));
            }
        }
        for canal in &city.canals {
            for &(v, _) in &canal.bridges {
                seeds.push(Seed::Vertex(v, DistrictKind::Bridge));
            }
            let left: Vec<PatchId> = canal.course.iter().filter_map(|&e| city.edge_patch(e)).collect();
            let right: Vec<PatchId> = canal
                .course
                .iter()
                .filter_map(|&e| city.mesh.twin(e).and_then(|t| city.edge_patch(t)))
                .collect();
            for bank in [left, right] {
                let candidates = self.bank_candidates(city, &bank, &seeds);
                if let Some(&p) = rng.pick(&candidates) {
                    seeds.push(Seed::Patch(p, DistrictKind::Bank));
                }
            }
        }
        if let Some(&p) = self
            .unassigned
            .iter()
            .find(|&&p| city.patch(p).landing && city.patch(p).has_ward(WardKind::Alleys))
        {
            seeds.push(Seed::Patch(p, DistrictKind::Docks));
        }

        let fill = ((self.city.len() as f64).sqrt() as usize).max(1);
        for _ in 0..fill {
            let mut open: Vec<PatchId> = self
                .city
                .iter()
                .copied()
                .filter(|&p| !claimed(city, &seeds, p))
                .collect();
            if open.is_empty() {
                open.clone_from(&self.city);
            }
            if let Some(&p) = rng.pick(&open) {
                seeds.push(Seed::Patch(p, Self::kind_of(city, p)));
            }
        }

        let docks: Vec<Seed> = seeds
            .iter()
            .copied()
            .filter(|s| s.kind() == DistrictKind::Docks)
            .collect();
        if docks.len() > 1 {
            seeds.retain(|s| s.kind() != DistrictKind::Docks);
            if let Some(&keep) = rng.pick(&docks) {
                seeds.push(keep);
            }
        }
        seeds
    }

    /// City patches along one side of a canal that no earlier seed will
    /// claim. Falls back to every city patch on that side.
    fn bank_candidates(&self, city: &City, side: &[PatchId], seeds: &[Seed]) -> Vec<PatchId> {
        let mut all: Vec<PatchId> = Vec::new();
        for &p in side {
            if self.unassigned.contains(&p) && !city.patch(p).has_ward(WardKind::Park) && !all.contains(&p) {
                all.push(p);
            }
        }
        let free: Vec<PatchId> = all.iter().copied().filter(|&p| !claimed(city, seeds, p)).collect();
        if free.is_empty() {
            all
        } else {
            free
        }
    }

    fn from_patch(&mut self, p: PatchId, kind: DistrictKind, rng: &mut Random) -> Option<usize> {
        if !self.unassigned.contains(&p) {
            return None;
        }
        self.unassigned.retain(|&q| q != p);
        self.districts.push(District::new(kind, vec![p], rng));
        Some(self.districts.len() - 1)
    }

    /// District of the city patches around `v`. When some of them are
    /// taken only one free patch is used; nothing if all are taken.
    fn from_vertex(&mut self, city: &City, v: VertexId, kind: DistrictKind, rng: &mut Random) -> Option<usize> {
        let around: Vec<PatchId> = city
            .cells_at(v)
            .into_iter()
            .filter(|p| self.city.contains(p))
            .collect();
        let mut free: Vec<PatchId> = around
            .iter()
            .copied()
            .filter(|p| self.unassigned.contains(p))
            .collect();
        if free.is_empty() {
            return None;
        }
        if free.len() < around.len() {
            // The free ones may not touch each other.
            free.truncate(1);
        }
        self.unassigned.retain(|p| !free.contains(p));
        self.districts.push(District::new(kind, free, rng));
        Some(self.districts.len() - 1)
    }

    fn grow_all(&mut self, city: &City, rng: &mut Random) {
        let mut active: Vec<usize> = (0..self.districts.len()).collect();
        while !active.is_empty() {
            let mut order = active.clone();
            rng.shuffle(&mut order);
            for d in order {
                if !self.grow(city, d, rng) {
                    active.retain(|&a| a != d);
                }
                if self.unassigned.is_empty() {
                    return;
                }
            }
        }

        while let Some(&p) = rng.pick(&self.unassigned) {
            let kind = Self::kind_of(city, p);
            let Some(d) = self.from_patch(p, kind, rng) else {
                break;
            };
            while self.grow(city, d, rng) {}
        }
    }

    /// One turn of district `d`; `false` once it can't grow any more.
    fn grow(&mut self, city: &City, d: usize, rng: &mut Random) -> bool {
        let district = &self.districts[d];
        let rate = district.kind.growth_rate();
        if rng.float() < 1.0 - rate {
            return true;
        }

        let mut candidates = Vec::new();
        for &p in &district.patches {
            for e in city.mesh.face_edges(city.patch(p).face) {
                let Some(q) = city.twin_patch(e) else {
                    continue;
                };
                if !self.unassigned.contains(&q) {
                    continue;
                }
                let chance = accepts_patch(city, district.kind, p, q) * accepts_edge(city.mesh.data(e));
                if rng.float() < chance {
                    candidates.push(q);
                }
            }
        }
        let Some(&q) = rng.pick(&candidates) else {
            return false;
        };
        self.unassigned.retain(|&u| u != q);
        self.districts[d].patches.push(q);
        true
    }
}

/// Whether a seed already covers `p`, as its patch or at one of its
/// corners.
fn claimed(city: &City, seeds: &[Seed], p: PatchId) -> bool {
    let corners = city.mesh.face_vertices(city.patch(p).face);
    seeds.iter().any(|s| match *s {
        Seed::Patch(q, _) => q == p,
        Seed::Vertex(v, _) => corners.contains(&v),
    })
}

/// Whether a grower of `kind` standing on `from` may take `to`.
fn accepts_patch(city: &City, kind: DistrictKind, from: PatchId, to: PatchId) -> f64 {
    let (from, to) = (city.patch(from), city.patch(to));
    let ok = match kind {
        DistrictKind::Docks => to.landing && to.has_ward(WardKind::Alleys),
        DistrictKind::Park => to.has_ward(WardKind::Park),
        _ => from.landing == to.landing,
    };
    if ok {
        1.0
    } else {
        0.0
    }
}

/// Weight of growing across an edge.
fn accepts_edge(kind: Option<EdgeKind>) -> f64 {
    match kind {
        Some(EdgeKind::Road) => 0.9,
        Some(EdgeKind::Wall | EdgeKind::Canal) => 0.0,
        _ => 1.0,
    }
}

/// Orders districts outwards: the one holding the first inner patch
/// leads, then each next district is the nearest to the previous one,
/// unless that is farther than the nearest remaining one is from the
/// middle.
fn sort(city: &City, districts: &mut Vec<District>) {
    if districts.len() < 2 {
        return;
    }
    let anchor = city.inner.first().or(city.city_patches().first()).copied();
    let Some(anchor) = anchor else {
        return;
    };
    let middle = centroid(&city.patch(anchor).shape);
    let mark = |d: &District| -> Point {
        let shape = d.shape(city);
        if shape.is_empty() {
            d.patches.first().map_or(middle, |&p| centroid(&city.patch(p).shape))
        } else {
            center(&shape)
        }
    };

    let mut rest: Vec<(District, Point)> = std::mem::take(districts)
        .into_iter()
        .map(|d| {
            let m = mark(&d);
            (d, m)
        })
        .collect();
    rest.sort_by(|a, b| a.1.distance(middle).total_cmp(&b.1.distance(middle)));
    if let Some(i) = rest.iter().position(|(d, _)| d.patches.contains(&anchor)) {
        let lead = rest.remove(i);
        rest.insert(0, lead);
    }

    let mut last = rest.remove(0);
    let mut out = Vec::with_capacity(rest.len() + 1);
    while !rest.is_empty() {
        let mut nearest = 0;
        for (i, (_, m)) in rest.iter().enumerate() {
            if m.distance(last.1) < rest[nearest].1.distance(last.1) {
                nearest = i;
            }
        }
        let pick = if last.1.distance(rest[nearest].1) > middle.distance(rest[0].1) {
            0
        } else {
            nearest
        };
        out.push(std::mem::replace(&mut last, rest.remove(pick)).0);
    }
    out.push(last.0);
    *districts = out;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_rates() {
        assert!((DistrictKind::Gate.growth_rate() - 0.1).abs() < 1e-12);
        assert!((DistrictKind::Bank.growth_rate() - 0.5).abs() < 1e-12);
        assert!((DistrictKind::Regular.growth_rate() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_walls_and_canals_stop_growth() {
        assert_eq!(accepts_edge(Some(EdgeKind::Wall)), 0.0);
        assert_eq!(accepts_edge(Some(EdgeKind::Canal)), 0.0);
        assert!((accepts_edge(Some(EdgeKind::Road)) - 0.9).abs() < 1e-12);
        assert_eq!(accepts_edge(None), 1.0);
    }

    #[test]
    fn test_params_ranges() {
        let mut rng = Random::new(31);
        for _ in 0..100 {
            let p = AlleyParams::random(DistrictKind::Regular, &mut rng);
            assert!((15.0..55.0).contains(&p.min_sq));
            assert!((0.2..1.0).contains(&p.grid_chaos));
            assert!((0.4..1.0).contains(&p.size_chaos));
            assert!((0.0..=0.6).contains(&p.inset));
            assert!((4.0..14.0).contains(&p.block_size));
            assert!((p.min_front * p.min_front - p.min_sq).abs() < 1e-9);
            assert!((0.0..1.0).contains(&p.greenery));
        }
    }

    fn walled_town() -> City {
        let mut bp = crate::Blueprint::new(40, 12345);
        bp.walls = true;
        bp.citadel = true;
        bp.river = false;
        bp.coast = false;
        City::generate(&crate::CityConfig::new(bp)).unwrap()
    }

    #[test]
    fn test_every_structure_gets_a_seed() {
        let city = walled_town();
        let builder = DistrictBuilder::new(&city);
        let seeds = builder.seeds(&city, &mut Random::new(17));
        let count = |kind| seeds.iter().filter(|s| s.kind() == kind).count();

        let gates = city.wall().map_or(0, |w| w.gates.len());
        let castle = usize::from(city.castle_wall().is_some_and(|w| !w.gates.is_empty()));
        let parks = builder
            .city
            .iter()
            .filter(|&&p| city.patch(p).has_ward(WardKind::Park))
            .count();
        let fill = ((builder.city.len() as f64).sqrt() as usize).max(1);
        println!("seeds: {}, gates: {gates}, fill: {fill}", seeds.len());
        assert!(count(DistrictKind::Gate) >= gates);
        assert_eq!(seeds.len(), 1 + castle + parks + gates + fill);
    }

    #[test]
    fn test_every_gate_starts_a_district() {
        let city = walled_town();
        let gates = city.wall().map_or(0, |w| w.gates.len());
        let districts = city
            .districts
            .iter()
            .filter(|d| d.kind == DistrictKind::Gate)
            .count();
        println!("gates: {gates}, gate districts: {districts}");
        assert!(districts > 0);
        assert!(districts <= gates);
    }

    #[test]
    fn test_river_banks_are_seeded() {
        let mut bp = crate::Blueprint::new(80, 7);
        bp.walls = true;
        bp.river = true;
        let city = City::generate(&crate::CityConfig::new(bp)).unwrap();
        let builder = DistrictBuilder::new(&city);
        let seeds = builder.seeds(&city, &mut Random::new(3));
        let banks: Vec<Seed> = seeds
            .iter()
            .copied()
            .filter(|s| s.kind() == DistrictKind::Bank)
            .collect();
        assert!(!banks.is_empty());
        for bank in banks {
            let Seed::Patch(p, _) = bank else {
                panic!("bank seeded at a vertex");
            };
            assert!(city.patch(p).within_city);
        }
    }

    #[test]
    fn test_sprawl_is_looser() {
        let regular = AlleyParams::random(DistrictKind::Regular, &mut Random::new(5));
        let sprawl = AlleyParams::random(DistrictKind::Sprawl, &mut Random::new(5));
        assert!((sprawl.grid_chaos - regular.grid_chaos * 0.5).abs() < 1e-12);
        assert!((sprawl.block_size - regular.block_size * 2.0).abs() < 1e-12);
        assert!(sprawl.greenery >= regular.greenery);
    }
}
