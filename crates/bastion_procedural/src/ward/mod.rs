//! # Wards
//!
//! What a patch is used for. Every patch gets exactly one ward during
//! ward assignment; the ward then decides the geometry built on the patch.
//!
//! | ward | geometry |
//! |------|----------|
//! | [`Alleys`] | none of its own, the ward group of its district builds blocks |
//! | [`Castle`] | citadel wall and a keep |
//! | [`Cathedral`] | one large symmetric building |
//! | [`Farm`] | fields, furrows and an occasional farmhouse |
//! | [`Harbour`] | piers off the landing side |
//! | [`Market`] | open square with a monument |
//! | [`Park`] | rounded green |
//! | `Wilderness`, `Water` | none |
//!
//! Geometry draws from a generator seeded with the patch seed, so wards
//! can be rebuilt in any order with the same result.
//!
//! ## Available area
//!
//! Buildable space is the patch shape moved inwards edge by edge, by how
//! much frontage the edge needs (streets, walls, canals, the coast), with
//! round clearances cut out around towers and canal banks.

mod castle;
mod cathedral;
mod farm;
mod harbour;
mod market;
mod park;

pub use castle::Castle;
pub use cathedral::Cathedral;
pub use farm::Farm;
pub use harbour::Harbour;
pub use market::Market;
pub use park::Park;

use bastion_core::geom::polygon::{regular, translate};
use bastion_core::geom::{inset, subtract_convex};
use bastion_core::{EdgeId, Point, Polygon, Random, VertexId};
use bastion_shared::WALL_THICKNESS;

use crate::city::City;
use crate::forester::Forester;
use crate::patch::{EdgeKind, PatchId};

/// Clearance kept along alleys, canal banks and around towers.
pub(crate) const MARGIN: f64 = 1.2;

/// Corners of the round clearance cut out around a vertex.
const CLEARANCE_CORNERS: usize = 9;

/// Tag of a [`Ward`], for queries that don't need its geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WardKind {
    /// Dense urban blocks.
    Alleys,
    /// Citadel.
    Castle,
    /// Main temple.
    Cathedral,
    /// Fields outside the city.
    Farm,
    /// Piers on the water.
    Harbour,
    /// Market square.
    Market,
    /// Public green.
    Park,
    /// Unused land.
    Wilderness,
    /// Open water.
    Water,
}

/// Ward of a patch with its generated geometry.
#[derive(Clone, Debug)]
pub enum Ward {
    /// Dense urban blocks.
    Alleys(Alleys),
    /// Citadel.
    Castle(Castle),
    /// Main temple.
    Cathedral(Cathedral),
    /// Fields outside the city.
    Farm(Farm),
    /// Piers on the water.
    Harbour(Harbour),
    /// Market square.
    Market(Market),
    /// Public green.
    Park(Park),
    /// Unused land.
    Wilderness,
    /// Open water.
    Water,
}

/// Urban ward; its blocks belong to a ward group.
#[derive(Clone, Debug, Default)]
pub struct Alleys {
    /// District and group index of the ward group holding this patch.
    pub group: Option<(usize, usize)>,
}

impl Ward {
    /// Fresh urban ward.
    #[must_use]
    pub fn alleys() -> Self {
        Self::Alleys(Alleys::default())
    }

    /// Tag of this ward.
    #[must_use]
    pub const fn kind(&self) -> WardKind {
        match self {
            Self::Alleys(_) => WardKind::Alleys,
            Self::Castle(_) => WardKind::Castle,
            Self::Cathedral(_) => WardKind::Cathedral,
            Self::Farm(_) => WardKind::Farm,
            Self::Harbour(_) => WardKind::Harbour,
            Self::Market(_) => WardKind::Market,
            Self::Park(_) => WardKind::Park,
            Self::Wilderness => WardKind::Wilderness,
            Self::Water => WardKind::Water,
        }
    }

    /// Builds the geometry of the ward on patch `id`.
    ///
    /// The ward must not be stored in the patch while this runs.
    pub fn create_geometry(&mut self, city: &City, id: PatchId) {
        let mut rng = Random::new(city.patch(id).seed);
        match self {
            Self::Castle(w) => w.create_geometry(city, id, &mut rng),
            Self::Cathedral(w) => w.create_geometry(city, id, &mut rng),
            Self::Farm(w) => w.create_geometry(city, id, &mut rng),
            Self::Harbour(w) => w.create_geometry(city, id),
            Self::Market(w) => w.create_geometry(city, id, &mut rng),
            Self::Park(w) => w.create_geometry(city, id, &mut rng),
            Self::Alleys(_) | Self::Wilderness | Self::Water => {}
        }
    }

    /// Tree positions on patch `id`.
    #[must_use]
    pub fn spawn_trees(&self, city: &City, id: PatchId) -> Vec<Point> {
        let mut rng = Random::new(city.patch(id).seed).derive(u64::from(id.0));
        let forester = Forester::new(city.seed);
        match self {
            Self::Farm(w) => w.spawn_trees(city, &forester, &mut rng),
            Self::Park(w) => w.spawn_trees(city, id, &forester, &mut rng),
            Self::Alleys(w) => {
                let Some((d, g)) = w.group else {
                    return Vec::new();
                };
                let Some(group) = city.districts.get(d).and_then(|d| d.groups.get(g)) else {
                    return Vec::new();
                };
                // Courtyards are planted once, from the group's core patch.
                if group.core != id {
                    return Vec::new();
                }
                group.spawn_trees(city, &forester, &mut rng)
            }
            _ => Vec::new(),
        }
    }

    /// Space left for building on patch `id`.
    #[must_use]
    pub fn available_area(&self, city: &City, id: PatchId) -> Option<Polygon> {
        let mut rng = Random::new(city.patch(id).seed);
        match self {
            Self::Farm(_) => farm::available(city, id, &mut rng),
            Self::Market(_) => market::available(city, id, &mut rng),
            _ => base_available(city, id, &mut rng),
        }
    }

    /// Fixed name shown for the ward; `None` defers to the district name.
    #[must_use]
    pub const fn label(&self) -> Option<&'static str> {
        match self {
            Self::Castle(_) => Some("Castle"),
            Self::Farm(_) => Some("Farmland"),
            Self::Harbour(_) => Some("Harbour"),
            _ => None,
        }
    }
}

// =============================================================================
// AVAILABLE AREA
// =============================================================================

/// Insets `shape` edge by edge, then cuts a round clearance out of the
/// result at every vertex whose clearance exceeds both adjacent insets.
///
/// `insets[k]` applies to the edge from `shape[k]`, `clear[k]` to
/// `shape[k]` itself.
pub(crate) fn inset_with_clearances(shape: &[Point], insets: &[f64], clear: &[f64], rng: &mut Random) -> Option<Polygon> {
    let mut area = inset(shape, insets)?;
    let n = shape.len();
    for k in 0..n {
        let c = clear.get(k).copied().unwrap_or(0.0);
        let prev = insets[(k + n - 1) % n];
        if c > insets[k] && c > prev {
            let disc = translate(&regular(CLEARANCE_CORNERS, c, rng.float()), shape[k]);
            if let Some(cut) = subtract_convex(&area, &disc) {
                area = cut;
            }
        }
    }
    Some(area)
}

/// Frontage an edge of patch `own` keeps free.
pub(crate) fn edge_inset(city: &City, own: PatchId, e: EdgeId) -> f64 {
    match city.mesh.data(e) {
        None => {
            if city.plaza.is_some() && city.twin_patch(e) == city.plaza {
                1.0
            } else {
                MARGIN / 2.0
            }
        }
        Some(EdgeKind::Coast) => {
            if city.patch(own).landing {
                2.0
            } else {
                MARGIN
            }
        }
        Some(EdgeKind::Road) => 1.0,
        Some(EdgeKind::Wall) => WALL_THICKNESS / 2.0 + MARGIN,
        Some(EdgeKind::Canal) => city.canal_width() / 2.0 + MARGIN,
        Some(EdgeKind::Horizon) => 0.0,
    }
}

/// Round clearance at a vertex: the tower there (plus `tower_margin` when
/// there is one), or the canal bank when a canal passes.
pub(crate) fn vertex_clearance(city: &City, v: VertexId, tower_margin: f64) -> f64 {
    if let Some(bank) = city.canal_clearance(v, MARGIN) {
        return bank;
    }
    let r = city.tower_radius(v);
    if r > 0.0 {
        r + tower_margin
    } else {
        0.0
    }
}

/// Default available area of a patch.
pub(crate) fn base_available(city: &City, id: PatchId, rng: &mut Random) -> Option<Polygon> {
    let face = city.patch(id).face;
    let edges = city.mesh.face_edges(face);
    let shape = city.mesh.chain_polygon(&edges);
    let insets: Vec<f64> = edges.iter().map(|&e| edge_inset(city, id, e)).collect();
    let clear: Vec<f64> = edges
        .iter()
        .map(|&e| vertex_clearance(city, city.mesh.origin(e), 0.0))
        .collect();
    inset_with_clearances(&shape, &insets, &clear, rng)
}
