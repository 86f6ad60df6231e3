//! # Patches
//!
//! One patch per mesh face. A patch caches its polygon, carries the
//! classification flags the pipeline sets on it and, once wards are
//! assigned, the ward that decides what gets built there.

use bastion_core::{FaceId, Mesh, Polygon};

use crate::ward::Ward;

/// Classification of a mesh edge, stored on both of its halves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Outer boundary of the whole mesh.
    Horizon,
    /// Land facing open water.
    Coast,
    /// Street or road.
    Road,
    /// Curtain wall.
    Wall,
    /// River or canal.
    Canal,
}

/// The city mesh: edges carry an optional [`EdgeKind`].
pub type CityMesh = Mesh<EdgeKind>;

/// Patch handle, an index into `City::patches`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PatchId(pub u32);

impl PatchId {
    /// Position in the patch list.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A cell of the city mesh.
#[derive(Clone, Debug)]
pub struct Patch {
    /// Mesh face.
    pub face: FaceId,
    /// Face polygon, refreshed whenever mesh vertices move.
    pub shape: Polygon,
    /// Inside the city, walled or not.
    pub within_city: bool,
    /// Inside the curtain wall.
    pub within_walls: bool,
    /// Sea or lake.
    pub waterbody: bool,
    /// Has a waterfront for boats.
    pub landing: bool,
    /// Seed of this patch's own generator.
    pub seed: u32,
    /// Assigned ward.
    pub ward: Option<Ward>,
    /// District index.
    pub district: Option<usize>,
}

impl Patch {
    /// Fresh unclassified patch.
    #[must_use]
    pub fn new(mesh: &CityMesh, face: FaceId, seed: u32) -> Self {
        Self {
            face,
            shape: mesh.face_polygon(face),
            within_city: false,
            within_walls: false,
            waterbody: false,
            landing: false,
            seed,
            ward: None,
            district: None,
        }
    }

    /// Re-reads the shape from the mesh.
    pub fn refresh(&mut self, mesh: &CityMesh) {
        self.shape = mesh.face_polygon(self.face);
    }

    /// Whether the ward is of the given kind.
    #[must_use]
    pub fn has_ward(&self, kind: crate::ward::WardKind) -> bool {
        self.ward.as_ref().is_some_and(|w| w.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::Point;

    #[test]
    fn test_refresh_follows_mesh() {
        let sq = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let mut mesh = CityMesh::from_polygons(&[sq]).unwrap();
        let face = mesh.faces().next().unwrap();
        let mut patch = Patch::new(&mesh, face, 7);
        let v = mesh.face_vertices(face)[0];
        mesh.set_point(v, Point::new(-1.0, -1.0));
        assert_ne!(patch.shape, mesh.face_polygon(face));
        patch.refresh(&mesh);
        assert_eq!(patch.shape, mesh.face_polygon(face));
        assert!(patch.ward.is_none() && patch.district.is_none());
    }
}
