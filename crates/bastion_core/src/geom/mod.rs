//! # Polygon Kernel
//!
//! Pure functions over ordered point sequences. Closed polygons are stored
//! without repeating the first point; open polylines are plain sequences.
//! Polygons produced by the generator are counter-clockwise (positive area).
//!
//! Nothing in here touches shared state, so every function can be unit
//! tested in isolation and reused by every stage of the pipeline.

pub mod bounds;
pub mod clip;
pub mod cut;
pub mod grid;
pub mod polygon;
pub mod segment;
pub mod smooth;
pub mod triangulate;

/// Distance below which two points are considered the same.
pub const EPSILON: f64 = 1e-9;

pub use bounds::{lir, lira, obb, rect_area};
pub use clip::{intersect_convex, subtract_convex};
pub use cut::{chords, cut, inset, longest_chord, shrink_eq, split_along};
pub use grid::QuadGrid;
pub use polygon::{area, center, centroid, compactness, contains, perimeter};
pub use smooth::{chaikin, smooth, smooth_open};
pub use triangulate::earcut;
