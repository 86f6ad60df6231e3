//! # City Constants
//!
//! Dimensions shared by the wall builder, the ward insets and the renderers.
//!
//! **CRITICAL:** Changing any of these changes every generated city.

// =============================================================================
// FORTIFICATIONS
// =============================================================================

/// Thickness of a curtain wall segment.
pub const WALL_THICKNESS: f64 = 1.9;

/// Radius of a regular wall tower.
pub const TOWER_RADIUS: f64 = 1.9;

/// Radius of a large tower (corners of a wall with built segments).
pub const LTOWER_RADIUS: f64 = 2.5;

// =============================================================================
// STREETS
// =============================================================================

/// Width of an alley between blocks, also the minimum lot side.
pub const ALLEY: f64 = 1.2;

/// Half width of a classified road edge.
pub const MAIN_ROAD: f64 = 1.0;

// =============================================================================
// FARMLAND
// =============================================================================

/// Minimum distance between two furrows of a field.
pub const MIN_FURROW: f64 = 1.2;

/// Fields smaller than this are not split further.
pub const MIN_SUBPLOT: f64 = 400.0;
