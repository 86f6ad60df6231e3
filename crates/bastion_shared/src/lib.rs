//! # Bastion Shared
//!
//! Common types used by every stage of the city generator.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on another workspace crate. Geometry,
//! meshes and the pipeline build on top of it, not the other way around.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{ALLEY, LTOWER_RADIUS, MAIN_ROAD, TOWER_RADIUS, WALL_THICKNESS};
pub use math::{Point, Polygon};
