//! # Bastion Procedural
//!
//! Deterministic generation of walled medieval towns.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: the same blueprint always yields the same city
//! 2. **Staged**: patches, walls, streets, canals, wards and geometry are
//!    built in a fixed order over one shared mesh
//! 3. **Retryable**: a structurally impossible layout throws the attempt
//!    away instead of patching it up
//!
//! ## Core Components
//!
//! - `Blueprint`: size, seed and structural flags
//! - `City`: the mesh, its patches and the pipeline that fills them
//! - `CurtainWall`: walls, gates and towers
//! - `Canal`: a river through town
//! - `District`: grown groups of patches with shared alley parameters
//! - `Ward`: what a patch is used for
//! - `WardGroup` / `Block`: alleys, lots and buildings
//!
//! ## Example
//!
//! ```rust,ignore
//! use bastion_procedural::{Blueprint, City, CityConfig};
//!
//! let config = CityConfig::new(Blueprint::new(40, 12345));
//! let city = City::generate(&config)?;
//! let (blocks, lots, buildings) = city.counts();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bisector;
pub mod block;
pub mod blueprint;
pub mod building;
pub mod canal;
pub mod city;
pub mod config;
pub mod district;
pub mod error;
pub mod forester;
pub mod group;
pub mod noise;
pub mod patch;
pub mod topology;
pub mod wall;
pub mod ward;

pub use block::Block;
pub use blueprint::{Blueprint, CitySize, SizePreset, MIN_SIZE};
pub use canal::Canal;
pub use city::City;
pub use config::{CityConfig, GenerationConfig, DEFAULT_MAX_ATTEMPTS};
pub use district::{AlleyParams, District, DistrictContext, DistrictKind};
pub use error::{GenerationError, GenerationResult};
pub use group::WardGroup;
pub use patch::{CityMesh, EdgeKind, Patch, PatchId};
pub use wall::CurtainWall;
pub use ward::{Ward, WardKind};
