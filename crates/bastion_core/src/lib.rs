//! # Bastion Core
//!
//! Domain-free building blocks of the city generator:
//! - A seeded linear-congruential generator with checkpoints
//! - A polygon kernel (bounds, insets, cuts, clipping, smoothing)
//! - A half-edge mesh stored as an index arena
//! - Bounded Voronoi diagrams and A* path search
//!
//! ## Architecture Rules
//!
//! 1. **Explicit randomness** - every stochastic function takes `&mut Random`
//! 2. **Indices, not pointers** - mesh elements are addressed by typed ids
//! 3. **Pure geometry** - polygon functions never mutate their inputs
//!
//! ## Example
//!
//! ```rust,ignore
//! use bastion_core::{Random, voronoi::Voronoi, mesh::Mesh};
//!
//! let mut rng = Random::new(42);
//! let voronoi = Voronoi::build(&sites);
//! let mesh: Mesh<u8> = Mesh::from_indexed(&voronoi.vertices, &cells);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod geom;
pub mod graph;
pub mod mesh;
pub mod random;
pub mod voronoi;

pub use bastion_shared::{Point, Polygon};
pub use error::{CoreError, CoreResult};
pub use graph::{Graph, NodeId};
pub use mesh::{EdgeId, FaceId, Mesh, VertexId};
pub use random::Random;
pub use voronoi::Voronoi;
