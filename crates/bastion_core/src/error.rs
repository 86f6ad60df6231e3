//! # Core Errors

use thiserror::Error;

/// Errors raised by the mesh and geometry primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A face set has no boundary edge to start a circumference walk from.
    #[error("no boundary edge in a set of {faces} faces")]
    NoBoundary {
        /// Number of faces in the set.
        faces: usize,
    },

    /// Two consecutive vertices of a chain are not joined by an edge.
    #[error("vertices {0} and {1} are not adjacent")]
    NotAdjacent(u32, u32),

    /// Both vertices of a face split must lie on the face.
    #[error("vertex {vertex} is not on face {face}")]
    VertexNotOnFace {
        /// Offending vertex.
        vertex: u32,
        /// Face being split.
        face: u32,
    },

    /// Input polygons could not form a mesh.
    #[error("degenerate mesh input: {0}")]
    Degenerate(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
