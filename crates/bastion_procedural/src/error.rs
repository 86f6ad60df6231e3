//! # Generation Errors
//!
//! Two families of failure come out of the pipeline:
//!
//! - **Structural**: the random layout of this attempt cannot host the
//!   requested city (no horizon, no gate vertex, no canal course...). The
//!   orchestrator throws the attempt away and starts over.
//! - **Everything else**: invalid input or a misuse of the mesh. Retrying
//!   would only repeat it, so it surfaces immediately.

use bastion_core::CoreError;
use thiserror::Error;

/// Errors raised while generating a city.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The outer boundary of the mesh is too short to be a landmass.
    #[error("horizon has only {0} edges")]
    NoHorizon(usize),

    /// The largest water body does not reach the horizon.
    #[error("water body is enclosed by land")]
    WaterOffHorizon,

    /// A coast was requested but no water meets the land.
    #[error("no water along the land")]
    NoWater,

    /// Fewer patches survived the Voronoi bounds than the city needs.
    #[error("only {0} patches survived")]
    TooFewPatches(usize),

    /// No wall vertex is eligible for a gate.
    #[error("no valid vertices for gates on a wall of {patches} patches")]
    NoGateVertices {
        /// Patches enclosed by the wall.
        patches: usize,
    },

    /// Gates were requested but none could be placed.
    #[error("no gates placed")]
    NoGates,

    /// The citadel stopped getting rounder before it was round enough.
    #[error("citadel compactness stalled at {0:.3}")]
    BadCitadel(f64),

    /// Every river candidate was rejected.
    #[error("unable to build a canal")]
    NoCanalCourse,

    /// Mesh operation failure.
    #[error("mesh: {0}")]
    Mesh(#[from] CoreError),

    /// The blueprint cannot describe a city.
    #[error("invalid blueprint: {0}")]
    InvalidBlueprint(String),

    /// A config file could not be read or parsed.
    #[error("config: {0}")]
    Config(String),

    /// Every attempt failed.
    #[error("gave up after {attempts} attempts, last error: {last}")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// Error of the final attempt.
        last: Box<GenerationError>,
    },
}

impl GenerationError {
    /// Whether a fresh attempt may succeed where this one failed.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        match self {
            Self::NoHorizon(_)
            | Self::WaterOffHorizon
            | Self::NoWater
            | Self::TooFewPatches(_)
            | Self::NoGateVertices { .. }
            | Self::NoGates
            | Self::BadCitadel(_)
            | Self::NoCanalCourse => true,
            Self::Mesh(e) => matches!(e, CoreError::NoBoundary { .. } | CoreError::Degenerate(_)),
            Self::InvalidBlueprint(_) | Self::Config(_) | Self::RetriesExhausted { .. } => false,
        }
    }
}

/// Result type for generation.
pub type GenerationResult<T> = Result<T, GenerationError>;
