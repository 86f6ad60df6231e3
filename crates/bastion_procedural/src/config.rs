//! # Generation Config
//!
//! TOML layout:
//!
//! ```toml
//! [blueprint]
//! size = 40          # or "auto", "small_town", ... "metropolis"
//! seed = 12345
//! walls = true
//! river = false
//!
//! [generation]
//! max_attempts = 50
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::blueprint::Blueprint;
use crate::error::{GenerationError, GenerationResult};

/// Attempts made before giving up on a blueprint.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Retry policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Attempts made before [`GenerationError::RetriesExhausted`].
    pub max_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Blueprint plus retry policy, as read from a config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// What to generate.
    pub blueprint: Blueprint,
    /// How hard to try.
    pub generation: GenerationConfig,
}

impl CityConfig {
    /// Config around a blueprint with the default retry policy.
    #[must_use]
    pub fn new(blueprint: Blueprint) -> Self {
        Self {
            blueprint,
            generation: GenerationConfig::default(),
        }
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// `Config` on malformed TOML or unknown value types.
    pub fn from_toml_str(text: &str) -> GenerationResult<Self> {
        toml::from_str(text).map_err(|e| GenerationError::Config(e.to_string()))
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// `Config` when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> GenerationResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GenerationError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    ///
    /// `Config` if the blueprint holds a value TOML cannot express.
    pub fn to_toml_string(&self) -> GenerationResult<String> {
        toml::to_string(self).map_err(|e| GenerationError::Config(e.to_string()))
    }
}
