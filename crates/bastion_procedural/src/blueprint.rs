//! # Blueprint
//!
//! Everything a caller decides about a city before generation starts:
//! its size, its seed and a handful of structural flags. The rest is up to
//! the generator.
//!
//! With `random` set, the structural flags are not taken from the
//! blueprint but drawn from the generator, with probabilities that grow or
//! shrink with the size of the city.

use bastion_core::Random;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};

/// Smallest city the pipeline can lay out.
pub const MIN_SIZE: usize = 6;

/// Named size ranges, `[min, max)` in patches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePreset {
    /// Any of the presets below.
    Auto,
    /// 6 to 10 patches.
    SmallTown,
    /// 10 to 15 patches.
    LargeTown,
    /// 15 to 24 patches.
    SmallCity,
    /// 24 to 40 patches.
    LargeCity,
    /// 40 to 80 patches.
    Metropolis,
}

impl SizePreset {
    const CONCRETE: [Self; 5] = [
        Self::SmallTown,
        Self::LargeTown,
        Self::SmallCity,
        Self::LargeCity,
        Self::Metropolis,
    ];

    /// Patch count range of a concrete preset.
    #[must_use]
    pub const fn range(self) -> (i32, i32) {
        match self {
            Self::SmallTown => (6, 10),
            Self::LargeTown => (10, 15),
            Self::SmallCity | Self::Auto => (15, 24),
            Self::LargeCity => (24, 40),
            Self::Metropolis => (40, 80),
        }
    }
}

/// City size: an exact patch count or a preset range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CitySize {
    /// Exact number of patches inside the city.
    Patches(usize),
    /// Drawn from a range.
    Preset(SizePreset),
}

impl Default for CitySize {
    fn default() -> Self {
        Self::Preset(SizePreset::Auto)
    }
}

/// What to generate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blueprint {
    /// Number of patches inside the city.
    pub size: CitySize,
    /// Generator seed, `0` for an entropy seed.
    pub seed: u32,
    /// Draw the structural flags instead of using the ones below.
    pub random: bool,
    /// Fortified citadel.
    pub citadel: bool,
    /// Citadel inside the city instead of at its edge.
    pub urban_castle: bool,
    /// Open market square at the center.
    pub plaza: bool,
    /// Cathedral near the center.
    pub temple: bool,
    /// Curtain wall around the city.
    pub walls: bool,
    /// Unplanned suburbs outside the wall.
    pub shanty: bool,
    /// A river through the city.
    pub river: bool,
    /// A shoreline.
    pub coast: bool,
    /// Parks inside the city.
    pub greens: bool,
    /// A gate at every eligible wall vertex.
    pub hub: bool,
    /// Exact gate count, `-1` for a count derived from the size.
    pub gates: i32,
    /// Direction of the sea in half turns, drawn when absent.
    pub coast_dir: Option<f64>,
}

impl Default for Blueprint {
    fn default() -> Self {
        Self {
            size: CitySize::default(),
            seed: 0,
            random: false,
            citadel: true,
            urban_castle: false,
            plaza: true,
            temple: true,
            walls: true,
            shanty: false,
            river: false,
            coast: true,
            greens: false,
            hub: false,
            gates: -1,
            coast_dir: None,
        }
    }
}

impl Blueprint {
    /// Blueprint with default flags.
    #[must_use]
    pub fn new(size: usize, seed: u32) -> Self {
        Self {
            size: CitySize::Patches(size),
            seed,
            ..Self::default()
        }
    }

    /// Blueprint whose structural flags are drawn at generation time.
    #[must_use]
    pub fn random(size: CitySize, seed: u32) -> Self {
        Self {
            size,
            seed,
            random: true,
            ..Self::default()
        }
    }

    /// Rejects blueprints no attempt could satisfy.
    ///
    /// # Errors
    ///
    /// `InvalidBlueprint` for sizes below [`MIN_SIZE`], gate counts below
    /// `-1`, or a non-finite coast direction.
    pub fn validate(&self) -> GenerationResult<()> {
        if let CitySize::Patches(n) = self.size {
            if n < MIN_SIZE {
                return Err(GenerationError::InvalidBlueprint(format!(
                    "size {n} is below the minimum of {MIN_SIZE}"
                )));
            }
        }
        if self.gates < -1 {
            return Err(GenerationError::InvalidBlueprint(format!("gates = {}", self.gates)));
        }
        if self.coast_dir.is_some_and(|d| !d.is_finite()) {
            return Err(GenerationError::InvalidBlueprint("coast_dir is not finite".into()));
        }
        Ok(())
    }

    /// Concrete copy: exact size and final flags.
    ///
    /// Draws from `rng` only for preset sizes and random flags.
    #[must_use]
    pub fn resolve(&self, rng: &mut Random) -> Self {
        let mut bp = self.clone();
        let size = match self.size {
            CitySize::Patches(n) => n,
            CitySize::Preset(preset) => {
                let preset = match preset {
                    SizePreset::Auto => rng.pick(&SizePreset::CONCRETE).copied().unwrap_or(SizePreset::SmallCity),
                    p => p,
                };
                let (min, max) = preset.range();
                rng.int(min, max) as usize
            }
        };
        bp.size = CitySize::Patches(size);

        if self.random {
            let s = size as f64;
            bp.walls = rng.bool((s + 30.0) / 80.0);
            bp.shanty = rng.bool(s / 80.0);
            bp.citadel = rng.bool(0.5 + s / 100.0);
            bp.urban_castle = rng.bool(if bp.walls { s / (s + 30.0) } else { 0.5 });
            bp.plaza = rng.bool(0.9);
            bp.temple = rng.bool(s / 18.0);
            bp.river = rng.bool(2.0 / 3.0);
            bp.coast = rng.bool(0.5);
            bp.random = false;
        }
        bp
    }

    /// Patch count of a resolved blueprint.
    #[must_use]
    pub const fn patches(&self) -> usize {
        match self.size {
            CitySize::Patches(n) => n,
            CitySize::Preset(p) => p.range().0 as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let bp = Blueprint::new(20, 1);
        assert!(bp.citadel && bp.plaza && bp.temple && bp.walls && bp.coast);
        assert!(!bp.river && !bp.shanty && !bp.urban_castle && !bp.greens && !bp.hub);
        assert_eq!(bp.gates, -1);
        assert!(bp.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tiny() {
        assert!(Blueprint::new(3, 1).validate().is_err());
        let mut bp = Blueprint::new(20, 1);
        bp.gates = -4;
        assert!(bp.validate().is_err());
    }

    #[test]
    fn test_preset_resolves_in_range() {
        let mut rng = Random::new(9);
        for _ in 0..50 {
            let bp = Blueprint::random(CitySize::Preset(SizePreset::LargeTown), 9).resolve(&mut rng);
            let n = bp.patches();
            assert!((10..15).contains(&n), "size {n}");
            assert!(!bp.random);
        }
    }

    #[test]
    fn test_explicit_flags_draw_nothing() {
        let mut rng = Random::new(5);
        let before = rng.seed();
        let bp = Blueprint::new(30, 5).resolve(&mut rng);
        assert_eq!(rng.seed(), before);
        assert_eq!(bp, Blueprint::new(30, 5));
    }

    #[test]
    fn test_size_from_toml() {
        #[derive(Deserialize)]
        struct Wrap {
            blueprint: Blueprint,
        }
        let w: Wrap = toml::from_str("[blueprint]\nsize = \"metropolis\"\nriver = true\n").unwrap();
        assert_eq!(w.blueprint.size, CitySize::Preset(SizePreset::Metropolis));
        assert!(w.blueprint.river);
        assert!(w.blueprint.walls);
        let w: Wrap = toml::from_str("[blueprint]\nsize = 40\nseed = 12345\n").unwrap();
        assert_eq!(w.blueprint.size, CitySize::Patches(40));
        assert_eq!(w.blueprint.seed, 12345);
    }
}
