//! # Bastion
//!
//! Procedural walled cities from a seed and a handful of flags.
//!
//! This crate is the front door: it re-exports the pipeline and adds the
//! pieces the command line needs (size parsing, summaries).
//!
//! ## Example
//!
//! ```rust,ignore
//! use bastion::{Blueprint, City, CityConfig};
//!
//! let city = City::generate(&CityConfig::new(Blueprint::new(24, 7)))?;
//! println!("{}", bastion::summary(&city));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

use std::fmt::Write;

pub use bastion_core as kernel;
pub use bastion_procedural as procedural;

pub use bastion_procedural::{
    Blueprint, City, CityConfig, CitySize, District, DistrictKind, GenerationConfig, GenerationError,
    GenerationResult, SizePreset, Ward, WardKind,
};

/// Parses a size argument: a patch count or a preset name.
///
/// # Errors
///
/// A message naming the accepted values.
pub fn parse_size(text: &str) -> Result<CitySize, String> {
    if let Ok(n) = text.parse::<usize>() {
        return Ok(CitySize::Patches(n));
    }
    let preset = match text.to_ascii_lowercase().replace('-', "_").as_str() {
        "auto" => SizePreset::Auto,
        "small_town" => SizePreset::SmallTown,
        "large_town" => SizePreset::LargeTown,
        "small_city" => SizePreset::SmallCity,
        "large_city" => SizePreset::LargeCity,
        "metropolis" => SizePreset::Metropolis,
        _ => {
            return Err(format!(
                "`{text}` is neither a patch count nor one of auto, small_town, large_town, small_city, large_city, metropolis"
            ))
        }
    };
    Ok(CitySize::Preset(preset))
}

/// Multi-line description of a generated city.
#[must_use]
pub fn summary(city: &City) -> String {
    let bp = &city.blueprint;
    let (blocks, lots, buildings) = city.counts();
    let (lo, hi) = city.bounds();
    let mut out = String::new();

    let _ = writeln!(out, "seed {} ({} attempt(s)), {} patches", city.seed, city.attempts, bp.patches());
    let _ = writeln!(
        out,
        "flags: walls={} citadel={} plaza={} temple={} river={} coast={} shanty={}",
        bp.walls, bp.citadel, bp.plaza, bp.temple, bp.river, bp.coast, bp.shanty
    );
    let _ = writeln!(out, "extent: {:.1} x {:.1}", hi.x - lo.x, hi.y - lo.y);
    if let Some(wall) = city.wall() {
        let _ = writeln!(out, "wall: {} gates, {} towers", wall.gates.len(), wall.towers.len());
    }
    for canal in &city.canals {
        let _ = writeln!(
            out,
            "canal: {} edges, width {:.1}, {} bridges",
            canal.course.len(),
            canal.width,
            canal.bridges.len()
        );
    }
    let _ = writeln!(out, "districts: {}", city.districts.len());
    for district in &city.districts {
        let ctx = district.context(city);
        let _ = writeln!(
            out,
            "  {:?}: {} patches, bearing {:.0} deg",
            ctx.kind,
            ctx.faces,
            ctx.bearing.to_degrees()
        );
    }
    let _ = writeln!(out, "blocks: {blocks}, lots: {lots}, buildings: {buildings}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("40"), Ok(CitySize::Patches(40)));
        assert_eq!(parse_size("auto"), Ok(CitySize::Preset(SizePreset::Auto)));
        assert_eq!(parse_size("Small-Town"), Ok(CitySize::Preset(SizePreset::SmallTown)));
        assert!(parse_size("huge").is_err());
    }

    #[test]
    fn test_summary_mentions_districts() {
        let mut bp = Blueprint::new(12, 5);
        bp.coast = false;
        let city = City::generate(&CityConfig::new(bp)).unwrap();
        let text = summary(&city);
        println!("{text}");
        assert!(text.contains("districts:"));
        assert!(text.contains("seed"));
    }
}
