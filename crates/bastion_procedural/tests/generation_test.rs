//! # Generation Tests
//!
//! Whole-pipeline properties that hold for any blueprint: reproducibility,
//! district completeness and mesh consistency.

use bastion_procedural::{Blueprint, City, CityConfig, GenerationError, WardKind};

fn small(seed: u32) -> CityConfig {
    let mut bp = Blueprint::new(15, seed);
    bp.coast = false;
    CityConfig::new(bp)
}

/// Test: Two runs of the same blueprint build the same city.
#[test]
fn test_same_seed_same_city() {
    let a = City::generate(&small(42)).unwrap();
    let b = City::generate(&small(42)).unwrap();

    assert_eq!(a.attempts, b.attempts);
    assert_eq!(a.patches.len(), b.patches.len());
    for (pa, pb) in a.patches.iter().zip(&b.patches) {
        assert_eq!(pa.shape, pb.shape);
        assert_eq!(pa.within_city, pb.within_city);
        assert_eq!(pa.district, pb.district);
    }
    assert_eq!(a.gates, b.gates);
    assert_eq!(a.districts.len(), b.districts.len());
    for (da, db) in a.districts.iter().zip(&b.districts) {
        assert_eq!(da.kind, db.kind);
        assert_eq!(da.patches, db.patches);
    }
    assert_eq!(a.counts(), b.counts());
    println!("districts: {}, counts: {:?}", a.districts.len(), a.counts());
}

/// Test: Different seeds give different layouts.
#[test]
fn test_different_seeds_differ() {
    let a = City::generate(&small(1)).unwrap();
    let b = City::generate(&small(2)).unwrap();
    let shapes_a: Vec<_> = a.patches.iter().map(|p| p.shape.clone()).collect();
    let shapes_b: Vec<_> = b.patches.iter().map(|p| p.shape.clone()).collect();
    assert_ne!(shapes_a, shapes_b);
}

/// Test: Every city patch is in exactly one district, and the back
/// references agree.
#[test]
fn test_districts_cover_the_city() {
    for seed in [3, 17, 256] {
        let city = City::generate(&small(seed)).unwrap();
        for id in city.patch_ids() {
            let patch = city.patch(id);
            let holders: Vec<usize> = city
                .districts
                .iter()
                .enumerate()
                .filter(|(_, d)| d.patches.contains(&id))
                .map(|(i, _)| i)
                .collect();
            if patch.within_city {
                assert_eq!(holders.len(), 1, "seed {seed}: patch {} in {:?}", id.0, holders);
                assert_eq!(patch.district, Some(holders[0]));
            } else {
                assert!(holders.is_empty());
                assert_eq!(patch.district, None);
            }
        }
        println!("seed {seed}: {} districts", city.districts.len());
    }
}

/// Test: The mesh survives every edit of the pipeline.
#[test]
fn test_mesh_stays_consistent() {
    let city = City::generate(&small(99)).unwrap();
    city.mesh.validate().unwrap();
    for patch in &city.patches {
        assert_eq!(patch.shape, city.mesh.face_polygon(patch.face));
    }
}

/// Test: Every patch ends up with a ward and Alleys patches point at their
/// ward group.
#[test]
fn test_every_patch_has_a_ward() {
    let city = City::generate(&small(7)).unwrap();
    for id in city.patch_ids() {
        let patch = city.patch(id);
        assert!(patch.ward.is_some(), "patch {} has no ward", id.0);
        if let Some(bastion_procedural::Ward::Alleys(alleys)) = &patch.ward {
            let (d, g) = alleys.group.expect("alleys without a group");
            assert!(city.districts[d].groups[g].patches.contains(&id));
        }
    }
    assert!(!city.patches_with(WardKind::Alleys).is_empty());
}

/// Test: Buildings are produced.
#[test]
fn test_city_has_buildings() {
    let city = City::generate(&small(11)).unwrap();
    let (blocks, lots, buildings) = city.counts();
    println!("blocks: {blocks}, lots: {lots}, buildings: {buildings}");
    assert!(blocks > 0);
    assert!(lots > 0);
    assert_eq!(lots, buildings);
}

/// Test: A blueprint below the minimum size fails at once.
#[test]
fn test_invalid_blueprint_is_not_retried() {
    let config = CityConfig::new(Blueprint::new(3, 1));
    match City::generate(&config) {
        Err(e @ GenerationError::InvalidBlueprint(_)) => assert!(!e.is_structural()),
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("a 3-patch city was generated"),
    }
}
