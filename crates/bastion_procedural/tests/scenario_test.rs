//! # Scenario Tests
//!
//! Fixed blueprints with the features they must show.

use bastion_procedural::{Blueprint, City, CityConfig, District, DistrictKind, EdgeKind, WardKind};

fn lots_in(district: &District) -> usize {
    district
        .groups
        .iter()
        .flat_map(|g| &g.blocks)
        .map(|b| b.lots.len())
        .sum()
}

/// Test: A walled inland town with a citadel and a market.
#[test]
fn test_walled_town_with_citadel() {
    let mut bp = Blueprint::new(40, 12345);
    bp.walls = true;
    bp.river = false;
    bp.citadel = true;
    bp.plaza = true;
    bp.coast = false;
    let city = City::generate(&CityConfig::new(bp)).unwrap();

    let wall = city.wall().expect("walled town without a wall");
    println!("gates: {}, towers: {}", wall.gates.len(), wall.towers.len());
    assert!(wall.gates.len() >= 2);
    let ring = wall.edges.len();
    for i in 0..ring {
        let next = wall.edges[(i + 1) % ring];
        assert_eq!(city.mesh.dest(wall.edges[i]), city.mesh.origin(next), "wall ring is open");
    }

    let castles: Vec<_> = city
        .districts
        .iter()
        .filter(|d| d.kind == DistrictKind::Castle)
        .collect();
    assert_eq!(castles.len(), 1);
    let citadel = city.citadel.expect("no citadel");
    assert!(castles[0].patches.contains(&citadel));

    let castle_gates = &city.castle_wall().expect("citadel without a wall").gates;
    assert!(!castle_gates.is_empty());
    let at_gate = castle_gates
        .iter()
        .any(|&g| city.cells_at(g).iter().any(|p| castles[0].patches.contains(p)));
    assert!(at_gate, "citadel district does not touch its gate");

    let (_, lots, _) = city.counts();
    println!("lots: {lots}");
    for district in &city.districts {
        let water = district.patches.iter().any(|&p| city.patch(p).waterbody);
        if district.kind == DistrictKind::Park || water || district.groups.is_empty() {
            continue;
        }
        println!("{:?}: {} patches, {} lots", district.kind, district.patches.len(), lots_in(district));
        assert!(lots_in(district) > 0, "{:?} district without lots", district.kind);
    }
}

/// Test: A small coastal village without walls, castle or river.
#[test]
fn test_coastal_village() {
    let mut bp = Blueprint::new(15, 1);
    bp.walls = false;
    bp.river = false;
    bp.citadel = false;
    bp.plaza = false;
    bp.temple = false;
    bp.shanty = false;
    bp.greens = false;
    bp.coast = true;
    let city = City::generate(&CityConfig::new(bp)).unwrap();

    println!("shore edges: {}, entrances: {}", city.shore.len(), city.gates.len());
    assert!(city.wall_gates().is_empty());
    assert!(city.canals.is_empty());
    assert!(!city.shore.is_empty());
    for &e in &city.shore {
        assert_eq!(city.mesh.data(e), Some(EdgeKind::Coast));
    }
    assert!(city.patches.iter().any(|p| p.waterbody));
}

/// Test: A large walled city on a river.
#[test]
fn test_river_city() {
    let mut bp = Blueprint::new(80, 7);
    bp.walls = true;
    bp.river = true;
    let city = City::generate(&CityConfig::new(bp)).unwrap();

    assert_eq!(city.canals.len(), 1);
    let canal = &city.canals[0];
    println!(
        "course: {} edges, width: {:.2}, bridges: {}, water gates: {}",
        canal.course.len(),
        canal.width,
        canal.bridges.len(),
        canal.gates.len()
    );
    assert!(!canal.course.is_empty());
    assert!(canal.width > 0.0);
    for &e in &canal.course {
        assert_eq!(city.mesh.data(e), Some(EdgeKind::Canal));
    }
    let wall_vertices = city.wall().map(|w| w.vertices(&city)).unwrap_or_default();
    for gate in &canal.gates {
        assert!(wall_vertices.contains(gate));
    }
    let kinds: Vec<DistrictKind> = city.districts.iter().map(|d| d.kind).collect();
    println!("district kinds: {kinds:?}");
    assert!(kinds.contains(&DistrictKind::Bank));
}

/// Test: An open village has no real wall but still has entrances.
#[test]
fn test_open_village() {
    let mut bp = Blueprint::new(12, 3);
    bp.walls = false;
    bp.citadel = false;
    bp.coast = false;
    let city = City::generate(&CityConfig::new(bp)).unwrap();

    assert!(city.wall().is_none());
    assert!(city.wall_gates().is_empty());
    assert!(city.castle_wall().is_none());
    assert!(city.border.as_ref().is_some_and(|b| !b.real));
    assert!(!city.gates.is_empty());
    assert!(city.districts.iter().all(|d| d.kind != DistrictKind::Castle));
    assert!(!city.arteries.is_empty());
    assert!(city.patches_with(WardKind::Castle).is_empty());
}
