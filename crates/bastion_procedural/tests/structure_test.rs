//! # Structure Tests
//!
//! Invariants of the curtain wall and the river over a handful of seeds.

use bastion_procedural::{Blueprint, City, CityConfig, EdgeKind};

fn walled(seed: u32, coast: bool, river: bool) -> City {
    let mut bp = Blueprint::new(30, seed);
    bp.walls = true;
    bp.citadel = true;
    bp.coast = coast;
    bp.river = river;
    City::generate(&CityConfig::new(bp)).unwrap()
}

/// Test: Gates sit on the ring, never next to each other, and carry no
/// tower.
#[test]
fn test_gates_are_spread_on_the_ring() {
    for seed in 1..6 {
        let city = walled(seed, false, false);
        let wall = city.wall().expect("no wall");
        let ring = wall.vertices(&city);
        let n = ring.len();
        println!("seed {seed}: {} gates on {n} vertices", wall.gates.len());

        let mut at: Vec<usize> = Vec::new();
        for gate in &wall.gates {
            let i = ring.iter().position(|v| v == gate).expect("gate off the ring");
            assert!(!wall.towers.contains(gate), "tower on a gate");
            at.push(i);
        }
        if wall.gates.len() < n {
            for &a in &at {
                for &b in &at {
                    let k = a.abs_diff(b);
                    assert_ne!(k.min(n - k), 1, "adjacent gates on seed {seed}");
                }
            }
        }
    }
}

/// Test: Towers stand only next to built segments, and coastal segments
/// are never built.
#[test]
fn test_towers_follow_built_segments() {
    for seed in 1..6 {
        let city = walled(seed, true, false);
        let wall = city.wall().expect("no wall");
        let ring = wall.vertices(&city);
        let n = ring.len();
        assert_eq!(wall.segments.len(), n);

        for (i, &e) in wall.edges.iter().enumerate() {
            if city.mesh.data(e) == Some(EdgeKind::Coast) {
                assert!(!wall.segments[i], "coastal segment built on seed {seed}");
            }
        }
        for (i, v) in ring.iter().enumerate() {
            let before = wall.segments[(i + n - 1) % n];
            let after = wall.segments[i];
            if wall.towers.contains(v) {
                assert!(before || after, "tower between suppressed segments on seed {seed}");
            }
        }
        let suppressed = wall.segments.iter().filter(|&&s| !s).count();
        println!("seed {seed}: {} towers, {suppressed} suppressed segments", wall.towers.len());
    }
}

/// Test: A river touches the shore only at its mouth and is long enough.
#[test]
fn test_river_course() {
    for (seed, coast) in [(3, true), (5, true), (4, false), (9, false)] {
        let city = walled(seed, coast, true);
        let canal = &city.canals[0];
        let n = canal.course.len();
        println!(
            "seed {seed} coast {coast}: {n} course edges, earth edge {}",
            city.earth_edge.len()
        );

        assert!(n as f64 >= city.earth_edge.len() as f64 / 5.0);
        for &e in &canal.course[1..] {
            assert!(!city.on_shore(city.mesh.origin(e)), "course touches the shore inside");
        }
        if coast {
            let mouth = canal.mouth(&city.mesh).expect("empty course");
            assert!(city.on_shore(mouth), "delta does not start at the shore");
        }
    }
}
