//! # Mesh Invariant Tests
//!
//! Builds meshes from spiral Voronoi diagrams the way the city generator
//! does, then edits them and checks the half-edge invariants after every
//! step.

use bastion_core::geom::polygon::{area, regular};
use bastion_core::mesh::{FaceId, Mesh};
use bastion_core::{Point, Random, Voronoi};

fn spiral_mesh(count: usize, seed: u32) -> Mesh<u8> {
    let mut rng = Random::new(seed);
    let a0 = rng.float() * std::f64::consts::TAU;
    let mut sites: Vec<Point> = (0..count)
        .map(|k| Point::polar(10.0 + k as f64 * (2.0 + rng.float()), a0 + 5.0 * (k as f64).sqrt()))
        .collect();
    let max_r = sites.iter().map(|p| p.length()).fold(0.0, f64::max);
    sites.extend(regular(6, max_r * 2.0, 0.0));
    let voronoi = Voronoi::build(&sites);
    let cells: Vec<Vec<usize>> = voronoi
        .cells
        .iter()
        .flatten()
        .filter(|cell| cell.iter().all(|&v| voronoi.vertices[v].length() <= max_r))
        .cloned()
        .collect();
    Mesh::from_indexed(&voronoi.vertices, &cells).unwrap()
}

/// Test: Every half-edge twin is mutual and every face loop closes.
#[test]
fn test_voronoi_mesh_is_valid() {
    for seed in [1, 2, 3, 12345] {
        let mesh = spiral_mesh(120, seed);
        mesh.validate().unwrap();
        println!("seed {seed}: {} faces", mesh.face_count());
        assert!(mesh.face_count() > 40);
        for f in mesh.faces() {
            assert!(area(&mesh.face_polygon(f)) > 0.0, "face {f:?} is not counter-clockwise");
        }
    }
}

/// Test: The horizon is a closed chain of twinless edges.
#[test]
fn test_horizon_is_closed_boundary() {
    let mesh = spiral_mesh(120, 99);
    let faces: Vec<FaceId> = mesh.faces().collect();
    let start = mesh.edge_ids().find(|&e| mesh.twin(e).is_none());
    let horizon = mesh.circumference(start, &faces).unwrap();
    let outline = area(&mesh.chain_polygon(&horizon));
    let total: f64 = faces.iter().map(|&f| area(&mesh.face_polygon(f))).sum();
    println!("horizon {} edges, area {outline:.1} of {total:.1}", horizon.len());

    assert!(horizon.len() >= 6);
    for (i, &e) in horizon.iter().enumerate() {
        assert!(mesh.twin(e).is_none());
        let next = horizon[(i + 1) % horizon.len()];
        assert_eq!(mesh.dest(e), mesh.origin(next));
    }
    assert!(outline > 0.0 && outline <= total * (1.0 + 1e-9));
}

/// Test: Collapsing short interior edges keeps the mesh valid.
#[test]
fn test_collapse_short_edges() {
    let mut mesh = spiral_mesh(160, 5);
    let mut collapsed = 0;
    let edges: Vec<_> = mesh.edge_ids().collect();
    for e in edges {
        if !mesh.edge_ids().any(|x| x == e) {
            continue;
        }
        let (a, b) = mesh.segment(e);
        if a.distance(b) < 4.0 && mesh.collapse_edge(e).is_some() {
            collapsed += 1;
            mesh.validate().unwrap();
        }
    }
    println!("collapsed {collapsed} edges");
    for f in mesh.faces() {
        assert!(mesh.face_edges(f).len() >= 3);
    }
}

/// Test: Splitting faces across the mesh keeps the mesh valid.
#[test]
fn test_split_faces_across_mesh() {
    let mut mesh = spiral_mesh(60, 8);
    let before = mesh.face_count();
    let faces: Vec<FaceId> = mesh.faces().collect();
    let mut split = 0;
    for f in faces {
        let verts = mesh.face_vertices(f);
        if verts.len() >= 4 {
            mesh.split_face(f, verts[0], verts[2]).unwrap();
            split += 1;
        }
    }
    mesh.validate().unwrap();
    assert_eq!(mesh.face_count(), before + split);
}
