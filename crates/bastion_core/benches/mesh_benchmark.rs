//! Benchmark for Voronoi construction and mesh queries.
//!
//! TARGET: a metropolis-sized diagram (640 sites) in well under 10 ms
//!
//! Run with: cargo bench --package bastion_core --bench mesh_benchmark

use bastion_core::geom::polygon::regular;
use bastion_core::mesh::{FaceId, Mesh};
use bastion_core::{Point, Random, Voronoi};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn spiral(count: usize, seed: u32) -> Vec<Point> {
    let mut rng = Random::new(seed);
    let a0 = rng.float() * std::f64::consts::TAU;
    let mut sites: Vec<Point> = (0..count)
        .map(|k| {
            let r = 10.0 + k as f64 * (2.0 + rng.float());
            Point::polar(r, a0 + 5.0 * (k as f64).sqrt())
        })
        .collect();
    let frame = sites.iter().map(|p| p.length()).fold(0.0, f64::max) * 2.0;
    sites.extend(regular(6, frame, 0.0));
    sites
}

fn mesh_of(voronoi: &Voronoi) -> Mesh<u8> {
    let cells: Vec<Vec<usize>> = voronoi.cells.iter().flatten().cloned().collect();
    Mesh::from_indexed(&voronoi.vertices, &cells).unwrap()
}

fn benchmark_voronoi(c: &mut Criterion) {
    let mut group = c.benchmark_group("voronoi");
    for count in [80_usize, 320, 640] {
        let sites = spiral(count, 42);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("{count}_sites"), |b| {
            b.iter(|| black_box(Voronoi::build(black_box(&sites))));
        });
    }
    group.finish();
}

fn benchmark_circumference(c: &mut Criterion) {
    let voronoi = Voronoi::build(&spiral(320, 7));
    let mesh = mesh_of(&voronoi);
    let faces: Vec<FaceId> = mesh.faces().collect();

    c.bench_function("circumference_all_faces", |b| {
        b.iter(|| black_box(mesh.circumference(None, black_box(&faces))));
    });
    c.bench_function("split_half_faces", |b| {
        let half: Vec<FaceId> = faces.iter().copied().step_by(2).collect();
        b.iter(|| black_box(mesh.split(black_box(&half))));
    });
}

criterion_group!(benches, benchmark_voronoi, benchmark_circumference);
criterion_main!(benches);
