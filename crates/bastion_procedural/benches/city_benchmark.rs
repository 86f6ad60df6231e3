//! Benchmark for whole-city generation.
//!
//! Run with: cargo bench --package bastion_procedural --bench city_benchmark

use bastion_procedural::{Blueprint, City, CityConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_town(c: &mut Criterion) {
    let mut bp = Blueprint::new(15, 42);
    bp.coast = false;
    let config = CityConfig::new(bp);

    c.bench_function("town_15_patches", |b| {
        b.iter(|| black_box(City::generate(&config)));
    });
}

fn benchmark_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("city_sizes");
    group.sample_size(10);

    for size in [20, 40, 80] {
        let mut bp = Blueprint::new(size, 7);
        bp.river = true;
        let config = CityConfig::new(bp);
        group.bench_function(format!("city_{size}_patches"), |b| {
            b.iter(|| black_box(City::generate(&config)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_town, benchmark_sizes);
criterion_main!(benches);
