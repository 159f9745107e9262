//! Benchmarks for the per-frame CPU work: connections, painting and
//! tessellation.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use constellation::{
    connections, paint, tessellate, Bounds, DrawList, NetworkConfig, ParticleField, Theme,
};

fn field(count: usize) -> (ParticleField, NetworkConfig) {
    let config = NetworkConfig {
        particle_count: count,
        ..NetworkConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(7);
    let field = ParticleField::generate(&config, Bounds::new(1280.0, 720.0), &mut rng);
    (field, config)
}

fn bench_connections(c: &mut Criterion) {
    let mut group = c.benchmark_group("connections");

    for count in [35, 60, 150] {
        group.bench_with_input(BenchmarkId::new("particles", count), &count, |b, &count| {
            let (field, config) = field(count);
            b.iter(|| black_box(connections(field.particles(), config.max_connection_distance)))
        });
    }

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");

    for count in [50, 150] {
        group.bench_with_input(BenchmarkId::new("advance_paint", count), &count, |b, &count| {
            let (mut field, config) = field(count);
            let mut list = DrawList::new();
            b.iter(|| {
                field.advance();
                let edges = connections(field.particles(), config.max_connection_distance);
                paint(&mut list, field.particles(), &edges, Theme::Dark, &config);
                black_box(list.len())
            })
        });

        group.bench_with_input(BenchmarkId::new("tessellate", count), &count, |b, &count| {
            let (field, config) = field(count);
            let edges = connections(field.particles(), config.max_connection_distance);
            let mut list = DrawList::new();
            paint(&mut list, field.particles(), &edges, Theme::Light, &config);
            let mut vertices = Vec::new();
            b.iter(|| {
                tessellate(&list, &mut vertices);
                black_box(vertices.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_connections, bench_frame);
criterion_main!(benches);
