//! Benchmarks for the mycelia engine
//!
//! Measures the cost of a full cycle at several population sizes, on a
//! mesh that has already grown its hyphal layer.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mycelia_dynamics::{Engine, EngineConfig};

fn grown(nodes: usize) -> Engine {
    let mut engine = Engine::new(EngineConfig::default()).expect("default config is valid");
    for i in 0..nodes {
        engine.join_with_capacity(1 + i % 15);
    }
    for _ in 0..30 {
        engine.run_cycle();
    }
    engine
}

fn bench_run_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_cycle");
    group.sample_size(20);

    for &nodes in &[100usize, 500, 2_000] {
        let mut engine = grown(nodes);
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &nodes, |b, _| {
            b.iter(|| {
                engine.run_cycle();
                black_box(engine.cycle())
            })
        });
    }
    group.finish();
}

fn bench_failure(c: &mut Criterion) {
    let mut group = c.benchmark_group("on_node_failed");

    for &nodes in &[100usize, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &nodes, |b, &n| {
            b.iter_batched(
                || grown(n),
                |mut engine| {
                    let victims: Vec<_> = engine.mesh().live_nodes().into_iter().take(10).collect();
                    for v in victims {
                        black_box(engine.on_node_failed(v));
                    }
                    engine
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_run_cycle, bench_failure);
criterion_main!(benches);
