//! Pipe network benchmarks.
//!
//! Measures the three costs that matter on a world-edit event:
//!
//! - **Join**: extending a long run by one cell (no flood fill).
//! - **Bridge**: merging two long runs with one cell (flood over both runs).
//! - **Cut**: removing the middle of a long run (probe + rebuild of both halves).
//!
//! Run with: `cargo bench --bench network_benchmarks`

use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use pipenet_core::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A straight run of `len` pipes along X at depth `z`, registered in order.
fn build_run(len: i32, z: i32, world: &mut HashSet<GridPos>, net: &mut PipeNetwork) {
    for x in 0..len {
        let pos = GridPos::new(x, 0, z);
        world.insert(pos);
        net.on_pipe_added(&*world, pos).unwrap();
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("join");
    for &len in &[100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let mut world = HashSet::new();
            let mut net = PipeNetwork::new();
            build_run(len, 0, &mut world, &mut net);
            let tip = GridPos::new(len, 0, 0);
            world.insert(tip);
            b.iter(|| {
                black_box(net.on_pipe_added(&world, tip).unwrap());
                net.on_pipe_removed(&world, tip).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_bridge_and_cut(c: &mut Criterion) {
    let mut group = c.benchmark_group("bridge_and_cut");
    for &len in &[100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let mut world = HashSet::new();
            let mut net = PipeNetwork::new();
            build_run(len, 0, &mut world, &mut net);
            build_run(len, 2, &mut world, &mut net);
            let bridge = GridPos::new(len / 2, 0, 1);
            b.iter(|| {
                world.insert(bridge);
                black_box(net.on_pipe_added(&world, bridge).unwrap());
                world.remove(&bridge);
                black_box(net.on_pipe_removed(&world, bridge).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_flood_fill(c: &mut Criterion) {
    let mut rng = Pcg64::seed_from_u64(7);
    let cells: HashSet<GridPos> = (0..20_000)
        .map(|_| {
            GridPos::new(
                rng.gen_range(0..40),
                rng.gen_range(0..8),
                rng.gen_range(0..40),
            )
        })
        .collect();
    let origin = *cells.iter().min().unwrap();

    c.bench_function("flood_fill_random_blob", |b| {
        b.iter(|| black_box(flood_fill_faces(origin, |p| cells.contains(&p)).len()));
    });
}

criterion_group!(benches, bench_join, bench_bridge_and_cut, bench_flood_fill);
criterion_main!(benches);
