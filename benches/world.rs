use std::hint::black_box;

use criterion::*;
use loam::prelude::*;

#[derive(Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy)]
struct Velocity {
    dx: f32,
    dy: f32,
}

const ENTITIES: usize = 10_000;

fn populated_world() -> World {
    let mut world = World::new();
    for i in 0..ENTITIES {
        let e = world.entity();
        world
            .set(e, Position { x: i as f32, y: 0.0 })
            .set(e, Velocity { dx: 0.0, dy: i as f32 });
    }
    world
}

fn spawn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    group.bench_function("spawn_set_10k", |b| {
        b.iter(|| black_box(populated_world()));
    });

    group.finish();
}

fn query_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    group.bench_function("query_10k_cached", |b| {
        let mut world = populated_world();
        world.query::<(Position, Velocity)>();
        b.iter(|| black_box(world.query::<(Position, Velocity)>().len()));
    });

    group.bench_function("query_10k_after_update", |b| {
        let mut world = populated_world();
        let e = world.entity();
        world
            .set(e, Position { x: 0.0, y: 0.0 })
            .set(e, Velocity { dx: 0.0, dy: 0.0 });

        b.iter(|| {
            // an in-place overwrite forces the rebuild path every iteration
            world.get_mut::<Position>(e).unwrap().x += 1.0;
            black_box(world.query::<(Position, Velocity)>().len())
        });
    });

    group.bench_function("query_10k_incremental_append", |b| {
        let mut world = populated_world();
        world.query::<(Position, Velocity)>();

        b.iter(|| {
            let e = world.entity();
            world
                .set(e, Position { x: 1.0, y: 1.0 })
                .set(e, Velocity { dx: 1.0, dy: 1.0 });
            black_box(world.query::<(Position, Velocity)>().len())
        });
    });

    group.finish();
}

criterion_group!(benches, spawn_benchmark, query_benchmark);
criterion_main!(benches);
