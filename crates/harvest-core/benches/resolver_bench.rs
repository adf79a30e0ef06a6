use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use harvest_core::{
    CollisionResolver, CollisionShape, MovementState, PlayerInput, Simulation, TuningConfig,
};
use tilegrid::{Layer, TileGrid, TileProperties};

/// 64 x 16 level: solid floor, a rising ramp every eighth column.
fn level() -> TileGrid {
    let (width, height) = (64u32, 16u32);
    let mut tiles = vec![0; (width * height) as usize];
    for x in 0..width {
        tiles[((height - 1) * width + x) as usize] = 1;
        if x % 8 == 4 {
            tiles[((height - 2) * width + x) as usize] = 2;
        }
    }

    let ramp: TileProperties = [("isDiagonal", "true"), ("SlopeLeft", "0"), ("SlopeRight", "64")]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
    TileGrid::new(
        width,
        height,
        64,
        vec![Layer::new("ground", tiles)],
        HashMap::from([(2, ramp)]),
    )
    .unwrap()
}

fn bench_resolve_walk(c: &mut Criterion) {
    let grid = level();
    let tuning = TuningConfig::default();
    let resolver = CollisionResolver::new(&grid, &tuning);
    let shape = CollisionShape::rectangle(Vec2::ZERO, Vec2::new(28.0, 48.0));

    c.bench_function("resolve_walk", |b| {
        let mut movement = MovementState::at(Vec2::new(0.0, 912.0));
        movement.is_on_ground = true;
        b.iter(|| {
            movement.velocity.x = 4.0;
            if movement.position.x > 4000.0 {
                movement.position.x = 0.0;
            }
            black_box(resolver.resolve(&mut movement, &shape, tuning.gravity))
        });
    });
}

fn bench_ground_under(c: &mut Criterion) {
    let grid = level();
    let tuning = TuningConfig::default();
    let resolver = CollisionResolver::new(&grid, &tuning);

    c.bench_function("ground_under", |b| {
        b.iter(|| {
            resolver.ground_under(black_box(Vec2::new(270.0, 900.0)), Vec2::new(28.0, 48.0))
        });
    });
}

fn bench_simulation_step(c: &mut Criterion) {
    let mut sim = Simulation::new(level(), TuningConfig::default(), 7);
    sim.spawn_player_at_tile(1, 14, Vec2::new(28.0, 48.0));
    for x in (3..60).step_by(6) {
        sim.spawn_walker_at_tile(x, 14, Vec2::splat(32.0));
        sim.spawn_flyer_at_tile(x + 2, 6, Vec2::splat(24.0));
    }

    c.bench_function("simulation_step", |b| {
        b.iter(|| black_box(sim.step(&PlayerInput::walk(1.0))))
    });
}

criterion_group!(benches, bench_resolve_walk, bench_ground_under, bench_simulation_step);
criterion_main!(benches);
