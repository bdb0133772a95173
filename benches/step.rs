//! Step throughput for a filled room at several chunk sizes

use std::hint::black_box;

use atmos_grid::config::AtmosConfig;
use atmos_grid::demo::Room;
use atmos_grid::simulation::{GasMix, Species, ROOM_TEMPERATURE};
use atmos_grid::world::{Atmosphere, Flow};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::IVec2;

const CHUNK_SIZES: &[i32] = &[8, 16, 32];
const ROOM_SIZE: i32 = 64;

/// A sealed room after a few ticks, so most tiles already hold gas
fn warmed_room(chunk_size: i32) -> Atmosphere {
    let mut atmos = Atmosphere::new(AtmosConfig {
        chunk_size,
        ..Default::default()
    })
    .expect("valid config");
    let room = Room::new(IVec2::splat(-ROOM_SIZE / 2), ROOM_SIZE);
    room.build(&mut atmos);
    for tile in room.floor().step_by(7) {
        atmos.add_gas(
            GasMix::pure(Species::Nitrogen, 20_000),
            ROOM_TEMPERATURE,
            tile.x,
            tile.y,
            false,
        );
    }
    for _ in 0..10 {
        atmos.step();
    }
    atmos
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for &chunk_size in CHUNK_SIZES {
        let mut atmos = warmed_room(chunk_size);
        let tiles = atmos.chunk_count() as u64 * (chunk_size as u64).pow(2);
        group.throughput(Throughput::Elements(tiles));
        group.bench_with_input(BenchmarkId::new("room", chunk_size), &chunk_size, |b, _| {
            b.iter(|| black_box(atmos.step()));
        });
    }

    group.finish();
}

fn bench_change_tile(c: &mut Criterion) {
    let mut atmos = warmed_room(16);
    let mut open = false;
    c.bench_function("change_tile_toggle", |b| {
        b.iter(|| {
            open = !open;
            let wall = if open { Flow::empty() } else { Flow::EAST };
            atmos.change_tile(black_box(wall), 3, 3);
        });
    });
}

criterion_group!(benches, bench_step, bench_change_tile);
criterion_main!(benches);
