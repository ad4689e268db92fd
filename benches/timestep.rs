use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mechanics_demo::physics::PhysicsSettings;
use mechanics_demo::render::MeshId;
use mechanics_demo::scene::description::SceneDescription;
use mechanics_demo::simulation::Simulation;
use mechanics_demo::timestep::{FixedTimestep, DEFAULT_TIMESTEP};

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

fn bench_advance_empty(c: &mut Criterion) {
    c.bench_function("advance_60hz_frame_no_op_step", |b| {
        let mut timestep = FixedTimestep::default();
        b.iter(|| timestep.advance(black_box(0.016), |ts| {
            black_box(ts);
        }));
    });
}

fn bench_advance_stall(c: &mut Criterion) {
    c.bench_function("advance_quarter_second_stall", |b| {
        let mut timestep = FixedTimestep::default();
        b.iter(|| timestep.advance(black_box(0.25), |ts| {
            black_box(ts);
        }));
    });
}

// ---------------------------------------------------------------------------
// Arena simulation
// ---------------------------------------------------------------------------

fn arena() -> Simulation {
    Simulation::from_description(
        &SceneDescription::arena(),
        &PhysicsSettings::default(),
        |_| MeshId(0),
    )
    .unwrap()
}

fn bench_arena_frame(c: &mut Criterion) {
    c.bench_function("arena_frame_one_step", |b| {
        let mut sim = arena();
        b.iter(|| black_box(sim.frame(DEFAULT_TIMESTEP)));
    });
}

fn bench_arena_draw_items(c: &mut Criterion) {
    c.bench_function("arena_draw_items", |b| {
        let mut sim = arena();
        sim.frame(DEFAULT_TIMESTEP * 1.5);
        b.iter(|| black_box(sim.draw_items()));
    });
}

fn bench_arena_build(c: &mut Criterion) {
    let description = SceneDescription::arena();
    let settings = PhysicsSettings::default();
    c.bench_function("arena_build", |b| {
        b.iter(|| {
            Simulation::from_description(black_box(&description), &settings, |_| MeshId(0))
                .unwrap()
        });
    });
}

criterion_group!(accumulator, bench_advance_empty, bench_advance_stall);
criterion_group!(
    simulation,
    bench_arena_frame,
    bench_arena_draw_items,
    bench_arena_build
);
criterion_main!(accumulator, simulation);
