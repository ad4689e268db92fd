use glam::Vec3;
use mechanics_demo::physics::{ContactKind, PhysicsSettings, PunchSettings};
use mechanics_demo::render::MeshId;
use mechanics_demo::scene::description::SceneDescription;
use mechanics_demo::simulation::Simulation;
use mechanics_demo::timestep::DEFAULT_TIMESTEP;

fn arena() -> Simulation {
    Simulation::from_description(
        &SceneDescription::arena(),
        &PhysicsSettings::default(),
        |_| MeshId(0),
    )
    .unwrap()
}

fn ball_position(sim: &Simulation) -> Vec3 {
    let id = sim.scene.find("ball").unwrap();
    sim.scene.get(id).unwrap().current.position
}

// ---------------------------------------------------------------------------
// Falling ball
// ---------------------------------------------------------------------------

#[test]
fn ball_lands_on_the_floor() {
    let mut sim = arena();
    let mut landed_at = None;

    // Uneven frame times; the fixed step keeps the simulation identical.
    let frames = [0.016, 0.007, 0.033, 0.021];
    let mut elapsed = 0.0;
    for dt in frames.iter().cycle().take(600) {
        let report = sim.frame(*dt);
        elapsed += dt;
        if report
            .contacts
            .iter()
            .any(|c| c.kind == ContactKind::BallTouchedFloor)
        {
            landed_at = Some(elapsed);
            break;
        }
    }

    let landed_at = landed_at.expect("ball never touched the floor");
    assert!(landed_at > 2.0 && landed_at < 6.0, "landed after {landed_at}s");
    assert!(ball_position(&sim).y < 0.0);
}

#[test]
fn frame_rate_does_not_change_the_outcome() {
    let mut fast = arena();
    let mut slow = arena();

    // Two seconds as 240 half-step frames or 60 double-step ones.
    let fast_steps: u32 = (0..240)
        .map(|_| fast.frame(DEFAULT_TIMESTEP / 2.0).steps)
        .sum();
    let slow_steps: u32 = (0..60)
        .map(|_| slow.frame(DEFAULT_TIMESTEP * 2.0).steps)
        .sum();

    assert_eq!(fast_steps, 120);
    assert_eq!(slow_steps, 120);
    assert_eq!(
        fast.timestep.accumulator(),
        0.0,
        "half steps should have paired up"
    );
    assert!(ball_position(&fast).abs_diff_eq(ball_position(&slow), 1e-4));
}

// ---------------------------------------------------------------------------
// Punch
// ---------------------------------------------------------------------------

#[test]
fn punch_pushes_the_ball_away() {
    let mut sim = arena();
    sim.frame(DEFAULT_TIMESTEP);

    let ball = ball_position(&sim);
    let origin = ball + Vec3::new(0.0, 0.0, 10.0);
    let hit = sim
        .punch(origin, Vec3::NEG_Z, &PunchSettings::default())
        .expect("punch should reach the ball");
    assert!(hit.fraction > 0.2 && hit.fraction < 0.35);

    sim.frame(DEFAULT_TIMESTEP);
    let id = sim.scene.find("ball").unwrap();
    let body = sim.scene.get(id).unwrap().body.unwrap();
    let velocity = sim.physics.linear_velocity(body).unwrap();
    assert!(velocity.z < -0.05, "velocity after punch: {velocity:?}");
}

#[test]
fn punch_out_of_reach_misses() {
    let mut sim = arena();
    sim.frame(DEFAULT_TIMESTEP);

    let origin = ball_position(&sim) + Vec3::new(0.0, 0.0, 40.0);
    assert!(sim
        .punch(origin, Vec3::NEG_Z, &PunchSettings::default())
        .is_none());
}
