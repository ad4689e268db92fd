use std::path::PathBuf;

use glam::Vec3;
use mechanics_demo::physics::PhysicsSettings;
use mechanics_demo::render::MeshId;
use mechanics_demo::scene::description::SceneDescription;
use mechanics_demo::scene::SceneError;
use mechanics_demo::simulation::Simulation;

/// Scratch directory removed when the test ends, pass or fail.
struct TempDir(PathBuf);

impl TempDir {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("mechanics_scene_file_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn join(&self, file: &str) -> PathBuf {
        self.0.join(file)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn build(description: &SceneDescription) -> Simulation {
    Simulation::from_description(description, &PhysicsSettings::default(), |_| MeshId(0)).unwrap()
}

fn position(sim: &Simulation, name: &str) -> Vec3 {
    let id = sim.scene.find(name).unwrap();
    sim.scene.get(id).unwrap().current.position
}

#[test]
fn saved_scene_simulates_like_the_original() {
    let dir = TempDir::new("replay");
    let path = dir.join("arena.ron");
    SceneDescription::arena().save(&path).unwrap();

    let mut original = build(&SceneDescription::arena());
    let mut reloaded = build(&SceneDescription::load(&path).unwrap());
    for _ in 0..90 {
        original.frame(1.0 / 60.0);
        reloaded.frame(1.0 / 60.0);
    }
    assert_eq!(position(&original, "ball"), position(&reloaded, "ball"));
}

#[test]
fn edited_scene_keeps_the_edit() {
    let dir = TempDir::new("edit");
    let path = dir.join("moved_ball.ron");

    let mut description = SceneDescription::arena();
    let ball = description
        .entities
        .iter_mut()
        .find(|e| e.name == "ball")
        .unwrap();
    ball.position = Vec3::new(40.0, 10.0, -60.0);
    description.save(&path).unwrap();

    let sim = build(&SceneDescription::load(&path).unwrap());
    assert_eq!(position(&sim, "ball"), Vec3::new(40.0, 10.0, -60.0));
}

#[test]
fn described_pose_survives_a_save() {
    let dir = TempDir::new("describe");
    let path = dir.join("settled.ron");

    let mut sim = build(&SceneDescription::arena());
    sim.frame(0.25);
    sim.frame(0.25);
    let ball = position(&sim, "ball");
    sim.describe().save(&path).unwrap();

    let reloaded = build(&SceneDescription::load(&path).unwrap());
    assert!(position(&reloaded, "ball").abs_diff_eq(ball, 1e-5));
}

#[test]
fn garbage_file_is_a_parse_error() {
    let dir = TempDir::new("garbage");
    let path = dir.join("broken.ron");
    std::fs::write(&path, "SceneDescription(name: ").unwrap();

    assert!(matches!(
        SceneDescription::load(&path),
        Err(SceneError::Parse(_))
    ));
}

#[test]
fn scratch_directory_is_removed_after_use() {
    let path = {
        let dir = TempDir::new("cleanup");
        let path = dir.join("arena.ron");
        SceneDescription::arena().save(&path).unwrap();
        assert!(path.exists());
        dir.0.clone()
    };
    assert!(!path.exists());
}
