//! Scene files
//!
//! A [`SceneDescription`] is the serializable form of a scene: the camera start
//! and one [`EntityDescription`] per entity. Files are RON.

use std::f32::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::{Camera, FlyCameraController, SceneError, SceneResult, ShaderKind, Transform};
use crate::physics::{
    BodyDescription, BodyKind, CollisionCategories, PhysicsMaterial, ShapeDescription,
};

/// Where an entity's render mesh comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelSource {
    /// Unit-radius sphere
    Sphere,
    /// Cube with half extents of one
    Cube,
    /// Capsule of radius one and half height one
    Capsule,
    /// Wavefront OBJ file
    Obj(PathBuf),
}

/// Camera start state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescription {
    pub position: Vec3,
    /// Degrees, -90 looks down -Z
    pub yaw: f32,
    /// Degrees
    pub pitch: f32,
    /// Entity whose kinematic body follows the camera
    #[serde(default)]
    pub capsule: Option<String>,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            position: Vec3::new(10.0, -10.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
            capsule: None,
        }
    }
}

impl CameraDescription {
    /// Camera and fly controller at the start pose
    pub fn spawn(&self) -> (Camera, FlyCameraController) {
        let mut controller = FlyCameraController::new();
        controller.yaw = self.yaw;
        controller.pitch = self.pitch.clamp(-89.0, 89.0);
        let camera = Camera::new(self.position, self.position + controller.front());
        (camera, controller)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescription {
    pub name: String,
    pub model: ModelSource,
    /// Index into the shader table: 0 lit, 1 skybox, 2 unlit
    #[serde(default)]
    pub shader: u32,
    pub position: Vec3,
    /// XYZ Euler angles in radians
    #[serde(default)]
    pub rotation_euler: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    #[serde(default = "white")]
    pub color: Vec4,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(default)]
    pub body: Option<BodyDescription>,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

fn white() -> Vec4 {
    Vec4::ONE
}

fn visible_by_default() -> bool {
    true
}

impl EntityDescription {
    pub fn new(name: impl Into<String>, model: ModelSource, position: Vec3) -> Self {
        Self {
            name: name.into(),
            model,
            shader: ShaderKind::Lit.index(),
            position,
            rotation_euler: Vec3::ZERO,
            scale: Vec3::ONE,
            color: Vec4::ONE,
            visible: true,
            body: None,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_euler(self.position, self.rotation_euler, self.scale)
    }

    pub fn shader_kind(&self) -> Option<ShaderKind> {
        ShaderKind::from_index(self.shader)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub name: String,
    /// Maximum number of entities the scene may hold
    pub capacity: usize,
    #[serde(default)]
    pub camera: CameraDescription,
    pub entities: Vec<EntityDescription>,
}

impl SceneDescription {
    /// Check capacity and shader indices.
    pub fn validate(&self) -> SceneResult<()> {
        if self.entities.len() > self.capacity {
            return Err(SceneError::CapacityTooSmall {
                capacity: self.capacity,
                count: self.entities.len(),
            });
        }
        if let Some(bad) = self.entities.iter().find(|e| e.shader_kind().is_none()) {
            return Err(SceneError::UnknownShader {
                entity: bad.name.clone(),
                index: bad.shader,
            });
        }
        Ok(())
    }

    pub fn from_ron(text: &str) -> SceneResult<Self> {
        let scene: SceneDescription = ron::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_ron(&self) -> SceneResult<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Read and validate a scene file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let scene = Self::from_ron(&std::fs::read_to_string(path)?)?;
        log::info!(
            "Loaded scene '{}' from {} ({} entities)",
            scene.name,
            path.display(),
            scene.entities.len()
        );
        Ok(scene)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_ron()?)?;
        log::info!("Saved scene '{}' to {}", self.name, path.display());
        Ok(())
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDescription> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// The demo arena: a ball in a walled box and the camera capsule.
    pub fn arena() -> Self {
        let origin = Vec3::new(25.0, -25.0, -25.0);
        let floor_extents = Vec3::new(160.0, 1.0, 160.0);
        let wall_extents = Vec3::new(75.0, 1.0, 160.0);
        let upright = Vec3::new(0.0, 0.0, FRAC_PI_2);
        let across = Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_2);

        let ball_radius = 3.0;
        let mut ball = EntityDescription::new(
            "ball",
            ModelSource::Sphere,
            Vec3::new(15.0, 30.0, -50.0),
        );
        ball.scale = Vec3::splat(ball_radius);
        ball.color = Vec4::new(0.85, 0.25, 0.2, 1.0);
        ball.body = Some(
            BodyDescription::new(
                BodyKind::Dynamic,
                ShapeDescription::Ball {
                    radius: ball_radius,
                },
                CollisionCategories::BALL,
            )
            .with_material(PhysicsMaterial::ball())
            .never_sleeps(),
        );

        let plank = |name: &str, position: Vec3, rotation: Vec3, extents: Vec3, floor: bool| {
            let mut categories = CollisionCategories::ENVIRONMENT;
            if floor {
                categories |= CollisionCategories::FLOOR;
            }
            let mut entity = EntityDescription::new(name, ModelSource::Cube, position);
            entity.rotation_euler = rotation;
            entity.scale = extents;
            entity.color = if floor {
                Vec4::new(0.45, 0.45, 0.45, 1.0)
            } else {
                Vec4::new(0.7, 0.65, 0.55, 1.0)
            };
            entity.body = Some(BodyDescription::new(
                BodyKind::Fixed,
                ShapeDescription::Cuboid {
                    half_extents: extents.to_array(),
                },
                categories,
            ));
            entity
        };

        let floor = plank(
            "floor",
            Vec3::new(origin.x + 80.0, origin.y, origin.z - 80.0),
            Vec3::ZERO,
            floor_extents,
            true,
        );
        let left = plank(
            "left_wall",
            Vec3::new(origin.x - 80.0, 1.0, origin.z - 80.0),
            upright,
            wall_extents,
            false,
        );
        let back = plank(
            "back_wall",
            Vec3::new(origin.x + 80.0, 1.0, 4.0 * origin.z - 160.0),
            across,
            wall_extents,
            false,
        );
        let right = plank(
            "right_wall",
            Vec3::new(4.0 * origin.x + 160.0, 1.0, origin.z - 80.0),
            upright,
            wall_extents,
            false,
        );
        let front = plank(
            "front_wall",
            Vec3::new(origin.x + 80.0, 1.0, origin.z + 80.0),
            across,
            wall_extents,
            false,
        );

        let camera = CameraDescription {
            capsule: Some("camera".to_string()),
            ..Default::default()
        };
        let mut capsule = EntityDescription::new("camera", ModelSource::Capsule, camera.position);
        capsule.visible = false;
        capsule.scale = Vec3::new(3.0, 4.0, 3.0);
        capsule.body = Some(
            BodyDescription::new(
                BodyKind::Kinematic,
                ShapeDescription::Capsule {
                    half_height: 4.0,
                    radius: 3.0,
                },
                CollisionCategories::CAMERA,
            )
            .never_sleeps(),
        );

        Self {
            name: "arena".to_string(),
            capacity: 16,
            camera,
            entities: vec![ball, floor, left, back, right, front, capsule],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mechanics_scene_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn camera_spawns_looking_down_negative_z() {
        let (camera, controller) = CameraDescription::default().spawn();
        assert_eq!(camera.position, Vec3::new(10.0, -10.0, 0.0));
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert_eq!(controller.yaw, -90.0);
    }

    #[test]
    fn arena_is_valid() {
        let arena = SceneDescription::arena();
        arena.validate().unwrap();
        assert_eq!(arena.entities.len(), 7);

        let floor = arena.entity("floor").unwrap();
        let body = floor.body.as_ref().unwrap();
        assert!(body.categories.contains(CollisionCategories::FLOOR));
        assert_eq!(floor.position, Vec3::new(105.0, -25.0, -105.0));

        let capsule = arena.camera.capsule.as_deref().unwrap();
        assert!(!arena.entity(capsule).unwrap().visible);
    }

    #[test]
    fn save_then_load_gives_same_scene() {
        let dir = temp_dir("round_trip");
        let path = dir.join("scene1.ron");

        let arena = SceneDescription::arena();
        arena.save(&path).unwrap();
        let loaded = SceneDescription::load(&path).unwrap();
        assert_eq!(loaded, arena);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[rstest]
    #[case::skybox_index_is_known(1, true)]
    #[case::past_the_table(3, false)]
    #[case::far_out(u32::MAX, false)]
    fn shader_indices_are_checked(#[case] shader: u32, #[case] accepted: bool) {
        let mut scene = SceneDescription::arena();
        scene.entities[0].shader = shader;
        let result = scene.validate();
        assert_eq!(result.is_ok(), accepted);
        if let Err(err) = result {
            assert!(matches!(err, SceneError::UnknownShader { index, .. } if index == shader));
        }
    }

    #[test]
    fn over_capacity_scene_is_rejected() {
        let mut scene = SceneDescription::arena();
        scene.capacity = 3;
        let text = scene.to_ron().unwrap();
        let err = SceneDescription::from_ron(&text).unwrap_err();
        assert!(matches!(
            err,
            SceneError::CapacityTooSmall {
                capacity: 3,
                count: 7
            }
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = temp_dir("missing");
        let err = SceneDescription::load(dir.join("nope.ron")).unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = SceneDescription::from_ron("(name: 12").unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)));
    }

    #[test]
    fn optional_fields_take_defaults() {
        let text = r#"(
            name: "tiny",
            capacity: 1,
            entities: [
                (name: "box", model: Cube, position: (0.0, 1.0, 0.0)),
            ],
        )"#;
        let scene = SceneDescription::from_ron(text).unwrap();
        let entity = &scene.entities[0];
        assert_eq!(entity.scale, Vec3::ONE);
        assert_eq!(entity.color, Vec4::ONE);
        assert!(entity.visible);
        assert!(entity.body.is_none());
        assert_eq!(scene.camera, CameraDescription::default());
    }
}
