//! Rigid-body physics on top of rapier3d
//!
//! [`PhysicsWorld`] owns every piece of rapier state and advances it by exactly
//! one fixed timestep per [`step`](PhysicsWorld::step) call. It also hosts the
//! game-level queries: the punch raycast, collision classification and the
//! debug line extraction.

mod categories;
mod contacts;
pub mod conversions;
mod debug_lines;

pub use categories::CollisionCategories;
pub use contacts::{classify, ContactEvent, ContactKind};
pub use debug_lines::{hsla_to_rgba, DebugLines, LineVertex};

use std::num::NonZeroUsize;

use glam::{Quat, Vec3};
use rapier3d::crossbeam::channel::{unbounded, Receiver};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::timestep::{FixedTimestep, TimestepError, DEFAULT_TIMESTEP};
use conversions::{isometry3_from_na, isometry3_to_na, point3_to_na, vec3_from_na, vec3_to_na};

/// World-wide simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: [f32; 3],
    /// Fixed step size in seconds
    pub timestep: f32,
    pub solver_iterations: usize,
    pub internal_pgs_iterations: usize,
    pub sleeping_enabled: bool,
    /// Longest wall-clock frame fed to the stepper, in seconds
    pub max_frame_time: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: DEFAULT_TIMESTEP,
            solver_iterations: 15,
            internal_pgs_iterations: 8,
            sleeping_enabled: true,
            max_frame_time: 0.25,
        }
    }
}

impl PhysicsSettings {
    /// Reject settings the fixed stepper cannot run with.
    pub fn validate(&self) -> Result<(), TimestepError> {
        FixedTimestep::new(self.timestep).map(|_| ())
    }
}

/// Tuning for the punch raycast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunchSettings {
    /// Ray length in world units
    pub reach: f32,
    pub strength: f32,
}

impl Default for PunchSettings {
    fn default() -> Self {
        Self {
            reach: 25.0,
            strength: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Dynamic,
    Fixed,
    /// Moved by the game every frame, pushes dynamic bodies
    Kinematic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeDescription {
    Ball { radius: f32 },
    Cuboid { half_extents: [f32; 3] },
    /// Capsule along the local Y axis
    Capsule { half_height: f32, radius: f32 },
}

/// Surface and mass properties of a collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
    /// Stands in for rolling resistance, which rapier does not model
    pub angular_damping: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.5,
            density: 1.0,
            angular_damping: 0.0,
        }
    }
}

impl PhysicsMaterial {
    /// Bouncy, heavy ball
    pub fn ball() -> Self {
        Self {
            restitution: 0.6,
            friction: 0.7,
            density: 3.0,
            angular_damping: 2.0,
        }
    }
}

/// Serializable recipe for one body with a single collider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescription {
    pub kind: BodyKind,
    pub shape: ShapeDescription,
    #[serde(default)]
    pub material: PhysicsMaterial,
    pub categories: CollisionCategories,
    /// Defaults to [`CollisionCategories::default_mask`]
    #[serde(default)]
    pub collides_with: Option<CollisionCategories>,
    #[serde(default = "default_allow_sleep")]
    pub allow_sleep: bool,
}

fn default_allow_sleep() -> bool {
    true
}

impl BodyDescription {
    pub fn new(kind: BodyKind, shape: ShapeDescription, categories: CollisionCategories) -> Self {
        Self {
            kind,
            shape,
            material: PhysicsMaterial::default(),
            categories,
            collides_with: None,
            allow_sleep: true,
        }
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn never_sleeps(mut self) -> Self {
        self.allow_sleep = false;
        self
    }

    pub fn mask(&self) -> CollisionCategories {
        self.collides_with
            .unwrap_or_else(|| self.categories.default_mask())
    }
}

/// Result of a punch that connected
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PunchHit {
    pub collider: ColliderHandle,
    pub body: RigidBodyHandle,
    /// Distance along the ray as a fraction of the reach
    pub fraction: f32,
    pub impulse: Vec3,
}

/// All rapier state for one scene
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    events: ChannelEventCollector,
    collision_events: Receiver<CollisionEvent>,
    contact_force_events: Receiver<ContactForceEvent>,
    sleeping_enabled: bool,
}

impl PhysicsWorld {
    pub fn new(settings: &PhysicsSettings) -> Self {
        let mut integration_parameters = IntegrationParameters {
            dt: settings.timestep,
            num_solver_iterations: NonZeroUsize::new(settings.solver_iterations)
                .unwrap_or(NonZeroUsize::MIN),
            ..Default::default()
        };
        integration_parameters.num_internal_pgs_iterations = settings.internal_pgs_iterations.max(1);

        let (collision_send, collision_events) = unbounded();
        let (contact_force_send, contact_force_events) = unbounded();

        Self {
            gravity: vec3_to_na(Vec3::from_array(settings.gravity)),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            events: ChannelEventCollector::new(collision_send, contact_force_send),
            collision_events,
            contact_force_events,
            sleeping_enabled: settings.sleeping_enabled,
        }
    }

    /// Advance the simulation by exactly one fixed timestep.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.events,
        );
    }

    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    pub fn gravity(&self) -> Vec3 {
        vec3_from_na(&self.gravity)
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = vec3_to_na(gravity);
    }

    /// Create a body with its collider at the given pose.
    pub fn add_body(
        &mut self,
        desc: &BodyDescription,
        position: Vec3,
        rotation: Quat,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
        };
        let body = builder
            .position(isometry3_to_na(position, rotation))
            .can_sleep(self.sleeping_enabled && desc.allow_sleep)
            .angular_damping(desc.material.angular_damping)
            .build();
        let body_handle = self.bodies.insert(body);

        let shape = match desc.shape {
            ShapeDescription::Ball { radius } => ColliderBuilder::ball(radius),
            ShapeDescription::Cuboid { half_extents: [x, y, z] } => ColliderBuilder::cuboid(x, y, z),
            ShapeDescription::Capsule {
                half_height,
                radius,
            } => ColliderBuilder::capsule_y(half_height, radius),
        };
        let collider = shape
            .restitution(desc.material.restitution)
            .friction(desc.material.friction)
            .density(desc.material.density)
            .collision_groups(desc.categories.interaction_groups(desc.mask()))
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        (body_handle, collider_handle)
    }

    /// World pose of a body
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        self.bodies
            .get(handle)
            .map(|body| isometry3_from_na(body.position()))
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|body| vec3_from_na(body.linvel()))
    }

    pub fn is_sleeping(&self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .get(handle)
            .is_some_and(|body| body.is_sleeping())
    }

    /// Move a kinematic body; the move takes effect on the next step.
    pub fn set_kinematic_pose(&mut self, handle: RigidBodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_next_kinematic_translation(vec3_to_na(position));
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Take all ball contacts that started since the last drain.
    pub fn drain_contacts(&mut self) -> Vec<ContactEvent> {
        // Force events are never enabled, but the channel must not grow.
        while self.contact_force_events.try_recv().is_ok() {}

        let mut contacts = Vec::new();
        while let Ok(event) = self.collision_events.try_recv() {
            if let Some(contact) = classify(&event, &self.colliders) {
                contacts.push(contact);
            }
        }
        contacts
    }

    /// Cast a ray from `origin` and shove the first dynamic ball it meets.
    ///
    /// The push is stronger the closer the ball is: a force of
    /// `(1 - fraction) * reach * strength`, delivered over one fixed step.
    pub fn punch(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        settings: &PunchSettings,
    ) -> Option<PunchHit> {
        let direction = direction.try_normalize()?;
        let ray = Ray::new(point3_to_na(origin), vec3_to_na(direction));
        let filter = QueryFilter::only_dynamic().groups(InteractionGroups::new(
            Group::ALL,
            CollisionCategories::BALL.group(),
        ));

        let (collider, toi) = self.query_pipeline.cast_ray(
            &self.bodies,
            &self.colliders,
            &ray,
            settings.reach,
            true,
            filter,
        )?;
        let body = self.colliders.get(collider)?.parent()?;

        let fraction = toi / settings.reach;
        let force = (1.0 - fraction) * settings.reach * settings.strength;
        let impulse = direction * force * self.integration_parameters.dt;
        self.bodies
            .get_mut(body)?
            .apply_impulse(vec3_to_na(impulse), true);

        log::debug!(
            "Punch hit at {:.1}% of reach, impulse {:?}",
            fraction * 100.0,
            impulse
        );
        Some(PunchHit {
            collider,
            body,
            fraction,
            impulse,
        })
    }

    /// Refill `lines` with the current collider outlines and bounding boxes.
    pub fn debug_lines(&self, lines: &mut DebugLines) {
        lines.rebuild(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> BodyDescription {
        BodyDescription::new(
            BodyKind::Fixed,
            ShapeDescription::Cuboid {
                half_extents: [20.0, 1.0, 20.0],
            },
            CollisionCategories::ENVIRONMENT | CollisionCategories::FLOOR,
        )
    }

    fn ball() -> BodyDescription {
        BodyDescription::new(
            BodyKind::Dynamic,
            ShapeDescription::Ball { radius: 1.0 },
            CollisionCategories::BALL,
        )
        .with_material(PhysicsMaterial::ball())
        .never_sleeps()
    }

    #[test]
    fn step_moves_dynamic_body() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        let (handle, _) = world.add_body(&ball(), Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY);

        world.step();
        let (position, _) = world.body_pose(handle).unwrap();
        assert!(position.y < 10.0, "ball should fall: y = {}", position.y);
    }

    #[test]
    fn fixed_body_stays_put() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        let (handle, _) = world.add_body(&floor(), Vec3::new(0.0, -1.0, 0.0), Quat::IDENTITY);
        for _ in 0..30 {
            world.step();
        }
        let (position, _) = world.body_pose(handle).unwrap();
        assert_eq!(position, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn kinematic_body_follows_target() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        let camera = BodyDescription::new(
            BodyKind::Kinematic,
            ShapeDescription::Capsule {
                half_height: 4.0,
                radius: 3.0,
            },
            CollisionCategories::CAMERA,
        );
        let (handle, _) = world.add_body(&camera, Vec3::ZERO, Quat::IDENTITY);

        world.set_kinematic_pose(handle, Vec3::new(5.0, 0.0, 0.0));
        world.step();
        let (position, _) = world.body_pose(handle).unwrap();
        assert!(position.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn ball_landing_reports_floor_contact() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        world.add_body(&floor(), Vec3::ZERO, Quat::IDENTITY);
        world.add_body(&ball(), Vec3::new(0.0, 3.0, 0.0), Quat::IDENTITY);

        let mut contacts = Vec::new();
        for _ in 0..120 {
            world.step();
            contacts.extend(world.drain_contacts());
        }
        assert!(contacts
            .iter()
            .any(|c| c.kind == ContactKind::BallTouchedFloor));
    }

    #[test]
    fn punch_pushes_ball_along_ray() {
        let settings = PhysicsSettings {
            gravity: [0.0; 3],
            ..Default::default()
        };
        let mut world = PhysicsWorld::new(&settings);
        let (handle, _) = world.add_body(&ball(), Vec3::new(0.0, 0.0, -10.0), Quat::IDENTITY);
        world.step();

        let hit = world
            .punch(Vec3::ZERO, -Vec3::Z, &PunchSettings::default())
            .expect("ray should reach the ball");
        assert_eq!(hit.body, handle);
        assert!((hit.fraction - 9.0 / 25.0).abs() < 1e-3);

        world.step();
        let velocity = world.linear_velocity(handle).unwrap();
        assert!(velocity.z < -0.1, "ball should move away: {velocity:?}");
    }

    #[test]
    fn punch_misses_when_looking_away() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        world.add_body(&ball(), Vec3::new(0.0, 0.0, -10.0), Quat::IDENTITY);
        world.step();
        assert!(world
            .punch(Vec3::ZERO, Vec3::Z, &PunchSettings::default())
            .is_none());
    }

    #[test]
    fn punch_ignores_static_geometry() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        world.add_body(&floor(), Vec3::new(0.0, 0.0, -10.0), Quat::IDENTITY);
        world.step();
        assert!(world
            .punch(Vec3::new(0.0, 5.0, -10.0), -Vec3::Y, &PunchSettings::default())
            .is_none());
    }

    #[test]
    fn debug_lines_outline_colliders() {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        world.add_body(&floor(), Vec3::ZERO, Quat::IDENTITY);
        world.step();

        let mut lines = DebugLines::new();
        world.debug_lines(&mut lines);
        assert!(lines.line_count() >= 12, "a box has at least 12 edges");
        assert_eq!(lines.vertices().len() % 2, 0);
    }
}
