//! Simulation
//!
//! Wires the fixed-timestep decoupler to the physics world and the entity
//! container. One [`Simulation::frame`] call per rendered frame:
//!
//! ```text
//! dt ─► FixedTimestep ─► per step: store_previous ─► physics.step ─► pull_current ─► drain contacts
//!                     └► factor ─► draw_items (previous ⟶ current blend)
//! ```

use glam::Vec3;

use crate::physics::{ContactEvent, PhysicsSettings, PhysicsWorld, PunchHit, PunchSettings};
use crate::render::{DrawItem, MeshId};
use crate::scene::description::{ModelSource, SceneDescription};
use crate::scene::{EntityId, EntityRecord, SceneEntities, SceneError, SceneResult};
use crate::timestep::FixedTimestep;

/// What happened during one [`Simulation::frame`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub steps: u32,
    pub factor: f32,
    pub contacts: Vec<ContactEvent>,
}

pub struct Simulation {
    pub timestep: FixedTimestep,
    pub physics: PhysicsWorld,
    pub scene: SceneEntities,
    pub paused: bool,
    /// Multiplier on wall-clock time, 1.0 is real time
    pub time_scale: f32,
    factor: f32,
    camera_capsule: Option<EntityId>,
    description: SceneDescription,
    settings: PhysicsSettings,
}

impl Simulation {
    /// Build bodies, colliders and records from a scene file.
    ///
    /// `meshes` maps each entity's model to an uploaded mesh.
    pub fn from_description(
        description: &SceneDescription,
        settings: &PhysicsSettings,
        mut meshes: impl FnMut(&ModelSource) -> MeshId,
    ) -> SceneResult<Self> {
        description.validate()?;
        let timestep = FixedTimestep::new(settings.timestep)?;
        let mut physics = PhysicsWorld::new(settings);
        let mut scene = SceneEntities::with_capacity(description.capacity);

        for entity in &description.entities {
            let shader = entity
                .shader_kind()
                .ok_or_else(|| SceneError::UnknownShader {
                    entity: entity.name.clone(),
                    index: entity.shader,
                })?;
            let transform = entity.transform();
            let mut record = EntityRecord::new(&entity.name, meshes(&entity.model), transform)
                .with_shader(shader)
                .with_color(entity.color);
            record.visible = entity.visible;

            if let Some(body) = &entity.body {
                let (body_handle, collider_handle) =
                    physics.add_body(body, transform.position, transform.rotation);
                record = record.with_body(body_handle, collider_handle);
                record.allow_sleep = body.allow_sleep;
            }
            scene.spawn(record)?;
        }

        let camera_capsule = description
            .camera
            .capsule
            .as_deref()
            .and_then(|name| scene.find(name));

        log::info!(
            "Built scene '{}': {} entities, {} bodies",
            description.name,
            scene.len(),
            physics.body_count()
        );

        Ok(Self {
            timestep,
            physics,
            scene,
            paused: false,
            time_scale: 1.0,
            factor: 0.0,
            camera_capsule,
            description: description.clone(),
            settings: settings.clone(),
        })
    }

    /// Advance by one render frame of `dt` wall-clock seconds.
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        let dt = if self.paused {
            0.0
        } else {
            dt * self.time_scale.max(0.0)
        };

        let Self {
            timestep,
            physics,
            scene,
            ..
        } = self;
        let mut contacts = Vec::new();
        let report = timestep.advance(dt, |_| {
            scene.store_previous();
            physics.step();
            scene.pull_current(physics);
            contacts.extend(physics.drain_contacts());
        });

        self.factor = report.factor;
        FrameReport {
            steps: report.steps,
            factor: report.factor,
            contacts,
        }
    }

    /// Blend factor of the last frame
    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn draw_items(&self) -> Vec<DrawItem> {
        self.scene.draw_items(self.factor)
    }

    /// Drag the camera capsule to the camera; applied on the next step.
    pub fn move_camera_capsule(&mut self, position: Vec3) {
        let body = self
            .camera_capsule
            .and_then(|id| self.scene.get(id))
            .and_then(|record| record.body);
        if let Some(body) = body {
            self.physics.set_kinematic_pose(body, position);
        }
    }

    pub fn punch(&mut self, origin: Vec3, direction: Vec3, settings: &PunchSettings) -> Option<PunchHit> {
        self.physics.punch(origin, direction, settings)
    }

    pub fn description(&self) -> &SceneDescription {
        &self.description
    }

    /// Rebuild everything from the description this simulation started from.
    ///
    /// Mesh ids are reused, so nothing is uploaded again.
    pub fn reset(&mut self) -> SceneResult<()> {
        let models: Vec<MeshId> = self.scene.iter().map(|(_, r)| r.model).collect();
        let mut models = models.into_iter();
        let rebuilt = Self::from_description(&self.description, &self.settings, |_| {
            models.next().unwrap_or(MeshId(0))
        })?;
        *self = Self {
            paused: self.paused,
            time_scale: self.time_scale,
            ..rebuilt
        };
        Ok(())
    }

    /// Snapshot of the current state as a scene file.
    pub fn describe(&self) -> SceneDescription {
        let mut description = self.description.clone();
        for (entity, (_, record)) in description.entities.iter_mut().zip(self.scene.iter()) {
            entity.name = record.name.clone();
            entity.shader = record.shader.index();
            entity.position = record.current.position;
            entity.rotation_euler = record.current.euler_angles();
            entity.scale = record.current.scale;
            entity.color = record.color;
            entity.visible = record.visible;
        }
        description
    }
}
