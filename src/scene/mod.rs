//! Scene management
//!
//! [`SceneEntities`] is a fixed-capacity list of [`EntityRecord`]s filled once
//! at scene setup. Each record pairs a render model with the physics body that
//! drives it and keeps the last two simulated poses for interpolation.

mod camera;
mod camera_controller;
pub mod description;
mod transform;

pub use camera::*;
pub use camera_controller::*;
pub use transform::*;

use glam::Vec4;
use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::physics::PhysicsWorld;
use crate::render::{DrawItem, MeshId};
use crate::timestep::TimestepError;

/// Errors from building, loading or saving a scene
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Scene is full: capacity is {capacity} entities")]
    CapacityExceeded { capacity: usize },

    #[error("Entity '{entity}' uses unknown shader index {index}")]
    UnknownShader { entity: String, index: u32 },

    #[error("Scene declares capacity {capacity} but lists {count} entities")]
    CapacityTooSmall { capacity: usize, count: usize },

    #[error("Failed to read or write scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scene file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Failed to serialize scene: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Invalid physics settings: {0}")]
    Timestep(#[from] TimestepError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Which shader program draws an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShaderKind {
    /// Phong-lit with the directional and point lights
    #[default]
    Lit,
    /// Cubemap sky; never used by mesh entities
    Skybox,
    /// Flat color, used for lamps and markers
    Unlit,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 3] = [ShaderKind::Lit, ShaderKind::Skybox, ShaderKind::Unlit];

    /// Index stored in scene files
    pub fn index(self) -> u32 {
        match self {
            ShaderKind::Lit => 0,
            ShaderKind::Skybox => 1,
            ShaderKind::Unlit => 2,
        }
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            ShaderKind::Lit => "lit",
            ShaderKind::Skybox => "skybox",
            ShaderKind::Unlit => "unlit",
        }
    }
}

/// Index of a record inside [`SceneEntities`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub usize);

/// Everything the loop needs to know about one entity
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub name: String,
    pub model: MeshId,
    pub shader: ShaderKind,
    pub color: Vec4,
    /// Pose after the most recent fixed step
    pub current: Transform,
    /// Pose after the fixed step before that
    pub previous: Transform,
    pub body: Option<RigidBodyHandle>,
    pub collider: Option<ColliderHandle>,
    /// Bodies such as the camera capsule simulate but are never drawn
    pub visible: bool,
    pub allow_sleep: bool,
    pub sleeping: bool,
}

impl EntityRecord {
    pub fn new(name: impl Into<String>, model: MeshId, transform: Transform) -> Self {
        Self {
            name: name.into(),
            model,
            shader: ShaderKind::Lit,
            color: Vec4::ONE,
            current: transform,
            previous: transform,
            body: None,
            collider: None,
            visible: true,
            allow_sleep: true,
            sleeping: false,
        }
    }

    pub fn with_body(mut self, body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        self.body = Some(body);
        self.collider = Some(collider);
        self
    }

    pub fn with_shader(mut self, shader: ShaderKind) -> Self {
        self.shader = shader;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Fixed-capacity entity container
#[derive(Debug, Clone)]
pub struct SceneEntities {
    capacity: usize,
    records: Vec<EntityRecord>,
}

impl SceneEntities {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: Vec::with_capacity(capacity),
        }
    }

    /// Add a record. Fails once the container holds `capacity` records.
    pub fn spawn(&mut self, record: EntityRecord) -> SceneResult<EntityId> {
        if self.records.len() >= self.capacity {
            return Err(SceneError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.records.push(record);
        Ok(EntityId(self.records.len() - 1))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(id.0)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.records.get_mut(id.0)
    }

    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.records.iter().position(|r| r.name == name).map(EntityId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityRecord)> {
        self.records.iter().enumerate().map(|(i, r)| (EntityId(i), r))
    }

    /// Copy every current pose into its previous slot.
    ///
    /// Runs once per fixed step, before the world advances.
    pub fn store_previous(&mut self) {
        for record in &mut self.records {
            record.previous = record.current;
        }
    }

    /// Read body poses and sleep state back from the world after a step
    pub fn pull_current(&mut self, physics: &PhysicsWorld) {
        for record in &mut self.records {
            let Some(body) = record.body else {
                continue;
            };
            if let Some((position, rotation)) = physics.body_pose(body) {
                record.current.position = position;
                record.current.rotation = rotation;
            }
            record.sleeping = physics.is_sleeping(body);
        }
    }

    /// Display pose of one entity; never written back
    pub fn interpolated(&self, id: EntityId, factor: f32) -> Option<Transform> {
        self.get(id)
            .map(|r| Transform::interpolate(&r.previous, &r.current, factor))
    }

    /// Draw list for the visible entities at the given blend factor
    pub fn draw_items(&self, factor: f32) -> Vec<DrawItem> {
        self.records
            .iter()
            .filter(|r| r.visible)
            .map(|r| DrawItem {
                mesh: r.model,
                transform: Transform::interpolate(&r.previous, &r.current, factor),
                color: r.color,
                shader: r.shader,
            })
            .collect()
    }
}
