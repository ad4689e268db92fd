//! Mechanics - a fixed-timestep rigid-body demo
//!
//! Rapier runs at a constant rate, decoupled from the render frame rate; the
//! renderer blends the last two simulated poses so motion stays smooth at any
//! frame rate.
//!
//! # Modules
//! - [`timestep`]: the accumulator that turns frame time into fixed steps
//! - [`physics`]: rapier world, collision categories, contacts and punches
//! - [`scene`]: entity records, transforms, camera and RON scene files
//! - [`simulation`]: ties the three together, one call per rendered frame
//! - [`render`]: wgpu meshes, skybox and debug lines
//! - [`app`]: winit event loop with egui overlay
//! - [`config`]: TOML configuration and command line flags

pub mod app;
pub mod config;
pub mod egui_integration;
pub mod physics;
pub mod render;
pub mod scene;
pub mod simulation;
pub mod timestep;

pub use app::{App, AppContext, AppError, AppHandler};
pub use config::{DemoArgs, DemoConfig, WindowArgs};
pub use egui_integration::EguiIntegration;
pub use physics::{PhysicsSettings, PhysicsWorld, PunchSettings};
pub use render::{FrameInput, Renderer};
pub use scene::description::SceneDescription;
pub use simulation::{FrameReport, Simulation};
pub use timestep::{FixedTimestep, StepReport};
