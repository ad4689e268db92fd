//! The interactive ball demo.

use glam::Vec2;
use mechanics_demo::app::{apply_camera_key, AppContext, AppError, AppHandler};
use mechanics_demo::config::DemoConfig;
use mechanics_demo::physics::{ContactEvent, ContactKind, DebugLines, PunchHit};
use mechanics_demo::render::{CubemapFaces, FrameInput, MeshCache, MeshId};
use mechanics_demo::scene::description::SceneDescription;
use mechanics_demo::scene::{Camera, CameraInput, FlyCameraController, SceneResult};
use mechanics_demo::simulation::{FrameReport, Simulation};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::ui::{self, OverlayState};

/// Simulate `frames` frames of exactly one fixed step each, without a window.
pub fn run_headless(
    description: &SceneDescription,
    config: &DemoConfig,
    frames: u32,
) -> SceneResult<()> {
    let mut simulation = Simulation::from_description(description, &config.physics, |_| MeshId(0))?;
    let dt = simulation.timestep.timestep();
    let mut contacts = 0usize;

    for _ in 0..frames {
        let report = simulation.frame(dt);
        contacts += report.contacts.len();
    }

    log::info!(
        "Simulated {frames} frames ({:.2}s), {contacts} ball contacts",
        frames as f32 * dt
    );
    for (_, record) in simulation.scene.iter().filter(|(_, r)| r.body.is_some()) {
        log::info!(
            "  {:<12} at {:>7.2?}{}",
            record.name,
            record.current.position.to_array(),
            if record.sleeping { " (sleeping)" } else { "" }
        );
    }
    Ok(())
}

pub struct Demo {
    description: SceneDescription,
    config: DemoConfig,
    simulation: Option<Simulation>,
    camera: Camera,
    controller: FlyCameraController,
    input: CameraInput,
    debug_lines: DebugLines,
    overlay: OverlayState,
    punch_requested: bool,
}

impl Demo {
    pub fn new(description: SceneDescription, config: DemoConfig, debug_physics: bool) -> Self {
        let (camera, controller) = description.camera.spawn();
        let mut controller = controller
            .with_speed(config.camera.move_speed)
            .with_sensitivity(config.camera.mouse_sensitivity);
        controller.sprint_multiplier = config.camera.sprint_multiplier;
        let overlay = OverlayState {
            show_debug_lines: debug_physics,
            ..Default::default()
        };
        Self {
            description,
            config,
            simulation: None,
            camera,
            controller,
            input: CameraInput::new(),
            debug_lines: DebugLines::new(),
            overlay,
            punch_requested: false,
        }
    }

    fn reset(&mut self) {
        let Some(simulation) = &mut self.simulation else {
            return;
        };
        match simulation.reset() {
            Ok(()) => {
                log::info!("Scene reset");
                self.overlay.last_contact = None;
                self.overlay.last_punch = None;
            }
            Err(err) => log::error!("Reset failed: {err}"),
        }
    }

    fn record(&mut self, report: FrameReport, punch: Option<PunchHit>) {
        for ContactEvent { kind, .. } in &report.contacts {
            self.overlay.contacts += 1;
            if *kind != ContactKind::Other {
                self.overlay.last_contact = Some(*kind);
            }
        }
        if punch.is_some() {
            self.overlay.last_punch = punch;
        }
        self.overlay.last_report = report;
    }
}

impl AppHandler for Demo {
    fn on_init(&mut self, ctx: &mut AppContext) -> Result<(), AppError> {
        let renderer = ctx.renderer_mut();
        renderer.set_skybox(&CubemapFaces::load(&self.config.assets.skybox_dir));

        let mut meshes = MeshCache::new();
        let assets = &self.config.assets;
        let simulation =
            Simulation::from_description(&self.description, &self.config.physics, |model| {
                meshes.get_or_upload(renderer, &assets.resolve_model(model))
            })?;
        log::info!("Uploaded {} meshes", meshes.len());
        self.simulation = Some(simulation);
        self.camera.set_aspect(ctx.width(), ctx.height());
        Ok(())
    }

    fn on_resize(&mut self, ctx: &mut AppContext) {
        self.camera.set_aspect(ctx.width(), ctx.height());
    }

    fn on_update(&mut self, _ctx: &mut AppContext, dt: f32) -> bool {
        self.controller.update(&mut self.camera, &self.input, dt);
        self.input.reset_deltas();

        let Some(simulation) = &mut self.simulation else {
            return false;
        };
        simulation.move_camera_capsule(self.camera.position);

        let punch = if std::mem::take(&mut self.punch_requested) {
            let hit = simulation.punch(
                self.camera.position,
                self.controller.front(),
                &self.config.punch,
            );
            if hit.is_none() {
                log::debug!("Punch missed");
            }
            hit
        } else {
            None
        };

        let report = simulation.frame(dt);
        if self.overlay.show_debug_lines {
            simulation.physics.debug_lines(&mut self.debug_lines);
        }
        self.record(report, punch);
        true
    }

    fn on_ui(&mut self, ctx: &mut AppContext, ui_ctx: &egui::Context) {
        let Some(simulation) = &mut self.simulation else {
            return;
        };
        if ui::overlay(ui_ctx, &mut self.overlay, simulation, ctx.stats().fps()) {
            self.reset();
        }
    }

    fn frame_input(&self, _ctx: &AppContext) -> FrameInput {
        let Some(simulation) = &self.simulation else {
            return FrameInput::default();
        };
        FrameInput {
            camera: self.camera.clone(),
            items: simulation.draw_items(),
            lines: if self.overlay.show_debug_lines {
                self.debug_lines.vertices().to_vec()
            } else {
                Vec::new()
            },
        }
    }

    fn on_key(&mut self, _ctx: &mut AppContext, key: KeyCode, pressed: bool) {
        if apply_camera_key(&mut self.input, key, pressed) || !pressed {
            return;
        }
        match key {
            KeyCode::Space => self.punch_requested = true,
            KeyCode::F1 => {
                self.overlay.show_debug_lines = !self.overlay.show_debug_lines;
                if !self.overlay.show_debug_lines {
                    self.debug_lines.clear();
                }
            }
            KeyCode::F2 => self.overlay.visible = !self.overlay.visible,
            KeyCode::KeyP => {
                if let Some(simulation) = &mut self.simulation {
                    simulation.paused = !simulation.paused;
                    log::info!("{}", if simulation.paused { "Paused" } else { "Resumed" });
                }
            }
            KeyCode::KeyR => self.reset(),
            _ => {}
        }
    }

    fn on_mouse_motion(&mut self, _ctx: &mut AppContext, delta: Vec2) {
        if self.input.mouse_look_active {
            self.input.mouse_delta += delta;
        }
    }

    fn on_mouse_button(&mut self, ctx: &mut AppContext, button: MouseButton, pressed: bool) {
        if button == MouseButton::Right {
            self.input.mouse_look_active = pressed;
            ctx.set_cursor_grab(pressed);
        }
    }

    fn on_scroll(&mut self, _ctx: &mut AppContext, delta: f32) {
        self.input.scroll_delta += delta;
    }

    fn on_shutdown(&mut self, ctx: &mut AppContext) {
        log::info!(
            "Shutting down after {} frames ({:.1}s)",
            ctx.frame_number(),
            ctx.elapsed_time()
        );
    }
}
