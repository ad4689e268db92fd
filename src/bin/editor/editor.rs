use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use glam::Vec2;
use mechanics_demo::app::{apply_camera_key, AppContext, AppError, AppHandler};
use mechanics_demo::config::DemoConfig;
use mechanics_demo::render::{CubemapFaces, FrameInput, MeshCache, Renderer};
use mechanics_demo::scene::description::SceneDescription;
use mechanics_demo::scene::{Camera, CameraInput, FlyCameraController};
use mechanics_demo::simulation::Simulation;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::console::ConsolePanel;
use crate::inspector::entity_inspector;
use crate::log_capture::LogBuffer;
use crate::toolbar::{draw_play_controls, PlayState};

const DEFAULT_SAVE_PATH: &str = "scene.ron";

pub struct Editor {
    path: Option<PathBuf>,
    description: SceneDescription,
    config: DemoConfig,
    simulation: Option<Simulation>,
    meshes: MeshCache,
    play_state: PlayState,
    selected: Option<usize>,
    camera: Camera,
    controller: FlyCameraController,
    input: CameraInput,
    console: ConsolePanel,
}

impl Editor {
    pub fn new(
        path: Option<PathBuf>,
        description: SceneDescription,
        config: DemoConfig,
        logs: Arc<Mutex<LogBuffer>>,
    ) -> Self {
        let (camera, controller) = description.camera.spawn();
        let controller = controller
            .with_speed(config.camera.move_speed)
            .with_sensitivity(config.camera.mouse_sensitivity);
        Self {
            path,
            description,
            config,
            simulation: None,
            meshes: MeshCache::new(),
            play_state: PlayState::Editing,
            selected: None,
            camera,
            controller,
            input: CameraInput::new(),
            console: ConsolePanel::new(logs),
        }
    }

    /// Rebuild the simulation from the edited description.
    ///
    /// On failure the previous simulation stays up.
    fn rebuild(&mut self, renderer: &mut Renderer) {
        let meshes = &mut self.meshes;
        let assets = &self.config.assets;
        let built = Simulation::from_description(&self.description, &self.config.physics, |model| {
            meshes.get_or_upload(renderer, &assets.resolve_model(model))
        });
        match built {
            Ok(mut simulation) => {
                simulation.paused = !self.play_state.is_running();
                self.simulation = Some(simulation);
            }
            Err(err) => log::error!("Scene '{}' is invalid: {err}", self.description.name),
        }
    }

    fn set_play_state(&mut self, state: PlayState, renderer: &mut Renderer) {
        if state == self.play_state {
            return;
        }
        let was_editing = self.play_state == PlayState::Editing;
        self.play_state = state;
        match state {
            PlayState::Editing => {
                log::info!("Simulation stopped");
                self.rebuild(renderer);
            }
            PlayState::Playing if was_editing => {
                log::info!("Simulating '{}'", self.description.name);
                self.rebuild(renderer);
            }
            PlayState::Playing | PlayState::Paused => {
                if let Some(simulation) = &mut self.simulation {
                    simulation.paused = !state.is_running();
                }
            }
        }
    }

    fn save(&mut self) {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH));
        match self.description.save(&path) {
            Ok(()) => {
                log::info!("Saved scene to {}", path.display());
                self.path = Some(path);
            }
            Err(err) => log::error!("Failed to save {}: {err}", path.display()),
        }
    }

    /// Copy the simulated poses into the description.
    fn keep_pose(&mut self) {
        if let Some(simulation) = &self.simulation {
            self.description = simulation.describe();
            log::info!("Kept simulated poses");
        }
    }

    fn open(&mut self, path: PathBuf, renderer: &mut Renderer) {
        match SceneDescription::load(&path) {
            Ok(description) => {
                log::info!("Opened scene '{}' from {}", description.name, path.display());
                self.description = description;
                self.path = Some(path);
                self.selected = None;
                self.play_state = PlayState::Editing;
                let (camera, controller) = self.description.camera.spawn();
                self.camera = Camera {
                    projection: self.camera.projection,
                    ..camera
                };
                self.controller.yaw = controller.yaw;
                self.controller.pitch = controller.pitch;
                self.rebuild(renderer);
            }
            Err(err) => log::error!("Failed to open {}: {err}", path.display()),
        }
    }

    fn entity_list(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (index, entity) in self.description.entities.iter().enumerate() {
                let label = if entity.visible {
                    egui::RichText::new(&entity.name)
                } else {
                    egui::RichText::new(&entity.name).weak()
                };
                if ui
                    .selectable_label(self.selected == Some(index), label)
                    .clicked()
                {
                    self.selected = Some(index);
                }
            }
        });
    }
}

impl AppHandler for Editor {
    fn on_init(&mut self, ctx: &mut AppContext) -> Result<(), AppError> {
        let renderer = ctx.renderer_mut();
        renderer.set_skybox(&CubemapFaces::load(&self.config.assets.skybox_dir));
        self.rebuild(renderer);
        self.camera.set_aspect(ctx.width(), ctx.height());
        Ok(())
    }

    fn on_resize(&mut self, ctx: &mut AppContext) {
        self.camera.set_aspect(ctx.width(), ctx.height());
    }

    fn on_update(&mut self, _ctx: &mut AppContext, dt: f32) -> bool {
        self.controller.update(&mut self.camera, &self.input, dt);
        self.input.reset_deltas();

        if let Some(simulation) = &mut self.simulation {
            if self.play_state != PlayState::Editing {
                simulation.move_camera_capsule(self.camera.position);
                simulation.frame(dt);
            }
        }
        true
    }

    fn on_ui(&mut self, ctx: &mut AppContext, ui_ctx: &egui::Context) {
        let mut next_state = self.play_state;
        let mut reset = false;

        egui::TopBottomPanel::top("toolbar").show(ui_ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(&self.description.name);
                if let Some(path) = &self.path {
                    ui.label(path.display().to_string());
                }
                ui.separator();
                if ui.button("Save").clicked() {
                    self.save();
                }
                ui.separator();
                next_state = draw_play_controls(ui, self.play_state);
                if self.play_state != PlayState::Editing {
                    if ui.button("Keep pose").clicked() {
                        self.keep_pose();
                    }
                    if ui.button("Reset").clicked() {
                        reset = true;
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("{:.0} FPS", ctx.stats().fps()));
                });
            });
        });

        egui::TopBottomPanel::bottom("console")
            .resizable(true)
            .default_height(160.0)
            .show(ui_ctx, |ui| self.console.show(ui));

        egui::SidePanel::left("entities")
            .default_width(180.0)
            .show(ui_ctx, |ui| {
                ui.heading("Entities");
                ui.label(format!(
                    "{} / {}",
                    self.description.entities.len(),
                    self.description.capacity
                ));
                ui.separator();
                self.entity_list(ui);
            });

        let mut edited = false;
        egui::SidePanel::right("inspector")
            .default_width(280.0)
            .show(ui_ctx, |ui| {
                ui.heading("Inspector");
                ui.separator();
                let editing = self.play_state == PlayState::Editing;
                match self
                    .selected
                    .and_then(|index| self.description.entities.get_mut(index))
                {
                    Some(entity) => {
                        ui.add_enabled_ui(editing, |ui| {
                            edited = entity_inspector(ui, entity);
                        });
                    }
                    None => {
                        ui.label("Select an entity, or drop a .ron scene file on the window.");
                    }
                }
            });

        let renderer = ctx.renderer_mut();
        if next_state != self.play_state {
            self.set_play_state(next_state, renderer);
        } else if reset || edited {
            self.rebuild(renderer);
        }
    }

    fn frame_input(&self, _ctx: &AppContext) -> FrameInput {
        FrameInput {
            camera: self.camera.clone(),
            items: self
                .simulation
                .as_ref()
                .map(Simulation::draw_items)
                .unwrap_or_default(),
            lines: Vec::new(),
        }
    }

    fn on_key(&mut self, _ctx: &mut AppContext, key: KeyCode, pressed: bool) {
        apply_camera_key(&mut self.input, key, pressed);
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

    fn on_file_dropped(&mut self, ctx: &mut AppContext, path: PathBuf) {
        if path.extension().is_some_and(|ext| ext == "ron") {
            self.open(path, ctx.renderer_mut());
        } else {
            log::warn!("Ignoring dropped file {}: not a .ron scene", path.display());
        }
    }
}
