//! Application handler trait.

use std::path::PathBuf;

use glam::Vec2;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use super::context::AppContext;
use super::AppError;
use crate::render::FrameInput;

/// Trait for handling application events and producing frames.
///
/// # Lifecycle
///
/// 1. `on_init` - Called once after the window and renderer exist
/// 2. `on_resize` - Called when the window is resized
/// 3. `on_update` - Called every frame with the clamped frame time
/// 4. `on_ui` - Called every frame inside the egui frame
/// 5. `frame_input` - Called every frame for the renderer's draw list
/// 6. `on_shutdown` - Called when the application is closing
pub trait AppHandler {
    /// Upload meshes and set up state that needs the renderer. An error
    /// closes the window and is returned from [`App::run`](super::App::run).
    fn on_init(&mut self, _ctx: &mut AppContext) -> Result<(), AppError> {
        Ok(())
    }

    /// The new size is available in `ctx.width()` and `ctx.height()`.
    fn on_resize(&mut self, _ctx: &mut AppContext) {}

    /// Advance one render frame. Returns `false` to exit.
    fn on_update(&mut self, _ctx: &mut AppContext, _dt: f32) -> bool {
        true
    }

    fn on_ui(&mut self, _ctx: &mut AppContext, _ui: &egui::Context) {}

    /// What to draw this frame.
    fn frame_input(&self, ctx: &AppContext) -> FrameInput;

    /// Key press or release; auto-repeat is filtered out.
    fn on_key(&mut self, _ctx: &mut AppContext, _key: KeyCode, _pressed: bool) {}

    /// Raw mouse motion in pixels, reported even when the cursor is grabbed.
    fn on_mouse_motion(&mut self, _ctx: &mut AppContext, _delta: Vec2) {}

    fn on_mouse_button(&mut self, _ctx: &mut AppContext, _button: MouseButton, _pressed: bool) {}

    /// Vertical wheel movement in lines.
    fn on_scroll(&mut self, _ctx: &mut AppContext, _delta: f32) {}

    fn on_file_dropped(&mut self, _ctx: &mut AppContext, _path: PathBuf) {}

    fn on_shutdown(&mut self, _ctx: &mut AppContext) {}
}
