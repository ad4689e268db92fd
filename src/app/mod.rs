//! Application framework
//!
//! [`App::run`] owns the window, renderer and egui state and drives an
//! [`AppHandler`] from the winit event loop. Each redraw:
//!
//! 1. measures and clamps the frame time
//! 2. calls `on_update`
//! 3. runs the egui frame around `on_ui`
//! 4. renders `frame_input` with the UI on top

mod context;
mod handler;
mod input;

pub use context::{AppContext, FrameStats};
pub use handler::AppHandler;
pub use input::apply_camera_key;

use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use thiserror::Error;
use winit::dpi::PhysicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{DeviceEvent, ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::config::{ConfigError, DemoConfig};
use crate::egui_integration::EguiIntegration;
use crate::render::{RenderError, RenderResult, RenderSettings, Renderer};
use crate::scene::SceneError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] EventLoopError),

    #[error("Failed to create window: {0}")]
    Window(#[from] OsError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Clamp a measured frame time to `[0, max]`; non-finite times count as zero.
pub fn clamp_frame_time(dt: f32, max: f32) -> f32 {
    if !dt.is_finite() || dt < 0.0 {
        return 0.0;
    }
    dt.min(max.max(0.0))
}

pub struct App;

impl App {
    /// Open the window and run `handler` until it exits or the window closes.
    pub fn run<H: AppHandler>(mut handler: H, config: &DemoConfig) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(&config.window.title)
                .with_inner_size(PhysicalSize::new(config.window.width, config.window.height))
                .build(&event_loop)?,
        );

        let settings = RenderSettings {
            vsync: config.window.vsync,
            ..Default::default()
        };
        let renderer = Renderer::new(Arc::clone(&window), &settings)?;
        let mut egui = EguiIntegration::new(&renderer, &window);

        let size = window.inner_size();
        egui.set_surface_scale((size.width, size.height), renderer.size());
        let mut ctx = AppContext {
            window: Arc::clone(&window),
            renderer,
            width: size.width,
            height: size.height,
            frame_number: 0,
            delta_time: 0.0,
            elapsed_time: 0.0,
            cursor_grabbed: false,
            stats: FrameStats::default(),
        };
        handler.on_init(&mut ctx)?;

        let max_frame_time = config.physics.max_frame_time;
        let max_frames = config.window.max_frames;
        let start_time = Instant::now();
        let mut last_frame_time = start_time;
        let mut failure = None;

        event_loop.run(|event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => {
                    let consumed = egui.on_window_event(&window, &event);

                    match event {
                        WindowEvent::CloseRequested => {
                            log::info!("Close requested");
                            handler.on_shutdown(&mut ctx);
                            elwt.exit();
                        }

                        WindowEvent::Resized(size) => {
                            if size.width == 0 || size.height == 0 {
                                return;
                            }
                            ctx.width = size.width;
                            ctx.height = size.height;
                            ctx.renderer.resize(size.width, size.height);
                            egui.set_surface_scale(
                                (size.width, size.height),
                                ctx.renderer.size(),
                            );
                            handler.on_resize(&mut ctx);
                        }

                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(code),
                                    state,
                                    repeat,
                                    ..
                                },
                            ..
                        } => {
                            let pressed = state == ElementState::Pressed;
                            if code == KeyCode::Escape && pressed {
                                log::info!("Escape pressed, exiting");
                                handler.on_shutdown(&mut ctx);
                                elwt.exit();
                            } else if !repeat && !(consumed && pressed) {
                                handler.on_key(&mut ctx, code, pressed);
                            }
                        }

                        WindowEvent::MouseInput { state, button, .. } => {
                            let pressed = state == ElementState::Pressed;
                            if !(consumed && pressed) {
                                handler.on_mouse_button(&mut ctx, button, pressed);
                            }
                        }

                        WindowEvent::MouseWheel { delta, .. } if !consumed => {
                            let dy = match delta {
                                MouseScrollDelta::LineDelta(_, y) => y,
                                MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                            };
                            handler.on_scroll(&mut ctx, dy);
                        }

                        WindowEvent::DroppedFile(path) => {
                            log::info!("File dropped: {}", path.display());
                            handler.on_file_dropped(&mut ctx, path);
                        }

                        WindowEvent::RedrawRequested => {
                            let now = Instant::now();
                            let measured = now.duration_since(last_frame_time).as_secs_f32();
                            last_frame_time = now;
                            ctx.delta_time = clamp_frame_time(measured, max_frame_time);
                            ctx.elapsed_time = now.duration_since(start_time).as_secs_f32();
                            ctx.stats.push(measured);

                            match render_frame(&mut handler, &mut ctx, &mut egui) {
                                Ok(true) => {}
                                Ok(false) => {
                                    handler.on_shutdown(&mut ctx);
                                    elwt.exit();
                                    return;
                                }
                                Err(err) => {
                                    log::error!("Render failed: {err}");
                                    failure = Some(AppError::Render(err));
                                    elwt.exit();
                                    return;
                                }
                            }

                            ctx.frame_number += 1;
                            if let Some(max_frames) = max_frames {
                                if ctx.frame_number >= max_frames {
                                    log::info!("Reached max frames limit ({max_frames}), exiting");
                                    handler.on_shutdown(&mut ctx);
                                    elwt.exit();
                                }
                            }
                        }

                        _ => {}
                    }
                }

                Event::DeviceEvent {
                    event: DeviceEvent::MouseMotion { delta: (dx, dy) },
                    ..
                } => {
                    handler.on_mouse_motion(&mut ctx, Vec2::new(dx as f32, dy as f32));
                }

                Event::AboutToWait => {
                    window.request_redraw();
                }

                _ => {}
            }
        })?;

        failure.map_or(Ok(()), Err)
    }
}

/// Update, build the UI and draw one frame. Returns `false` if the handler
/// asked to exit.
fn render_frame<H: AppHandler>(
    handler: &mut H,
    ctx: &mut AppContext,
    egui: &mut EguiIntegration,
) -> RenderResult<bool> {
    let dt = ctx.delta_time;
    if !handler.on_update(ctx, dt) {
        return Ok(false);
    }

    let window = Arc::clone(&ctx.window);
    egui.begin_frame(&window);
    let ui = egui.context().clone();
    handler.on_ui(ctx, &ui);
    egui.end_frame(&window);

    let frame = handler.frame_input(ctx);
    ctx.renderer.render(&frame, Some(egui))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::normal(0.016, 0.25, 0.016)]
    #[case::stall(3.0, 0.25, 0.25)]
    #[case::negative(-0.5, 0.25, 0.0)]
    #[case::nan(f32::NAN, 0.25, 0.0)]
    #[case::infinite(f32::INFINITY, 0.25, 0.0)]
    fn frame_time_is_clamped(#[case] dt: f32, #[case] max: f32, #[case] expected: f32) {
        assert_eq!(clamp_frame_time(dt, max), expected);
    }
}
