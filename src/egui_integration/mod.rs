//! egui integration
//!
//! egui-winit turns window events into egui input, egui-wgpu paints the
//! tessellated output onto the swapchain image after the scene.

use egui::ViewportId;
use egui_wgpu::ScreenDescriptor;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::render::Renderer;

pub struct EguiIntegration {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    /// Surface size over window size; below one when the surface was clamped
    input_scale: f32,
}

impl EguiIntegration {
    pub fn new(renderer: &Renderer, window: &Window) -> Self {
        let ctx = egui::Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            renderer.device(),
            renderer.surface_format(),
            None,
            1,
        );

        Self {
            ctx,
            winit_state,
            renderer,
            paint_jobs: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            input_scale: 1.0,
        }
    }

    /// Match pointer coordinates to a surface that is smaller than the window.
    pub fn set_surface_scale(&mut self, window_size: (u32, u32), surface_size: (u32, u32)) {
        if window_size.0 == 0 || window_size.1 == 0 {
            return;
        }
        let scale_x = surface_size.0 as f32 / window_size.0 as f32;
        let scale_y = surface_size.1 as f32 / window_size.1 as f32;
        self.input_scale = scale_x.min(scale_y);
    }

    /// Feed a window event to egui. Returns true if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let scaled = match event {
            WindowEvent::CursorMoved {
                device_id,
                position,
            } if self.input_scale != 1.0 => Some(WindowEvent::CursorMoved {
                device_id: *device_id,
                position: winit::dpi::PhysicalPosition::new(
                    position.x * self.input_scale as f64,
                    position.y * self.input_scale as f64,
                ),
            }),
            _ => None,
        };
        self.winit_state
            .on_window_event(window, scaled.as_ref().unwrap_or(event))
            .consumed
    }

    pub fn begin_frame(&mut self, window: &Window) {
        let mut raw_input = self.winit_state.take_egui_input(window);
        if self.input_scale != 1.0 {
            if let Some(rect) = &mut raw_input.screen_rect {
                rect.max.x *= self.input_scale;
                rect.max.y *= self.input_scale;
            }
        }
        self.ctx.begin_frame(raw_input);
    }

    pub fn end_frame(&mut self, window: &Window) {
        let output = self.ctx.end_frame();
        self.winit_state
            .handle_platform_output(window, output.platform_output);
        self.paint_jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        self.textures_delta.append(output.textures_delta);
    }

    /// Record the UI pass on top of `view`.
    ///
    /// Returns extra command buffers that must be submitted before `encoder`.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) -> Vec<wgpu::CommandBuffer> {
        let screen = ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: self.ctx.pixels_per_point(),
        };

        for (id, delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        let commands = self
            .renderer
            .update_buffers(device, queue, encoder, &self.paint_jobs, &screen);

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.render(&mut pass, &self.paint_jobs, &screen);
        }

        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }
        self.textures_delta = egui::TexturesDelta::default();
        commands
    }

    pub fn context(&self) -> &egui::Context {
        &self.ctx
    }

    pub fn wants_keyboard_input(&self) -> bool {
        self.ctx.wants_keyboard_input()
    }

    pub fn wants_pointer_input(&self) -> bool {
        self.ctx.wants_pointer_input()
    }
}
