//! wgpu renderer
//!
//! Draws one frame in a fixed order:
//!
//! 1. lit and unlit meshes, depth test `Less`
//! 2. the skybox, `LessEqual` without depth writes, so it only fills empty pixels
//! 3. physics debug lines, no depth test
//! 4. egui, in its own pass on top

mod lights;
mod mesh;
pub mod shaders;
mod skybox;

pub use lights::*;
pub use mesh::*;
pub use skybox::*;

use std::num::NonZeroU64;
use std::path::PathBuf;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use thiserror::Error;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::egui_integration::EguiIntegration;
use crate::physics::LineVertex;
use crate::scene::description::ModelSource;
use crate::scene::{Camera, ShaderKind, Transform};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("No compatible GPU adapter found")]
    NoAdapter,

    #[error("Failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("Surface supports no texture formats")]
    UnsupportedSurface,

    #[error("Failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("Failed to load model {path}: {source}")]
    ObjLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Failed to load {path}: {reason}")]
    Asset { path: PathBuf, reason: String },
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Handle to a mesh uploaded with [`Renderer::upload_mesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// One mesh to draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub transform: Transform,
    pub color: Vec4,
    pub shader: ShaderKind,
}

/// Everything the renderer needs for a frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub camera: Camera,
    pub items: Vec<DrawItem>,
    /// Line list, two vertices per segment
    pub lines: Vec<LineVertex>,
}

/// Uploads each distinct model once
#[derive(Debug, Default)]
pub struct MeshCache {
    entries: Vec<(ModelSource, MeshId)>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_upload(&mut self, renderer: &mut Renderer, source: &ModelSource) -> MeshId {
        if let Some((_, id)) = self.entries.iter().find(|(s, _)| s == source) {
            return *id;
        }
        let id = renderer.upload_mesh(&Mesh::for_model(source));
        self.entries.push((source.clone(), id));
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub vsync: bool,
    pub clear_color: wgpu::Color,
    pub lighting: Lighting,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
            lighting: Lighting::default(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ModelUniformData {
    model: Mat4,
    normal_matrix: Mat4,
    color: Vec4,
}

impl ModelUniformData {
    fn new(item: &DrawItem) -> Self {
        let transform = item.transform.uniform_data();
        Self {
            model: transform.model,
            normal_matrix: transform.normal_matrix,
            color: item.color,
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Per-draw model uniforms packed at dynamic offsets
struct ModelBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
    stride: u64,
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    clear_color: wgpu::Color,

    camera_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    models: ModelBuffer,
    sky_layout: wgpu::BindGroupLayout,
    sky_bind_group: wgpu::BindGroup,
    line_buffer: Option<(wgpu::Buffer, usize)>,

    lit_pipeline: wgpu::RenderPipeline,
    unlit_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,

    meshes: Vec<GpuMesh>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, settings: &RenderSettings) -> RenderResult<Self> {
        pollster::block_on(Self::new_async(window, settings))
    }

    async fn new_async(window: Arc<Window>, settings: &RenderSettings) -> RenderResult<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Mechanics Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::UnsupportedSurface)?;
        let present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        let (width, height) = clamp_size(&device, size.width, size.height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, width, height);

        // Frame bindings: camera and lights
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<crate::scene::CameraUniformData>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Uniforms"),
            contents: bytemuck::bytes_of(&settings.lighting.uniform_data()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(
                        std::mem::size_of::<ModelUniformData>() as u64
                    ),
                },
                count: None,
            }],
        });
        let models = ModelBuffer::new(&device, &model_layout, 64);

        let sky_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Skybox Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sky_bind_group =
            create_sky_bind_group(&device, &queue, &sky_layout, &CubemapFaces::gradient(16));

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::mesh().into()),
        });
        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::skybox().into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Debug Line Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::lines().into()),
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &model_layout],
            push_constant_ranges: &[],
        });
        let sky_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &sky_layout],
            push_constant_ranges: &[],
        });
        let line_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Debug Line Pipeline Layout"),
            bind_group_layouts: &[&frame_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = |label, fragment_entry| {
            PipelineDesc {
                label,
                layout: &mesh_layout,
                shader: &mesh_shader,
                fragment_entry,
                buffers: &[Vertex::layout()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                depth_compare: wgpu::CompareFunction::Less,
                depth_write: true,
            }
            .build(&device, format)
        };
        let lit_pipeline = mesh_pipeline("Lit Pipeline", "fs_lit");
        let unlit_pipeline = mesh_pipeline("Unlit Pipeline", "fs_unlit");

        let sky_pipeline = PipelineDesc {
            label: "Skybox Pipeline",
            layout: &sky_pipeline_layout,
            shader: &sky_shader,
            fragment_entry: "fs_main",
            buffers: &[],
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            depth_compare: wgpu::CompareFunction::LessEqual,
            depth_write: false,
        }
        .build(&device, format);

        let line_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4],
        };
        let line_pipeline = PipelineDesc {
            label: "Debug Line Pipeline",
            layout: &line_layout,
            shader: &line_shader,
            fragment_entry: "fs_main",
            buffers: &[line_vertex_layout],
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            depth_compare: wgpu::CompareFunction::Always,
            depth_write: false,
        }
        .build(&device, format);

        log::info!("Renderer ready: {width}x{height}, {format:?}, {present_mode:?}");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            clear_color: settings.clear_color,
            camera_buffer,
            frame_bind_group,
            model_layout,
            models,
            sky_layout,
            sky_bind_group,
            line_buffer: None,
            lit_pipeline,
            unlit_pipeline,
            sky_pipeline,
            line_pipeline,
            meshes: Vec::new(),
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current surface size, which may be smaller than the window
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface, clamped to the device's texture limit.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) = clamp_size(&self.device, width, height);
        if (width, height) != (self.config.width, self.config.height) {
            log::debug!("Resizing surface to {width}x{height}");
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    pub fn upload_mesh(&mut self, mesh: &Mesh) -> MeshId {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertices", mesh.name)),
                contents: mesh.vertex_bytes(),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Indices", mesh.name)),
                contents: mesh.index_bytes(),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        });
        log::debug!(
            "Uploaded mesh '{}' ({} triangles)",
            mesh.name,
            mesh.triangle_count()
        );
        MeshId(self.meshes.len() - 1)
    }

    pub fn set_skybox(&mut self, faces: &CubemapFaces) {
        self.sky_bind_group =
            create_sky_bind_group(&self.device, &self.queue, &self.sky_layout, faces);
    }

    pub fn render(
        &mut self,
        frame: &FrameInput,
        egui: Option<&mut EguiIntegration>,
    ) -> RenderResult<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring a frame, skipping it");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&frame.camera.uniform_data()),
        );
        self.write_models(&frame.items);
        self.write_lines(&frame.lines);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for (slot, item) in frame.items.iter().enumerate() {
                let pipeline = match item.shader {
                    ShaderKind::Lit => &self.lit_pipeline,
                    ShaderKind::Unlit => &self.unlit_pipeline,
                    ShaderKind::Skybox => continue,
                };
                let Some(mesh) = self.meshes.get(item.mesh.0) else {
                    continue;
                };
                if mesh.index_count == 0 {
                    continue;
                }
                let offset = (slot as u64 * self.models.stride) as u32;
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, &self.models.bind_group, &[offset]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            pass.set_pipeline(&self.sky_pipeline);
            pass.set_bind_group(1, &self.sky_bind_group, &[]);
            pass.draw(0..3, 0..1);

            if let Some((buffer, _)) = &self.line_buffer {
                if !frame.lines.is_empty() {
                    pass.set_pipeline(&self.line_pipeline);
                    pass.set_vertex_buffer(0, buffer.slice(..));
                    pass.draw(0..frame.lines.len() as u32, 0..1);
                }
            }
        }

        let mut extra = Vec::new();
        if let Some(egui) = egui {
            extra = egui.paint(
                &self.device,
                &self.queue,
                &mut encoder,
                &view,
                [self.config.width, self.config.height],
            );
        }

        self.queue
            .submit(extra.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        Ok(())
    }

    fn write_models(&mut self, items: &[DrawItem]) {
        if items.len() > self.models.capacity {
            let capacity = items.len().next_power_of_two();
            log::debug!("Growing model uniform buffer to {capacity} slots");
            self.models = ModelBuffer::new(&self.device, &self.model_layout, capacity);
        }
        let stride = self.models.stride as usize;
        let mut bytes = vec![0u8; items.len() * stride];
        for (chunk, item) in bytes.chunks_exact_mut(stride).zip(items) {
            let data = ModelUniformData::new(item);
            chunk[..std::mem::size_of::<ModelUniformData>()]
                .copy_from_slice(bytemuck::bytes_of(&data));
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.models.buffer, 0, &bytes);
        }
    }

    fn write_lines(&mut self, lines: &[LineVertex]) {
        if lines.is_empty() {
            return;
        }
        let fits = self
            .line_buffer
            .as_ref()
            .is_some_and(|(_, capacity)| *capacity >= lines.len());
        if !fits {
            let capacity = lines.len().next_power_of_two();
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Debug Lines"),
                size: (capacity * std::mem::size_of::<LineVertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.line_buffer = Some((buffer, capacity));
        }
        if let Some((buffer, _)) = &self.line_buffer {
            self.queue
                .write_buffer(buffer, 0, bytemuck::cast_slice(lines));
        }
    }
}

impl ModelBuffer {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: usize) -> Self {
        let stride = align_to(
            std::mem::size_of::<ModelUniformData>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: stride * capacity.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ModelUniformData>() as u64),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            capacity: capacity.max(1),
            stride,
        }
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    fragment_entry: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    depth_compare: wgpu::CompareFunction,
    depth_write: bool,
}

impl PipelineDesc<'_> {
    fn build(&self, device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(self.layout),
            vertex: wgpu::VertexState {
                module: self.shader,
                entry_point: "vs_main",
                compilation_options: Default::default(),
                buffers: self.buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: self.shader,
                entry_point: self.fragment_entry,
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: self.topology,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: self.cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: self.depth_write,
                depth_compare: self.depth_compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }
}

fn align_to(value: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}

/// Fit the size within the device's texture limit, keeping the aspect ratio.
fn clamp_size(device: &wgpu::Device, width: u32, height: u32) -> (u32, u32) {
    fit_within(width, height, device.limits().max_texture_dimension_2d)
}

fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width.max(1), height.max(1));
    }
    let scale = (max as f32 / width as f32).min(max as f32 / height as f32);
    (
        ((width as f32 * scale) as u32).clamp(1, max),
        ((height as f32 * scale) as u32).clamp(1, max),
    )
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_sky_bind_group(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    faces: &CubemapFaces,
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d {
        width: faces.size,
        height: faces.size,
        depth_or_array_layers: 6,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Skybox"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    for (layer, pixels) in faces.faces.iter().enumerate() {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * faces.size),
                rows_per_image: Some(faces.size),
            },
            wgpu::Extent3d {
                width: faces.size,
                height: faces.size,
                depth_or_array_layers: 1,
            },
        );
    }
    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Skybox View"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Skybox Sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Skybox Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::fits(1920, 1080, 8192, (1920, 1080))]
    #[case::too_wide(16384, 1024, 8192, (8192, 512))]
    #[case::zero(0, 0, 8192, (1, 1))]
    fn surface_size_is_clamped(
        #[case] width: u32,
        #[case] height: u32,
        #[case] max: u32,
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(fit_within(width, height, max), expected);
    }

    #[rstest]
    #[case::model_uniform(144, 256, 256)]
    #[case::exact(256, 256, 256)]
    #[case::small_alignment(144, 16, 144)]
    fn uniform_stride_alignment(#[case] size: u64, #[case] alignment: u64, #[case] stride: u64) {
        assert_eq!(align_to(size, alignment), stride);
    }

    #[test]
    fn model_uniform_matches_shader_struct() {
        assert_eq!(std::mem::size_of::<ModelUniformData>(), 144);
    }
}
