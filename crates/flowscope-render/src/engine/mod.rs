//! The offscreen wgpu renderer.

mod capture;
pub mod draw;
mod pipelines;

use pollster::FutureExt;
use wgpu::util::DeviceExt;

use flowscope_core::Scene;

use crate::camera::PerspectiveCamera;
use crate::error::{RenderError, RenderResult};
use crate::renderer::{RendererInfo, SceneRenderer};

pub use draw::{FrameGeometry, FrameUniforms, LightRig, LineVertex, MeshVertex, MAX_POINT_LIGHTS};

/// Multisample count used for antialiasing.
pub const SAMPLE_COUNT: u32 = 4;
/// Format of the resolved color target.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Size-dependent render targets.
struct RenderTargets {
    msaa_view: wgpu::TextureView,
    resolve_texture: wgpu::Texture,
    resolve_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

impl RenderTargets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let msaa = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color texture"),
            size,
            mip_level_count: 1,
            sample_count: SAMPLE_COUNT,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let resolve_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("resolved color texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size,
            mip_level_count: 1,
            sample_count: SAMPLE_COUNT,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            msaa_view: msaa.create_view(&wgpu::TextureViewDescriptor::default()),
            resolve_view: resolve_texture.create_view(&wgpu::TextureViewDescriptor::default()),
            resolve_texture,
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
        }
    }
}

/// GPU objects. Dropped as a whole on dispose or context loss.
struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    targets: RenderTargets,
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

/// Renders scenes into an offscreen, multisampled color target.
pub struct WgpuRenderer {
    gpu: Option<GpuState>,
    backend: String,
    width: u32,
    height: u32,
    frames_rendered: u64,
    context_lost: bool,
}

impl std::fmt::Debug for WgpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuRenderer")
            .field("backend", &self.backend)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frames_rendered", &self.frames_rendered)
            .field("context_lost", &self.context_lost)
            .finish_non_exhaustive()
    }
}

impl WgpuRenderer {
    /// Creates a new headless renderer.
    pub async fn new_headless(width: u32, height: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::ZeroSizedViewport { width, height });
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("flowscope device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let backend = format!("{:?}", adapter.get_info().backend);
        log::info!("created headless renderer {width}x{height} on {backend}");

        let layout = pipelines::create_frame_bind_group_layout(&device);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame uniforms"),
            contents: bytemuck::cast_slice(&[FrameUniforms::new(
                &PerspectiveCamera::default(),
                &LightRig::default(),
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame bind group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let gpu = GpuState {
            targets: RenderTargets::new(&device, width, height),
            mesh_pipeline: pipelines::create_mesh_pipeline(&device, &layout),
            line_pipeline: pipelines::create_line_pipeline(&device, &layout),
            uniform_buffer,
            uniform_bind_group,
            device,
            queue,
        };

        Ok(Self {
            gpu: Some(gpu),
            backend,
            width,
            height,
            frames_rendered: 0,
            context_lost: false,
        })
    }

    /// Blocking variant of [`WgpuRenderer::new_headless`].
    pub fn headless(width: u32, height: u32) -> RenderResult<Self> {
        Self::new_headless(width, height).block_on()
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn gpu(&self) -> RenderResult<&GpuState> {
        self.gpu.as_ref().ok_or(RenderError::ContextLost)
    }

    fn upload_vertices<T: bytemuck::Pod>(
        device: &wgpu::Device,
        label: &str,
        vertices: &[T],
    ) -> Option<wgpu::Buffer> {
        (!vertices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        })
    }
}

fn vertex_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl SceneRenderer for WgpuRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.targets = RenderTargets::new(&gpu.device, width, height);
        }
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> RenderResult<()> {
        let frame = FrameGeometry::collect(scene);
        let gpu = self.gpu()?;

        let uniforms = FrameUniforms::new(camera, &frame.lights);
        gpu.queue
            .write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let triangles = Self::upload_vertices(&gpu.device, "mesh vertices", &frame.triangles);
        let lines = Self::upload_vertices(&gpu.device, "line vertices", &frame.lines);

        let background = scene.background();
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &gpu.targets.msaa_view,
                    resolve_target: Some(&gpu.targets.resolve_view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(background.r),
                            g: f64::from(background.g),
                            b: f64::from(background.b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Discard,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &gpu.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            render_pass.set_bind_group(0, &gpu.uniform_bind_group, &[]);
            if let Some(buffer) = &triangles {
                render_pass.set_pipeline(&gpu.mesh_pipeline);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..vertex_count(frame.triangles.len()), 0..1);
            }
            if let Some(buffer) = &lines {
                render_pass.set_pipeline(&gpu.line_pipeline);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..vertex_count(frame.lines.len()), 0..1);
            }
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));

        self.frames_rendered += 1;
        Ok(())
    }

    fn force_context_loss(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.device.destroy();
            self.context_lost = true;
            log::debug!("forced context loss on {}", self.backend);
        }
    }

    fn dispose(&mut self) {
        self.gpu = None;
    }

    fn describe(&self) -> RendererInfo {
        RendererInfo {
            backend: self.backend.clone(),
            width: self.width,
            height: self.height,
            sample_count: SAMPLE_COUNT,
            frames_rendered: self.frames_rendered,
            context_lost: self.context_lost,
        }
    }
}
