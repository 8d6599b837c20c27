use crate::board::Whiteboard;
use crate::config::BoardConfig;
use crate::geometry::Point;
use crate::renderer::Surface as _;
use crate::tessellate::{MeshSurface, Vertex};
use crate::text::measure_from_config;
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::keyboard::ModifiersState;
use winit::window::Window;

const BLINK_INTERVAL: Duration = Duration::from_millis(500);

impl Vertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenUniforms {
    pub screen_size: [f32; 2],
    pub _padding: [f32; 2],
}

impl ScreenUniforms {
    fn new(size: PhysicalSize<u32>) -> Self {
        Self {
            screen_size: [size.width as f32, size.height as f32],
            _padding: [0.0, 0.0],
        }
    }
}

pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub render_pipeline: wgpu::RenderPipeline,
    pub screen_buffer: wgpu::Buffer,
    pub screen_bind_group: wgpu::BindGroup,
}

#[derive(Default)]
pub struct GeometryBuffers {
    pub vertex: Option<wgpu::Buffer>,
    pub index: Option<wgpu::Buffer>,
    pub count: u32,
}

/// Host-side text input shown in place of the element being written.
pub struct TextInput {
    pub element: Option<crate::element::ElementId>,
    pub position: Point,
    pub buffer: String,
    pub cursor_visible: bool,
    pub blink_timer: Instant,
}

impl TextInput {
    pub fn touch(&mut self) {
        self.cursor_visible = true;
        self.blink_timer = Instant::now();
    }
}

pub struct State {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,
    pub gpu: GpuContext,
    pub geometry: GeometryBuffers,
    pub canvas: MeshSurface,
    pub board: Whiteboard,
    pub typing: TextInput,
    pub mouse_pos: Point,
    pub modifiers: ModifiersState,
}

impl State {
    pub async fn new(window: Arc<Window>, config: &BoardConfig) -> anyhow::Result<State> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("requesting graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let screen_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen Uniform Buffer"),
            contents: bytemuck::cast_slice(&[ScreenUniforms::new(size)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let screen_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("screen_bind_group_layout"),
        });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &screen_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_buffer.as_entire_binding(),
            }],
            label: Some("screen_bind_group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../data/shaders/draw_shader.wgsl").into()),
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&screen_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Segment quads and cap fans come in either winding.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let (measure, font) = measure_from_config(config.font_path.as_deref());
        log::info!(
            "Surface {}x{} ({:?}), text via {}",
            size.width,
            size.height,
            surface_format,
            if font.is_some() { "font" } else { "approximate metrics" }
        );

        Ok(Self {
            window,
            size,
            gpu: GpuContext {
                surface,
                device,
                queue,
                config: surface_config,
                render_pipeline,
                screen_buffer,
                screen_bind_group,
            },
            geometry: GeometryBuffers::default(),
            canvas: MeshSurface::new(config.stroke_width, font),
            board: Whiteboard::with_measure(config, measure),
            typing: TextInput {
                element: None,
                position: [0.0; 2],
                buffer: String::new(),
                cursor_visible: false,
                blink_timer: Instant::now(),
            },
            mouse_pos: [0.0; 2],
            modifiers: ModifiersState::empty(),
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.gpu.config.width = new_size.width;
            self.gpu.config.height = new_size.height;
            self.gpu.surface.configure(&self.gpu.device, &self.gpu.config);
            self.gpu.queue.write_buffer(
                &self.gpu.screen_buffer,
                0,
                bytemuck::cast_slice(&[ScreenUniforms::new(new_size)]),
            );
        }
    }

    /// Syncs the text input with the board, then rebuilds the frame mesh.
    pub fn update(&mut self) {
        match self.board.text_overlay() {
            Some(overlay) if self.typing.element != Some(overlay.id) => {
                log::debug!("text input opened for {}", overlay.id);
                self.typing.element = Some(overlay.id);
                self.typing.position = overlay.position;
                self.typing.buffer = overlay.text;
                self.typing.touch();
            }
            Some(_) => {
                if self.typing.blink_timer.elapsed() > BLINK_INTERVAL {
                    self.typing.cursor_visible = !self.typing.cursor_visible;
                    self.typing.blink_timer = Instant::now();
                }
            }
            None => {
                self.typing.element = None;
                self.typing.buffer.clear();
            }
        }

        self.board.render(&mut self.canvas);
        if self.typing.element.is_some() {
            let mut display_text = self.typing.buffer.clone();
            if self.typing.cursor_visible {
                display_text.push('|');
            }
            self.canvas
                .draw_text(&display_text, self.typing.position, self.board.font_size());
        }
        self.update_buffers();
    }

    fn update_buffers(&mut self) {
        let mesh = &self.canvas.mesh;
        if mesh.is_empty() {
            self.geometry = GeometryBuffers::default();
            return;
        }

        self.geometry.vertex = Some(self.gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.geometry.index = Some(self.gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        self.geometry.count = mesh.indices.len() as u32;
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.gpu.render_pipeline);
            render_pass.set_bind_group(0, &self.gpu.screen_bind_group, &[]);

            if let (Some(vertex_buffer), Some(index_buffer)) = (&self.geometry.vertex, &self.geometry.index) {
                render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.geometry.count, 0, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
