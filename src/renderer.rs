use glam::{Mat4, Vec3};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::core::gpu_context::GpuContext;
use crate::panel::{self, PanelInfo};
use crate::scene::{hex_to_rgb, AmbientLight, SHADOW_MAP_SIZE};
use crate::types::{
    wireframe_indices, Globals, LineUniform, LineVertex, MeshVertex, ModelUniform,
    SelectionVertex,
};
use crate::viewer::{FrameUpdate, Viewer};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const HIGHLIGHT_COLOR: u32 = 0xff9800;
const LASSO_COLOR: u32 = 0xff9800;
const HELPER_COLOR: u32 = 0x00ff88;

/// Orthographic shadow camera bounds around the light target
const SHADOW_EXTENT: f32 = 5.0;
const SHADOW_NEAR: f32 = 0.5;
const SHADOW_FAR: f32 = 500.0;

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// `0xRRGGBB` sRGB color converted for a linear shader output
fn linear_rgb(hex: u32) -> [f32; 3] {
    hex_to_rgb(hex).map(srgb_to_linear)
}

/// A dynamic line list with its own transform/color uniform
struct LineBatch {
    label: &'static str,
    vertices: Option<wgpu::Buffer>,
    count: u32,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl LineBatch {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &'static str) -> Self {
        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<LineUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
            label: Some(label),
        });

        Self {
            label,
            vertices: None,
            count: 0,
            uniform,
            bind_group,
        }
    }

    /// Replace the vertex buffer; an empty list draws nothing
    fn upload(&mut self, device: &wgpu::Device, points: &[Vec3]) {
        self.count = points.len() as u32;
        self.vertices = (!points.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(self.label),
                contents: bytemuck::cast_slice(&LineVertex::from_points(points)),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });
    }

    fn write_uniform(&self, queue: &wgpu::Queue, uniform: LineUniform) {
        queue.write_buffer(&self.uniform, 0, bytemuck::cast_slice(&[uniform]));
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if let Some(vertices) = &self.vertices {
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, vertices.slice(..));
            pass.draw(0..self.count, 0..1);
        }
    }
}

struct Pipelines {
    shadow: wgpu::RenderPipeline,
    mesh: wgpu::RenderPipeline,
    wireframe: wgpu::RenderPipeline,
    helper: wgpu::RenderPipeline,
    lasso: wgpu::RenderPipeline,
}

pub struct Renderer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    _shadow_view: wgpu::TextureView,
    shadow_target: wgpu::TextureView,
    pipelines: Pipelines,
    globals_buffer: wgpu::Buffer,
    model_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    model_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    selection_buffer: wgpu::Buffer,
    wire_index_buffer: wgpu::Buffer,
    vertex_count: u32,
    wire_index_count: u32,
    helper_lines: LineBatch,
    lasso_lines: LineBatch,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    show_ui: bool,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, viewer: &Viewer, show_ui: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let gpu = GpuContext::new_with_surface(&instance, &surface).await?;
        let device = gpu.device();

        let config = Self::create_surface_config(&surface, gpu.adapter(), size);
        surface.configure(device, &config);

        let mesh = viewer
            .scene
            .mesh(viewer.handles.mesh)
            .ok_or("Scene has no mesh node")?;
        let geometry = mesh.geometry();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertices"),
            contents: bytemuck::cast_slice(&MeshVertex::from_geometry(geometry)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let selection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Selection Weights"),
            contents: bytemuck::cast_slice(&SelectionVertex::weights(
                viewer.selected(),
                geometry.vertex_count(),
            )),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let wire_indices = wireframe_indices(geometry.triangle_count());
        let wire_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wireframe Indices"),
            contents: bytemuck::cast_slice(&wire_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Buffer"),
            size: std::mem::size_of::<ModelUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shadow_size = viewer
            .scene
            .directional_lights()
            .next()
            .map_or(SHADOW_MAP_SIZE, |(_, light)| light.shadow_map_size);
        let (shadow_target, shadow_view) = Self::create_shadow_map(device, shadow_size);
        let depth_view = Self::create_depth_texture(device, &config);

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
            label: Some("scene_bind_group_layout"),
        });
        let single_uniform_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_entry(0)],
                label: Some("uniform_bind_group_layout"),
            });

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
            label: Some("scene_bind_group"),
        });
        let shadow_bind_group = Self::uniform_bind_group(
            device,
            &single_uniform_layout,
            &globals_buffer,
            "shadow_bind_group",
        );
        let model_bind_group = Self::uniform_bind_group(
            device,
            &single_uniform_layout,
            &model_buffer,
            "model_bind_group",
        );

        let pipelines = Self::create_pipelines(
            device,
            config.format,
            &scene_layout,
            &single_uniform_layout,
            mesh.material.polygon_offset.then_some((
                mesh.material.polygon_offset_factor,
                mesh.material.polygon_offset_units,
            )),
        );

        let mut helper_lines = LineBatch::new(device, &single_uniform_layout, "BVH Helper Lines");
        if let Some(helper) = viewer.handles.helper.and_then(|id| viewer.scene.helper(id)) {
            helper_lines.upload(device, helper.segments());
        }
        let lasso_lines = LineBatch::new(device, &single_uniform_layout, "Lasso Lines");

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(device, config.format, egui_wgpu::RendererOptions::default());

        log::info!(
            "Renderer initialized: {}x{}, {:?}, {} vertices",
            config.width,
            config.height,
            config.format,
            geometry.vertex_count()
        );

        Ok(Self {
            vertex_count: geometry.vertex_count() as u32,
            wire_index_count: wire_indices.len() as u32,
            gpu,
            surface,
            config,
            depth_view,
            _shadow_view: shadow_view,
            shadow_target,
            pipelines,
            globals_buffer,
            model_buffer,
            scene_bind_group,
            shadow_bind_group,
            model_bind_group,
            vertex_buffer,
            selection_buffer,
            wire_index_buffer,
            helper_lines,
            lasso_lines,
            egui_renderer,
            egui_state,
            egui_ctx,
            show_ui,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Returns (render target view, sampled view) of one shadow texture
    fn create_shadow_map(
        device: &wgpu::Device,
        size: u32,
    ) -> (wgpu::TextureView, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let target = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampled = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (target, sampled)
    }

    fn uniform_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(label),
        })
    }

    fn create_pipelines(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        scene_layout: &wgpu::BindGroupLayout,
        uniform_layout: &wgpu::BindGroupLayout,
        polygon_offset: Option<(f32, f32)>,
    ) -> Pipelines {
        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shadow.wgsl").into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/line.wgsl").into()),
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[scene_layout, uniform_layout],
            push_constant_ranges: &[],
        });
        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[uniform_layout, uniform_layout],
            push_constant_ranges: &[],
        });
        let line_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Line Pipeline Layout"),
            bind_group_layouts: &[uniform_layout],
            push_constant_ranges: &[],
        });

        let depth = |write: bool, compare: wgpu::CompareFunction, bias: wgpu::DepthBiasState| {
            Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: write,
                depth_compare: compare,
                stencil: wgpu::StencilState::default(),
                bias,
            })
        };
        let primitive = |topology: wgpu::PrimitiveTopology| wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        };
        let color_target = [Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];
        let mesh_buffers = [MeshVertex::layout(), SelectionVertex::layout()];
        let line_buffers = [LineVertex::layout()];

        // Polygon offset pushes the surface back so overlay lines win depth ties
        let surface_bias = polygon_offset
            .map(|(factor, units)| wgpu::DepthBiasState {
                constant: units as i32,
                slope_scale: factor,
                clamp: 0.0,
            })
            .unwrap_or_default();

        let mesh_pipeline = |label: &str,
                             topology: wgpu::PrimitiveTopology,
                             bias: wgpu::DepthBiasState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&mesh_layout),
                vertex: wgpu::VertexState {
                    module: &mesh_shader,
                    entry_point: Some("vs_main"),
                    buffers: &mesh_buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &mesh_shader,
                    entry_point: Some("fs_main"),
                    targets: &color_target,
                    compilation_options: Default::default(),
                }),
                primitive: primitive(topology),
                depth_stencil: depth(true, wgpu::CompareFunction::Less, bias),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let line_pipeline = |label: &str, compare: wgpu::CompareFunction| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&line_layout),
                vertex: wgpu::VertexState {
                    module: &line_shader,
                    entry_point: Some("vs_main"),
                    buffers: &line_buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &line_shader,
                    entry_point: Some("fs_main"),
                    targets: &color_target,
                    compilation_options: Default::default(),
                }),
                primitive: primitive(wgpu::PrimitiveTopology::LineList),
                depth_stencil: depth(false, compare, wgpu::DepthBiasState::default()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let shadow = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&shadow_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: primitive(wgpu::PrimitiveTopology::TriangleList),
            depth_stencil: depth(
                true,
                wgpu::CompareFunction::LessEqual,
                wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            ),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Pipelines {
            shadow,
            mesh: mesh_pipeline(
                "Mesh Pipeline",
                wgpu::PrimitiveTopology::TriangleList,
                surface_bias,
            ),
            wireframe: mesh_pipeline(
                "Wireframe Pipeline",
                wgpu::PrimitiveTopology::LineList,
                wgpu::DepthBiasState::default(),
            ),
            helper: line_pipeline("Helper Pipeline", wgpu::CompareFunction::LessEqual),
            lasso: line_pipeline("Lasso Pipeline", wgpu::CompareFunction::Always),
        }
    }

    /// Reconfigure the surface and depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(self.gpu.device(), &self.config);
        self.depth_view = Self::create_depth_texture(self.gpu.device(), &self.config);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Upload whatever `update` flags as changed
    fn sync(&mut self, viewer: &Viewer, update: FrameUpdate) {
        let device = self.gpu.device();

        if update.selection_changed {
            if let Some(mesh) = viewer.scene.mesh(viewer.handles.mesh) {
                let weights =
                    SelectionVertex::weights(viewer.selected(), mesh.geometry().vertex_count());
                self.gpu
                    .queue()
                    .write_buffer(&self.selection_buffer, 0, bytemuck::cast_slice(&weights));
            }
        }

        if update.helper_rebuilt {
            if let Some(helper) = viewer.handles.helper.and_then(|id| viewer.scene.helper(id)) {
                self.helper_lines.upload(device, helper.segments());
            }
        }

        if update.lasso_rebuilt {
            if let Some(lasso) = viewer.handles.lasso.and_then(|id| viewer.scene.lasso(id)) {
                self.lasso_lines.upload(device, lasso.segments());
            }
        }
    }

    fn write_uniforms(&self, viewer: &Viewer) {
        let queue = self.gpu.queue();
        let scene = &viewer.scene;
        let handles = &viewer.handles;

        let view_proj = viewer
            .camera()
            .map(|c| c.view_projection())
            .unwrap_or(Mat4::IDENTITY);
        let mesh_world = viewer.mesh_world_matrix();

        let light_pos = scene.world_matrix(handles.sun).transform_point3(Vec3::ZERO);
        let light_view_proj = Mat4::orthographic_rh(
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            -SHADOW_EXTENT,
            SHADOW_EXTENT,
            SHADOW_NEAR,
            SHADOW_FAR,
        ) * Mat4::look_at_rh(light_pos, Vec3::ZERO, Vec3::Y);

        if let (Some((_, sun)), Some(ambient)) =
            (scene.directional_lights().next(), scene.ambient_light())
        {
            let ambient = AmbientLight {
                color: ambient.color.map(srgb_to_linear),
                ..*ambient
            };
            let globals = Globals::new(view_proj, light_view_proj, light_pos, sun, &ambient);
            queue.write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[globals]));
        }

        if let Some(mesh) = scene.mesh(handles.mesh) {
            let model = ModelUniform::new(
                mesh_world,
                &mesh.material,
                linear_rgb(HIGHLIGHT_COLOR),
                mesh.receive_shadow,
            );
            queue.write_buffer(&self.model_buffer, 0, bytemuck::cast_slice(&[model]));
        }

        self.helper_lines.write_uniform(
            queue,
            LineUniform::new(view_proj * mesh_world, linear_rgb(HELPER_COLOR)),
        );
        if let Some(lasso) = handles.lasso {
            self.lasso_lines.write_uniform(
                queue,
                LineUniform::new(view_proj * scene.world_matrix(lasso), linear_rgb(LASSO_COLOR)),
            );
        }
    }

    pub fn render(
        &mut self,
        window: &Window,
        viewer: &mut Viewer,
        update: FrameUpdate,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        self.sync(viewer, update);
        self.write_uniforms(viewer);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.gpu
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Encoder"),
                });

        let (cast_shadow, wireframe) = viewer
            .scene
            .mesh(viewer.handles.mesh)
            .map(|m| (m.cast_shadow, m.material.wireframe))
            .unwrap_or((false, false));
        let mesh_visible = viewer.scene.is_visible(viewer.handles.mesh);

        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_target,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if cast_shadow && mesh_visible {
                shadow_pass.set_pipeline(&self.pipelines.shadow);
                shadow_pass.set_bind_group(0, &self.shadow_bind_group, &[]);
                shadow_pass.set_bind_group(1, &self.model_bind_group, &[]);
                shadow_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                shadow_pass.draw(0..self.vertex_count, 0..1);
            }
        }

        {
            let [r, g, b] = viewer.scene.background.map(srgb_to_linear);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if mesh_visible {
                render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
                render_pass.set_bind_group(1, &self.model_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.selection_buffer.slice(..));
                if wireframe {
                    render_pass.set_pipeline(&self.pipelines.wireframe);
                    render_pass.set_index_buffer(
                        self.wire_index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    render_pass.draw_indexed(0..self.wire_index_count, 0, 0..1);
                } else {
                    render_pass.set_pipeline(&self.pipelines.mesh);
                    render_pass.draw(0..self.vertex_count, 0..1);
                }
            }

            if viewer.handles.helper.is_some_and(|id| viewer.scene.is_visible(id)) {
                render_pass.set_pipeline(&self.pipelines.helper);
                self.helper_lines.draw(&mut render_pass);
            }

            if viewer.handles.lasso.is_some_and(|id| viewer.scene.is_visible(id)) {
                render_pass.set_pipeline(&self.pipelines.lasso);
                self.lasso_lines.draw(&mut render_pass);
            }
        }

        if self.show_ui {
            self.render_ui(window, viewer, &mut encoder, &view);
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn render_ui(
        &mut self,
        window: &Window,
        viewer: &mut Viewer,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) {
        let info = PanelInfo {
            fps: viewer.stats().fps(),
            frame_ms: viewer.stats().frame_ms(),
            triangles: viewer
                .scene
                .mesh(viewer.handles.mesh)
                .map_or(0, |m| m.geometry().triangle_count()),
            selected: viewer.selected().len(),
            variant: viewer.variant(),
            bvh: viewer
                .scene
                .mesh(viewer.handles.mesh)
                .and_then(|m| m.bounds_tree())
                .map(|tree| tree.stats()),
        };

        let raw_input = self.egui_state.take_egui_input(window);
        let params = &mut viewer.params;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            panel::show(ctx, params, &info);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(self.gpu.device(), self.gpu.queue(), *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            self.gpu.device(),
            self.gpu.queue(),
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.show_ui && self.egui_state.on_window_event(window, event).consumed
    }
}
