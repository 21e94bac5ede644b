use crate::device::GpuContext;
use crate::lighting::{CameraUniform, Lighting, ModelUniform};
use crate::mesh::{axes_vertices, point_vertices, ColorVertex, GpuMesh, MeshVertex};
use image::RgbaImage;
use nalgebra::{Matrix4, Translation3};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use tryon_core::{Error, Model, NodeKind, ObjectTransform, Result, Scene, Vector3f};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Clear colour when the scene has no background, in sRGB
    pub background_color: [f32; 4],
    pub wireframe: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background_color: [0.1, 0.1, 0.1, 1.0],
            wireframe: false,
        }
    }
}

/// Camera for one frame
#[derive(Debug, Clone, Copy)]
pub struct ViewParams {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub camera_position: Vector3f,
}

/// Model matrix of one part: node transform, explode offset, then the part's
/// own transform
pub fn part_matrix(
    node: &ObjectTransform,
    offset: Option<&Vector3f>,
    part_transform: &Matrix4<f32>,
) -> Matrix4<f32> {
    let offset = offset.copied().unwrap_or_else(Vector3f::zeros);
    node.matrix() * Translation3::from(offset).to_homogeneous() * part_transform
}

fn srgb_to_linear(c: f32) -> f64 {
    let c = c.clamp(0.0, 1.0) as f64;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Clear colour for an sRGB colour on an sRGB surface
pub fn clear_color(rgba: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: srgb_to_linear(rgba[0]),
        g: srgb_to_linear(rgba[1]),
        b: srgb_to_linear(rgba[2]),
        a: rgba[3].clamp(0.0, 1.0) as f64,
    }
}

struct PartBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    edges: Option<(wgpu::Buffer, u32)>,
    color: [f32; 4],
}

/// Uploaded parts of one model, kept while any node draws it
struct CachedModel {
    _model: Arc<Model>,
    parts: Vec<Option<PartBuffers>>,
}

fn model_key(model: &Arc<Model>) -> usize {
    Arc::as_ptr(model) as usize
}

struct BackgroundTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

enum DrawKind {
    Part { model: usize, part: usize },
    Lines { vertices: wgpu::Buffer, count: u32 },
    Points { vertices: wgpu::Buffer, count: u32 },
}

struct DrawCall {
    kind: DrawKind,
    bind_group: wgpu::BindGroup,
}

struct PipelineDesc<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    fragment_entry: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    desc: PipelineDesc<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: "vs_main",
            buffers: desc.buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: desc.fragment_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: desc.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// Draws a [`Scene`] into a window surface.
///
/// Models are lit by the scene lights, or drawn as wireframes; points and
/// axes are unlit. An optional video frame fills the viewport behind
/// everything.
pub struct SceneRenderer<'window> {
    pub gpu_context: GpuContext,
    pub surface: wgpu::Surface<'window>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub config: RenderConfig,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    background_layout: wgpu::BindGroupLayout,
    background_sampler: wgpu::Sampler,
    mesh_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    background_pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    models: HashMap<usize, CachedModel>,
    background: Option<BackgroundTexture>,
}

impl<'window> SceneRenderer<'window> {
    /// Create a renderer presenting to `target`, sized `width` x `height`
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'window>>,
        width: u32,
        height: u32,
        config: RenderConfig,
    ) -> Result<Self> {
        let instance = GpuContext::create_instance();
        let surface = instance
            .create_surface(target)
            .map_err(|e| Error::Gpu(format!("Failed to create surface: {:?}", e)))?;
        let gpu_context = GpuContext::from_instance(instance, Some(&surface)).await?;

        let surface_caps = surface.get_capabilities(&gpu_context.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no formats".to_string()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu_context.device, &surface_config);

        let camera_uniform = CameraUniform::default();
        let camera_buffer = gpu_context.create_buffer_init(
            "Camera Buffer",
            &[camera_uniform],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let camera_layout = gpu_context.uniform_layout("camera_bind_group_layout");
        let camera_bind_group = gpu_context.create_bind_group(
            "camera_bind_group",
            &camera_layout,
            &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        );
        let model_layout = gpu_context.uniform_layout("model_bind_group_layout");

        let background_layout = gpu_context.create_bind_group_layout(
            "background_bind_group_layout",
            &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
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
        );
        let background_sampler = gpu_context.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Background Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let device = &gpu_context.device;
        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &model_layout],
            push_constant_ranges: &[],
        });
        let background_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Background Pipeline Layout"),
                bind_group_layouts: &[&background_layout],
                push_constant_ranges: &[],
            });

        let mesh_shader =
            gpu_context.create_shader_module("Mesh Shader", include_str!("shaders/mesh.wgsl"));
        let color_shader =
            gpu_context.create_shader_module("Color Shader", include_str!("shaders/color.wgsl"));
        let background_shader =
            gpu_context.create_shader_module(
                "Background Shader",
                include_str!("shaders/background.wgsl"),
            );

        let mesh_pipeline = create_pipeline(
            device,
            &scene_layout,
            surface_format,
            PipelineDesc {
                label: "Mesh Pipeline",
                shader: &mesh_shader,
                fragment_entry: "fs_main",
                buffers: &[MeshVertex::desc()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );
        let wire_pipeline = create_pipeline(
            device,
            &scene_layout,
            surface_format,
            PipelineDesc {
                label: "Wireframe Pipeline",
                shader: &mesh_shader,
                fragment_entry: "fs_wire",
                buffers: &[MeshVertex::desc()],
                topology: wgpu::PrimitiveTopology::LineList,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );
        let line_pipeline = create_pipeline(
            device,
            &scene_layout,
            surface_format,
            PipelineDesc {
                label: "Line Pipeline",
                shader: &color_shader,
                fragment_entry: "fs_main",
                buffers: &[ColorVertex::desc()],
                topology: wgpu::PrimitiveTopology::LineList,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );
        let point_pipeline = create_pipeline(
            device,
            &scene_layout,
            surface_format,
            PipelineDesc {
                label: "Point Pipeline",
                shader: &color_shader,
                fragment_entry: "fs_main",
                buffers: &[ColorVertex::desc()],
                topology: wgpu::PrimitiveTopology::PointList,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
            },
        );
        let background_pipeline = create_pipeline(
            device,
            &background_pipeline_layout,
            surface_format,
            PipelineDesc {
                label: "Background Pipeline",
                shader: &background_shader,
                fragment_entry: "fs_main",
                buffers: &[],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Always,
            },
        );

        let depth_view = create_depth_view(device, &surface_config);

        Ok(Self {
            gpu_context,
            surface,
            surface_config,
            config,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            model_layout,
            background_layout,
            background_sampler,
            mesh_pipeline,
            wire_pipeline,
            line_pipeline,
            point_pipeline,
            background_pipeline,
            depth_view,
            models: HashMap::new(),
            background: None,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn aspect(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.config.wireframe = wireframe;
    }

    /// Resize renderer surface
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.gpu_context.device, &self.surface_config);
            self.depth_view = create_depth_view(&self.gpu_context.device, &self.surface_config);
        }
    }

    fn update_camera(&mut self, scene: &Scene, view: &ViewParams) {
        let p = view.camera_position;
        self.camera_uniform.view_proj = (view.projection * view.view).into();
        self.camera_uniform.view_pos = [p.x, p.y, p.z, 1.0];
        Lighting::from_scene(scene, &p).write_to(&mut self.camera_uniform);
        self.gpu_context.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera_uniform),
        );
    }

    /// Upload models new to the scene and drop those no node draws any more
    fn sync_models(&mut self, scene: &Scene) {
        let mut seen = HashSet::new();
        for (_, node) in scene.visible() {
            let NodeKind::Model { model, .. } = &node.kind else {
                continue;
            };
            let key = model_key(model);
            seen.insert(key);
            if self.models.contains_key(&key) {
                continue;
            }
            let parts = model
                .parts
                .iter()
                .map(|part| self.upload_part(&GpuMesh::from_part(part)))
                .collect();
            debug!(model = %model.name, parts = model.parts.len(), "model uploaded");
            self.models.insert(
                key,
                CachedModel {
                    _model: model.clone(),
                    parts,
                },
            );
        }
        self.models.retain(|key, _| seen.contains(key));
    }

    fn upload_part(&self, mesh: &GpuMesh) -> Option<PartBuffers> {
        if mesh.is_empty() {
            return None;
        }
        let ctx = &self.gpu_context;
        let edges = (!mesh.edge_indices.is_empty()).then(|| {
            (
                ctx.create_buffer_init(
                    "Edge Index Buffer",
                    &mesh.edge_indices,
                    wgpu::BufferUsages::INDEX,
                ),
                mesh.edge_indices.len() as u32,
            )
        });
        Some(PartBuffers {
            vertices: ctx.create_buffer_init(
                "Mesh Vertex Buffer",
                &mesh.vertices,
                wgpu::BufferUsages::VERTEX,
            ),
            indices: ctx.create_buffer_init(
                "Mesh Index Buffer",
                &mesh.indices,
                wgpu::BufferUsages::INDEX,
            ),
            index_count: mesh.indices.len() as u32,
            edges,
            color: mesh.color,
        })
    }

    fn model_bind_group(&self, uniform: ModelUniform) -> wgpu::BindGroup {
        let buffer = self
            .gpu_context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Uniform Buffer"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        self.gpu_context.create_bind_group(
            "model_bind_group",
            &self.model_layout,
            &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        )
    }

    fn collect_draws(&self, scene: &Scene) -> Vec<DrawCall> {
        let mut draws = Vec::new();
        for (_, node) in scene.visible() {
            match &node.kind {
                NodeKind::Group => {}
                NodeKind::Model { model, part_offsets } => {
                    let key = model_key(model);
                    let Some(cached) = self.models.get(&key) else {
                        continue;
                    };
                    for (index, part) in model.parts.iter().enumerate() {
                        let Some(buffers) = cached.parts.get(index).and_then(Option::as_ref) else {
                            continue;
                        };
                        let matrix =
                            part_matrix(&node.transform, part_offsets.get(index), &part.transform);
                        draws.push(DrawCall {
                            kind: DrawKind::Part { model: key, part: index },
                            bind_group: self
                                .model_bind_group(ModelUniform::new(matrix, buffers.color)),
                        });
                    }
                }
                NodeKind::Points { points, color } => {
                    if points.is_empty() {
                        continue;
                    }
                    let vertices = point_vertices(points, *color);
                    draws.push(DrawCall {
                        kind: DrawKind::Points {
                            vertices: self.gpu_context.create_buffer_init(
                                "Point Vertex Buffer",
                                &vertices,
                                wgpu::BufferUsages::VERTEX,
                            ),
                            count: vertices.len() as u32,
                        },
                        bind_group: self
                            .model_bind_group(ModelUniform::new(node.transform.matrix(), [1.0; 4])),
                    });
                }
                NodeKind::Axes { size } => {
                    let vertices = axes_vertices(*size);
                    draws.push(DrawCall {
                        kind: DrawKind::Lines {
                            vertices: self.gpu_context.create_buffer_init(
                                "Axes Vertex Buffer",
                                &vertices,
                                wgpu::BufferUsages::VERTEX,
                            ),
                            count: vertices.len() as u32,
                        },
                        bind_group: self
                            .model_bind_group(ModelUniform::new(node.transform.matrix(), [1.0; 4])),
                    });
                }
            }
        }
        draws
    }

    /// Upload `frame` as the background texture, reallocating on size change
    fn update_background(&mut self, frame: &RgbaImage) {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            self.background = None;
            return;
        }
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        if self.background.as_ref().map(|b| b.size) != Some((width, height)) {
            let texture = self.gpu_context.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Background Texture"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let bind_group = self.gpu_context.create_bind_group(
                "background_bind_group",
                &self.background_layout,
                &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.background_sampler),
                    },
                ],
            );
            debug!(width, height, "background texture allocated");
            self.background = Some(BackgroundTexture {
                texture,
                bind_group,
                size: (width, height),
            });
        }
        if let Some(background) = &self.background {
            self.gpu_context.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &background.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                frame.as_raw(),
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                size,
            );
        }
    }

    /// Render one frame of `scene`, with `frame` behind it when given
    pub fn render(
        &mut self,
        scene: &Scene,
        view: &ViewParams,
        frame: Option<&RgbaImage>,
    ) -> Result<()> {
        self.update_camera(scene, view);
        self.sync_models(scene);
        match frame {
            Some(image) => self.update_background(image),
            None => self.background = None,
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.surface.configure(&self.gpu_context.device, &self.surface_config);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let target = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let draws = self.collect_draws(scene);
        let clear = clear_color(scene.background.unwrap_or(self.config.background_color));

        let mut encoder = self
            .gpu_context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
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

            if let Some(background) = &self.background {
                render_pass.set_pipeline(&self.background_pipeline);
                render_pass.set_bind_group(0, &background.bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            for draw in &draws {
                match &draw.kind {
                    DrawKind::Part { model, part } => {
                        let Some(buffers) = self
                            .models
                            .get(model)
                            .and_then(|m| m.parts.get(*part))
                            .and_then(Option::as_ref)
                        else {
                            continue;
                        };
                        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                        render_pass.set_bind_group(1, &draw.bind_group, &[]);
                        render_pass.set_vertex_buffer(0, buffers.vertices.slice(..));
                        if self.config.wireframe {
                            let Some((edges, count)) = &buffers.edges else {
                                continue;
                            };
                            render_pass.set_pipeline(&self.wire_pipeline);
                            render_pass
                                .set_index_buffer(edges.slice(..), wgpu::IndexFormat::Uint32);
                            render_pass.draw_indexed(0..*count, 0, 0..1);
                        } else {
                            render_pass.set_pipeline(&self.mesh_pipeline);
                            render_pass.set_index_buffer(
                                buffers.indices.slice(..),
                                wgpu::IndexFormat::Uint32,
                            );
                            render_pass.draw_indexed(0..buffers.index_count, 0, 0..1);
                        }
                    }
                    DrawKind::Lines { vertices, count } | DrawKind::Points { vertices, count } => {
                        let pipeline = match draw.kind {
                            DrawKind::Points { .. } => &self.point_pipeline,
                            _ => &self.line_pipeline,
                        };
                        render_pass.set_pipeline(pipeline);
                        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                        render_pass.set_bind_group(1, &draw.bind_group, &[]);
                        render_pass.set_vertex_buffer(0, vertices.slice(..));
                        render_pass.draw(0..*count, 0..1);
                    }
                }
            }
        }

        self.gpu_context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Number of models currently uploaded
    pub fn cached_models(&self) -> usize {
        self.models.len()
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tryon_core::{EulerXyz, Point3f};

    #[test]
    fn test_part_matrix_order() {
        let mut node = ObjectTransform::from_position(Vector3f::new(10.0, 0.0, 0.0));
        node.set_uniform_scale(2.0);
        node.rotation = EulerXyz::new(0.0, 0.0, 0.0);
        let offset = Vector3f::new(0.0, 1.0, 0.0);
        let part = Translation3::new(0.0, 0.0, 3.0).to_homogeneous();

        let m = part_matrix(&node, Some(&offset), &part);
        let p = m.transform_point(&Point3f::origin());
        // Part and offset are scaled by the node, then translated
        assert_relative_eq!(p, Point3f::new(10.0, 2.0, 6.0), epsilon = 1e-5);

        let without = part_matrix(&node, None, &part).transform_point(&Point3f::origin());
        assert_relative_eq!(without, Point3f::new(10.0, 0.0, 6.0), epsilon = 1e-5);
    }

    #[test]
    fn test_clear_color_is_linearized() {
        let c = clear_color([1.0, 0.0, 0.5, 1.0]);
        assert_relative_eq!(c.r, 1.0, epsilon = 1e-9);
        assert_relative_eq!(c.g, 0.0);
        assert_relative_eq!(c.b, 0.214, epsilon = 1e-3);
        assert_relative_eq!(c.a, 1.0);
    }
}
