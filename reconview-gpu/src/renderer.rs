//! Forward renderer for reconstructions, wireframe overlays and point clouds

use crate::device::{DepthTarget, MsaaTarget};
use crate::mesh::{GpuModel, MeshVertex};
use crate::points::{PointInstance, QUAD_VERTICES};
use bytemuck::{Pod, Zeroable};
use nalgebra::Matrix4;
use reconview_core::{rgb_from_hex, Point3f};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

/// Camera uniform data shared by every pass
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub _padding: f32,
    pub viewport: [f32; 2],
    pub _padding2: [f32; 2],
}

impl CameraUniform {
    pub fn new(view_proj: Matrix4<f32>, eye: Point3f, viewport: [f32; 2]) -> Self {
        Self {
            view_proj: view_proj.into(),
            view_pos: [eye.x, eye.y, eye.z],
            _padding: 0.0,
            viewport,
            _padding2: [0.0; 2],
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Matrix4::identity(), Point3f::origin(), [1.0, 1.0])
    }
}

/// Per-pass colour and flags
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    /// x: point size in pixels, y: shading enabled
    pub params: [f32; 4],
}

impl MaterialUniform {
    pub fn new(color: [f32; 3], point_size: f32, shaded: bool) -> Self {
        Self {
            color: [color[0], color[1], color[2], 1.0],
            params: [point_size, if shaded { 1.0 } else { 0.0 }, 0.0, 0.0],
        }
    }
}

/// Rendering configuration; colours are sRGB
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub background: [f32; 3],
    pub mesh_color: [f32; 3],
    pub wireframe_color: [f32; 3],
    pub point_color: [f32; 3],
    pub point_size: f32,
    pub shaded: bool,
    pub msaa_samples: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: rgb_from_hex(0xf5f5f5),
            mesh_color: rgb_from_hex(0xc4c4c4),
            wireframe_color: rgb_from_hex(0x000000),
            point_color: rgb_from_hex(0x1f77b4),
            point_size: 3.0,
            shaded: false,
            msaa_samples: 4,
        }
    }
}

impl RenderConfig {
    /// wgpu only guarantees 1x and 4x multisampling
    pub fn sample_count(&self) -> u32 {
        if self.msaa_samples > 1 {
            4
        } else {
            1
        }
    }
}

/// Which parts of a model to draw this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawFlags {
    pub surface: bool,
    pub wireframe: bool,
    pub points: bool,
}

impl DrawFlags {
    pub fn any(&self) -> bool {
        self.surface || self.wireframe || self.points
    }
}

/// Exact sRGB transfer function
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Colour as written to a target of `format`
fn target_color(rgb: [f32; 3], format: wgpu::TextureFormat) -> [f32; 3] {
    if format.is_srgb() {
        rgb.map(srgb_to_linear)
    } else {
        rgb
    }
}

struct Material {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl Material {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, uniform: MaterialUniform, label: &str) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

/// Draws uploaded models into a colour target
pub struct ModelRenderer {
    config: RenderConfig,
    format: wgpu::TextureFormat,
    sample_count: u32,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    surface_material: Material,
    wireframe_material: Material,
    point_material: Material,
    fill_pipeline: wgpu::RenderPipeline,
    wireframe_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    depth: DepthTarget,
    msaa: Option<MsaaTarget>,
}

impl ModelRenderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        config: RenderConfig,
    ) -> Self {
        let sample_count = config.sample_count();

        let uniform_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bind_group_layout"),
            entries: &[uniform_entry],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[uniform_entry],
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&CameraUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let [surface, wireframe, points] = Self::material_uniforms(&config, format);
        let surface_material = Material::new(device, &material_layout, surface, "Surface Material");
        let wireframe_material = Material::new(device, &material_layout, wireframe, "Wireframe Material");
        let point_material = Material::new(device, &material_layout, points, "Point Material");

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Model Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });
        let point_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/points.wgsl").into()),
        });

        let target = PipelineTarget {
            format,
            sample_count,
        };

        // Pushed back so coplanar wireframe lines win the depth test
        let fill_pipeline = create_pipeline(
            device,
            &layout,
            &mesh_shader,
            MeshVertex::desc(),
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::CompareFunction::Less,
            wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 1.0,
                clamp: 0.0,
            },
            target,
            "Surface Pipeline",
        );
        let wireframe_pipeline = create_pipeline(
            device,
            &layout,
            &mesh_shader,
            MeshVertex::desc(),
            wgpu::PrimitiveTopology::LineList,
            wgpu::CompareFunction::LessEqual,
            wgpu::DepthBiasState::default(),
            target,
            "Wireframe Pipeline",
        );
        let point_pipeline = create_pipeline(
            device,
            &layout,
            &point_shader,
            PointInstance::desc(),
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::CompareFunction::LessEqual,
            wgpu::DepthBiasState::default(),
            target,
            "Point Pipeline",
        );

        let depth = DepthTarget::new(device, size, sample_count);
        let msaa = (sample_count > 1).then(|| MsaaTarget::new(device, format, size, sample_count));

        Self {
            config,
            format,
            sample_count,
            camera_buffer,
            camera_bind_group,
            surface_material,
            wireframe_material,
            point_material,
            fill_pipeline,
            wireframe_pipeline,
            point_pipeline,
            depth,
            msaa,
        }
    }

    fn material_uniforms(config: &RenderConfig, format: wgpu::TextureFormat) -> [MaterialUniform; 3] {
        [
            MaterialUniform::new(target_color(config.mesh_color, format), 0.0, config.shaded),
            MaterialUniform::new(target_color(config.wireframe_color, format), 0.0, false),
            MaterialUniform::new(target_color(config.point_color, format), config.point_size, false),
        ]
    }

    /// Recreate size-dependent targets
    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.depth = DepthTarget::new(device, size, self.sample_count);
        if self.sample_count > 1 {
            self.msaa = Some(MsaaTarget::new(device, self.format, size, self.sample_count));
        }
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
    }

    fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = target_color(self.config.background, self.format);
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }

    /// Clear `target` to the background and draw each model's enabled parts
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        models: &[(&GpuModel, DrawFlags)],
    ) {
        let (view, resolve_target) = match &self.msaa {
            Some(msaa) => (&msaa.view, Some(target)),
            None => (target, None),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Model Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, &self.camera_bind_group, &[]);

        for (model, flags) in models {
            if flags.surface && model.triangle_count > 0 {
                pass.set_pipeline(&self.fill_pipeline);
                pass.set_bind_group(1, &self.surface_material.bind_group, &[]);
                pass.set_vertex_buffer(0, model.vertex_buffer.slice(..));
                pass.set_index_buffer(model.triangle_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..model.triangle_count, 0, 0..1);
            }

            if flags.wireframe && model.edge_count > 0 {
                pass.set_pipeline(&self.wireframe_pipeline);
                pass.set_bind_group(1, &self.wireframe_material.bind_group, &[]);
                pass.set_vertex_buffer(0, model.vertex_buffer.slice(..));
                pass.set_index_buffer(model.edge_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..model.edge_count, 0, 0..1);
            }

            if flags.points {
                if let Some(points) = &model.point_buffer {
                    pass.set_pipeline(&self.point_pipeline);
                    pass.set_bind_group(1, &self.point_material.bind_group, &[]);
                    pass.set_vertex_buffer(0, points.slice(..));
                    pass.draw(0..QUAD_VERTICES, 0..model.point_count);
                }
            }
        }
    }
}

#[derive(Clone, Copy)]
struct PipelineTarget {
    format: wgpu::TextureFormat,
    sample_count: u32,
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    buffer: wgpu::VertexBufferLayout<'_>,
    topology: wgpu::PrimitiveTopology,
    depth_compare: wgpu::CompareFunction,
    bias: wgpu::DepthBiasState,
    target: PipelineTarget,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[buffer],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: target.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthTarget::FORMAT,
            depth_write_enabled: true,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias,
        }),
        multisample: wgpu::MultisampleState {
            count: target.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 96);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn test_default_config_colours() {
        let config = RenderConfig::default();
        assert_relative_eq!(config.mesh_color[0], 0xc4 as f32 / 255.0);
        assert_eq!(config.wireframe_color, [0.0, 0.0, 0.0]);
        assert_eq!(config.sample_count(), 4);
    }

    #[test]
    fn test_sample_count_snaps() {
        let mut config = RenderConfig::default();
        config.msaa_samples = 1;
        assert_eq!(config.sample_count(), 1);
        config.msaa_samples = 0;
        assert_eq!(config.sample_count(), 1);
        config.msaa_samples = 2;
        assert_eq!(config.sample_count(), 4);
        config.msaa_samples = 8;
        assert_eq!(config.sample_count(), 4);
    }

    #[test]
    fn test_srgb_transfer() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert_relative_eq!(srgb_to_linear(1.0), 1.0, epsilon = 1e-6);
        assert_relative_eq!(srgb_to_linear(0.5), 0.214, epsilon = 1e-3);
        assert_eq!(
            target_color([0.5; 3], wgpu::TextureFormat::Bgra8Unorm),
            [0.5; 3]
        );
        assert!(target_color([0.5; 3], wgpu::TextureFormat::Bgra8UnormSrgb)[0] < 0.5);
    }

    #[test]
    fn test_material_flags() {
        let m = MaterialUniform::new([1.0, 0.0, 0.0], 4.0, true);
        assert_eq!(m.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.params, [4.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_draw_flags_any() {
        assert!(!DrawFlags::default().any());
        assert!(DrawFlags {
            points: true,
            ..Default::default()
        }
        .any());
    }
}
