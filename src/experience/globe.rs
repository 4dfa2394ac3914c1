//! Globe
//!
//! A spinning planet over a starfield. The surface is a procedural
//! equirectangular texture generated on the CPU from periodic value noise
//! (seamless across the date line) and uploaded once per style; switching
//! styles rewrites the texels in place without recreating the texture.

use std::any::Any;

use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::experience::backdrop::Backdrop;
use crate::experience::{Experience, ExperienceContext, FrameContext};
use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};

const TEX_WIDTH: u32 = 512;
const TEX_HEIGHT: u32 = 256;
const RINGS: u32 = 48;
const SEGMENTS: u32 = 96;

/// Surface rendering styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobeStyle {
    /// Oceans, shaded land, polar caps.
    Terra,
    /// Hypsometric elevation bands with contour lines.
    Topo,
    /// Dark sphere with a graticule.
    Grid,
}

impl GlobeStyle {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            GlobeStyle::Terra => GlobeStyle::Topo,
            GlobeStyle::Topo => GlobeStyle::Grid,
            GlobeStyle::Grid => GlobeStyle::Terra,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobeVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

const VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<GlobeVertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
};

struct GlobeGpu {
    pipeline: Tracked<wgpu::RenderPipeline>,
    pipeline_no_depth: Tracked<wgpu::RenderPipeline>,
    vertex_buffer: Tracked<wgpu::Buffer>,
    index_buffer: Tracked<wgpu::Buffer>,
    scene_uniform: Tracked<wgpu::Buffer>,
    texture: Tracked<wgpu::Texture>,
    sampler: Tracked<wgpu::Sampler>,
    scene_group: Tracked<wgpu::BindGroup>,
    camera_group: wgpu::BindGroup,
    shared_group: wgpu::BindGroup,
    queue: wgpu::Queue,
    index_count: u32,
}

pub struct Globe {
    backdrop: Backdrop,
    style: GlobeStyle,
    gpu: Option<GlobeGpu>,
}

impl Default for Globe {
    fn default() -> Self {
        Self::new()
    }
}

impl Globe {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backdrop: Backdrop::starfield(70.0),
            style: GlobeStyle::Terra,
            gpu: None,
        }
    }

    /// Switches the surface style, regenerating the texture in place.
    pub fn set_style(&mut self, style: GlobeStyle) {
        self.style = style;
        if let Some(gpu) = &self.gpu {
            upload_texture(&gpu.queue, &gpu.texture, style);
        }
    }

    pub fn cycle_style(&mut self) {
        let style = self.style.next();
        log::info!("Globe style {style:?}");
        self.set_style(style);
    }

    #[must_use]
    pub fn style(&self) -> GlobeStyle {
        self.style
    }
}

impl Experience for Globe {
    fn init(&mut self, ctx: &mut ExperienceContext<'_>) -> Result<()> {
        self.backdrop.init(ctx);
        let (camera_layout, camera_group) = ctx.camera_bindings("globe")?;

        let (vertices, indices) = sphere_mesh(RINGS, SEGMENTS);
        let vertex_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Globe Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            ResourceCategory::Buffer,
        );
        let index_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Globe Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
            ResourceCategory::Buffer,
        );

        let texture = ctx.registry.track(
            ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Globe Texture"),
                size: wgpu::Extent3d {
                    width: TEX_WIDTH,
                    height: TEX_HEIGHT,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            }),
            ResourceCategory::Texture,
        );
        upload_texture(ctx.queue, &texture, self.style);
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctx.registry.track(
            ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Globe Sampler"),
                address_mode_u: wgpu::AddressMode::Repeat,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            }),
            ResourceCategory::Other,
        );

        let scene_uniform = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Globe Scene Uniform"),
                    contents: bytemuck::cast_slice(&[0.0f32; 4]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                }),
            ResourceCategory::Buffer,
        );

        let scene_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Globe Scene Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });
        let scene_group = ctx.registry.track(
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Globe Scene Bind Group"),
                layout: &scene_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: scene_uniform.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&texture_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            }),
            ResourceCategory::BindGroup,
        );

        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Globe Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/globe.wgsl").into()),
            });
        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Globe Pipeline Layout"),
                bind_group_layouts: &[Some(camera_layout), Some(ctx.shared.layout()), Some(&scene_layout)],
                immediate_size: 0,
            });
        let make_pipeline = |depth: bool| {
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Globe Pipeline"),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        buffers: &[VERTEX_LAYOUT],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: ctx.color_format,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: Some(wgpu::Face::Back),
                        ..Default::default()
                    },
                    depth_stencil: depth.then(|| wgpu::DepthStencilState {
                        format: ctx.depth_format,
                        depth_write_enabled: Some(true),
                        depth_compare: Some(wgpu::CompareFunction::Less),
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                })
        };
        let pipeline = ctx
            .registry
            .track(make_pipeline(true), ResourceCategory::Pipeline);
        let pipeline_no_depth = ctx
            .registry
            .track(make_pipeline(false), ResourceCategory::Pipeline);

        self.gpu = Some(GlobeGpu {
            pipeline,
            pipeline_no_depth,
            vertex_buffer,
            index_buffer,
            scene_uniform,
            texture,
            sampler,
            scene_group,
            camera_group,
            shared_group: ctx.shared.bind_group().clone(),
            queue: ctx.queue.clone(),
            index_count: indices.len() as u32,
        });
        Ok(())
    }

    fn render(&mut self, frame: &mut FrameContext<'_>) -> Result<()> {
        let Some(gpu) = &self.gpu else {
            return Ok(());
        };
        frame.queue.write_buffer(
            &gpu.scene_uniform,
            0,
            bytemuck::cast_slice(&[frame.time, 0.0, 0.0, 0.0]),
        );

        self.backdrop.record(frame);

        let depth_attachment = frame.depth.map(|view| wgpu::RenderPassDepthStencilAttachment {
            view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        });
        let mut pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Globe Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: depth_attachment,
                ..Default::default()
            });
        if frame.depth.is_some() {
            pass.set_pipeline(&gpu.pipeline);
        } else {
            pass.set_pipeline(&gpu.pipeline_no_depth);
        }
        pass.set_bind_group(0, &gpu.camera_group, &[]);
        pass.set_bind_group(1, &gpu.shared_group, &[]);
        pass.set_bind_group(2, &*gpu.scene_group, &[]);
        pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..gpu.index_count, 0, 0..1);
        Ok(())
    }

    fn cleanup(&mut self, registry: &ResourceRegistry) {
        self.backdrop.cleanup(registry);
        if let Some(gpu) = self.gpu.take() {
            drop(registry.release(gpu.pipeline));
            drop(registry.release(gpu.pipeline_no_depth));
            drop(registry.release(gpu.scene_group));
            registry.release_buffer(gpu.vertex_buffer);
            registry.release_buffer(gpu.index_buffer);
            registry.release_buffer(gpu.scene_uniform);
            registry.release_texture(gpu.texture);
            drop(registry.release(gpu.sampler));
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn upload_texture(queue: &wgpu::Queue, texture: &wgpu::Texture, style: GlobeStyle) {
    let pixels = generate_pixels(style);
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(TEX_WIDTH * 4),
            rows_per_image: Some(TEX_HEIGHT),
        },
        wgpu::Extent3d {
            width: TEX_WIDTH,
            height: TEX_HEIGHT,
            depth_or_array_layers: 1,
        },
    );
}

// ============================================================================
// Procedural surface
// ============================================================================

fn hash2(x: i32, y: i32) -> f32 {
    let mut h = x
        .wrapping_mul(374_761_393)
        .wrapping_add(y.wrapping_mul(668_265_263));
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^= h >> 16;
    (h as u32 % 65_536) as f32 / 65_536.0
}

/// Bilinear value noise, periodic along x so the texture wraps seamlessly.
fn value_noise(x: f32, y: f32, period_x: i32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x.floor();
    let fy = y - y.floor();
    let sx = fx * fx * (3.0 - 2.0 * fx);
    let sy = fy * fy * (3.0 - 2.0 * fy);

    let xi0 = x0.rem_euclid(period_x);
    let xi1 = (x0 + 1).rem_euclid(period_x);
    let v00 = hash2(xi0, y0);
    let v10 = hash2(xi1, y0);
    let v01 = hash2(xi0, y0 + 1);
    let v11 = hash2(xi1, y0 + 1);

    let a = v00 + (v10 - v00) * sx;
    let b = v01 + (v11 - v01) * sx;
    a + (b - a) * sy
}

fn fbm(u: f32, v: f32) -> f32 {
    let mut amplitude = 0.5;
    let mut total = 0.0;
    let mut norm = 0.0;
    let mut period = 8i32;
    for _ in 0..5 {
        total += amplitude * value_noise(u * period as f32, v * period as f32, period);
        norm += amplitude;
        amplitude *= 0.5;
        period *= 2;
    }
    total / norm
}

fn generate_pixels(style: GlobeStyle) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((TEX_WIDTH * TEX_HEIGHT * 4) as usize);
    for y in 0..TEX_HEIGHT {
        for x in 0..TEX_WIDTH {
            let u = x as f32 / TEX_WIDTH as f32;
            let v = y as f32 / TEX_HEIGHT as f32;
            let rgb = match style {
                GlobeStyle::Terra => terra_pixel(u, v),
                GlobeStyle::Topo => topo_pixel(u, v),
                GlobeStyle::Grid => grid_pixel(x, y, u, v),
            };
            pixels.extend_from_slice(&[to_channel(rgb[0]), to_channel(rgb[1]), to_channel(rgb[2]), 255]);
        }
    }
    pixels
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

fn terra_pixel(u: f32, v: f32) -> [f32; 3] {
    let elevation = fbm(u, v);
    let polar = (v - 0.5).abs() * 2.0;
    if polar > 0.82 + (elevation - 0.5) * 0.1 {
        return [0.92, 0.94, 0.97];
    }
    if elevation < 0.52 {
        let depth = (0.52 - elevation) / 0.52;
        return [
            0.05 + 0.04 * (1.0 - depth),
            0.14 + 0.10 * (1.0 - depth),
            0.30 + 0.18 * (1.0 - depth),
        ];
    }
    let land = (elevation - 0.52) / 0.48;
    if land < 0.25 {
        [0.22, 0.42, 0.20]
    } else if land < 0.6 {
        [0.36, 0.38, 0.22]
    } else if land < 0.85 {
        [0.42, 0.34, 0.26]
    } else {
        [0.80, 0.80, 0.82]
    }
}

fn topo_pixel(u: f32, v: f32) -> [f32; 3] {
    let elevation = fbm(u, v);
    let banded = elevation * 9.0;
    let band = banded.floor() / 9.0;
    let contour = if banded.fract() < 0.10 { 0.45 } else { 1.0 };
    let low = [0.10, 0.14, 0.32];
    let high = [0.95, 0.80, 0.45];
    [
        (low[0] + (high[0] - low[0]) * band) * contour,
        (low[1] + (high[1] - low[1]) * band) * contour,
        (low[2] + (high[2] - low[2]) * band) * contour,
    ]
}

fn grid_pixel(x: u32, y: u32, u: f32, v: f32) -> [f32; 3] {
    // 15 degree graticule
    let lon_step = TEX_WIDTH / 24;
    let lat_step = TEX_HEIGHT / 12;
    let on_line = x % lon_step < 2 || y % lat_step < 2;
    if on_line {
        [0.30, 0.75, 0.95]
    } else {
        let glow = fbm(u, v) * 0.12;
        [0.02 + glow * 0.3, 0.03 + glow * 0.5, 0.06 + glow]
    }
}

fn sphere_mesh(rings: u32, segments: u32) -> (Vec<GlobeVertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for ring in 0..=rings {
        let phi = std::f32::consts::PI * ring as f32 / rings as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for seg in 0..=segments {
            let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let position = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
            vertices.push(GlobeVertex {
                position,
                normal: position,
                uv: [seg as f32 / segments as f32, ring as f32 / rings as f32],
            });
        }
    }

    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    for ring in 0..rings {
        for seg in 0..segments {
            let a = (ring * (segments + 1) + seg) as u16;
            let b = a + segments as u16 + 1;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    (vertices, indices)
}
