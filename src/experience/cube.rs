//! Cube field
//!
//! A lattice of slowly tumbling cubes over a gradient backdrop, drawn as a
//! single instanced indexed draw. Rotation happens entirely in the vertex
//! shader from the elapsed time and a per-instance phase, so the instance
//! buffer is written once at init.

use std::any::Any;

use glam::Vec3;
use rand::RngExt;
use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::experience::backdrop::Backdrop;
use crate::experience::{Experience, ExperienceContext, FrameContext};
use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};

const GRID_RADIUS: i32 = 3;
const SPACING: f32 = 2.4;

const PALETTE: [[f32; 3]; 4] = [
    [0.92, 0.56, 0.28],
    [0.34, 0.68, 0.89],
    [0.86, 0.82, 0.64],
    [0.58, 0.44, 0.86],
];

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CubeVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CubeInstance {
    offset_phase: [f32; 4],
    tint_scale: [f32; 4],
}

const VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
};

const INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<CubeInstance>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &wgpu::vertex_attr_array![2 => Float32x4, 3 => Float32x4],
};

struct CubeGpu {
    pipeline: Tracked<wgpu::RenderPipeline>,
    pipeline_no_depth: Tracked<wgpu::RenderPipeline>,
    vertex_buffer: Tracked<wgpu::Buffer>,
    index_buffer: Tracked<wgpu::Buffer>,
    instance_buffer: Tracked<wgpu::Buffer>,
    scene_uniform: Tracked<wgpu::Buffer>,
    scene_group: Tracked<wgpu::BindGroup>,
    camera_group: wgpu::BindGroup,
    shared_group: wgpu::BindGroup,
    index_count: u32,
    instance_count: u32,
}

pub struct CubeField {
    backdrop: Backdrop,
    gpu: Option<CubeGpu>,
}

impl Default for CubeField {
    fn default() -> Self {
        Self::new()
    }
}

impl CubeField {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backdrop: Backdrop::gradient(
                [0.050, 0.078, 0.160, 1.0],
                [0.008, 0.010, 0.024, 1.0],
            ),
            gpu: None,
        }
    }
}

impl Experience for CubeField {
    fn init(&mut self, ctx: &mut ExperienceContext<'_>) -> Result<()> {
        self.backdrop.init(ctx);

        let (camera_layout, camera_group) = ctx.camera_bindings("cubefield")?;

        let (vertices, indices) = cube_mesh();
        let vertex_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Cube Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            ResourceCategory::Buffer,
        );
        let index_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Cube Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
            ResourceCategory::Buffer,
        );

        let instances = lattice_instances();
        let instance_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Cube Instance Buffer"),
                    contents: bytemuck::cast_slice(&instances),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            ResourceCategory::Buffer,
        );

        let scene_uniform = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Cube Scene Uniform"),
                    contents: bytemuck::cast_slice(&[0.0f32; 4]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                }),
            ResourceCategory::Buffer,
        );
        let scene_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Cube Scene Bind Group Layout"),
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
                });
        let scene_group = ctx.registry.track(
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Cube Scene Bind Group"),
                layout: &scene_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_uniform.as_entire_binding(),
                }],
            }),
            ResourceCategory::BindGroup,
        );

        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Cube Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/cube.wgsl").into()),
            });
        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Cube Pipeline Layout"),
                bind_group_layouts: &[Some(camera_layout), Some(ctx.shared.layout()), Some(&scene_layout)],
                immediate_size: 0,
            });

        let make_pipeline = |depth: bool| {
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Cube Pipeline"),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        buffers: &[VERTEX_LAYOUT, INSTANCE_LAYOUT],
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

        self.gpu = Some(CubeGpu {
            pipeline,
            pipeline_no_depth,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            scene_uniform,
            scene_group,
            camera_group,
            shared_group: ctx.shared.bind_group().clone(),
            index_count: indices.len() as u32,
            instance_count: instances.len() as u32,
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
                label: Some("Cube Scene Pass"),
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
        pass.set_vertex_buffer(1, gpu.instance_buffer.slice(..));
        pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..gpu.index_count, 0, 0..gpu.instance_count);
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
            registry.release_buffer(gpu.instance_buffer);
            registry.release_buffer(gpu.scene_uniform);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// 24-vertex cube with per-face normals, CCW from outside.
fn cube_mesh() -> (Vec<CubeVertex>, Vec<u16>) {
    // (normal, u, v) with u x v = normal
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (normal, u, v)) in FACES.into_iter().enumerate() {
        let n = Vec3::from_array(normal);
        let u = Vec3::from_array(u);
        let v = Vec3::from_array(v);
        for (su, sv) in CORNERS {
            let position = (n + u * su + v * sv) * 0.5;
            vertices.push(CubeVertex {
                position: position.to_array(),
                normal,
            });
        }
        let base = (face * 4) as u16;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

fn lattice_instances() -> Vec<CubeInstance> {
    let mut rng = rand::rng();
    let mut instances = Vec::new();
    for x in -GRID_RADIUS..=GRID_RADIUS {
        for y in -GRID_RADIUS..=GRID_RADIUS {
            for z in -GRID_RADIUS..=GRID_RADIUS {
                let offset = Vec3::new(x as f32, y as f32, z as f32) * SPACING;
                let phase = rng.random_range(0.0..std::f32::consts::TAU);
                let scale = rng.random_range(0.55..0.95);
                let tint = PALETTE[rng.random_range(0..PALETTE.len())];
                instances.push(CubeInstance {
                    offset_phase: [offset.x, offset.y, offset.z, phase],
                    tint_scale: [tint[0], tint[1], tint[2], scale],
                });
            }
        }
    }
    instances
}
