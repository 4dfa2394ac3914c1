//! Flocking
//!
//! A murmuration of boids simulated on the GPU. Two storage buffers
//! ping-pong through a compute pass each frame (separation, alignment,
//! cohesion with Reynolds steering), then the freshly written buffer feeds
//! an instanced dart draw oriented along each boid's velocity. The soft
//! flight box follows the viewport aspect so the flock fills wide windows.

use std::any::Any;

use bytemuck::Zeroable;
use glam::Vec3;
use rand::RngExt;
use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::experience::backdrop::Backdrop;
use crate::experience::{Experience, ExperienceContext, FrameContext};
use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};

const BOID_COUNT: u32 = 1024;
const WORKGROUP_SIZE: u32 = 64;

const MAX_SPEED: f32 = 12.0;
const MAX_FORCE: f32 = 28.0;
const PERCEPTION_RADIUS: f32 = 3.5;
const SEPARATION_RADIUS: f32 = 1.4;
const CENTER_PULL: f32 = 0.35;
const TURN_STRENGTH: f32 = 4.0;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Boid {
    position: [f32; 4],
    velocity: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct SimParams {
    dt_count: [f32; 4],
    weights: [f32; 4],
    limits: [f32; 4],
    bounds: [f32; 4],
}

struct FlockingGpu {
    sim_pipeline: Tracked<wgpu::ComputePipeline>,
    draw_pipeline: Tracked<wgpu::RenderPipeline>,
    draw_pipeline_no_depth: Tracked<wgpu::RenderPipeline>,
    boid_buffers: [Tracked<wgpu::Buffer>; 2],
    params_buffer: Tracked<wgpu::Buffer>,
    sim_groups: [Tracked<wgpu::BindGroup>; 2],
    boid_groups: [Tracked<wgpu::BindGroup>; 2],
    vertex_buffer: Tracked<wgpu::Buffer>,
    index_buffer: Tracked<wgpu::Buffer>,
    camera_group: wgpu::BindGroup,
    shared_group: wgpu::BindGroup,
    index_count: u32,
}

pub struct Flocking {
    backdrop: Backdrop,
    bounds: Vec3,
    parity: usize,
    gpu: Option<FlockingGpu>,
}

impl Default for Flocking {
    fn default() -> Self {
        Self::new()
    }
}

impl Flocking {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backdrop: Backdrop::gradient(
                [0.086, 0.140, 0.300, 1.0],
                [0.240, 0.130, 0.078, 1.0],
            ),
            bounds: Vec3::new(22.0, 14.0, 16.0),
            parity: 0,
            gpu: None,
        }
    }

    fn fit_bounds(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let aspect = width as f32 / height as f32;
        self.bounds.x = (self.bounds.y * aspect).clamp(10.0, 34.0);
    }
}

impl Experience for Flocking {
    fn init(&mut self, ctx: &mut ExperienceContext<'_>) -> Result<()> {
        self.backdrop.init(ctx);
        self.fit_bounds(ctx.width, ctx.height);
        let (camera_layout, camera_group) = ctx.camera_bindings("flocking")?;

        let seed = seed_boids(self.bounds);
        let boid_buffer = |label| {
            ctx.registry.track(
                ctx.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(&seed),
                        usage: wgpu::BufferUsages::STORAGE,
                    }),
                ResourceCategory::Buffer,
            )
        };
        let boid_buffers = [boid_buffer("Boid Buffer A"), boid_buffer("Boid Buffer B")];

        let params_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Flocking Params Buffer"),
                    contents: bytemuck::bytes_of(&SimParams::zeroed()),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                }),
            ResourceCategory::Buffer,
        );

        // Sim: params + source boids + destination boids.
        let sim_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Flocking Sim Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });
        let sim_group = |src: usize, dst: usize, label| {
            ctx.registry.track(
                ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(label),
                    layout: &sim_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: params_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: boid_buffers[src].as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: boid_buffers[dst].as_entire_binding(),
                        },
                    ],
                }),
                ResourceCategory::BindGroup,
            )
        };
        let sim_groups = [
            sim_group(0, 1, "Flocking Sim Bind Group A"),
            sim_group(1, 0, "Flocking Sim Bind Group B"),
        ];

        let sim_shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Flocking Sim Shader"),
                source: wgpu::ShaderSource::Wgsl(
                    include_str!("shaders/flocking_sim.wgsl").into(),
                ),
            });
        let sim_pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Flocking Sim Pipeline Layout"),
                bind_group_layouts: &[Some(&sim_layout)],
                immediate_size: 0,
            });
        let sim_pipeline = ctx.registry.track(
            ctx.device
                .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some("Flocking Sim Pipeline"),
                    layout: Some(&sim_pipeline_layout),
                    module: &sim_shader,
                    entry_point: Some("main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    cache: None,
                }),
            ResourceCategory::Pipeline,
        );

        // Draw: the vertex stage reads the freshly written boid buffer.
        let boid_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Boid Draw Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let boid_group = |buffer: usize, label| {
            ctx.registry.track(
                ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(label),
                    layout: &boid_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: boid_buffers[buffer].as_entire_binding(),
                    }],
                }),
                ResourceCategory::BindGroup,
            )
        };
        // Parity p simulates into buffer 1 - p, so the draw reads it.
        let boid_groups = [
            boid_group(1, "Boid Draw Bind Group A"),
            boid_group(0, "Boid Draw Bind Group B"),
        ];

        let (vertices, indices) = dart_mesh();
        let vertex_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Boid Dart Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            ResourceCategory::Buffer,
        );
        let index_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Boid Dart Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
            ResourceCategory::Buffer,
        );

        let draw_shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Flocking Draw Shader"),
                source: wgpu::ShaderSource::Wgsl(
                    include_str!("shaders/flocking_draw.wgsl").into(),
                ),
            });
        let draw_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Flocking Draw Pipeline Layout"),
                bind_group_layouts: &[Some(camera_layout), Some(ctx.shared.layout()), Some(&boid_layout)],
                immediate_size: 0,
            });
        let make_draw_pipeline = |depth: bool| {
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Flocking Draw Pipeline"),
                    layout: Some(&draw_layout),
                    vertex: wgpu::VertexState {
                        module: &draw_shader,
                        entry_point: Some("vs_main"),
                        buffers: &[wgpu::VertexBufferLayout {
                            array_stride: (std::mem::size_of::<f32>() * 3)
                                as wgpu::BufferAddress,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                        }],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &draw_shader,
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
                        cull_mode: None,
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
        let draw_pipeline = ctx
            .registry
            .track(make_draw_pipeline(true), ResourceCategory::Pipeline);
        let draw_pipeline_no_depth = ctx
            .registry
            .track(make_draw_pipeline(false), ResourceCategory::Pipeline);

        self.parity = 0;
        self.gpu = Some(FlockingGpu {
            sim_pipeline,
            draw_pipeline,
            draw_pipeline_no_depth,
            boid_buffers,
            params_buffer,
            sim_groups,
            boid_groups,
            vertex_buffer,
            index_buffer,
            camera_group,
            shared_group: ctx.shared.bind_group().clone(),
            index_count: indices.len() as u32,
        });
        Ok(())
    }

    fn render(&mut self, frame: &mut FrameContext<'_>) -> Result<()> {
        let Some(gpu) = &self.gpu else {
            return Ok(());
        };
        let params = SimParams {
            dt_count: [frame.dt.min(0.05), BOID_COUNT as f32, frame.time, 0.0],
            weights: [1.6, 1.0, 0.9, PERCEPTION_RADIUS],
            limits: [MAX_SPEED, MAX_FORCE, SEPARATION_RADIUS, CENTER_PULL],
            bounds: [self.bounds.x, self.bounds.y, self.bounds.z, TURN_STRENGTH],
        };
        frame
            .queue
            .write_buffer(&gpu.params_buffer, 0, bytemuck::bytes_of(&params));

        {
            let mut cpass = frame
                .encoder
                .begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Flocking Sim Pass"),
                    timestamp_writes: None,
                });
            cpass.set_pipeline(&gpu.sim_pipeline);
            cpass.set_bind_group(0, &*gpu.sim_groups[self.parity], &[]);
            cpass.dispatch_workgroups(BOID_COUNT.div_ceil(WORKGROUP_SIZE), 1, 1);
        }

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
                label: Some("Flocking Draw Pass"),
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
            pass.set_pipeline(&gpu.draw_pipeline);
        } else {
            pass.set_pipeline(&gpu.draw_pipeline_no_depth);
        }
        pass.set_bind_group(0, &gpu.camera_group, &[]);
        pass.set_bind_group(1, &gpu.shared_group, &[]);
        pass.set_bind_group(2, &*gpu.boid_groups[self.parity], &[]);
        pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..gpu.index_count, 0, 0..BOID_COUNT);
        drop(pass);

        self.parity ^= 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.fit_bounds(width, height);
    }

    fn cleanup(&mut self, registry: &ResourceRegistry) {
        self.backdrop.cleanup(registry);
        if let Some(gpu) = self.gpu.take() {
            drop(registry.release(gpu.sim_pipeline));
            drop(registry.release(gpu.draw_pipeline));
            drop(registry.release(gpu.draw_pipeline_no_depth));
            for group in gpu.sim_groups {
                drop(registry.release(group));
            }
            for group in gpu.boid_groups {
                drop(registry.release(group));
            }
            for buffer in gpu.boid_buffers {
                registry.release_buffer(buffer);
            }
            registry.release_buffer(gpu.params_buffer);
            registry.release_buffer(gpu.vertex_buffer);
            registry.release_buffer(gpu.index_buffer);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn dart_mesh() -> (Vec<[f32; 3]>, Vec<u16>) {
    let vertices = vec![
        [0.0, 0.0, 0.5],
        [-0.15, -0.08, -0.3],
        [0.15, -0.08, -0.3],
        [0.0, 0.16, -0.3],
    ];
    let indices = vec![0, 1, 2, 0, 2, 3, 0, 3, 1, 1, 3, 2];
    (vertices, indices)
}

fn seed_boids(bounds: Vec3) -> Vec<Boid> {
    let mut rng = rand::rng();
    let mut boids = Vec::with_capacity(BOID_COUNT as usize);
    for _ in 0..BOID_COUNT {
        let position = Vec3::new(
            rng.random_range(-bounds.x..bounds.x) * 0.5,
            rng.random_range(-bounds.y..bounds.y) * 0.5,
            rng.random_range(-bounds.z..bounds.z) * 0.5,
        );
        let direction = loop {
            let v = Vec3::new(
                rng.random_range(-1.0..1.0f32),
                rng.random_range(-1.0..1.0f32),
                rng.random_range(-1.0..1.0f32),
            );
            let len_sq = v.length_squared();
            if len_sq > 0.01 && len_sq <= 1.0 {
                break v / len_sq.sqrt();
            }
        };
        let velocity = direction * (MAX_SPEED * 0.5);
        boids.push(Boid {
            position: [position.x, position.y, position.z, 0.0],
            velocity: [velocity.x, velocity.y, velocity.z, 0.0],
        });
    }
    boids
}
