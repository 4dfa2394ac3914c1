//! Lorenz attractor
//!
//! Thousands of particles integrating the Lorenz system on the GPU. The
//! update is pointwise, so a single storage buffer is stepped in place
//! each frame and then drawn as additive points; the characteristic
//! butterfly forms within a second or two from a random seed cloud.

use std::any::Any;

use rand::RngExt;
use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::experience::backdrop::Backdrop;
use crate::experience::{Experience, ExperienceContext, FrameContext};
use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};

const PARTICLE_COUNT: u32 = 8192;
const WORKGROUP_SIZE: u32 = 64;
// Fraction of wall-clock dt fed to the integrator; full frame steps
// overshoot the attractor's fast lobes.
const TIME_SCALE: f32 = 0.5;

const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

struct LorenzGpu {
    sim_pipeline: Tracked<wgpu::ComputePipeline>,
    draw_pipeline: Tracked<wgpu::RenderPipeline>,
    particle_buffer: Tracked<wgpu::Buffer>,
    params_buffer: Tracked<wgpu::Buffer>,
    sim_group: Tracked<wgpu::BindGroup>,
    draw_group: Tracked<wgpu::BindGroup>,
    camera_group: wgpu::BindGroup,
    shared_group: wgpu::BindGroup,
}

pub struct Lorenz {
    backdrop: Backdrop,
    gpu: Option<LorenzGpu>,
}

impl Default for Lorenz {
    fn default() -> Self {
        Self::new()
    }
}

impl Lorenz {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backdrop: Backdrop::gradient(
                [0.014, 0.018, 0.042, 1.0],
                [0.002, 0.003, 0.008, 1.0],
            ),
            gpu: None,
        }
    }
}

impl Experience for Lorenz {
    fn init(&mut self, ctx: &mut ExperienceContext<'_>) -> Result<()> {
        self.backdrop.init(ctx);
        let (camera_layout, camera_group) = ctx.camera_bindings("lorenz")?;

        let seed = seed_particles();
        let particle_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Lorenz Particle Buffer"),
                    contents: bytemuck::cast_slice(&seed),
                    usage: wgpu::BufferUsages::STORAGE,
                }),
            ResourceCategory::Buffer,
        );
        let params_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Lorenz Params Buffer"),
                    contents: bytemuck::cast_slice(&[0.0f32; 4]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                }),
            ResourceCategory::Buffer,
        );

        let sim_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Lorenz Sim Bind Group Layout"),
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
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });
        let sim_group = ctx.registry.track(
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Lorenz Sim Bind Group"),
                layout: &sim_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: particle_buffer.as_entire_binding(),
                    },
                ],
            }),
            ResourceCategory::BindGroup,
        );

        let draw_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Lorenz Draw Bind Group Layout"),
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
        let draw_group = ctx.registry.track(
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Lorenz Draw Bind Group"),
                layout: &draw_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: particle_buffer.as_entire_binding(),
                }],
            }),
            ResourceCategory::BindGroup,
        );

        let sim_shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Lorenz Sim Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/lorenz_sim.wgsl").into()),
            });
        let sim_pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Lorenz Sim Pipeline Layout"),
                bind_group_layouts: &[Some(&sim_layout)],
                immediate_size: 0,
            });
        let sim_pipeline = ctx.registry.track(
            ctx.device
                .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some("Lorenz Sim Pipeline"),
                    layout: Some(&sim_pipeline_layout),
                    module: &sim_shader,
                    entry_point: Some("main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    cache: None,
                }),
            ResourceCategory::Pipeline,
        );

        let draw_shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Lorenz Draw Shader"),
                source: wgpu::ShaderSource::Wgsl(
                    include_str!("shaders/lorenz_draw.wgsl").into(),
                ),
            });
        let draw_pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Lorenz Draw Pipeline Layout"),
                bind_group_layouts: &[Some(camera_layout), Some(ctx.shared.layout()), Some(&draw_layout)],
                immediate_size: 0,
            });
        let draw_pipeline = ctx.registry.track(
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Lorenz Draw Pipeline"),
                    layout: Some(&draw_pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &draw_shader,
                        entry_point: Some("vs_main"),
                        buffers: &[],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &draw_shader,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: ctx.color_format,
                            blend: Some(ADDITIVE_BLEND),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::PointList,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                }),
            ResourceCategory::Pipeline,
        );

        self.gpu = Some(LorenzGpu {
            sim_pipeline,
            draw_pipeline,
            particle_buffer,
            params_buffer,
            sim_group,
            draw_group,
            camera_group,
            shared_group: ctx.shared.bind_group().clone(),
        });
        Ok(())
    }

    fn render(&mut self, frame: &mut FrameContext<'_>) -> Result<()> {
        let Some(gpu) = &self.gpu else {
            return Ok(());
        };
        let dt = frame.dt.min(0.05) * TIME_SCALE;
        frame.queue.write_buffer(
            &gpu.params_buffer,
            0,
            bytemuck::cast_slice(&[dt, frame.time, 0.0, 0.0]),
        );

        {
            let mut cpass = frame
                .encoder
                .begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Lorenz Sim Pass"),
                    timestamp_writes: None,
                });
            cpass.set_pipeline(&gpu.sim_pipeline);
            cpass.set_bind_group(0, &*gpu.sim_group, &[]);
            cpass.dispatch_workgroups(PARTICLE_COUNT.div_ceil(WORKGROUP_SIZE), 1, 1);
        }

        self.backdrop.record(frame);

        let mut pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Lorenz Draw Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                ..Default::default()
            });
        pass.set_pipeline(&gpu.draw_pipeline);
        pass.set_bind_group(0, &gpu.camera_group, &[]);
        pass.set_bind_group(1, &gpu.shared_group, &[]);
        pass.set_bind_group(2, &*gpu.draw_group, &[]);
        pass.draw(0..PARTICLE_COUNT, 0..1);
        Ok(())
    }

    fn cleanup(&mut self, registry: &ResourceRegistry) {
        self.backdrop.cleanup(registry);
        if let Some(gpu) = self.gpu.take() {
            drop(registry.release(gpu.sim_pipeline));
            drop(registry.release(gpu.draw_pipeline));
            drop(registry.release(gpu.sim_group));
            drop(registry.release(gpu.draw_group));
            registry.release_buffer(gpu.particle_buffer);
            registry.release_buffer(gpu.params_buffer);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Random cloud around the attractor basin; trajectories fall onto the
/// wings almost immediately.
fn seed_particles() -> Vec<[f32; 4]> {
    let mut rng = rand::rng();
    (0..PARTICLE_COUNT)
        .map(|_| {
            [
                rng.random_range(-20.0..20.0),
                rng.random_range(-25.0..25.0),
                rng.random_range(5.0..45.0),
                0.0,
            ]
        })
        .collect()
}
