//! Backdrop layer
//!
//! Fullscreen underlay recorded as the first pass of a frame. It clears the
//! color target itself, so experiences that use it keep `LoadOp::Load` on
//! their scene passes. Two styles: a vertical two-color gradient and a
//! hash-based starfield with a slow twinkle.

use crate::experience::{ExperienceContext, FrameContext};
use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};
use wgpu::util::DeviceExt;

#[derive(Debug, Clone, Copy)]
pub enum BackdropStyle {
    Gradient { top: [f32; 4], bottom: [f32; 4] },
    Starfield { density: f32 },
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BackdropUniform {
    top: [f32; 4],
    bottom: [f32; 4],
    // x = style, y = time, z = density
    params: [f32; 4],
}

struct BackdropGpu {
    pipeline: Tracked<wgpu::RenderPipeline>,
    uniform: Tracked<wgpu::Buffer>,
    bind_group: Tracked<wgpu::BindGroup>,
    shared_group: wgpu::BindGroup,
}

pub struct Backdrop {
    style: BackdropStyle,
    gpu: Option<BackdropGpu>,
}

impl Backdrop {
    #[must_use]
    pub fn gradient(top: [f32; 4], bottom: [f32; 4]) -> Self {
        Self {
            style: BackdropStyle::Gradient { top, bottom },
            gpu: None,
        }
    }

    #[must_use]
    pub fn starfield(density: f32) -> Self {
        Self {
            style: BackdropStyle::Starfield { density },
            gpu: None,
        }
    }

    pub fn init(&mut self, ctx: &ExperienceContext<'_>) {
        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Backdrop Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/backdrop.wgsl").into()),
            });

        let uniform = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Backdrop Uniform Buffer"),
                    contents: bytemuck::bytes_of(&self.compose_uniform(0.0)),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                }),
            ResourceCategory::Buffer,
        );

        let layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Backdrop Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let bind_group = ctx.registry.track(
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Backdrop Bind Group"),
                layout: &layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                }],
            }),
            ResourceCategory::BindGroup,
        );

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Backdrop Pipeline Layout"),
                bind_group_layouts: &[Some(ctx.shared.layout()), Some(&layout)],
                immediate_size: 0,
            });
        let pipeline = ctx.registry.track(
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Backdrop Pipeline"),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        buffers: &[],
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
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                }),
            ResourceCategory::Pipeline,
        );

        self.gpu = Some(BackdropGpu {
            pipeline,
            uniform,
            bind_group,
            shared_group: ctx.shared.bind_group().clone(),
        });
    }

    /// Records the backdrop pass. Clears the color target, no depth.
    pub fn record(&self, frame: &mut FrameContext<'_>) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        frame.queue.write_buffer(
            &gpu.uniform,
            0,
            bytemuck::bytes_of(&self.compose_uniform(frame.time)),
        );
        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Backdrop Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(frame.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        pass.set_pipeline(&gpu.pipeline);
        pass.set_bind_group(0, &gpu.shared_group, &[]);
        pass.set_bind_group(1, &*gpu.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    pub fn cleanup(&mut self, registry: &ResourceRegistry) {
        if let Some(gpu) = self.gpu.take() {
            drop(registry.release(gpu.pipeline));
            drop(registry.release(gpu.bind_group));
            registry.release_buffer(gpu.uniform);
        }
    }

    fn compose_uniform(&self, time: f32) -> BackdropUniform {
        match self.style {
            BackdropStyle::Gradient { top, bottom } => BackdropUniform {
                top,
                bottom,
                params: [0.0, time, 0.0, 0.0],
            },
            BackdropStyle::Starfield { density } => BackdropUniform {
                top: [0.020, 0.030, 0.060, 1.0],
                bottom: [0.004, 0.005, 0.012, 1.0],
                params: [1.0, time, density, 0.0],
            },
        }
    }
}
