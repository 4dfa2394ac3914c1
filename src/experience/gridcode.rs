//! Grid code
//!
//! Entorhinal grid-cell firing fields as a fullscreen shader: three plane
//! waves at 60 degree offsets interfere into a hexagonal bump lattice, and
//! the cursor plays the tracked position, lighting up the bumps it crosses.
//! [`GridCode::set_scale`] selects among several module spacings the way
//! grid modules step along the dorsoventral axis.

use std::any::Any;

use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::experience::{Experience, ExperienceContext, FrameContext};
use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};

/// Module spacings in scene units, small to large.
pub const MODULE_SPACINGS: [f32; 4] = [0.18, 0.30, 0.50, 0.80];

struct GridCodeGpu {
    pipeline: Tracked<wgpu::RenderPipeline>,
    uniform: Tracked<wgpu::Buffer>,
    bind_group: Tracked<wgpu::BindGroup>,
    shared_group: wgpu::BindGroup,
}

pub struct GridCode {
    scale_index: usize,
    gpu: Option<GridCodeGpu>,
}

impl Default for GridCode {
    fn default() -> Self {
        Self::new()
    }
}

impl GridCode {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scale_index: 1,
            gpu: None,
        }
    }

    /// Selects a module by index; out-of-range indices clamp to the
    /// largest module.
    pub fn set_scale(&mut self, index: usize) {
        self.scale_index = index.min(MODULE_SPACINGS.len() - 1);
    }

    pub fn cycle_scale(&mut self) {
        self.scale_index = (self.scale_index + 1) % MODULE_SPACINGS.len();
        log::info!(
            "Grid module {} (spacing {})",
            self.scale_index,
            MODULE_SPACINGS[self.scale_index]
        );
    }

    #[must_use]
    pub fn scale_index(&self) -> usize {
        self.scale_index
    }
}

impl Experience for GridCode {
    fn init(&mut self, ctx: &mut ExperienceContext<'_>) -> Result<()> {
        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Grid Code Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gridcode.wgsl").into()),
            });

        let uniform = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Grid Code Uniform Buffer"),
                    contents: bytemuck::cast_slice(&[0.0f32; 4]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                }),
            ResourceCategory::Buffer,
        );
        let layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Grid Code Bind Group Layout"),
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
                label: Some("Grid Code Bind Group"),
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
                label: Some("Grid Code Pipeline Layout"),
                bind_group_layouts: &[Some(ctx.shared.layout()), Some(&layout)],
                immediate_size: 0,
            });
        let pipeline = ctx.registry.track(
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Grid Code Pipeline"),
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

        self.gpu = Some(GridCodeGpu {
            pipeline,
            uniform,
            bind_group,
            shared_group: ctx.shared.bind_group().clone(),
        });
        Ok(())
    }

    fn render(&mut self, frame: &mut FrameContext<'_>) -> Result<()> {
        let Some(gpu) = &self.gpu else {
            return Ok(());
        };
        let spacing = MODULE_SPACINGS[self.scale_index];
        frame.queue.write_buffer(
            &gpu.uniform,
            0,
            bytemuck::cast_slice(&[frame.time, spacing, 0.0, 0.0]),
        );

        let mut pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Grid Code Pass"),
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
        Ok(())
    }

    fn cleanup(&mut self, registry: &ResourceRegistry) {
        if let Some(gpu) = self.gpu.take() {
            drop(registry.release(gpu.pipeline));
            drop(registry.release(gpu.bind_group));
            registry.release_buffer(gpu.uniform);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
