//! Poincare disk
//!
//! Fullscreen render of the hyperbolic plane in the Poincare disk model.
//! Moving the cursor applies a Mobius translation, sliding the whole
//! tiling toward the pointer; [`Poincare::set_dither`] switches to an
//! ordered-dither monochrome rendering. Single pass, no depth, no camera.

use std::any::Any;

use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::experience::{Experience, ExperienceContext, FrameContext};
use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};

struct PoincareGpu {
    pipeline: Tracked<wgpu::RenderPipeline>,
    uniform: Tracked<wgpu::Buffer>,
    bind_group: Tracked<wgpu::BindGroup>,
    shared_group: wgpu::BindGroup,
}

pub struct Poincare {
    dither: bool,
    gpu: Option<PoincareGpu>,
}

impl Default for Poincare {
    fn default() -> Self {
        Self::new()
    }
}

impl Poincare {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dither: false,
            gpu: None,
        }
    }

    pub fn set_dither(&mut self, enabled: bool) {
        self.dither = enabled;
    }

    pub fn toggle_dither(&mut self) {
        self.dither = !self.dither;
        log::info!(
            "Poincare dither {}",
            if self.dither { "enabled" } else { "disabled" }
        );
    }

    #[must_use]
    pub fn dither_enabled(&self) -> bool {
        self.dither
    }
}

impl Experience for Poincare {
    fn init(&mut self, ctx: &mut ExperienceContext<'_>) -> Result<()> {
        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Poincare Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/poincare.wgsl").into()),
            });

        let uniform = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Poincare Uniform Buffer"),
                    contents: bytemuck::cast_slice(&[0.0f32; 4]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                }),
            ResourceCategory::Buffer,
        );
        let layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Poincare Bind Group Layout"),
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
                label: Some("Poincare Bind Group"),
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
                label: Some("Poincare Pipeline Layout"),
                bind_group_layouts: &[Some(ctx.shared.layout()), Some(&layout)],
                immediate_size: 0,
            });
        let pipeline = ctx.registry.track(
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Poincare Pipeline"),
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

        self.gpu = Some(PoincareGpu {
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
        let dither = if self.dither { 1.0f32 } else { 0.0 };
        frame.queue.write_buffer(
            &gpu.uniform,
            0,
            bytemuck::cast_slice(&[frame.time, dither, 0.0, 0.0]),
        );

        let mut pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Poincare Pass"),
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
