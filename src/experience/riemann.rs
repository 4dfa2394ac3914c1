//! Riemann surface
//!
//! A square grid lifted into the graph of a complex function: height is
//! the real part, color is the argument. The grid geometry never changes;
//! [`Riemann::set_surface`] only flips a uniform, so switching functions
//! is free.

use std::any::Any;

use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::experience::backdrop::Backdrop;
use crate::experience::{Experience, ExperienceContext, FrameContext};
use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};

const GRID_CELLS: u32 = 128;

/// Complex functions the surface can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// f(z) = z^2
    Square,
    /// f(z) = 1/z
    Reciprocal,
    /// f(z) = sqrt(z), principal branch
    Sqrt,
    /// f(z) = sin(z)
    Sine,
}

impl SurfaceKind {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            SurfaceKind::Square => SurfaceKind::Reciprocal,
            SurfaceKind::Reciprocal => SurfaceKind::Sqrt,
            SurfaceKind::Sqrt => SurfaceKind::Sine,
            SurfaceKind::Sine => SurfaceKind::Square,
        }
    }

    fn shader_index(self) -> f32 {
        match self {
            SurfaceKind::Square => 0.0,
            SurfaceKind::Reciprocal => 1.0,
            SurfaceKind::Sqrt => 2.0,
            SurfaceKind::Sine => 3.0,
        }
    }
}

struct RiemannGpu {
    pipeline: Tracked<wgpu::RenderPipeline>,
    pipeline_no_depth: Tracked<wgpu::RenderPipeline>,
    vertex_buffer: Tracked<wgpu::Buffer>,
    index_buffer: Tracked<wgpu::Buffer>,
    surface_uniform: Tracked<wgpu::Buffer>,
    surface_group: Tracked<wgpu::BindGroup>,
    camera_group: wgpu::BindGroup,
    shared_group: wgpu::BindGroup,
    index_count: u32,
}

pub struct Riemann {
    backdrop: Backdrop,
    kind: SurfaceKind,
    gpu: Option<RiemannGpu>,
}

impl Default for Riemann {
    fn default() -> Self {
        Self::new()
    }
}

impl Riemann {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backdrop: Backdrop::gradient(
                [0.060, 0.040, 0.110, 1.0],
                [0.010, 0.008, 0.022, 1.0],
            ),
            kind: SurfaceKind::Square,
            gpu: None,
        }
    }

    /// Selects the function to graph; takes effect next frame.
    pub fn set_surface(&mut self, kind: SurfaceKind) {
        self.kind = kind;
    }

    pub fn cycle_surface(&mut self) {
        self.kind = self.kind.next();
        log::info!("Riemann surface {:?}", self.kind);
    }

    #[must_use]
    pub fn surface(&self) -> SurfaceKind {
        self.kind
    }
}

impl Experience for Riemann {
    fn init(&mut self, ctx: &mut ExperienceContext<'_>) -> Result<()> {
        self.backdrop.init(ctx);
        let (camera_layout, camera_group) = ctx.camera_bindings("riemann")?;

        let (vertices, indices) = grid_mesh(GRID_CELLS);
        let vertex_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Riemann Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            ResourceCategory::Buffer,
        );
        let index_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Riemann Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
            ResourceCategory::Buffer,
        );

        let surface_uniform = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Riemann Surface Uniform"),
                    contents: bytemuck::cast_slice(&[0.0f32; 4]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                }),
            ResourceCategory::Buffer,
        );
        let surface_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Riemann Surface Bind Group Layout"),
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
        let surface_group = ctx.registry.track(
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Riemann Surface Bind Group"),
                layout: &surface_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: surface_uniform.as_entire_binding(),
                }],
            }),
            ResourceCategory::BindGroup,
        );

        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Riemann Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/riemann.wgsl").into()),
            });
        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Riemann Pipeline Layout"),
                bind_group_layouts: &[Some(camera_layout), Some(ctx.shared.layout()), Some(&surface_layout)],
                immediate_size: 0,
            });
        let make_pipeline = |depth: bool| {
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Riemann Pipeline"),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        buffers: &[wgpu::VertexBufferLayout {
                            array_stride: (std::mem::size_of::<f32>() * 2)
                                as wgpu::BufferAddress,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                        }],
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
                        // Both sides of the sheet are visible.
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
        let pipeline = ctx
            .registry
            .track(make_pipeline(true), ResourceCategory::Pipeline);
        let pipeline_no_depth = ctx
            .registry
            .track(make_pipeline(false), ResourceCategory::Pipeline);

        self.gpu = Some(RiemannGpu {
            pipeline,
            pipeline_no_depth,
            vertex_buffer,
            index_buffer,
            surface_uniform,
            surface_group,
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
        frame.queue.write_buffer(
            &gpu.surface_uniform,
            0,
            bytemuck::cast_slice(&[self.kind.shader_index(), frame.time, 0.0, 0.0]),
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
                label: Some("Riemann Pass"),
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
        pass.set_bind_group(2, &*gpu.surface_group, &[]);
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
            drop(registry.release(gpu.surface_group));
            registry.release_buffer(gpu.vertex_buffer);
            registry.release_buffer(gpu.index_buffer);
            registry.release_buffer(gpu.surface_uniform);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Flat (cells + 1)^2 grid over [-1, 1]^2, u16-indexed.
fn grid_mesh(cells: u32) -> (Vec<[f32; 2]>, Vec<u16>) {
    let side = cells + 1;
    let mut vertices = Vec::with_capacity((side * side) as usize);
    for row in 0..side {
        for col in 0..side {
            vertices.push([
                col as f32 / cells as f32 * 2.0 - 1.0,
                row as f32 / cells as f32 * 2.0 - 1.0,
            ]);
        }
    }
    let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
    for row in 0..cells {
        for col in 0..cells {
            let a = (row * side + col) as u16;
            let b = a + side as u16;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}
