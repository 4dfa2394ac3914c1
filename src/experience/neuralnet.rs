//! Neural net
//!
//! A floating graph: nodes as view-facing glow sprites, edges as lines
//! carrying traveling pulses. Everything blends additively over the
//! backdrop, so the scene pass skips the depth attachment entirely and
//! draw order does not matter.

use std::any::Any;

use glam::Vec3;
use rand::RngExt;
use rustc_hash::FxHashSet;
use wgpu::util::DeviceExt;

use crate::errors::Result;
use crate::experience::backdrop::Backdrop;
use crate::experience::{Experience, ExperienceContext, FrameContext};
use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};

const NODE_COUNT: usize = 110;
const CLOUD_RADIUS: f32 = 10.0;
const NEAREST_LINKS: usize = 2;
const LONG_LINKS: usize = 12;

const NODE_PALETTE: [[f32; 3]; 3] = [
    [0.95, 0.62, 0.30],
    [0.45, 0.80, 0.95],
    [0.80, 0.55, 0.95],
];

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct NodeInstance {
    position_size: [f32; 4],
    color_phase: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct EdgeVertex {
    position_t: [f32; 4],
    meta: [f32; 4],
}

const QUAD_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: (std::mem::size_of::<f32>() * 2) as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
};

const NODE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<NodeInstance>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &wgpu::vertex_attr_array![1 => Float32x4, 2 => Float32x4],
};

const EDGE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<EdgeVertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4],
};

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

struct NeuralNetGpu {
    node_pipeline: Tracked<wgpu::RenderPipeline>,
    edge_pipeline: Tracked<wgpu::RenderPipeline>,
    quad_buffer: Tracked<wgpu::Buffer>,
    quad_index_buffer: Tracked<wgpu::Buffer>,
    node_buffer: Tracked<wgpu::Buffer>,
    edge_buffer: Tracked<wgpu::Buffer>,
    scene_uniform: Tracked<wgpu::Buffer>,
    scene_group: Tracked<wgpu::BindGroup>,
    camera_group: wgpu::BindGroup,
    shared_group: wgpu::BindGroup,
    node_count: u32,
    edge_vertex_count: u32,
}

pub struct NeuralNet {
    backdrop: Backdrop,
    gpu: Option<NeuralNetGpu>,
}

impl Default for NeuralNet {
    fn default() -> Self {
        Self::new()
    }
}

impl NeuralNet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backdrop: Backdrop::gradient(
                [0.030, 0.045, 0.095, 1.0],
                [0.006, 0.008, 0.020, 1.0],
            ),
            gpu: None,
        }
    }
}

impl Experience for NeuralNet {
    fn init(&mut self, ctx: &mut ExperienceContext<'_>) -> Result<()> {
        self.backdrop.init(ctx);
        let (camera_layout, camera_group) = ctx.camera_bindings("neuralnet")?;

        let (nodes, edges) = build_graph();
        let quad: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
        let quad_indices: [u16; 6] = [0, 1, 2, 0, 2, 3];

        let quad_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Node Quad Vertex Buffer"),
                    contents: bytemuck::cast_slice(&quad),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            ResourceCategory::Buffer,
        );
        let quad_index_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Node Quad Index Buffer"),
                    contents: bytemuck::cast_slice(&quad_indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
            ResourceCategory::Buffer,
        );
        let node_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Node Instance Buffer"),
                    contents: bytemuck::cast_slice(&nodes),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            ResourceCategory::Buffer,
        );
        let edge_buffer = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Edge Vertex Buffer"),
                    contents: bytemuck::cast_slice(&edges),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            ResourceCategory::Buffer,
        );

        let scene_uniform = ctx.registry.track(
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Neural Net Scene Uniform"),
                    contents: bytemuck::cast_slice(&[0.0f32; 4]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                }),
            ResourceCategory::Buffer,
        );
        let scene_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Neural Net Scene Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
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
                label: Some("Neural Net Scene Bind Group"),
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
                label: Some("Neural Net Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/neuralnet.wgsl").into()),
            });
        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Neural Net Pipeline Layout"),
                bind_group_layouts: &[Some(camera_layout), Some(ctx.shared.layout()), Some(&scene_layout)],
                immediate_size: 0,
            });

        let color_target = Some(wgpu::ColorTargetState {
            format: ctx.color_format,
            blend: Some(ADDITIVE_BLEND),
            write_mask: wgpu::ColorWrites::ALL,
        });
        let node_pipeline = ctx.registry.track(
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Node Pipeline"),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_node"),
                        buffers: &[QUAD_LAYOUT, NODE_LAYOUT],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_node"),
                        targets: &[color_target.clone()],
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
        let edge_pipeline = ctx.registry.track(
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Edge Pipeline"),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_edge"),
                        buffers: &[EDGE_LAYOUT],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_edge"),
                        targets: &[color_target],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::LineList,
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

        self.gpu = Some(NeuralNetGpu {
            node_pipeline,
            edge_pipeline,
            quad_buffer,
            quad_index_buffer,
            node_buffer,
            edge_buffer,
            scene_uniform,
            scene_group,
            camera_group,
            shared_group: ctx.shared.bind_group().clone(),
            node_count: nodes.len() as u32,
            edge_vertex_count: edges.len() as u32,
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

        let mut pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Neural Net Pass"),
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
        pass.set_bind_group(0, &gpu.camera_group, &[]);
        pass.set_bind_group(1, &gpu.shared_group, &[]);
        pass.set_bind_group(2, &*gpu.scene_group, &[]);

        pass.set_pipeline(&gpu.edge_pipeline);
        pass.set_vertex_buffer(0, gpu.edge_buffer.slice(..));
        pass.draw(0..gpu.edge_vertex_count, 0..1);

        pass.set_pipeline(&gpu.node_pipeline);
        pass.set_vertex_buffer(0, gpu.quad_buffer.slice(..));
        pass.set_vertex_buffer(1, gpu.node_buffer.slice(..));
        pass.set_index_buffer(gpu.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..6, 0, 0..gpu.node_count);
        Ok(())
    }

    fn cleanup(&mut self, registry: &ResourceRegistry) {
        self.backdrop.cleanup(registry);
        if let Some(gpu) = self.gpu.take() {
            drop(registry.release(gpu.node_pipeline));
            drop(registry.release(gpu.edge_pipeline));
            drop(registry.release(gpu.scene_group));
            registry.release_buffer(gpu.quad_buffer);
            registry.release_buffer(gpu.quad_index_buffer);
            registry.release_buffer(gpu.node_buffer);
            registry.release_buffer(gpu.edge_buffer);
            registry.release_buffer(gpu.scene_uniform);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Random node cloud wired to nearest neighbors plus a few long links.
fn build_graph() -> (Vec<NodeInstance>, Vec<EdgeVertex>) {
    let mut rng = rand::rng();

    let mut positions = Vec::with_capacity(NODE_COUNT);
    let mut nodes = Vec::with_capacity(NODE_COUNT);
    for _ in 0..NODE_COUNT {
        let position = loop {
            let candidate = Vec3::new(
                rng.random_range(-1.0..1.0f32),
                rng.random_range(-1.0..1.0f32),
                rng.random_range(-1.0..1.0f32),
            );
            if candidate.length_squared() <= 1.0 {
                break candidate * CLOUD_RADIUS;
            }
        };
        let size = rng.random_range(0.25..0.60);
        let color = NODE_PALETTE[rng.random_range(0..NODE_PALETTE.len())];
        positions.push(position);
        nodes.push(NodeInstance {
            position_size: [position.x, position.y, position.z, size],
            color_phase: [color[0], color[1], color[2], rng.random_range(0.0..1.0)],
        });
    }

    let mut links: FxHashSet<(usize, usize)> = FxHashSet::default();
    for (i, position) in positions.iter().enumerate() {
        let mut others: Vec<(usize, f32)> = positions
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(j, other)| (j, position.distance_squared(*other)))
            .collect();
        others.sort_by(|a, b| a.1.total_cmp(&b.1));
        for (j, _) in others.into_iter().take(NEAREST_LINKS) {
            links.insert((i.min(j), i.max(j)));
        }
    }
    for _ in 0..LONG_LINKS {
        let a = rng.random_range(0..NODE_COUNT);
        let b = rng.random_range(0..NODE_COUNT);
        if a != b {
            links.insert((a.min(b), a.max(b)));
        }
    }

    let mut edges = Vec::with_capacity(links.len() * 2);
    for (a, b) in links {
        let phase = rng.random_range(0.0..1.0f32);
        let length = positions[a].distance(positions[b]);
        let endpoint = |p: Vec3, t: f32| EdgeVertex {
            position_t: [p.x, p.y, p.z, t],
            meta: [phase, length, 0.0, 0.0],
        };
        edges.push(endpoint(positions[a], 0.0));
        edges.push(endpoint(positions[b], 1.0));
    }
    (nodes, edges)
}
