//! Resource manager
//!
//! Owns the GPU state shared by every experience: the viewport and mouse
//! uniform buffers with their bind group, the depth attachment, and the
//! registry of constructed experiences. Resize flows through here so the
//! uniforms, the depth target, the camera aspect, and the experiences all
//! observe one consistent viewport.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::experience::{Experience, ExperienceKind, ExperienceRegistry};
use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};

/// Viewport/mouse uniforms bound at a single group shared across
/// experiences: viewport `[width, height, dpr, 0]` at binding 0, mouse
/// `[x_px, y_px, x_ndc, y_ndc]` at binding 1.
pub struct SharedBindings {
    viewport_buffer: Tracked<wgpu::Buffer>,
    mouse_buffer: Tracked<wgpu::Buffer>,
    layout: wgpu::BindGroupLayout,
    bind_group: Tracked<wgpu::BindGroup>,
}

impl SharedBindings {
    fn new(device: &wgpu::Device, registry: &ResourceRegistry) -> Self {
        let viewport_buffer = registry.track(
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Viewport Uniform Buffer"),
                contents: bytemuck::cast_slice(&[0.0f32; 4]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            }),
            ResourceCategory::Buffer,
        );
        let mouse_buffer = registry.track(
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mouse Uniform Buffer"),
                contents: bytemuck::cast_slice(&[0.0f32; 4]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            }),
            ResourceCategory::Buffer,
        );

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shared Bind Group Layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let bind_group = registry.track(
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Shared Bind Group"),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: viewport_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: mouse_buffer.as_entire_binding(),
                    },
                ],
            }),
            ResourceCategory::BindGroup,
        );

        Self {
            viewport_buffer,
            mouse_buffer,
            layout,
            bind_group,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

struct DepthTarget {
    texture: Tracked<wgpu::Texture>,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// Shared GPU state and the experience registry for one session.
pub struct ResourceManager {
    device: wgpu::Device,
    queue: wgpu::Queue,
    registry: Arc<ResourceRegistry>,
    depth_format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    dpr: f32,
    shared: SharedBindings,
    depth: Option<DepthTarget>,
    experiences: ExperienceRegistry,
}

impl ResourceManager {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        registry: Arc<ResourceRegistry>,
        depth_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        dpr: f32,
    ) -> Self {
        let shared = SharedBindings::new(device, &registry);
        let mut manager = Self {
            device: device.clone(),
            queue: queue.clone(),
            registry,
            depth_format,
            width,
            height,
            dpr,
            shared,
            depth: None,
            experiences: ExperienceRegistry::new(),
        };
        manager.write_viewport_uniform();
        manager.recreate_depth();
        manager
    }

    /// Applies a viewport change: stores the dimensions, rewrites the
    /// viewport uniform, recreates the depth target, updates the camera
    /// aspect, and notifies every registered experience.
    ///
    /// Zero-sized updates are ignored with a warning; the previous
    /// resources stay valid.
    pub fn update_viewport_size(
        &mut self,
        width: u32,
        height: u32,
        dpr: f32,
        camera: &mut Camera,
    ) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring viewport update to {width}x{height}");
            return;
        }
        let changed = width != self.width || height != self.height;
        self.width = width;
        self.height = height;
        self.dpr = dpr;
        self.write_viewport_uniform();
        if changed || self.depth.is_none() {
            self.recreate_depth();
        }
        if changed {
            camera.update_aspect(width as f32, height as f32);
            for (_, experience) in self.experiences.iter_mut() {
                experience.resize(width, height);
            }
        }
    }

    /// Updates the mouse uniform from a cursor position in physical
    /// pixels. The NDC pair is x-right, y-up in `[-1, 1]`.
    pub fn update_mouse(&self, x: f32, y: f32) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let ndc_x = x / self.width as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - y / self.height as f32 * 2.0;
        let data = [x, y, ndc_x, ndc_y];
        self.queue
            .write_buffer(&self.shared.mouse_buffer, 0, bytemuck::cast_slice(&data));
    }

    /// Depth view matching the current viewport, recreated lazily after a
    /// resize. `None` while the viewport has no valid dimensions.
    pub fn depth_view(&mut self) -> Option<wgpu::TextureView> {
        let stale = match &self.depth {
            Some(depth) => depth.width != self.width || depth.height != self.height,
            None => true,
        };
        if stale {
            self.recreate_depth();
        }
        self.depth.as_ref().map(|d| d.view.clone())
    }

    pub fn register_experience(&mut self, kind: ExperienceKind, experience: Box<dyn Experience>) {
        self.experiences.register(kind, experience);
    }

    #[must_use]
    pub fn experience_mut(
        &mut self,
        kind: ExperienceKind,
    ) -> Option<&mut (dyn Experience + 'static)> {
        self.experiences.get_mut(kind)
    }

    #[must_use]
    pub fn shared(&self) -> &SharedBindings {
        &self.shared
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn dpr(&self) -> f32 {
        self.dpr
    }

    /// Tears down every registered experience in registration order.
    pub fn cleanup_experiences(&mut self) {
        for (kind, mut experience) in self.experiences.drain() {
            log::info!("Cleaning up experience '{kind}'");
            experience.shutdown();
            experience.cleanup(&self.registry);
        }
    }

    /// Full teardown: experiences first, then the depth target and the
    /// shared uniforms.
    pub fn cleanup(mut self) {
        self.cleanup_experiences();
        if let Some(depth) = self.depth.take() {
            self.registry.release_texture(depth.texture);
        }
        let shared = self.shared;
        drop(self.registry.release(shared.bind_group));
        self.registry.release_buffer(shared.viewport_buffer);
        self.registry.release_buffer(shared.mouse_buffer);
    }

    fn write_viewport_uniform(&self) {
        let data = [self.width as f32, self.height as f32, self.dpr, 0.0];
        self.queue.write_buffer(
            &self.shared.viewport_buffer,
            0,
            bytemuck::cast_slice(&data),
        );
    }

    fn recreate_depth(&mut self) {
        if let Some(old) = self.depth.take() {
            self.registry.release_texture(old.texture);
        }
        if self.width == 0 || self.height == 0 {
            return;
        }
        let texture = self.registry.track(
            self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Target"),
                size: wgpu::Extent3d {
                    width: self.width,
                    height: self.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: self.depth_format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            }),
            ResourceCategory::Texture,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some(DepthTarget {
            texture,
            view,
            width: self.width,
            height: self.height,
        });
    }
}
