//! Camera
//!
//! Perspective camera with GPU-resident matrix uniforms. The math layer
//! (matrices, aspect, position) has no device dependency; a session attaches
//! GPU buffers with [`Camera::attach_gpu`], after which every mutation
//! re-uploads both matrices synchronously so shaders never observe a stale
//! projection/view pair.

use glam::{Mat4, Vec3};

use crate::gpu::{ResourceCategory, ResourceRegistry, Tracked};

const DEFAULT_NEAR: f32 = 0.1;
const DEFAULT_FAR: f32 = 1000.0;

/// Per-experience camera configuration: starting position, vertical field
/// of view in radians, and the orbit rig's base distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPreset {
    /// Initial camera position in world space.
    pub position: Vec3,
    /// Vertical field of view, radians.
    pub fov: f32,
    /// Base orbit distance; the rig's distance is `base_distance × zoom`.
    pub base_distance: f32,
}

impl Default for CameraPreset {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            fov: std::f32::consts::FRAC_PI_3,
            base_distance: 5.0,
        }
    }
}

struct CameraUniforms {
    queue: wgpu::Queue,
    projection_buffer: Tracked<wgpu::Buffer>,
    view_buffer: Tracked<wgpu::Buffer>,
    layout: wgpu::BindGroupLayout,
    bind_group: Tracked<wgpu::BindGroup>,
}

/// Perspective camera looking at a fixed target.
///
/// Invariant: `projection` and `view` are always consistent with the current
/// aspect, fov, and position. Every mutator re-derives the affected matrix
/// and pushes it to the GPU before returning.
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Mat4,
    view: Mat4,
    uniforms: Option<CameraUniforms>,
    active: bool,
}

impl Camera {
    /// Creates a camera from a preset. Non-positive dimensions fall back to
    /// an aspect of 1.0 so construction never fails.
    #[must_use]
    pub fn new(width: f32, height: f32, preset: &CameraPreset) -> Self {
        let aspect = if width > 0.0 && height > 0.0 {
            width / height
        } else {
            1.0
        };
        let position = preset.position;
        let target = Vec3::ZERO;
        let up = Vec3::Y;
        let fov = preset.fov;
        let projection = Mat4::perspective_rh(fov, aspect, DEFAULT_NEAR, DEFAULT_FAR);
        let view = Mat4::look_at_rh(position, target, up);
        Self {
            position,
            target,
            up,
            fov,
            aspect,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            projection,
            view,
            uniforms: None,
            active: true,
        }
    }

    /// Creates the projection/view uniform buffers and their bind group,
    /// registers them, and performs the initial upload.
    pub fn attach_gpu(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        registry: &ResourceRegistry,
    ) {
        let matrix_size = std::mem::size_of::<Mat4>() as wgpu::BufferAddress;
        let projection_buffer = registry.track(
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Camera Projection Buffer"),
                size: matrix_size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            ResourceCategory::Buffer,
        );
        let view_buffer = registry.track(
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Camera View Buffer"),
                size: matrix_size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            ResourceCategory::Buffer,
        );

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let bind_group = registry.track(
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Camera Bind Group"),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: projection_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: view_buffer.as_entire_binding(),
                    },
                ],
            }),
            ResourceCategory::BindGroup,
        );

        self.uniforms = Some(CameraUniforms {
            queue: queue.clone(),
            projection_buffer,
            view_buffer,
            layout,
            bind_group,
        });
        self.write_buffers();
    }

    /// Recomputes the aspect ratio and reissues the projection matrix.
    ///
    /// Fails silently (warn log, no state change) on non-positive
    /// dimensions.
    pub fn update_aspect(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            log::warn!("Ignoring camera aspect update with dimensions {width}x{height}");
            return;
        }
        self.aspect = width / height;
        self.update_projection(self.fov, self.near, self.far);
    }

    /// Recomputes the perspective projection and uploads it.
    pub fn update_projection(&mut self, fov: f32, near: f32, far: f32) {
        self.fov = fov;
        self.near = near;
        self.far = far;
        self.projection = Mat4::perspective_rh(fov, self.aspect, near, far);
        self.write_buffers();
    }

    /// Recomputes the look-at view matrix from the current position and
    /// uploads it.
    pub fn update_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.target, self.up);
        self.write_buffers();
    }

    /// Moves the camera and re-derives the view matrix.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view();
    }

    /// Writes both matrices to their backing GPU buffers.
    ///
    /// No-op while the GPU attachment is absent or the camera has been
    /// cleaned up, so a write can never race a release.
    pub fn write_buffers(&mut self) {
        if !self.active {
            return;
        }
        let Some(uniforms) = &self.uniforms else {
            return;
        };
        uniforms.queue.write_buffer(
            &uniforms.projection_buffer,
            0,
            bytemuck::bytes_of(&self.projection),
        );
        uniforms
            .queue
            .write_buffer(&uniforms.view_buffer, 0, bytemuck::bytes_of(&self.view));
    }

    /// Marks the camera inactive, then releases the owned GPU resources.
    pub fn cleanup(&mut self, registry: &ResourceRegistry) {
        self.active = false;
        if let Some(uniforms) = self.uniforms.take() {
            drop(registry.release(uniforms.bind_group));
            registry.release_buffer(uniforms.projection_buffer);
            registry.release_buffer(uniforms.view_buffer);
        }
    }

    /// Layout of the camera bind group (projection at binding 0, view at
    /// binding 1), available once GPU buffers are attached.
    #[must_use]
    pub fn bind_group_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.uniforms.as_ref().map(|u| &u.layout)
    }

    /// The camera bind group, available once GPU buffers are attached.
    #[must_use]
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.uniforms.as_ref().map(|u| &*u.bind_group)
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[must_use]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}
