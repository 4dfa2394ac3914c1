//! Experiences
//!
//! An experience is one self-contained visualization: it builds its GPU
//! resources in [`Experience::init`], records passes each frame in
//! [`Experience::render`], and returns everything it tracked in
//! [`Experience::cleanup`]. The engine owns exactly one active experience
//! at a time; [`ExperienceKind`] is the closed set of constructors and
//! camera presets, and [`ExperienceRegistry`] keeps the constructed
//! instances in registration order so teardown is deterministic.

use std::any::Any;
use std::str::FromStr;

use glam::Vec3;

use crate::camera::{Camera, CameraPreset};
use crate::errors::{Result, VitrineError};
use crate::gpu::ResourceRegistry;
use crate::resources::SharedBindings;

pub mod backdrop;
pub mod cube;
pub mod flocking;
pub mod globe;
pub mod gridcode;
pub mod lorenz;
pub mod neuralnet;
pub mod poincare;
pub mod riemann;

pub use cube::CubeField;
pub use flocking::Flocking;
pub use globe::{Globe, GlobeStyle};
pub use gridcode::GridCode;
pub use lorenz::Lorenz;
pub use neuralnet::NeuralNet;
pub use poincare::Poincare;
pub use riemann::{Riemann, SurfaceKind};

// ============================================================================
// Contexts
// ============================================================================

/// Everything an experience may touch while building its resources.
pub struct ExperienceContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub registry: &'a ResourceRegistry,
    /// Camera with GPU buffers already attached; experiences clone its bind
    /// group and layout rather than owning them.
    pub camera: &'a Camera,
    /// Viewport/mouse uniforms shared by every experience.
    pub shared: &'a SharedBindings,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

impl ExperienceContext<'_> {
    /// Camera bind group layout and a clone of its bind group, or an init
    /// error naming the experience when the camera has no GPU attachment.
    pub fn camera_bindings(
        &self,
        name: &'static str,
    ) -> Result<(&wgpu::BindGroupLayout, wgpu::BindGroup)> {
        let missing = || VitrineError::ExperienceInitFailed {
            name,
            reason: "camera has no GPU attachment".into(),
        };
        let layout = self.camera.bind_group_layout().ok_or_else(missing)?;
        let group = self.camera.bind_group().ok_or_else(missing)?.clone();
        Ok((layout, group))
    }
}

/// Per-frame recording context. The engine owns the encoder and submits
/// once after the experience has recorded all of its passes.
pub struct FrameContext<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// Swapchain color target for this frame.
    pub target: &'a wgpu::TextureView,
    /// Depth target, absent while the viewport has no valid dimensions.
    pub depth: Option<&'a wgpu::TextureView>,
    pub queue: &'a wgpu::Queue,
    /// Session clear color for passes that clear the target directly.
    pub clear_color: wgpu::Color,
    /// Seconds since the session started.
    pub time: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
}

// ============================================================================
// Experience trait
// ============================================================================

/// Lifecycle contract for a visualization.
///
/// `init`, `render`, and `cleanup` are required; `resize` and `shutdown`
/// have empty default bodies for experiences that do not care. Mode
/// switches beyond this contract (dither toggles, surface selection) are
/// inherent methods on the concrete types, reached through `as_any_mut`.
pub trait Experience {
    /// Builds GPU resources. Every resource must be tracked through the
    /// registry passed in the context.
    fn init(&mut self, ctx: &mut ExperienceContext<'_>) -> Result<()>;

    /// Records this frame's passes into the shared encoder.
    fn render(&mut self, frame: &mut FrameContext<'_>) -> Result<()>;

    /// Viewport dimensions changed.
    fn resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Last call before cleanup; stop timers and pending work here.
    fn shutdown(&mut self) {}

    /// Returns every tracked resource to the registry. Must leave the
    /// experience inert; a second call must be a no-op.
    fn cleanup(&mut self, registry: &ResourceRegistry);

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ============================================================================
// Experience kinds
// ============================================================================

/// The closed set of built-in experiences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperienceKind {
    Flocking,
    CubeField,
    Poincare,
    Globe,
    NeuralNet,
    Riemann,
    Lorenz,
    GridCode,
}

impl ExperienceKind {
    /// All kinds in gallery order.
    pub const ALL: [ExperienceKind; 8] = [
        ExperienceKind::Flocking,
        ExperienceKind::CubeField,
        ExperienceKind::Poincare,
        ExperienceKind::Globe,
        ExperienceKind::NeuralNet,
        ExperienceKind::Riemann,
        ExperienceKind::Lorenz,
        ExperienceKind::GridCode,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ExperienceKind::Flocking => "flocking",
            ExperienceKind::CubeField => "cubefield",
            ExperienceKind::Poincare => "poincare",
            ExperienceKind::Globe => "globe",
            ExperienceKind::NeuralNet => "neuralnet",
            ExperienceKind::Riemann => "riemann",
            ExperienceKind::Lorenz => "lorenz",
            ExperienceKind::GridCode => "gridcode",
        }
    }

    /// Constructs a fresh, uninitialized instance of this experience.
    #[must_use]
    pub fn build(self) -> Box<dyn Experience> {
        match self {
            ExperienceKind::Flocking => Box::new(Flocking::new()),
            ExperienceKind::CubeField => Box::new(CubeField::new()),
            ExperienceKind::Poincare => Box::new(Poincare::new()),
            ExperienceKind::Globe => Box::new(Globe::new()),
            ExperienceKind::NeuralNet => Box::new(NeuralNet::new()),
            ExperienceKind::Riemann => Box::new(Riemann::new()),
            ExperienceKind::Lorenz => Box::new(Lorenz::new()),
            ExperienceKind::GridCode => Box::new(GridCode::new()),
        }
    }

    /// Default camera placement for this experience. Sessions may override
    /// it with an explicit preset.
    #[must_use]
    pub fn camera_preset(self) -> CameraPreset {
        match self {
            ExperienceKind::Flocking => CameraPreset {
                position: Vec3::new(0.0, 18.0, 46.0),
                fov: std::f32::consts::FRAC_PI_3,
                base_distance: 50.0,
            },
            ExperienceKind::CubeField => CameraPreset {
                position: Vec3::new(0.0, 0.0, 5.0),
                fov: std::f32::consts::FRAC_PI_3,
                base_distance: 10.0,
            },
            ExperienceKind::Poincare => CameraPreset {
                position: Vec3::new(0.0, 0.0, 3.0),
                fov: std::f32::consts::FRAC_PI_3,
                base_distance: 3.0,
            },
            ExperienceKind::Globe => CameraPreset {
                position: Vec3::new(0.0, 1.1, 2.6),
                fov: 0.9,
                base_distance: 2.8,
            },
            ExperienceKind::NeuralNet => CameraPreset {
                position: Vec3::new(0.0, 4.0, 24.0),
                fov: std::f32::consts::FRAC_PI_3,
                base_distance: 24.0,
            },
            ExperienceKind::Riemann => CameraPreset {
                position: Vec3::new(3.2, 2.6, 3.2),
                fov: 1.2,
                base_distance: 5.2,
            },
            ExperienceKind::Lorenz => CameraPreset {
                position: Vec3::new(0.0, 12.0, 64.0),
                fov: std::f32::consts::FRAC_PI_3,
                base_distance: 65.0,
            },
            ExperienceKind::GridCode => CameraPreset {
                position: Vec3::new(0.0, 0.0, 2.0),
                fov: std::f32::consts::FRAC_PI_3,
                base_distance: 2.0,
            },
        }
    }
}

impl std::fmt::Display for ExperienceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExperienceKind {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "flocking" | "boids" => Ok(ExperienceKind::Flocking),
            "cubefield" | "cube" | "cubes" => Ok(ExperienceKind::CubeField),
            "poincare" => Ok(ExperienceKind::Poincare),
            "globe" => Ok(ExperienceKind::Globe),
            "neuralnet" | "neural" => Ok(ExperienceKind::NeuralNet),
            "riemann" => Ok(ExperienceKind::Riemann),
            "lorenz" => Ok(ExperienceKind::Lorenz),
            "gridcode" | "grid" => Ok(ExperienceKind::GridCode),
            other => Err(VitrineError::UnknownExperience(other.to_string())),
        }
    }
}

// ============================================================================
// Experience registry
// ============================================================================

/// Constructed experiences in registration order.
///
/// Cleanup iterates this order, so the first experience registered is the
/// first torn down regardless of how entries were accessed in between.
#[derive(Default)]
pub struct ExperienceRegistry {
    entries: Vec<(ExperienceKind, Box<dyn Experience>)>,
}

impl ExperienceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an experience. Re-registering a kind replaces the previous
    /// instance in place, keeping its original position.
    pub fn register(&mut self, kind: ExperienceKind, experience: Box<dyn Experience>) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == kind) {
            log::warn!("Replacing already-registered experience '{kind}'");
            entry.1 = experience;
        } else {
            self.entries.push((kind, experience));
        }
    }

    #[must_use]
    pub fn get_mut(&mut self, kind: ExperienceKind) -> Option<&mut (dyn Experience + 'static)> {
        self.entries
            .iter_mut()
            .find(|(k, _)| *k == kind)
            .map(|(_, e)| e.as_mut())
    }

    /// Removes and returns an experience, preserving the order of the rest.
    pub fn take(&mut self, kind: ExperienceKind) -> Option<Box<dyn Experience>> {
        let index = self.entries.iter().position(|(k, _)| *k == kind)?;
        Some(self.entries.remove(index).1)
    }

    /// Removes all experiences in registration order.
    pub fn drain(&mut self) -> impl Iterator<Item = (ExperienceKind, Box<dyn Experience>)> + '_ {
        self.entries.drain(..)
    }

    pub fn iter_mut(
        &mut self,
    ) -> impl Iterator<Item = (ExperienceKind, &mut Box<dyn Experience>)> + '_ {
        self.entries.iter_mut().map(|(k, e)| (*k, e))
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<ExperienceKind> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
