//! Vitrine is a compact wgpu engine that drives a gallery of swappable
//! visualization experiences: one [`Engine`] session runs one
//! [`ExperienceKind`] on one surface, with a shared camera rig, viewport and
//! mouse uniforms, and strict resource accounting across switches.
//!
//! The [`App`] runner wraps an engine in a winit event loop; headless users
//! drive [`Engine`] directly.

pub mod app;
pub mod camera;
pub mod engine;
pub mod errors;
pub mod experience;
pub mod gpu;
pub mod input;
pub mod orbit;
pub mod resources;
pub mod scheduler;
pub mod settings;
pub mod utils;

pub use app::App;
pub use camera::{Camera, CameraPreset};
pub use engine::{Engine, EngineState};
pub use errors::{Result, VitrineError};
pub use experience::{
    CubeField, Experience, ExperienceContext, ExperienceKind, ExperienceRegistry, Flocking,
    FrameContext, Globe, GlobeStyle, GridCode, Lorenz, NeuralNet, Poincare, Riemann, SurfaceKind,
};
pub use gpu::{GpuContext, ResourceCategory, ResourceRegistry, Tracked};
pub use input::InputRouter;
pub use orbit::OrbitController;
pub use resources::{ResourceManager, SharedBindings};
pub use scheduler::FrameScheduler;
pub use settings::EngineSettings;
