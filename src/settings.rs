//! Engine Settings
//!
//! Global configuration consumed once when a session starts. Runtime state
//! (active experience, camera rig) lives on the [`Engine`](crate::Engine);
//! everything here is fixed for the lifetime of a GPU context.

/// Global configuration for engine initialization.
///
/// Consumed by [`Engine::start`](crate::Engine::start) to acquire the GPU
/// context and allocate session-level resources.
///
/// # Fields
///
/// | Field               | Description                           | Default           |
/// |---------------------|---------------------------------------|-------------------|
/// | `vsync`             | Vertical sync enabled                 | `true`            |
/// | `power_preference`  | GPU adapter selection strategy        | `HighPerformance` |
/// | `clear_color`       | Framebuffer clear color               | Near-black        |
/// | `required_features` | Required wgpu features                | Empty             |
/// | `required_limits`   | Required wgpu limits                  | Default           |
/// | `depth_format`      | Depth buffer texture format           | `Depth32Float`    |
///
/// # Example
///
/// ```rust,ignore
/// use vitrine::EngineSettings;
///
/// let settings = EngineSettings {
///     vsync: false,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Enable vertical synchronization (VSync).
    ///
    /// When `true`, the frame rate is capped to the display refresh rate,
    /// reducing tearing and power consumption. When `false`, the frame rate
    /// is uncapped.
    pub vsync: bool,

    /// GPU adapter selection preference.
    ///
    /// - `HighPerformance`: prefer a discrete / dedicated GPU
    /// - `LowPower`: prefer an integrated GPU
    pub power_preference: wgpu::PowerPreference,

    /// Clear color applied by the first pass of each frame (the backdrop
    /// or the experience's own clearing pass).
    pub clear_color: wgpu::Color,

    /// Required wgpu features that must be supported by the adapter.
    ///
    /// The engine will fail to start if these are unavailable.
    pub required_features: wgpu::Features,

    /// Required wgpu limits (max buffer sizes, binding counts, etc.).
    pub required_limits: wgpu::Limits,

    /// Depth buffer texture format for the shared depth target.
    pub depth_format: wgpu::TextureFormat,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            clear_color: wgpu::Color {
                r: 0.008,
                g: 0.010,
                b: 0.016,
                a: 1.0,
            },
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}
