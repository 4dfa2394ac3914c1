//! Engine Core Module
//!
//! This module contains [`Engine`], the central coordinator of a
//! visualization session. It is a pure engine instance without any window
//! management logic, allowing it to be driven by different frontends; the
//! built-in winit runner lives in [`app`](crate::app).
//!
//! # Architecture
//!
//! One session is one experience on one surface:
//!
//! - **`GpuContext`**: device, queue, surface, and surface configuration
//! - **[`Camera`] + [`OrbitController`]**: view state and its interaction rig
//! - **[`ResourceManager`]**: shared uniforms, depth target, experiences
//! - **[`FrameScheduler`]**: gates frame production during teardown
//!
//! Starting while a session is already running tears the old session down
//! completely before the new one comes up, so GPU resources never leak
//! across experience switches.
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine::{Engine, EngineSettings, ExperienceKind};
//!
//! let mut engine = Engine::new(EngineSettings::default());
//! pollster::block_on(engine.start(
//!     window.clone(),
//!     1280,
//!     720,
//!     1.0,
//!     ExperienceKind::Flocking,
//!     None,
//! ))?;
//!
//! // Main loop
//! loop {
//!     engine.render_frame();
//! }
//! ```

use std::sync::Arc;

use glam::Vec3;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::event::WindowEvent;

use crate::camera::{Camera, CameraPreset};
use crate::errors::{Result, VitrineError};
use crate::experience::{Experience, ExperienceContext, ExperienceKind, FrameContext};
use crate::gpu::{GpuContext, ResourceRegistry};
use crate::input::InputRouter;
use crate::orbit::OrbitController;
use crate::resources::ResourceManager;
use crate::scheduler::FrameScheduler;
use crate::settings::EngineSettings;
use crate::utils::Timer;

// ============================================================================
// Engine state
// ============================================================================

/// Lifecycle phase of the engine.
///
/// Transitions are linear: `Uninitialized -> Starting -> Running`, and
/// `Running -> CleaningUp -> Uninitialized` on teardown. A failed start
/// returns to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No GPU context. [`Engine::start`] may be called.
    Uninitialized,
    /// [`Engine::start`] is acquiring the GPU context and building the
    /// experience.
    Starting,
    /// Frames are being produced.
    Running,
    /// Teardown in progress; no frames are produced.
    CleaningUp,
}

// ============================================================================
// Engine
// ============================================================================

/// The central coordinator owning one visualization session.
///
/// # Lifecycle
///
/// 1. Create with [`Engine::new`], [`Engine::default`], or
///    [`Engine::with_registry`] to share a resource tally
/// 2. Start a session with [`Engine::start`]
/// 3. Produce frames with [`Engine::render_frame`]
/// 4. Tear down with [`Engine::cleanup`] (or start another session, which
///    tears down implicitly)
pub struct Engine {
    settings: EngineSettings,
    registry: Arc<ResourceRegistry>,
    state: EngineState,
    scheduler: FrameScheduler,
    timer: Timer,
    gpu: Option<GpuContext>,
    camera: Option<Camera>,
    orbit: Option<OrbitController>,
    resources: Option<ResourceManager>,
    input: Option<InputRouter>,
    active: Option<ExperienceKind>,
}

impl Engine {
    /// Creates a new engine instance with the specified settings and a
    /// fresh resource registry of its own.
    ///
    /// This only creates the engine configuration. GPU resources are not
    /// allocated until [`start`](Self::start) is called.
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_registry(settings, Arc::new(ResourceRegistry::new()))
    }

    /// Creates an engine that tallies its resources in an externally owned
    /// registry.
    ///
    /// Multi-window setups pass each engine its own registry, or one shared
    /// tally, explicitly; there is no process-global state to collide on.
    #[must_use]
    pub fn with_registry(settings: EngineSettings, registry: Arc<ResourceRegistry>) -> Self {
        Self {
            settings,
            registry,
            state: EngineState::Uninitialized,
            scheduler: FrameScheduler::new(),
            timer: Timer::new(),
            gpu: None,
            camera: None,
            orbit: None,
            resources: None,
            input: None,
            active: None,
        }
    }

    /// Starts a session running the given experience.
    ///
    /// Acquires the GPU context for `window`, places the camera on the
    /// experience's preset (or `preset` when given), builds the experience's
    /// GPU resources, and arms the frame scheduler. If a session is already
    /// running it is torn down first.
    ///
    /// # Arguments
    ///
    /// * `window` - A window providing display and window handles
    /// * `width` / `height` - Initial surface size in physical pixels
    /// * `dpr` - Display scale factor
    /// * `kind` - Which experience to run
    /// * `preset` - Optional camera placement overriding the experience's own
    ///
    /// # Errors
    ///
    /// Returns an error if GPU initialization fails (no compatible adapter,
    /// device request rejected, surface unsupported) or if the experience
    /// fails to build its resources. On error the engine is left fully
    /// uninitialized and may be started again.
    pub async fn start<W>(
        &mut self,
        window: W,
        width: u32,
        height: u32,
        dpr: f32,
        kind: ExperienceKind,
        preset: Option<CameraPreset>,
    ) -> Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        if self.state != EngineState::Uninitialized {
            log::info!("Restarting engine with experience '{kind}'");
            self.cleanup();
        }
        self.state = EngineState::Starting;
        log::info!("Starting experience '{kind}' at {width}x{height} (dpr {dpr})");

        let gpu = match GpuContext::new(window, &self.settings, width, height).await {
            Ok(gpu) => gpu,
            Err(e) => {
                log::error!("GPU initialization failed: {e}");
                self.state = EngineState::Uninitialized;
                return Err(e);
            }
        };

        let preset = preset.unwrap_or_else(|| kind.camera_preset());
        let mut camera = Camera::new(width as f32, height as f32, &preset);
        camera.attach_gpu(&gpu.device, &gpu.queue, &self.registry);

        let mut orbit =
            OrbitController::from_position(preset.position, Vec3::ZERO, preset.base_distance);
        orbit.set_viewport_height(height as f32);
        orbit.update_camera_position(&mut camera);

        let mut resources = ResourceManager::new(
            &gpu.device,
            &gpu.queue,
            Arc::clone(&self.registry),
            self.settings.depth_format,
            width,
            height,
            dpr,
        );

        let mut experience = kind.build();
        let init_result = {
            let mut ctx = ExperienceContext {
                device: &gpu.device,
                queue: &gpu.queue,
                registry: &self.registry,
                camera: &camera,
                shared: resources.shared(),
                color_format: gpu.color_format(),
                depth_format: self.settings.depth_format,
                width,
                height,
            };
            experience.init(&mut ctx)
        };
        if let Err(e) = init_result {
            log::error!("Experience '{kind}' failed to initialize: {e}");
            experience.cleanup(&self.registry);
            camera.cleanup(&self.registry);
            resources.cleanup();
            self.registry.sweep();
            self.state = EngineState::Uninitialized;
            return Err(e);
        }
        resources.register_experience(kind, experience);

        self.gpu = Some(gpu);
        self.camera = Some(camera);
        self.orbit = Some(orbit);
        self.resources = Some(resources);
        self.input = Some(InputRouter::new());
        self.timer = Timer::new();
        self.active = Some(kind);
        self.scheduler.arm();
        self.state = EngineState::Running;
        log::info!("Engine running experience '{kind}'");
        Ok(())
    }

    /// Produces one frame if the scheduler is armed.
    ///
    /// Acquires the surface texture, lets the active experience record its
    /// passes into a single command encoder, submits, and presents. A lost
    /// or outdated surface is reconfigured and the frame skipped; an
    /// experience render error is logged and the frame still presented.
    pub fn render_frame(&mut self) {
        let Some(frame_index) = self.scheduler.begin_frame() else {
            return;
        };
        let Some(gpu) = self.gpu.as_mut() else {
            log::error!("Frame requested without an active GPU context");
            self.scheduler.cancel();
            return;
        };

        let surface_texture = match gpu.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                log::warn!("Surface lost or outdated, reconfiguring");
                gpu.reconfigure();
                return;
            }
            other => {
                log::warn!("Skipping frame: {other:?}");
                return;
            }
        };

        self.timer.tick();
        let dt = self.timer.dt_seconds();
        let time = self.timer.elapsed_seconds();

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = self.resources.as_mut().and_then(ResourceManager::depth_view);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        if let (Some(resources), Some(kind)) = (self.resources.as_mut(), self.active) {
            if let Some(experience) = resources.experience_mut(kind) {
                let mut frame = FrameContext {
                    encoder: &mut encoder,
                    target: &view,
                    depth: depth_view.as_ref(),
                    queue: &gpu.queue,
                    clear_color: self.settings.clear_color,
                    time,
                    dt,
                };
                if let Err(e) = experience.render(&mut frame) {
                    log::error!("Experience '{kind}' render failed on frame {frame_index}: {e}");
                }
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Applies a new viewport size.
    ///
    /// Reconfigures the surface, rewrites the shared viewport uniform,
    /// recreates the depth target, and updates the camera aspect ratio.
    /// Zero dimensions are ignored; minimized windows keep the last valid
    /// state.
    pub fn update_viewport(&mut self, width: u32, height: u32, dpr: f32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring viewport update to {width}x{height}");
            return;
        }
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.resize(width, height);
        if let (Some(resources), Some(camera)) = (self.resources.as_mut(), self.camera.as_mut()) {
            resources.update_viewport_size(width, height, dpr, camera);
        }
        if let Some(orbit) = self.orbit.as_mut() {
            orbit.set_viewport_height(height as f32);
        }
    }

    /// Re-derives the viewport from the window's current size and scale
    /// factor.
    ///
    /// Also refreshes the surface's alpha compositing mode, which can change
    /// when a window moves between outputs.
    pub fn handle_resize(&mut self, window: &winit::window::Window) {
        let size = window.inner_size();
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.reconfigure();
        }
        self.update_viewport(size.width, size.height, window.scale_factor() as f32);
    }

    /// Routes a window event to the input layer.
    ///
    /// Returns `true` if the event was consumed. Outside a running session
    /// all events pass through untouched.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let (Some(input), Some(orbit), Some(camera), Some(resources)) = (
            self.input.as_mut(),
            self.orbit.as_mut(),
            self.camera.as_mut(),
            self.resources.as_ref(),
        ) else {
            return false;
        };
        input.process_window_event(event, orbit, camera, resources)
    }

    /// Tears the session down completely.
    ///
    /// Cancels frame production, shuts down and cleans up every experience,
    /// releases the camera's GPU buffers and the shared resources, drops the
    /// GPU context, and logs any resources still tracked as live. The engine
    /// returns to `Uninitialized` and may be started again.
    pub fn cleanup(&mut self) {
        if self.state == EngineState::Uninitialized {
            return;
        }
        self.state = EngineState::CleaningUp;
        log::info!("Engine cleanup started");
        self.scheduler.cancel();

        if let Some(resources) = self.resources.as_mut() {
            resources.cleanup_experiences();
        }
        self.input = None;
        if let Some(mut camera) = self.camera.take() {
            camera.cleanup(&self.registry);
        }
        self.orbit = None;
        if let Some(resources) = self.resources.take() {
            resources.cleanup();
        }
        self.gpu = None;

        let leaked = self.registry.sweep();
        if leaked > 0 {
            log::warn!("Engine cleanup finished with {leaked} resources still live");
        } else {
            log::info!("Engine cleanup finished");
        }
        self.active = None;
        self.state = EngineState::Uninitialized;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current lifecycle phase.
    #[inline]
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// `true` while a session is producing frames.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// `true` when the next [`render_frame`](Self::render_frame) call will
    /// produce a frame.
    #[inline]
    #[must_use]
    pub fn wants_frame(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// The experience the session is running, if any.
    #[inline]
    #[must_use]
    pub fn active_kind(&self) -> Option<ExperienceKind> {
        self.active
    }

    /// Total elapsed session time in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.timer.elapsed_seconds()
    }

    /// Frames produced since the session started.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count
    }

    /// Current surface size in physical pixels, `(0, 0)` outside a session.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.gpu
            .as_ref()
            .map_or((0, 0), |gpu| (gpu.width(), gpu.height()))
    }

    /// Settings the engine was created with.
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Resource bookkeeping shared by every session of this engine.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// The GPU context of the running session.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::NotRunning`] outside an active session.
    pub fn gpu(&self) -> Result<&GpuContext> {
        self.gpu.as_ref().ok_or(VitrineError::NotRunning)
    }

    #[must_use]
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    #[must_use]
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    #[must_use]
    pub fn orbit(&self) -> Option<&OrbitController> {
        self.orbit.as_ref()
    }

    #[must_use]
    pub fn orbit_mut(&mut self) -> Option<&mut OrbitController> {
        self.orbit.as_mut()
    }

    /// The active experience as a trait object.
    pub fn active_experience_mut(&mut self) -> Option<&mut (dyn Experience + 'static)> {
        let kind = self.active?;
        self.resources.as_mut()?.experience_mut(kind)
    }

    /// The active experience downcast to a concrete type.
    ///
    /// Used to reach mode switches that are not part of the [`Experience`]
    /// contract, like [`Poincare::toggle_dither`](crate::Poincare::toggle_dither).
    pub fn experience_mut<T: Experience + 'static>(&mut self) -> Option<&mut T> {
        self.active_experience_mut()?.as_any_mut().downcast_mut::<T>()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
