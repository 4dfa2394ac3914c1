//! wgpu Context
//!
//! The [`GpuContext`] holds the core GPU handles: device, queue, surface,
//! and surface configuration. It owns surface (re)configuration and the
//! alpha-compositing policy; the shared depth target lives in the
//! [`ResourceManager`](crate::ResourceManager), which recreates it on resize.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{Result, VitrineError};
use crate::settings::EngineSettings;

/// Core wgpu context holding GPU handles.
///
/// Created once per engine session and dropped on cleanup. All fields are
/// cheaply cloneable handles; the camera and resource manager keep their own
/// device/queue clones so teardown order stays explicit.
pub struct GpuContext {
    /// The wgpu device for GPU resource creation.
    pub device: wgpu::Device,
    /// The command queue for submitting work.
    pub queue: wgpu::Queue,
    /// The window surface for presentation.
    pub surface: wgpu::Surface<'static>,
    /// Surface configuration (format, present mode, alpha mode, size).
    pub config: wgpu::SurfaceConfiguration,
    adapter: wgpu::Adapter,
}

impl GpuContext {
    /// Acquires adapter, device, and surface for the given window.
    ///
    /// This is the one awaited suspension point of a session. Alpha
    /// compositing is always `Opaque` where the surface supports it,
    /// falling back to the surface's first reported mode; the same policy
    /// applies on every configure and reconfigure.
    pub async fn new<W>(
        window: W,
        settings: &EngineSettings,
        width: u32,
        height: u32,
    ) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| VitrineError::AdapterRequestFailed(e.to_string()))?;

        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or(VitrineError::SurfaceUnsupported)?;

        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        config.alpha_mode = Self::pick_alpha_mode(&surface, &adapter);
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            adapter,
        })
    }

    fn pick_alpha_mode(
        surface: &wgpu::Surface<'_>,
        adapter: &wgpu::Adapter,
    ) -> wgpu::CompositeAlphaMode {
        let caps = surface.get_capabilities(adapter);
        if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::Opaque)
        {
            wgpu::CompositeAlphaMode::Opaque
        } else {
            caps.alpha_modes[0]
        }
    }

    /// Resizes the surface. Zero dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Re-applies the current configuration, refreshing the alpha mode.
    ///
    /// Used after `SurfaceError::Lost`/`Outdated` and by
    /// [`Engine::handle_resize`](crate::Engine::handle_resize).
    pub fn reconfigure(&mut self) {
        self.config.alpha_mode = Self::pick_alpha_mode(&self.surface, &self.adapter);
        self.surface.configure(&self.device, &self.config);
    }

    /// Returns the surface color format.
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Current surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.config.height
    }
}
