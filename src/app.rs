//! Winit Application Runner
//!
//! [`App`] wraps an [`Engine`] in a winit event loop: it creates the window,
//! starts the initial experience, forwards input, and drives redraws. The
//! engine itself is window-agnostic; everything winit-specific stays here.
//!
//! # Keys
//!
//! | Key       | Action                                   |
//! |-----------|------------------------------------------|
//! | `1`..`8`  | Switch experience (gallery order)        |
//! | `d`       | Poincare: toggle dithering               |
//! | `s`       | Riemann: cycle surface                   |
//! | `g`       | Globe: cycle texture style               |
//! | `k`       | Grid code: cycle module scale            |
//! | `Esc`     | Quit                                     |

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::camera::CameraPreset;
use crate::engine::Engine;
use crate::errors::Result;
use crate::experience::{ExperienceKind, Globe, GridCode, Poincare, Riemann};
use crate::settings::EngineSettings;
use crate::utils::FpsCounter;

pub struct App {
    window: Option<Arc<Window>>,
    title: String,
    engine: Engine,
    initial: ExperienceKind,
    preset: Option<CameraPreset>,
    fps: FpsCounter,
}

impl App {
    /// Creates a runner that opens on the given experience.
    #[must_use]
    pub fn new(initial: ExperienceKind) -> Self {
        Self {
            window: None,
            title: "Vitrine".into(),
            engine: Engine::default(),
            initial,
            preset: None,
            fps: FpsCounter::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replaces the engine settings (configuration phase only).
    #[must_use]
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.engine = Engine::new(settings);
        self
    }

    /// Overrides the initial experience's camera preset.
    #[must_use]
    pub fn with_preset(mut self, preset: CameraPreset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Runs the event loop until the window closes.
    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    /// Tears the current session down and starts `kind` on the same window.
    fn switch_to(&mut self, kind: ExperienceKind) {
        if self.engine.active_kind() == Some(kind) {
            return;
        }
        let Some(window) = self.window.clone() else {
            return;
        };
        let size = window.inner_size();
        let dpr = window.scale_factor() as f32;
        let started = pollster::block_on(self.engine.start(
            window.clone(),
            size.width,
            size.height,
            dpr,
            kind,
            None,
        ));
        if let Err(e) = started {
            log::error!("Failed to switch to experience '{kind}': {e}");
        }
        self.refresh_title(None);
    }

    fn refresh_title(&self, fps: Option<f32>) {
        let Some(window) = &self.window else {
            return;
        };
        let mut title = self.title.clone();
        if let Some(kind) = self.engine.active_kind() {
            title.push_str(&format!(" | {kind}"));
        }
        if let Some(fps) = fps {
            title.push_str(&format!(" | {fps:.0} fps"));
        }
        window.set_title(&title);
    }

    fn handle_key(&mut self, key: &Key, event_loop: &ActiveEventLoop) {
        match key {
            Key::Named(NamedKey::Escape) => {
                self.engine.cleanup();
                event_loop.exit();
            }
            Key::Character(text) => match text.to_lowercase().as_str() {
                "d" => {
                    if let Some(poincare) = self.engine.experience_mut::<Poincare>() {
                        poincare.toggle_dither();
                    }
                }
                "s" => {
                    if let Some(riemann) = self.engine.experience_mut::<Riemann>() {
                        riemann.cycle_surface();
                    }
                }
                "g" => {
                    if let Some(globe) = self.engine.experience_mut::<Globe>() {
                        globe.cycle_style();
                    }
                }
                "k" => {
                    if let Some(grid) = self.engine.experience_mut::<GridCode>() {
                        grid.cycle_scale();
                    }
                }
                other => {
                    if let Some(digit) = other.chars().next().and_then(|c| c.to_digit(10)) {
                        let index = digit as usize;
                        if (1..=ExperienceKind::ALL.len()).contains(&index) {
                            self.switch_to(ExperienceKind::ALL[index - 1]);
                        }
                    }
                }
            },
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let size = window.inner_size();
        let dpr = window.scale_factor() as f32;
        let started = pollster::block_on(self.engine.start(
            window.clone(),
            size.width,
            size.height,
            dpr,
            self.initial,
            self.preset,
        ));
        if let Err(e) = started {
            log::error!("Fatal engine error: {e}");
            event_loop.exit();
            return;
        }
        self.refresh_title(None);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.engine.cleanup();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let dpr = self
                    .window
                    .as_ref()
                    .map_or(1.0, |w| w.scale_factor() as f32);
                self.engine.update_viewport(size.width, size.height, dpr);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = self.window.clone() {
                    self.engine.handle_resize(&window);
                }
            }
            WindowEvent::RedrawRequested => {
                self.engine.render_frame();
                if let Some(fps) = self.fps.update() {
                    self.refresh_title(Some(fps));
                }
            }
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.state == ElementState::Pressed && !key_event.repeat {
                    self.handle_key(&key_event.logical_key, event_loop);
                }
            }
            other => {
                self.engine.handle_window_event(&other);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window
            && self.engine.wants_frame()
        {
            window.request_redraw();
        }
    }
}
