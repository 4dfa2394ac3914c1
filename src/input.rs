//! Input routing
//!
//! Translates winit window events into orbit-controller calls and the
//! shared mouse uniform. The router keeps only the last cursor position;
//! all interaction state (drag latch, angles, zoom) lives in the
//! [`OrbitController`].

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::camera::Camera;
use crate::orbit::OrbitController;
use crate::resources::ResourceManager;

/// Wheel pixel deltas are roughly two orders of magnitude denser than
/// line deltas.
const WHEEL_PIXEL_SCALE: f32 = 0.01;

#[derive(Debug, Default)]
pub struct InputRouter {
    cursor: (f32, f32),
}

impl InputRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes one window event. Returns `true` if the event was consumed.
    pub fn process_window_event(
        &mut self,
        event: &WindowEvent,
        orbit: &mut OrbitController,
        camera: &mut Camera,
        resources: &ResourceManager,
    ) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                resources.update_mouse(self.cursor.0, self.cursor.1);
                if orbit.is_dragging() {
                    orbit.handle_mouse_move(self.cursor.0, self.cursor.1);
                    orbit.update_camera_position(camera);
                }
                true
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                match state {
                    ElementState::Pressed => orbit.start_drag(self.cursor.0, self.cursor.1),
                    ElementState::Released => orbit.end_drag(),
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Wheel up zooms in.
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(position) => {
                        -(position.y as f32) * WHEEL_PIXEL_SCALE
                    }
                };
                orbit.adjust_zoom(steps);
                orbit.update_camera_position(camera);
                true
            }
            _ => false,
        }
    }

    /// Last cursor position in physical pixels.
    #[must_use]
    pub fn cursor(&self) -> (f32, f32) {
        self.cursor
    }
}
