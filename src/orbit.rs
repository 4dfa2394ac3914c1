//! Orbit controller
//!
//! Spherical-coordinate camera rig: the eye sits at `distance()` from a
//! fixed target, parameterized by an azimuth `theta` and a polar angle
//! `phi`. Cursor drags rotate, wheel steps scale the zoom factor, and
//! [`OrbitController::update_camera_position`] pushes the resulting eye
//! position into a [`Camera`].
//!
//! The controller is plain math with no window-system types; the input
//! layer translates events into the `start_drag` / `handle_mouse_move` /
//! `adjust_zoom` calls here.

use glam::Vec3;

use crate::camera::Camera;

/// Polar clamp keeping the eye strictly off both poles, where the look-at
/// basis would degenerate against the +Y up vector.
const PHI_MIN: f32 = 0.1001;
const PHI_MAX: f32 = std::f32::consts::PI - 0.1001;

/// Zoom factor bounds; distance is `base_distance * zoom`.
const MIN_ZOOM: f32 = 0.2;
const MAX_ZOOM: f32 = 5.0;

/// Relative distance change per wheel step.
const ZOOM_SENSITIVITY: f32 = 0.05;

/// Drag-to-orbit camera controller around a fixed target.
pub struct OrbitController {
    target: Vec3,
    base_distance: f32,
    theta: f32,
    phi: f32,
    zoom: f32,
    rotate_speed: f32,
    viewport_height: f32,
    dragging: bool,
    last_cursor: Option<(f32, f32)>,
}

impl OrbitController {
    /// Creates a rig at the default orientation: on the horizon plane
    /// (`phi = π/2`), azimuth zero, zoom 1.
    #[must_use]
    pub fn new(target: Vec3, base_distance: f32) -> Self {
        let base_distance = if base_distance > 0.0 {
            base_distance
        } else {
            log::warn!("Non-positive orbit base distance {base_distance}, using 1.0");
            1.0
        };
        Self {
            target,
            base_distance,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,
            zoom: 1.0,
            rotate_speed: 1.0,
            viewport_height: 1.0,
            dragging: false,
            last_cursor: None,
        }
    }

    /// Creates a rig whose angles and zoom reproduce an existing eye
    /// position. Degenerate inputs (eye on the target) fall back to the
    /// default orientation of [`OrbitController::new`].
    #[must_use]
    pub fn from_position(position: Vec3, target: Vec3, base_distance: f32) -> Self {
        let mut rig = Self::new(target, base_distance);
        let offset = position - target;
        let distance = offset.length();
        if distance <= 1e-4 {
            log::warn!("Orbit eye coincides with target, keeping default orientation");
            return rig;
        }
        rig.phi = (offset.y / distance).clamp(-1.0, 1.0).acos().clamp(PHI_MIN, PHI_MAX);
        rig.theta = offset.z.atan2(offset.x);
        rig.zoom = (distance / rig.base_distance).clamp(MIN_ZOOM, MAX_ZOOM);
        rig
    }

    /// Latches the cursor and enters the dragging state.
    pub fn start_drag(&mut self, x: f32, y: f32) {
        self.dragging = true;
        self.last_cursor = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.last_cursor = None;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Applies a cursor delta while dragging. A full viewport height of
    /// travel sweeps one turn; `phi` stays strictly inside its clamp so
    /// the pole is never reached.
    pub fn handle_mouse_move(&mut self, x: f32, y: f32) {
        if !self.dragging {
            return;
        }
        if let Some((last_x, last_y)) = self.last_cursor {
            let rotate_per_pixel =
                std::f32::consts::TAU / self.viewport_height.max(1.0) * self.rotate_speed;
            self.theta -= (x - last_x) * rotate_per_pixel;
            self.phi = (self.phi - (y - last_y) * rotate_per_pixel).clamp(PHI_MIN, PHI_MAX);
        }
        self.last_cursor = Some((x, y));
    }

    /// Scales the zoom factor by `steps` wheel increments (positive steps
    /// zoom out), clamped to the factor bounds.
    pub fn adjust_zoom(&mut self, steps: f32) {
        self.zoom = (self.zoom * (1.0 + steps * ZOOM_SENSITIVITY)).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Height in physical pixels used to normalize drag rotation.
    pub fn set_viewport_height(&mut self, height: f32) {
        if height > 0.0 {
            self.viewport_height = height;
        }
    }

    pub fn set_rotate_speed(&mut self, speed: f32) {
        self.rotate_speed = speed;
    }

    /// Eye position derived from the current spherical state.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        let distance = self.distance();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.target.x + distance * sin_phi * cos_theta,
            self.target.y + distance * cos_phi,
            self.target.z + distance * sin_phi * sin_theta,
        )
    }

    /// Moves the camera to the rig's eye position, re-deriving its view
    /// matrix and uploading it.
    pub fn update_camera_position(&self, camera: &mut Camera) {
        camera.set_position(self.position());
    }

    /// Current eye distance from the target: `base_distance * zoom`.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.base_distance * self.zoom
    }

    #[must_use]
    pub fn theta(&self) -> f32 {
        self.theta
    }

    #[must_use]
    pub fn phi(&self) -> f32 {
        self.phi
    }

    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[must_use]
    pub fn base_distance(&self) -> f32 {
        self.base_distance
    }
}
