//! Orbit Controller Tests
//!
//! Tests for:
//! - Spherical eye-position derivation
//! - Polar angle clamping away from the poles
//! - Zoom factor bounds and distance scaling
//! - Angle/zoom recovery from an existing eye position
//! - Drag latching and cursor deltas
//! - Camera synchronization

use glam::{Mat4, Vec3};

use vitrine::{Camera, CameraPreset, ExperienceKind, OrbitController};

const EPSILON: f32 = 1e-3;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON * (1.0 + b.length())
}

// ============================================================================
// Eye Position Derivation
// ============================================================================

#[test]
fn default_orientation_sits_on_horizon() {
    let rig = OrbitController::new(Vec3::ZERO, 10.0);
    // phi = pi/2, theta = 0 puts the eye on +X at the base distance
    assert!(approx_vec(rig.position(), Vec3::new(10.0, 0.0, 0.0)));
    assert!(approx(rig.distance(), 10.0));
    assert!(approx(rig.zoom(), 1.0));
}

#[test]
fn position_orbits_around_offset_target() {
    let target = Vec3::new(3.0, -2.0, 7.0);
    let rig = OrbitController::new(target, 4.0);
    let offset = rig.position() - target;
    assert!(
        approx(offset.length(), 4.0),
        "Eye should sit at the base distance from the target, got {}",
        offset.length()
    );
    assert!(approx_vec(rig.target(), target));
}

#[test]
fn preset_positions_round_trip() {
    for kind in ExperienceKind::ALL {
        let preset = kind.camera_preset();
        let rig = OrbitController::from_position(preset.position, Vec3::ZERO, preset.base_distance);
        assert!(
            approx_vec(rig.position(), preset.position),
            "Preset for '{kind}' should survive the rig round trip: {} vs {}",
            rig.position(),
            preset.position
        );
    }
}

#[test]
fn eye_on_target_falls_back_to_default() {
    let rig = OrbitController::from_position(Vec3::ZERO, Vec3::ZERO, 5.0);
    assert!(approx(rig.theta(), 0.0));
    assert!(approx(rig.phi(), std::f32::consts::FRAC_PI_2));
    assert!(approx(rig.zoom(), 1.0));
}

#[test]
fn non_positive_base_distance_falls_back() {
    let rig = OrbitController::new(Vec3::ZERO, -3.0);
    assert!(approx(rig.base_distance(), 1.0));
}

// ============================================================================
// Zoom
// ============================================================================

#[test]
fn zoom_clamps_at_both_bounds() {
    let mut rig = OrbitController::new(Vec3::ZERO, 10.0);
    rig.adjust_zoom(1_000.0);
    assert!(approx(rig.zoom(), 5.0), "Zoom should cap at 5x");
    rig.adjust_zoom(-1_000_000.0);
    assert!(approx(rig.zoom(), 0.2), "Zoom should floor at 0.2x");
}

#[test]
fn positive_steps_zoom_out() {
    let mut rig = OrbitController::new(Vec3::ZERO, 10.0);
    rig.adjust_zoom(1.0);
    assert!(approx(rig.distance(), 10.5));
    rig.adjust_zoom(-1.0);
    assert!(approx(rig.distance(), 10.5 * 0.95));
}

#[test]
fn distance_is_base_times_zoom() {
    let preset = ExperienceKind::Flocking.camera_preset();
    let rig = OrbitController::from_position(preset.position, Vec3::ZERO, preset.base_distance);
    assert!(approx(rig.distance(), rig.base_distance() * rig.zoom()));
}

// ============================================================================
// Dragging
// ============================================================================

#[test]
fn moves_without_drag_do_not_rotate() {
    let mut rig = OrbitController::new(Vec3::ZERO, 10.0);
    let theta = rig.theta();
    let phi = rig.phi();
    rig.handle_mouse_move(500.0, 500.0);
    assert!(approx(rig.theta(), theta));
    assert!(approx(rig.phi(), phi));
    assert!(!rig.is_dragging());
}

#[test]
fn drag_rotates_and_latches_cursor() {
    let mut rig = OrbitController::new(Vec3::ZERO, 10.0);
    rig.set_viewport_height(360.0);
    rig.start_drag(0.0, 0.0);
    rig.handle_mouse_move(90.0, 0.0);
    // A quarter of the viewport height sweeps a quarter turn
    assert!(approx(rig.theta(), -std::f32::consts::FRAC_PI_2));

    // The cursor is latched; repeating the same position is a zero delta
    let theta = rig.theta();
    rig.handle_mouse_move(90.0, 0.0);
    assert!(approx(rig.theta(), theta));

    rig.end_drag();
    rig.handle_mouse_move(500.0, 0.0);
    assert!(approx(rig.theta(), theta), "Rotation must stop after end_drag");
}

#[test]
fn full_height_drag_sweeps_a_full_turn() {
    let mut rig = OrbitController::new(Vec3::ZERO, 10.0);
    rig.set_viewport_height(500.0);
    let start = rig.position();
    rig.start_drag(0.0, 0.0);
    rig.handle_mouse_move(500.0, 0.0);
    assert!(approx(rig.theta(), -std::f32::consts::TAU));
    assert!(
        approx_vec(rig.position(), start),
        "A full turn should return to the starting eye position"
    );
}

#[test]
fn rotate_speed_scales_the_sweep() {
    let mut rig = OrbitController::new(Vec3::ZERO, 10.0);
    rig.set_viewport_height(360.0);
    rig.set_rotate_speed(0.5);
    rig.start_drag(0.0, 0.0);
    rig.handle_mouse_move(90.0, 0.0);
    assert!(approx(rig.theta(), -std::f32::consts::FRAC_PI_4));
}

#[test]
fn zero_viewport_height_is_ignored() {
    let mut rig = OrbitController::new(Vec3::ZERO, 10.0);
    rig.set_viewport_height(360.0);
    rig.set_viewport_height(0.0);
    rig.start_drag(0.0, 0.0);
    rig.handle_mouse_move(90.0, 0.0);
    // Still normalized by the last valid height
    assert!(approx(rig.theta(), -std::f32::consts::FRAC_PI_2));
}

// ============================================================================
// Pole Clamping
// ============================================================================

#[test]
fn polar_angle_stays_strictly_off_the_poles() {
    let mut rig = OrbitController::new(Vec3::ZERO, 10.0);
    rig.set_viewport_height(100.0);

    rig.start_drag(0.0, 0.0);
    rig.handle_mouse_move(0.0, -1_000_000.0);
    assert!(
        rig.phi() < std::f32::consts::PI - 0.1,
        "phi must stay below the south pole clamp, got {}",
        rig.phi()
    );

    rig.handle_mouse_move(0.0, 1_000_000.0);
    assert!(
        rig.phi() > 0.1,
        "phi must stay above the north pole clamp, got {}",
        rig.phi()
    );

    // Clamped phi still yields a finite eye position
    assert!(rig.position().is_finite());
}

#[test]
fn clamped_pole_drag_saturates() {
    let mut rig = OrbitController::new(Vec3::ZERO, 10.0);
    rig.set_viewport_height(100.0);
    rig.start_drag(0.0, 0.0);
    rig.handle_mouse_move(0.0, 10_000.0);
    let phi = rig.phi();
    rig.handle_mouse_move(0.0, 20_000.0);
    assert!(approx(rig.phi(), phi), "Further pole-ward drag must saturate");
}

// ============================================================================
// Camera Synchronization
// ============================================================================

#[test]
fn update_camera_position_moves_the_camera() {
    let preset = CameraPreset::default();
    let mut camera = Camera::new(800.0, 600.0, &preset);
    let mut rig = OrbitController::from_position(preset.position, Vec3::ZERO, preset.base_distance);
    rig.adjust_zoom(3.0);
    rig.update_camera_position(&mut camera);

    assert!(approx_vec(camera.position(), rig.position()));
    let expected_view = Mat4::look_at_rh(rig.position(), Vec3::ZERO, Vec3::Y);
    assert!(
        camera.view_matrix().abs_diff_eq(expected_view, 1e-4),
        "View matrix should track the rig's eye position"
    );
}
