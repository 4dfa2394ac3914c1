//! Camera Tests
//!
//! Tests for:
//! - Preset construction and aspect fallback
//! - Projection/view matrix derivation
//! - Aspect, projection, and position updates
//! - Headless operation (no GPU attachment) and cleanup

use glam::{Mat4, Vec3};

use vitrine::gpu::ResourceRegistry;
use vitrine::{Camera, CameraPreset};

// ============================================================================
// Construction
// ============================================================================

#[test]
fn preset_default_is_the_reference_placement() {
    let preset = CameraPreset::default();
    assert_eq!(preset.position, Vec3::new(0.0, 0.0, 5.0));
    assert!((preset.fov - std::f32::consts::FRAC_PI_3).abs() < 1e-6);
    assert!((preset.base_distance - 5.0).abs() < 1e-6);
}

#[test]
fn construction_derives_both_matrices() {
    let preset = CameraPreset::default();
    let camera = Camera::new(800.0, 600.0, &preset);

    assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
    let expected_projection =
        Mat4::perspective_rh(preset.fov, 800.0 / 600.0, 0.1, 1000.0);
    assert!(camera.projection_matrix().abs_diff_eq(expected_projection, 1e-5));

    let expected_view = Mat4::look_at_rh(preset.position, Vec3::ZERO, Vec3::Y);
    assert!(camera.view_matrix().abs_diff_eq(expected_view, 1e-5));
}

#[test]
fn non_positive_dimensions_fall_back_to_square_aspect() {
    let preset = CameraPreset::default();
    assert!((Camera::new(0.0, 600.0, &preset).aspect() - 1.0).abs() < 1e-6);
    assert!((Camera::new(800.0, 0.0, &preset).aspect() - 1.0).abs() < 1e-6);
    assert!((Camera::new(-5.0, -5.0, &preset).aspect() - 1.0).abs() < 1e-6);
}

// ============================================================================
// Updates
// ============================================================================

#[test]
fn update_aspect_rederives_projection() {
    let preset = CameraPreset::default();
    let mut camera = Camera::new(800.0, 600.0, &preset);
    camera.update_aspect(1920.0, 1080.0);

    assert!((camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    let expected = Mat4::perspective_rh(preset.fov, 1920.0 / 1080.0, 0.1, 1000.0);
    assert!(camera.projection_matrix().abs_diff_eq(expected, 1e-5));
}

#[test]
fn update_aspect_ignores_invalid_dimensions() {
    let preset = CameraPreset::default();
    let mut camera = Camera::new(800.0, 600.0, &preset);
    let before = camera.projection_matrix();

    camera.update_aspect(0.0, 1080.0);
    camera.update_aspect(1920.0, 0.0);

    assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
    assert!(camera.projection_matrix().abs_diff_eq(before, 1e-6));
}

#[test]
fn update_projection_applies_new_frustum() {
    let preset = CameraPreset::default();
    let mut camera = Camera::new(800.0, 600.0, &preset);
    camera.update_projection(1.2, 0.5, 200.0);

    assert!((camera.fov() - 1.2).abs() < 1e-6);
    let expected = Mat4::perspective_rh(1.2, 800.0 / 600.0, 0.5, 200.0);
    assert!(camera.projection_matrix().abs_diff_eq(expected, 1e-5));
}

#[test]
fn set_position_rederives_view() {
    let preset = CameraPreset::default();
    let mut camera = Camera::new(800.0, 600.0, &preset);
    let eye = Vec3::new(4.0, 3.0, -2.0);
    camera.set_position(eye);

    assert_eq!(camera.position(), eye);
    let expected = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
    assert!(camera.view_matrix().abs_diff_eq(expected, 1e-5));
}

#[test]
fn view_matrix_inverts_to_eye_position() {
    let preset = CameraPreset {
        position: Vec3::new(1.0, 2.0, 3.0),
        ..Default::default()
    };
    let camera = Camera::new(640.0, 480.0, &preset);
    // The inverse view matrix carries the eye position in its translation
    let eye = camera.view_matrix().inverse().w_axis.truncate();
    assert!((eye - preset.position).length() < 1e-4);
}

// ============================================================================
// Headless Operation
// ============================================================================

#[test]
fn headless_camera_has_no_bindings() {
    let camera = Camera::new(800.0, 600.0, &CameraPreset::default());
    assert!(camera.bind_group_layout().is_none());
    assert!(camera.bind_group().is_none());
    assert!(camera.is_active());
}

#[test]
fn headless_write_is_a_noop() {
    let mut camera = Camera::new(800.0, 600.0, &CameraPreset::default());
    // No GPU attachment; must not panic
    camera.write_buffers();
    camera.set_position(Vec3::new(0.0, 1.0, 9.0));
    camera.update_aspect(100.0, 100.0);
}

#[test]
fn cleanup_without_gpu_marks_inactive() {
    let registry = ResourceRegistry::new();
    let mut camera = Camera::new(800.0, 600.0, &CameraPreset::default());
    camera.cleanup(&registry);

    assert!(!camera.is_active());
    assert_eq!(registry.total_live(), 0);

    // A second cleanup is a no-op
    camera.cleanup(&registry);
    assert_eq!(registry.total_live(), 0);
}

#[test]
fn mutation_after_cleanup_keeps_matrices_consistent() {
    let registry = ResourceRegistry::new();
    let mut camera = Camera::new(800.0, 600.0, &CameraPreset::default());
    camera.cleanup(&registry);

    // CPU-side state still updates even though uploads are gated off
    let eye = Vec3::new(0.0, 0.0, 12.0);
    camera.set_position(eye);
    let expected = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
    assert!(camera.view_matrix().abs_diff_eq(expected, 1e-5));
}
