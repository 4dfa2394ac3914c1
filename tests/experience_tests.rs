//! Experience Catalog Tests
//!
//! Tests for:
//! - Kind labels, display, and name parsing
//! - Camera preset sanity for every experience
//! - Construction and downcast identity
//! - Pre-init mode switches (dither, surface, style, scale)

use std::collections::HashSet;
use std::str::FromStr;

use glam::Vec3;

use vitrine::experience::gridcode::MODULE_SPACINGS;
use vitrine::{
    CubeField, ExperienceKind, Flocking, Globe, GlobeStyle, GridCode, Lorenz, NeuralNet,
    OrbitController, Poincare, Riemann, SurfaceKind, VitrineError,
};

// ============================================================================
// Labels and Parsing
// ============================================================================

#[test]
fn all_kinds_have_unique_labels() {
    let labels: HashSet<_> = ExperienceKind::ALL.iter().map(|k| k.label()).collect();
    assert_eq!(labels.len(), ExperienceKind::ALL.len());
}

#[test]
fn display_matches_label() {
    for kind in ExperienceKind::ALL {
        assert_eq!(kind.to_string(), kind.label());
    }
}

#[test]
fn labels_parse_back_to_their_kind() {
    for kind in ExperienceKind::ALL {
        let parsed = ExperienceKind::from_str(kind.label());
        assert_eq!(parsed.ok(), Some(kind), "Label '{}' must round trip", kind.label());
    }
}

#[test]
fn parsing_accepts_aliases_and_case() {
    assert_eq!("boids".parse::<ExperienceKind>().ok(), Some(ExperienceKind::Flocking));
    assert_eq!("cube".parse::<ExperienceKind>().ok(), Some(ExperienceKind::CubeField));
    assert_eq!("cubes".parse::<ExperienceKind>().ok(), Some(ExperienceKind::CubeField));
    assert_eq!("neural".parse::<ExperienceKind>().ok(), Some(ExperienceKind::NeuralNet));
    assert_eq!("grid".parse::<ExperienceKind>().ok(), Some(ExperienceKind::GridCode));
    assert_eq!("FLOCKING".parse::<ExperienceKind>().ok(), Some(ExperienceKind::Flocking));
    assert_eq!("Riemann".parse::<ExperienceKind>().ok(), Some(ExperienceKind::Riemann));
}

#[test]
fn unknown_names_are_rejected_with_the_offending_name() {
    let err = "teapot".parse::<ExperienceKind>().unwrap_err();
    assert!(matches!(err, VitrineError::UnknownExperience(name) if name == "teapot"));
}

// ============================================================================
// Camera Presets
// ============================================================================

#[test]
fn presets_are_sane() {
    for kind in ExperienceKind::ALL {
        let preset = kind.camera_preset();
        assert!(preset.base_distance > 0.0, "'{kind}' base distance");
        assert!(
            preset.fov > 0.0 && preset.fov < std::f32::consts::PI,
            "'{kind}' field of view"
        );
        assert!(
            preset.position.length() > 0.0,
            "'{kind}' camera must not start on the target"
        );
    }
}

#[test]
fn preset_orbit_angles_stay_off_the_poles() {
    for kind in ExperienceKind::ALL {
        let preset = kind.camera_preset();
        let rig = OrbitController::from_position(preset.position, Vec3::ZERO, preset.base_distance);
        assert!(
            rig.phi() > 0.1 && rig.phi() < std::f32::consts::PI - 0.1,
            "'{kind}' preset lands at phi {}",
            rig.phi()
        );
        assert!(
            rig.zoom() >= 0.2 && rig.zoom() <= 5.0,
            "'{kind}' preset lands at zoom {}",
            rig.zoom()
        );
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn build_constructs_the_matching_type() {
    for kind in ExperienceKind::ALL {
        let mut experience = kind.build();
        let any = experience.as_any_mut();
        let matches = match kind {
            ExperienceKind::Flocking => any.downcast_mut::<Flocking>().is_some(),
            ExperienceKind::CubeField => any.downcast_mut::<CubeField>().is_some(),
            ExperienceKind::Poincare => any.downcast_mut::<Poincare>().is_some(),
            ExperienceKind::Globe => any.downcast_mut::<Globe>().is_some(),
            ExperienceKind::NeuralNet => any.downcast_mut::<NeuralNet>().is_some(),
            ExperienceKind::Riemann => any.downcast_mut::<Riemann>().is_some(),
            ExperienceKind::Lorenz => any.downcast_mut::<Lorenz>().is_some(),
            ExperienceKind::GridCode => any.downcast_mut::<GridCode>().is_some(),
        };
        assert!(matches, "'{kind}' built the wrong concrete type");
    }
}

#[test]
fn downcast_to_the_wrong_type_fails() {
    let mut experience = ExperienceKind::Lorenz.build();
    assert!(experience.as_any_mut().downcast_mut::<Flocking>().is_none());
}

// ============================================================================
// Pre-Init Mode Switches
// ============================================================================

#[test]
fn poincare_dither_toggles() {
    let mut poincare = Poincare::new();
    assert!(!poincare.dither_enabled());
    poincare.toggle_dither();
    assert!(poincare.dither_enabled());
    poincare.toggle_dither();
    assert!(!poincare.dither_enabled());
    poincare.set_dither(true);
    assert!(poincare.dither_enabled());
}

#[test]
fn riemann_surface_cycles_through_all_four() {
    let mut riemann = Riemann::new();
    assert_eq!(riemann.surface(), SurfaceKind::Square);
    riemann.cycle_surface();
    assert_eq!(riemann.surface(), SurfaceKind::Reciprocal);
    riemann.cycle_surface();
    assert_eq!(riemann.surface(), SurfaceKind::Sqrt);
    riemann.cycle_surface();
    assert_eq!(riemann.surface(), SurfaceKind::Sine);
    riemann.cycle_surface();
    assert_eq!(riemann.surface(), SurfaceKind::Square);
}

#[test]
fn globe_style_cycles_through_all_three() {
    let mut globe = Globe::new();
    assert_eq!(globe.style(), GlobeStyle::Terra);
    globe.cycle_style();
    assert_eq!(globe.style(), GlobeStyle::Topo);
    globe.cycle_style();
    assert_eq!(globe.style(), GlobeStyle::Grid);
    globe.cycle_style();
    assert_eq!(globe.style(), GlobeStyle::Terra);
}

#[test]
fn gridcode_scale_clamps_and_wraps() {
    let mut grid = GridCode::new();
    assert_eq!(grid.scale_index(), 1);

    grid.set_scale(99);
    assert_eq!(grid.scale_index(), MODULE_SPACINGS.len() - 1);

    grid.cycle_scale();
    assert_eq!(grid.scale_index(), 0, "Cycling past the last module wraps");

    grid.set_scale(2);
    assert_eq!(grid.scale_index(), 2);
}

#[test]
fn module_spacings_grow_dorsoventrally() {
    for pair in MODULE_SPACINGS.windows(2) {
        assert!(pair[0] < pair[1], "Spacings must be ordered small to large");
    }
}
