//! Engine State Tests
//!
//! Tests for:
//! - Frame scheduler arming, cancelling, and frame indices
//! - Engine lifecycle state outside a GPU session
//! - Resource registry injection
//! - Experience registry ordering semantics
//!
//! Everything here runs headless; sessions that actually acquire a GPU
//! context are exercised by the demo launchers.

use std::sync::Arc;

use vitrine::experience::ExperienceRegistry;
use vitrine::gpu::{ResourceCategory, ResourceRegistry};
use vitrine::{
    Engine, EngineSettings, EngineState, ExperienceKind, FrameScheduler, VitrineError,
};

// ============================================================================
// Frame Scheduler
// ============================================================================

#[test]
fn scheduler_starts_disarmed() {
    let mut scheduler = FrameScheduler::new();
    assert!(!scheduler.is_armed());
    assert_eq!(scheduler.begin_frame(), None);
    assert_eq!(scheduler.frames_begun(), 0);
}

#[test]
fn armed_scheduler_hands_out_sequential_indices() {
    let mut scheduler = FrameScheduler::new();
    scheduler.arm();
    assert_eq!(scheduler.begin_frame(), Some(0));
    assert_eq!(scheduler.begin_frame(), Some(1));
    assert_eq!(scheduler.begin_frame(), Some(2));
    assert_eq!(scheduler.frames_begun(), 3);
}

#[test]
fn cancel_stops_new_frames() {
    let mut scheduler = FrameScheduler::new();
    scheduler.arm();
    scheduler.begin_frame();
    scheduler.cancel();

    assert!(!scheduler.is_armed());
    assert_eq!(scheduler.begin_frame(), None);
    assert_eq!(scheduler.frames_begun(), 1, "Cancelled frames must not count");
}

#[test]
fn frame_indices_continue_across_rearm() {
    let mut scheduler = FrameScheduler::new();
    scheduler.arm();
    scheduler.begin_frame();
    scheduler.begin_frame();
    scheduler.cancel();
    scheduler.arm();
    // The index is session-spanning, not per-arm
    assert_eq!(scheduler.begin_frame(), Some(2));
}

#[test]
fn cancel_is_idempotent() {
    let mut scheduler = FrameScheduler::new();
    scheduler.cancel();
    scheduler.cancel();
    assert!(!scheduler.is_armed());
    scheduler.arm();
    assert!(scheduler.is_armed());
}

// ============================================================================
// Engine Outside a Session
// ============================================================================

#[test]
fn engine_begins_uninitialized() {
    let engine = Engine::default();
    assert_eq!(engine.state(), EngineState::Uninitialized);
    assert!(!engine.is_running());
    assert!(!engine.wants_frame());
    assert_eq!(engine.active_kind(), None);
    assert_eq!(engine.size(), (0, 0));
    assert_eq!(engine.frame_count(), 0);
}

#[test]
fn engine_without_session_has_no_rig() {
    let mut engine = Engine::default();
    assert!(engine.camera().is_none());
    assert!(engine.orbit().is_none());
    assert!(engine.active_experience_mut().is_none());
}

#[test]
fn gpu_accessor_errors_outside_a_session() {
    let engine = Engine::default();
    assert!(matches!(engine.gpu(), Err(VitrineError::NotRunning)));
}

#[test]
fn cleanup_without_session_is_a_noop() {
    let mut engine = Engine::default();
    engine.cleanup();
    engine.cleanup();
    assert_eq!(engine.state(), EngineState::Uninitialized);
    assert_eq!(engine.registry().total_live(), 0);
}

#[test]
fn render_frame_without_session_is_a_noop() {
    let mut engine = Engine::default();
    engine.render_frame();
    assert_eq!(engine.frame_count(), 0);
}

#[test]
fn injected_registry_is_shared_not_copied() {
    let registry = Arc::new(ResourceRegistry::new());
    let engine = Engine::with_registry(EngineSettings::default(), Arc::clone(&registry));

    let _probe = registry.track((), ResourceCategory::Other);
    assert_eq!(engine.registry().total_live(), 1);
}

// ============================================================================
// Experience Registry Ordering
// ============================================================================

#[test]
fn registry_preserves_registration_order() {
    let mut registry = ExperienceRegistry::new();
    registry.register(ExperienceKind::Globe, ExperienceKind::Globe.build());
    registry.register(ExperienceKind::Lorenz, ExperienceKind::Lorenz.build());
    registry.register(ExperienceKind::Poincare, ExperienceKind::Poincare.build());

    assert_eq!(
        registry.kinds(),
        vec![
            ExperienceKind::Globe,
            ExperienceKind::Lorenz,
            ExperienceKind::Poincare
        ]
    );
}

#[test]
fn reregistering_replaces_in_place() {
    let mut registry = ExperienceRegistry::new();
    registry.register(ExperienceKind::Globe, ExperienceKind::Globe.build());
    registry.register(ExperienceKind::Lorenz, ExperienceKind::Lorenz.build());
    registry.register(ExperienceKind::Globe, ExperienceKind::Globe.build());

    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.kinds(),
        vec![ExperienceKind::Globe, ExperienceKind::Lorenz],
        "Replacement must keep the original position"
    );
    assert!(registry.get_mut(ExperienceKind::Globe).is_some());
}

#[test]
fn take_removes_without_disturbing_order() {
    let mut registry = ExperienceRegistry::new();
    registry.register(ExperienceKind::Globe, ExperienceKind::Globe.build());
    registry.register(ExperienceKind::Lorenz, ExperienceKind::Lorenz.build());
    registry.register(ExperienceKind::Poincare, ExperienceKind::Poincare.build());

    assert!(registry.take(ExperienceKind::Lorenz).is_some());
    assert!(registry.take(ExperienceKind::Lorenz).is_none());
    assert_eq!(
        registry.kinds(),
        vec![ExperienceKind::Globe, ExperienceKind::Poincare]
    );
}

#[test]
fn drain_yields_registration_order() {
    let mut registry = ExperienceRegistry::new();
    registry.register(ExperienceKind::Riemann, ExperienceKind::Riemann.build());
    registry.register(ExperienceKind::Flocking, ExperienceKind::Flocking.build());

    let drained: Vec<_> = registry.drain().map(|(kind, _)| kind).collect();
    assert_eq!(drained, vec![ExperienceKind::Riemann, ExperienceKind::Flocking]);
    assert!(registry.is_empty());
}
