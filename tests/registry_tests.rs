//! Resource Registry Tests
//!
//! Tests for:
//! - Tracking, release, and the live tally
//! - The `live == created - destroyed` invariant under odd call orders
//! - Double-register and double-unregister as safe no-ops
//! - Category bucketing and stats snapshots
//! - The advisory leak sweep

use vitrine::gpu::{ResourceCategory, ResourceRegistry};

// The registry is pure bookkeeping, so plain values stand in for GPU
// objects throughout.

// ============================================================================
// Tracking and Release
// ============================================================================

#[test]
fn track_assigns_unique_ids() {
    let registry = ResourceRegistry::new();
    let a = registry.track(1u32, ResourceCategory::Buffer);
    let b = registry.track(2u32, ResourceCategory::Buffer);
    let c = registry.track(3u32, ResourceCategory::Texture);
    assert_ne!(a.id(), b.id());
    assert_ne!(b.id(), c.id());
    assert_ne!(a.id(), c.id());
}

#[test]
fn tracked_remembers_its_category() {
    let registry = ResourceRegistry::new();
    let t = registry.track((), ResourceCategory::Pipeline);
    assert_eq!(t.category(), ResourceCategory::Pipeline);
}

#[test]
fn release_returns_the_inner_resource() {
    let registry = ResourceRegistry::new();
    let tracked = registry.track(String::from("depth target"), ResourceCategory::Texture);
    assert_eq!(registry.live_count(ResourceCategory::Texture), 1);

    let inner = registry.release(tracked);
    assert_eq!(inner, "depth target");
    assert_eq!(registry.live_count(ResourceCategory::Texture), 0);
}

#[test]
fn live_counts_are_per_category() {
    let registry = ResourceRegistry::new();
    let _b1 = registry.track(0u8, ResourceCategory::Buffer);
    let _b2 = registry.track(0u8, ResourceCategory::Buffer);
    let _t = registry.track(0u8, ResourceCategory::Texture);
    let _p = registry.track(0u8, ResourceCategory::Pipeline);

    assert_eq!(registry.live_count(ResourceCategory::Buffer), 2);
    assert_eq!(registry.live_count(ResourceCategory::Texture), 1);
    assert_eq!(registry.live_count(ResourceCategory::Pipeline), 1);
    assert_eq!(registry.live_count(ResourceCategory::BindGroup), 0);
    assert_eq!(registry.total_live(), 4);
}

// ============================================================================
// Tally Invariant
// ============================================================================

#[test]
fn live_equals_created_minus_destroyed() {
    let registry = ResourceRegistry::new();
    let a = registry.track(0u8, ResourceCategory::Buffer);
    let b = registry.track(0u8, ResourceCategory::Buffer);
    let _c = registry.track(0u8, ResourceCategory::Buffer);
    drop(registry.release(a));
    drop(registry.release(b));

    let stats = registry.stats().category(ResourceCategory::Buffer);
    assert_eq!(stats.created, 3);
    assert_eq!(stats.destroyed, 2);
    assert_eq!(stats.live, 1);
    assert_eq!(stats.live as u64, stats.created - stats.destroyed);
}

#[test]
fn double_unregister_is_a_noop() {
    let registry = ResourceRegistry::new();
    let tracked = registry.track(0u8, ResourceCategory::BindGroup);
    let id = tracked.id();
    drop(registry.release(tracked));

    assert!(!registry.unregister(id, ResourceCategory::BindGroup));
    let stats = registry.stats().category(ResourceCategory::BindGroup);
    assert_eq!(stats.destroyed, 1, "Second unregister must not double count");
    assert_eq!(stats.live, 0);
}

#[test]
fn double_register_is_a_noop() {
    let registry = ResourceRegistry::new();
    let tracked = registry.track(0u8, ResourceCategory::Buffer);
    registry.register(tracked.id(), ResourceCategory::Buffer);

    let stats = registry.stats().category(ResourceCategory::Buffer);
    assert_eq!(stats.created, 1, "Re-registering a live id must not double count");
    assert_eq!(stats.live, 1);
}

#[test]
fn live_id_cannot_move_to_another_bucket() {
    let registry = ResourceRegistry::new();
    let tracked = registry.track(0u8, ResourceCategory::Buffer);
    registry.register(tracked.id(), ResourceCategory::Texture);

    assert_eq!(registry.live_count(ResourceCategory::Buffer), 1);
    assert_eq!(registry.live_count(ResourceCategory::Texture), 0);
}

#[test]
fn unregister_checks_the_right_bucket() {
    let registry = ResourceRegistry::new();
    let tracked = registry.track(0u8, ResourceCategory::Buffer);

    // Wrong bucket: no effect
    assert!(!registry.unregister(tracked.id(), ResourceCategory::Texture));
    assert_eq!(registry.live_count(ResourceCategory::Buffer), 1);

    // Right bucket
    assert!(registry.unregister(tracked.id(), ResourceCategory::Buffer));
    assert_eq!(registry.live_count(ResourceCategory::Buffer), 0);
}

// ============================================================================
// Sweep
// ============================================================================

#[test]
fn sweep_reports_the_live_total() {
    let registry = ResourceRegistry::new();
    assert_eq!(registry.sweep(), 0);

    let a = registry.track(0u8, ResourceCategory::Buffer);
    let _b = registry.track(0u8, ResourceCategory::Pipeline);
    assert_eq!(registry.sweep(), 2);

    drop(registry.release(a));
    assert_eq!(registry.sweep(), 1);
}

#[test]
fn sweep_does_not_mutate_the_tally() {
    let registry = ResourceRegistry::new();
    let _a = registry.track(0u8, ResourceCategory::Other);
    registry.sweep();
    registry.sweep();

    let stats = registry.stats().category(ResourceCategory::Other);
    assert_eq!(stats.live, 1);
    assert_eq!(stats.created, 1);
    assert_eq!(stats.destroyed, 0);
}

// ============================================================================
// Stats Snapshot
// ============================================================================

#[test]
fn stats_total_spans_all_categories() {
    let registry = ResourceRegistry::new();
    let mut kept = Vec::new();
    for category in ResourceCategory::ALL {
        kept.push(registry.track(0u8, category));
    }
    assert_eq!(registry.stats().total_live(), ResourceCategory::ALL.len());
}

#[test]
fn registries_are_independent() {
    let first = ResourceRegistry::new();
    let second = ResourceRegistry::new();
    let _a = first.track(0u8, ResourceCategory::Buffer);

    assert_eq!(first.total_live(), 1);
    assert_eq!(second.total_live(), 0, "No process-global state may leak between registries");
}
