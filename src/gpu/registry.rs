//! Category-bucketed resource tally.
//!
//! The [`ResourceRegistry`] is pure bookkeeping: every tracked GPU object is
//! counted into exactly one category bucket on creation and counted out on
//! release. There is no caching and no eviction; the tally exists so a
//! session can prove at teardown that nothing leaked.
//!
//! The registry is an explicit object shared by `Arc` between the engine,
//! the resource manager, the camera, and the experiences. Nothing in this
//! crate reaches for process-global state, so parallel tests and multiple
//! engines never observe each other's counts.

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::gpu::tracked::{self, ResourceId, Tracked};

/// Category bucket for a tracked GPU resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    /// Vertex, index, uniform, and storage buffers.
    Buffer,
    /// Textures (color, depth, procedural surfaces).
    Texture,
    /// Bind groups.
    BindGroup,
    /// Render and compute pipelines.
    Pipeline,
    /// Everything else (samplers, query sets, …).
    Other,
}

pub(crate) const CATEGORY_COUNT: usize = 5;

impl ResourceCategory {
    /// All categories, in bucket order.
    pub const ALL: [ResourceCategory; CATEGORY_COUNT] = [
        ResourceCategory::Buffer,
        ResourceCategory::Texture,
        ResourceCategory::BindGroup,
        ResourceCategory::Pipeline,
        ResourceCategory::Other,
    ];

    fn index(self) -> usize {
        match self {
            ResourceCategory::Buffer => 0,
            ResourceCategory::Texture => 1,
            ResourceCategory::BindGroup => 2,
            ResourceCategory::Pipeline => 3,
            ResourceCategory::Other => 4,
        }
    }

    /// Human-readable bucket name for diagnostics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ResourceCategory::Buffer => "buffers",
            ResourceCategory::Texture => "textures",
            ResourceCategory::BindGroup => "bind groups",
            ResourceCategory::Pipeline => "pipelines",
            ResourceCategory::Other => "others",
        }
    }
}

#[derive(Debug, Default)]
struct Bucket {
    live: FxHashSet<ResourceId>,
    created: u64,
    destroyed: u64,
}

/// Counters for one category bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryStats {
    /// Resources currently registered.
    pub live: usize,
    /// Total registrations since the registry was created.
    pub created: u64,
    /// Total unregistrations since the registry was created.
    pub destroyed: u64,
}

/// Snapshot of all bucket counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryStats {
    categories: [CategoryStats; CATEGORY_COUNT],
}

impl RegistryStats {
    /// Counters for one category.
    #[must_use]
    pub fn category(&self, category: ResourceCategory) -> CategoryStats {
        self.categories[category.index()]
    }

    /// Total live resources across all categories.
    #[must_use]
    pub fn total_live(&self) -> usize {
        self.categories.iter().map(|c| c.live).sum()
    }
}

/// Create/destroy tally for GPU resources, bucketed by category.
///
/// Registering an id twice, or unregistering an id that is not present, is
/// a safe no-op, so the invariant `live == created − destroyed` holds per
/// bucket for any call sequence and never goes negative.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    buckets: Mutex<[Bucket; CATEGORY_COUNT]>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `resource`, assigns it a fresh id, and registers it under
    /// `category`.
    pub fn track<T>(&self, resource: T, category: ResourceCategory) -> Tracked<T> {
        let id = tracked::next_id();
        self.register(id, category);
        Tracked::new(resource, id, category)
    }

    /// Registers an id under a category bucket.
    ///
    /// An id that is already live in any bucket is left where it is (a
    /// resource appears in at most one bucket at a time).
    pub fn register(&self, id: ResourceId, category: ResourceCategory) {
        let mut buckets = self.buckets.lock();
        if buckets.iter().any(|b| b.live.contains(&id)) {
            return;
        }
        let bucket = &mut buckets[category.index()];
        bucket.live.insert(id);
        bucket.created += 1;
    }

    /// Unregisters an id from its category bucket.
    ///
    /// Returns `true` if the id was present. Unregistering an absent id is
    /// a safe no-op and leaves every counter untouched.
    pub fn unregister(&self, id: ResourceId, category: ResourceCategory) -> bool {
        let mut buckets = self.buckets.lock();
        let bucket = &mut buckets[category.index()];
        if bucket.live.remove(&id) {
            bucket.destroyed += 1;
            true
        } else {
            false
        }
    }

    /// Unregisters a tracked resource and returns the inner object so the
    /// caller can dispose of it (`Buffer::destroy`, drop, …).
    pub fn release<T>(&self, resource: Tracked<T>) -> T {
        self.unregister(resource.id(), resource.category());
        resource.into_inner()
    }

    /// Releases a tracked buffer and destroys it immediately.
    pub fn release_buffer(&self, buffer: Tracked<wgpu::Buffer>) {
        self.release(buffer).destroy();
    }

    /// Releases a tracked texture and destroys it immediately.
    pub fn release_texture(&self, texture: Tracked<wgpu::Texture>) {
        self.release(texture).destroy();
    }

    /// Number of live resources in one category.
    #[must_use]
    pub fn live_count(&self, category: ResourceCategory) -> usize {
        self.buckets.lock()[category.index()].live.len()
    }

    /// Total live resources across all categories.
    #[must_use]
    pub fn total_live(&self) -> usize {
        self.buckets.lock().iter().map(|b| b.live.len()).sum()
    }

    /// Snapshot of all counters.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let buckets = self.buckets.lock();
        let mut stats = RegistryStats::default();
        for (slot, bucket) in stats.categories.iter_mut().zip(buckets.iter()) {
            *slot = CategoryStats {
                live: bucket.live.len(),
                created: bucket.created,
                destroyed: bucket.destroyed,
            };
        }
        stats
    }

    /// Advisory leak sweep: logs every bucket that still holds live
    /// resources and returns the total live count.
    ///
    /// Actual release stays on the owners' cleanup paths; the sweep performs
    /// no compaction or eviction and leaves the tally untouched.
    pub fn sweep(&self) -> usize {
        let stats = self.stats();
        let total = stats.total_live();
        if total == 0 {
            log::info!("Resource sweep: all buckets clear");
            return 0;
        }
        for category in ResourceCategory::ALL {
            let c = stats.category(category);
            if c.live > 0 {
                log::warn!(
                    "Resource sweep: {} {} still live ({} created / {} destroyed)",
                    c.live,
                    category.label(),
                    c.created,
                    c.destroyed
                );
            }
        }
        total
    }
}
