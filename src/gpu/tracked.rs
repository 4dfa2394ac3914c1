//! Resource identity wrapper.
//!
//! Every GPU object that participates in the leak tally is wrapped in a
//! [`Tracked`], which mints a process-unique id and remembers the category
//! bucket the object was registered under.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::gpu::registry::ResourceCategory;

/// Unique identifier for a tracked GPU resource.
pub type ResourceId = u64;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_id() -> ResourceId {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A GPU resource paired with its registry identity.
///
/// Wrapping is done by [`ResourceRegistry::track`](crate::gpu::ResourceRegistry::track),
/// which registers the id; handing the wrapper back to
/// [`ResourceRegistry::release`](crate::gpu::ResourceRegistry::release)
/// unregisters it and returns the inner resource for final disposal.
#[derive(Debug)]
pub struct Tracked<T> {
    inner: T,
    id: ResourceId,
    category: ResourceCategory,
}

impl<T> Tracked<T> {
    pub(crate) fn new(inner: T, id: ResourceId, category: ResourceCategory) -> Self {
        Self {
            inner,
            id,
            category,
        }
    }

    /// The unique id assigned at registration.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// The category bucket this resource was registered under.
    #[inline]
    #[must_use]
    pub fn category(&self) -> ResourceCategory {
        self.category
    }

    /// Unwraps the inner resource without touching the registry.
    ///
    /// Prefer [`ResourceRegistry::release`](crate::gpu::ResourceRegistry::release),
    /// which keeps the tally balanced.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.inner
    }
}

// Convenient access to the wrapped resource (e.g. `buffer.as_entire_binding()`).
impl<T> Deref for Tracked<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
