//! GPU plumbing: context acquisition, resource identity, and the
//! category-bucketed resource tally.

pub mod context;
pub mod registry;
pub mod tracked;

pub use context::GpuContext;
pub use registry::{CategoryStats, RegistryStats, ResourceCategory, ResourceRegistry};
pub use tracked::{ResourceId, Tracked};
