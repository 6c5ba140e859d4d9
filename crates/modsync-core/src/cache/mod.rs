//! Per-backend caches of remote mod metadata.
//!
//! - [`KeyedCache`]: insertion-ordered record map with dirty tracking
//! - [`SourceCache`]: a backend's persisted document (records plus extras)
//! - record types for GitHub, Steam Workshop and Nexus Mods

mod github;
mod keyed;
mod metadata;
mod nexus;
mod source;
mod workshop;

pub use github::{GitHubCache, GitHubCachedMod};
pub use keyed::{CacheRecord, KeyedCache};
pub use metadata::CacheMetadata;
pub use nexus::{NexusCache, NexusCachedMod};
pub use source::SourceCache;
pub use workshop::{WorkshopCache, WorkshopCachedMod};
