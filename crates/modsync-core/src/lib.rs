//! Modsync Core - Headless cache and update-synchronization engine for game mods.
//!
//! This crate keeps per-backend caches of remote mod metadata (GitHub
//! releases, Steam Workshop files, Nexus Mods pages), refreshes them through
//! pluggable fetchers, and persists them as JSON documents. It has no UI or
//! RPC layer; see the `modsync-cli` crate for a command-line host.
//!
//! # Example
//!
//! ```rust,ignore
//! use modsync_core::{CacheRegistry, CancellationToken, ModDescriptor, SyncSettings};
//!
//! #[tokio::main]
//! async fn main() -> modsync_core::Result<()> {
//!     let settings = SyncSettings::load_or_default("settings.json".as_ref())?;
//!     let mut registry = CacheRegistry::with_clients(&settings)?;
//!     registry.load_all();
//!
//!     let mut mods = vec![ModDescriptor::new("uuid-1", "Some Mod").with_github("author", "repo")];
//!     let outcomes = registry.refresh_all(&mut mods, &CancellationToken::new()).await;
//!     println!("Refresh outcomes: {:?}", outcomes);
//!
//!     let written = registry.persist_dirty();
//!     println!("Persisted {} cache(s)", written.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cancel;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod network;
pub mod registry;
pub mod sources;
pub mod storage;

// Re-export commonly used types
pub use cache::{
    CacheMetadata, CacheRecord, GitHubCache, KeyedCache, NexusCache, SourceCache, WorkshopCache,
};
pub use cancel::{CancellationToken, CancelledError};
pub use codec::SerializerOptions;
pub use config::{SourceSettings, SyncSettings};
pub use error::{ModSyncError, Result};
pub use models::{ModDescriptor, ModSource};
pub use registry::{CacheRegistry, Fetchers};
pub use sources::{FetchLatest, HandlerControl, SourceBackend, UpdateHandler};
