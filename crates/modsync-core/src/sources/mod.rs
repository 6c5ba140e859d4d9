//! Pluggable per-backend update handlers.
//!
//! A backend is described by a [`SourceBackend`] implementation: where its
//! slot lives on a [`ModDescriptor`], what identity it looks mods up by, and
//! how a fetched result folds into its cache. The generic [`UpdateHandler`]
//! drives the batch; a [`FetchLatest`] implementation does the network I/O.

mod github;
mod handler;
mod nexus;
mod workshop;

pub use github::{GitHubBackend, GitHubRepo};
pub use handler::{HandlerControl, UpdateHandler};
pub use nexus::NexusBackend;
pub use workshop::WorkshopBackend;

use crate::cache::SourceCache;
use crate::cancel::CancellationToken;
use crate::models::{ModDescriptor, ModSource, ModSources};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches the latest remote metadata for one mod identity.
///
/// Implementations must not mutate caller state and should return promptly
/// once `cancel` fires.
#[async_trait]
pub trait FetchLatest: Send + Sync {
    type Identity: Send + Sync;
    type Metadata: Send;

    /// `Ok(None)` means the backend does not know this identity.
    async fn fetch_latest(
        &self,
        identity: &Self::Identity,
        cancel: &CancellationToken,
    ) -> Result<Option<Self::Metadata>>;
}

/// Shared fetcher handle for backend `B`.
pub type SharedFetcher<B> = Arc<
    dyn FetchLatest<
        Identity = <B as SourceBackend>::Identity,
        Metadata = <B as SourceBackend>::Metadata,
    >,
>;

/// Static description of one backend.
pub trait SourceBackend: Send + Sync + 'static {
    const SOURCE: ModSource;
    const FILE_NAME: &'static str;

    type Cache: SourceCache;
    /// Per-mod metadata slot the handler writes fetched results into.
    type Slot: Send;
    type Identity: Send + Sync + std::fmt::Display;
    type Metadata: Send + 'static;

    fn slot(sources: &mut ModSources) -> Option<&mut Self::Slot>;

    /// Lookup identity, or `None` when the slot carries no usable pointer.
    fn identity(slot: &Self::Slot) -> Option<Self::Identity>;

    /// Skip a mod the cache already knows to be absent from this backend.
    fn is_known_absent(_uuid: &str, _cache: &Self::Cache) -> bool {
        false
    }

    /// Copy fetched metadata into the mod's slot and upsert the cache record.
    fn apply(uuid: &str, slot: &mut Self::Slot, metadata: Self::Metadata, cache: &mut Self::Cache);

    /// Record that the backend reported `uuid` as not found.
    fn on_not_found(_uuid: &str, _cache: &mut Self::Cache) {}
}

/// One mod of a batch, borrowed down to the parts a single backend touches.
#[derive(Debug)]
pub struct ModTarget<'a, S> {
    pub uuid: &'a str,
    pub slot: Option<&'a mut S>,
}

impl<'a, S> ModTarget<'a, S> {
    pub fn new(uuid: &'a str, slot: Option<&'a mut S>) -> Self {
        Self { uuid, slot }
    }
}

/// Borrow every descriptor's slot for backend `B`.
pub fn targets_for<B: SourceBackend>(mods: &mut [ModDescriptor]) -> Vec<ModTarget<'_, B::Slot>> {
    mods.iter_mut()
        .map(|descriptor| {
            let ModDescriptor { uuid, sources, .. } = descriptor;
            ModTarget::new(uuid.as_str(), B::slot(sources))
        })
        .collect()
}
