//! Generic update handler shared by every backend.

use super::{ModTarget, SharedFetcher, SourceBackend};
use crate::cache::{CacheMetadata, SourceCache};
use crate::cancel::CancellationToken;
use crate::codec::SerializerOptions;
use crate::config::SourceSettings;
use crate::models::{ModDescriptor, ModSource};
use crate::storage;
use crate::Result;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// One backend's descriptor: identity, persistence options, enabled flag,
/// the owned cache and the fetcher it refreshes from.
pub struct UpdateHandler<B: SourceBackend> {
    fetcher: SharedFetcher<B>,
    cache: B::Cache,
    enabled: bool,
    options: SerializerOptions,
}

impl<B: SourceBackend> UpdateHandler<B> {
    /// Create a handler with an empty cache.
    pub fn new(fetcher: SharedFetcher<B>, settings: &SourceSettings) -> Self {
        Self {
            fetcher,
            cache: B::Cache::default(),
            enabled: settings.enabled,
            options: settings.serializer.clone(),
        }
    }

    pub fn cache(&self) -> &B::Cache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut B::Cache {
        &mut self.cache
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    /// Update every mod of `mods` that has a slot for this backend.
    pub async fn update_mods(&mut self, mods: &mut [ModDescriptor], cancel: &CancellationToken) -> bool {
        let targets = super::targets_for::<B>(mods);
        self.update(targets, cancel).await
    }

    /// Fetch and fold the latest metadata for a batch of mods.
    ///
    /// Mods are processed one at a time in input order. Returns `true` when
    /// at least one fetch succeeded; an empty batch returns `false`. Failures
    /// never escape: they are logged and the batch moves on. A panicking
    /// fetcher ends the batch but keeps what was already applied, as does
    /// cancellation.
    pub async fn update(
        &mut self,
        targets: Vec<ModTarget<'_, B::Slot>>,
        cancel: &CancellationToken,
    ) -> bool {
        if targets.is_empty() {
            debug!("{}: empty batch, nothing to update", B::SOURCE);
            return false;
        }

        let mut success = false;
        let mut applied = 0usize;

        for target in targets {
            let ModTarget { uuid, slot } = target;
            let Some(slot) = slot else {
                continue;
            };
            let Some(identity) = B::identity(slot) else {
                debug!("{}: {} has no usable identity, skipping", B::SOURCE, uuid);
                continue;
            };
            if B::is_known_absent(uuid, &self.cache) {
                debug!("{}: {} is known to be absent, skipping", B::SOURCE, uuid);
                continue;
            }

            if cancel.is_cancelled() {
                info!("{}: update cancelled before {}", B::SOURCE, uuid);
                break;
            }

            let fetch = AssertUnwindSafe(self.fetcher.fetch_latest(&identity, cancel)).catch_unwind();
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("{}: update cancelled while fetching {}", B::SOURCE, identity);
                    break;
                }
                outcome = fetch => outcome,
            };

            match outcome {
                Ok(Ok(Some(metadata))) => {
                    B::apply(uuid, slot, metadata, &mut self.cache);
                    applied += 1;
                    success = true;
                }
                Ok(Ok(None)) => {
                    warn!("{}: {} ({}) not found", B::SOURCE, uuid, identity);
                    B::on_not_found(uuid, &mut self.cache);
                }
                Ok(Err(e)) if e.is_cancelled() => {
                    info!("{}: fetch for {} cancelled", B::SOURCE, identity);
                    break;
                }
                Ok(Err(e)) => {
                    warn!("{}: failed to fetch {} ({}): {}", B::SOURCE, uuid, identity, e);
                }
                Err(panic) => {
                    error!(
                        "{}: fetcher panicked on {} ({}), aborting batch: {}",
                        B::SOURCE,
                        uuid,
                        identity,
                        panic_message(&*panic)
                    );
                    break;
                }
            }
        }

        debug!("{}: applied {} update(s)", B::SOURCE, applied);
        success
    }

    fn cache_path(&self, dir: &Path) -> PathBuf {
        dir.join(B::FILE_NAME)
    }
}

impl<B: SourceBackend> fmt::Debug for UpdateHandler<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateHandler")
            .field("source", &B::SOURCE)
            .field("enabled", &self.enabled)
            .field("options", &self.options)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Type-erased controls the registry needs for every backend.
pub trait HandlerControl: Send + Sync {
    fn source(&self) -> ModSource;

    fn file_name(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    fn metadata(&self) -> &CacheMetadata;

    fn is_dirty(&self) -> bool;

    /// Replace the cache with the contents of its file under `dir`.
    ///
    /// A missing, unreadable or corrupt file leaves an empty cache.
    fn load_from(&mut self, dir: &Path);

    /// Write the cache to its file under `dir` and mark it clean.
    ///
    /// On failure the cache keeps its previous metadata and stays dirty.
    fn persist_to(&mut self, dir: &Path, version: &str, keep_backup: bool) -> Result<()>;
}

impl<B: SourceBackend> HandlerControl for UpdateHandler<B> {
    fn source(&self) -> ModSource {
        B::SOURCE
    }

    fn file_name(&self) -> &'static str {
        B::FILE_NAME
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("{} {}", B::SOURCE, if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    fn metadata(&self) -> &CacheMetadata {
        self.cache.metadata()
    }

    fn is_dirty(&self) -> bool {
        self.cache.is_dirty()
    }

    fn load_from(&mut self, dir: &Path) {
        let path = self.cache_path(dir);
        self.cache = match storage::read_if_exists(&path) {
            Ok(Some(raw)) => match B::Cache::from_document(&raw) {
                Ok(cache) => {
                    debug!(
                        "Loaded {} cache with {} record(s) from {}",
                        B::SOURCE,
                        cache.mods().len(),
                        path.display()
                    );
                    cache
                }
                Err(e) => {
                    warn!("Corrupt {} cache {}, starting empty: {}", B::SOURCE, path.display(), e);
                    B::Cache::default()
                }
            },
            Ok(None) => {
                warn!("No {} cache at {}, starting empty", B::SOURCE, path.display());
                B::Cache::default()
            }
            Err(e) => {
                warn!("Failed to read {} cache, starting empty: {}", B::SOURCE, e);
                B::Cache::default()
            }
        };
    }

    fn persist_to(&mut self, dir: &Path, version: &str, keep_backup: bool) -> Result<()> {
        let path = self.cache_path(dir);
        let previous = self.cache.metadata().clone();
        let timestamp = chrono::Utc::now().timestamp();

        let meta = self.cache.metadata_mut();
        meta.last_updated = timestamp;
        meta.last_version = version.to_string();

        let written = self
            .cache
            .to_document(&self.options)
            .and_then(|document| storage::atomic_write(&path, &document, keep_backup));

        match written {
            Ok(()) => {
                self.cache.metadata_mut().mark_persisted(timestamp, version);
                info!("Persisted {} cache to {}", B::SOURCE, path.display());
                Ok(())
            }
            Err(e) => {
                *self.cache.metadata_mut() = previous;
                Err(e)
            }
        }
    }
}
