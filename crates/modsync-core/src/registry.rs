//! Cache registry: the explicitly owned set of backend handlers.
//!
//! The registry owns one [`UpdateHandler`] per backend and drives the three
//! session-level operations: load every cache at startup, refresh every
//! enabled backend, and write back whatever changed.

use crate::cancel::CancellationToken;
use crate::config::SyncSettings;
use crate::models::{ModDescriptor, ModSource, ModSources};
use crate::network::{GitHubClient, HttpClient, NexusClient, SteamWorkshopClient};
use crate::sources::{
    GitHubBackend, HandlerControl, ModTarget, NexusBackend, SharedFetcher, SourceBackend,
    UpdateHandler, WorkshopBackend,
};
use crate::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The fetchers a registry refreshes from, one per backend.
pub struct Fetchers {
    pub github: SharedFetcher<GitHubBackend>,
    pub workshop: SharedFetcher<WorkshopBackend>,
    pub nexus: SharedFetcher<NexusBackend>,
}

impl Fetchers {
    /// Network-backed fetchers sharing one HTTP client.
    pub fn from_settings(settings: &SyncSettings) -> Result<Self> {
        let http = Arc::new(HttpClient::new()?);
        if settings.nexus.enabled && settings.nexus_api_key.is_none() {
            warn!("Nexus Mods is enabled but no API key is configured");
        }
        Ok(Self {
            github: Arc::new(GitHubClient::new(http.clone())),
            workshop: Arc::new(SteamWorkshopClient::new(http.clone())),
            nexus: Arc::new(NexusClient::new(
                http,
                settings.nexus_game_domain.clone(),
                settings.nexus_api_key.clone(),
            )),
        })
    }
}

/// Owns every backend handler and its cache for one session.
#[derive(Debug)]
pub struct CacheRegistry {
    cache_dir: PathBuf,
    app_version: String,
    keep_backup: bool,
    github: UpdateHandler<GitHubBackend>,
    workshop: UpdateHandler<WorkshopBackend>,
    nexus: UpdateHandler<NexusBackend>,
}

impl CacheRegistry {
    /// Wire a registry from settings and explicit fetchers. Caches start empty.
    pub fn new(settings: &SyncSettings, fetchers: Fetchers) -> Result<Self> {
        let cache_dir = settings.resolved_cache_dir()?;
        debug!("Cache directory: {}", cache_dir.display());

        Ok(Self {
            cache_dir,
            app_version: settings.app_version.clone(),
            keep_backup: settings.keep_backup,
            github: UpdateHandler::new(fetchers.github, &settings.github),
            workshop: UpdateHandler::new(fetchers.workshop, &settings.workshop),
            nexus: UpdateHandler::new(fetchers.nexus, &settings.nexus),
        })
    }

    /// Wire a registry that talks to the real backend APIs.
    pub fn with_clients(settings: &SyncSettings) -> Result<Self> {
        Self::new(settings, Fetchers::from_settings(settings)?)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn github(&self) -> &UpdateHandler<GitHubBackend> {
        &self.github
    }

    pub fn workshop(&self) -> &UpdateHandler<WorkshopBackend> {
        &self.workshop
    }

    pub fn nexus(&self) -> &UpdateHandler<NexusBackend> {
        &self.nexus
    }

    pub fn handler(&self, source: ModSource) -> &dyn HandlerControl {
        match source {
            ModSource::GitHub => &self.github,
            ModSource::SteamWorkshop => &self.workshop,
            ModSource::NexusMods => &self.nexus,
        }
    }

    pub fn handler_mut(&mut self, source: ModSource) -> &mut dyn HandlerControl {
        match source {
            ModSource::GitHub => &mut self.github,
            ModSource::SteamWorkshop => &mut self.workshop,
            ModSource::NexusMods => &mut self.nexus,
        }
    }

    fn handlers_mut(&mut self) -> [&mut dyn HandlerControl; 3] {
        [&mut self.github, &mut self.workshop, &mut self.nexus]
    }

    pub fn is_enabled(&self, source: ModSource) -> bool {
        self.handler(source).is_enabled()
    }

    pub fn set_enabled(&mut self, source: ModSource, enabled: bool) {
        self.handler_mut(source).set_enabled(enabled);
    }

    /// Load every backend's cache file. Never fails: a missing or corrupt
    /// file leaves that backend with an empty, clean cache.
    pub fn load_all(&mut self) {
        let dir = self.cache_dir.clone();
        for handler in self.handlers_mut() {
            handler.load_from(&dir);
        }
    }

    /// Run every enabled backend's update over `mods`.
    ///
    /// Backends run concurrently, each over its own slot of every descriptor.
    /// The result holds one entry per enabled backend; disabled backends are
    /// absent.
    pub async fn refresh_all(
        &mut self,
        mods: &mut [ModDescriptor],
        cancel: &CancellationToken,
    ) -> BTreeMap<ModSource, bool> {
        let mut github_targets = Vec::with_capacity(mods.len());
        let mut workshop_targets = Vec::with_capacity(mods.len());
        let mut nexus_targets = Vec::with_capacity(mods.len());

        for descriptor in mods.iter_mut() {
            let ModDescriptor { uuid, sources, .. } = descriptor;
            let uuid: &str = uuid.as_str();
            let ModSources {
                github,
                workshop,
                nexus,
            } = sources;
            github_targets.push(ModTarget::new(uuid, github.as_mut()));
            workshop_targets.push(ModTarget::new(uuid, workshop.as_mut()));
            nexus_targets.push(ModTarget::new(uuid, nexus.as_mut()));
        }

        let (github, workshop, nexus) = tokio::join!(
            run_enabled(&mut self.github, github_targets, cancel),
            run_enabled(&mut self.workshop, workshop_targets, cancel),
            run_enabled(&mut self.nexus, nexus_targets, cancel),
        );

        let outcomes: BTreeMap<ModSource, bool> = [
            (ModSource::GitHub, github),
            (ModSource::SteamWorkshop, workshop),
            (ModSource::NexusMods, nexus),
        ]
        .into_iter()
        .filter_map(|(source, outcome)| outcome.map(|success| (source, success)))
        .collect();

        info!("Refresh finished: {:?}", outcomes);
        outcomes
    }

    /// Write every dirty cache to its file and return the sources written.
    ///
    /// A failed write is logged and leaves that cache dirty; the remaining
    /// backends are still persisted.
    pub fn persist_dirty(&mut self) -> Vec<ModSource> {
        let dir = self.cache_dir.clone();
        let version = self.app_version.clone();
        let keep_backup = self.keep_backup;

        let mut written = Vec::new();
        for handler in self.handlers_mut() {
            if !handler.is_dirty() {
                continue;
            }
            match handler.persist_to(&dir, &version, keep_backup) {
                Ok(()) => written.push(handler.source()),
                Err(e) => warn!("Failed to persist {} cache: {}", handler.source(), e),
            }
        }
        written
    }
}

async fn run_enabled<B: SourceBackend>(
    handler: &mut UpdateHandler<B>,
    targets: Vec<ModTarget<'_, B::Slot>>,
    cancel: &CancellationToken,
) -> Option<bool> {
    if !handler.is_enabled() {
        debug!("{} is disabled, skipping update", B::SOURCE);
        return None;
    }
    Some(handler.update(targets, cancel).await)
}
