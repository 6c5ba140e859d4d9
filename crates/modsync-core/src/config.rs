//! Centralized configuration for the modsync engine.
//!
//! Constant groups live on unit structs; user-tunable values are read from a
//! JSON settings file into [`SyncSettings`].

use crate::codec::SerializerOptions;
use crate::models::ModSource;
use crate::{ModSyncError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const USER_AGENT: &'static str = concat!("modsync/", env!("CARGO_PKG_VERSION"));
    pub const GITHUB_API_BASE: &'static str = "https://api.github.com";
    pub const STEAM_API_BASE: &'static str = "https://api.steampowered.com";
    pub const NEXUS_API_BASE: &'static str = "https://api.nexusmods.com";
    pub const NEXUS_DEFAULT_GAME: &'static str = "baldursgate3";
}

/// Cache file naming.
pub struct CacheFileConfig;

impl CacheFileConfig {
    pub const GITHUB_FILE_NAME: &'static str = "githubdata.json";
    pub const WORKSHOP_FILE_NAME: &'static str = "workshopdata.json";
    pub const NEXUS_FILE_NAME: &'static str = "nexusmodsdata.json";
    pub const APP_DIR_NAME: &'static str = "modsync";
    pub const CACHE_DIR_NAME: &'static str = "cache";
    /// Appended to a cache file name for the copy kept by `keep_backup`.
    pub const BACKUP_SUFFIX: &'static str = ".bak";
}

/// Per-backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub enabled: bool,
    pub serializer: SerializerOptions,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            serializer: SerializerOptions::default(),
        }
    }
}

/// User-tunable settings for a sync session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Directory holding one cache file per backend.
    pub cache_dir: Option<PathBuf>,
    /// Version written into each cache's `LastVersion` on persist.
    pub app_version: String,
    /// Keep a `.bak` copy of the previous cache file on write.
    pub keep_backup: bool,
    pub github: SourceSettings,
    pub workshop: SourceSettings,
    pub nexus: SourceSettings,
    /// Personal API key, required for Nexus Mods lookups.
    pub nexus_api_key: Option<String>,
    pub nexus_game_domain: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            cache_dir: None,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            keep_backup: false,
            github: SourceSettings::default(),
            workshop: SourceSettings::default(),
            nexus: SourceSettings::default(),
            nexus_api_key: None,
            nexus_game_domain: NetworkConfig::NEXUS_DEFAULT_GAME.to_string(),
        }
    }
}

impl SyncSettings {
    /// Load settings from `path`, falling back to defaults if the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw =
            std::fs::read_to_string(path).map_err(|e| ModSyncError::io_with_path(e, path))?;
        serde_json::from_str(&raw).map_err(|e| ModSyncError::Config {
            message: format!("Failed to parse settings {}: {}", path.display(), e),
        })
    }

    /// Resolve the cache directory, defaulting to the platform data dir.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        dirs::data_local_dir()
            .map(|base| {
                base.join(CacheFileConfig::APP_DIR_NAME)
                    .join(CacheFileConfig::CACHE_DIR_NAME)
            })
            .ok_or_else(|| ModSyncError::Config {
                message: "Could not resolve a local data directory".to_string(),
            })
    }

    /// Settings for one backend.
    pub fn source(&self, source: ModSource) -> &SourceSettings {
        match source {
            ModSource::GitHub => &self.github,
            ModSource::SteamWorkshop => &self.workshop,
            ModSource::NexusMods => &self.nexus,
        }
    }

    /// Mutable settings for one backend.
    pub fn source_mut(&mut self, source: ModSource) -> &mut SourceSettings {
        match source {
            ModSource::GitHub => &mut self.github,
            ModSource::SteamWorkshop => &mut self.workshop,
            ModSource::NexusMods => &mut self.nexus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_settings_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = SyncSettings::load_or_default(&temp_dir.path().join("nope.json")).unwrap();
        assert!(settings.github.enabled);
        assert!(settings.workshop.enabled);
        assert!(settings.nexus.enabled);
        assert_eq!(settings.nexus_game_domain, "baldursgate3");
    }

    #[test]
    fn test_partial_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "cache_dir": "/var/cache/mods", "nexus": { "enabled": false } }"#,
        )
        .unwrap();

        let settings = SyncSettings::load_or_default(&path).unwrap();
        assert_eq!(
            settings.resolved_cache_dir().unwrap(),
            PathBuf::from("/var/cache/mods")
        );
        assert!(!settings.source(ModSource::NexusMods).enabled);
        assert!(settings.source(ModSource::GitHub).enabled);
        assert!(settings.nexus.serializer.pretty);
    }

    #[test]
    fn test_malformed_settings_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SyncSettings::load_or_default(&path).unwrap_err();
        assert!(matches!(err, ModSyncError::Config { .. }));
    }
}
