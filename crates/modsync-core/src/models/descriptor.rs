//! Mod descriptors and their per-backend metadata slots.
//!
//! Each backend writes fetched results into its own slot on the descriptor;
//! slots are disjoint so several backends can update the same mod list
//! concurrently.

use super::source::ModSource;
use super::version::is_newer_version;
use serde::{Deserialize, Serialize};

/// A locally installed mod as seen by the sync engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModDescriptor {
    /// Stable identity key (the mod's UUID).
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    /// Locally installed version string.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub sources: ModSources,
}

/// Optional metadata pointer per backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModSources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubModData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workshop: Option<WorkshopModData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nexus: Option<NexusModData>,
}

/// Latest release published for a GitHub-hosted mod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GitHubLatestRelease {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub browser_download_link: String,
}

/// GitHub location of a mod plus the last fetched release.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubModData {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub latest_release: GitHubLatestRelease,
}

impl GitHubModData {
    pub fn new(author: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            repository: repository.into(),
            latest_release: GitHubLatestRelease::default(),
        }
    }

    /// Whether both halves of the `author/repository` pair are known.
    pub fn is_enabled(&self) -> bool {
        !self.author.trim().is_empty() && !self.repository.trim().is_empty()
    }
}

/// Steam Workshop state for a mod.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkshopModData {
    /// Published file id; `0` when unknown.
    #[serde(default)]
    pub workshop_id: u64,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub updated: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl WorkshopModData {
    pub fn new(workshop_id: u64) -> Self {
        Self {
            workshop_id,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.workshop_id != 0
    }
}

/// Nexus Mods state for a mod.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NexusModData {
    /// Nexus mod id; zero or negative when unknown.
    #[serde(default)]
    pub mod_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub updated_timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

impl NexusModData {
    pub fn new(mod_id: i64) -> Self {
        Self {
            mod_id,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mod_id > 0
    }
}

impl ModDescriptor {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_github(mut self, author: impl Into<String>, repository: impl Into<String>) -> Self {
        self.sources.github = Some(GitHubModData::new(author, repository));
        self
    }

    pub fn with_workshop(mut self, workshop_id: u64) -> Self {
        self.sources.workshop = Some(WorkshopModData::new(workshop_id));
        self
    }

    pub fn with_nexus(mut self, mod_id: i64) -> Self {
        self.sources.nexus = Some(NexusModData::new(mod_id));
        self
    }

    /// Latest version string a backend has reported for this mod, if any.
    ///
    /// The workshop does not publish version strings.
    pub fn latest_version(&self, source: ModSource) -> Option<&str> {
        let version = match source {
            ModSource::GitHub => self
                .sources
                .github
                .as_ref()
                .map(|data| data.latest_release.version.as_str()),
            ModSource::NexusMods => self.sources.nexus.as_ref().map(|data| data.version.as_str()),
            ModSource::SteamWorkshop => None,
        };
        version.filter(|v| !v.is_empty())
    }

    /// Whether `source` reports a release newer than the installed version.
    pub fn has_update(&self, source: ModSource) -> bool {
        self.latest_version(source)
            .map(|latest| is_newer_version(latest, &self.version))
            .unwrap_or(false)
    }
}
