//! GitHub release cache records.

use super::keyed::{CacheRecord, KeyedCache};
use crate::models::GitHubLatestRelease;
use serde::{Deserialize, Serialize};

/// Last known release of a GitHub-hosted mod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GitHubCachedMod {
    #[serde(rename = "UUID", default)]
    pub uuid: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub latest_release: GitHubLatestRelease,
}

impl CacheRecord for GitHubCachedMod {
    fn key(&self) -> &str {
        &self.uuid
    }

    fn set_key(&mut self, key: &str) {
        self.uuid = key.to_string();
    }
}

pub type GitHubCache = KeyedCache<GitHubCachedMod>;
