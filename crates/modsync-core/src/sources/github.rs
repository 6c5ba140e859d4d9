//! GitHub releases backend.

use super::SourceBackend;
use crate::cache::{GitHubCache, GitHubCachedMod};
use crate::config::CacheFileConfig;
use crate::models::{GitHubLatestRelease, GitHubModData, ModSource, ModSources};
use std::fmt;

/// `author/repository` pair a GitHub-hosted mod is published under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitHubRepo {
    pub author: String,
    pub repository: String,
}

impl GitHubRepo {
    pub fn new(author: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            repository: repository.into(),
        }
    }
}

impl fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.author, self.repository)
    }
}

pub struct GitHubBackend;

impl SourceBackend for GitHubBackend {
    const SOURCE: ModSource = ModSource::GitHub;
    const FILE_NAME: &'static str = CacheFileConfig::GITHUB_FILE_NAME;

    type Cache = GitHubCache;
    type Slot = GitHubModData;
    type Identity = GitHubRepo;
    type Metadata = GitHubLatestRelease;

    fn slot(sources: &mut ModSources) -> Option<&mut GitHubModData> {
        sources.github.as_mut()
    }

    fn identity(slot: &GitHubModData) -> Option<GitHubRepo> {
        slot.is_enabled()
            .then(|| GitHubRepo::new(slot.author.trim(), slot.repository.trim()))
    }

    fn apply(
        uuid: &str,
        slot: &mut GitHubModData,
        release: GitHubLatestRelease,
        cache: &mut GitHubCache,
    ) {
        slot.latest_release = release;
        cache.upsert(
            uuid,
            GitHubCachedMod {
                uuid: uuid.to_string(),
                author: slot.author.trim().to_string(),
                repository: slot.repository.trim().to_string(),
                latest_release: slot.latest_release.clone(),
            },
        );
    }
}
