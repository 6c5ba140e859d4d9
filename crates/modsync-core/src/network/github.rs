//! GitHub releases API client.

use super::client::HttpClient;
use crate::cancel::CancellationToken;
use crate::config::NetworkConfig;
use crate::models::GitHubLatestRelease;
use crate::sources::{FetchLatest, GitHubRepo};
use crate::{ModSyncError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const SERVICE: &str = "GitHub";

/// Subset of the `releases/latest` payload.
#[derive(Debug, Deserialize)]
struct ReleasePayload {
    #[serde(default)]
    tag_name: String,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    zipball_url: Option<String>,
    #[serde(default)]
    assets: Vec<AssetPayload>,
}

#[derive(Debug, Deserialize)]
struct AssetPayload {
    browser_download_url: String,
}

impl From<ReleasePayload> for GitHubLatestRelease {
    fn from(payload: ReleasePayload) -> Self {
        let tag = payload.tag_name.trim();
        let version = tag
            .strip_prefix('v')
            .or_else(|| tag.strip_prefix('V'))
            .unwrap_or(tag)
            .to_string();
        let browser_download_link = payload
            .assets
            .into_iter()
            .map(|asset| asset.browser_download_url)
            .find(|url| !url.is_empty())
            .or(payload.zipball_url)
            .unwrap_or_default();

        Self {
            version,
            release_date: payload.published_at.unwrap_or_default(),
            description: payload.body.unwrap_or_default(),
            browser_download_link,
        }
    }
}

/// Parse a `releases/latest` response body.
pub fn parse_latest_release(raw: &str) -> Result<GitHubLatestRelease> {
    let payload: ReleasePayload = serde_json::from_str(raw).map_err(|e| ModSyncError::Json {
        message: format!("Failed to parse GitHub release: {}", e),
        source: Some(e),
    })?;
    Ok(payload.into())
}

/// Fetches the latest release of a repository.
#[derive(Debug)]
pub struct GitHubClient {
    http: Arc<HttpClient>,
    api_base: String,
}

impl GitHubClient {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self::with_api_base(http, NetworkConfig::GITHUB_API_BASE)
    }

    pub fn with_api_base(http: Arc<HttpClient>, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn latest_release_url(&self, repo: &GitHubRepo) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base,
            urlencoding::encode(&repo.author),
            urlencoding::encode(&repo.repository)
        )
    }
}

#[async_trait]
impl FetchLatest for GitHubClient {
    type Identity = GitHubRepo;
    type Metadata = GitHubLatestRelease;

    async fn fetch_latest(
        &self,
        repo: &GitHubRepo,
        cancel: &CancellationToken,
    ) -> Result<Option<GitHubLatestRelease>> {
        cancel.check()?;

        let url = self.latest_release_url(repo);
        let request = self
            .http
            .inner()
            .get(&url)
            .header("Accept", "application/vnd.github+json");

        let Some(response) = self.http.send(request, SERVICE).await? else {
            debug!("No published release for {}", repo);
            return Ok(None);
        };
        let raw = response.text().await?;
        parse_latest_release(&raw).map(Some)
    }
}
