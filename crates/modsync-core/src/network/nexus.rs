//! Nexus Mods API client.

use super::client::HttpClient;
use crate::cancel::CancellationToken;
use crate::config::NetworkConfig;
use crate::models::NexusModInfo;
use crate::sources::FetchLatest;
use crate::{ModSyncError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const SERVICE: &str = "Nexus Mods";

#[derive(Debug, Deserialize)]
struct ModPayload {
    mod_id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    updated_timestamp: i64,
    #[serde(default)]
    picture_url: Option<String>,
}

/// Parse a mod page response body.
pub fn parse_mod_info(raw: &str) -> Result<NexusModInfo> {
    let payload: ModPayload = serde_json::from_str(raw).map_err(|e| ModSyncError::Json {
        message: format!("Failed to parse Nexus mod page: {}", e),
        source: Some(e),
    })?;

    Ok(NexusModInfo {
        mod_id: payload.mod_id,
        name: payload.name.unwrap_or_default(),
        version: payload.version.unwrap_or_default(),
        summary: payload.summary.unwrap_or_default(),
        author: payload.author.unwrap_or_default(),
        updated_timestamp: payload.updated_timestamp,
        picture_url: payload.picture_url.filter(|url| !url.is_empty()),
    })
}

/// Fetches mod pages for one game domain.
pub struct NexusClient {
    http: Arc<HttpClient>,
    api_base: String,
    game_domain: String,
    api_key: Option<String>,
}

impl NexusClient {
    pub fn new(http: Arc<HttpClient>, game_domain: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            api_base: NetworkConfig::NEXUS_API_BASE.to_string(),
            game_domain: game_domain.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn mod_url(&self, mod_id: i64) -> String {
        format!(
            "{}/v1/games/{}/mods/{}.json",
            self.api_base,
            urlencoding::encode(&self.game_domain),
            mod_id
        )
    }
}

impl std::fmt::Debug for NexusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexusClient")
            .field("api_base", &self.api_base)
            .field("game_domain", &self.game_domain)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

#[async_trait]
impl FetchLatest for NexusClient {
    type Identity = i64;
    type Metadata = NexusModInfo;

    async fn fetch_latest(
        &self,
        mod_id: &i64,
        cancel: &CancellationToken,
    ) -> Result<Option<NexusModInfo>> {
        cancel.check()?;

        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ModSyncError::Config {
                message: "A Nexus Mods API key is required".to_string(),
            });
        };

        let request = self
            .http
            .inner()
            .get(self.mod_url(*mod_id))
            .header("apikey", api_key)
            .header("Accept", "application/json");

        let Some(response) = self.http.send(request, SERVICE).await? else {
            return Ok(None);
        };
        let raw = response.text().await?;
        parse_mod_info(&raw).map(Some)
    }
}
