//! Steam Web API client for workshop file details.

use super::client::HttpClient;
use crate::cancel::CancellationToken;
use crate::config::NetworkConfig;
use crate::models::PublishedFileDetails;
use crate::sources::FetchLatest;
use crate::{ModSyncError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

const SERVICE: &str = "Steam";
/// `EResult::OK` in the Steam Web API.
const RESULT_OK: i32 = 1;

#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    response: DetailsResponse,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    publishedfiledetails: Vec<FileDetailsPayload>,
}

#[derive(Debug, Deserialize)]
struct FileDetailsPayload {
    #[serde(deserialize_with = "string_or_number")]
    publishedfileid: u64,
    result: i32,
    #[serde(default)]
    time_created: i64,
    #[serde(default)]
    time_updated: i64,
    #[serde(default)]
    tags: Vec<TagPayload>,
}

#[derive(Debug, Deserialize)]
struct TagPayload {
    tag: String,
}

/// The API reports ids as strings; accept plain numbers too.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(id) => Ok(id),
        Id::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Parse a `GetPublishedFileDetails` response for `publish_id`.
///
/// A non-OK per-file result, or no entry for the id, is `None`.
pub fn parse_file_details(raw: &str, publish_id: u64) -> Result<Option<PublishedFileDetails>> {
    let envelope: DetailsEnvelope = serde_json::from_str(raw).map_err(|e| ModSyncError::Json {
        message: format!("Failed to parse workshop details: {}", e),
        source: Some(e),
    })?;

    Ok(envelope
        .response
        .publishedfiledetails
        .into_iter()
        .find(|details| details.publishedfileid == publish_id)
        .filter(|details| details.result == RESULT_OK)
        .map(|details| PublishedFileDetails {
            published_file_id: details.publishedfileid,
            time_created: details.time_created,
            time_updated: details.time_updated,
            tags: details.tags.into_iter().map(|tag| tag.tag).collect(),
        }))
}

/// Looks up published workshop files.
#[derive(Debug)]
pub struct SteamWorkshopClient {
    http: Arc<HttpClient>,
    api_base: String,
}

impl SteamWorkshopClient {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self::with_api_base(http, NetworkConfig::STEAM_API_BASE)
    }

    pub fn with_api_base(http: Arc<HttpClient>, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl FetchLatest for SteamWorkshopClient {
    type Identity = u64;
    type Metadata = PublishedFileDetails;

    async fn fetch_latest(
        &self,
        publish_id: &u64,
        cancel: &CancellationToken,
    ) -> Result<Option<PublishedFileDetails>> {
        cancel.check()?;

        let url = format!(
            "{}/ISteamRemoteStorage/GetPublishedFileDetails/v1/",
            self.api_base
        );
        let id = publish_id.to_string();
        let request = self
            .http
            .inner()
            .post(&url)
            .form(&[("itemcount", "1"), ("publishedfileids[0]", id.as_str())]);

        let Some(response) = self.http.send(request, SERVICE).await? else {
            return Ok(None);
        };
        let raw = response.text().await?;
        parse_file_details(&raw, *publish_id)
    }
}
