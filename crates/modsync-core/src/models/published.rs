//! Metadata returned by remote backends.

use serde::{Deserialize, Serialize};

/// Details of one Steam Workshop published file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedFileDetails {
    /// Backend-assigned publish id; the merge identity for workshop records.
    pub published_file_id: u64,
    pub time_created: i64,
    pub time_updated: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PublishedFileDetails {
    /// Tags with blanks removed and duplicates collapsed, in original order.
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }
}

/// Mod page information from Nexus Mods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NexusModInfo {
    pub mod_id: i64,
    pub name: String,
    pub version: String,
    pub summary: String,
    pub author: String,
    pub updated_timestamp: i64,
    pub picture_url: Option<String>,
}
