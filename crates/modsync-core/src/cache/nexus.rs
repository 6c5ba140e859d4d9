//! Nexus Mods cache records.

use super::keyed::{CacheRecord, KeyedCache};
use crate::models::NexusModInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NexusCachedMod {
    #[serde(rename = "UUID", default)]
    pub uuid: String,
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
    #[serde(default)]
    pub picture_url: Option<String>,
}

impl NexusCachedMod {
    pub fn from_info(uuid: &str, info: &NexusModInfo) -> Self {
        Self {
            uuid: uuid.to_string(),
            mod_id: info.mod_id,
            name: info.name.clone(),
            version: info.version.clone(),
            summary: info.summary.clone(),
            author: info.author.clone(),
            updated_timestamp: info.updated_timestamp,
            picture_url: info.picture_url.clone(),
        }
    }
}

impl CacheRecord for NexusCachedMod {
    fn key(&self) -> &str {
        &self.uuid
    }

    fn set_key(&mut self, key: &str) {
        self.uuid = key.to_string();
    }
}

pub type NexusCache = KeyedCache<NexusCachedMod>;
