//! Steam Workshop cache.
//!
//! Workshop records are merged by their published file id rather than by map
//! key: a reinstalled mod can show up under a different local key while the
//! workshop still knows it as the same file. The cache also remembers mods
//! confirmed absent from the workshop so later cycles skip them.

use super::keyed::{CacheRecord, KeyedCache};
use super::metadata::CacheMetadata;
use super::source::{never_updated, SourceCache};
use crate::codec::{document, ordered, SerializerOptions};
use crate::models::PublishedFileDetails;
use crate::{ModSyncError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkshopCachedMod {
    #[serde(rename = "UUID", default)]
    pub uuid: String,
    #[serde(rename = "WorkshopID", default)]
    pub workshop_id: u64,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub last_updated: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CacheRecord for WorkshopCachedMod {
    fn key(&self) -> &str {
        &self.uuid
    }

    fn set_key(&mut self, key: &str) {
        self.uuid = key.to_string();
    }
}

/// Workshop records plus the non-participating mod list.
#[derive(Debug, Clone, Default)]
pub struct WorkshopCache {
    mods: KeyedCache<WorkshopCachedMod>,
    non_workshop_mods: Vec<String>,
}

impl WorkshopCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge fetched details for `mod_key`.
    ///
    /// An existing record with the same published file id is updated in place
    /// under its current key; otherwise a new record is inserted under
    /// `mod_key`. Either way `mod_key` leaves the non-participating list.
    pub fn add_or_update(&mut self, mod_key: &str, details: &PublishedFileDetails, tags: &[String]) {
        let publish_id = details.published_file_id;
        let updated = self.mods.modify_where(
            |record| record.workshop_id == publish_id,
            |record| {
                record.last_updated = details.time_updated;
                record.created = details.time_created;
                record.tags = tags.to_vec();
            },
        );

        if !updated {
            self.mods.upsert(
                mod_key,
                WorkshopCachedMod {
                    uuid: mod_key.to_string(),
                    workshop_id: publish_id,
                    created: details.time_created,
                    last_updated: details.time_updated,
                    tags: tags.to_vec(),
                },
            );
        }

        self.non_workshop_mods.retain(|key| key != mod_key);
        self.mods.mark_dirty();
    }

    /// Remember that `mod_key` has no workshop presence. Idempotent.
    pub fn add_non_participating(&mut self, mod_key: &str) {
        if !self.is_non_participating(mod_key) {
            self.non_workshop_mods.push(mod_key.to_string());
        }
        self.mods.mark_dirty();
    }

    pub fn is_non_participating(&self, mod_key: &str) -> bool {
        self.non_workshop_mods.iter().any(|key| key == mod_key)
    }

    pub fn non_workshop_mods(&self) -> &[String] {
        &self.non_workshop_mods
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WorkshopDocumentRef<'a> {
    last_updated: i64,
    last_version: &'a str,
    mods: &'a KeyedCache<WorkshopCachedMod>,
    #[serde(serialize_with = "ordered::serialize")]
    non_workshop_mods: &'a [String],
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WorkshopDocument {
    #[serde(default = "never_updated")]
    last_updated: i64,
    #[serde(default)]
    last_version: String,
    #[serde(default)]
    mods: KeyedCache<WorkshopCachedMod>,
    #[serde(default, deserialize_with = "ordered::deserialize")]
    non_workshop_mods: Vec<String>,
}

impl SourceCache for WorkshopCache {
    type Record = WorkshopCachedMod;

    fn mods(&self) -> &KeyedCache<WorkshopCachedMod> {
        &self.mods
    }

    fn metadata_mut(&mut self) -> &mut CacheMetadata {
        self.mods.metadata_mut()
    }

    fn to_document(&self, options: &SerializerOptions) -> Result<String> {
        let meta = self.mods.metadata();
        document::to_string(
            &WorkshopDocumentRef {
                last_updated: meta.last_updated,
                last_version: &meta.last_version,
                mods: &self.mods,
                non_workshop_mods: &self.non_workshop_mods,
            },
            options,
        )
    }

    fn from_document(raw: &str) -> Result<Self> {
        let parsed: Option<WorkshopDocument> = serde_json::from_str(raw)
            .map_err(|e| ModSyncError::decode("workshop cache document", e))?;
        let Some(doc) = parsed else {
            return Ok(Self::new());
        };

        let mut mods = doc.mods;
        *mods.metadata_mut() = CacheMetadata::loaded(doc.last_updated, doc.last_version);
        let mut non_workshop_mods: Vec<String> = Vec::with_capacity(doc.non_workshop_mods.len());
        for key in doc.non_workshop_mods {
            if mods.contains_key(&key) {
                warn!("Dropping {} from NonWorkshopMods: it has a workshop record", key);
            } else if !non_workshop_mods.contains(&key) {
                non_workshop_mods.push(key);
            }
        }
        Ok(Self {
            mods,
            non_workshop_mods,
        })
    }
}
