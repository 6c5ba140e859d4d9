//! Per-backend cache documents.
//!
//! Every backend file has the same skeleton:
//!
//! ```json
//! { "LastUpdated": 1700000000, "LastVersion": "0.3.0", "Mods": { "<uuid>": { ... } } }
//! ```
//!
//! Backends may add their own top-level fields next to `Mods`.

use super::keyed::{CacheRecord, KeyedCache};
use super::metadata::CacheMetadata;
use crate::codec::{document, SerializerOptions};
use crate::{ModSyncError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A backend's whole persisted cache.
pub trait SourceCache: Default + fmt::Debug + Send + Sync + 'static {
    type Record: CacheRecord;

    fn mods(&self) -> &KeyedCache<Self::Record>;

    /// Persistence bookkeeping. Records are mutated through each cache's own
    /// methods so backend-specific invariants hold.
    fn metadata_mut(&mut self) -> &mut CacheMetadata;

    /// Render the cache file contents.
    fn to_document(&self, options: &SerializerOptions) -> Result<String>;

    /// Parse cache file contents. The result is clean.
    fn from_document(raw: &str) -> Result<Self>;

    fn metadata(&self) -> &CacheMetadata {
        self.mods().metadata()
    }

    fn is_dirty(&self) -> bool {
        self.mods().is_dirty()
    }
}

pub(crate) fn never_updated() -> i64 {
    CacheMetadata::NEVER_UPDATED
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DocumentRef<'a, R> {
    last_updated: i64,
    last_version: &'a str,
    mods: &'a KeyedCache<R>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase", bound(deserialize = "R: CacheRecord"))]
struct Document<R> {
    #[serde(default = "never_updated")]
    last_updated: i64,
    #[serde(default)]
    last_version: String,
    #[serde(default)]
    mods: KeyedCache<R>,
}

/// Backends without extra top-level fields persist the keyed cache directly.
impl<R: CacheRecord> SourceCache for KeyedCache<R> {
    type Record = R;

    fn mods(&self) -> &KeyedCache<R> {
        self
    }

    fn metadata_mut(&mut self) -> &mut CacheMetadata {
        KeyedCache::metadata_mut(self)
    }

    fn to_document(&self, options: &SerializerOptions) -> Result<String> {
        let meta = self.metadata();
        document::to_string(
            &DocumentRef {
                last_updated: meta.last_updated,
                last_version: &meta.last_version,
                mods: self,
            },
            options,
        )
    }

    fn from_document(raw: &str) -> Result<Self> {
        let parsed: Option<Document<R>> =
            serde_json::from_str(raw).map_err(|e| ModSyncError::decode("cache document", e))?;
        Ok(match parsed {
            Some(doc) => {
                let mut mods = doc.mods;
                *mods.metadata_mut() = CacheMetadata::loaded(doc.last_updated, doc.last_version);
                mods
            }
            None => KeyedCache::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::GitHubCachedMod;
    use crate::models::GitHubLatestRelease;

    fn record(uuid: &str, version: &str) -> GitHubCachedMod {
        GitHubCachedMod {
            uuid: uuid.to_string(),
            author: "author".to_string(),
            repository: format!("{uuid}-repo"),
            latest_release: GitHubLatestRelease {
                version: version.to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_document_round_trip_restores_metadata() {
        let mut cache: KeyedCache<GitHubCachedMod> = KeyedCache::new();
        cache.upsert("m1", record("m1", "1.0"));
        cache.upsert("m2", record("m2", "2.0"));
        cache.metadata_mut().mark_persisted(1_700_000_000, "0.3.0");

        let raw = cache.to_document(&SerializerOptions::default()).unwrap();
        let loaded = KeyedCache::<GitHubCachedMod>::from_document(&raw).unwrap();

        assert_eq!(loaded, cache);
        assert_eq!(loaded.metadata().last_updated, 1_700_000_000);
        assert_eq!(loaded.metadata().last_version, "0.3.0");
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn test_document_field_order() {
        let mut cache: KeyedCache<GitHubCachedMod> = KeyedCache::new();
        cache.upsert("m1", record("m1", "1.0"));
        let options = SerializerOptions {
            pretty: false,
            omit_nulls: false,
        };

        let raw = cache.to_document(&options).unwrap();
        assert!(raw.starts_with(r#"{"LastUpdated":-1,"LastVersion":"","Mods":{"m1":{"UUID":"m1""#));
    }

    #[test]
    fn test_empty_and_null_documents() {
        let loaded = KeyedCache::<GitHubCachedMod>::from_document("{}").unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.metadata().last_updated, CacheMetadata::NEVER_UPDATED);

        let loaded = KeyedCache::<GitHubCachedMod>::from_document("null").unwrap();
        assert!(loaded.is_empty());

        let loaded =
            KeyedCache::<GitHubCachedMod>::from_document(r#"{ "LastUpdated": 5, "Mods": null }"#)
                .unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.metadata().last_updated, 5);
    }

    #[test]
    fn test_corrupt_document_is_decode_error() {
        let err = KeyedCache::<GitHubCachedMod>::from_document(r#"{ "Mods": [ }"#).unwrap_err();
        assert!(matches!(err, ModSyncError::Decode { .. }));
        assert!(KeyedCache::<GitHubCachedMod>::from_document(r#"{ "Mods": [] }"#).is_err());
    }
}
