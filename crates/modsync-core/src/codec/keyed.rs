//! Keyed-cache encoding: a JSON object with one property per record.
//!
//! Reading unwraps values that are JSON-encoded strings (hand-edited files
//! keep each entry on one line as a string) and also accepts plain objects.
//! Writing emits plain objects and never re-wraps. Existing cache files rely
//! on both shapes, so the asymmetry stays.

use crate::cache::{CacheRecord, KeyedCache};
use crate::{ModSyncError, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use tracing::warn;

impl<R: Serialize> Serialize for KeyedCache<R> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, record) in self.iter() {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

impl<'de, R: CacheRecord> Deserialize<'de> for KeyedCache<R> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(KeyedCacheVisitor(PhantomData))
    }
}

struct KeyedCacheVisitor<R>(PhantomData<R>);

impl<'de, R: CacheRecord> Visitor<'de> for KeyedCacheVisitor<R> {
    type Value = KeyedCache<R>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object of cache entries or null")
    }

    fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(KeyedCache::new())
    }

    fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(KeyedCache::new())
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }

    fn visit_map<V>(self, mut map: V) -> std::result::Result<Self::Value, V::Error>
    where
        V: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));

        while let Some(key) = map.next_key::<String>()? {
            let value: Value = map.next_value()?;
            match decode_entry::<R>(value) {
                Ok(mut record) => {
                    record.set_key(&key);
                    entries.push((key, record));
                }
                Err(e) => {
                    warn!("Skipping unreadable cache entry {}: {}", key, e);
                }
            }
        }

        Ok(KeyedCache::from_entries(entries))
    }
}

/// Decode one property value, unwrapping a double-encoded string first.
fn decode_entry<R: CacheRecord>(value: Value) -> serde_json::Result<R> {
    match value {
        Value::String(inner) => serde_json::from_str(&inner),
        other => serde_json::from_value(other),
    }
}

/// Decode a standalone keyed-cache document.
///
/// `null` yields an empty cache; anything other than an object or `null`
/// at the top level is a decode error.
pub fn decode<R: CacheRecord>(raw: &str) -> Result<KeyedCache<R>> {
    serde_json::from_str(raw).map_err(|e| ModSyncError::decode("keyed cache", e))
}

/// Encode a keyed cache as a plain JSON object in insertion order.
pub fn encode<R: CacheRecord>(cache: &KeyedCache<R>) -> Result<String> {
    Ok(serde_json::to_string(cache)?)
}
