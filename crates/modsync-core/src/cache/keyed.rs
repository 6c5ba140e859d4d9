//! Insertion-ordered keyed cache of backend records.
//!
//! Lookups go through a hash index; iteration follows insertion order so a
//! cache file written twice from the same state is byte-identical. The
//! container does no locking: a cache is owned by exactly one update handler.

use super::metadata::CacheMetadata;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A record stored in a [`KeyedCache`].
///
/// Records carry their own identity key. On decode the map key wins over
/// whatever identity the payload declares.
pub trait CacheRecord: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Identity key the record declares for itself.
    fn key(&self) -> &str;

    /// Overwrite the record's identity key.
    fn set_key(&mut self, key: &str);
}

/// Mapping from mod identity key to a backend record, plus refresh metadata.
#[derive(Debug, Clone)]
pub struct KeyedCache<R> {
    metadata: CacheMetadata,
    entries: Vec<(String, R)>,
    index: HashMap<String, usize>,
}

impl<R> Default for KeyedCache<R> {
    fn default() -> Self {
        Self {
            metadata: CacheMetadata::default(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R> KeyedCache<R> {
    /// Create an empty, clean cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a clean cache from decoded entries. A repeated key keeps its
    /// first position and takes the last value.
    pub(crate) fn from_entries(entries: Vec<(String, R)>) -> Self {
        let mut cache = Self::new();
        for (key, record) in entries {
            cache.insert_entry(key, record);
        }
        cache
    }

    pub fn metadata(&self) -> &CacheMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut CacheMetadata {
        &mut self.metadata
    }

    pub fn is_dirty(&self) -> bool {
        self.metadata.is_dirty()
    }

    pub fn mark_dirty(&mut self) {
        self.metadata.mark_dirty();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&R> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Insert or replace the record under `key`, returning the previous one.
    pub fn upsert(&mut self, key: impl Into<String>, record: R) -> Option<R> {
        let previous = self.insert_entry(key.into(), record);
        self.metadata.mark_dirty();
        previous
    }

    /// Remove the record under `key`. Only an actual removal dirties the cache.
    pub fn remove(&mut self, key: &str) -> Option<R> {
        let pos = self.index.remove(key)?;
        let (_, record) = self.entries.remove(pos);
        for (shifted_key, _) in &self.entries[pos..] {
            if let Some(slot) = self.index.get_mut(shifted_key) {
                *slot -= 1;
            }
        }
        self.metadata.mark_dirty();
        Some(record)
    }

    /// All records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &R)> {
        self.entries.iter().map(|(key, record)| (key.as_str(), record))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// First record (in insertion order) matching `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<(&str, &R)>
    where
        P: FnMut(&R) -> bool,
    {
        self.iter().find(|&(_, record)| predicate(record))
    }

    /// Apply `apply` to the first record matching `predicate`, leaving its key
    /// untouched. Returns whether a record matched; a match dirties the cache.
    pub fn modify_where<P, F>(&mut self, mut predicate: P, apply: F) -> bool
    where
        P: FnMut(&R) -> bool,
        F: FnOnce(&mut R),
    {
        match self.entries.iter_mut().find(|(_, record)| predicate(record)) {
            Some((_, record)) => {
                apply(record);
                self.metadata.mark_dirty();
                true
            }
            None => false,
        }
    }

    fn insert_entry(&mut self, key: String, record: R) -> Option<R> {
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, record)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, record));
                None
            }
        }
    }
}

impl<R: CacheRecord> KeyedCache<R> {
    /// Insert or replace a record under its own declared key.
    pub fn upsert_record(&mut self, record: R) -> Option<R> {
        let key = record.key().to_string();
        self.upsert(key, record)
    }
}

impl<R: PartialEq> PartialEq for KeyedCache<R> {
    /// Equal when both hold the same `(key, record)` pairs, regardless of order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, record)| other.get(key) == Some(record))
    }
}
