//! Refresh bookkeeping embedded in every keyed cache.

/// Refresh and persistence state of one backend cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMetadata {
    /// Epoch seconds of the last persist, or [`CacheMetadata::NEVER_UPDATED`].
    pub last_updated: i64,
    /// Application version that last wrote the cache file.
    pub last_version: String,
    /// Set by every mutation, cleared only by a successful persist. Never serialized.
    dirty: bool,
}

impl CacheMetadata {
    pub const NEVER_UPDATED: i64 = -1;

    /// Metadata as read back from a cache file (clean).
    pub fn loaded(last_updated: i64, last_version: impl Into<String>) -> Self {
        Self {
            last_updated,
            last_version: last_version.into(),
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn has_been_updated(&self) -> bool {
        self.last_updated != Self::NEVER_UPDATED
    }

    /// Record a successful persist.
    pub fn mark_persisted(&mut self, timestamp: i64, version: impl Into<String>) {
        self.last_updated = timestamp;
        self.last_version = version.into();
        self.dirty = false;
    }
}

impl Default for CacheMetadata {
    fn default() -> Self {
        Self::loaded(Self::NEVER_UPDATED, String::new())
    }
}
