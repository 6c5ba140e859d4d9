//! Lenient version comparison for mod release strings.
//!
//! Mod authors publish anything from `v1.2` to `1.0.0.4`. Strings are
//! normalized into a semver triple (leading `v` dropped, missing components
//! zero-filled) and a fourth numeric component, when present, breaks ties.

use semver::Version;
use std::cmp::Ordering;

/// Parsed form of a mod version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModVersion {
    semver: Version,
    revision: u64,
}

impl ModVersion {
    /// Parse a version string, returning `None` if it has no numeric core.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_start_matches(['v', 'V']);
        if raw.is_empty() {
            return None;
        }

        let (core, suffix) = match raw.find(['-', '+']) {
            Some(idx) => raw.split_at(idx),
            None => (raw, ""),
        };

        let mut parts = core.split('.');
        let mut numbers = [0u64; 4];
        let mut count = 0;
        for part in parts.by_ref().take(4) {
            numbers[count] = part.parse().ok()?;
            count += 1;
        }
        if count == 0 || parts.next().is_some() {
            return None;
        }

        let normalized = format!("{}.{}.{}{}", numbers[0], numbers[1], numbers[2], suffix);
        let semver = Version::parse(&normalized).ok()?;
        Some(Self {
            semver,
            revision: numbers[3],
        })
    }
}

impl PartialOrd for ModVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semver
            .cmp(&other.semver)
            .then(self.revision.cmp(&other.revision))
    }
}

/// Whether `latest` is strictly newer than `current`.
///
/// Unparsable input on either side is never considered newer.
pub fn is_newer_version(latest: &str, current: &str) -> bool {
    match (ModVersion::parse(latest), ModVersion::parse(current)) {
        (Some(latest), Some(current)) => latest > current,
        _ => false,
    }
}
