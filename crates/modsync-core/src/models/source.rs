//! Backend identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An external content/update source a mod can be tracked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModSource {
    GitHub,
    SteamWorkshop,
    NexusMods,
}

impl ModSource {
    /// Every known backend, in registry order.
    pub const ALL: [ModSource; 3] = [
        ModSource::GitHub,
        ModSource::SteamWorkshop,
        ModSource::NexusMods,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModSource::GitHub => "github",
            ModSource::SteamWorkshop => "workshop",
            ModSource::NexusMods => "nexus",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModSource::GitHub => "GitHub",
            ModSource::SteamWorkshop => "Steam Workshop",
            ModSource::NexusMods => "Nexus Mods",
        }
    }
}

impl fmt::Display for ModSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github" => Ok(ModSource::GitHub),
            "workshop" | "steam" | "steamworkshop" => Ok(ModSource::SteamWorkshop),
            "nexus" | "nexusmods" => Ok(ModSource::NexusMods),
            other => Err(format!("unknown mod source: {other}")),
        }
    }
}
