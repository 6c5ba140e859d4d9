//! Reading and writing the mods list the CLI refreshes.

use anyhow::{Context, Result};
use modsync_core::{storage, ModDescriptor, ModSource};
use std::path::Path;

/// Load a JSON array of mod descriptors.
pub fn load_mods(path: &Path) -> Result<Vec<ModDescriptor>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mods file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse mods file {}", path.display()))
}

/// Rewrite the mods file with refreshed per-backend metadata.
pub fn write_mods(path: &Path, mods: &[ModDescriptor]) -> Result<()> {
    let json = serde_json::to_string_pretty(mods).context("Failed to serialize mods")?;
    storage::atomic_write(path, &json, false)?;
    Ok(())
}

/// One line per mod and backend reporting a newer release.
pub fn update_lines(mods: &[ModDescriptor]) -> Vec<String> {
    let mut lines = Vec::new();
    for descriptor in mods {
        for source in ModSource::ALL {
            if descriptor.has_update(source) {
                let latest = descriptor.latest_version(source).unwrap_or_default();
                lines.push(format!(
                    "{} {} -> {} ({})",
                    descriptor.name, descriptor.version, latest, source
                ));
            }
        }
    }
    lines
}
