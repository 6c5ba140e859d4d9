//! Atomic file operations for cache persistence.
//!
//! Writes go to a temp file with a PID+TID suffix, are synced, optionally
//! back up the previous file, then atomically replace the target.

use crate::config::CacheFileConfig;
use crate::{ModSyncError, Result};
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use tracing::{debug, warn};

/// Read a file to a string, returning `None` if it does not exist.
pub fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ModSyncError::Io {
            message: format!("Failed to read {}", path.display()),
            path: Some(path.to_path_buf()),
            source: Some(e),
        }),
    }
}

/// Path of the backup kept next to `path`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(CacheFileConfig::BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Write `contents` to `path` atomically.
///
/// 1. Creates the parent directory if needed
/// 2. Writes and syncs a temp file with a PID+TID suffix
/// 3. Optionally copies the current file to its backup path
/// 4. Renames the temp file over the target
pub fn atomic_write(path: &Path, contents: &str, keep_backup: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ModSyncError::Io {
                message: format!("Failed to create directory {}", parent.display()),
                path: Some(parent.to_path_buf()),
                source: Some(e),
            })?;
        }
    }

    let temp_path = temp_path_for(path);

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| ModSyncError::Io {
                message: format!("Failed to create temp file {}", temp_path.display()),
                path: Some(temp_path.clone()),
                source: Some(e),
            })?;

        let written = file
            .write_all(contents.as_bytes())
            .and_then(|_| file.flush())
            .and_then(|_| file.sync_all());
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(ModSyncError::Io {
                message: format!("Failed to write temp file {}", temp_path.display()),
                path: Some(temp_path.clone()),
                source: Some(e),
            });
        }
    }

    if keep_backup && path.exists() {
        let backup = backup_path(path);
        if let Err(e) = fs::copy(path, &backup) {
            warn!("Failed to create backup {}: {}", backup.display(), e);
        } else {
            debug!("Created backup: {}", backup.display());
        }
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ModSyncError::Io {
            message: format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            ),
            path: Some(path.to_path_buf()),
            source: Some(e),
        }
    })?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.{}.tmp", process::id(), thread_id()));
    path.with_file_name(name)
}

fn thread_id() -> u64 {
    let mut hasher = DefaultHasher::new();
    format!("{:?}", thread::current().id()).hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("githubdata.json");

        atomic_write(&path, "{\"a\":1}", false).unwrap();
        assert_eq!(read_if_exists(&path).unwrap().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_read_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_if_exists(&temp_dir.path().join("missing.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_backup_keeps_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("workshopdata.json");

        atomic_write(&path, "first", true).unwrap();
        atomic_write(&path, "second", true).unwrap();

        let backup = backup_path(&path);
        assert!(backup.ends_with("workshopdata.json.bak"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "first");
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_creates_parent_directories_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("cache.json");

        atomic_write(&path, "{}", false).unwrap();
        assert!(path.exists());

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
