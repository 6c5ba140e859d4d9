//! Durable storage helpers for cache files.

mod atomic;

pub use atomic::{atomic_write, backup_path, read_if_exists};
