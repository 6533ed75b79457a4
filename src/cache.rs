//! Content cache lookups.
//!
//! Source files are pre-fetched by a separate process into a flat cache
//! directory, one plain-text file per source entry, named by the SHA-256
//! digest of the entry's `file_path` identifier. This module derives the
//! digest and loads the cached text.
//!
//! A missing or unreadable cache file is not a per-attempt problem: it means
//! the input table and the cache are out of sync, and the whole run aborts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors that can occur while resolving cached source text.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file could not be read.
    #[error("failed to read cached source {path}: {source}")]
    Read {
        /// Path of the cache file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Derive the cache key for a file identifier.
///
/// The key is the lowercase hex SHA-256 digest of the identifier bytes,
/// so the same `file_path` always maps to the same cache filename.
#[must_use]
pub fn cache_key(file_path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_path.as_bytes());
    hex::encode(hasher.finalize())
}

/// Path of the cache file holding the source text for `file_path`.
#[must_use]
pub fn cache_path(file_path: &str, cache_dir: &Path) -> PathBuf {
    cache_dir.join(format!("{}.txt", cache_key(file_path)))
}

/// Load the cached source text for a file identifier.
///
/// # Errors
///
/// Returns [`CacheError::Read`] if the cache file is missing or unreadable.
/// Callers treat this as fatal for the whole batch.
pub fn resolve(file_path: &str, cache_dir: &Path) -> Result<String, CacheError> {
    let path = cache_path(file_path, cache_dir);
    fs::read_to_string(&path).map_err(|source| CacheError::Read { path, source })
}
