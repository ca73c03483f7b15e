//! Two-tier summary cache.
//!
//! Entries are keyed by `(method, path, hash of the endpoint's raw code)`, so a summary is
//! never served for code that changed since it was generated. Lookups check an in-process
//! map first and fall back to one JSON file per entry under the cache root; a disk hit is
//! promoted into the map. Expired entries are purged lazily when read.

use crate::endpoint::Endpoint;
use crate::error::CacheError;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

/// How long a summary stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A cached summary and the moment it was generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ResultCache {
    dir: PathBuf,
    ttl: Duration,
    memory: RwLock<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    /// Opens the per-user cache (`~/.api-digest/cache`) with the default expiration.
    pub fn open_default() -> Result<Self, CacheError> {
        let home = dirs::home_dir().ok_or(CacheError::HomeDirNotFound)?;
        Self::with_dir(home.join(".api-digest").join("cache"), DEFAULT_TTL)
    }

    /// Opens a cache rooted at `dir`, creating the directory if needed.
    pub fn with_dir(dir: PathBuf, ttl: Duration) -> Result<Self, CacheError> {
        ensure_directory(&dir)?;
        Ok(Self {
            dir,
            ttl,
            memory: RwLock::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the cached summary for the triple, if present and not expired.
    pub fn lookup(&self, method: &str, path: &str, code_hash: &str) -> Option<String> {
        let key = cache_key(method, path, code_hash);

        let in_memory = self
            .memory
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned();
        if let Some(entry) = in_memory {
            if !self.is_expired(&entry) {
                return Some(entry.summary);
            }
            self.memory
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&key);
        }

        let entry_path = self.entry_path(&key);
        let entry = self.read_entry(&entry_path)?;
        if self.is_expired(&entry) {
            debug!("Cache entry expired: {} {}", method, path);
            remove_entry_file(&entry_path);
            return None;
        }

        self.memory
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, entry.clone());
        Some(entry.summary)
    }

    /// Persists `summary` for the triple, then updates the in-process map.
    pub fn store(
        &self,
        method: &str,
        path: &str,
        code_hash: &str,
        summary: &str,
    ) -> Result<(), CacheError> {
        let key = cache_key(method, path, code_hash);
        let entry = CacheEntry {
            summary: summary.to_string(),
            timestamp: Utc::now(),
        };

        let entry_path = self.entry_path(&key);
        let data = serde_json::to_vec(&entry)?;
        fs::write(&entry_path, data).map_err(|source| CacheError::Io {
            path: entry_path.clone(),
            source,
        })?;

        self.memory
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, entry);
        Ok(())
    }

    /// Looks up the summary for an endpoint using its current raw code.
    pub fn lookup_endpoint(&self, endpoint: &Endpoint) -> Option<String> {
        self.lookup(
            &endpoint.method,
            &endpoint.path,
            &content_hash(&endpoint.raw_code),
        )
    }

    /// Stores the endpoint's summary under its current raw code.
    pub fn store_endpoint(&self, endpoint: &Endpoint) -> Result<(), CacheError> {
        self.store(
            &endpoint.method,
            &endpoint.path,
            &content_hash(&endpoint.raw_code),
            &endpoint.summary,
        )
    }

    /// Drops every entry, in memory and on disk, leaving an empty cache root behind.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.memory
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();

        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        }
        ensure_directory(&self.dir)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        // A timestamp in the future yields a negative age, which counts as fresh
        match (Utc::now() - entry.timestamp).to_std() {
            Ok(age) => age > self.ttl,
            Err(_) => false,
        }
    }

    fn read_entry(&self, entry_path: &Path) -> Option<CacheEntry> {
        let data = match fs::read(entry_path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Unreadable cache entry {}: {}", entry_path.display(), e);
                remove_entry_file(entry_path);
                return None;
            }
        };

        match serde_json::from_slice(&data) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Corrupt cache entry {}: {}", entry_path.display(), e);
                remove_entry_file(entry_path);
                None
            }
        }
    }
}

/// Hex SHA-256 of an endpoint's raw code snippet.
pub fn content_hash(raw_code: &str) -> String {
    format!("{:x}", Sha256::digest(raw_code.as_bytes()))
}

/// Storage key for the `(method, path, code_hash)` triple.
pub fn cache_key(method: &str, path: &str, code_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b":");
    hasher.update(path.as_bytes());
    hasher.update(b":");
    hasher.update(code_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn ensure_directory(dir: &Path) -> Result<(), CacheError> {
    fs::create_dir_all(dir).map_err(|source| CacheError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn remove_entry_file(entry_path: &Path) {
    if let Err(e) = fs::remove_file(entry_path) {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove cache entry {}: {}", entry_path.display(), e);
        }
    }
}
