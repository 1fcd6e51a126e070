use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config;

/// Lifetime of catalog lookups (track info, searches): about one month.
pub const CATALOG_TTL: Duration = Duration::from_secs(2_628_000);
/// Lifetime of user history pages: one day.
pub const USER_TTL: Duration = Duration::from_secs(86_400);

/// Namespace for catalog lookups shared between users.
pub const CATALOG_NAMESPACE: &str = "tracks";

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry is malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    key: String,
    stored_at: i64,
    ttl_secs: u64,
    payload: Value,
}

impl CacheEntry {
    fn is_expired(&self, now: i64) -> bool {
        let ttl = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
        now >= self.stored_at.saturating_add(ttl)
    }
}

/// A cache hit. Expired entries are still returned so the caller decides
/// whether to invalidate and refetch.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub payload: Value,
    pub is_expired: bool,
}

/// File-backed response cache.
///
/// Every entry lives in `<root>/<namespace>/<sha256(key)>.json`. Writes go
/// through a temporary file and a rename, so concurrent workers never
/// observe a half-written entry.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    root: PathBuf,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            root: config::data_dir().join("cache"),
        }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn get(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<CachedResponse>, CacheError> {
        let content = match async_fs::read_to_string(self.entry_path(namespace, key)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e)),
        };

        let entry: CacheEntry = serde_json::from_str(&content)?;
        if entry.key != key {
            return Ok(None);
        }

        let is_expired = entry.is_expired(Utc::now().timestamp());
        Ok(Some(CachedResponse {
            payload: entry.payload,
            is_expired,
        }))
    }

    pub async fn put(
        &self,
        namespace: &str,
        key: &str,
        payload: &Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let path = self.entry_path(namespace, key);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let entry = CacheEntry {
            key: key.to_string(),
            stored_at: Utc::now().timestamp(),
            ttl_secs: ttl.as_secs(),
            payload: payload.clone(),
        };
        let json = serde_json::to_string(&entry)?;

        let tmp = path.with_extension(format!(
            "tmp-{}-{}",
            std::process::id(),
            WRITE_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Removes one entry. Returns whether anything was removed.
    pub async fn invalidate(&self, namespace: &str, key: &str) -> Result<bool, CacheError> {
        match async_fs::remove_file(self.entry_path(namespace, key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    /// Removes every expired or unreadable entry and returns how many went.
    pub async fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Utc::now().timestamp();
        let mut removed = 0;

        for path in self.entry_files().await? {
            let stale = match async_fs::read_to_string(&path).await {
                Ok(content) => serde_json::from_str::<CacheEntry>(&content)
                    .map(|entry| entry.is_expired(now))
                    .unwrap_or(true),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(CacheError::Io(e)),
            };

            if stale {
                match async_fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(CacheError::Io(e)),
                }
            }
        }

        Ok(removed)
    }

    /// Removes the whole cache and returns how many entries it held.
    pub async fn clear(&self) -> Result<usize, CacheError> {
        let count = self.entry_files().await?.len();
        match async_fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(count),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    async fn entry_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let mut files = Vec::new();

        let mut namespaces = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(CacheError::Io(e)),
        };

        while let Some(namespace) = namespaces.next_entry().await? {
            if !namespace.file_type().await?.is_dir() {
                continue;
            }

            let mut entries = tokio::fs::read_dir(namespace.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }

    fn entry_path(&self, namespace: &str, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.root
            .join(sanitize_namespace(namespace))
            .join(format!("{digest:x}.json"))
    }
}

fn sanitize_namespace(namespace: &str) -> String {
    namespace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Namespace for one user's history pages.
pub fn user_namespace(username: &str) -> String {
    format!("user_{}", username.to_lowercase())
}
