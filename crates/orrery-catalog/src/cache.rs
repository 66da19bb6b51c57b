//! Byte caches for catalog responses.
//!
//! The catalog client keeps raw response bodies keyed by request URL so the
//! catalog stays browsable offline after the first successful fetch.
//!
//! # Implementations
//!
//! - [`MemoryCache`]: In-memory cache with optional size limit
//! - [`FilesystemCache`]: One file per entry under a directory
//! - [`NoCache`]: Passthrough implementation that caches nothing

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
};

/// Future type for cache get operations.
pub type GetFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>>> + Send + 'a>>;

/// Future type for cache put/remove/clear operations.
pub type CacheFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A keyed store of raw bytes.
pub trait Cache: Send + Sync {
    /// Look up an entry. `Ok(None)` means a miss.
    fn get(&self, key: &str) -> GetFuture<'_>;

    /// Store an entry, replacing any previous value.
    fn put(&self, key: &str, data: Vec<u8>) -> CacheFuture<'_>;

    /// Drop an entry if present.
    fn remove(&self, key: &str) -> CacheFuture<'_>;

    /// Drop every entry.
    fn clear(&self) -> CacheFuture<'_>;
}

/// A cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl Cache for NoCache {
    fn get(&self, _key: &str) -> GetFuture<'_> {
        Box::pin(async { Ok(None) })
    }

    fn put(&self, _key: &str, _data: Vec<u8>) -> CacheFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    fn remove(&self, _key: &str) -> CacheFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    fn clear(&self) -> CacheFuture<'_> {
        Box::pin(async { Ok(()) })
    }
}

/// An in-memory cache shared between clones.
///
/// With a byte limit, the oldest entries are evicted first.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<Mutex<MemoryCacheInner>>,
    max_bytes: Option<usize>,
}

#[derive(Debug, Default)]
struct MemoryCacheInner {
    entries: HashMap<String, Vec<u8>>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
    bytes: usize,
}

impl MemoryCacheInner {
    fn remove(&mut self, key: &str) {
        if let Some(old) = self.entries.remove(key) {
            self.bytes -= old.len();
            self.order.retain(|k| k != key);
        }
    }
}

impl MemoryCache {
    /// Create an unbounded memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory cache holding at most `max_bytes` of payload.
    #[must_use]
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            inner: Arc::default(),
            max_bytes: Some(max_bytes),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryCacheInner> {
        // The inner state stays consistent across a panic in another holder.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total payload bytes held.
    #[must_use]
    pub fn bytes(&self) -> usize {
        self.lock().bytes
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> GetFuture<'_> {
        let hit = self.lock().entries.get(key).cloned();
        Box::pin(async move { Ok(hit) })
    }

    fn put(&self, key: &str, data: Vec<u8>) -> CacheFuture<'_> {
        let mut inner = self.lock();
        inner.remove(key);

        if let Some(max_bytes) = self.max_bytes {
            while inner.bytes + data.len() > max_bytes {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                if let Some(old) = inner.entries.remove(&oldest) {
                    inner.bytes -= old.len();
                    tracing::debug!(key = oldest, "evicted from memory cache");
                }
            }
        }

        inner.bytes += data.len();
        inner.order.push_back(key.to_string());
        inner.entries.insert(key.to_string(), data);

        Box::pin(async { Ok(()) })
    }

    fn remove(&self, key: &str) -> CacheFuture<'_> {
        self.lock().remove(key);
        Box::pin(async { Ok(()) })
    }

    fn clear(&self) -> CacheFuture<'_> {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
        inner.bytes = 0;
        Box::pin(async { Ok(()) })
    }
}

/// A cache that keeps one file per entry in a directory.
///
/// File names are derived from a hash of the key, so any key is safe.
#[derive(Debug, Clone)]
pub struct FilesystemCache {
    dir: PathBuf,
}

impl FilesystemCache {
    /// Create a cache rooted at `dir`. The directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory entries are stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{}.bin", hex_prefix(&digest, 16)))
    }
}

impl Cache for FilesystemCache {
    fn get(&self, key: &str) -> GetFuture<'_> {
        let path = self.entry_path(key);
        Box::pin(async move {
            match tokio::fs::read(&path).await {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(Error::Cache {
                    operation: "get",
                    message: format!("{}: {e}", path.display()),
                }),
            }
        })
    }

    fn put(&self, key: &str, data: Vec<u8>) -> CacheFuture<'_> {
        let path = self.entry_path(key);
        Box::pin(async move {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(|e| Error::Cache {
                    operation: "put",
                    message: format!("{}: {e}", self.dir.display()),
                })?;
            tokio::fs::write(&path, data)
                .await
                .map_err(|e| Error::Cache {
                    operation: "put",
                    message: format!("{}: {e}", path.display()),
                })
        })
    }

    fn remove(&self, key: &str) -> CacheFuture<'_> {
        let path = self.entry_path(key);
        Box::pin(async move {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(Error::Cache {
                    operation: "remove",
                    message: format!("{}: {e}", path.display()),
                }),
            }
        })
    }

    fn clear(&self) -> CacheFuture<'_> {
        Box::pin(async move {
            match tokio::fs::remove_dir_all(&self.dir).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(Error::Cache {
                    operation: "clear",
                    message: format!("{}: {e}", self.dir.display()),
                }),
            }
        })
    }
}

/// Lowercase hex of the first `bytes` bytes of a digest.
pub(crate) fn hex_prefix(digest: &[u8], bytes: usize) -> String {
    use std::fmt::Write;

    digest
        .iter()
        .take(bytes)
        .fold(String::with_capacity(bytes * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}
