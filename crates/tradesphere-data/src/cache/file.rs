//! Memoization of tables loaded from files.
//!
//! Entries are keyed by path and validated against the file's identity
//! (modification time and length). A lookup reloads the table only when the
//! file changed since it was cached.

use crate::error::{DataError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;
use tracing::debug;

/// Identity of a file on disk at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentity {
    /// Last modification time.
    pub modified: SystemTime,
    /// Length in bytes.
    pub len: u64,
}

impl FileIdentity {
    /// Read the current identity of `path`.
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified()?,
            len: meta.len(),
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups for paths that were not cached.
    pub misses: u64,
    /// Lookups that found a stale entry and reloaded it.
    pub reloads: u64,
    /// Entries currently held.
    pub entries: usize,
}

#[derive(Debug)]
struct Entry<T> {
    identity: FileIdentity,
    value: Arc<T>,
}

#[derive(Debug)]
struct Inner<T> {
    entries: HashMap<PathBuf, Entry<T>>,
    stats: CacheStats,
}

/// A cache of values loaded from files, invalidated on file change.
#[derive(Debug)]
pub struct TableCache<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Default for TableCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TableCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<T>>> {
        self.inner
            .lock()
            .map_err(|_| DataError::Cache("cache lock poisoned".to_string()))
    }

    /// Return the cached value for `path`, loading it with `load` when the
    /// path is not cached or the file changed since it was loaded.
    ///
    /// The lock is held while loading, so concurrent callers never load the
    /// same file twice.
    pub fn get_or_load<F>(&self, path: &Path, load: F) -> Result<Arc<T>>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let identity = FileIdentity::of(path)?;
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let reloading = match inner.entries.get(path) {
            Some(entry) if entry.identity == identity => {
                inner.stats.hits += 1;
                return Ok(Arc::clone(&entry.value));
            }
            Some(_) => true,
            None => false,
        };

        if reloading {
            debug!(path = %path.display(), "reloading stale table");
            inner.stats.reloads += 1;
        } else {
            debug!(path = %path.display(), "loading table");
            inner.stats.misses += 1;
        }

        let value = Arc::new(load(path)?);
        inner.entries.insert(
            path.to_path_buf(),
            Entry {
                identity,
                value: Arc::clone(&value),
            },
        );
        inner.stats.entries = inner.entries.len();

        Ok(value)
    }

    /// Whether `path` is cached and its entry is still fresh.
    pub fn is_fresh(&self, path: &Path) -> Result<bool> {
        let identity = FileIdentity::of(path)?;
        let inner = self.lock()?;
        Ok(inner
            .entries
            .get(path)
            .is_some_and(|entry| entry.identity == identity))
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&self, path: &Path) -> Result<bool> {
        let mut inner = self.lock()?;
        let removed = inner.entries.remove(path).is_some();
        inner.stats.entries = inner.entries.len();
        Ok(removed)
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&self) -> Result<()> {
        let mut inner = self.lock()?;
        inner.entries.clear();
        inner.stats.entries = 0;
        Ok(())
    }

    /// Snapshot of the cache statistics.
    pub fn stats(&self) -> Result<CacheStats> {
        Ok(self.lock()?.stats)
    }
}
