//! Caller-side caching over an [`ArkArchive`].

use std::hash::BuildHasherDefault;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;
use rustc_hash::FxHasher;

use crate::{ArkArchive, ArkEntry, Error, Result};

type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Memoizes successful extractions by entry index.
///
/// Failed extractions are not cached, so a retry decodes the entry again.
pub struct CachedArchive {
    archive: ArkArchive,
    cache: Mutex<FxHashMap<usize, Arc<[u8]>>>,
}

impl CachedArchive {
    pub fn new(archive: ArkArchive) -> Self {
        Self {
            archive,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    /// The wrapped archive.
    #[inline]
    pub fn archive(&self) -> &ArkArchive {
        &self.archive
    }

    /// Read entry contents by name, from the cache when present.
    pub fn extract(&self, name: &str) -> Result<Arc<[u8]>> {
        let entry = self
            .archive
            .get(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        self.extract_entry(entry)
    }

    /// Read entry contents, from the cache when present.
    pub fn extract_entry(&self, entry: &ArkEntry) -> Result<Arc<[u8]>> {
        if let Some(data) = self.cache.lock().get(&entry.index()) {
            return Ok(Arc::clone(data));
        }

        // Decode without holding the lock; a racing caller may decode the
        // same entry, and the first insert wins.
        let data: Arc<[u8]> = self.archive.extract_entry(entry)?.into();
        let mut cache = self.cache.lock();
        Ok(Arc::clone(cache.entry(entry.index()).or_insert(data)))
    }

    /// Number of cached entries.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Drop every cached payload.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn into_inner(self) -> ArkArchive {
        self.archive
    }
}

impl std::fmt::Debug for CachedArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedArchive")
            .field("archive", &self.archive)
            .field("cached", &self.cached_len())
            .finish()
    }
}
