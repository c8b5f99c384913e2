//! In-memory dimension cache.
//!
//! Shared by every translation on the same engine. Entries never expire and the
//! map is never evicted; a long-lived engine over an unbounded set of images
//! grows accordingly.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::probe::Dimensions;

/// Maps a resource locator to the key it is cached under
pub type CacheKeyFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The identity key function
pub fn identity_cache_key() -> CacheKeyFn {
    Arc::new(|locator: &str| locator.to_string())
}

/// Cache statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Probed image dimensions keyed by cache key
#[derive(Clone, Debug)]
pub struct DimensionCache {
    entries: Arc<RwLock<HashMap<String, Dimensions>>>,
    stats: Arc<RwLock<CacheStats>>,
    enabled: bool,
}

impl DimensionCache {
    pub fn new() -> Self {
        DimensionCache {
            entries: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(CacheStats::default())),
            enabled: true,
        }
    }

    /// A cache that never stores anything, so every lookup is probed
    pub fn disabled() -> Self {
        DimensionCache {
            enabled: false,
            ..DimensionCache::new()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get(&self, key: &str) -> Option<Dimensions> {
        if !self.enabled {
            return None;
        }

        let found = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied();

        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        stats.lookups += 1;
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }

        found
    }

    pub fn insert(&self, key: impl Into<String>, dimensions: Dimensions) {
        if !self.enabled {
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.into(), dimensions);

        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        stats.entries = entries.len();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.stats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries = 0;
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DimensionCache {
    fn default() -> Self {
        DimensionCache::new()
    }
}
