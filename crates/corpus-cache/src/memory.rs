//! In-memory cache backend.

use crate::cacher::Cacher;
use crate::error::{CacheError, CacheResult};
use std::collections::HashMap;

/// HashMap-backed cache, empty at construction.
///
/// Entries live only as long as the owning process; there is no directory and
/// no clean operation. This is the backend a pipeline should fall back to when
/// no cache was configured explicitly (`MemoryCache::default()`), so lifecycle
/// and test isolation never depend on hidden shared state. Sharing one
/// instance across threads requires external synchronization.
pub struct MemoryCache<T> {
    entries: HashMap<u64, T>,
}

impl<T> MemoryCache<T> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Cacher<T> for MemoryCache<T> {
    fn contains(&self, index: u64) -> bool {
        self.entries.contains_key(&index)
    }

    fn store(&mut self, index: u64, value: &T) -> CacheResult<()> {
        self.entries.insert(index, value.clone());
        Ok(())
    }

    fn load(&self, index: u64) -> CacheResult<T> {
        self.entries
            .get(&index)
            .cloned()
            .ok_or(CacheError::NotFound(index))
    }
}
