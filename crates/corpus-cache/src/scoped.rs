//! Scoped lifecycle wrapper for disk-backed caches.

use crate::cacher::Cacher;
use crate::error::CacheResult;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Backends whose entire storage can be removed in one operation.
pub trait Clean {
    /// Removes all stored entries and the storage directory itself.
    ///
    /// Must be a no-op when the directory is already absent, so redundant
    /// invocations are harmless.
    fn clean(&self) -> CacheResult<()>;
}

/// Guard that cleans a cache's storage when it goes out of scope.
///
/// The wrapped backend is usable immediately through the guard (it derefs to
/// the backend and implements [`Cacher`] itself). On drop — normal exit or
/// panic unwind — `clean()` runs exactly once, deleting all entries including
/// ones written by earlier runs sharing the directory. Drop cannot propagate
/// errors, so a failed teardown is logged at warn level.
///
/// # Example
///
/// ```rust,no_run
/// use corpus_cache::{Cacher, DiskCache};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// {
///     let mut cache = DiskCache::new("./scratch")?.scoped();
///     cache.store(0, &vec![1_u8, 2])?;
///     // ... run the pipeline against the cache ...
/// } // directory removed
/// # Ok(())
/// # }
/// ```
pub struct Scoped<C: Clean> {
    inner: C,
}

impl<C: Clean> Scoped<C> {
    /// Wraps `inner`, arming cleanup for when the guard drops.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: Clean> Deref for Scoped<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: Clean> DerefMut for Scoped<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<T, C: Cacher<T> + Clean> Cacher<T> for Scoped<C> {
    fn contains(&self, index: u64) -> bool {
        self.inner.contains(index)
    }

    fn store(&mut self, index: u64, value: &T) -> CacheResult<()> {
        self.inner.store(index, value)
    }

    fn load(&self, index: u64) -> CacheResult<T> {
        self.inner.load(index)
    }
}

impl<C: Clean> Drop for Scoped<C> {
    fn drop(&mut self) {
        if let Err(e) = self.inner.clean() {
            warn!(error = %e, "failed to clean scoped cache storage");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::DiskCache;
    use tempfile::TempDir;

    #[test]
    fn test_directory_removed_when_guard_drops() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("cache");

        {
            let mut cache = DiskCache::new(&dir).unwrap().scoped();
            cache.store(0, &vec![1_i32]).unwrap();
            assert!(dir.is_dir());
        }

        assert!(!dir.exists());
    }

    #[test]
    fn test_guard_is_usable_as_the_cache() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = DiskCache::new(temp_dir.path().join("cache")).unwrap().scoped();

        assert!(!cache.contains(5));
        cache.store(5, &"sample".to_string()).unwrap();
        assert!(cache.contains(5));
        assert_eq!(cache.load(5).unwrap(), "sample");
        assert_eq!(cache.extension(), crate::disk::DEFAULT_EXTENSION);
    }

    #[test]
    fn test_manual_clean_before_drop_is_harmless() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("cache");

        {
            let mut cache = DiskCache::new(&dir).unwrap().scoped();
            cache.store(0, &1_u32).unwrap();
            cache.clean().unwrap();
        } // drop cleans again; directory already absent

        assert!(!dir.exists());
    }
}
