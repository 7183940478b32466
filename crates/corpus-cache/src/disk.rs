//! Disk-backed cache with one file per sample index.

use crate::cacher::Cacher;
use crate::codec::{BincodeCodec, Codec};
use crate::error::CacheResult;
use crate::scoped::{Clean, Scoped};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default suffix for entries written by [`DiskCache`].
pub const DEFAULT_EXTENSION: &str = ".bin";

/// File-per-index cache under a single directory.
///
/// Each entry is written to `<dir>/<index><extension>`. The directory
/// (including missing parents) is created at construction; entries persist
/// until [`DiskCache::clean`] removes the directory, so a cache pointed at the
/// same path in a later run picks up entries written by earlier runs. Cross-run
/// reuse only makes sense if the caller keeps the index-to-sample mapping
/// reproducible between runs (stable iteration order, fixed seed).
///
/// Entries are not sharded into subdirectories, so very large index counts can
/// hit per-directory entry limits on some filesystems.
///
/// # Example
///
/// ```rust,no_run
/// use corpus_cache::{Cacher, DiskCache};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut cache: DiskCache<Vec<f32>> = DiskCache::new("./cache")?;
/// if !cache.contains(0) {
///     cache.store(0, &vec![0.5, 1.5])?;
/// }
/// let sample = cache.load(0)?;
/// # Ok(())
/// # }
/// ```
pub struct DiskCache<T, C = BincodeCodec> {
    dir: PathBuf,
    extension: String,
    codec: C,
    _value: PhantomData<fn() -> T>,
}

impl<T> DiskCache<T, BincodeCodec> {
    /// Creates a cache at `dir` with the default codec and extension.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> CacheResult<Self> {
        Self::with_codec(dir, DEFAULT_EXTENSION, BincodeCodec)
    }

    /// Creates a cache writing entries with a custom file extension.
    pub fn with_extension(dir: impl AsRef<Path>, extension: &str) -> CacheResult<Self> {
        Self::with_codec(dir, extension, BincodeCodec)
    }
}

impl<T, C> DiskCache<T, C> {
    /// Creates a cache delegating (de)serialization to `codec`.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn with_codec(dir: impl AsRef<Path>, extension: &str, codec: C) -> CacheResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, extension: extension.to_string(), codec, _value: PhantomData })
    }

    /// The directory entries are written to.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// The suffix appended to each entry's index to form its file name.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Removes the storage directory and every entry in it.
    ///
    /// No-op if the directory does not currently exist, so calling it twice
    /// (or on a cache that never stored anything after an earlier clean) is
    /// harmless.
    pub fn clean(&self) -> CacheResult<()> {
        if self.dir.is_dir() {
            fs::remove_dir_all(&self.dir)?;
            debug!(path = %self.dir.display(), "removed cache directory");
        }
        Ok(())
    }

    /// Wraps the cache in a guard that runs [`clean`](Self::clean) on drop.
    ///
    /// Use plain construction for cross-run persistence and the scoped form
    /// for a transient cache tied to one unit of work.
    pub fn scoped(self) -> Scoped<Self> {
        Scoped::new(self)
    }

    fn entry_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}{}", index, self.extension))
    }
}

impl<T, C: Codec<T>> Cacher<T> for DiskCache<T, C> {
    /// Checks whether the entry file exists on disk.
    fn contains(&self, index: u64) -> bool {
        self.entry_path(index).is_file()
    }

    fn store(&mut self, index: u64, value: &T) -> CacheResult<()> {
        let path = self.entry_path(index);
        let bytes = self.codec.encode(value)?;
        fs::write(&path, bytes)?;
        debug!(index, path = %path.display(), "stored cache entry");
        Ok(())
    }

    fn load(&self, index: u64) -> CacheResult<T> {
        let bytes = fs::read(self.entry_path(index))?;
        self.codec.decode(&bytes)
    }
}

impl<T, C> Clean for DiskCache<T, C> {
    fn clean(&self) -> CacheResult<()> {
        DiskCache::clean(self)
    }
}
