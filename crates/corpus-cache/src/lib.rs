//! Corpus Cache
//!
//! Per-sample cache backends for dataset pipelines:
//! - The cache contract (`Cacher`): contains / store / load, keyed by sample index
//! - An in-memory backend (`MemoryCache`) and file-per-index disk backends
//!   (`DiskCache`, `TensorCache`)
//! - Pluggable byte codecs (`Codec`, `TensorCodec`)
//! - Scoped create-on-use / clean-on-exit storage (`Scoped`)
//!
//! The pipeline owns the policy: for each index it asks `contains`, computes
//! and `store`s on a miss, and `load`s on a hit. Disk backends persist entries
//! across runs unless wrapped in a `Scoped` guard.
//!
//! # Example
//!
//! ```rust
//! use corpus_cache::{Cacher, MemoryCache};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut cache = MemoryCache::new();
//! for index in 0..4_u64 {
//!     if !cache.contains(index) {
//!         let sample = vec![index as f32; 8]; // stands in for real preprocessing
//!         cache.store(index, &sample)?;
//!     }
//!     let sample = cache.load(index)?;
//!     assert_eq!(sample.len(), 8);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cacher;
pub mod codec;
pub mod disk;
pub mod error;
pub mod memory;
pub mod scoped;
pub mod tensor;

pub use cacher::Cacher;
pub use codec::{BincodeCodec, Codec};
pub use disk::{DEFAULT_EXTENSION, DiskCache};
pub use error::{CacheError, CacheResult};
pub use memory::MemoryCache;
pub use scoped::{Clean, Scoped};
pub use tensor::{
    BinaryTensorCodec, DecodeContext, DevicePlaced, Dtype, FORMAT_VERSION_CURRENT,
    FORMAT_VERSION_LEGACY, MapLocation, TENSOR_EXTENSION, TensorCache, TensorCacheConfig,
    TensorCodec, TensorRecord,
};
