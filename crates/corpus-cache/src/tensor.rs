//! Tensor-aware disk cache with a configurable codec.
//!
//! Same file-per-index layout as [`DiskCache`](crate::disk::DiskCache), but
//! entries go through a richer serialization path built for numeric tensor
//! values: a versioned wire format, a device-remap step applied while loading,
//! and an open-ended bag of options forwarded to the decoder. The default
//! entry extension differs from the generic backend's so both can share a
//! directory without colliding.

use crate::cacher::Cacher;
use crate::error::{CacheError, CacheResult};
use crate::scoped::{Clean, Scoped};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Default suffix for entries written by [`TensorCache`].
pub const TENSOR_EXTENSION: &str = ".tensor";

/// Fixed-width integer payload encoding, readable by every released build.
pub const FORMAT_VERSION_LEGACY: u32 = 1;

/// Variable-width integer payload encoding.
pub const FORMAT_VERSION_CURRENT: u32 = 2;

const MAGIC: [u8; 4] = *b"CTEN";
const HEADER_LEN: usize = 8;

/// Element type of a tensor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dtype {
    F32,
    F64,
    I32,
    I64,
    U8,
}

impl Dtype {
    /// Width of one element in bytes.
    pub fn size_in_bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::F32 | Self::I32 => 4,
            Self::F64 | Self::I64 => 8,
        }
    }
}

/// Values carrying a storage-location identifier (`cpu`, `cuda:0`, ...).
///
/// The stock codec uses this to apply [`MapLocation`] while decoding; custom
/// value types opt in by exposing and rewriting their placement.
pub trait DevicePlaced {
    /// The device the value's buffer currently belongs to.
    fn device(&self) -> &str;

    /// Rewrites the value's placement to `device`.
    fn relocate(&mut self, device: &str);
}

/// Dense tensor value: dtype, shape, device placement, and the raw buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorRecord {
    pub dtype: Dtype,
    pub shape: Vec<usize>,
    pub device: String,
    pub data: Vec<u8>,
}

impl TensorRecord {
    /// Builds a record, checking the buffer length against dtype and shape.
    pub fn new(
        dtype: Dtype,
        shape: Vec<usize>,
        device: impl Into<String>,
        data: Vec<u8>,
    ) -> CacheResult<Self> {
        let expected = shape.iter().product::<usize>() * dtype.size_in_bytes();
        if data.len() != expected {
            return Err(CacheError::InvalidTensor(format!(
                "buffer holds {} bytes, dtype/shape require {}",
                data.len(),
                expected
            )));
        }
        Ok(Self { dtype, shape, device: device.into(), data })
    }

    /// Builds an f32 record on `cpu` from a slice of values.
    pub fn from_f32(shape: Vec<usize>, values: &[f32]) -> CacheResult<Self> {
        let mut data = Vec::with_capacity(values.len() * 4);
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
        Self::new(Dtype::F32, shape, "cpu", data)
    }

    /// Copies the buffer out as f32 values.
    pub fn to_f32(&self) -> CacheResult<Vec<f32>> {
        if self.dtype != Dtype::F32 {
            return Err(CacheError::InvalidTensor(format!(
                "expected f32 data, found {:?}",
                self.dtype
            )));
        }
        Ok(self
            .data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Number of elements (product of the shape; 1 for a scalar).
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}

impl DevicePlaced for TensorRecord {
    fn device(&self) -> &str {
        &self.device
    }

    fn relocate(&mut self, device: &str) {
        self.device = device.to_string();
    }
}

/// How stored device placements are rewritten while loading.
#[derive(Clone, Default)]
pub enum MapLocation {
    /// Keep whatever placement the entry was stored with.
    #[default]
    Inherit,
    /// Move every loaded value to a single device.
    Device(String),
    /// Rewrite placements through a stored-device → target-device table;
    /// devices missing from the table are kept as stored.
    Table(HashMap<String, String>),
    /// Arbitrary remap of the stored device identifier.
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl MapLocation {
    /// Target device for a value stored on `stored`, or `None` to keep it.
    pub fn resolve(&self, stored: &str) -> Option<String> {
        match self {
            Self::Inherit => None,
            Self::Device(target) => Some(target.clone()),
            Self::Table(table) => table.get(stored).cloned(),
            Self::Custom(remap) => Some(remap(stored)),
        }
    }
}

impl fmt::Debug for MapLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inherit => write!(f, "Inherit"),
            Self::Device(d) => f.debug_tuple("Device").field(d).finish(),
            Self::Table(t) => f.debug_tuple("Table").field(t).finish(),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Construction-time configuration for [`TensorCache`].
#[derive(Debug, Clone)]
pub struct TensorCacheConfig {
    /// Suffix appended to each entry's index to form its file name.
    pub extension: String,
    /// Device remapping applied while loading.
    pub map_location: MapLocation,
    /// Wire-format version written into each entry's header.
    pub format_version: u32,
    /// Options forwarded verbatim to the codec's decode path. The stock codec
    /// honors `allow_trailing` (bool); everything else is left for custom
    /// codec implementations.
    pub decode_options: HashMap<String, serde_json::Value>,
}

impl Default for TensorCacheConfig {
    fn default() -> Self {
        Self {
            extension: TENSOR_EXTENSION.to_string(),
            map_location: MapLocation::Inherit,
            // Oldest supported version, so entries stay readable by earlier
            // builds that share the directory.
            format_version: FORMAT_VERSION_LEGACY,
            decode_options: HashMap::new(),
        }
    }
}

/// Decode-side state handed to a [`TensorCodec`].
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub map_location: &'a MapLocation,
    pub options: &'a HashMap<String, serde_json::Value>,
}

/// Serialization implementation used by [`TensorCache`].
///
/// Swappable at backend construction. `encode` receives the configured
/// wire-format version; `decode` receives the map-location and forwarded
/// options and is expected to honor the remap on values it can place.
pub trait TensorCodec<T> {
    fn encode(&self, value: &T, version: u32) -> CacheResult<Vec<u8>>;

    fn decode(&self, bytes: &[u8], ctx: &DecodeContext<'_>) -> CacheResult<T>;
}

/// Stock tensor codec: magic + version header, bincode payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryTensorCodec;

impl<T> TensorCodec<T> for BinaryTensorCodec
where
    T: Serialize + DeserializeOwned + DevicePlaced,
{
    fn encode(&self, value: &T, version: u32) -> CacheResult<Vec<u8>> {
        let payload = match version {
            FORMAT_VERSION_LEGACY => {
                bincode::serde::encode_to_vec(value, bincode::config::legacy())?
            }
            FORMAT_VERSION_CURRENT => {
                bincode::serde::encode_to_vec(value, bincode::config::standard())?
            }
            other => return Err(CacheError::UnsupportedVersion(other)),
        };
        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&version.to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    fn decode(&self, bytes: &[u8], ctx: &DecodeContext<'_>) -> CacheResult<T> {
        if bytes.len() < HEADER_LEN {
            return Err(CacheError::Malformed(format!(
                "entry is {} bytes, shorter than the {} byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }
        if bytes[..4] != MAGIC {
            return Err(CacheError::Malformed("unrecognized magic bytes".to_string()));
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let payload = &bytes[HEADER_LEN..];
        let (mut value, consumed): (T, usize) = match version {
            FORMAT_VERSION_LEGACY => {
                bincode::serde::decode_from_slice(payload, bincode::config::legacy())?
            }
            FORMAT_VERSION_CURRENT => {
                bincode::serde::decode_from_slice(payload, bincode::config::standard())?
            }
            other => return Err(CacheError::UnsupportedVersion(other)),
        };
        if consumed != payload.len() && !allow_trailing(ctx.options) {
            return Err(CacheError::Malformed(format!(
                "{} trailing bytes after payload",
                payload.len() - consumed
            )));
        }
        if let Some(target) = ctx.map_location.resolve(value.device()) {
            if target != value.device() {
                value.relocate(&target);
            }
        }
        Ok(value)
    }
}

fn allow_trailing(options: &HashMap<String, serde_json::Value>) -> bool {
    options
        .get("allow_trailing")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

/// File-per-index cache for tensor values.
///
/// Same directory lifecycle as [`DiskCache`](crate::disk::DiskCache):
/// created (with parents) at construction, persistent until [`clean`]
/// removes it, and wrappable in a [`Scoped`] guard for transient use. The
/// per-entry format and load behavior come from [`TensorCacheConfig`] and the
/// configured [`TensorCodec`].
///
/// [`clean`]: Self::clean
///
/// # Example
///
/// ```rust,no_run
/// use corpus_cache::{Cacher, MapLocation, TensorCache, TensorCacheConfig, TensorRecord};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TensorCacheConfig {
///     map_location: MapLocation::Device("cpu".to_string()),
///     ..TensorCacheConfig::default()
/// };
/// let mut cache: TensorCache<TensorRecord> = TensorCache::with_config("./cache", config)?;
///
/// let features = TensorRecord::from_f32(vec![2, 2], &[1.0, 2.0, 3.0, 4.0])?;
/// if !cache.contains(0) {
///     cache.store(0, &features)?;
/// }
/// let loaded = cache.load(0)?;
/// assert_eq!(loaded.device, "cpu"); // regardless of how it was stored
/// # Ok(())
/// # }
/// ```
pub struct TensorCache<T, C = BinaryTensorCodec> {
    dir: PathBuf,
    config: TensorCacheConfig,
    codec: C,
    _value: PhantomData<fn() -> T>,
}

impl<T> TensorCache<T, BinaryTensorCodec> {
    /// Creates a cache at `dir` with the default config and codec.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> CacheResult<Self> {
        Self::with_codec(dir, TensorCacheConfig::default(), BinaryTensorCodec)
    }

    /// Creates a cache with an explicit configuration.
    pub fn with_config(dir: impl AsRef<Path>, config: TensorCacheConfig) -> CacheResult<Self> {
        Self::with_codec(dir, config, BinaryTensorCodec)
    }
}

impl<T, C> TensorCache<T, C> {
    /// Creates a cache delegating the per-entry format to `codec`.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn with_codec(
        dir: impl AsRef<Path>,
        config: TensorCacheConfig,
        codec: C,
    ) -> CacheResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, config, codec, _value: PhantomData })
    }

    /// The directory entries are written to.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// The configuration this cache was constructed with.
    pub fn config(&self) -> &TensorCacheConfig {
        &self.config
    }

    /// Removes the storage directory and every entry in it.
    ///
    /// No-op if the directory does not currently exist.
    pub fn clean(&self) -> CacheResult<()> {
        if self.dir.is_dir() {
            fs::remove_dir_all(&self.dir)?;
            debug!(path = %self.dir.display(), "removed cache directory");
        }
        Ok(())
    }

    /// Wraps the cache in a guard that runs [`clean`](Self::clean) on drop.
    pub fn scoped(self) -> Scoped<Self> {
        Scoped::new(self)
    }

    fn entry_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}{}", index, self.config.extension))
    }
}

impl<T, C: TensorCodec<T>> Cacher<T> for TensorCache<T, C> {
    /// Checks whether the entry file exists on disk.
    fn contains(&self, index: u64) -> bool {
        self.entry_path(index).is_file()
    }

    fn store(&mut self, index: u64, value: &T) -> CacheResult<()> {
        let path = self.entry_path(index);
        let bytes = self.codec.encode(value, self.config.format_version)?;
        fs::write(&path, bytes)?;
        debug!(index, path = %path.display(), "stored tensor entry");
        Ok(())
    }

    fn load(&self, index: u64) -> CacheResult<T> {
        let bytes = fs::read(self.entry_path(index))?;
        let ctx = DecodeContext {
            map_location: &self.config.map_location,
            options: &self.config.decode_options,
        };
        self.codec.decode(&bytes, &ctx)
    }
}

impl<T, C> Clean for TensorCache<T, C> {
    fn clean(&self) -> CacheResult<()> {
        TensorCache::clean(self)
    }
}
