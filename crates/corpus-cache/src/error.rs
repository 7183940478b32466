//! Error types for cache operations.

use thiserror::Error;

/// Result type alias for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur while storing or loading cached samples.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No entry is cached under the index.
    #[error("no cache entry for index {0}")]
    NotFound(u64),

    /// Entry bytes do not form a recognizable cache entry.
    #[error("malformed cache entry: {0}")]
    Malformed(String),

    /// Entry was written with a format version this build does not read.
    #[error("unsupported cache entry format version {0}")]
    UnsupportedVersion(u32),

    /// Tensor payload is inconsistent with its declared dtype/shape.
    #[error("invalid tensor data: {0}")]
    InvalidTensor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Value could not be serialized by the codec.
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// Entry bytes could not be deserialized by the codec.
    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// Escape hatch for external codec implementations.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
