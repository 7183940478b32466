//! Byte codecs for disk-backed caches.

use crate::error::CacheResult;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Serialize/deserialize boundary between a disk backend and its entries.
///
/// Swappable at backend construction; implementations that fail with their
/// own error types can wrap them via `CacheError::Other`.
pub trait Codec<T> {
    /// Turns a value into storable bytes.
    fn encode(&self, value: &T) -> CacheResult<Vec<u8>>;

    /// Turns stored bytes back into a value.
    fn decode(&self, bytes: &[u8]) -> CacheResult<T>;
}

/// Stock binary codec for any serde-serializable value.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl<T> Codec<T> for BincodeCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> CacheResult<Vec<u8>> {
        Ok(bincode::serde::encode_to_vec(value, bincode::config::standard())?)
    }

    fn decode(&self, bytes: &[u8]) -> CacheResult<T> {
        let (value, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(value)
    }
}
