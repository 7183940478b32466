//! The cache contract consumed by dataset pipelines.

use crate::error::CacheResult;

/// Storage backend for per-sample cached values.
///
/// A pipeline asks `contains` for each sample index; on a miss it computes the
/// value and hands it to `store`, on a hit it calls `load` instead of
/// recomputing. Implementations are sibling backends (memory, disk, ...)
/// selected at construction.
///
/// Calling `load` for an index that is not contained is a caller error; each
/// backend reports it through its own failure mode (not-found for the memory
/// backend, the underlying I/O error for disk backends) rather than defining
/// behavior across all backends.
pub trait Cacher<T> {
    /// Returns true if a value is cached under `index`.
    ///
    /// Pure query: no side effects, never fails. Equivalent to asking whether
    /// `load(index)` would currently succeed.
    fn contains(&self, index: u64) -> bool;

    /// Persists `value` under `index`, overwriting any previous entry.
    fn store(&mut self, index: u64, value: &T) -> CacheResult<()>;

    /// Retrieves the value previously stored under `index`.
    ///
    /// The returned value is behaviorally equivalent to what was stored;
    /// exact equivalence depends on codec fidelity.
    fn load(&self, index: u64) -> CacheResult<T>;
}
