//! Error types for the evictkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (currently: a zero capacity).
//! - [`InvariantError`]: Returned by `check_invariants` when the lookup table
//!   and the ordering structure of a cache disagree.
//!
//! Lookups never fail: a missing key is reported as `None`, and `set` always
//! makes room by evicting. These two types are the only error surface.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::error::ConfigError;
//! use evictkit::policy::lru::LruCache;
//!
//! let cache: Result<LruCache<String, i32>, ConfigError> = LruCache::try_new(100);
//! assert!(cache.is_ok());
//!
//! let bad = LruCache::<String, i32>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by the fallible constructors (`try_new`) on every policy and by
/// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
///
/// # Example
///
/// ```
/// use evictkit::policy::fifo::FifoCache;
///
/// let err = FifoCache::<u64, u64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }

    pub(crate) fn zero_capacity() -> Self {
        Self::new("cache capacity must be greater than zero")
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Validates a requested capacity.
pub(crate) fn check_capacity(capacity: usize) -> Result<usize, ConfigError> {
    if capacity == 0 {
        return Err(ConfigError::zero_capacity());
    }
    Ok(capacity)
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed, e.g. a
/// size mismatch between the lookup table and the ordering structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
