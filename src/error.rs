//! Error types for lookup and construction.

use thiserror::Error;

/// Returned by the checked accessors when a key was not part of the
/// construction set.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    #[error("key not found")]
    KeyNotFound,
}

/// Construction failure. Only reachable when a rehash cap is configured.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error(
        "bucket {bucket} ({keys} keys) still collides after {rehashes} rehashes"
    )]
    ConstructionNonTermination {
        bucket: usize,
        keys: usize,
        rehashes: u32,
    },
}
