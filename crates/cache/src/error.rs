use thiserror::Error;

/// Errors that can occur when talking to the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache backend could not be reached.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A key did not follow the `<namespace>:<segment>` grammar.
    #[error("Malformed cache key: {0}")]
    MalformedKey(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
