//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache of `code -> url` mappings consulted before the link store on redirects.
///
/// Implementations must be fail-open: a cache problem may cost a store lookup
/// but must never fail a redirect.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached destination for `code`, or `None` on a miss.
    async fn get_url(&self, code: &str) -> CacheResult<Option<String>>;

    /// Stores a mapping, using the implementation's default TTL when `ttl_seconds` is `None`.
    async fn set_url(&self, code: &str, url: &str, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Drops the mapping for `code`, if any.
    async fn invalidate(&self, code: &str) -> CacheResult<()>;
}
