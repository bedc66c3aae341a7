//! Core traits for cache generations and the generation registry.
//!
//! A [`Cache`] is one named generation: a key-value store from request URL to
//! [`Response`]. A [`CacheStorage`] is the registry of all generations, in the
//! shape browsers expose as `caches`: open by name (creating if absent), look
//! up, enumerate and delete whole generations.
//!
//! Both traits return `Pin<Box<dyn Future>>` so they can be used as trait
//! objects (`Arc<dyn Cache>`, `Arc<dyn CacheStorage>`).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use crate::network::Response;

/// Entry count and byte size of one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of stored entries.
    pub entries: u64,
    /// Total stored body bytes (disk providers report file sizes).
    pub bytes: u64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} entries, {} bytes", self.entries, self.bytes)
    }
}

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error during cache operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored entry could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Generation name is not usable as a store name.
    #[error("Invalid cache name: {0:?}")]
    InvalidName(String),

    /// Version string does not follow `<site>-cache-v<N>`.
    #[error("Invalid cache version {value:?}: {reason}")]
    InvalidVersion { value: String, reason: String },

    /// The current generation has not been installed.
    #[error("Cache generation {0} is not installed")]
    NotInstalled(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One cache generation.
///
/// Keys are request URLs compared byte for byte; no normalization is applied.
/// Implementations must make each `put` atomic per key.
pub trait Cache: Send + Sync {
    /// The generation name this cache was opened under.
    fn name(&self) -> &str;

    /// Store a response under `key`, replacing any previous entry.
    fn put(&self, key: &str, response: Response) -> BoxFuture<'_, Result<(), CacheError>>;

    /// Retrieve the response stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(response))` if the key exists
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if an error occurs
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Response>, CacheError>>;

    /// Delete the entry under `key`, returning whether it existed.
    fn delete(&self, key: &str) -> BoxFuture<'_, Result<bool, CacheError>>;

    /// Check if a key exists without retrieving the response.
    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, CacheError>>;

    /// All keys in this generation, in no particular order.
    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, CacheError>>;

    /// Entry count and byte size.
    fn stats(&self) -> BoxFuture<'_, Result<CacheStats, CacheError>>;
}

/// Registry of named cache generations.
pub trait CacheStorage: Send + Sync {
    /// Open the generation called `name`, creating it if absent.
    fn open(&self, name: &str) -> BoxFuture<'_, Result<Arc<dyn Cache>, CacheError>>;

    /// Open the generation called `name` only if it already exists.
    fn lookup(&self, name: &str) -> BoxFuture<'_, Result<Option<Arc<dyn Cache>>, CacheError>>;

    /// Check whether a generation exists.
    fn has(&self, name: &str) -> BoxFuture<'_, Result<bool, CacheError>>;

    /// Delete a whole generation, returning whether it existed.
    fn delete(&self, name: &str) -> BoxFuture<'_, Result<bool, CacheError>>;

    /// Names of all existing generations, sorted.
    fn names(&self) -> BoxFuture<'_, Result<Vec<String>, CacheError>>;
}

/// Rejects generation names that cannot be used as a directory name.
pub(crate) fn validate_name(name: &str) -> Result<(), CacheError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_display() {
        let stats = CacheStats {
            entries: 10,
            bytes: 1024,
        };
        let display = stats.to_string();
        assert!(display.contains("10 entries"));
        assert!(display.contains("1024 bytes"));
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::NotInstalled("guestbook-cache-v3".to_string());
        assert_eq!(
            err.to_string(),
            "Cache generation guestbook-cache-v3 is not installed"
        );
    }

    #[test]
    fn test_cache_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cache_err: CacheError = io_err.into();
        assert!(matches!(cache_err, CacheError::Io(_)));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("guestbook-cache-v3").is_ok());
        assert!(validate_name("site_1.cache-v2").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a b").is_err());
    }
}
