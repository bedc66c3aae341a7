//! Versioned cache store.
//!
//! This module provides the storage side of the engine:
//!
//! - [`Cache`] and [`CacheStorage`]: dyn-compatible store seams
//! - [`MemoryCacheStorage`] and [`DiskCacheStorage`]: provider implementations
//! - [`CacheVersion`]: the `<site>-cache-v<N>` generation identifier
//! - [`CacheManager`]: install and activate lifecycle over a registry
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use shellcache::cache::{CacheManager, CacheVersion, MemoryCacheStorage};
//!
//! let storage = Arc::new(MemoryCacheStorage::new());
//! let manager = CacheManager::new(storage, CacheVersion::new("guestbook", 1)?);
//!
//! let report = manager.install(&manifest, &client).await?;
//! manager.activate().await?;
//! ```

mod manager;
pub mod providers;
mod traits;
mod version;

pub use manager::{
    ActivateReport, CacheManager, GenerationState, GenerationStatus, InstallError, InstallReport,
};
pub use providers::{DiskCacheProvider, DiskCacheStorage, MemoryCacheProvider, MemoryCacheStorage};
pub use traits::{BoxFuture, Cache, CacheError, CacheStats, CacheStorage};
pub use version::CacheVersion;
