//! Cache provider implementations.
//!
//! Each provider pairs a [`Cache`](crate::cache::Cache) generation type with a
//! [`CacheStorage`](crate::cache::CacheStorage) registry.
//!
//! # Available Providers
//!
//! - [`MemoryCacheStorage`]: in-process generations backed by moka
//! - [`DiskCacheStorage`]: one directory per generation, survives restarts

mod disk;
mod memory;

pub use disk::{DiskCacheProvider, DiskCacheStorage};
pub use memory::{MemoryCacheProvider, MemoryCacheStorage};
