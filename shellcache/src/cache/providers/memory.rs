//! In-memory cache provider using moka.
//!
//! Each generation is a `moka::future::Cache` keyed by request URL. By
//! default a generation is unbounded, matching browser cache storage where
//! entries live until their generation is deleted. An optional byte capacity
//! turns on moka's weighted eviction for long-running hosts.

use std::sync::Arc;

use dashmap::DashMap;
use moka::future::Cache as MokaCache;

use crate::cache::traits::{validate_name, BoxFuture, Cache, CacheError, CacheStats, CacheStorage};
use crate::network::Response;

/// One in-memory cache generation.
pub struct MemoryCacheProvider {
    name: String,
    cache: MokaCache<String, Response>,
}

impl MemoryCacheProvider {
    /// Create a new memory cache provider.
    ///
    /// # Arguments
    ///
    /// * `name` - Generation name
    /// * `max_size_bytes` - Optional cap on total body bytes
    pub fn new(name: impl Into<String>, max_size_bytes: Option<u64>) -> Self {
        let mut builder = MokaCache::builder();

        if let Some(max_size_bytes) = max_size_bytes {
            builder = builder
                // Weight each entry by its body size
                .weigher(|_key: &String, value: &Response| -> u32 {
                    value.body.len().min(u32::MAX as usize) as u32
                })
                .max_capacity(max_size_bytes);
        }

        Self {
            name: name.into(),
            cache: builder.build(),
        }
    }
}

impl Cache for MemoryCacheProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, key: &str, response: Response) -> BoxFuture<'_, Result<(), CacheError>> {
        let key = key.to_string();
        Box::pin(async move {
            self.cache.insert(key, response).await;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Response>, CacheError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.cache.get(&key).await) })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, Result<bool, CacheError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.cache.remove(&key).await.is_some()) })
    }

    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, CacheError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.cache.contains_key(&key)) })
    }

    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, CacheError>> {
        Box::pin(async move {
            Ok(self
                .cache
                .iter()
                .map(|(key, _)| key.as_ref().clone())
                .collect())
        })
    }

    fn stats(&self) -> BoxFuture<'_, Result<CacheStats, CacheError>> {
        Box::pin(async move {
            // Iterate rather than read moka's counters, which lag behind
            // until pending maintenance has run
            let (entries, bytes) = self
                .cache
                .iter()
                .fold((0u64, 0u64), |(n, b), (_, v)| (n + 1, b + v.body.len() as u64));
            Ok(CacheStats { entries, bytes })
        })
    }
}

/// Registry of in-memory generations.
#[derive(Default)]
pub struct MemoryCacheStorage {
    generations: DashMap<String, Arc<MemoryCacheProvider>>,
    max_size_bytes: Option<u64>,
}

impl MemoryCacheStorage {
    /// Create an empty registry with unbounded generations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry whose generations are capped at
    /// `max_size_bytes` each.
    pub fn with_capacity(max_size_bytes: u64) -> Self {
        Self {
            generations: DashMap::new(),
            max_size_bytes: Some(max_size_bytes),
        }
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn open(&self, name: &str) -> BoxFuture<'_, Result<Arc<dyn Cache>, CacheError>> {
        let name = name.to_string();
        Box::pin(async move {
            validate_name(&name)?;
            let provider = self
                .generations
                .entry(name.clone())
                .or_insert_with(|| Arc::new(MemoryCacheProvider::new(name, self.max_size_bytes)))
                .clone();
            Ok(provider as Arc<dyn Cache>)
        })
    }

    fn lookup(&self, name: &str) -> BoxFuture<'_, Result<Option<Arc<dyn Cache>>, CacheError>> {
        let name = name.to_string();
        Box::pin(async move {
            Ok(self
                .generations
                .get(&name)
                .map(|entry| Arc::clone(entry.value()) as Arc<dyn Cache>))
        })
    }

    fn has(&self, name: &str) -> BoxFuture<'_, Result<bool, CacheError>> {
        let name = name.to_string();
        Box::pin(async move { Ok(self.generations.contains_key(&name)) })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, Result<bool, CacheError>> {
        let name = name.to_string();
        Box::pin(async move { Ok(self.generations.remove(&name).is_some()) })
    }

    fn names(&self) -> BoxFuture<'_, Result<Vec<String>, CacheError>> {
        Box::pin(async move {
            let mut names: Vec<String> = self
                .generations
                .iter()
                .map(|entry| entry.key().clone())
                .collect();
            names.sort();
            Ok(names)
        })
    }
}
