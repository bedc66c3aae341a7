//! Versioned cache generation manager.
//!
//! [`CacheManager`] owns the generation registry and the current
//! [`CacheVersion`]. It drives the install and activate lifecycle steps and
//! exposes primitive get/put on the current generation for the fetch router.
//!
//! # State Machine
//!
//! ```text
//! Uninitialized ──install()──► Installing ──ok──► Installed ──activate()──► Active
//!        ▲                         │
//!        └────────── failure ──────┘
//! ```
//!
//! Every generation other than the current one is `Stale` and is deleted by
//! the next activation.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::{join_all, try_join_all};
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::traits::{Cache, CacheError, CacheStats, CacheStorage};
use super::version::CacheVersion;
use crate::manifest::PrecacheManifest;
use crate::network::{AsyncHttpClient, NetworkError, Response};

/// Lifecycle state of a cache generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationState {
    /// Nothing installed for this version yet.
    Uninitialized,
    /// Install is fetching and storing the manifest.
    Installing,
    /// Installed, waiting for activation.
    Installed,
    /// Serving requests; older generations have been removed.
    Active,
    /// Superseded by a newer generation, pending deletion.
    Stale,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GenerationState::Uninitialized => "uninitialized",
            GenerationState::Installing => "installing",
            GenerationState::Installed => "installed",
            GenerationState::Active => "active",
            GenerationState::Stale => "stale",
        };
        f.write_str(label)
    }
}

/// Errors that abort an install.
#[derive(Debug, Error)]
pub enum InstallError {
    /// A site-shell asset could not be fetched or stored.
    #[error("Failed to cache static asset {url}: {reason}")]
    StaticAsset { url: String, reason: String },

    /// The generation registry failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Result of a successful install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub version: CacheVersion,
    pub static_cached: usize,
    pub tiles_cached: usize,
    pub tiles_failed: usize,
    pub duration: Duration,
    pub installed_at: DateTime<Utc>,
}

impl InstallReport {
    /// Total entries written to the generation.
    pub fn cached(&self) -> usize {
        self.static_cached + self.tiles_cached
    }
}

/// Result of an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    /// The generation that remains.
    pub kept: String,
    /// Generations that were deleted.
    pub deleted: Vec<String>,
}

/// Snapshot of one generation for status reporting.
#[derive(Debug, Clone)]
pub struct GenerationStatus {
    pub name: String,
    pub current: bool,
    pub state: GenerationState,
    pub stats: CacheStats,
}

/// Manager for versioned cache generations.
pub struct CacheManager {
    storage: Arc<dyn CacheStorage>,
    version: CacheVersion,
    state: RwLock<GenerationState>,
    tile_timeout: Option<Duration>,
}

impl CacheManager {
    /// Creates a manager for `version` over `storage`.
    pub fn new(storage: Arc<dyn CacheStorage>, version: CacheVersion) -> Self {
        Self {
            storage,
            version,
            state: RwLock::new(GenerationState::Uninitialized),
            tile_timeout: None,
        }
    }

    /// Bounds each tile fetch during install. `None` waits indefinitely.
    pub fn with_tile_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tile_timeout = timeout;
        self
    }

    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// In-process lifecycle state of the current generation.
    pub fn state(&self) -> GenerationState {
        *self.state.read()
    }

    fn set_state(&self, state: GenerationState) {
        let mut guard = self.state.write();
        if *guard != state {
            debug!(version = %self.version, from = %*guard, to = %state, "Generation state change");
            *guard = state;
        }
    }

    /// Populates the current generation from `manifest`.
    ///
    /// All static assets are fetched concurrently and must each answer with
    /// HTTP 200 before any of them is stored; one failure aborts the install
    /// and leaves no partial shell behind. Tile endpoints are then fetched
    /// concurrently and every failure is counted and skipped.
    pub async fn install<C: AsyncHttpClient>(
        &self,
        manifest: &PrecacheManifest,
        client: &C,
    ) -> Result<InstallReport, InstallError> {
        let start = Instant::now();
        let name = self.version.name();
        self.set_state(GenerationState::Installing);

        info!(
            version = %name,
            static_assets = manifest.static_count(),
            tiles = manifest.tile_count(),
            "Installing cache generation"
        );

        let result = self.install_inner(&name, manifest, client).await;

        match result {
            Ok((static_cached, tiles_cached, tiles_failed)) => {
                self.set_state(GenerationState::Installed);
                let report = InstallReport {
                    version: self.version.clone(),
                    static_cached,
                    tiles_cached,
                    tiles_failed,
                    duration: start.elapsed(),
                    installed_at: Utc::now(),
                };
                info!(
                    version = %name,
                    static_cached,
                    tiles_cached,
                    tiles_failed,
                    duration_ms = report.duration.as_millis() as u64,
                    "Cache generation installed"
                );
                Ok(report)
            }
            Err(e) => {
                self.set_state(GenerationState::Uninitialized);
                warn!(version = %name, error = %e, "Install failed");
                Err(e)
            }
        }
    }

    async fn install_inner<C: AsyncHttpClient>(
        &self,
        name: &str,
        manifest: &PrecacheManifest,
        client: &C,
    ) -> Result<(usize, usize, usize), InstallError> {
        let existed = self.storage.has(name).await?;
        let cache = self.storage.open(name).await?;

        let static_responses = try_join_all(manifest.static_assets().map(|url| async move {
            let response = client
                .fetch(url)
                .await
                .map_err(|e| InstallError::StaticAsset {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
            if !response.is_ok() {
                return Err(InstallError::StaticAsset {
                    url: url.to_string(),
                    reason: format!("HTTP {}", response.status),
                });
            }
            Ok((url, response))
        }))
        .await;

        let static_responses = match static_responses {
            Ok(responses) => responses,
            Err(e) => {
                self.discard(name, existed, &*cache, &[]).await;
                return Err(e);
            }
        };

        let mut written: Vec<&str> = Vec::with_capacity(static_responses.len());
        for (url, response) in static_responses {
            if let Err(e) = cache.put(url, response).await {
                self.discard(name, existed, &*cache, &written).await;
                return Err(InstallError::StaticAsset {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            written.push(url);
        }

        let outcomes = join_all(
            manifest
                .tile_endpoints()
                .map(|endpoint| self.cache_tile(&*cache, client, &endpoint.url)),
        )
        .await;

        let tiles_cached = outcomes.iter().filter(|cached| **cached).count();
        let tiles_failed = outcomes.len() - tiles_cached;

        Ok((written.len(), tiles_cached, tiles_failed))
    }

    /// Fetches and stores one tile, returning whether it was cached.
    async fn cache_tile<C: AsyncHttpClient>(&self, cache: &dyn Cache, client: &C, url: &str) -> bool {
        let fetched = match self.tile_timeout {
            Some(timeout) => tokio::time::timeout(timeout, client.fetch(url))
                .await
                .unwrap_or(Err(NetworkError::Timeout(timeout))),
            None => client.fetch(url).await,
        };

        let response = match fetched {
            Ok(response) if response.is_ok() => response,
            Ok(response) => {
                debug!(url, status = response.status, "Tile not cached");
                return false;
            }
            Err(e) => {
                debug!(url, error = %e, "Tile fetch failed");
                return false;
            }
        };

        match cache.put(url, response).await {
            Ok(()) => true,
            Err(e) => {
                debug!(url, error = %e, "Tile store failed");
                false
            }
        }
    }

    /// Removes what a failed install left behind.
    async fn discard(&self, name: &str, existed: bool, cache: &dyn Cache, written: &[&str]) {
        if !existed {
            if let Err(e) = self.storage.delete(name).await {
                warn!(version = %name, error = %e, "Failed to remove partial generation");
            }
            return;
        }
        for key in written {
            if let Err(e) = cache.delete(key).await {
                warn!(version = %name, key, error = %e, "Failed to remove partial entry");
            }
        }
    }

    /// Deletes every generation except the current one and marks it active.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotInstalled` if the current generation does not
    /// exist in storage.
    pub async fn activate(&self) -> Result<ActivateReport, CacheError> {
        let current = self.version.name();
        if !self.storage.has(&current).await? {
            return Err(CacheError::NotInstalled(current));
        }

        let mut deleted = Vec::new();
        for name in self.storage.names().await? {
            if name == current {
                continue;
            }
            if self.storage.delete(&name).await? {
                debug!(generation = %name, "Deleted stale generation");
                deleted.push(name);
            }
        }

        self.set_state(GenerationState::Active);
        info!(version = %current, deleted = deleted.len(), "Cache generation activated");

        Ok(ActivateReport {
            kept: current,
            deleted,
        })
    }

    /// Looks up `key` in the current generation.
    ///
    /// Returns `Ok(None)` when the generation does not exist yet.
    pub async fn get(&self, key: &str) -> Result<Option<Response>, CacheError> {
        match self.storage.lookup(&self.version.name()).await? {
            Some(cache) => cache.get(key).await,
            None => Ok(None),
        }
    }

    /// Stores `response` under `key` in the current generation.
    ///
    /// Only install creates a generation. Before that this stores nothing and
    /// returns `Ok(false)`, so a request served early cannot make an empty
    /// version look installed to [`activate`](Self::activate).
    pub async fn put(&self, key: &str, response: Response) -> Result<bool, CacheError> {
        let name = self.version.name();
        match self.storage.lookup(&name).await? {
            Some(cache) => {
                cache.put(key, response).await?;
                Ok(true)
            }
            None => {
                trace!(version = %name, key, "Generation not installed, entry not stored");
                Ok(false)
            }
        }
    }

    /// Current generation state, falling back to what storage shows when this
    /// process has not run a lifecycle step yet.
    pub async fn resolved_state(&self) -> Result<GenerationState, CacheError> {
        let state = self.state();
        if state != GenerationState::Uninitialized {
            return Ok(state);
        }

        let current = self.version.name();
        let names = self.storage.names().await?;
        if !names.contains(&current) {
            return Ok(GenerationState::Uninitialized);
        }
        if names.len() == 1 {
            Ok(GenerationState::Active)
        } else {
            Ok(GenerationState::Installed)
        }
    }

    /// One status entry per stored generation, sorted by name.
    pub async fn status(&self) -> Result<Vec<GenerationStatus>, CacheError> {
        let current = self.version.name();
        let current_state = self.resolved_state().await?;
        let mut statuses = Vec::new();

        for name in self.storage.names().await? {
            let stats = match self.storage.lookup(&name).await? {
                Some(cache) => cache.stats().await?,
                None => continue,
            };
            let is_current = name == current;
            statuses.push(GenerationStatus {
                state: if is_current {
                    current_state
                } else {
                    GenerationState::Stale
                },
                current: is_current,
                name,
                stats,
            });
        }

        Ok(statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::providers::MemoryCacheStorage;
    use crate::coord::BoundingRegion;
    use crate::manifest::{build_manifest, TileTemplate};
    use crate::network::MockHttpClient;

    const ASSETS: [&str; 3] = ["/", "/index.html", "/styles.css"];

    fn tiny_manifest() -> PrecacheManifest {
        // One tile at zoom 0, fetched from two subdomains
        let region = BoundingRegion::new(10.0, 20.0, 10.0, 20.0, vec![0]).unwrap();
        build_manifest(&ASSETS, &region, &["a", "b"], &TileTemplate::default())
    }

    fn page() -> Response {
        Response::ok("text/html", "<html></html>")
    }

    fn version(n: u32) -> CacheVersion {
        CacheVersion::new("guestbook", n).unwrap()
    }

    fn manager(storage: Arc<dyn CacheStorage>, n: u32) -> CacheManager {
        CacheManager::new(storage, version(n))
    }

    #[tokio::test]
    async fn test_install_caches_everything() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let manager = manager(Arc::clone(&storage), 1);
        let client = MockHttpClient::new().with_default(page());
        let manifest = tiny_manifest();

        let report = manager.install(&manifest, &client).await.unwrap();

        assert_eq!(report.static_cached, 3);
        assert_eq!(report.tiles_cached, 2);
        assert_eq!(report.tiles_failed, 0);
        assert_eq!(report.cached(), manifest.len());
        assert_eq!(manager.state(), GenerationState::Installed);

        let mut requested = client.requested();
        requested.sort();
        let mut expected: Vec<String> = manifest.urls().map(str::to_string).collect();
        expected.sort();
        assert_eq!(requested, expected);

        let cache = storage.lookup("guestbook-cache-v1").await.unwrap().unwrap();
        assert_eq!(cache.stats().await.unwrap().entries, manifest.len() as u64);
    }

    #[tokio::test]
    async fn test_install_tolerates_tile_failures() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let manager = manager(Arc::clone(&storage), 1);
        let client = MockHttpClient::new()
            .with_default(page())
            .with_failure("https://a.tile.openstreetmap.org/0/0/0.png")
            .with_response(
                "https://b.tile.openstreetmap.org/0/0/0.png",
                Response::new(404, None, "missing"),
            );

        let report = manager.install(&tiny_manifest(), &client).await.unwrap();

        assert_eq!(report.static_cached, 3);
        assert_eq!(report.tiles_cached, 0);
        assert_eq!(report.tiles_failed, 2);

        let cache = storage.lookup("guestbook-cache-v1").await.unwrap().unwrap();
        assert_eq!(cache.stats().await.unwrap().entries, 3);
    }

    #[tokio::test]
    async fn test_install_never_stores_more_than_manifest() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let manager = manager(Arc::clone(&storage), 1);
        let client = MockHttpClient::new()
            .with_default(page())
            .with_failure("https://b.tile.openstreetmap.org/0/0/0.png");
        let manifest = tiny_manifest();

        let report = manager.install(&manifest, &client).await.unwrap();

        let cache = storage.lookup("guestbook-cache-v1").await.unwrap().unwrap();
        let entries = cache.stats().await.unwrap().entries as usize;
        assert_eq!(entries, report.cached());
        assert!(entries <= manifest.len());
        assert!(entries >= manifest.static_count());
    }

    #[tokio::test]
    async fn test_install_aborts_on_static_failure() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let manager = manager(Arc::clone(&storage), 1);
        let client = MockHttpClient::new()
            .with_default(page())
            .with_failure("/styles.css");

        let result = manager.install(&tiny_manifest(), &client).await;

        match result {
            Err(InstallError::StaticAsset { url, .. }) => assert_eq!(url, "/styles.css"),
            other => panic!("expected static asset failure, got {:?}", other),
        }
        assert_eq!(manager.state(), GenerationState::Uninitialized);
        assert!(!storage.has("guestbook-cache-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_install_aborts_on_static_non_200() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let manager = manager(Arc::clone(&storage), 1);
        let client = MockHttpClient::new()
            .with_default(page())
            .with_response("/index.html", Response::new(500, None, "oops"));

        let err = manager.install(&tiny_manifest(), &client).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
        assert!(manager.get("/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_reinstall_keeps_existing_entries() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        storage.open("guestbook-cache-v1").await.unwrap();
        let manager = manager(Arc::clone(&storage), 1);
        assert!(manager
            .put("https://a.tile.openstreetmap.org/0/0/0.png", page())
            .await
            .unwrap());

        let client = MockHttpClient::new().with_failure("/");
        assert!(manager.install(&tiny_manifest(), &client).await.is_err());

        assert!(storage.has("guestbook-cache-v1").await.unwrap());
        assert!(manager
            .get("https://a.tile.openstreetmap.org/0/0/0.png")
            .await
            .unwrap()
            .is_some());
    }

    struct SlowClient;

    impl AsyncHttpClient for SlowClient {
        async fn fetch(&self, url: &str) -> Result<Response, NetworkError> {
            if url.contains("tile") {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(Response::ok("image/png", vec![1u8]))
        }
    }

    #[tokio::test]
    async fn test_tile_timeout_counts_as_failure() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let manager = manager(storage, 1).with_tile_timeout(Some(Duration::from_millis(20)));

        let report = manager.install(&tiny_manifest(), &SlowClient).await.unwrap();

        assert_eq!(report.static_cached, 3);
        assert_eq!(report.tiles_failed, 2);
        assert_eq!(report.tiles_cached, 0);
    }

    #[tokio::test]
    async fn test_activate_keeps_only_current() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        for name in ["guestbook-cache-v1", "guestbook-cache-v2", "guestbook-cache-v3"] {
            storage.open(name).await.unwrap();
        }
        let manager = manager(Arc::clone(&storage), 3);

        let report = manager.activate().await.unwrap();

        assert_eq!(report.kept, "guestbook-cache-v3");
        assert_eq!(report.deleted, vec!["guestbook-cache-v1", "guestbook-cache-v2"]);
        assert_eq!(storage.names().await.unwrap(), vec!["guestbook-cache-v3"]);
        assert_eq!(manager.state(), GenerationState::Active);
    }

    #[tokio::test]
    async fn test_activate_deletes_foreign_generations() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        storage.open("other-site-cache-v1").await.unwrap();
        storage.open("guestbook-cache-v2").await.unwrap();
        let manager = manager(Arc::clone(&storage), 2);

        let report = manager.activate().await.unwrap();
        assert_eq!(report.deleted, vec!["other-site-cache-v1"]);
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        storage.open("guestbook-cache-v1").await.unwrap();
        let manager = manager(Arc::clone(&storage), 2);

        assert!(matches!(
            manager.activate().await,
            Err(CacheError::NotInstalled(_))
        ));
        assert!(storage.has("guestbook-cache-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_before_install_does_not_create_generation() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let manager = manager(Arc::clone(&storage), 1);

        assert!(!manager.put("/", page()).await.unwrap());

        assert!(storage.names().await.unwrap().is_empty());
        assert!(manager.get("/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_before_install_cannot_activate_over_previous() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let v1 = manager(Arc::clone(&storage), 1);
        let client = MockHttpClient::new().with_default(page());
        v1.install(&tiny_manifest(), &client).await.unwrap();
        v1.activate().await.unwrap();

        let v2 = manager(Arc::clone(&storage), 2);
        assert!(!v2
            .put("https://a.tile.openstreetmap.org/0/0/0.png", page())
            .await
            .unwrap());

        assert!(matches!(v2.activate().await, Err(CacheError::NotInstalled(_))));
        assert_eq!(storage.names().await.unwrap(), vec!["guestbook-cache-v1"]);
        assert!(v1.get("/index.html").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_status_marks_stale_generations() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        storage.open("guestbook-cache-v1").await.unwrap();
        storage.open("guestbook-cache-v2").await.unwrap();
        let manager = manager(Arc::clone(&storage), 2);
        assert!(manager.put("/", page()).await.unwrap());

        let status = manager.status().await.unwrap();

        assert_eq!(status.len(), 2);
        assert_eq!(status[0].name, "guestbook-cache-v1");
        assert_eq!(status[0].state, GenerationState::Stale);
        assert!(!status[0].current);
        assert_eq!(status[1].name, "guestbook-cache-v2");
        assert_eq!(status[1].state, GenerationState::Installed);
        assert_eq!(status[1].stats.entries, 1);
    }

    #[tokio::test]
    async fn test_resolved_state_from_storage() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let manager = manager(Arc::clone(&storage), 1);
        assert_eq!(
            manager.resolved_state().await.unwrap(),
            GenerationState::Uninitialized
        );

        storage.open("guestbook-cache-v1").await.unwrap();
        assert_eq!(
            manager.resolved_state().await.unwrap(),
            GenerationState::Active
        );
    }

    #[tokio::test]
    async fn test_get_before_install_is_miss() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let manager = manager(Arc::clone(&storage), 1);

        assert!(manager.get("/").await.unwrap().is_none());
        assert!(storage.names().await.unwrap().is_empty());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(GenerationState::Installed.to_string(), "installed");
        assert_eq!(GenerationState::Stale.to_string(), "stale");
    }
}
