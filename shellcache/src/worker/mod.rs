//! Lifecycle event host.
//!
//! [`ServiceWorker`] is built once per runtime lifecycle and owns everything
//! the three lifecycle events need: the generation manager, the precache
//! manifest, the HTTP client and the fetch router. Hosts feed it
//! [`LifecycleEvent`]s in the order install → activate → fetch*.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::cache::{
    ActivateReport, CacheError, CacheManager, CacheStorage, DiskCacheStorage, InstallError,
    InstallReport,
};
use crate::config::{ConfigFile, ConfigFileError};
use crate::manifest::PrecacheManifest;
use crate::network::{AsyncHttpClient, AsyncReqwestClient, NetworkError};
use crate::router::{FetchError, FetchOutcome, FetchRouter};

/// An event delivered by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Populate the current generation.
    Install,
    /// Remove every other generation.
    Activate,
    /// Answer one outgoing request.
    Fetch(String),
}

/// The result of handling one event.
#[derive(Debug)]
pub enum LifecycleOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Fetched(FetchOutcome),
}

/// Errors from building or driving a worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigFileError),

    #[error("HTTP client error: {0}")]
    Client(#[from] NetworkError),

    #[error("Install failed: {0}")]
    Install(#[from] InstallError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Composition root for the cache engine.
pub struct ServiceWorker<C> {
    manager: Arc<CacheManager>,
    manifest: PrecacheManifest,
    client: Arc<C>,
    router: FetchRouter<C>,
}

impl<C: AsyncHttpClient> ServiceWorker<C> {
    /// Assembles a worker from its parts.
    pub fn new(
        manager: CacheManager,
        manifest: PrecacheManifest,
        client: C,
        template: crate::manifest::TileTemplate,
    ) -> Self {
        let manager = Arc::new(manager);
        let client = Arc::new(client);
        let router = FetchRouter::new(Arc::clone(&manager), Arc::clone(&client), template);
        Self {
            manager,
            manifest,
            client,
            router,
        }
    }

    pub fn manager(&self) -> &CacheManager {
        &self.manager
    }

    pub fn manifest(&self) -> &PrecacheManifest {
        &self.manifest
    }

    /// The HTTP client shared by install and the router.
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn router(&self) -> &FetchRouter<C> {
        &self.router
    }

    /// Dispatches one lifecycle event.
    pub async fn handle_event(&self, event: LifecycleEvent) -> Result<LifecycleOutcome, WorkerError> {
        match event {
            LifecycleEvent::Install => Ok(LifecycleOutcome::Installed(self.install().await?)),
            LifecycleEvent::Activate => Ok(LifecycleOutcome::Activated(self.activate().await?)),
            LifecycleEvent::Fetch(url) => Ok(LifecycleOutcome::Fetched(self.fetch(&url).await?)),
        }
    }

    pub async fn install(&self) -> Result<InstallReport, InstallError> {
        self.manager.install(&self.manifest, &*self.client).await
    }

    pub async fn activate(&self) -> Result<ActivateReport, CacheError> {
        self.manager.activate().await
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        self.router.handle(url).await
    }
}

impl ServiceWorker<AsyncReqwestClient> {
    /// Builds a worker backed by the on-disk store and a reqwest client,
    /// as described by `config`.
    pub async fn from_config(config: &ConfigFile) -> Result<Self, WorkerError> {
        let version = config.cache_version()?;
        let manifest = config.manifest()?;
        let template = config.tile_template()?;
        config.check_assets()?;

        let mut client = AsyncReqwestClient::new()?;
        if let Some(base_url) = &config.assets.base_url {
            client = client.with_base_url(base_url)?;
        }

        let storage: Arc<dyn CacheStorage> =
            Arc::new(DiskCacheStorage::start(&config.cache.directory).await?);
        let manager = CacheManager::new(storage, version).with_tile_timeout(config.tile_timeout());

        info!(
            version = %manager.version(),
            directory = %config.cache.directory.display(),
            manifest_entries = manifest.len(),
            "Service worker ready"
        );

        Ok(Self::new(manager, manifest, client, template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheVersion, MemoryCacheStorage};
    use crate::coord::BoundingRegion;
    use crate::manifest::{build_manifest, TileTemplate};
    use crate::network::{MockHttpClient, Response};
    use crate::router::ResponseSource;

    const TILE: &str = "https://a.tile.openstreetmap.org/0/0/0.png";

    fn worker(
        storage: Arc<dyn CacheStorage>,
        version: u32,
        client: MockHttpClient,
    ) -> ServiceWorker<MockHttpClient> {
        let region = BoundingRegion::new(0.0, 1.0, 0.0, 1.0, vec![0]).unwrap();
        let manifest = build_manifest(&["/", "/index.html"], &region, &["a"], &TileTemplate::default());
        let manager = CacheManager::new(storage, CacheVersion::new("guestbook", version).unwrap());
        ServiceWorker::new(manager, manifest, client, TileTemplate::default())
    }

    fn online() -> MockHttpClient {
        MockHttpClient::new()
            .with_default(Response::ok("text/html", "page"))
            .with_response(TILE, Response::ok("image/png", vec![9u8; 4]))
    }

    #[tokio::test]
    async fn test_lifecycle_in_order() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let worker = worker(storage, 1, online());

        match worker.handle_event(LifecycleEvent::Install).await.unwrap() {
            LifecycleOutcome::Installed(report) => {
                assert_eq!(report.static_cached, 2);
                assert_eq!(report.tiles_cached, 1);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        assert!(matches!(
            worker.handle_event(LifecycleEvent::Activate).await.unwrap(),
            LifecycleOutcome::Activated(_)
        ));

        match worker
            .handle_event(LifecycleEvent::Fetch(TILE.to_string()))
            .await
            .unwrap()
        {
            LifecycleOutcome::Fetched(outcome) => assert_eq!(outcome.source, ResponseSource::Cache),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_new_version_replaces_old_on_activate() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());

        let v1 = worker(Arc::clone(&storage), 1, online());
        v1.install().await.unwrap();
        v1.activate().await.unwrap();

        let v2 = worker(Arc::clone(&storage), 2, online());
        v2.install().await.unwrap();
        assert_eq!(storage.names().await.unwrap().len(), 2);

        let report = v2.activate().await.unwrap();
        assert_eq!(report.deleted, vec!["guestbook-cache-v1"]);
        assert_eq!(storage.names().await.unwrap(), vec!["guestbook-cache-v2"]);
    }

    #[tokio::test]
    async fn test_failed_install_surfaces_error() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let worker = worker(storage, 1, MockHttpClient::new().with_failure("/index.html"));

        let err = worker.handle_event(LifecycleEvent::Install).await.unwrap_err();
        assert!(matches!(err, WorkerError::Install(_)));
    }

    #[tokio::test]
    async fn test_activate_before_install_errors() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryCacheStorage::new());
        let worker = worker(storage, 1, online());

        let err = worker.handle_event(LifecycleEvent::Activate).await.unwrap_err();
        assert!(matches!(err, WorkerError::Cache(CacheError::NotInstalled(_))));
    }

    #[tokio::test]
    async fn test_default_config_resolves_every_static_asset() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = ConfigFile::default();
        config.cache.directory = temp_dir.path().join("cache");

        let worker = ServiceWorker::from_config(&config).await.unwrap();

        assert_eq!(worker.manifest().static_count(), 13);
        for path in worker.manifest().static_assets() {
            let url = worker.client().resolve(path).unwrap();
            assert_eq!(url.host_str(), Some("guestbook.example"));
            assert_eq!(url.path(), path);
        }
    }

    #[tokio::test]
    async fn test_from_config_rejects_unresolvable_assets() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = ConfigFile::default();
        config.cache.directory = temp_dir.path().join("cache");
        config.assets.base_url = None;

        let result = ServiceWorker::from_config(&config).await;
        assert!(matches!(result, Err(WorkerError::Config(_))));
    }
}
