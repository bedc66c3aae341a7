//! On-disk cache provider.
//!
//! Persists generations across process restarts so a command line host can
//! install, activate and serve in separate invocations.
//!
//! # File Layout
//!
//! ```text
//! {root}/{generation}/{sha256(key)}.entry
//! ```
//!
//! Each entry file holds a bincode-encoded [`StoredEntry`] carrying the
//! original key, so keys can be enumerated without a separate index. Writes go
//! to a temp file and are renamed into place, making each `put` atomic.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::cache::traits::{validate_name, BoxFuture, Cache, CacheError, CacheStats, CacheStorage};
use crate::network::Response;

const ENTRY_EXTENSION: &str = "entry";
const TEMP_EXTENSION: &str = "tmp";

/// Distinguishes temp files of concurrent writers within one process.
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Serialized form of one cache entry.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    response: Response,
}

/// One on-disk cache generation.
pub struct DiskCacheProvider {
    name: String,
    directory: PathBuf,
}

impl DiskCacheProvider {
    /// Open (creating if needed) the generation directory.
    pub async fn open(root: &Path, name: &str) -> Result<Self, CacheError> {
        validate_name(name)?;
        let directory = root.join(name);
        tokio::fs::create_dir_all(&directory).await?;
        Ok(Self {
            name: name.to_string(),
            directory,
        })
    }

    /// Generation directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Generate a safe, stable filename from a cache key.
    fn key_to_filename(key: &str) -> String {
        let digest = Sha256::digest(key.as_bytes());
        format!("{}.{}", hex::encode(digest), ENTRY_EXTENSION)
    }

    /// A temp path next to `path` that no other writer is using.
    fn temp_path(path: &Path) -> PathBuf {
        let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        path.with_extension(format!(
            "{}.{}.{}",
            std::process::id(),
            sequence,
            TEMP_EXTENSION
        ))
    }

    /// Get the file path for a cache key.
    fn key_path(&self, key: &str) -> PathBuf {
        self.directory.join(Self::key_to_filename(key))
    }

    async fn read_entry(path: &Path) -> Result<Option<StoredEntry>, CacheError> {
        match tokio::fs::read(path).await {
            Ok(data) => bincode::deserialize(&data)
                .map(Some)
                .map_err(|e| CacheError::Encoding(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    async fn entry_files(&self) -> Result<Vec<(PathBuf, u64)>, CacheError> {
        let mut files = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.directory).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(CacheError::Io(e)),
        };

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                let size = entry.metadata().await.map(|m| m.len()).unwrap_or(0);
                files.push((path, size));
            }
        }

        Ok(files)
    }
}

impl Cache for DiskCacheProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, key: &str, response: Response) -> BoxFuture<'_, Result<(), CacheError>> {
        let path = self.key_path(key);
        let entry = StoredEntry {
            key: key.to_string(),
            response,
        };
        Box::pin(async move {
            let data = bincode::serialize(&entry).map_err(|e| CacheError::Encoding(e.to_string()))?;

            // Write atomically via a writer-private temp file; last rename wins
            let temp_path = Self::temp_path(&path);
            let written = match tokio::fs::write(&temp_path, &data).await {
                Ok(()) => tokio::fs::rename(&temp_path, &path).await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(CacheError::Io(e));
            }
            Ok(())
        })
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Response>, CacheError>> {
        let path = self.key_path(key);
        let key = key.to_string();
        Box::pin(async move {
            match Self::read_entry(&path).await? {
                Some(entry) if entry.key == key => Ok(Some(entry.response)),
                Some(entry) => {
                    warn!(
                        requested = %key,
                        stored = %entry.key,
                        "Disk cache filename collision, treating as miss"
                    );
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, Result<bool, CacheError>> {
        let path = self.key_path(key);
        Box::pin(async move {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(CacheError::Io(e)),
            }
        })
    }

    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, CacheError>> {
        let path = self.key_path(key);
        Box::pin(async move { Ok(tokio::fs::try_exists(&path).await?) })
    }

    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, CacheError>> {
        Box::pin(async move {
            let mut keys = Vec::new();
            for (path, _) in self.entry_files().await? {
                match Self::read_entry(&path).await {
                    Ok(Some(entry)) => keys.push(entry.key),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable cache entry")
                    }
                }
            }
            Ok(keys)
        })
    }

    fn stats(&self) -> BoxFuture<'_, Result<CacheStats, CacheError>> {
        Box::pin(async move {
            let files = self.entry_files().await?;
            Ok(CacheStats {
                entries: files.len() as u64,
                bytes: files.iter().map(|(_, size)| size).sum(),
            })
        })
    }
}

/// Registry of on-disk generations, one subdirectory each.
pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    /// Start a disk cache registry rooted at `root`, creating the directory
    /// if it doesn't exist.
    pub async fn start(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        info!(dir = %root.display(), "Disk cache storage started");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CacheStorage for DiskCacheStorage {
    fn open(&self, name: &str) -> BoxFuture<'_, Result<Arc<dyn Cache>, CacheError>> {
        let name = name.to_string();
        Box::pin(async move {
            let provider = DiskCacheProvider::open(&self.root, &name).await?;
            Ok(Arc::new(provider) as Arc<dyn Cache>)
        })
    }

    fn lookup(&self, name: &str) -> BoxFuture<'_, Result<Option<Arc<dyn Cache>>, CacheError>> {
        let name = name.to_string();
        Box::pin(async move {
            if !self.has(&name).await? {
                return Ok(None);
            }
            let provider = DiskCacheProvider::open(&self.root, &name).await?;
            Ok(Some(Arc::new(provider) as Arc<dyn Cache>))
        })
    }

    fn has(&self, name: &str) -> BoxFuture<'_, Result<bool, CacheError>> {
        let name = name.to_string();
        Box::pin(async move {
            if validate_name(&name).is_err() {
                return Ok(false);
            }
            match tokio::fs::metadata(self.root.join(&name)).await {
                Ok(metadata) => Ok(metadata.is_dir()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(CacheError::Io(e)),
            }
        })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, Result<bool, CacheError>> {
        let name = name.to_string();
        Box::pin(async move {
            validate_name(&name)?;
            match tokio::fs::remove_dir_all(self.root.join(&name)).await {
                Ok(()) => {
                    debug!(generation = %name, "Deleted disk cache generation");
                    Ok(true)
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(CacheError::Io(e)),
            }
        })
    }

    fn names(&self) -> BoxFuture<'_, Result<Vec<String>, CacheError>> {
        Box::pin(async move {
            let mut names = Vec::new();
            let mut dir = tokio::fs::read_dir(&self.root).await?;
            while let Some(entry) = dir.next_entry().await? {
                if !entry.file_type().await?.is_dir() {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    if validate_name(name).is_ok() {
                        names.push(name.to_string());
                    }
                }
            }
            names.sort();
            Ok(names)
        })
    }
}
