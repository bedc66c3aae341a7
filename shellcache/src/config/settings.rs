//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types; parsing lives in [`super::parser`] and
//! serialization in [`super::writer`].

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use super::file::ConfigFileError;
use crate::cache::CacheVersion;
use crate::coord::BoundingRegion;
use crate::manifest::{build_manifest, PrecacheManifest, TileTemplate};

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Cache generation and storage settings
    pub cache: CacheSettings,
    /// Region whose tiles are precached
    pub region: RegionSettings,
    /// Tile server settings
    pub tiles: TileSettings,
    /// Site-shell assets
    pub assets: AssetSettings,
    /// Log file settings
    pub logging: LoggingSettings,
}

/// Cache configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Site label, the `<site>` in `<site>-cache-v<N>`
    pub site: String,
    /// Generation number, bumped on every deploy
    pub version: u32,
    /// Directory holding one subdirectory per generation
    pub directory: PathBuf,
}

/// Precache region configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSettings {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub zoom_levels: Vec<u8>,
}

/// Tile server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSettings {
    /// URL template with `{s}`, `{z}`, `{x}` and `{y}` placeholders
    pub template: String,
    /// Load-balancing subdomain labels substituted for `{s}`
    pub subdomains: Vec<String>,
    /// Per-tile fetch timeout in seconds during install (0 disables it)
    pub timeout: u64,
}

/// Site-shell asset configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSettings {
    /// Origin that relative asset paths are resolved against
    pub base_url: Option<String>,
    /// Ordered asset paths, used verbatim as cache keys
    pub paths: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl ConfigFile {
    /// The configured cache generation.
    pub fn cache_version(&self) -> Result<CacheVersion, ConfigFileError> {
        CacheVersion::new(self.cache.site.clone(), self.cache.version).map_err(|e| {
            ConfigFileError::InvalidValue {
                section: "cache".to_string(),
                key: "site".to_string(),
                value: self.cache.site.clone(),
                reason: e.to_string(),
            }
        })
    }

    /// The configured precache region.
    pub fn region(&self) -> Result<BoundingRegion, ConfigFileError> {
        let r = &self.region;
        BoundingRegion::new(
            r.lat_min,
            r.lat_max,
            r.lon_min,
            r.lon_max,
            r.zoom_levels.clone(),
        )
        .map_err(|e| ConfigFileError::InvalidValue {
            section: "region".to_string(),
            key: "bounds".to_string(),
            value: format!(
                "{},{} .. {},{} @ {:?}",
                r.lat_min, r.lon_min, r.lat_max, r.lon_max, r.zoom_levels
            ),
            reason: e.to_string(),
        })
    }

    /// The configured tile URL template.
    pub fn tile_template(&self) -> Result<TileTemplate, ConfigFileError> {
        TileTemplate::parse(&self.tiles.template).map_err(|e| ConfigFileError::InvalidValue {
            section: "tiles".to_string(),
            key: "template".to_string(),
            value: self.tiles.template.clone(),
            reason: e.to_string(),
        })
    }

    /// Per-tile install timeout, if enabled.
    pub fn tile_timeout(&self) -> Option<Duration> {
        (self.tiles.timeout > 0).then(|| Duration::from_secs(self.tiles.timeout))
    }

    /// Checks that every asset path can become a request URL: either the
    /// path is absolute or `base_url` is set.
    pub fn check_assets(&self) -> Result<(), ConfigFileError> {
        let invalid = |key: &str, value: &str, reason: String| ConfigFileError::InvalidValue {
            section: "assets".to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        if let Some(base_url) = &self.assets.base_url {
            Url::parse(base_url).map_err(|e| invalid("base_url", base_url, e.to_string()))?;
            return Ok(());
        }

        match self.assets.paths.iter().find(|path| Url::parse(path).is_err()) {
            Some(path) => Err(invalid(
                "paths",
                path,
                "relative path needs [assets] base_url".to_string(),
            )),
            None => Ok(()),
        }
    }

    /// Builds the precache manifest this configuration describes.
    pub fn manifest(&self) -> Result<PrecacheManifest, ConfigFileError> {
        Ok(build_manifest(
            &self.assets.paths,
            &self.region()?,
            &self.tiles.subdomains,
            &self.tile_template()?,
        ))
    }
}
