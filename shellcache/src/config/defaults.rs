//! Default values and constants for all configuration settings.
//!
//! The defaults describe the reference deployment: a guestbook site whose
//! map covers north-east Florida at zoom 12.

use super::file::config_directory;
use super::settings::*;
use crate::manifest::DEFAULT_TILE_TEMPLATE;
use crate::network::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_SITE: &str = "guestbook";
pub const DEFAULT_CACHE_VERSION: u32 = 1;

pub const DEFAULT_LAT_MIN: f64 = 29.18;
pub const DEFAULT_LAT_MAX: f64 = 31.48;
pub const DEFAULT_LON_MIN: f64 = -82.98;
pub const DEFAULT_LON_MAX: f64 = -80.32;
pub const DEFAULT_ZOOM_LEVEL: u8 = 12;

pub const DEFAULT_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Origin the relative asset paths below are fetched from.
pub const DEFAULT_BASE_URL: &str = "https://guestbook.example";

/// Site shell of the reference deployment, in precache order.
pub const DEFAULT_ASSET_PATHS: [&str; 13] = [
    "/",
    "/index.html",
    "/info.html",
    "/subcategory.html",
    "/search.html",
    "/map.html",
    "/styles.css",
    "/app.js",
    "/data.json",
    "/manifest.json",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
    "/images/hero.jpg",
];

pub const DEFAULT_LOG_FILE: &str = "shellcache.log";

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = config_directory();

        Self {
            cache: CacheSettings {
                site: DEFAULT_SITE.to_string(),
                version: DEFAULT_CACHE_VERSION,
                directory: config_dir.join("cache"),
            },
            region: RegionSettings {
                lat_min: DEFAULT_LAT_MIN,
                lat_max: DEFAULT_LAT_MAX,
                lon_min: DEFAULT_LON_MIN,
                lon_max: DEFAULT_LON_MAX,
                zoom_levels: vec![DEFAULT_ZOOM_LEVEL],
            },
            tiles: TileSettings {
                template: DEFAULT_TILE_TEMPLATE.to_string(),
                subdomains: DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
                timeout: DEFAULT_TIMEOUT_SECS,
            },
            assets: AssetSettings {
                base_url: Some(DEFAULT_BASE_URL.to_string()),
                paths: DEFAULT_ASSET_PATHS.iter().map(|s| s.to_string()).collect(),
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE),
            },
        }
    }
}
