//! Precache manifest construction.
//!
//! The manifest is the list of resources fetched when a new cache generation
//! is installed: the hand-maintained site-shell assets followed by one URL per
//! covered map tile per load-balancing subdomain.
//!
//! Warming every subdomain multiplies install traffic by the number of
//! subdomains, but a later request is served from cache regardless of which
//! mirror the map library happens to pick.

mod template;

pub use template::{TemplateError, TileTemplate, DEFAULT_TILE_TEMPLATE};

use serde::Serialize;

use crate::coord::{coverage, BoundingRegion, TileCoord};

/// One concrete tile URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileEndpoint {
    pub coord: TileCoord,
    pub subdomain: String,
    pub url: String,
}

/// A single manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManifestEntry {
    /// Site-shell resource; failure to cache one aborts installation.
    Static { url: String },
    /// Map tile; failures are tolerated individually.
    Tile(TileEndpoint),
}

impl ManifestEntry {
    /// The resource URL, used as the cache key.
    pub fn url(&self) -> &str {
        match self {
            ManifestEntry::Static { url } => url,
            ManifestEntry::Tile(endpoint) => &endpoint.url,
        }
    }

    /// Returns true for tile entries.
    pub fn is_tile(&self) -> bool {
        matches!(self, ManifestEntry::Tile(_))
    }
}

/// Ordered list of resources to precache.
///
/// Static assets always precede tile endpoints. Duplicates are not removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrecacheManifest {
    entries: Vec<ManifestEntry>,
}

impl PrecacheManifest {
    /// All entries in install order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Static asset URLs in their configured order.
    pub fn static_assets(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            ManifestEntry::Static { url } => Some(url.as_str()),
            ManifestEntry::Tile(_) => None,
        })
    }

    /// Generated tile endpoints.
    pub fn tile_endpoints(&self) -> impl Iterator<Item = &TileEndpoint> {
        self.entries.iter().filter_map(|entry| match entry {
            ManifestEntry::Tile(endpoint) => Some(endpoint),
            ManifestEntry::Static { .. } => None,
        })
    }

    pub fn static_count(&self) -> usize {
        self.static_assets().count()
    }

    pub fn tile_count(&self) -> usize {
        self.tile_endpoints().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every URL in install order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(ManifestEntry::url)
    }
}

/// Builds the precache manifest.
///
/// Static assets are emitted first, in the given order. Then, for every tile
/// in [`coverage`] of the region and every subdomain label, one
/// [`TileEndpoint`] is rendered from the template.
pub fn build_manifest<S: AsRef<str>>(
    static_assets: &[S],
    region: &BoundingRegion,
    subdomains: &[S],
    template: &TileTemplate,
) -> PrecacheManifest {
    let tiles = coverage(region);
    let mut entries = Vec::with_capacity(static_assets.len() + tiles.len() * subdomains.len());

    entries.extend(static_assets.iter().map(|url| ManifestEntry::Static {
        url: url.as_ref().to_string(),
    }));

    for tile in &tiles {
        for subdomain in subdomains {
            let subdomain = subdomain.as_ref();
            entries.push(ManifestEntry::Tile(TileEndpoint {
                coord: *tile,
                subdomain: subdomain.to_string(),
                url: template.render(tile, subdomain),
            }));
        }
    }

    PrecacheManifest { entries }
}
