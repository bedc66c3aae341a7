//! Fetch interception.
//!
//! Every outgoing request is classified once, by parsing its URL against the
//! tile template, and then answered cache first:
//!
//! | Class  | Hit    | Miss, network OK                | Miss, network down |
//! |--------|--------|---------------------------------|--------------------|
//! | Tile   | cached | returned; stored if HTTP 200    | fallback PNG       |
//! | Static | cached | returned, not stored            | error              |
//!
//! Cached entries are never revalidated. They only change when a new
//! generation is installed.

mod fallback;

pub use fallback::{fallback_tile, FALLBACK_CONTENT_TYPE, FALLBACK_TILE_PNG};

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::cache::CacheManager;
use crate::coord::TileCoord;
use crate::manifest::TileTemplate;
use crate::network::{AsyncHttpClient, NetworkError, Response};

/// How a request is handled, derived from its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestClass {
    /// The URL renders from the tile template.
    Tile { coord: TileCoord, subdomain: String },
    /// Anything else: site shell and unrelated resources.
    Static { path: String },
}

impl RequestClass {
    /// Classifies `url` against the tile template.
    pub fn classify(url: &str, template: &TileTemplate) -> Self {
        match template.matches(url) {
            Some((coord, subdomain)) => RequestClass::Tile { coord, subdomain },
            None => RequestClass::Static {
                path: url.to_string(),
            },
        }
    }

    pub fn is_tile(&self) -> bool {
        matches!(self, RequestClass::Tile { .. })
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    Fallback,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::Cache => write!(f, "cache"),
            ResponseSource::Network => write!(f, "network"),
            ResponseSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// A routed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: ResponseSource,
}

/// Errors surfaced to the requester.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A non-tile request missed the cache and the network failed.
    #[error("Network unavailable for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: NetworkError,
    },
}

/// Cache-first request router.
pub struct FetchRouter<C> {
    manager: Arc<CacheManager>,
    client: Arc<C>,
    template: TileTemplate,
}

impl<C: AsyncHttpClient> FetchRouter<C> {
    pub fn new(manager: Arc<CacheManager>, client: Arc<C>, template: TileTemplate) -> Self {
        Self {
            manager,
            client,
            template,
        }
    }

    pub fn template(&self) -> &TileTemplate {
        &self.template
    }

    /// Answers one request.
    ///
    /// Tile requests always produce a response. Static requests fail only
    /// when they miss the cache while the network is unreachable.
    pub async fn handle(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        match RequestClass::classify(url, &self.template) {
            RequestClass::Tile { coord, .. } => Ok(self.handle_tile(url, coord).await),
            RequestClass::Static { .. } => self.handle_static(url).await,
        }
    }

    async fn lookup(&self, url: &str) -> Option<Response> {
        match self.manager.get(url).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(url, error = %e, "Cache lookup failed, treating as miss");
                None
            }
        }
    }

    async fn handle_tile(&self, url: &str, coord: TileCoord) -> FetchOutcome {
        if let Some(response) = self.lookup(url).await {
            trace!(url, tile = %coord, "Tile cache hit");
            return FetchOutcome {
                response,
                source: ResponseSource::Cache,
            };
        }

        match self.client.fetch(url).await {
            Ok(response) => {
                if response.is_ok() {
                    match self.manager.put(url, response.clone()).await {
                        Ok(true) => {}
                        Ok(false) => debug!(url, "No installed generation, tile not stored"),
                        Err(e) => warn!(url, error = %e, "Failed to store tile"),
                    }
                } else {
                    debug!(url, status = response.status, "Tile response not cached");
                }
                FetchOutcome {
                    response,
                    source: ResponseSource::Network,
                }
            }
            Err(e) => {
                debug!(url, tile = %coord, error = %e, "Tile fetch failed, serving fallback");
                FetchOutcome {
                    response: fallback_tile(),
                    source: ResponseSource::Fallback,
                }
            }
        }
    }

    async fn handle_static(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        if let Some(response) = self.lookup(url).await {
            trace!(url, "Static cache hit");
            return Ok(FetchOutcome {
                response,
                source: ResponseSource::Cache,
            });
        }

        let response = self
            .client
            .fetch(url)
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        Ok(FetchOutcome {
            response,
            source: ResponseSource::Network,
        })
    }
}
