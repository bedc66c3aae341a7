//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::response::Response;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent string for HTTP requests.
/// The OpenStreetMap tile usage policy requires an identifying User-Agent.
const DEFAULT_USER_AGENT: &str = concat!("shellcache/", env!("CARGO_PKG_VERSION"));

/// Transport-level failures. An HTTP error status is not a `NetworkError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to read response: {0}")]
    Body(String),
}

/// Trait for asynchronous HTTP client operations.
///
/// Implementations report transport failures (DNS, connect, reset, timeout)
/// as errors and return every HTTP status, including 4xx/5xx, as a
/// [`Response`]. Callers decide which statuses are acceptable.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Response, NetworkError>> + Send;
}

/// Async HTTP client implementation using reqwest.
///
/// Relative URLs such as `/index.html` are resolved against an optional base
/// URL; the caller's original string is still what the cache uses as a key.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
    base_url: Option<Url>,
    timeout: Duration,
}

impl AsyncReqwestClient {
    /// Creates a new AsyncReqwestClient with default configuration.
    pub fn new() -> Result<Self, NetworkError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new AsyncReqwestClient with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            // Install fans out one request per tile endpoint
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| NetworkError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: None,
            timeout,
        })
    }

    /// Sets the base URL used to resolve relative request URLs.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, NetworkError> {
        let base = Url::parse(base_url).map_err(|e| NetworkError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        self.base_url = Some(base);
        Ok(self)
    }

    /// Resolves a request URL to an absolute URL.
    pub(crate) fn resolve(&self, url: &str) -> Result<Url, NetworkError> {
        let parsed = match &self.base_url {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        parsed.map_err(|e| NetworkError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn fetch(&self, url: &str) -> Result<Response, NetworkError> {
        let target = self.resolve(url)?;
        trace!(url = %target, "HTTP GET request starting");

        let response = match self.client.get(target.clone()).send().await {
            Ok(resp) => {
                debug!(
                    url = %target,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = %target,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                if e.is_timeout() {
                    return Err(NetworkError::Timeout(self.timeout));
                }
                return Err(NetworkError::Request(e.to_string()));
            }
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match response.bytes().await {
            Ok(body) => {
                trace!(url = %target, bytes = body.len(), "HTTP response body read");
                Ok(Response {
                    status,
                    content_type,
                    body,
                })
            }
            Err(e) => {
                warn!(url = %target, error = %e, "Failed to read response body");
                Err(NetworkError::Body(e.to_string()))
            }
        }
    }
}
