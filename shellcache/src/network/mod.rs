//! Network access for install and fetch handling.
//!
//! The [`AsyncHttpClient`] trait is the seam between the cache engine and the
//! network, so install and routing logic can be exercised with a mock client.

mod http;
mod response;

pub use http::{AsyncHttpClient, AsyncReqwestClient, NetworkError, DEFAULT_TIMEOUT_SECS};
pub use response::Response;

#[cfg(test)]
pub use http::tests::MockHttpClient;
