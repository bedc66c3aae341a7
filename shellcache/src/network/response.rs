//! Response values exchanged between the network, the store and callers.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An HTTP response reduced to what the cache needs to replay it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
}

impl Response {
    /// Creates a response.
    pub fn new(status: u16, content_type: Option<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    /// Creates a `200 OK` response.
    pub fn ok(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self::new(200, Some(content_type.into()), body)
    }

    /// Returns true for exactly HTTP 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body length in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response() {
        let response = Response::ok("text/html", "<html></html>");
        assert!(response.is_ok());
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
        assert_eq!(response.len(), 13);
    }

    #[test]
    fn test_only_200_is_ok() {
        assert!(!Response::new(204, None, Bytes::new()).is_ok());
        assert!(!Response::new(404, None, "missing").is_ok());
    }

    #[test]
    fn test_bincode_preserves_response() {
        let response = Response::ok("image/png", vec![1u8, 2, 3]);
        let encoded = bincode::serialize(&response).unwrap();
        let decoded: Response = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, response);
    }
}
