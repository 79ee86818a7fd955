//! Request correlation IDs.
//!
//! Handlers read `X-Request-ID` when the caller supplies one, otherwise they
//! generate a UUID v7 (time-sortable). The ID is logged with every event for
//! the request and echoed as the `instance` of problem documents.

use http::HeaderMap;
use uuid::Uuid;

/// Header carrying the caller's correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Newtype wrapper for request correlation IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new UUID v7 request ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Extract the request ID from headers or generate a new UUID v7.
///
/// Missing, empty, or non-UTF-8 header values all produce a fresh ID.
pub fn extract_or_generate_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(RequestId::from)
        .unwrap_or_else(RequestId::generate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_header_value_is_reused() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-abc"));

        assert_eq!(extract_or_generate_request_id(&headers).as_str(), "req-abc");
    }

    #[test]
    fn test_missing_header_generates_uuid() {
        let id = extract_or_generate_request_id(&HeaderMap::new());
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_blank_header_generates_uuid() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("  "));

        let id = extract_or_generate_request_id(&headers);
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
