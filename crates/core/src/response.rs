//! Stored response representation.

use bytes::Bytes;

/// A response as held in a cache generation.
///
/// The body is a shared byte buffer, so duplicating an entry for a
/// second consumer is a reference-count bump and every copy is
/// byte-identical to the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Bytes,
}

impl StoredResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    /// Byte-identical copy that is safe to hand to a second consumer
    /// while the original is consumed elsewhere.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
