//! Same-origin gate for interception.

use url::{Origin, Url};

/// Error type for building an [`OriginFilter`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum OriginError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Decides whether a URL belongs to the origin this agent serves.
///
/// Origin means scheme + host + port. Foreign URLs are passed through
/// untouched by the interceptor, and a URL that fails to parse counts
/// as foreign rather than an error.
#[derive(Debug, Clone)]
pub struct OriginFilter {
    base: Url,
    origin: Origin,
}

impl OriginFilter {
    /// Build a filter from the serving origin, e.g. `https://app.example.com`.
    pub fn new(origin_url: &str) -> Result<Self, OriginError> {
        let base = Url::parse(origin_url).map_err(|e| OriginError::InvalidUrl(e.to_string()))?;

        match base.scheme() {
            "http" | "https" => {}
            scheme => return Err(OriginError::UnsupportedScheme(scheme.to_string())),
        }

        let origin = base.origin();
        Ok(Self { base, origin })
    }

    /// True iff `url` parses and its origin equals the serving origin.
    pub fn matches(&self, url: &str) -> bool {
        Url::parse(url).map(|u| u.origin() == self.origin).unwrap_or(false)
    }

    /// Resolve a relative URL (e.g. `./index.html`) against the serving
    /// origin, yielding the absolute form used as a cache key.
    pub fn resolve(&self, relative: &str) -> Result<String, OriginError> {
        self.base
            .join(relative)
            .map(Into::into)
            .map_err(|e| OriginError::InvalidUrl(e.to_string()))
    }
}
