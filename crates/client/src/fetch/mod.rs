//! Outbound HTTP fetch pipeline.
//!
//! The [`Fetch`] trait is the seam between the serving strategies and
//! the network: the production [`HttpFetcher`] rides on reqwest, tests
//! substitute a scripted fake. Two deliberate departures from a
//! general-purpose client:
//!
//! - HTTP error statuses come back as responses, not errors. The
//!   serving strategies decide what a 404 means; only transport-level
//!   failures (DNS, connect, reset) surface as [`Error::Network`].
//! - No client-side timeout is set. A hung fetch stalls only the
//!   synchronous paths; cache-hit serving never waits on the network.

pub mod origin;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header};
use std::time::Instant;

use haven_core::{Error, RequestDescriptor, StoredResponse};
pub use origin::OriginFilter;

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "haven/0.1")
    pub user_agent: String,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "haven/0.1".to_string(), max_redirects: 5 }
    }
}

/// Whether a response body may be inspected and cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Response stayed on the serving origin; cacheable.
    Visible,
    /// Response ended up on a foreign origin (e.g. after a redirect);
    /// returned to the caller but never cached.
    Opaque,
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Bytes,
    /// Cacheability of the body.
    pub visibility: Visibility,
    /// Time taken to fetch in milliseconds.
    pub fetch_ms: u64,
}

impl FetchedResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_opaque(&self) -> bool {
        self.visibility == Visibility::Opaque
    }

    /// Byte-identical copy for the cache; the original stays with the
    /// caller. The shared body buffer makes this a cheap clone.
    pub fn to_stored(&self) -> StoredResponse {
        StoredResponse { status: self.status, headers: self.headers.clone(), body: self.body.clone() }
    }

    /// Consume into the form handed back to the caller.
    pub fn into_stored(self) -> StoredResponse {
        StoredResponse { status: self.status, headers: self.headers, body: self.body }
    }
}

/// Outbound network access used by the interceptor and precache loader.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Issue the request as captured at the interception boundary.
    async fn fetch(&self, request: &RequestDescriptor) -> Result<FetchedResponse, Error>;

    /// GET `url` while instructing intermediary caches to revalidate,
    /// so precached assets are as fresh as the network allows.
    async fn fetch_fresh(&self, url: &str) -> Result<FetchedResponse, Error>;
}

/// reqwest-backed fetch client.
pub struct HttpFetcher {
    http: Client,
    origin: OriginFilter,
}

impl HttpFetcher {
    /// Create a new fetch client with the given configuration.
    ///
    /// The origin filter decides response visibility: bodies that end
    /// up on a foreign origin are marked opaque.
    pub fn new(config: FetchConfig, origin: OriginFilter) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, origin })
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<FetchedResponse, Error> {
        let start = Instant::now();

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("network error: {e}")))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let visibility = if self.origin.matches(final_url.as_str()) {
            Visibility::Visible
        } else {
            Visibility::Opaque
        };
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> status {} in {}ms ({} bytes)",
            final_url,
            status,
            fetch_ms,
            bytes.len()
        );

        Ok(FetchedResponse { status, headers, body: bytes, visibility, fetch_ms })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<FetchedResponse, Error> {
        // Only GETs ever reach the network through the interceptor.
        let mut builder = self.http.get(&request.url);
        if let Some(accept) = &request.accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        self.execute(builder).await
    }

    async fn fetch_fresh(&self, url: &str) -> Result<FetchedResponse, Error> {
        let builder = self
            .http
            .get(url)
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::PRAGMA, "no-cache");
        self.execute(builder).await
    }
}
