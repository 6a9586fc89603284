//! Request interception and serving strategies.
//!
//! The dispatch point for every request the host offers: only
//! same-origin GETs are taken, and those are served by one of two
//! strategies picked by request classification.
//!
//! - Page loads: network-first. A fresh page also refreshes the cached
//!   root document in the background; offline falls back to the cached
//!   root document, or a synthetic plain-text body as a last resort.
//! - Subresources: cache-first with query-insensitive matching. A hit
//!   is returned without touching the network on the caller's path,
//!   then revalidated in deferred work; a miss goes to the network and
//!   teaches the runtime generation.
//!
//! Cache store failures anywhere on these paths read as a miss or a
//! skipped write. Nothing here propagates an error to the caller.

use std::sync::Arc;

use bytes::Bytes;
use haven_client::{Fetch, OriginFilter};
use haven_core::{CacheStore, GenerationNames, MatchOptions, RequestDescriptor, RequestKind, StoredResponse};

use crate::work::WorkSet;

/// Canonical cache key for the application shell, relative to the
/// serving origin. Every successful page load refreshes this entry,
/// whatever URL the page was loaded from.
pub const ROOT_DOCUMENT: &str = "./index.html";

/// Body of the last-resort response for an offline page load with
/// nothing cached.
const OFFLINE_BODY: &str = "Offline";

/// Outcome of offering a request to the interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    /// Serve this response to the caller.
    Respond(StoredResponse),
    /// Leave the request to the host's default handling.
    Passthrough,
}

pub struct Interceptor {
    store: CacheStore,
    fetcher: Arc<dyn Fetch>,
    origin: OriginFilter,
    names: GenerationNames,
    /// Absolute form of [`ROOT_DOCUMENT`].
    root_document: String,
    work: Arc<WorkSet>,
}

impl Interceptor {
    pub fn new(
        store: CacheStore,
        fetcher: Arc<dyn Fetch>,
        origin: OriginFilter,
        names: GenerationNames,
        root_document: String,
        work: Arc<WorkSet>,
    ) -> Self {
        Self { store, fetcher, origin, names, root_document, work }
    }

    /// Offer an incoming request.
    ///
    /// Foreign origins and non-GET methods pass through without a cache
    /// or network call; everything else gets a response.
    pub async fn intercept(&self, request: &RequestDescriptor) -> FetchDecision {
        if !request.is_get() {
            return FetchDecision::Passthrough;
        }
        if !self.origin.matches(&request.url) {
            return FetchDecision::Passthrough;
        }

        let response = match request.kind() {
            RequestKind::Navigation => self.serve_navigation(request).await,
            RequestKind::Subresource => self.serve_subresource(request).await,
        };
        FetchDecision::Respond(response)
    }

    /// Network-first, cache fallback, cache refresh.
    async fn serve_navigation(&self, request: &RequestDescriptor) -> StoredResponse {
        match self.fetcher.fetch(request).await {
            Ok(fresh) => {
                // Refresh the root document behind the response; the
                // caller never waits on the write.
                let copy = fresh.to_stored();
                let store = self.store.clone();
                let generation = self.names.runtime_name().to_string();
                let key = self.root_document.clone();
                self.work.defer(async move {
                    store_quietly(&store, &generation, &key, &copy).await;
                });
                fresh.into_stored()
            }
            Err(e) => {
                tracing::debug!("page load fetch failed, falling back to cache: {e}");
                match lookup_quietly(&self.store, &self.root_document, MatchOptions::default()).await {
                    Some(cached) => cached,
                    None => offline_response(),
                }
            }
        }
    }

    /// Cache-first, background revalidate, network fallback.
    async fn serve_subresource(&self, request: &RequestDescriptor) -> StoredResponse {
        let options = MatchOptions { ignore_query: true };
        if let Some(cached) = lookup_quietly(&self.store, &request.url, options).await {
            let fetcher = Arc::clone(&self.fetcher);
            let store = self.store.clone();
            let generation = self.names.runtime_name().to_string();
            let request = request.clone();
            self.work.defer(async move {
                match fetcher.fetch(&request).await {
                    Ok(fresh) if fresh.is_ok() && !fresh.is_opaque() => {
                        store_quietly(&store, &generation, &request.url, &fresh.to_stored()).await;
                    }
                    Ok(fresh) => {
                        tracing::debug!(
                            "revalidation for {} not stored: status {}, opaque {}",
                            request.url,
                            fresh.status,
                            fresh.is_opaque()
                        );
                    }
                    Err(e) => {
                        tracing::debug!("revalidation failed for {}: {e}", request.url);
                    }
                }
            });
            return cached;
        }

        match self.fetcher.fetch(request).await {
            Ok(fresh) => {
                if fresh.is_ok() && !fresh.is_opaque() {
                    let copy = fresh.to_stored();
                    store_quietly(&self.store, self.names.runtime_name(), &request.url, &copy).await;
                }
                fresh.into_stored()
            }
            Err(e) => {
                tracing::debug!("subresource fetch failed for {}: {e}", request.url);
                gateway_timeout()
            }
        }
    }
}

/// Look up across generations; a store failure reads as a miss.
async fn lookup_quietly(store: &CacheStore, url: &str, options: MatchOptions) -> Option<StoredResponse> {
    match store.lookup(url, options).await {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!("cache lookup failed for {url}: {e}");
            None
        }
    }
}

/// Write into a generation; a store failure skips the write.
async fn store_quietly(store: &CacheStore, generation: &str, url: &str, response: &StoredResponse) {
    let result = match store.open(generation).await {
        Ok(handle) => handle.put(url, response).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::debug!("cache write failed for {url}: {e}");
    }
}

/// Last-resort page-load response when offline with an empty cache.
/// Deliberately a 200: the page receives a body, not a protocol error.
fn offline_response() -> StoredResponse {
    StoredResponse::new(200, vec![("content-type".into(), "text/plain".into())], OFFLINE_BODY)
}

/// Empty response signaling an unreachable upstream.
fn gateway_timeout() -> StoredResponse {
    StoredResponse::new(504, Vec::new(), Bytes::new())
}
