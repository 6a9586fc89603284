//! Event adapter tying the agent together.
//!
//! The embedding shell translates its lifecycle and fetch events into
//! the corresponding `handle_*` calls here. Everything below this layer
//! is plain functions over injected collaborators, so the whole agent
//! is testable without a simulated host event loop.

use std::sync::Arc;

use haven_client::{Fetch, FetchConfig, HttpFetcher, OriginFilter};
use haven_core::{AppConfig, CacheStore, Error, GenerationNames, RequestDescriptor};

use crate::host::Host;
use crate::interceptor::{FetchDecision, Interceptor, ROOT_DOCUMENT};
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::precache::{self, PRECACHE_MANIFEST};
use crate::work::WorkSet;

pub struct Worker {
    store: CacheStore,
    fetcher: Arc<dyn Fetch>,
    origin: OriginFilter,
    names: GenerationNames,
    manifest: Vec<String>,
    work: Arc<WorkSet>,
    interceptor: Interceptor,
    lifecycle: Lifecycle,
}

impl Worker {
    /// Wire a worker from its collaborators, using the compiled-in
    /// generation names and precache manifest.
    pub fn new(
        store: CacheStore,
        fetcher: Arc<dyn Fetch>,
        host: Arc<dyn Host>,
        origin: OriginFilter,
    ) -> Result<Self, Error> {
        let names = GenerationNames::current();
        let root_document = origin
            .resolve(ROOT_DOCUMENT)
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let work = Arc::new(WorkSet::new());
        let interceptor = Interceptor::new(
            store.clone(),
            Arc::clone(&fetcher),
            origin.clone(),
            names.clone(),
            root_document,
            Arc::clone(&work),
        );
        let lifecycle = Lifecycle::new(store.clone(), names.clone(), host);

        Ok(Self {
            store,
            fetcher,
            origin,
            names,
            manifest: PRECACHE_MANIFEST.iter().map(|e| e.to_string()).collect(),
            work,
            interceptor,
            lifecycle,
        })
    }

    /// Production wiring: SQLite store at the configured path, HTTP
    /// fetcher with the configured user agent.
    pub async fn from_config(config: &AppConfig, host: Arc<dyn Host>) -> Result<Self, Error> {
        let store = CacheStore::open_path(&config.db_path).await?;
        let origin = OriginFilter::new(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let fetcher = HttpFetcher::new(
            FetchConfig { user_agent: config.user_agent.clone(), ..Default::default() },
            origin.clone(),
        )?;
        Self::new(store, Arc::new(fetcher), host, origin)
    }

    /// Replace the precache manifest, e.g. for a host that inlines its
    /// own asset list.
    pub fn with_manifest(mut self, manifest: Vec<String>) -> Self {
        self.manifest = manifest;
        self
    }

    /// Install event: provision the static generation, then request
    /// promotion.
    pub async fn handle_install(&self) {
        self.lifecycle
            .install(precache::run(
                &self.store,
                self.fetcher.as_ref(),
                &self.origin,
                self.names.static_name(),
                &self.manifest,
            ))
            .await;
    }

    /// Activate event: evict stale generations and claim open pages.
    pub async fn handle_activate(&self) {
        self.lifecycle.activate().await;
    }

    /// Message event from a controlled page.
    pub async fn handle_message(&self, payload: serde_json::Value) {
        self.lifecycle.on_message(&payload).await;
    }

    /// Fetch event: respond, or defer to the host's default handling.
    pub async fn handle_fetch(&self, request: &RequestDescriptor) -> FetchDecision {
        self.interceptor.intercept(request).await
    }

    /// Wait for deferred cache refreshes to finish.
    pub async fn settle(&self) {
        self.work.settle().await;
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }
}
