//! Static generation provisioning at install time.

use haven_client::{Fetch, OriginFilter};
use haven_core::CacheStore;

/// Assets fetched into the static generation during install, relative
/// to the serving origin. Ordered; immutable for the process lifetime.
pub const PRECACHE_MANIFEST: &[&str] = &[
    "./",
    "./index.html",
    "./manifest.webmanifest",
    "./icons/icon-180.png",
    "./icons/icon-192.png",
    "./icons/icon-512.png",
];

/// Fill the static generation from the manifest.
///
/// Each asset is fetched with intermediary caches told to revalidate,
/// and stored only when the response status is OK. A failure on one
/// asset (unresolvable entry, network error, non-OK status, store
/// error) skips that asset; the batch itself always completes, so a
/// partially filled precache never blocks installation.
pub async fn run(
    store: &CacheStore,
    fetcher: &dyn Fetch,
    origin: &OriginFilter,
    generation_name: &str,
    manifest: &[String],
) {
    let generation = match store.open(generation_name).await {
        Ok(generation) => generation,
        Err(e) => {
            tracing::warn!("precache skipped entirely, cannot open {generation_name}: {e}");
            return;
        }
    };

    for entry in manifest {
        let url = match origin.resolve(entry) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("precache skipped {entry}: {e}");
                continue;
            }
        };

        match fetcher.fetch_fresh(&url).await {
            Ok(response) if response.is_ok() => {
                if let Err(e) = generation.put(&url, &response.to_stored()).await {
                    tracing::warn!("precache store failed for {url}: {e}");
                }
            }
            Ok(response) => {
                tracing::warn!("precache skipped {url}: status {}", response.status);
            }
            Err(e) => {
                tracing::warn!("precache fetch failed for {url}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use haven_client::{FetchedResponse, Visibility};
    use haven_core::{Error, MatchOptions, RequestDescriptor};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeFetch {
        responses: Mutex<HashMap<String, FetchedResponse>>,
        calls: AtomicUsize,
    }

    impl FakeFetch {
        fn new() -> Self {
            Self { responses: Mutex::new(HashMap::new()), calls: AtomicUsize::new(0) }
        }

        fn respond(&self, url: &str, status: u16, body: &str) {
            let response = FetchedResponse {
                status,
                headers: vec![("content-type".into(), "text/html".into())],
                body: Bytes::from(body.to_string()),
                visibility: Visibility::Visible,
                fetch_ms: 1,
            };
            self.responses.lock().unwrap().insert(url.to_string(), response);
        }

        fn resolve(&self, url: &str) -> Result<FetchedResponse, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Network("offline".into()))
        }
    }

    #[async_trait]
    impl Fetch for FakeFetch {
        async fn fetch(&self, request: &RequestDescriptor) -> Result<FetchedResponse, Error> {
            self.resolve(&request.url)
        }

        async fn fetch_fresh(&self, url: &str) -> Result<FetchedResponse, Error> {
            self.resolve(url)
        }
    }

    fn manifest(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|e| e.to_string()).collect()
    }

    #[tokio::test]
    async fn test_precache_fills_static_generation() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let origin = OriginFilter::new("https://app.example.com").unwrap();
        let fetcher = FakeFetch::new();
        fetcher.respond("https://app.example.com/", 200, "<html>root</html>");
        fetcher.respond("https://app.example.com/index.html", 200, "<html>app</html>");

        run(&store, &fetcher, &origin, "haven-static-v1", &manifest(&["./", "./index.html"])).await;

        let found = store
            .lookup("https://app.example.com/index.html", MatchOptions::default())
            .await
            .unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().body, Bytes::from("<html>app</html>"));
    }

    #[tokio::test]
    async fn test_missing_asset_does_not_abort_batch() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let origin = OriginFilter::new("https://app.example.com").unwrap();
        let fetcher = FakeFetch::new();
        // "./index.html" has no scripted response and fails as offline.
        fetcher.respond("https://app.example.com/app.css", 200, "body{}");

        run(
            &store,
            &fetcher,
            &origin,
            "haven-static-v1",
            &manifest(&["./index.html", "./app.css"]),
        )
        .await;

        assert!(
            store
                .lookup("https://app.example.com/index.html", MatchOptions::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .lookup("https://app.example.com/app.css", MatchOptions::default())
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_non_ok_status_is_not_stored() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let origin = OriginFilter::new("https://app.example.com").unwrap();
        let fetcher = FakeFetch::new();
        fetcher.respond("https://app.example.com/index.html", 404, "not here");

        run(&store, &fetcher, &origin, "haven-static-v1", &manifest(&["./index.html"])).await;

        assert!(
            store
                .lookup("https://app.example.com/index.html", MatchOptions::default())
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_manifest_constant_is_same_origin_relative() {
        let origin = OriginFilter::new("https://app.example.com").unwrap();
        for entry in PRECACHE_MANIFEST {
            let url = origin.resolve(entry).unwrap();
            assert!(origin.matches(&url), "{entry} resolved off-origin");
        }
    }
}
