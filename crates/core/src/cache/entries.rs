//! Generation entry operations.
//!
//! Lookups search every generation in creation order, oldest first,
//! the way a browser cache registry resolves a match across its named
//! caches. Writes go through a [`Generation`] handle and replace any
//! existing entry for the same URL.

use super::connection::CacheStore;
use crate::{Error, StoredResponse};
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Options controlling how a lookup key is compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    /// Compare URLs with the query string removed, tolerating
    /// cache-busting parameters on subresource URLs.
    pub ignore_query: bool,
}

/// Handle to one named generation.
#[derive(Clone, Debug)]
pub struct Generation {
    store: CacheStore,
    name: String,
}

/// `url` with its query string removed; unparseable URLs pass through
/// unchanged and only ever match exactly.
fn strip_query(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.into()
        }
        Err(_) => url.to_string(),
    }
}

impl CacheStore {
    /// Open a generation by name, creating it if absent.
    pub async fn open(&self, name: &str) -> Result<Generation, Error> {
        let owned = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![owned, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(Generation { store: self.clone(), name: name.to_string() })
    }

    /// Find a stored response for `url` across all generations.
    ///
    /// Generations are searched oldest first; within a generation the
    /// oldest matching entry wins. Exact URL comparison by default,
    /// query-insensitive when [`MatchOptions::ignore_query`] is set.
    pub async fn lookup(&self, url: &str, options: MatchOptions) -> Result<Option<StoredResponse>, Error> {
        let key = if options.ignore_query { strip_query(url) } else { url.to_string() };
        let column = if options.ignore_query { "url_stripped" } else { "url" };
        let sql = format!(
            "SELECT e.status, e.headers, e.body
             FROM entries e JOIN generations g ON g.name = e.generation
             WHERE e.{column} = ?1
             ORDER BY g.rowid ASC, e.rowid ASC
             LIMIT 1"
        );

        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(&sql)?;
                let result = stmt.query_row(params![key], |row| {
                    let status: u16 = row.get(0)?;
                    let headers: String = row.get(1)?;
                    let body: Vec<u8> = row.get(2)?;
                    Ok((status, headers, body))
                });

                match result {
                    Ok((status, headers, body)) => {
                        let headers: Vec<(String, String)> =
                            serde_json::from_str(&headers).unwrap_or_default();
                        Ok(Some(StoredResponse { status, headers, body: Bytes::from(body) }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and everything stored in it.
    ///
    /// Returns whether the generation existed.
    pub async fn delete(&self, name: &str) -> Result<bool, Error> {
        let owned = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM generations WHERE name = ?1", params![owned])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all generations, oldest first.
    pub async fn names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY rowid ASC")?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                let mut names = Vec::new();
                for name in rows {
                    names.push(name?);
                }
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }
}

impl Generation {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or replace the entry for `url`.
    ///
    /// A later put for the same URL silently overwrites the earlier one.
    pub async fn put(&self, url: &str, response: &StoredResponse) -> Result<(), Error> {
        let generation = self.name.clone();
        let url = url.to_string();
        let url_stripped = strip_query(&url);
        let status = response.status;
        let headers = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("unencodable headers: {e}")))?;
        let body = response.body.to_vec();
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.store
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (generation, url, url_stripped, status, headers, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(generation, url) DO UPDATE SET
                        url_stripped = excluded.url_stripped,
                        status = excluded.status,
                        headers = excluded.headers,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![generation, url, url_stripped, status, headers, body, stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(body: &str) -> StoredResponse {
        StoredResponse::new(200, vec![("content-type".into(), "text/css".into())], body.to_string())
    }

    #[tokio::test]
    async fn test_put_and_exact_lookup() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let generation = store.open("planner-runtime-v1").await.unwrap();
        generation
            .put("https://example.com/app.css", &make_response("body{}"))
            .await
            .unwrap();

        let found = store
            .lookup("https://example.com/app.css", MatchOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.status, 200);
        assert_eq!(found.header("content-type"), Some("text/css"));
        assert_eq!(found.body, Bytes::from("body{}"));
    }

    #[tokio::test]
    async fn test_exact_lookup_misses_different_query() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let generation = store.open("planner-runtime-v1").await.unwrap();
        generation
            .put("https://example.com/app.css?v=1", &make_response("body{}"))
            .await
            .unwrap();

        let found = store
            .lookup("https://example.com/app.css?v=2", MatchOptions::default())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_ignore_query_matches_busted_url() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let generation = store.open("planner-runtime-v1").await.unwrap();
        generation
            .put("https://example.com/app.css?v=1", &make_response("body{}"))
            .await
            .unwrap();

        let found = store
            .lookup("https://example.com/app.css?v=2", MatchOptions { ignore_query: true })
            .await
            .unwrap();
        assert!(found.is_some());

        let found = store
            .lookup("https://example.com/app.css", MatchOptions { ignore_query: true })
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_put_overwrites_same_url() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let generation = store.open("planner-runtime-v1").await.unwrap();
        generation
            .put("https://example.com/app.css", &make_response("old"))
            .await
            .unwrap();
        generation
            .put("https://example.com/app.css", &make_response("new"))
            .await
            .unwrap();

        let found = store
            .lookup("https://example.com/app.css", MatchOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.body, Bytes::from("new"));
    }

    #[tokio::test]
    async fn test_lookup_prefers_oldest_generation() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let first = store.open("planner-static-v1").await.unwrap();
        let second = store.open("planner-runtime-v1").await.unwrap();
        first
            .put("https://example.com/index.html", &make_response("precached"))
            .await
            .unwrap();
        second
            .put("https://example.com/index.html", &make_response("runtime"))
            .await
            .unwrap();

        let found = store
            .lookup("https://example.com/index.html", MatchOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.body, Bytes::from("precached"));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_entries() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let generation = store.open("planner-runtime-v1").await.unwrap();
        generation
            .put("https://example.com/app.css", &make_response("body{}"))
            .await
            .unwrap();

        assert!(store.delete("planner-runtime-v1").await.unwrap());
        assert!(!store.delete("planner-runtime-v1").await.unwrap());

        let found = store
            .lookup("https://example.com/app.css", MatchOptions::default())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_names_in_creation_order() {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open("planner-static-v1").await.unwrap();
        store.open("planner-runtime-v1").await.unwrap();
        store.open("planner-static-v1").await.unwrap();

        let names = store.names().await.unwrap();
        assert_eq!(names, vec!["planner-static-v1", "planner-runtime-v1"]);
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://example.com/app.css?v=1"),
            "https://example.com/app.css"
        );
        assert_eq!(strip_query("https://example.com/app.css"), "https://example.com/app.css");
        assert_eq!(strip_query("not a url"), "not a url");
    }
}
