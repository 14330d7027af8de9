//! Named cache storage.
//!
//! A [`CacheStorage`] holds any number of named caches, each mapping a
//! [`RequestKey`] to a stored [`Response`]. Two backends are provided:
//!
//! - [`MemoryCacheStorage`] for tests and ephemeral runs
//! - [`SqliteCacheStorage`], persistent, via tokio-rusqlite
//!
//! [`Cache`] is a handle to one named cache and applies the request rules
//! (only GET requests are matched or stored).

pub mod connection;
pub mod entries;
pub mod key;
pub mod memory;
pub mod migrations;

use std::sync::Arc;

use async_trait::async_trait;

pub use crate::Error;
use crate::http::{Request, Response};

pub use connection::SqliteCacheStorage;
pub use entries::CachedResponse;
pub use key::RequestKey;
pub use memory::MemoryCacheStorage;

/// Async key-value store of named caches.
///
/// Caches are created lazily by [`open`](CacheStorage::open) or by the first
/// `put` into them, and exist until deleted.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Ensure a cache with this name exists.
    async fn open(&self, name: &str) -> Result<(), Error>;

    async fn has(&self, name: &str) -> Result<bool, Error>;

    /// Delete a cache and all its entries. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Names of all caches, oldest first.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    async fn match_request(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error>;

    /// Store a response, replacing any entry with the same key.
    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> Result<(), Error>;

    /// Store several responses; either all are stored or none are.
    async fn put_all(&self, name: &str, entries: &[(RequestKey, Response)]) -> Result<(), Error>;
}

/// Handle to one named cache.
#[derive(Clone)]
pub struct Cache {
    storage: Arc<dyn CacheStorage>,
    name: String,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Cache {
    /// Open (creating if needed) the cache called `name`.
    pub async fn open(storage: Arc<dyn CacheStorage>, name: &str) -> Result<Self, Error> {
        storage.open(name).await?;
        Ok(Self { storage, name: name.to_string() })
    }

    /// Handle on `name` without creating it; reads from a missing cache miss.
    pub fn existing(storage: Arc<dyn CacheStorage>, name: &str) -> Self {
        Self { storage, name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a stored response. Non-GET requests never match.
    pub async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }
        let entry = self
            .storage
            .match_request(&self.name, &RequestKey::from_request(request))
            .await?;
        Ok(entry.map(|e| e.response))
    }

    /// Store a response for a GET request.
    pub async fn put(&self, request: &Request, response: &Response) -> Result<(), Error> {
        if !request.is_get() {
            return Err(Error::InvalidInput(format!("cannot cache {} request", request.method)));
        }
        self.storage
            .put(&self.name, &RequestKey::from_request(request), response)
            .await
    }

    /// Store a batch of responses atomically.
    pub async fn put_all(&self, entries: &[(Request, Response)]) -> Result<(), Error> {
        if let Some((request, _)) = entries.iter().find(|(r, _)| !r.is_get()) {
            return Err(Error::InvalidInput(format!("cannot cache {} request", request.method)));
        }
        let keyed: Vec<(RequestKey, Response)> = entries
            .iter()
            .map(|(req, resp)| (RequestKey::from_request(req), resp.clone()))
            .collect();
        self.storage.put_all(&self.name, &keyed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> Arc<dyn CacheStorage> {
        Arc::new(MemoryCacheStorage::new())
    }

    #[tokio::test]
    async fn test_open_creates_cache() {
        let storage = storage();
        let cache = Cache::open(storage.clone(), "shell-v1").await.unwrap();
        assert_eq!(cache.name(), "shell-v1");
        assert!(storage.has("shell-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_then_match() {
        let cache = Cache::open(storage(), "shell-v1").await.unwrap();
        let req = Request::parse_get("https://example.com/index.html").unwrap();
        cache.put(&req, &Response::new(200, "hello")).await.unwrap();

        let hit = cache.match_request(&req).await.unwrap().unwrap();
        assert_eq!(hit.text(), "hello");
    }

    #[tokio::test]
    async fn test_non_get_never_matches_or_stores() {
        let cache = Cache::open(storage(), "shell-v1").await.unwrap();
        let url = url::Url::parse("https://example.com/api").unwrap();
        let post = Request::new("POST", url).unwrap();

        assert!(matches!(cache.put(&post, &Response::new(200, "x")).await, Err(Error::InvalidInput(_))));
        assert!(cache.match_request(&post).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_all_rejects_non_get_without_storing() {
        let cache = Cache::open(storage(), "shell-v1").await.unwrap();
        let get = Request::parse_get("https://example.com/a").unwrap();
        let post = Request::new("POST", url::Url::parse("https://example.com/b").unwrap()).unwrap();

        let result = cache
            .put_all(&[(get.clone(), Response::new(200, "a")), (post, Response::new(200, "b"))])
            .await;
        assert!(result.is_err());
        assert!(cache.match_request(&get).await.unwrap().is_none());
    }
}
