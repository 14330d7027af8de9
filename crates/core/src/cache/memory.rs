//! In-memory cache storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheStorage, CachedResponse, RequestKey};
use crate::Error;
use crate::http::Response;

#[derive(Debug, Default)]
struct NamedCache {
    created: u64,
    entries: HashMap<String, CachedResponse>,
}

#[derive(Debug, Default)]
struct Inner {
    caches: HashMap<String, NamedCache>,
    next_seq: u64,
}

impl Inner {
    fn open(&mut self, name: &str) -> &mut NamedCache {
        let next_seq = &mut self.next_seq;
        self.caches.entry(name.to_string()).or_insert_with(|| {
            *next_seq += 1;
            NamedCache { created: *next_seq, entries: HashMap::new() }
        })
    }
}

/// Cache storage held entirely in process memory.
///
/// Uses a HashMap behind a tokio RwLock; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    inner: RwLock<Inner>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in `name`, zero if the cache does not exist.
    pub async fn len(&self, name: &str) -> usize {
        self.inner
            .read()
            .await
            .caches
            .get(name)
            .map_or(0, |c| c.entries.len())
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.inner.write().await.open(name);
        Ok(())
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        Ok(self.inner.read().await.caches.contains_key(name))
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        Ok(self.inner.write().await.caches.remove(name).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        let inner = self.inner.read().await;
        let mut names: Vec<(&String, u64)> = inner.caches.iter().map(|(n, c)| (n, c.created)).collect();
        names.sort_by_key(|(_, created)| *created);
        Ok(names.into_iter().map(|(n, _)| n.clone()).collect())
    }

    async fn match_request(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        let inner = self.inner.read().await;
        Ok(inner
            .caches
            .get(name)
            .and_then(|c| c.entries.get(&key.cache_key()))
            .cloned())
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        let entry = CachedResponse::new(name, key, response.clone());
        self.inner
            .write()
            .await
            .open(name)
            .entries
            .insert(key.cache_key(), entry);
        Ok(())
    }

    async fn put_all(&self, name: &str, entries: &[(RequestKey, Response)]) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        let cache = inner.open(name);
        for (key, response) in entries {
            cache
                .entries
                .insert(key.cache_key(), CachedResponse::new(name, key, response.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn key(url: &str) -> RequestKey {
        RequestKey::new("GET", &Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn test_keys_in_creation_order() {
        let storage = MemoryCacheStorage::new();
        storage.open("b").await.unwrap();
        storage.open("a").await.unwrap();
        storage.open("b").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["b".to_string(), "a".to_string()]);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let storage = MemoryCacheStorage::new();
        let k = key("https://example.com/");
        storage.put("c", &k, &Response::new(200, "old")).await.unwrap();
        storage.put("c", &k, &Response::new(200, "new")).await.unwrap();

        let hit = storage.match_request("c", &k).await.unwrap().unwrap();
        assert_eq!(hit.response.text(), "new");
        assert_eq!(storage.len("c").await, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_entries() {
        let storage = MemoryCacheStorage::new();
        let k = key("https://example.com/");
        storage.put("c", &k, &Response::new(200, "x")).await.unwrap();

        assert!(storage.delete("c").await.unwrap());
        assert!(!storage.delete("c").await.unwrap());
        assert!(!storage.has("c").await.unwrap());
        assert!(storage.match_request("c", &k).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_caches_are_isolated() {
        let storage = MemoryCacheStorage::new();
        let k = key("https://example.com/");
        storage.put("one", &k, &Response::new(200, "x")).await.unwrap();
        assert!(storage.match_request("two", &k).await.unwrap().is_none());
    }
}
