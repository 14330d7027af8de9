//! cache_list tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::CacheStorage;

use crate::tools::json_result;

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Names of every existing cache, oldest first.
    pub caches: Vec<String>,
}

pub async fn list_impl(storage: &dyn CacheStorage) -> Result<CallToolResult, McpError> {
    let caches = storage.keys().await?;
    json_result(&CacheListOutput { caches })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellcache_core::MemoryCacheStorage;

    #[tokio::test]
    async fn test_list_impl() {
        let storage = MemoryCacheStorage::new();
        storage.open("b").await.unwrap();
        storage.open("a").await.unwrap();

        let out: CacheListOutput = crate::tools::testing::output(&list_impl(&storage).await.unwrap());
        assert_eq!(out.caches, vec!["b".to_string(), "a".to_string()]);
    }

    #[tokio::test]
    async fn test_list_impl_empty() {
        let storage = MemoryCacheStorage::new();
        let out: CacheListOutput = crate::tools::testing::output(&list_impl(&storage).await.unwrap());
        assert!(out.caches.is_empty());
    }
}
