//! cache_get tool implementation.
//!
//! Looks up a stored response by cache name and request, without touching
//! the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{CacheStorage, Error, RequestKey};
use url::Url;

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Name of the cache to read.
    pub cache: String,

    /// Absolute URL, or a path resolved against the worker origin.
    pub url: String,

    /// HTTP method of the stored request (default: GET).
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub cache: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
    pub stored_at: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(
    storage: &dyn CacheStorage, origin: &Url, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    let url = shellcache_client::canonicalize(&params.url, origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let key = RequestKey::new(&params.method, &url);

    let entry = storage
        .match_request(&params.cache, &key)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{} {} in {}", key.method, key.url, params.cache)))?;

    json_result(&CacheGetOutput {
        cache: entry.cache,
        method: entry.method,
        url: entry.url,
        status: entry.response.status,
        content_type: entry.response.header("content-type").map(str::to_string),
        body: entry.response.text(),
        body_bytes: entry.response.body.len(),
        headers: entry.response.headers,
        stored_at: entry.stored_at,
    })
}
