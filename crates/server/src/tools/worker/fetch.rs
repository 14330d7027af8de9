//! worker_fetch tool implementation.
//!
//! Dispatches a fetch event for a URL, as if a controlled page requested it.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::{EventOutcome, ServiceWorker, canonicalize};
use shellcache_core::{Error, Request};

use crate::tools::{json_result, unexpected_outcome};

/// Input parameters for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Absolute URL, or a path resolved against the worker origin.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests use the caches.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// The canonical request URL.
    pub url: String,
    /// True when the worker did not intercept the request (non-http scheme).
    pub passed_through: bool,
    /// "cache_first", "network_first" or "network_only".
    pub strategy: Option<String>,
    /// "network" or "cache".
    pub source: Option<String>,
    pub status: Option<u16>,
    pub content_type: Option<String>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: Option<String>,
    pub body_bytes: usize,
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl(worker: &ServiceWorker, params: WorkerFetchParams) -> Result<CallToolResult, McpError> {
    let url = canonicalize(&params.url, &worker.settings().origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let request = Request::new(&params.method, url.clone())?;

    let output = match worker.fetch(request).await? {
        EventOutcome::PassedThrough => WorkerFetchOutput {
            url: url.to_string(),
            passed_through: true,
            strategy: None,
            source: None,
            status: None,
            content_type: None,
            headers: Vec::new(),
            body: None,
            body_bytes: 0,
        },
        EventOutcome::Responded(fetched) => WorkerFetchOutput {
            url: url.to_string(),
            passed_through: false,
            strategy: Some(fetched.strategy.as_str().to_string()),
            source: Some(fetched.source.as_str().to_string()),
            status: Some(fetched.response.status),
            content_type: fetched.response.header("content-type").map(str::to_string),
            body: Some(fetched.response.text()),
            body_bytes: fetched.response.body.len(),
            headers: fetched.response.headers,
        },
        other => return Err(unexpected_outcome("worker_fetch", &other)),
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, worker};
    use shellcache_client::ScriptedFetcher;
    use shellcache_core::Response;

    fn params(url: &str) -> WorkerFetchParams {
        WorkerFetchParams { url: url.into(), method: default_method() }
    }

    #[tokio::test]
    async fn test_fetch_relative_url_network_first() {
        let fetcher = ScriptedFetcher::new().with_response(
            "http://localhost:8000/pong-v2/index.html",
            Response::new(200, "<html>pong</html>").with_header("content-type", "text/html"),
        );
        let worker = worker(fetcher);

        let out: WorkerFetchOutput = output(&fetch_impl(&worker, params("/pong-v2/index.html")).await.unwrap());
        assert_eq!(out.url, "http://localhost:8000/pong-v2/index.html");
        assert_eq!(out.strategy.as_deref(), Some("network_first"));
        assert_eq!(out.source.as_deref(), Some("network"));
        assert_eq!(out.status, Some(200));
        assert_eq!(out.content_type.as_deref(), Some("text/html"));
        assert_eq!(out.body.as_deref(), Some("<html>pong</html>"));
        assert_eq!(out.body_bytes, 17);
    }

    #[tokio::test]
    async fn test_fetch_runtime_second_call_from_cache() {
        let url = "https://pygame-web.github.io/archives/0.9/cpython312/main.js";
        let worker = worker(ScriptedFetcher::new().with_response(url, Response::new(200, "js")));

        fetch_impl(&worker, params(url)).await.unwrap();
        let out: WorkerFetchOutput = output(&fetch_impl(&worker, params(url)).await.unwrap());
        assert_eq!(out.strategy.as_deref(), Some("cache_first"));
        assert_eq!(out.source.as_deref(), Some("cache"));
    }

    #[tokio::test]
    async fn test_fetch_passthrough() {
        let worker = worker(ScriptedFetcher::new());
        let out: WorkerFetchOutput = output(&fetch_impl(&worker, params("chrome-extension://abc/x.js")).await.unwrap());
        assert!(out.passed_through);
        assert!(out.status.is_none());
    }

    #[tokio::test]
    async fn test_fetch_offline_without_cache_is_error() {
        let worker = worker(ScriptedFetcher::new());
        let err = fetch_impl(&worker, params("/pong-v2/")).await.unwrap_err();
        assert_eq!(err.code.0, -32008);
    }

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let worker = worker(ScriptedFetcher::new());
        let err = fetch_impl(&worker, params("  ")).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }
}
