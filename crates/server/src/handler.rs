//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the hosted service worker.
use crate::tools::cache::{CacheGetParams, get_impl, list_impl};
use crate::tools::worker::{
    WorkerFetchParams, WorkerPushParams, WorkerSyncParams, activate_impl, fetch_impl, install_impl, push_impl,
    status_impl, sync_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use shellcache_client::ServiceWorker;

/// The main MCP server handler for shellcache.
#[derive(Clone)]
pub struct ShellcacheServer {
    tool_router: ToolRouter<Self>,
    worker: ServiceWorker,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ShellcacheServer {
    /// Create a new server handler around a configured worker.
    pub fn new(worker: ServiceWorker) -> Self {
        Self { tool_router: Self::tool_router(), worker }
    }

    /// Run the install event: precache the app shell.
    #[tool(description = "Install the worker: fetch every app shell URL and store them atomically in the shell cache.")]
    async fn worker_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Activate the worker: delete every cache whose name is not current and claim clients.")]
    async fn worker_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    /// Route a request through the worker's fetch strategies.
    ///
    /// Runtime-host assets are served cache-first, everything else network-first
    /// with the shell cache as the offline fallback.
    #[tool(
        description = "Dispatch a fetch event. Returns the response with the strategy used and whether it came from the network or the cache."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Dispatch a background sync event with the given tag.")]
    async fn worker_sync(&self, params: Parameters<WorkerSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Dispatch a push event. The payload text becomes the notification body.")]
    async fn worker_push(&self, params: Parameters<WorkerPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Report the worker lifecycle state and its current cache names.")]
    async fn worker_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker).await
    }

    #[tool(description = "List the names of all existing caches, oldest first.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(self.worker.context().storage.as_ref()).await
    }

    /// Read a stored response without touching the network.
    #[tool(description = "Get a stored response from a named cache by URL and method. Fails with CACHE_MISS if absent.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        let ctx = self.worker.context();
        get_impl(ctx.storage.as_ref(), &ctx.settings.origin, params.0).await
    }
}

impl ServerHandler for ShellcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shellcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Offline cache worker for a web game. Call worker_install then worker_activate, then worker_fetch.".into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
