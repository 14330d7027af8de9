//! worker_sync and worker_push tools.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::{EventOutcome, ServiceWorker};

use crate::tools::{json_result, unexpected_outcome};

/// Parameters for the worker_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerSyncParams {
    /// Background sync tag.
    pub tag: String,
}

/// Output from the worker_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerSyncOutput {
    pub tag: String,
    /// Whether the tag is one the worker acts on.
    pub handled: bool,
}

/// Parameters for the worker_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkerPushParams {
    /// Push payload text; becomes the notification body.
    #[serde(default)]
    pub data: Option<String>,
}

pub async fn sync_impl(worker: &ServiceWorker, params: WorkerSyncParams) -> Result<CallToolResult, McpError> {
    match worker.sync(params.tag).await? {
        EventOutcome::Synced { tag, handled } => json_result(&WorkerSyncOutput { tag, handled }),
        other => Err(unexpected_outcome("worker_sync", &other)),
    }
}

/// Returns the notification that was shown.
pub async fn push_impl(worker: &ServiceWorker, params: WorkerPushParams) -> Result<CallToolResult, McpError> {
    match worker.push(params.data).await? {
        EventOutcome::Notified(notification) => json_result(&notification),
        other => Err(unexpected_outcome("worker_push", &other)),
    }
}
