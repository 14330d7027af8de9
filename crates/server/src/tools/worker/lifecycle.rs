//! worker_install, worker_activate and worker_status tools.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::{EventOutcome, ServiceWorker};

use crate::tools::{json_result, unexpected_outcome};

/// Output from the worker_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerInstallOutput {
    /// The shell cache that was filled.
    pub cache: String,
    /// Number of shell URLs stored.
    pub precached: usize,
    /// Number of runtime URLs stored (0 unless runtime precaching is enabled).
    pub runtime_precached: usize,
}

/// Output from the worker_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerActivateOutput {
    /// Stale caches that were deleted.
    pub deleted: Vec<String>,
    /// Current caches that were kept.
    pub kept: Vec<String>,
}

/// Output from the worker_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerStatusOutput {
    pub state: String,
    pub skip_waiting: bool,
    pub clients_claimed: bool,
    pub shell_cache: String,
    pub runtime_cache: String,
}

pub async fn install_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    match worker.install().await? {
        EventOutcome::Installed { cache, precached, runtime_precached } => {
            json_result(&WorkerInstallOutput { cache, precached, runtime_precached })
        }
        other => Err(unexpected_outcome("worker_install", &other)),
    }
}

pub async fn activate_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    match worker.activate().await? {
        EventOutcome::Activated { deleted, kept } => json_result(&WorkerActivateOutput { deleted, kept }),
        other => Err(unexpected_outcome("worker_activate", &other)),
    }
}

pub async fn status_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let status = worker.status().await;
    let settings = worker.settings();
    json_result(&WorkerStatusOutput {
        state: status.state.as_str().to_string(),
        skip_waiting: status.skip_waiting,
        clients_claimed: status.clients_claimed,
        shell_cache: settings.shell_cache.clone(),
        runtime_cache: settings.runtime_cache.clone(),
    })
}
