//! MCP tool implementations.
//!
//! Worker tools dispatch lifecycle and functional events; cache tools
//! inspect the named caches the worker maintains.

pub mod cache;
pub mod worker;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use shellcache_client::EventOutcome;
use shellcache_core::Error;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Error for an outcome a tool does not expect, e.g. `Unhandled`.
pub(crate) fn unexpected_outcome(tool: &str, outcome: &EventOutcome) -> McpError {
    Error::InvalidInput(format!("{tool}: unexpected outcome {outcome:?}")).into()
}
