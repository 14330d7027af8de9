//! shellcache server entry point.
//!
//! This is the main binary that hosts the offline cache worker behind an MCP
//! server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shellcache_client::{FetchConfig, HttpFetcher, LogNotifier, ServiceWorker};
use shellcache_core::{AppConfig, CacheStorage, MemoryCacheStorage, SqliteCacheStorage};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    let storage: Arc<dyn CacheStorage> = if config.in_memory() {
        Arc::new(MemoryCacheStorage::new())
    } else {
        Arc::new(SqliteCacheStorage::open(&config.db_path).await?)
    };
    let fetcher = HttpFetcher::new(FetchConfig::from_app(&config))?;
    let fetcher_timeout = fetcher.config().timeout;
    let worker = ServiceWorker::from_config(&config, storage, Arc::new(fetcher), Arc::new(LogNotifier))?;

    tracing::info!(
        origin = %worker.settings().origin,
        shell_cache = %worker.settings().shell_cache,
        runtime_cache = %worker.settings().runtime_cache,
        in_memory = config.in_memory(),
        timeout_ms = fetcher_timeout.as_millis() as u64,
        "Starting shellcache server on stdio transport"
    );

    let handler = handler::ShellcacheServer::new(worker);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
