//! Fetch interception: route selection and the two caching strategies.

use async_trait::async_trait;

use shellcache_core::{Cache, Error, Request, Response};

use super::{Event, EventHandler, EventKind, EventOutcome, FetchResponse, Source, Strategy, WorkerContext, unexpected};
use crate::worker::WorkerSettings;

/// How a fetch event is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not http(s): the host handles the request itself.
    PassThrough,
    CacheFirst,
    NetworkFirst,
    NetworkOnly,
}

impl Route {
    pub fn select(settings: &WorkerSettings, request: &Request) -> Self {
        if !request.is_http() {
            return Route::PassThrough;
        }
        if !request.is_get() {
            return Route::NetworkOnly;
        }
        match request.url.host_str() {
            Some(host) if host.eq_ignore_ascii_case(&settings.runtime_host) => Route::CacheFirst,
            _ => Route::NetworkFirst,
        }
    }
}

fn network(response: Response, strategy: Strategy) -> FetchResponse {
    FetchResponse { response, strategy, source: Source::Network }
}

fn cached(response: Response, strategy: Strategy) -> FetchResponse {
    FetchResponse { response, strategy, source: Source::Cache }
}

/// Open `name` and store `response` for `request`.
async fn store(ctx: &WorkerContext, name: &str, request: &Request, response: &Response) -> Result<(), Error> {
    Cache::open(ctx.storage.clone(), name).await?.put(request, response).await
}

/// Serve from the runtime cache, filling it from the network on a miss.
///
/// Only status 200 is stored. Concurrent misses for the same request each
/// fetch and store; the last write wins. A cache that cannot be read or
/// written never fails a request the network can answer.
pub async fn cache_first(ctx: &WorkerContext, request: &Request) -> Result<FetchResponse, Error> {
    let runtime_cache = &ctx.settings.runtime_cache;

    match Cache::existing(ctx.storage.clone(), runtime_cache).match_request(request).await {
        Ok(Some(hit)) => {
            tracing::debug!(path = request.url.path(), "serving from cache");
            return Ok(cached(hit, Strategy::CacheFirst));
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(url = %request.url, error = %e, "runtime cache lookup failed"),
    }

    tracing::debug!(path = request.url.path(), "fetching and caching");
    let response = ctx.fetcher.fetch(request).await?;

    if response.status == 200
        && let Err(e) = store(ctx, runtime_cache, request, &response).await
    {
        tracing::warn!(url = %request.url, error = %e, "failed to cache runtime response");
    }

    Ok(network(response, Strategy::CacheFirst))
}

/// Prefer the network, refreshing the shell cache; fall back to the shell
/// cache when the network fails.
///
/// Only network errors fall back. A network failure with no cached entry is
/// returned unchanged.
pub async fn network_first(ctx: &WorkerContext, request: &Request) -> Result<FetchResponse, Error> {
    let shell_cache = &ctx.settings.shell_cache;

    match ctx.fetcher.fetch(request).await {
        Ok(response) => {
            if response.status == 200
                && let Err(e) = store(ctx, shell_cache, request, &response).await
            {
                tracing::warn!(url = %request.url, error = %e, "failed to cache shell response");
            }
            Ok(network(response, Strategy::NetworkFirst))
        }
        Err(err) if !err.is_network() => Err(err),
        Err(network_err) => {
            // Looking up must not create the cache.
            let cache = Cache::existing(ctx.storage.clone(), shell_cache);
            match cache.match_request(request).await {
                Ok(Some(hit)) => {
                    tracing::debug!(url = %request.url, error = %network_err, "network failed, serving from cache");
                    Ok(cached(hit, Strategy::NetworkFirst))
                }
                Ok(None) => Err(network_err),
                Err(cache_err) => {
                    tracing::warn!(url = %request.url, error = %cache_err, "cache fallback failed");
                    Err(network_err)
                }
            }
        }
    }
}

/// Handle one fetch event.
pub async fn fetch(ctx: &WorkerContext, request: Request) -> Result<EventOutcome, Error> {
    let response = match Route::select(&ctx.settings, &request) {
        Route::PassThrough => {
            tracing::debug!(scheme = request.url.scheme(), "not intercepting");
            return Ok(EventOutcome::PassedThrough);
        }
        Route::CacheFirst => cache_first(ctx, &request).await?,
        Route::NetworkFirst => network_first(ctx, &request).await?,
        Route::NetworkOnly => network(ctx.fetcher.fetch(&request).await?, Strategy::NetworkOnly),
    };
    Ok(EventOutcome::Responded(response))
}

pub struct FetchHandler;

#[async_trait]
impl EventHandler for FetchHandler {
    async fn handle(&self, ctx: &WorkerContext, event: Event) -> Result<EventOutcome, Error> {
        match event {
            Event::Fetch(request) => fetch(ctx, request).await,
            other => Err(unexpected(EventKind::Fetch, &other)),
        }
    }
}
