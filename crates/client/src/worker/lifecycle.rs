//! Install and activate handlers.

use async_trait::async_trait;
use futures_util::future::try_join_all;
use url::Url;

use shellcache_core::{Cache, Error, Request, Response};

use super::{Event, EventHandler, EventKind, EventOutcome, WorkerContext, WorkerState, unexpected};

/// Fetch every URL; fail unless all respond with an ok status.
async fn fetch_all(ctx: &WorkerContext, urls: &[Url]) -> Result<Vec<(Request, Response)>, Error> {
    let fetches = urls.iter().map(|url| async move {
        let request = Request::get(url.clone());
        let response = ctx
            .fetcher
            .fetch(&request)
            .await
            .map_err(|e| Error::InstallFailed(format!("{url}: {e}")))?;
        if !response.is_ok() {
            return Err(Error::InstallFailed(format!("{url}: status {}", response.status)));
        }
        Ok((request, response))
    });
    try_join_all(fetches).await
}

/// Precache the shell list (and the runtime list when enabled).
///
/// All fetches complete before anything is written, so a failed fetch
/// leaves the caches untouched. The runtime batch is written first, so a
/// failed runtime write leaves no shell precache behind.
pub async fn install(ctx: &WorkerContext) -> Result<EventOutcome, Error> {
    let settings = &ctx.settings;
    ctx.update_status(|s| {
        s.state = WorkerState::Installing;
        s.skip_waiting = true;
    })
    .await;
    tracing::info!(cache = %settings.shell_cache, "precaching app shell");

    let result = async {
        let shell = Cache::open(ctx.storage.clone(), &settings.shell_cache).await?;
        let shell_entries = fetch_all(ctx, &settings.precache).await?;

        let runtime_entries =
            if settings.precache_runtime { Some(fetch_all(ctx, &settings.runtime).await?) } else { None };

        let mut runtime_precached = 0;
        if let Some(entries) = runtime_entries {
            let runtime = Cache::open(ctx.storage.clone(), &settings.runtime_cache).await?;
            runtime.put_all(&entries).await?;
            runtime_precached = entries.len();
        }
        shell.put_all(&shell_entries).await?;

        Ok::<_, Error>((shell_entries.len(), runtime_precached))
    }
    .await;

    match result {
        Ok((precached, runtime_precached)) => {
            ctx.update_status(|s| s.state = WorkerState::Installed).await;
            Ok(EventOutcome::Installed { cache: settings.shell_cache.clone(), precached, runtime_precached })
        }
        Err(e) => {
            tracing::warn!(error = %e, "install failed");
            ctx.update_status(|s| s.state = WorkerState::Redundant).await;
            Err(e)
        }
    }
}

/// Delete caches that are not current version tags, then claim clients.
///
/// Only an installed worker activates (again, if already active). A worker
/// that never installed, or whose install failed, is rejected and every
/// cache is left for the worker still in control.
pub async fn activate(ctx: &WorkerContext) -> Result<EventOutcome, Error> {
    let previous = ctx
        .update_status(|s| {
            let previous = s.state;
            if matches!(previous, WorkerState::Installed | WorkerState::Activated) {
                s.state = WorkerState::Activating;
            }
            previous
        })
        .await;
    if !matches!(previous, WorkerState::Installed | WorkerState::Activated) {
        tracing::warn!(state = previous.as_str(), "refusing to activate");
        return Err(Error::InvalidInput(format!("cannot activate a {} worker", previous.as_str())));
    }

    let cleanup = async {
        let (kept, stale): (Vec<String>, Vec<String>) = ctx
            .storage
            .keys()
            .await?
            .into_iter()
            .partition(|name| ctx.settings.is_current_cache(name));

        try_join_all(stale.iter().map(|name| async move {
            tracing::info!(cache = %name, "deleting old cache");
            ctx.storage.delete(name).await
        }))
        .await?;
        Ok::<_, Error>((kept, stale))
    };

    let (kept, stale) = match cleanup.await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(error = %e, "activate failed");
            ctx.update_status(|s| s.state = previous).await;
            return Err(e);
        }
    };

    ctx.update_status(|s| {
        s.state = WorkerState::Activated;
        s.clients_claimed = true;
    })
    .await;

    Ok(EventOutcome::Activated { deleted: stale, kept })
}

pub struct InstallHandler;

#[async_trait]
impl EventHandler for InstallHandler {
    async fn handle(&self, ctx: &WorkerContext, event: Event) -> Result<EventOutcome, Error> {
        match event {
            Event::Install => install(ctx).await,
            other => Err(unexpected(EventKind::Install, &other)),
        }
    }
}

pub struct ActivateHandler;

#[async_trait]
impl EventHandler for ActivateHandler {
    async fn handle(&self, ctx: &WorkerContext, event: Event) -> Result<EventOutcome, Error> {
        match event {
            Event::Activate => activate(ctx).await,
            other => Err(unexpected(EventKind::Activate, &other)),
        }
    }
}
