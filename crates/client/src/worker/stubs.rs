//! Background sync and push handlers.
//!
//! Neither keeps state or retries: sync only logs, push only shows a
//! notification.

use async_trait::async_trait;

use shellcache_core::{Error, Notification};

use super::{Event, EventHandler, EventKind, EventOutcome, WorkerContext, unexpected};

pub async fn sync(ctx: &WorkerContext, tag: String) -> Result<EventOutcome, Error> {
    let handled = tag == ctx.settings.sync_tag;
    if handled {
        tracing::info!(%tag, "background sync triggered");
    } else {
        tracing::debug!(%tag, "ignoring sync tag");
    }
    Ok(EventOutcome::Synced { tag, handled })
}

/// Show the update notification; the payload text, when present, is the body.
pub async fn push(ctx: &WorkerContext, data: Option<String>) -> Result<EventOutcome, Error> {
    let settings = &ctx.settings;
    let notification = Notification {
        title: settings.notification_title.clone(),
        body: data.unwrap_or_else(|| settings.notification_body.clone()),
        icon: Some(settings.notification_icon.clone()),
        badge: Some(settings.notification_icon.clone()),
    };
    ctx.notifier.show(&notification).await?;
    Ok(EventOutcome::Notified(notification))
}

pub struct SyncHandler;

#[async_trait]
impl EventHandler for SyncHandler {
    async fn handle(&self, ctx: &WorkerContext, event: Event) -> Result<EventOutcome, Error> {
        match event {
            Event::Sync { tag } => sync(ctx, tag).await,
            other => Err(unexpected(EventKind::Sync, &other)),
        }
    }
}

pub struct PushHandler;

#[async_trait]
impl EventHandler for PushHandler {
    async fn handle(&self, ctx: &WorkerContext, event: Event) -> Result<EventOutcome, Error> {
        match event {
            Event::Push { data } => push(ctx, data).await,
            other => Err(unexpected(EventKind::Push, &other)),
        }
    }
}
