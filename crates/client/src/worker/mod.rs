//! The offline caching worker.
//!
//! ### Events
//! - `install`: precache the app shell ("add all or fail"), skip waiting.
//! - `activate`: delete every cache that is not a current version tag,
//!   claim clients.
//! - `fetch`: cache-first for the runtime-asset host, network-first with
//!   cache fallback for other http(s) requests, pass-through otherwise.
//! - `sync` / `push`: stubs that log or show a notification.
//!
//! ### Dispatch
//! [`ServiceWorker`] keeps an explicit table from [`EventKind`] to
//! [`EventHandler`], built once at construction. Host capabilities (cache
//! storage, network, notifications) are trait objects on [`WorkerContext`].

pub mod event;
pub mod lifecycle;
pub mod strategy;
pub mod stubs;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use shellcache_core::{AppConfig, CacheStorage, ConfigError, Error, Fetcher, Notifier, Request};

pub use event::{Event, EventKind, EventOutcome, FetchResponse, Source, Strategy};
pub use lifecycle::{ActivateHandler, InstallHandler};
pub use strategy::{FetchHandler, Route};
pub use stubs::{PushHandler, SyncHandler};

/// Worker settings resolved from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub origin: Url,
    pub shell_cache: String,
    pub runtime_cache: String,
    pub runtime_host: String,
    pub precache: Vec<Url>,
    pub runtime: Vec<Url>,
    pub precache_runtime: bool,
    pub sync_tag: String,
    pub notification_title: String,
    pub notification_body: String,
    pub notification_icon: String,
}

impl WorkerSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            origin: config.origin_url()?,
            shell_cache: config.shell_cache.clone(),
            runtime_cache: config.runtime_cache.clone(),
            runtime_host: config.runtime_host.to_ascii_lowercase(),
            precache: config.precache()?,
            runtime: config.runtime()?,
            precache_runtime: config.precache_runtime,
            sync_tag: config.sync_tag.clone(),
            notification_title: config.notification_title.clone(),
            notification_body: config.notification_body.clone(),
            notification_icon: config
                .resolve("notification_icon", &config.notification_icon)?
                .to_string(),
        })
    }

    /// Whether `name` is one of the two current version tags.
    pub fn is_current_cache(&self, name: &str) -> bool {
        name == self.shell_cache || name == self.runtime_cache
    }
}

/// Lifecycle position of the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; the previously active worker keeps control.
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub skip_waiting: bool,
    pub clients_claimed: bool,
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self { state: WorkerState::Parsed, skip_waiting: false, clients_claimed: false }
    }
}

/// Capabilities and settings shared by all handlers.
pub struct WorkerContext {
    pub storage: Arc<dyn CacheStorage>,
    pub fetcher: Arc<dyn Fetcher>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: WorkerSettings,
    status: RwLock<WorkerStatus>,
}

impl WorkerContext {
    pub fn new(
        storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>, notifier: Arc<dyn Notifier>,
        settings: WorkerSettings,
    ) -> Self {
        Self { storage, fetcher, notifier, settings, status: RwLock::new(WorkerStatus::default()) }
    }

    pub async fn status(&self) -> WorkerStatus {
        *self.status.read().await
    }

    /// Apply `f` under the status write lock; a check and a transition made
    /// in one call cannot interleave with another event.
    pub(crate) async fn update_status<R>(&self, f: impl FnOnce(&mut WorkerStatus) -> R) -> R {
        let mut status = self.status.write().await;
        let before = status.state;
        let result = f(&mut status);
        if status.state != before {
            tracing::info!(from = ?before, to = ?status.state, "worker state changed");
        }
        result
    }
}

/// Handles one kind of event.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, ctx: &WorkerContext, event: Event) -> Result<EventOutcome, Error>;
}

/// Error for an event routed to a handler of another kind.
pub(crate) fn unexpected(expected: EventKind, event: &Event) -> Error {
    Error::InvalidInput(format!("{expected} handler received {} event", event.kind()))
}

/// The worker: a context plus its event dispatch table.
#[derive(Clone)]
pub struct ServiceWorker {
    ctx: Arc<WorkerContext>,
    handlers: Arc<HashMap<EventKind, Arc<dyn EventHandler>>>,
}

impl ServiceWorker {
    /// Worker with the standard handler for every event kind.
    pub fn new(ctx: WorkerContext) -> Self {
        let mut handlers: HashMap<EventKind, Arc<dyn EventHandler>> = HashMap::new();
        handlers.insert(EventKind::Install, Arc::new(InstallHandler));
        handlers.insert(EventKind::Activate, Arc::new(ActivateHandler));
        handlers.insert(EventKind::Fetch, Arc::new(FetchHandler));
        handlers.insert(EventKind::Sync, Arc::new(SyncHandler));
        handlers.insert(EventKind::Push, Arc::new(PushHandler));
        Self::with_handlers(ctx, handlers)
    }

    /// Worker with an explicit dispatch table.
    pub fn with_handlers(ctx: WorkerContext, handlers: HashMap<EventKind, Arc<dyn EventHandler>>) -> Self {
        Self { ctx: Arc::new(ctx), handlers: Arc::new(handlers) }
    }

    /// Build from configuration and host capabilities.
    pub fn from_config(
        config: &AppConfig, storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>, notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        let settings = WorkerSettings::from_config(config)?;
        Ok(Self::new(WorkerContext::new(storage, fetcher, notifier, settings)))
    }

    pub fn context(&self) -> &WorkerContext {
        &self.ctx
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.ctx.settings
    }

    pub async fn status(&self) -> WorkerStatus {
        self.ctx.status().await
    }

    /// Registered event kinds.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.handlers.keys().copied().collect()
    }

    /// Route an event to its handler.
    pub async fn dispatch(&self, event: Event) -> Result<EventOutcome, Error> {
        let kind = event.kind();
        let Some(handler) = self.handlers.get(&kind) else {
            tracing::debug!(%kind, "no handler registered");
            return Ok(EventOutcome::Unhandled);
        };
        handler.handle(&self.ctx, event).await
    }

    pub async fn install(&self) -> Result<EventOutcome, Error> {
        self.dispatch(Event::Install).await
    }

    pub async fn activate(&self) -> Result<EventOutcome, Error> {
        self.dispatch(Event::Activate).await
    }

    pub async fn fetch(&self, request: Request) -> Result<EventOutcome, Error> {
        self.dispatch(Event::Fetch(request)).await
    }

    pub async fn sync(&self, tag: impl Into<String>) -> Result<EventOutcome, Error> {
        self.dispatch(Event::Sync { tag: tag.into() }).await
    }

    pub async fn push(&self, data: Option<String>) -> Result<EventOutcome, Error> {
        self.dispatch(Event::Push { data }).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::fetch::ScriptedFetcher;
    use crate::notify::RecordingNotifier;
    use shellcache_core::MemoryCacheStorage;

    pub const ORIGIN: &str = "http://localhost:8000";

    pub fn config() -> AppConfig {
        AppConfig { origin: ORIGIN.into(), ..Default::default() }
    }

    /// Test harness: a worker plus concrete handles on its fakes.
    pub struct Harness {
        pub worker: ServiceWorker,
        pub storage: Arc<MemoryCacheStorage>,
        pub fetcher: Arc<ScriptedFetcher>,
        pub notifier: Arc<RecordingNotifier>,
    }

    impl Harness {
        pub fn new(fetcher: ScriptedFetcher) -> Self {
            Self::with_config(&config(), fetcher)
        }

        pub fn with_config(config: &AppConfig, fetcher: ScriptedFetcher) -> Self {
            let storage = Arc::new(MemoryCacheStorage::new());
            let fetcher = Arc::new(fetcher);
            let notifier = Arc::new(RecordingNotifier::new());
            let worker = ServiceWorker::from_config(config, storage.clone(), fetcher.clone(), notifier.clone())
                .expect("valid test config");
            Self { worker, storage, fetcher, notifier }
        }

        pub fn ctx(&self) -> &WorkerContext {
            self.worker.context()
        }
    }

    /// Storage whose writes to chosen caches fail, and optionally every lookup.
    #[derive(Default)]
    pub struct FaultyStorage {
        pub inner: MemoryCacheStorage,
        failing_writes: Vec<String>,
        failing_reads: bool,
    }

    impl FaultyStorage {
        pub fn failing_writes(names: &[&str]) -> Self {
            Self { failing_writes: names.iter().map(|n| n.to_string()).collect(), ..Default::default() }
        }

        pub fn with_failing_reads(mut self) -> Self {
            self.failing_reads = true;
            self
        }

        fn check_write(&self, name: &str) -> Result<(), Error> {
            if self.failing_writes.iter().any(|n| n == name) {
                return Err(Error::CorruptEntry(format!("{name}: disk full")));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CacheStorage for FaultyStorage {
        async fn open(&self, name: &str) -> Result<(), Error> {
            self.check_write(name)?;
            self.inner.open(name).await
        }

        async fn has(&self, name: &str) -> Result<bool, Error> {
            self.inner.has(name).await
        }

        async fn delete(&self, name: &str) -> Result<bool, Error> {
            self.inner.delete(name).await
        }

        async fn keys(&self) -> Result<Vec<String>, Error> {
            self.inner.keys().await
        }

        async fn match_request(
            &self, name: &str, key: &shellcache_core::RequestKey,
        ) -> Result<Option<shellcache_core::CachedResponse>, Error> {
            if self.failing_reads {
                return Err(Error::CorruptEntry(format!("{name}: unreadable")));
            }
            self.inner.match_request(name, key).await
        }

        async fn put(
            &self, name: &str, key: &shellcache_core::RequestKey, response: &shellcache_core::Response,
        ) -> Result<(), Error> {
            self.check_write(name)?;
            self.inner.put(name, key, response).await
        }

        async fn put_all(
            &self, name: &str, entries: &[(shellcache_core::RequestKey, shellcache_core::Response)],
        ) -> Result<(), Error> {
            self.check_write(name)?;
            self.inner.put_all(name, entries).await
        }
    }

    /// Worker over arbitrary storage.
    pub fn worker_over(config: &AppConfig, storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>) -> ServiceWorker {
        ServiceWorker::from_config(config, storage, fetcher, Arc::new(RecordingNotifier::new()))
            .expect("valid test config")
    }

    /// Scripted fetcher answering every default precache URL with 200.
    pub fn shell_fetcher() -> ScriptedFetcher {
        config()
            .precache()
            .unwrap()
            .iter()
            .fold(ScriptedFetcher::new(), |f, url| {
                f.with_response(url.as_str(), shellcache_core::Response::new(200, format!("shell {}", url.path())))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::fetch::ScriptedFetcher;

    #[test]
    fn test_settings_from_config() {
        let settings = WorkerSettings::from_config(&config()).unwrap();
        assert_eq!(settings.precache[0].as_str(), "http://localhost:8000/pong-v2/");
        assert_eq!(settings.notification_icon, "http://localhost:8000/pong-v2/game/favicon.png");
        assert!(settings.is_current_cache("pong-ai-v2-cache-v1"));
        assert!(settings.is_current_cache("pong-runtime-cache-v1"));
        assert!(!settings.is_current_cache("pong-ai-v2-cache-v0"));
    }

    #[tokio::test]
    async fn test_dispatch_table_has_all_kinds() {
        let harness = Harness::new(ScriptedFetcher::new());
        let kinds = harness.worker.kinds();
        for kind in [EventKind::Install, EventKind::Activate, EventKind::Fetch, EventKind::Sync, EventKind::Push] {
            assert!(kinds.contains(&kind), "missing {kind}");
        }
    }

    #[tokio::test]
    async fn test_dispatch_unregistered_kind() {
        let settings = WorkerSettings::from_config(&config()).unwrap();
        let ctx = WorkerContext::new(
            Arc::new(shellcache_core::MemoryCacheStorage::new()),
            Arc::new(ScriptedFetcher::new()),
            Arc::new(crate::notify::RecordingNotifier::new()),
            settings,
        );
        let mut handlers: HashMap<EventKind, Arc<dyn EventHandler>> = HashMap::new();
        handlers.insert(EventKind::Sync, Arc::new(SyncHandler));
        let worker = ServiceWorker::with_handlers(ctx, handlers);

        assert_eq!(worker.push(None).await.unwrap(), EventOutcome::Unhandled);
        assert!(matches!(worker.sync("sync-game-state").await.unwrap(), EventOutcome::Synced { .. }));
    }

    #[tokio::test]
    async fn test_handler_rejects_foreign_event() {
        let harness = Harness::new(ScriptedFetcher::new());
        let result = SyncHandler.handle(harness.ctx(), Event::Install).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_initial_status() {
        let harness = Harness::new(ScriptedFetcher::new());
        assert_eq!(harness.worker.status().await, WorkerStatus::default());
    }
}
