//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from, highest precedence first:
//!
//! 1. Environment variables (SHELLCACHE_*)
//! 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The defaults are the Pong AI v2 shell: two versioned caches, the app-shell
//! precache list and the pygame-web runtime assets.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Database path that selects the in-memory cache backend.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database, or `:memory:`.
    ///
    /// Set via SHELLCACHE_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the worker is served from; relative URLs resolve against it.
    ///
    /// Set via SHELLCACHE_ORIGIN.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Version tag of the application-shell cache.
    #[serde(default = "default_shell_cache")]
    pub shell_cache: String,

    /// Version tag of the runtime-asset cache.
    #[serde(default = "default_runtime_cache")]
    pub runtime_cache: String,

    /// Requests to this host are served cache-first from the runtime cache.
    #[serde(default = "default_runtime_host")]
    pub runtime_host: String,

    /// URLs stored unconditionally at install.
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Large runtime assets, cached lazily unless `precache_runtime` is set.
    #[serde(default = "default_runtime_urls")]
    pub runtime_urls: Vec<String>,

    /// Also store `runtime_urls` into the runtime cache at install.
    #[serde(default)]
    pub precache_runtime: bool,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Background sync tag the worker acts on.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    /// Notification body used when a push carries no payload.
    #[serde(default = "default_notification_body")]
    pub notification_body: String,

    /// Icon and badge for push notifications.
    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shellcache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8000".into()
}

fn default_shell_cache() -> String {
    "pong-ai-v2-cache-v1".into()
}

fn default_runtime_cache() -> String {
    "pong-runtime-cache-v1".into()
}

fn default_runtime_host() -> String {
    "pygame-web.github.io".into()
}

fn default_precache_urls() -> Vec<String> {
    [
        "/pong-v2/",
        "/pong-v2/index.html",
        "/pong-v2/game/",
        "/pong-v2/game/index.html",
        "/pong-v2/game/favicon.png",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_runtime_urls() -> Vec<String> {
    [
        "https://pygame-web.github.io/archives/0.9/pythons.js",
        "https://pygame-web.github.io/archives/0.9/cpython312/main.js",
        "https://pygame-web.github.io/archives/0.9/cpython312/main.data",
        "https://pygame-web.github.io/archives/0.9/cpython312/main.wasm",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_user_agent() -> String {
    "shellcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_sync_tag() -> String {
    "sync-game-state".into()
}

fn default_notification_title() -> String {
    "Pong AI v2".into()
}

fn default_notification_body() -> String {
    "New update available!".into()
}

fn default_notification_icon() -> String {
    "/pong-v2/game/favicon.png".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            shell_cache: default_shell_cache(),
            runtime_cache: default_runtime_cache(),
            runtime_host: default_runtime_host(),
            precache_urls: default_precache_urls(),
            runtime_urls: default_runtime_urls(),
            precache_runtime: false,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            sync_tag: default_sync_tag(),
            notification_title: default_notification_title(),
            notification_body: default_notification_body(),
            notification_icon: default_notification_icon(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether the in-memory cache backend was requested.
    pub fn in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY_DB
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed
    /// or validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELLCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHELLCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parsed worker origin.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin).map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Resolve a possibly relative URL against the origin.
    pub fn resolve(&self, field: &str, url: &str) -> Result<Url, ConfigError> {
        self.origin_url()?
            .join(url)
            .map_err(|e| ConfigError::Invalid { field: field.into(), reason: format!("{url}: {e}") })
    }

    /// Precache list resolved against the origin, in declaration order.
    pub fn precache(&self) -> Result<Vec<Url>, ConfigError> {
        self.precache_urls
            .iter()
            .map(|u| self.resolve("precache_urls", u))
            .collect()
    }

    /// Runtime list resolved against the origin, in declaration order.
    pub fn runtime(&self) -> Result<Vec<Url>, ConfigError> {
        self.runtime_urls
            .iter()
            .map(|u| self.resolve("runtime_urls", u))
            .collect()
    }
}
