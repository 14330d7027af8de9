//! Events dispatched to the worker and what handling them produced.

use serde::Serialize;

use shellcache_core::{Notification, Request, Response};

/// Kind of a lifecycle or functional event; the dispatch table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Sync,
    Push,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventKind::Install => "install",
            EventKind::Activate => "activate",
            EventKind::Fetch => "fetch",
            EventKind::Sync => "sync",
            EventKind::Push => "push",
        };
        f.write_str(name)
    }
}

/// An event as dispatched by the host.
#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    Sync { tag: String },
    /// `data` is the push payload as text, if the push carried one.
    Push { data: Option<String> },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Install => EventKind::Install,
            Event::Activate => EventKind::Activate,
            Event::Fetch(_) => EventKind::Fetch,
            Event::Sync { .. } => EventKind::Sync,
            Event::Push { .. } => EventKind::Push,
        }
    }
}

/// Policy that produced a fetch response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    /// Non-GET http(s) requests: never read from or written to a cache.
    NetworkOnly,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache_first",
            Strategy::NetworkFirst => "network_first",
            Strategy::NetworkOnly => "network_only",
        }
    }
}

/// Where a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Network,
    Cache,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Network => "network",
            Source::Cache => "cache",
        }
    }
}

/// A response the worker answered a fetch event with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub response: Response,
    pub strategy: Strategy,
    pub source: Source,
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Installed {
        cache: String,
        precached: usize,
        /// Entries stored into the runtime cache; zero unless runtime
        /// precaching is enabled.
        runtime_precached: usize,
    },
    Activated {
        deleted: Vec<String>,
        kept: Vec<String>,
    },
    Responded(FetchResponse),
    /// The request was not intercepted; the host handles it natively.
    PassedThrough,
    Synced {
        tag: String,
        handled: bool,
    },
    Notified(Notification),
    /// No handler is registered for the event kind.
    Unhandled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        assert_eq!(Event::Install.kind(), EventKind::Install);
        assert_eq!(Event::Sync { tag: "x".into() }.kind(), EventKind::Sync);
        assert_eq!(Event::Push { data: None }.kind(), EventKind::Push);
        let fetch = Event::Fetch(Request::parse_get("https://example.com").unwrap());
        assert_eq!(fetch.kind(), EventKind::Fetch);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EventKind::Activate.to_string(), "activate");
    }
}
