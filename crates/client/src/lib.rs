//! Client code for shellcache.
//!
//! This crate provides the offline caching worker and the concrete host
//! capabilities it runs against: a reqwest network fetcher and notifiers.

pub mod fetch;
pub mod notify;
pub mod worker;

pub use fetch::{FetchConfig, HttpFetcher, ScriptedFetcher, UrlError, canonicalize};
pub use notify::{LogNotifier, RecordingNotifier};
pub use worker::{
    Event, EventHandler, EventKind, EventOutcome, FetchResponse, Route, ServiceWorker, Source, Strategy,
    WorkerContext, WorkerSettings, WorkerState, WorkerStatus,
};
