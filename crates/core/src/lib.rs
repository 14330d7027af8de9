//! Core types and shared functionality for shellcache.
//!
//! This crate provides:
//! - Named cache storage with in-memory and SQLite backends
//! - Request/response model and host capability traits
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod capability;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{Cache, CacheStorage, CachedResponse, MemoryCacheStorage, RequestKey, SqliteCacheStorage};
pub use capability::{Fetcher, Notification, Notifier};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{Request, Response};
