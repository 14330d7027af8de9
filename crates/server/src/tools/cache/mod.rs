//! Cache-related MCP tools.
//!
//! This module provides read-only views of the worker's named caches.

pub mod get;
pub mod list;

pub use get::{CacheGetParams, get_impl};
pub use list::list_impl;
