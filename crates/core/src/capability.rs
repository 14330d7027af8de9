//! Host capabilities consumed by the worker.
//!
//! The cache store lives in [`crate::cache`]; the network and notification
//! capabilities are defined here and implemented in `shellcache-client`.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::http::{Request, Response};

/// Performs network requests.
///
/// Any HTTP status is a successful fetch; `Err` means no response was
/// produced at all and should be [`Error::Network`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
}

/// Displays notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), Error>;
}
