//! Fetcher that replays canned responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use shellcache_core::{Error, Fetcher, Request, Response};

#[derive(Debug, Clone)]
enum Route {
    Respond(Response),
    Fail(String),
}

/// Fetcher answering from a URL-keyed table and recording every call.
///
/// URLs without a route fail with [`Error::Network`], as does every request
/// while the fetcher is offline.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<Request>>,
    offline: AtomicBool,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`respond`](Self::respond).
    pub fn with_response(mut self, url: &str, response: Response) -> Self {
        self.routes.get_mut().insert(url.to_string(), Route::Respond(response));
        self
    }

    /// Builder form of [`fail`](Self::fail).
    pub fn with_failure(mut self, url: &str, message: &str) -> Self {
        self.routes.get_mut().insert(url.to_string(), Route::Fail(message.to_string()));
        self
    }

    /// Answer `url` with `response` from now on.
    pub async fn respond(&self, url: &str, response: Response) {
        self.routes.lock().await.insert(url.to_string(), Route::Respond(response));
    }

    /// Fail requests for `url` from now on.
    pub async fn fail(&self, url: &str, message: &str) {
        self.routes.lock().await.insert(url.to_string(), Route::Fail(message.to_string()));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Total number of fetches attempted.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Number of fetches attempted for `url`.
    pub async fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().await.iter().filter(|r| r.url.as_str() == url).count()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.lock().await.push(request.clone());

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{}: offline", request.url)));
        }

        match self.routes.lock().await.get(request.url.as_str()) {
            Some(Route::Respond(response)) => Ok(response.clone()),
            Some(Route::Fail(message)) => Err(Error::Network(format!("{}: {message}", request.url))),
            None => Err(Error::Network(format!("{}: no route", request.url))),
        }
    }
}
