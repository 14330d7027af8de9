//! Request identity used to address cache entries.

use sha2::{Digest, Sha256};
use url::Url;

use crate::http::Request;

/// Identity of a request inside one named cache: method plus URL.
///
/// The fragment is never part of the identity. Host lowercasing and
/// percent-encoding normalization are already done by [`Url`] parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: &str, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self { method: method.to_ascii_uppercase(), url: url.into() }
    }

    pub fn from_request(request: &Request) -> Self {
        Self::new(&request.method, &request.url)
    }

    /// Storage key: hex SHA-256 over `METHOD\nURL`.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.url.as_bytes());
        hex::encode(hasher.finalize())
    }
}
