//! Request and response model shared by the worker and its capabilities.

use bytes::Bytes;
use url::Url;

use crate::Error;

/// RFC 7230 `tchar`: the characters allowed in a method token.
fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// A request as seen by the fetch interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-cased HTTP method.
    pub method: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Build a request with an arbitrary method.
    ///
    /// The method is upper-cased; an empty or non-token method is rejected.
    pub fn new(method: &str, url: Url) -> Result<Self, Error> {
        let method = method.trim();
        if method.is_empty() || !method.bytes().all(is_tchar) {
            return Err(Error::InvalidInput(format!("invalid method: {method:?}")));
        }
        Ok(Self { method: method.to_ascii_uppercase(), url, headers: Vec::new() })
    }

    /// Shorthand for a plain GET.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".to_string(), url, headers: Vec::new() }
    }

    /// Parse `url` and build a GET.
    pub fn parse_get(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self::get(url))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Whether the URL scheme is http or https.
    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }
}

/// A response produced by the network or read back from a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 2xx status, the condition the host applies when adding a batch.
    pub fn is_ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_new_uppercases_method() {
        let req = Request::new("post", Url::parse("https://example.com").unwrap()).unwrap();
        assert_eq!(req.method, "POST");
        assert!(!req.is_get());
    }

    #[test]
    fn test_request_new_accepts_token_methods() {
        let url = Url::parse("https://example.com").unwrap();
        assert_eq!(Request::new("M-SEARCH", url.clone()).unwrap().method, "M-SEARCH");
        assert_eq!(Request::new("x_custom.v2", url).unwrap().method, "X_CUSTOM.V2");
    }

    #[test]
    fn test_request_new_rejects_bad_method() {
        let url = Url::parse("https://example.com").unwrap();
        assert!(matches!(Request::new("", url.clone()), Err(Error::InvalidInput(_))));
        assert!(matches!(Request::new("GE T", url.clone()), Err(Error::InvalidInput(_))));
        assert!(matches!(Request::new("GET(1)", url), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_request_is_http() {
        assert!(Request::parse_get("http://example.com").unwrap().is_http());
        assert!(Request::parse_get("https://example.com").unwrap().is_http());
        assert!(!Request::parse_get("chrome-extension://abc/page.js").unwrap().is_http());
        assert!(!Request::parse_get("data:text/plain,hi").unwrap().is_http());
    }

    #[test]
    fn test_parse_get_invalid() {
        assert!(matches!(Request::parse_get("not a url"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_response_is_ok() {
        assert!(Response::new(200, "").is_ok());
        assert!(Response::new(204, "").is_ok());
        assert!(!Response::new(304, "").is_ok());
        assert!(!Response::new(404, "").is_ok());
    }

    #[test]
    fn test_response_header_case_insensitive() {
        let resp = Response::new(200, "x").with_header("Content-Type", "text/html");
        assert_eq!(resp.header("content-type"), Some("text/html"));
        assert_eq!(resp.header("etag"), None);
    }
}
