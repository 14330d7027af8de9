//! Request URL canonicalization.

use url::Url;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a request target the way a page would resolve it.
///
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references against `base` (the worker origin)
/// 3. Lowercase the host (done by the parser for special schemes)
/// 4. Remove fragment (#...), which never reaches the network
///
/// Any scheme is accepted; non-http(s) targets are passed through by the
/// worker rather than rejected here.
pub fn canonicalize(input: &str, base: &Url) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?
        }
        Err(e) => return Err(UrlError::InvalidUrl(e.to_string())),
    };

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8000/").unwrap()
    }

    #[test]
    fn test_canonicalize_absolute() {
        let url = canonicalize("https://pygame-web.github.io/archives/0.9/pythons.js", &base()).unwrap();
        assert_eq!(url.host_str(), Some("pygame-web.github.io"));
        assert_eq!(url.path(), "/archives/0.9/pythons.js");
    }

    #[test]
    fn test_canonicalize_relative() {
        let url = canonicalize("/pong-v2/index.html", &base()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/pong-v2/index.html");
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://EXAMPLE.COM", &base()).unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("https://example.com/path?q=1#section", &base()).unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("q=1"));
    }

    #[test]
    fn test_canonicalize_trim_whitespace() {
        let url = canonicalize("  https://example.com  ", &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_canonicalize_other_scheme_kept() {
        let url = canonicalize("chrome-extension://abcdef/content.js", &base()).unwrap();
        assert_eq!(url.scheme(), "chrome-extension");
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize("", &base()), Err(UrlError::Empty)));
        assert!(matches!(canonicalize("   ", &base()), Err(UrlError::Empty)));
    }

    #[test]
    fn test_canonicalize_invalid() {
        assert!(matches!(canonicalize("http://[::1", &base()), Err(UrlError::InvalidUrl(_))));
    }
}
