//! Configuration validation rules.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - a cache name is empty, or both names are equal
    /// - `origin` is not an absolute http(s) URL
    /// - a precache or runtime URL does not resolve to http(s)
    /// - `timeout_ms` is outside 100ms..=5 minutes
    /// - `user_agent` or `runtime_host` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shell_cache.trim().is_empty() {
            return Err(invalid("shell_cache", "must not be empty"));
        }
        if self.runtime_cache.trim().is_empty() {
            return Err(invalid("runtime_cache", "must not be empty"));
        }
        if self.shell_cache == self.runtime_cache {
            return Err(invalid("runtime_cache", "must differ from shell_cache"));
        }

        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid("origin", format!("unsupported scheme: {}", origin.scheme())));
        }

        for (field, urls) in [("precache_urls", self.precache()?), ("runtime_urls", self.runtime()?)] {
            if let Some(url) = urls.iter().find(|u| !matches!(u.scheme(), "http" | "https")) {
                return Err(invalid(field, format!("not an http(s) URL: {url}")));
            }
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.runtime_host.is_empty() {
            return Err(invalid("runtime_host", "must not be empty"));
        }

        if self.precache_runtime && self.runtime_urls.is_empty() {
            tracing::warn!("precache_runtime is set but runtime_urls is empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(config: AppConfig) -> String {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_default_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_cache_name() {
        let config = AppConfig { shell_cache: " ".into(), ..Default::default() };
        assert_eq!(invalid_field(config), "shell_cache");
    }

    #[test]
    fn test_validate_same_cache_names() {
        let config = AppConfig { runtime_cache: "pong-ai-v2-cache-v1".into(), ..Default::default() };
        assert_eq!(invalid_field(config), "runtime_cache");
    }

    #[test]
    fn test_validate_bad_origin() {
        let config = AppConfig { origin: "not a url".into(), ..Default::default() };
        assert_eq!(invalid_field(config), "origin");

        let config = AppConfig { origin: "ftp://example.com".into(), ..Default::default() };
        assert_eq!(invalid_field(config), "origin");
    }

    #[test]
    fn test_validate_non_http_precache() {
        let config = AppConfig { precache_urls: vec!["data:text/plain,hi".into()], ..Default::default() };
        assert_eq!(invalid_field(config), "precache_urls");
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(invalid_field(config), "timeout_ms");

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert_eq!(invalid_field(config), "timeout_ms");

        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(invalid_field(config), "user_agent");
    }
}
