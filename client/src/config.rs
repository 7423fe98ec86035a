//! Client configuration

use std::time::Duration;

/// Default request timeout, applied to every call including refresh
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the DF Messenger API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL the API routes are mounted under
    pub base_url: String,

    /// Timeout for a single HTTP request
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8080"),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("DFM_API_BASE_URL").unwrap_or(defaults.base_url);
        let request_timeout = std::env::var("DFM_API_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            base_url,
            request_timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Absolute URL of an API path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = ClientConfig::new("https://api.example.com/");
        assert_eq!(config.url("/user/refresh"), "https://api.example.com/user/refresh");
        assert_eq!(config.url("auth/login"), "https://api.example.com/auth/login");
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(ClientConfig::default().request_timeout, Duration::from_secs(10));
    }
}
