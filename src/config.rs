//! Client configuration types.

use crate::errors::{MedianaError, Result};
use std::time::Duration;
use url::Url;

/// Default Mediana SMS API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.mediana.ir/sms/v1/";

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("mediana-sms-rust/", env!("CARGO_PKG_VERSION"));

/// Configuration for the Mediana client.
///
/// No timeout is applied by default: deadlines belong to the caller, either
/// through a cancellation token or by opting into a transport timeout here.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is resolved against.
    pub base_url: String,
    /// Total timeout applied by the HTTP client to each request.
    pub timeout: Option<Duration>,
    /// Timeout for establishing a connection.
    pub connect_timeout: Option<Duration>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            connect_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for ClientConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mediana_sms::ClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::builder()
    ///     .base_url("https://sandbox.example.com/sms/v1")
    ///     .timeout(Duration::from_secs(10))
    ///     .build();
    ///
    /// assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    /// ```
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Create a new config with a custom base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create a new config with a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create a new config with a connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Create a new config with a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Parse and normalize the base URL.
    ///
    /// The result always ends with `/` so that relative endpoint paths are
    /// appended to it instead of replacing its last segment.
    pub(crate) fn parsed_base_url(&self) -> Result<Url> {
        let invalid = |reason: &str| MedianaError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: reason.to_string(),
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed"));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL.
    ///
    /// Default: [`DEFAULT_BASE_URL`]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set a total timeout for each request.
    ///
    /// Default: none
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set a timeout for establishing connections.
    ///
    /// Default: none
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the `User-Agent` header.
    ///
    /// Default: [`DEFAULT_USER_AGENT`]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the ClientConfig.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.timeout.is_none());
        assert!(config.connect_timeout.is_none());
        assert!(config.user_agent.starts_with("mediana-sms-rust/"));
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:8080")
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("my-app/1.0")
            .build();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent, "my-app/1.0");
    }

    #[test]
    fn test_config_with_methods() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:1")
            .with_timeout(Duration::from_secs(1));

        assert_eq!(config.base_url, "http://localhost:1");
        assert_eq!(config.timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = ClientConfig::default()
            .with_base_url("https://api.example.com/sms/v1")
            .parsed_base_url()
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/sms/v1/");
        assert_eq!(
            url.join("send/sms").unwrap().as_str(),
            "https://api.example.com/sms/v1/send/sms"
        );

        let url = ClientConfig::default()
            .with_base_url("http://127.0.0.1:9000")
            .parsed_base_url()
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn test_invalid_base_urls() {
        for base_url in ["not a url", "ftp://example.com/", "https://example.com/?key=1"] {
            let result = ClientConfig::default()
                .with_base_url(base_url)
                .parsed_base_url();
            assert!(
                matches!(result, Err(MedianaError::InvalidBaseUrl { .. })),
                "{base_url} should be rejected"
            );
        }
    }
}
