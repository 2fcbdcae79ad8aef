//! HTTP CalDAV client configuration.

use std::time::Duration;

use davhome_core::ServerEndpoint;
use url::Url;

use crate::error::{DavError, DavResult};

/// Configuration for [`HttpDavClient`](super::HttpDavClient).
#[derive(Debug, Clone)]
pub struct CalDavConfig {
    /// Server root URL.
    pub url: Url,

    /// Username for authentication.
    pub username: Option<String>,

    /// Password for authentication.
    pub password: Option<String>,

    /// Whether to verify TLS certificates.
    pub verify_tls: bool,

    /// Request timeout. Expiry is reported as a connection error.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl CalDavConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a new configuration for the given server URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(url.as_ref().trim())?;
        Ok(Self {
            url: parsed,
            username: None,
            password: None,
            verify_tls: true,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("davhome/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Builds a configuration from a server endpoint.
    ///
    /// An unparsable URL is an [`Internal`](crate::error::DavErrorKind::Internal)
    /// error: no request was ever sent.
    pub fn from_endpoint(endpoint: &ServerEndpoint) -> DavResult<Self> {
        let config = Self::new(&endpoint.base_url).map_err(|e| {
            DavError::internal(format!("invalid server URL `{}`", endpoint.base_url))
                .with_source(e)
        })?;

        let config = config.with_credentials(&endpoint.username, &endpoint.password);
        Ok(if endpoint.verify_tls {
            config
        } else {
            config.with_insecure_tls()
        })
    }

    /// Sets the credentials for authentication.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Disables TLS verification.
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL as a string.
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DavErrorKind;

    #[test]
    fn config_defaults() {
        let config = CalDavConfig::new("https://cal.example.com/").unwrap();
        assert_eq!(config.url_str(), "https://cal.example.com/");
        assert!(config.username.is_none());
        assert!(config.password.is_none());
        assert!(config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("davhome/"));
    }

    #[test]
    fn config_from_endpoint() {
        let endpoint =
            ServerEndpoint::new("https://cal.example.com", "alice", "secret").with_verify_tls(false);
        let config = CalDavConfig::from_endpoint(&endpoint).unwrap();

        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert!(!config.verify_tls);
    }

    #[test]
    fn empty_password_still_counts_as_credentials() {
        let endpoint = ServerEndpoint::new("https://cal.example.com", "alice", "");
        let config = CalDavConfig::from_endpoint(&endpoint).unwrap();
        assert_eq!(config.password.as_deref(), Some(""));
    }

    #[test]
    fn invalid_endpoint_url_is_internal() {
        let endpoint = ServerEndpoint::new("not a url", "alice", "secret");
        let err = CalDavConfig::from_endpoint(&endpoint).unwrap_err();
        assert_eq!(err.kind(), &DavErrorKind::Internal);
    }

    #[test]
    fn builder_methods() {
        let config = CalDavConfig::new("https://cal.example.com/")
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .with_insecure_tls();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.verify_tls);
    }
}
