//! CalDAV server endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A CalDAV server plus the credentials used to reach it.
///
/// An endpoint is not modified once it has been probed. Re-entering a
/// password (reauth) produces a new endpoint via [`ServerEndpoint::with_password`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    /// Server root URL as entered by the user.
    pub base_url: String,
    /// Username for authentication.
    pub username: String,
    /// Password for authentication (may be empty).
    pub password: String,
    /// Whether to verify TLS certificates.
    pub verify_tls: bool,
}

impl ServerEndpoint {
    /// Creates an endpoint that verifies TLS certificates.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            verify_tls: true,
        }
    }

    /// Builder: set TLS verification.
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Returns a copy of this endpoint with a new password.
    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            ..self.clone()
        }
    }

    /// Returns the identity used to detect duplicate entries.
    pub fn identity(&self) -> EndpointIdentity {
        EndpointIdentity {
            url: self.base_url.trim().trim_end_matches('/').to_string(),
            username: self.username.clone(),
        }
    }
}

impl fmt::Debug for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerEndpoint")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

/// Two endpoints with the same identity point at the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointIdentity {
    /// Base URL without trailing slashes.
    pub url: String,
    /// Username.
    pub username: String,
}

impl fmt::Display for EndpointIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.username, self.url)
    }
}
