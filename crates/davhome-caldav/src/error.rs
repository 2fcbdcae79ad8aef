//! Error types for CalDAV transport operations.
//!
//! Every failure raised by a [`DavTransport`](crate::transport::DavTransport)
//! carries a typed [`DavErrorKind`]. Discovery code switches on the kind and
//! never inspects the message text.

use std::fmt;
use thiserror::Error;

/// HTTP reason phrase servers send with a 401.
pub const UNAUTHORIZED_REASON: &str = "Unauthorized";

/// The category of a transport error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DavErrorKind {
    /// A metadata query (PROPFIND) was rejected with the given HTTP status.
    Discovery {
        /// HTTP status code returned by the server.
        status: u16,
    },
    /// The server refused access. `reason` is the HTTP reason phrase
    /// (`"Unauthorized"` for a 401, `"Forbidden"` for a 403).
    Authorization {
        /// Reason phrase reported with the refusal.
        reason: String,
    },
    /// DNS, TCP, TLS or timeout failure: no usable HTTP response.
    Connection,
    /// Any other error from the CalDAV client: unexpected status,
    /// unreadable multistatus body, redirect loop.
    Client {
        /// HTTP status code, when a response was received.
        status: Option<u16>,
    },
    /// Outside the transport taxonomy (invalid request construction, bug).
    Internal,
}

impl DavErrorKind {
    /// Returns a short machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery { .. } => "discovery",
            Self::Authorization { .. } => "authorization",
            Self::Connection => "connection",
            Self::Client { .. } => "client",
            Self::Internal => "internal",
        }
    }

    /// Returns the HTTP status attached to this kind, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Discovery { status } => Some(*status),
            Self::Client { status } => *status,
            _ => None,
        }
    }

    /// Returns true for a discovery error coded 400 (Bad Request).
    pub fn is_bad_request_discovery(&self) -> bool {
        matches!(self, Self::Discovery { status: 400 })
    }
}

impl fmt::Display for DavErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery { status } => write!(f, "discovery (HTTP {})", status),
            Self::Authorization { reason } => write!(f, "authorization ({})", reason),
            Self::Client {
                status: Some(status),
            } => write!(f, "client (HTTP {})", status),
            other => f.write_str(other.as_str()),
        }
    }
}

/// An error raised by the CalDAV transport.
#[derive(Debug, Error)]
pub struct DavError {
    /// The error kind.
    kind: DavErrorKind,
    /// A human-readable message describing the error.
    message: String,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DavError {
    /// Creates a new error with the given kind and message.
    pub fn new(kind: DavErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a discovery (PROPFIND-class) error.
    pub fn discovery(status: u16, message: impl Into<String>) -> Self {
        Self::new(DavErrorKind::Discovery { status }, message)
    }

    /// Creates an authorization error carrying the server's reason phrase.
    pub fn authorization(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let message = format!("server refused access: {}", reason);
        Self::new(DavErrorKind::Authorization { reason }, message)
    }

    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(DavErrorKind::Connection, message)
    }

    /// Creates a generic client error.
    pub fn client(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::new(DavErrorKind::Client { status }, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(DavErrorKind::Internal, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &DavErrorKind {
        &self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// A specialized Result type for transport operations.
pub type DavResult<T> = Result<T, DavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_detection() {
        assert!(DavErrorKind::Discovery { status: 400 }.is_bad_request_discovery());
        assert!(!DavErrorKind::Discovery { status: 404 }.is_bad_request_discovery());
        assert!(!DavErrorKind::Client { status: Some(400) }.is_bad_request_discovery());
    }

    #[test]
    fn authorization_keeps_reason() {
        let err = DavError::authorization(UNAUTHORIZED_REASON);
        assert_eq!(
            err.kind(),
            &DavErrorKind::Authorization {
                reason: "Unauthorized".to_string()
            }
        );
        assert!(err.message().contains("Unauthorized"));
    }

    #[test]
    fn status_accessor() {
        assert_eq!(DavErrorKind::Discovery { status: 400 }.status(), Some(400));
        assert_eq!(DavErrorKind::Client { status: None }.status(), None);
        assert_eq!(DavErrorKind::Connection.status(), None);
    }

    #[test]
    fn display_format() {
        let err = DavError::discovery(400, "PROPFIND rejected");
        assert_eq!(err.to_string(), "discovery (HTTP 400): PROPFIND rejected");

        let err = DavError::connection("dns failure");
        assert_eq!(err.to_string(), "connection: dns failure");
    }

    #[test]
    fn error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("reset by peer");
        let err = DavError::connection("request failed").with_source(io_err);
        assert!(err.source().is_some());
    }
}
