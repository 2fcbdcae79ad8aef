//! Connectivity probe outcomes.
//!
//! A probe ends in exactly one [`ProbeOutcome`]. The outcome carries no retry
//! policy; callers decide what to do with it (see `davhome_client::setup`).

use std::fmt;

use serde::Serialize;

/// Result of probing a CalDAV endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum ProbeOutcome {
    /// The server answered and accepted the credentials.
    Ok,
    /// The server rejected the credentials.
    AuthFailed,
    /// The server cannot be used right now; retry later.
    NotReady(NotReadyReason),
    /// Something the probe does not classify; surface as a generic failure.
    Unknown(UnknownCause),
}

impl ProbeOutcome {
    /// Returns true for [`ProbeOutcome::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns true if only new credentials can fix this outcome.
    pub fn needs_credentials(&self) -> bool {
        matches!(self, Self::AuthFailed)
    }

    /// Returns a short machine-readable status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::AuthFailed => "auth-failed",
            Self::NotReady(_) => "not-ready",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::AuthFailed => write!(f, "authentication failed"),
            Self::NotReady(reason) => write!(f, "not ready: {}", reason),
            Self::Unknown(cause) => write!(f, "unknown: {}", cause),
        }
    }
}

/// Why a server is not usable yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotReadyReason {
    /// Principal discovery was rejected and the server root did not answer either.
    DiscoveryIncompatible,
    /// DNS, TCP, TLS or timeout failure.
    ConnectionError,
    /// The server answered with an error the client could not work with.
    ClientError,
}

impl NotReadyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiscoveryIncompatible => "discovery-incompatible",
            Self::ConnectionError => "connection-error",
            Self::ClientError => "client-error",
        }
    }
}

impl fmt::Display for NotReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detail attached to an unclassified outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownCause {
    /// An authorization error whose reason is not `Unauthorized`, typically a
    /// wrong URL. Not fatal: the user may simply retry.
    AmbiguousAuthorization(String),
    /// An error outside the transport taxonomy.
    Unexpected(String),
}

impl fmt::Display for UnknownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousAuthorization(reason) => {
                write!(f, "authorization error ({})", reason)
            }
            Self::Unexpected(detail) => write!(f, "unexpected error: {}", detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names() {
        assert_eq!(ProbeOutcome::Ok.as_str(), "ok");
        assert_eq!(ProbeOutcome::AuthFailed.as_str(), "auth-failed");
        assert_eq!(
            ProbeOutcome::NotReady(NotReadyReason::ClientError).as_str(),
            "not-ready"
        );
    }

    #[test]
    fn only_auth_failure_needs_credentials() {
        assert!(ProbeOutcome::AuthFailed.needs_credentials());
        assert!(!ProbeOutcome::NotReady(NotReadyReason::ConnectionError).needs_credentials());
        assert!(
            !ProbeOutcome::Unknown(UnknownCause::AmbiguousAuthorization("Forbidden".into()))
                .needs_credentials()
        );
    }

    #[test]
    fn display_includes_reason() {
        let outcome = ProbeOutcome::NotReady(NotReadyReason::DiscoveryIncompatible);
        assert_eq!(outcome.to_string(), "not ready: discovery-incompatible");
    }

    #[test]
    fn serialize_ok() {
        insta::assert_json_snapshot!(ProbeOutcome::Ok, @r#"
        {
          "status": "ok"
        }
        "#);
    }

    #[test]
    fn serialize_not_ready() {
        insta::assert_json_snapshot!(
            ProbeOutcome::NotReady(NotReadyReason::DiscoveryIncompatible),
            @r#"
        {
          "status": "not-ready",
          "reason": "discovery-incompatible"
        }
        "#
        );
    }

    #[test]
    fn serialize_unknown_with_detail() {
        let outcome = ProbeOutcome::Unknown(UnknownCause::AmbiguousAuthorization(
            "Forbidden".to_string(),
        ));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "unknown");
        assert_eq!(json["reason"]["ambiguous-authorization"], "Forbidden");
    }
}
