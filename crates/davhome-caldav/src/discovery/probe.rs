//! Connectivity probing.
//!
//! [`probe`] asks the server "who am I" and classifies the answer into a
//! [`ProbeOutcome`]. The setup path and the interactive connection test both
//! go through it, so identical server behaviour always yields the same
//! outcome.

use davhome_core::{NotReadyReason, ProbeOutcome, ServerEndpoint, UnknownCause};
use tracing::{debug, error, info, warn};

use crate::caldav::HttpDavClient;
use crate::error::{DavError, DavErrorKind, DavResult, UNAUTHORIZED_REASON};
use crate::transport::DavTransport;

/// What a failed principal lookup means for the probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The probe is decided.
    Outcome(ProbeOutcome),
    /// Principal discovery is unsupported; a bare GET decides.
    TryLiveness,
}

/// Classifies a principal-resolution failure.
pub fn classify_principal_error(error: &DavError) -> Classification {
    let outcome = match error.kind() {
        kind if kind.is_bad_request_discovery() => return Classification::TryLiveness,
        DavErrorKind::Authorization { reason } if reason == UNAUTHORIZED_REASON => {
            ProbeOutcome::AuthFailed
        }
        DavErrorKind::Authorization { reason } => {
            ProbeOutcome::Unknown(UnknownCause::AmbiguousAuthorization(reason.clone()))
        }
        DavErrorKind::Connection => ProbeOutcome::NotReady(NotReadyReason::ConnectionError),
        DavErrorKind::Discovery { .. } | DavErrorKind::Client { .. } => {
            ProbeOutcome::NotReady(NotReadyReason::ClientError)
        }
        DavErrorKind::Internal => ProbeOutcome::Unknown(UnknownCause::Unexpected(error.to_string())),
    };
    Classification::Outcome(outcome)
}

/// Classifies the bare GET sent after a rejected principal lookup.
pub fn classify_liveness(result: &DavResult<u16>) -> ProbeOutcome {
    match result {
        Ok(_) => ProbeOutcome::Ok,
        Err(_) => ProbeOutcome::NotReady(NotReadyReason::DiscoveryIncompatible),
    }
}

/// Probes a server through `transport`.
///
/// Read-only: sends at most one principal lookup and one GET.
pub async fn probe(transport: &dyn DavTransport) -> ProbeOutcome {
    let base_url = transport.base_url().as_str();

    let error = match transport.principal().await {
        Ok(principal) => {
            debug!(url = %base_url, principal = %principal.url, "Principal discovery succeeded");
            return ProbeOutcome::Ok;
        }
        Err(e) => e,
    };

    let outcome = match classify_principal_error(&error) {
        Classification::Outcome(outcome) => outcome,
        Classification::TryLiveness => {
            info!(url = %base_url, "Server rejects principal discovery, checking that the root answers");
            let result = transport.request(base_url).await;
            match &result {
                Ok(status) => debug!(url = %base_url, status, "Server root answered"),
                Err(e) => debug!(url = %base_url, error = %e, "Server root did not answer"),
            }
            classify_liveness(&result)
        }
    };

    match &outcome {
        ProbeOutcome::Ok => {}
        ProbeOutcome::AuthFailed => warn!(url = %base_url, "Authentication failed"),
        ProbeOutcome::NotReady(reason) => {
            warn!(
                url = %base_url,
                reason = %reason,
                status = ?error.kind().status(),
                error = %error,
                "Server not ready"
            )
        }
        ProbeOutcome::Unknown(cause) => {
            error!(url = %base_url, cause = %cause, error = ?error, "Unexpected error while probing server")
        }
    }

    outcome
}

/// Builds an HTTP client for `endpoint` and probes it.
pub async fn probe_endpoint(endpoint: &ServerEndpoint) -> ProbeOutcome {
    match HttpDavClient::from_endpoint(endpoint) {
        Ok(client) => probe(&client).await,
        Err(e) => {
            error!(endpoint = %endpoint.identity(), error = %e, "Could not create CalDAV client");
            ProbeOutcome::Unknown(UnknownCause::Unexpected(e.to_string()))
        }
    }
}
