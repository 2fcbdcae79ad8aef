//! How a host turns probe outcomes into setup behaviour.
//!
//! A home-automation host probes a server when an entry is set up, when the
//! user submits the connection form, and when credentials are re-entered.
//! All three paths share [`probe`](davhome_caldav::probe); only the
//! presentation differs.

use std::collections::BTreeSet;
use std::fmt;

use davhome_core::{EndpointIdentity, ProbeOutcome, ServerEndpoint, UnknownCause};
use serde::Serialize;

/// What the host does with an entry after probing it at setup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetupDecision {
    /// Load the entry.
    Ready,
    /// Keep the entry and try again later without asking the user.
    RetryLater,
    /// Ask the user for new credentials.
    ReauthRequired,
    /// Setup failed: surface a generic error. The entry is not disabled and
    /// the user may retry.
    Failed,
}

impl SetupDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::RetryLater => "retry-later",
            Self::ReauthRequired => "reauth-required",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SetupDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error key shown on the connection form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormError {
    InvalidAuth,
    CannotConnect,
    Unknown,
}

impl FormError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAuth => "invalid_auth",
            Self::CannotConnect => "cannot_connect",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a probe outcome to the setup-time decision.
pub fn setup_decision(outcome: &ProbeOutcome) -> SetupDecision {
    match outcome {
        ProbeOutcome::Ok => SetupDecision::Ready,
        ProbeOutcome::AuthFailed => SetupDecision::ReauthRequired,
        ProbeOutcome::NotReady(_) => SetupDecision::RetryLater,
        ProbeOutcome::Unknown(_) => SetupDecision::Failed,
    }
}

/// Maps a probe outcome to the form error key, `None` when the form is accepted.
pub fn form_error(outcome: &ProbeOutcome) -> Option<FormError> {
    match outcome {
        ProbeOutcome::Ok => None,
        ProbeOutcome::AuthFailed => Some(FormError::InvalidAuth),
        ProbeOutcome::NotReady(_) => Some(FormError::CannotConnect),
        ProbeOutcome::Unknown(UnknownCause::AmbiguousAuthorization(_)) => {
            Some(FormError::CannotConnect)
        }
        ProbeOutcome::Unknown(UnknownCause::Unexpected(_)) => Some(FormError::Unknown),
    }
}

/// Returns every identity that appears more than once, in sorted order.
pub fn duplicate_identities(
    identities: impl IntoIterator<Item = EndpointIdentity>,
) -> Vec<EndpointIdentity> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for identity in identities {
        if !seen.insert(identity.clone()) {
            duplicates.insert(identity);
        }
    }
    duplicates.into_iter().collect()
}

/// Probes an endpoint again with a re-entered password.
///
/// The original endpoint is left untouched; the returned endpoint should
/// replace it only when the outcome is [`ProbeOutcome::Ok`].
pub async fn reauthenticate(
    endpoint: &ServerEndpoint,
    password: &str,
) -> (ServerEndpoint, ProbeOutcome) {
    let updated = endpoint.with_password(password);
    let outcome = davhome_caldav::probe_endpoint(&updated).await;
    (updated, outcome)
}
