//! Probe command: connectivity and credential check.

use davhome_core::{EndpointIdentity, ProbeOutcome, ServerEndpoint};
use serde::Serialize;

use crate::error::ClientResult;
use crate::setup::{FormError, SetupDecision, form_error, setup_decision};

/// What `davhome probe` prints.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub server: String,
    pub outcome: ProbeOutcome,
    pub decision: SetupDecision,
    pub form_error: Option<FormError>,
}

impl ProbeReport {
    pub fn new(identity: &EndpointIdentity, outcome: ProbeOutcome) -> Self {
        Self {
            server: identity.to_string(),
            decision: setup_decision(&outcome),
            form_error: form_error(&outcome),
            outcome,
        }
    }

    /// Renders the report for a terminal.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "server:   {}\noutcome:  {}\nsetup:    {}",
            self.server, self.outcome, self.decision
        );
        if let Some(error) = self.form_error {
            out.push_str(&format!("\nform:     {}", error));
        }
        out
    }
}

/// Probes the endpoint and prints the report.
pub async fn run(endpoint: &ServerEndpoint, json: bool) -> ClientResult<ProbeOutcome> {
    let outcome = davhome_caldav::probe_endpoint(endpoint).await;
    let report = ProbeReport::new(&endpoint.identity(), outcome.clone());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_text());
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use davhome_core::NotReadyReason;

    fn identity() -> EndpointIdentity {
        ServerEndpoint::new("https://cal.example.com/", "alice", "").identity()
    }

    #[test]
    fn text_report_for_success_has_no_form_error() {
        let report = ProbeReport::new(&identity(), ProbeOutcome::Ok);
        assert_eq!(
            report.render_text(),
            "server:   alice @ https://cal.example.com\noutcome:  ok\nsetup:    ready"
        );
    }

    #[test]
    fn text_report_for_connection_error() {
        let report = ProbeReport::new(
            &identity(),
            ProbeOutcome::NotReady(NotReadyReason::ConnectionError),
        );
        assert_eq!(
            report.render_text(),
            "server:   alice @ https://cal.example.com\n\
             outcome:  not ready: connection-error\n\
             setup:    retry-later\n\
             form:     cannot_connect"
        );
    }

    #[test]
    fn json_report() {
        let report = ProbeReport::new(&identity(), ProbeOutcome::AuthFailed);
        insta::assert_json_snapshot!(report, @r#"
        {
          "server": "alice @ https://cal.example.com",
          "outcome": {
            "status": "auth-failed"
          },
          "decision": "reauth-required",
          "form_error": "invalid_auth"
        }
        "#);
    }
}
