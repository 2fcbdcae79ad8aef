//! Diagnose command: step-by-step discovery report.
//!
//! Runs each discovery step on its own and reports what the server answered,
//! without stopping at the first failure:
//!
//! 1. bare GET on the server root
//! 2. principal discovery
//! 3. calendar listing (principal home, else the fallback scan)
//! 4. supported components of every calendar found

use davhome_caldav::{
    Classification, DavTransport, FallbackTemplates, HttpDavClient, classify_liveness, classify_principal_error, find_calendar_home,
};
use davhome_core::{Calendar, ComponentKind, ProbeOutcome, ServerEndpoint};
use serde::Serialize;
use tracing::debug;

use crate::error::ClientResult;

/// Result of one diagnostic step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "value", rename_all = "kebab-case")]
pub enum Step<T> {
    Ok(T),
    Failed(String),
}

/// Where the calendar list came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "via", content = "url", rename_all = "kebab-case")]
pub enum CalendarSource {
    Principal,
    Fallback(String),
}

/// One calendar as seen by the diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarReport {
    pub url: String,
    pub name: String,
    /// `None` when the server did not report the property.
    pub components: Option<Vec<String>>,
    pub supports_events: bool,
    pub supports_tasks: bool,
}

/// Full diagnostic report.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnoseReport {
    pub server: String,
    pub connectivity: Step<u16>,
    pub principal: Step<String>,
    pub source: Option<CalendarSource>,
    pub calendars: Vec<CalendarReport>,
    pub outcome: ProbeOutcome,
}

/// Runs every step against `transport`.
pub async fn run_diagnostics(
    transport: &dyn DavTransport,
    templates: &FallbackTemplates,
) -> DiagnoseReport {
    let base_url = transport.base_url().as_str().to_string();

    let liveness = transport.request(&base_url).await;
    let connectivity = match liveness {
        Ok(status) => Step::Ok(status),
        Err(ref e) => Step::Failed(e.to_string()),
    };

    let principal = transport.principal().await;
    let outcome = match principal {
        Ok(_) => ProbeOutcome::Ok,
        Err(ref e) => match classify_principal_error(e) {
            Classification::Outcome(outcome) => outcome,
            Classification::TryLiveness => classify_liveness(&liveness),
        },
    };

    let (source, listed) = match principal {
        Ok(ref principal) => match transport.principal_calendars(principal).await {
            Ok(calendars) => (Some(CalendarSource::Principal), calendars),
            Err(e) => {
                debug!(error = %e, "Calendar home listing failed, scanning fallback locations");
                scan(transport, templates).await
            }
        },
        Err(_) => scan(transport, templates).await,
    };

    let mut calendars = Vec::with_capacity(listed.len());
    for calendar in &listed {
        calendars.push(inspect(transport, calendar).await);
    }

    DiagnoseReport {
        server: format!("{} @ {}", transport.username(), base_url),
        connectivity,
        principal: match principal {
            Ok(p) => Step::Ok(p.url),
            Err(e) => Step::Failed(e.to_string()),
        },
        source,
        calendars,
        outcome,
    }
}

async fn scan(
    transport: &dyn DavTransport,
    templates: &FallbackTemplates,
) -> (Option<CalendarSource>, Vec<Calendar>) {
    match find_calendar_home(transport, templates).await {
        Some(found) => (Some(CalendarSource::Fallback(found.url)), found.children),
        None => (None, Vec::new()),
    }
}

/// Reads the component set; unknown support counts as supported.
async fn inspect(transport: &dyn DavTransport, calendar: &Calendar) -> CalendarReport {
    let components = match transport.supported_components(calendar).await {
        Ok(value) => value.into_option(),
        Err(e) => {
            debug!(url = %calendar.url, error = %e, "Could not read supported components");
            None
        }
    };

    let supports = |kind| components.as_ref().is_none_or(|set| set.supports(kind));

    CalendarReport {
        url: calendar.url.clone(),
        name: calendar.display_label(),
        supports_events: supports(ComponentKind::Event),
        supports_tasks: supports(ComponentKind::Task),
        components: components
            .as_ref()
            .map(|set| set.iter().map(str::to_string).collect()),
    }
}

impl DiagnoseReport {
    /// Renders the report for a terminal.
    pub fn render_text(&self) -> String {
        let mut lines = vec![format!("server:        {}", self.server)];

        lines.push(match self.connectivity {
            Step::Ok(status) => format!("connectivity:  HTTP {}", status),
            Step::Failed(ref e) => format!("connectivity:  failed: {}", e),
        });
        lines.push(match self.principal {
            Step::Ok(ref url) => format!("principal:     {}", url),
            Step::Failed(ref e) => format!("principal:     failed: {}", e),
        });
        lines.push(match self.source {
            Some(CalendarSource::Principal) => {
                format!("calendars:     {} via principal", self.calendars.len())
            }
            Some(CalendarSource::Fallback(ref url)) => {
                format!("calendars:     {} via {}", self.calendars.len(), url)
            }
            None => "calendars:     none found".to_string(),
        });

        for calendar in &self.calendars {
            let components = calendar
                .components
                .as_ref()
                .map(|c| c.join(","))
                .unwrap_or_else(|| "unknown".to_string());
            lines.push(format!(
                "  - {} ({}) components: {} events: {} tasks: {}",
                calendar.name,
                calendar.url,
                components,
                yes_no(calendar.supports_events),
                yes_no(calendar.supports_tasks)
            ));
        }

        lines.push(format!("outcome:       {}", self.outcome));
        lines.join("\n")
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Runs the diagnostics for an endpoint and prints the report.
pub async fn run(
    endpoint: &ServerEndpoint,
    templates: &FallbackTemplates,
    json: bool,
) -> ClientResult<DiagnoseReport> {
    let client = HttpDavClient::from_endpoint(endpoint)?;
    let report = run_diagnostics(&client, templates).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_text());
    }

    Ok(report)
}
