//! Calendar enumeration.
//!
//! Standard discovery first (principal, calendar home, supported
//! components). When the server rejects it, a list of conventional
//! locations is scanned and the first one holding any calendar wins.

use davhome_core::{Calendar, ComponentKind, ComponentSet};
use tracing::{debug, info};
use url::Url;

use crate::error::DavResult;
use crate::transport::{DavTransport, PropertyValue};

use super::templates::FallbackTemplates;

/// Knobs for [`enumerate_calendars`].
#[derive(Debug, Clone)]
pub struct EnumerateOptions {
    /// Locations scanned when principal discovery fails.
    pub templates: FallbackTemplates,
    /// Keep calendars whose supported components could not be determined.
    pub include_unverified: bool,
}

impl Default for EnumerateOptions {
    fn default() -> Self {
        Self {
            templates: FallbackTemplates::default(),
            include_unverified: true,
        }
    }
}

impl EnumerateOptions {
    pub fn with_templates(mut self, templates: FallbackTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_include_unverified(mut self, include: bool) -> Self {
        self.include_unverified = include;
        self
    }
}

/// The first fallback location that listed at least one calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    /// Rendered collection URL.
    pub url: String,
    /// Calendars found below it (never empty).
    pub children: Vec<Calendar>,
}

/// Lists the calendars supporting `kind` with default options.
pub async fn enumerate(transport: &dyn DavTransport, kind: ComponentKind) -> Vec<Calendar> {
    enumerate_calendars(transport, kind, &EnumerateOptions::default()).await
}

/// Lists the calendars supporting `kind`.
///
/// Never fails: an incompatible server, or one without calendars, yields an
/// empty list.
pub async fn enumerate_calendars(
    transport: &dyn DavTransport,
    kind: ComponentKind,
    options: &EnumerateOptions,
) -> Vec<Calendar> {
    let error = match principal_calendars(transport, kind, options.include_unverified).await {
        Ok(calendars) => {
            debug!(kind = %kind, count = calendars.len(), "Calendars found through principal discovery");
            return calendars;
        }
        Err(e) => e,
    };

    if error.kind().is_bad_request_discovery() {
        info!(url = %transport.base_url(), "Server rejects principal discovery, scanning known calendar locations");
    } else {
        debug!(url = %transport.base_url(), error = %error, "Principal discovery failed, scanning known calendar locations");
    }

    match find_calendar_home(transport, &options.templates).await {
        Some(found) => {
            let calendars =
                filter_children(transport, found.children, kind, options.include_unverified).await;
            info!(url = %found.url, kind = %kind, count = calendars.len(), "Calendars found at fallback location");
            calendars
        }
        None => {
            info!(url = %transport.base_url(), "No calendars found at any known location");
            Vec::new()
        }
    }
}

/// Walks `templates` in order and returns the first location with children.
///
/// Failures and empty listings move on to the next template.
pub async fn find_calendar_home(
    transport: &dyn DavTransport,
    templates: &FallbackTemplates,
) -> Option<TemplateMatch> {
    for url in templates.render(transport.base_url().as_str(), transport.username()) {
        if let Err(e) = Url::parse(&url) {
            debug!(url = %url, error = %e, "Skipping unparsable fallback location");
            continue;
        }

        match transport.list_children(&url).await {
            Ok(children) if !children.is_empty() => {
                debug!(url = %url, count = children.len(), "Fallback location lists calendars");
                return Some(TemplateMatch { url, children });
            }
            Ok(_) => debug!(url = %url, "Fallback location is empty"),
            Err(e) => debug!(url = %url, error = %e, "Fallback location failed"),
        }
    }
    None
}

async fn principal_calendars(
    transport: &dyn DavTransport,
    kind: ComponentKind,
    include_unverified: bool,
) -> DavResult<Vec<Calendar>> {
    let principal = transport.principal().await?;
    let calendars = transport.principal_calendars(&principal).await?;

    let mut matching = Vec::new();
    for calendar in calendars {
        let components = transport.supported_components(&calendar).await?;
        if let Some(calendar) = keep(calendar, components, kind, include_unverified) {
            matching.push(calendar);
        }
    }
    Ok(matching)
}

async fn filter_children(
    transport: &dyn DavTransport,
    children: Vec<Calendar>,
    kind: ComponentKind,
    include_unverified: bool,
) -> Vec<Calendar> {
    let mut matching = Vec::new();
    for child in children {
        let components = match transport.supported_components(&child).await {
            Ok(components) => components,
            Err(e) => {
                debug!(url = %child.url, error = %e, "Could not read supported components");
                PropertyValue::Absent
            }
        };
        if let Some(calendar) = keep(child, components, kind, include_unverified) {
            matching.push(calendar);
        }
    }
    matching
}

/// Decides whether a calendar is listed, recording the set that was read.
fn keep(
    calendar: Calendar,
    components: PropertyValue<ComponentSet>,
    kind: ComponentKind,
    include_unverified: bool,
) -> Option<Calendar> {
    match components {
        PropertyValue::Present(set) if set.supports(kind) => Some(Calendar {
            supported_components: Some(set),
            ..calendar
        }),
        PropertyValue::Present(set) => {
            debug!(url = %calendar.url, kind = %kind, components = %set, "Calendar does not support component");
            None
        }
        PropertyValue::Absent if include_unverified => Some(calendar),
        PropertyValue::Absent => {
            debug!(url = %calendar.url, "Skipping calendar with unknown components");
            None
        }
    }
}
