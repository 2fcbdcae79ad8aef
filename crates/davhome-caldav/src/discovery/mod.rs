//! Connectivity probing and calendar enumeration.
//!
//! Both procedures talk to the server only through a
//! [`DavTransport`](crate::transport::DavTransport) and never fail on an
//! incompatible server: the prober classifies, the enumerator degrades to
//! a scan of conventional locations.

mod enumerate;
mod probe;
mod templates;

#[cfg(test)]
pub(crate) mod testing;

pub use enumerate::{
    EnumerateOptions, TemplateMatch, enumerate, enumerate_calendars, find_calendar_home,
};
pub use probe::{Classification, classify_liveness, classify_principal_error, probe, probe_endpoint};
pub use templates::{BASE_PLACEHOLDER, DEFAULT_TEMPLATES, FallbackTemplates, USER_PLACEHOLDER};
