//! CalDAV transport, connectivity probing and calendar discovery.
//!
//! - [`DavTransport`] - The seam between discovery logic and the network
//! - [`HttpDavClient`] - `reqwest` implementation of the transport
//! - [`probe`] - Classifies a server into a [`ProbeOutcome`](davhome_core::ProbeOutcome)
//! - [`enumerate_calendars`] - Lists the calendars supporting a component kind
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CalDAV Server  │
//! └────────┬────────┘
//!          │ PROPFIND / GET
//!          ▼
//! ┌─────────────────┐
//! │  HttpDavClient  │
//! └────────┬────────┘
//!          │ DavTransport (typed DavErrorKind)
//!          ▼
//! ┌─────────────────┐     ┌──────────────────────┐
//! │      probe      │     │ enumerate_calendars  │
//! └────────┬────────┘     └──────────┬───────────┘
//!          ▼                         ▼ principal, then FallbackTemplates
//!   ProbeOutcome               Vec<Calendar>
//! ```
//!
//! # Example
//!
//! ```ignore
//! use davhome_caldav::{HttpDavClient, EnumerateOptions, enumerate_calendars, probe};
//! use davhome_core::{ComponentKind, ProbeOutcome, ServerEndpoint};
//!
//! let endpoint = ServerEndpoint::new("https://cal.example.com", "alice", "secret");
//! let client = HttpDavClient::from_endpoint(&endpoint)?;
//! if probe(&client).await == ProbeOutcome::Ok {
//!     let calendars =
//!         enumerate_calendars(&client, ComponentKind::Event, &EnumerateOptions::default()).await;
//! }
//! ```

pub mod caldav;
pub mod discovery;
pub mod error;
pub mod transport;

// Re-export main types at crate root
pub use caldav::{CalDavConfig, HttpDavClient};
pub use discovery::{
    Classification, EnumerateOptions, FallbackTemplates, TemplateMatch, classify_liveness,
    classify_principal_error, enumerate, enumerate_calendars, find_calendar_home, probe,
    probe_endpoint,
};
pub use error::{DavError, DavErrorKind, DavResult};
pub use transport::{BoxFuture, DavTransport, Principal, PropertyValue};
