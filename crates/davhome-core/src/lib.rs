//! Core types: endpoints, calendars, component kinds, probe outcomes, tracing

pub mod calendar;
pub mod component;
pub mod endpoint;
pub mod outcome;
pub mod tracing;

pub use calendar::Calendar;
pub use component::{ComponentKind, ComponentSet, ParseComponentKindError};
pub use endpoint::{EndpointIdentity, ServerEndpoint};
pub use outcome::{NotReadyReason, ProbeOutcome, UnknownCause};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
