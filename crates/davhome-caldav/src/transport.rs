//! The CalDAV transport seam.
//!
//! Discovery logic in [`crate::discovery`] only talks to a [`DavTransport`].
//! [`HttpDavClient`](crate::caldav::HttpDavClient) is the network
//! implementation; tests script their own.

use std::future::Future;
use std::pin::Pin;

use davhome_core::{Calendar, ComponentSet};
use url::Url;

use crate::error::DavResult;

/// A boxed future, used to keep [`DavTransport`] object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The resource representing the authenticated user on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Absolute URL of the principal resource.
    pub url: String,
}

impl Principal {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A WebDAV property that the server may or may not report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue<T> {
    /// The server returned a value.
    Present(T),
    /// The server answered but did not report the property.
    Absent,
}

impl<T> PropertyValue<T> {
    /// Converts into an `Option`; `Absent` becomes `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for PropertyValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Present(value),
            None => Self::Absent,
        }
    }
}

/// Operations discovery needs from a CalDAV client.
///
/// Implementations perform network I/O and report failures as typed
/// [`DavError`](crate::error::DavError)s.
pub trait DavTransport: Send + Sync {
    /// Server root the client was created for.
    fn base_url(&self) -> &Url;

    /// Username the client authenticates as (empty when anonymous).
    fn username(&self) -> &str;

    /// Resolves the principal of the authenticated user ("who am I").
    fn principal(&self) -> BoxFuture<'_, DavResult<Principal>>;

    /// Sends a bare GET and returns the response status.
    ///
    /// Any HTTP answer other than an authorization refusal counts as a
    /// response; only transport failures and refusals are errors.
    fn request<'a>(&'a self, url: &'a str) -> BoxFuture<'a, DavResult<u16>>;

    /// Lists the calendars in the principal's calendar home.
    fn principal_calendars<'a>(
        &'a self,
        principal: &'a Principal,
    ) -> BoxFuture<'a, DavResult<Vec<Calendar>>>;

    /// Lists the calendar collections directly below `collection_url`.
    fn list_children<'a>(&'a self, collection_url: &'a str)
    -> BoxFuture<'a, DavResult<Vec<Calendar>>>;

    /// Reads the supported-component set of a calendar.
    fn supported_components<'a>(
        &'a self,
        calendar: &'a Calendar,
    ) -> BoxFuture<'a, DavResult<PropertyValue<ComponentSet>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_value_from_option() {
        assert_eq!(PropertyValue::from(Some(3)), PropertyValue::Present(3));
        assert_eq!(PropertyValue::<u8>::from(None), PropertyValue::Absent);
    }

    #[test]
    fn property_value_into_option() {
        assert_eq!(PropertyValue::Present("x").into_option(), Some("x"));
        assert_eq!(PropertyValue::<&str>::Absent.into_option(), None);
    }
}
