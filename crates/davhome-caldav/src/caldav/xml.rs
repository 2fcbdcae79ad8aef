//! WebDAV XML for CalDAV discovery.
//!
//! Builds PROPFIND request bodies and parses the `multistatus` documents
//! servers answer with. Properties reported inside a `propstat` whose status
//! is not 2xx are treated as not reported.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{DavError, DavResult};

/// DAV namespace
pub const DAV_NS: &str = "DAV:";
/// CalDAV namespace
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";
/// CalendarServer namespace (Apple extensions)
pub const CS_NS: &str = "http://calendarserver.org/ns/";

/// The PROPFIND queries discovery sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropfindRequest {
    /// `current-user-principal` on the server root.
    Principal,
    /// `calendar-home-set` on the principal.
    CalendarHomeSet,
    /// Listing of a collection's calendars (Depth 1).
    Calendars,
    /// `supported-calendar-component-set` on one calendar.
    SupportedComponents,
}

impl PropfindRequest {
    fn properties(&self) -> &'static [&'static str] {
        match self {
            Self::Principal => &["d:current-user-principal"],
            Self::CalendarHomeSet => &["c:calendar-home-set"],
            Self::Calendars => &[
                "d:displayname",
                "d:resourcetype",
                "c:supported-calendar-component-set",
                "c:calendar-description",
                "cs:getctag",
            ],
            Self::SupportedComponents => &["c:supported-calendar-component-set"],
        }
    }

    /// Value of the `Depth` header for this query.
    pub fn depth(&self) -> u8 {
        match self {
            Self::Calendars => 1,
            _ => 0,
        }
    }

    /// Renders the request body.
    pub fn body(&self) -> DavResult<String> {
        write_propfind(self.properties())
            .map_err(|e| DavError::internal("failed to build PROPFIND body").with_source(e))
    }
}

fn write_propfind(properties: &[&str]) -> std::io::Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut propfind = BytesStart::new("d:propfind");
    propfind.push_attribute(("xmlns:d", DAV_NS));
    propfind.push_attribute(("xmlns:c", CALDAV_NS));
    propfind.push_attribute(("xmlns:cs", CS_NS));
    writer.write_event(Event::Start(propfind))?;
    writer.write_event(Event::Start(BytesStart::new("d:prop")))?;

    for property in properties {
        writer.write_event(Event::Empty(BytesStart::new(*property)))?;
    }

    writer.write_event(Event::End(BytesEnd::new("d:prop")))?;
    writer.write_event(Event::End(BytesEnd::new("d:propfind")))?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(std::io::Error::other)
}

/// One `response` element of a multistatus document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropfindEntry {
    /// The resource href, as sent by the server (usually a path).
    pub href: String,
    /// `displayname`
    pub display_name: Option<String>,
    /// `resourcetype` contains `calendar`.
    pub is_calendar: bool,
    /// `current-user-principal/href`
    pub principal_href: Option<String>,
    /// First `calendar-home-set/href`
    pub home_set_href: Option<String>,
    /// `supported-calendar-component-set`, `None` when not reported.
    pub components: Option<Vec<String>>,
}

/// Properties collected inside one `propstat`, kept only if its status is 2xx.
#[derive(Debug, Default)]
struct PropstatBuffer {
    display_name: Option<String>,
    is_calendar: bool,
    principal_href: Option<String>,
    home_set_href: Option<String>,
    components: Option<Vec<String>>,
    success: Option<bool>,
}

impl PropstatBuffer {
    fn merge_into(self, entry: &mut PropfindEntry) {
        // A propstat without a status element is taken at face value.
        if !self.success.unwrap_or(true) {
            return;
        }
        entry.is_calendar |= self.is_calendar;
        if self.display_name.is_some() {
            entry.display_name = self.display_name;
        }
        if self.principal_href.is_some() {
            entry.principal_href = self.principal_href;
        }
        if self.home_set_href.is_some() {
            entry.home_set_href = self.home_set_href;
        }
        if self.components.is_some() {
            entry.components = self.components;
        }
    }
}

/// Parses a `multistatus` response body.
///
/// # Errors
///
/// Returns a [`Client`](crate::error::DavErrorKind::Client) error when the
/// body is not well-formed XML or has no `multistatus` root.
pub fn parse_multistatus(xml: &str) -> DavResult<Vec<PropfindEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut entry: Option<PropfindEntry> = None;
    let mut propstat = PropstatBuffer::default();
    let mut text = String::new();
    let mut is_multistatus = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| DavError::client(None, "malformed multistatus body").with_source(e))?;

        match event {
            Event::Start(e) => {
                let name = local_name(&e);
                let parent = stack.last().map(String::as_str).unwrap_or_default();
                is_multistatus |= name == "multistatus";
                open_element(&name, parent, &e, &mut entry, &mut propstat);
                stack.push(name);
                text.clear();
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                let parent = stack.last().map(String::as_str).unwrap_or_default();
                open_element(&name, parent, &e, &mut entry, &mut propstat);
            }
            Event::Text(e) => {
                let unescaped = e.unescape().map_err(|err| {
                    DavError::client(None, "invalid text in multistatus body").with_source(err)
                })?;
                text.push_str(&unescaped);
            }
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::End(_) => {
                let name = stack.pop().unwrap_or_default();
                let parent = stack.last().map(String::as_str).unwrap_or_default();
                let value = std::mem::take(&mut text);
                let value = value.trim();

                match (name.as_str(), parent) {
                    ("href", "response") => {
                        if let Some(ref mut current) = entry {
                            current.href = value.to_string();
                        }
                    }
                    ("href", "current-user-principal") => {
                        propstat.principal_href = Some(value.to_string());
                    }
                    ("href", "calendar-home-set") => {
                        propstat
                            .home_set_href
                            .get_or_insert_with(|| value.to_string());
                    }
                    ("displayname", _) if !value.is_empty() => {
                        propstat.display_name = Some(value.to_string());
                    }
                    ("status", "propstat") => {
                        propstat.success = Some(status_is_success(value));
                    }
                    ("propstat", _) => {
                        let finished = std::mem::take(&mut propstat);
                        if let Some(ref mut current) = entry {
                            finished.merge_into(current);
                        }
                    }
                    ("response", _) => {
                        if let Some(done) = entry.take().filter(|e| !e.href.is_empty()) {
                            entries.push(done);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !is_multistatus {
        return Err(DavError::client(
            None,
            "response body is not a multistatus document",
        ));
    }

    Ok(entries)
}

fn open_element(
    name: &str,
    parent: &str,
    element: &BytesStart<'_>,
    entry: &mut Option<PropfindEntry>,
    propstat: &mut PropstatBuffer,
) {
    match (name, parent) {
        ("response", _) => *entry = Some(PropfindEntry::default()),
        ("propstat", _) => *propstat = PropstatBuffer::default(),
        ("calendar", "resourcetype") => propstat.is_calendar = true,
        ("supported-calendar-component-set", _) => {
            propstat.components.get_or_insert_with(Vec::new);
        }
        ("comp", "supported-calendar-component-set") => {
            let component = element
                .attributes()
                .flatten()
                .find(|attr| attr.key.local_name().as_ref() == b"name")
                .map(|attr| String::from_utf8_lossy(&attr.value).to_uppercase());
            if let Some(component) = component {
                propstat.components.get_or_insert_with(Vec::new).push(component);
            }
        }
        _ => {}
    }
}

/// Extracts the local name of an element, dropping any namespace prefix.
fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

/// `HTTP/1.1 200 OK` -> true, `HTTP/1.1 404 Not Found` -> false.
fn status_is_success(status_line: &str) -> bool {
    status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .is_some_and(|code| (200..300).contains(&code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn propfind_bodies() {
        let principal = PropfindRequest::Principal.body().unwrap();
        assert!(principal.contains("d:propfind"));
        assert!(principal.contains("<d:current-user-principal/>"));

        let listing = PropfindRequest::Calendars.body().unwrap();
        assert!(listing.contains("<d:resourcetype/>"));
        assert!(listing.contains("<c:supported-calendar-component-set/>"));
        assert!(listing.contains(CALDAV_NS));
    }

    #[test]
    fn only_listing_uses_depth_one() {
        assert_eq!(PropfindRequest::Calendars.depth(), 1);
        assert_eq!(PropfindRequest::Principal.depth(), 0);
        assert_eq!(PropfindRequest::CalendarHomeSet.depth(), 0);
        assert_eq!(PropfindRequest::SupportedComponents.depth(), 0);
    }

    #[test]
    fn parse_principal_href() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/</d:href>
    <d:propstat>
      <d:prop>
        <d:current-user-principal><d:href>/principals/alice/</d:href></d:current-user-principal>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

        let entries = parse_multistatus(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].href, "/");
        assert_eq!(
            entries[0].principal_href.as_deref(),
            Some("/principals/alice/")
        );
    }

    #[test]
    fn parse_calendar_listing() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<multistatus xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <response>
    <href>/calendars/alice/</href>
    <propstat>
      <prop><resourcetype><collection/></resourcetype></prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
  </response>
  <response>
    <href>/calendars/alice/work/</href>
    <propstat>
      <prop>
        <displayname>Work &amp; Meetings</displayname>
        <resourcetype><collection/><C:calendar/></resourcetype>
        <C:supported-calendar-component-set>
          <C:comp name="VEVENT"/>
        </C:supported-calendar-component-set>
      </prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
  </response>
  <response>
    <href>/calendars/alice/todo/</href>
    <propstat>
      <prop>
        <resourcetype><collection/><C:calendar/></resourcetype>
      </prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
    <propstat>
      <prop>
        <displayname/>
        <C:supported-calendar-component-set/>
      </prop>
      <status>HTTP/1.1 404 Not Found</status>
    </propstat>
  </response>
</multistatus>"#;

        let entries = parse_multistatus(xml).unwrap();
        assert_eq!(entries.len(), 3);

        assert!(!entries[0].is_calendar);

        assert!(entries[1].is_calendar);
        assert_eq!(entries[1].display_name.as_deref(), Some("Work & Meetings"));
        assert_eq!(entries[1].components, Some(vec!["VEVENT".to_string()]));

        assert!(entries[2].is_calendar);
        assert_eq!(entries[2].display_name, None);
        assert_eq!(entries[2].components, None);
    }

    #[test]
    fn parse_home_set_keeps_first_href() {
        let xml = r#"<multistatus xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <response>
    <href>/principals/alice/</href>
    <propstat>
      <prop>
        <C:calendar-home-set>
          <href>/calendars/alice/</href>
          <href>/shared/alice/</href>
        </C:calendar-home-set>
      </prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
  </response>
</multistatus>"#;

        let entries = parse_multistatus(xml).unwrap();
        assert_eq!(
            entries[0].home_set_href.as_deref(),
            Some("/calendars/alice/")
        );
    }

    #[test]
    fn lowercase_component_names_are_normalized() {
        let xml = r#"<multistatus xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <response>
    <href>/cal/</href>
    <propstat>
      <prop>
        <C:supported-calendar-component-set>
          <C:comp name="vtodo"/>
        </C:supported-calendar-component-set>
      </prop>
    </propstat>
  </response>
</multistatus>"#;

        let entries = parse_multistatus(xml).unwrap();
        assert_eq!(entries[0].components, Some(vec!["VTODO".to_string()]));
    }

    #[test]
    fn non_multistatus_body_is_rejected() {
        let err = parse_multistatus("<html><body>Hello</body></html>").unwrap_err();
        assert_eq!(
            err.kind(),
            &crate::error::DavErrorKind::Client { status: None }
        );
    }

    #[test]
    fn malformed_body_is_rejected() {
        assert!(parse_multistatus("<multistatus><response></multistatus>").is_err());
    }

    #[test]
    fn status_line_parsing() {
        assert!(status_is_success("HTTP/1.1 200 OK"));
        assert!(!status_is_success("HTTP/1.1 404 Not Found"));
        assert!(!status_is_success("garbage"));
    }
}
