//! Scripted in-memory transport for discovery tests.

use std::collections::HashMap;
use std::sync::Mutex;

use davhome_core::{Calendar, ComponentSet};
use url::Url;

use crate::error::{DavError, DavErrorKind, DavResult};
use crate::transport::{BoxFuture, DavTransport, Principal, PropertyValue};

/// A transport call, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Principal,
    Request(String),
    PrincipalCalendars(String),
    ListChildren(String),
    SupportedComponents(String),
}

type Scripted<T> = Result<T, DavErrorKind>;

fn replay<T: Clone>(scripted: &Scripted<T>) -> DavResult<T> {
    scripted
        .clone()
        .map_err(|kind| DavError::new(kind, "scripted failure"))
}

/// Answers every call from a fixed script.
///
/// Collections without a scripted listing answer 404. Calendars without a
/// scripted component set report the set they were listed with, or
/// `Absent`.
pub struct ScriptedTransport {
    base_url: Url,
    username: String,
    principal: Scripted<Principal>,
    get: Scripted<u16>,
    principal_calendars: Scripted<Vec<Calendar>>,
    children: HashMap<String, Scripted<Vec<Calendar>>>,
    components: HashMap<String, Scripted<PropertyValue<ComponentSet>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new(base_url: &str, username: &str) -> Self {
        Self {
            base_url: Url::parse(base_url).unwrap(),
            username: username.to_string(),
            principal: Err(DavErrorKind::Client { status: None }),
            get: Ok(200),
            principal_calendars: Ok(Vec::new()),
            children: HashMap::new(),
            components: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_principal(mut self, result: Scripted<Principal>) -> Self {
        self.principal = result;
        self
    }

    pub fn with_get(mut self, result: Scripted<u16>) -> Self {
        self.get = result;
        self
    }

    pub fn with_principal_calendars(mut self, result: Scripted<Vec<Calendar>>) -> Self {
        self.principal_calendars = result;
        self
    }

    pub fn with_children(mut self, url: &str, result: Scripted<Vec<Calendar>>) -> Self {
        self.children.insert(url.to_string(), result);
        self
    }

    pub fn with_components(
        mut self,
        calendar_url: &str,
        result: Scripted<PropertyValue<ComponentSet>>,
    ) -> Self {
        self.components.insert(calendar_url.to_string(), result);
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Collections listed so far.
    pub fn listed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ListChildren(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl DavTransport for ScriptedTransport {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn principal(&self) -> BoxFuture<'_, DavResult<Principal>> {
        self.record(Call::Principal);
        Box::pin(async move { replay(&self.principal) })
    }

    fn request<'a>(&'a self, url: &'a str) -> BoxFuture<'a, DavResult<u16>> {
        self.record(Call::Request(url.to_string()));
        Box::pin(async move { replay(&self.get) })
    }

    fn principal_calendars<'a>(
        &'a self,
        principal: &'a Principal,
    ) -> BoxFuture<'a, DavResult<Vec<Calendar>>> {
        self.record(Call::PrincipalCalendars(principal.url.clone()));
        Box::pin(async move { replay(&self.principal_calendars) })
    }

    fn list_children<'a>(
        &'a self,
        collection_url: &'a str,
    ) -> BoxFuture<'a, DavResult<Vec<Calendar>>> {
        self.record(Call::ListChildren(collection_url.to_string()));
        Box::pin(async move {
            match self.children.get(collection_url) {
                Some(scripted) => replay(scripted),
                None => Err(DavError::discovery(404, "no such collection")),
            }
        })
    }

    fn supported_components<'a>(
        &'a self,
        calendar: &'a Calendar,
    ) -> BoxFuture<'a, DavResult<PropertyValue<ComponentSet>>> {
        self.record(Call::SupportedComponents(calendar.url.clone()));
        Box::pin(async move {
            match self.components.get(&calendar.url) {
                Some(scripted) => replay(scripted),
                None => Ok(calendar.supported_components.clone().into()),
            }
        })
    }
}
