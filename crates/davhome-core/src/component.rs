//! Calendar component kinds and supported-component sets.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of calendar resource a caller is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Calendar events (`VEVENT`).
    Event,
    /// Tasks / to-dos (`VTODO`).
    Task,
}

impl ComponentKind {
    /// All kinds, in display order.
    pub const ALL: [ComponentKind; 2] = [ComponentKind::Event, ComponentKind::Task];

    /// Returns the iCalendar component name servers advertise for this kind.
    pub fn component_name(&self) -> &'static str {
        match self {
            Self::Event => "VEVENT",
            Self::Task => "VTODO",
        }
    }

    /// Returns a lowercase human label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown component kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown component kind `{0}` (expected event or task)")]
pub struct ParseComponentKindError(String);

impl FromStr for ComponentKind {
    type Err = ParseComponentKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "event" | "events" | "vevent" => Ok(Self::Event),
            "task" | "tasks" | "todo" | "vtodo" => Ok(Self::Task),
            _ => Err(ParseComponentKindError(s.to_string())),
        }
    }
}

/// The set of component names a calendar collection accepts.
///
/// Names are stored uppercase so `vevent` and `VEVENT` compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComponentSet(BTreeSet<String>);

impl ComponentSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component name.
    pub fn insert(&mut self, name: impl AsRef<str>) {
        self.0.insert(name.as_ref().trim().to_ascii_uppercase());
    }

    /// Returns true if the set contains the given component name.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&name.to_ascii_uppercase())
    }

    /// Returns true if the set advertises the given kind.
    pub fn supports(&self, kind: ComponentKind) -> bool {
        self.0.contains(kind.component_name())
    }

    /// Iterates over the component names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ComponentSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl fmt::Display for ComponentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{}", names.join(","))
    }
}
