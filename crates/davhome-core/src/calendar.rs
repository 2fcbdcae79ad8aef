//! Discovered calendar collections.

use serde::Serialize;
use url::Url;

use crate::component::{ComponentKind, ComponentSet};

/// A calendar collection found during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    /// Absolute URL of the collection.
    pub url: String,
    /// The `displayname` property, if the server reported one.
    pub display_name: Option<String>,
    /// Supported components; `None` when the server did not report them.
    pub supported_components: Option<ComponentSet>,
}

impl Calendar {
    /// Creates a calendar with only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            display_name: None,
            supported_components: None,
        }
    }

    /// Builder: set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Builder: set the supported components.
    pub fn with_components<S: AsRef<str>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.supported_components = Some(names.into_iter().collect());
        self
    }

    /// Returns whether the calendar supports `kind`, or `None` if unknown.
    pub fn supports(&self, kind: ComponentKind) -> Option<bool> {
        self.supported_components
            .as_ref()
            .map(|set| set.supports(kind))
    }

    /// Returns a name suitable for display.
    ///
    /// Falls back to the last path segment of the URL, percent-decoded.
    pub fn display_label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }

        let segment = Url::parse(&self.url)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.url.clone());

        urlencoding::decode(&segment)
            .map(|s| s.into_owned())
            .unwrap_or(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_unknown_when_no_components() {
        let calendar = Calendar::new("https://cal.example.com/dav/alice/home/");
        assert_eq!(calendar.supports(ComponentKind::Event), None);
    }

    #[test]
    fn supports_known_components() {
        let calendar = Calendar::new("https://cal.example.com/c/").with_components(["VTODO"]);
        assert_eq!(calendar.supports(ComponentKind::Event), Some(false));
        assert_eq!(calendar.supports(ComponentKind::Task), Some(true));
    }

    #[test]
    fn label_prefers_display_name() {
        let calendar =
            Calendar::new("https://cal.example.com/c/work/").with_display_name("Work Calendar");
        assert_eq!(calendar.display_label(), "Work Calendar");
    }

    #[test]
    fn label_falls_back_to_decoded_segment() {
        let calendar = Calendar::new("https://cal.example.com/dav/alice/Family%20Events/");
        assert_eq!(calendar.display_label(), "Family Events");
    }

    #[test]
    fn label_ignores_blank_display_name() {
        let calendar = Calendar::new("https://cal.example.com/dav/alice/personal/")
            .with_display_name("  ");
        assert_eq!(calendar.display_label(), "personal");
    }
}
