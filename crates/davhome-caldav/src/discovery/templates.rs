//! Conventional calendar-home locations.
//!
//! Used when a server rejects standard principal discovery. Templates are
//! tried in order; `{base}` is replaced by the server URL without its
//! trailing slash and `{user}` by the username.

use crate::error::{DavError, DavResult};

/// Placeholder for the server URL.
pub const BASE_PLACEHOLDER: &str = "{base}";
/// Placeholder for the username.
pub const USER_PLACEHOLDER: &str = "{user}";

/// Built-in template list, most common layouts first.
pub const DEFAULT_TEMPLATES: &[&str] = &[
    "{base}/dav/{user}/calendar/",
    "{base}/caldav/{user}/",
    "{base}/dav/{user}/",
    "{base}/calendar/dav/{user}/",
    "{base}/calendars/{user}/",
    // Nextcloud / ownCloud
    "{base}/remote.php/dav/calendars/{user}/",
    "{base}/dav/calendars/{user}/",
];

/// An ordered, validated list of URL templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTemplates {
    templates: Vec<String>,
}

impl FallbackTemplates {
    /// Creates a template list.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the list is empty or a template does not
    /// contain `{base}`.
    pub fn new<S: Into<String>>(templates: impl IntoIterator<Item = S>) -> DavResult<Self> {
        let templates: Vec<String> = templates.into_iter().map(Into::into).collect();

        if templates.is_empty() {
            return Err(DavError::internal("fallback template list is empty"));
        }
        if let Some(bad) = templates.iter().find(|t| !t.contains(BASE_PLACEHOLDER)) {
            return Err(DavError::internal(format!(
                "fallback template `{}` does not contain {}",
                bad, BASE_PLACEHOLDER
            )));
        }

        Ok(Self { templates })
    }

    /// Renders every template for a server, in order.
    pub fn render(&self, base_url: &str, username: &str) -> Vec<String> {
        let base = base_url.trim_end_matches('/');
        self.templates
            .iter()
            .map(|t| {
                t.replace(BASE_PLACEHOLDER, base)
                    .replace(USER_PLACEHOLDER, username)
            })
            .collect()
    }
}

impl Default for FallbackTemplates {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect(),
        }
    }
}
