//! Calendars command: list the calendars supporting a component kind.

use davhome_caldav::{EnumerateOptions, HttpDavClient, enumerate_calendars};
use davhome_core::{Calendar, ComponentKind, ServerEndpoint};
use tracing::debug;

use crate::error::ClientResult;

/// Enumerates calendars and prints them.
pub async fn run(
    endpoint: &ServerEndpoint,
    kind: ComponentKind,
    options: &EnumerateOptions,
    json: bool,
) -> ClientResult<Vec<Calendar>> {
    let client = HttpDavClient::from_endpoint(endpoint)?;
    debug!(endpoint = %endpoint.identity(), kind = %kind, "Enumerating calendars");

    let calendars = enumerate_calendars(&client, kind, options).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&calendars)?);
    } else {
        println!("{}", render_text(&calendars, kind));
    }

    Ok(calendars)
}

/// One line per calendar: label, URL and reported components.
pub fn render_text(calendars: &[Calendar], kind: ComponentKind) -> String {
    if calendars.is_empty() {
        return format!("No calendars supporting {} found.", kind.component_name());
    }

    calendars
        .iter()
        .map(|c| {
            let components = c
                .supported_components
                .as_ref()
                .map(|set| set.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            format!("{}\t{}\t[{}]", c.display_label(), c.url, components)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing() {
        assert_eq!(
            render_text(&[], ComponentKind::Task),
            "No calendars supporting VTODO found."
        );
    }

    #[test]
    fn listing_uses_labels_and_components() {
        let calendars = vec![
            Calendar::new("https://cal.example.com/dav/alice/work/")
                .with_display_name("Work")
                .with_components(["VTODO", "VEVENT"]),
            Calendar::new("https://cal.example.com/dav/alice/Family%20Events/"),
        ];
        assert_eq!(
            render_text(&calendars, ComponentKind::Event),
            "Work\thttps://cal.example.com/dav/alice/work/\t[VEVENT,VTODO]\n\
             Family Events\thttps://cal.example.com/dav/alice/Family%20Events/\t[unknown]"
        );
    }
}
