//! HTTP client for CalDAV discovery.
//!
//! Handles authentication (Basic and Digest on challenge), PROPFIND and GET,
//! and the mapping of HTTP outcomes onto [`DavErrorKind`]s:
//!
//! - transport failures (DNS, TCP, TLS, timeout) are `Connection`
//! - 401/403 are `Authorization` with the reason phrase
//! - any other PROPFIND status outside 2xx is `Discovery { status }`
//! - a GET answered with any other status is a success

use davhome_core::{Calendar, ComponentSet, ServerEndpoint};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{Client, Method, Response, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::error::{DavError, DavErrorKind, DavResult, UNAUTHORIZED_REASON};
use crate::transport::{BoxFuture, DavTransport, Principal, PropertyValue};

use super::auth::{Challenge, DigestAuth, basic_auth};
use super::config::CalDavConfig;
use super::xml::{PropfindEntry, PropfindRequest, parse_multistatus};

/// A response whose body has been read.
struct RawResponse {
    status: StatusCode,
    body: String,
}

/// CalDAV client over `reqwest`, implementing [`DavTransport`].
pub struct HttpDavClient {
    /// The underlying HTTP client.
    client: Client,
    /// Configuration.
    config: CalDavConfig,
    /// Digest state from the last challenge, reused for later requests.
    digest_auth: Mutex<Option<DigestAuth>>,
}

impl HttpDavClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: CalDavConfig) -> DavResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| DavError::internal("failed to create HTTP client").with_source(e))?;

        Ok(Self {
            client,
            config,
            digest_auth: Mutex::new(None),
        })
    }

    /// Creates a client for a server endpoint.
    pub fn from_endpoint(endpoint: &ServerEndpoint) -> DavResult<Self> {
        Self::new(CalDavConfig::from_endpoint(endpoint)?)
    }

    /// Sends a PROPFIND and parses the multistatus answer.
    async fn propfind(&self, url: &str, request: PropfindRequest) -> DavResult<Vec<PropfindEntry>> {
        let body = request.body()?;
        let response = self
            .execute("PROPFIND", url, Some(&body), Some(request.depth()))
            .await?;

        match response.status {
            s if s.is_success() => parse_multistatus(&response.body),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(authorization_error(response.status))
            }
            s => Err(DavError::discovery(
                s.as_u16(),
                format!("PROPFIND {} rejected with {}", url, s),
            )),
        }
    }

    /// Sends a GET and returns the status code.
    async fn get(&self, url: &str) -> DavResult<u16> {
        let response = self.execute("GET", url, None, None).await?;
        match response.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(authorization_error(response.status))
            }
            s => Ok(s.as_u16()),
        }
    }

    /// Sends a request, answering one authentication challenge if needed.
    async fn execute(
        &self,
        method: &str,
        url: &str,
        body: Option<&str>,
        depth: Option<u8>,
    ) -> DavResult<RawResponse> {
        let cached = self.digest_authorization(method, url).await;
        let retried_with_digest = cached.is_some();
        let response = self.send(method, url, body, depth, cached).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return read_response(response).await;
        }

        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            debug!(url = %url, "Server requires authentication but no credentials are configured");
            return read_response(response).await;
        };

        let challenge = Challenge::select(
            response
                .headers()
                .get_all(WWW_AUTHENTICATE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        );

        let authorization = match challenge {
            Some(Challenge::Digest(mut digest)) => {
                debug!(realm = %digest.realm, stale_nonce = retried_with_digest, "Answering Digest challenge");
                let header = digest.authorize(method, &request_uri(url), username, password);
                *self.digest_auth.lock().await = Some(digest);
                header
            }
            _ => {
                debug!("Answering with Basic credentials");
                basic_auth(username, password)
            }
        };

        let response = self
            .send(method, url, body, depth, Some(authorization))
            .await?;
        read_response(response).await
    }

    /// Returns a Digest header for `url` if a previous challenge was cached.
    async fn digest_authorization(&self, method: &str, url: &str) -> Option<String> {
        let (username, password) = (self.config.username.as_ref()?, self.config.password.as_ref()?);
        let mut guard = self.digest_auth.lock().await;
        let digest = guard.as_mut()?;
        Some(digest.authorize(method, &request_uri(url), username, password))
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<&str>,
        depth: Option<u8>,
        authorization: Option<String>,
    ) -> DavResult<Response> {
        let http_method = Method::from_bytes(method.as_bytes())
            .map_err(|e| DavError::internal(format!("invalid HTTP method {}", method)).with_source(e))?;

        let mut request = self.client.request(http_method, url);

        if let Some(d) = depth {
            request = request.header("Depth", d.to_string());
        }
        if let Some(header) = authorization {
            request = request.header(AUTHORIZATION, header);
        }
        if let Some(b) = body {
            request = request
                .header(CONTENT_TYPE, "application/xml; charset=utf-8")
                .body(b.to_string());
        }

        trace!(method = %method, url = %url, "Sending request");

        request
            .send()
            .await
            .map_err(|e| transport_error(method, url, e))
    }
}

async fn read_response(response: Response) -> DavResult<RawResponse> {
    let status = response.status();
    trace!(status = %status, "Received response");
    let body = response
        .text()
        .await
        .map_err(|e| DavError::connection("failed to read response body").with_source(e))?;
    Ok(RawResponse { status, body })
}

fn authorization_error(status: StatusCode) -> DavError {
    let reason = match status {
        StatusCode::UNAUTHORIZED => UNAUTHORIZED_REASON,
        s => s.canonical_reason().unwrap_or("Forbidden"),
    };
    DavError::authorization(reason)
}

/// Maps a `reqwest` failure onto the transport taxonomy.
fn transport_error(method: &str, url: &str, error: reqwest::Error) -> DavError {
    let message = format!("{} {} failed", method, url);
    let kind = if error.is_connect() || error.is_timeout() || error.is_request() {
        DavErrorKind::Connection
    } else if error.is_builder() {
        DavErrorKind::Internal
    } else {
        DavErrorKind::Client {
            status: error.status().map(|s| s.as_u16()),
        }
    };
    DavError::new(kind, message).with_source(error)
}

/// Path and query of `url`, as used in the Digest `uri` field.
fn request_uri(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Resolves an href from a multistatus body against the request URL.
fn resolve_href(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

fn same_resource(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

impl DavTransport for HttpDavClient {
    fn base_url(&self) -> &Url {
        &self.config.url
    }

    fn username(&self) -> &str {
        self.config.username.as_deref().unwrap_or_default()
    }

    fn principal(&self) -> BoxFuture<'_, DavResult<Principal>> {
        Box::pin(async move {
            let base = self.config.url_str();
            let entries = self.propfind(base, PropfindRequest::Principal).await?;

            let principal = entries
                .into_iter()
                .find_map(|e| e.principal_href)
                .map(|href| resolve_href(base, &href));

            match principal {
                Some(url) => {
                    debug!(principal = %url, "Resolved current-user-principal");
                    Ok(Principal::new(url))
                }
                None => {
                    debug!(url = %base, "No current-user-principal reported, using server root");
                    Ok(Principal::new(base))
                }
            }
        })
    }

    fn request<'a>(&'a self, url: &'a str) -> BoxFuture<'a, DavResult<u16>> {
        Box::pin(self.get(url))
    }

    fn principal_calendars<'a>(
        &'a self,
        principal: &'a Principal,
    ) -> BoxFuture<'a, DavResult<Vec<Calendar>>> {
        Box::pin(async move {
            let entries = self
                .propfind(&principal.url, PropfindRequest::CalendarHomeSet)
                .await?;

            let home = entries
                .into_iter()
                .find_map(|e| e.home_set_href)
                .map(|href| resolve_href(&principal.url, &href))
                .unwrap_or_else(|| principal.url.clone());

            debug!(home = %home, "Listing calendar home");
            self.list_children(&home).await
        })
    }

    fn list_children<'a>(
        &'a self,
        collection_url: &'a str,
    ) -> BoxFuture<'a, DavResult<Vec<Calendar>>> {
        Box::pin(async move {
            let entries = self
                .propfind(collection_url, PropfindRequest::Calendars)
                .await?;

            Ok(entries
                .into_iter()
                .filter(|e| e.is_calendar)
                .map(|e| (resolve_href(collection_url, &e.href), e))
                .filter(|(url, _)| !same_resource(url, collection_url))
                .map(|(url, e)| Calendar {
                    url,
                    display_name: e.display_name,
                    supported_components: e.components.map(ComponentSet::from_iter),
                })
                .collect())
        })
    }

    fn supported_components<'a>(
        &'a self,
        calendar: &'a Calendar,
    ) -> BoxFuture<'a, DavResult<PropertyValue<ComponentSet>>> {
        Box::pin(async move {
            if let Some(ref components) = calendar.supported_components {
                return Ok(PropertyValue::Present(components.clone()));
            }

            let entries = self
                .propfind(&calendar.url, PropfindRequest::SupportedComponents)
                .await?;

            Ok(entries
                .into_iter()
                .find_map(|e| e.components)
                .map(ComponentSet::from_iter)
                .into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn client_creation() {
        let config = CalDavConfig::new("https://cal.example.com/")
            .unwrap()
            .with_credentials("alice", "secret")
            .with_timeout(Duration::from_secs(10));

        assert!(HttpDavClient::new(config).is_ok());
    }

    #[test]
    fn client_exposes_endpoint_identity() {
        let endpoint = ServerEndpoint::new("https://cal.example.com/dav/", "alice", "pw");
        let client = HttpDavClient::from_endpoint(&endpoint).unwrap();
        assert_eq!(client.base_url().as_str(), "https://cal.example.com/dav/");
        assert_eq!(client.username(), "alice");
    }

    #[test]
    fn anonymous_client_has_empty_username() {
        let config = CalDavConfig::new("https://cal.example.com/").unwrap();
        let client = HttpDavClient::new(config).unwrap();
        assert_eq!(client.username(), "");
    }

    #[test]
    fn resolve_relative_href() {
        let base = "https://cal.example.com/calendars/alice/";
        assert_eq!(
            resolve_href(base, "work/"),
            "https://cal.example.com/calendars/alice/work/"
        );
        assert_eq!(
            resolve_href(base, "/principals/alice/"),
            "https://cal.example.com/principals/alice/"
        );
        assert_eq!(
            resolve_href(base, "https://other.example.com/cal/"),
            "https://other.example.com/cal/"
        );
    }

    #[test]
    fn same_resource_ignores_trailing_slash() {
        assert!(same_resource(
            "https://cal.example.com/a/",
            "https://cal.example.com/a"
        ));
        assert!(!same_resource(
            "https://cal.example.com/a/",
            "https://cal.example.com/a/b/"
        ));
    }

    #[test]
    fn digest_uri_keeps_query() {
        assert_eq!(request_uri("https://cal.example.com/dav/?x=1"), "/dav/?x=1");
        assert_eq!(request_uri("https://cal.example.com/dav/"), "/dav/");
    }

    #[test]
    fn authorization_reasons() {
        assert_eq!(
            authorization_error(StatusCode::UNAUTHORIZED).kind(),
            &DavErrorKind::Authorization {
                reason: "Unauthorized".to_string()
            }
        );
        assert_eq!(
            authorization_error(StatusCode::FORBIDDEN).kind(),
            &DavErrorKind::Authorization {
                reason: "Forbidden".to_string()
            }
        );
    }
}
