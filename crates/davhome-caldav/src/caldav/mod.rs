//! CalDAV over HTTP.
//!
//! [`HttpDavClient`] implements [`DavTransport`](crate::transport::DavTransport)
//! with `reqwest`:
//!
//! - HTTP Digest and Basic authentication
//! - PROPFIND for principal, calendar-home-set and collection listing
//! - TLS configuration (can be disabled for self-signed servers)
//!
//! # Example
//!
//! ```ignore
//! use davhome_caldav::caldav::{CalDavConfig, HttpDavClient};
//!
//! let config = CalDavConfig::new("https://caldav.example.com/")?
//!     .with_credentials("user", "password");
//!
//! let client = HttpDavClient::new(config)?;
//! let outcome = davhome_caldav::probe(&client).await;
//! ```

mod auth;
mod client;
mod config;
mod xml;

pub use client::HttpDavClient;
pub use config::CalDavConfig;
