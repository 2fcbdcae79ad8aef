//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/davhome/config.toml` by default:
//!
//! ```toml
//! [[servers]]
//! url = "https://cal.example.com"
//! username = "alice"
//! password = "env::CALDAV_PASSWORD"
//! verify_ssl = true
//!
//! [discovery]
//! include_unverified = true
//! templates = ["{base}/dav/{user}/calendar/", "{base}/caldav/{user}/"]
//! ```
//!
//! Passwords support secret references (see [`crate::secret`]).

use std::path::{Path, PathBuf};

use davhome_caldav::{EnumerateOptions, FallbackTemplates};
use davhome_core::{EndpointIdentity, ServerEndpoint};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::secret::{self, SecretError, SecretRef};
use crate::setup::duplicate_identities;

/// Placeholder printed instead of inline passwords.
const REDACTED: &str = "********";

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the davhome client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Configured CalDAV servers.
    #[serde(default)]
    pub servers: Vec<ServerSettings>,

    /// Calendar discovery settings.
    #[serde(default)]
    pub discovery: DiscoverySettings,
}

/// One CalDAV account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Server root URL.
    pub url: String,

    /// Username.
    pub username: String,

    /// Password (supports `pass::` and `env::` prefixes).
    #[serde(default)]
    pub password: String,

    /// Verify TLS certificates.
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

/// Calendar discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Fallback locations, replacing the built-in list when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<String>>,

    /// Keep calendars whose supported components cannot be read.
    pub include_unverified: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            templates: None,
            include_unverified: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("davhome")
    }

    /// Builds enumeration options from the `[discovery]` section.
    pub fn enumerate_options(&self) -> Result<EnumerateOptions, String> {
        let options =
            EnumerateOptions::default().with_include_unverified(self.discovery.include_unverified);
        match self.discovery.templates {
            Some(ref templates) => {
                let templates = FallbackTemplates::new(templates.iter().cloned())
                    .map_err(|e| format!("invalid [discovery] templates: {}", e.message()))?;
                Ok(options.with_templates(templates))
            }
            None => Ok(options),
        }
    }

    /// Checks the configuration without contacting any server.
    ///
    /// Secret references are not resolved.
    pub fn validate(&self) -> Result<(), String> {
        for (index, server) in self.servers.iter().enumerate() {
            server
                .check()
                .map_err(|e| format!("servers[{}]: {}", index, e))?;
        }

        let duplicates = duplicate_identities(self.servers.iter().map(ServerSettings::identity));
        if let Some(first) = duplicates.first() {
            return Err(format!("server configured more than once: {}", first));
        }

        self.enumerate_options()?;
        Ok(())
    }

    /// Returns a copy with inline passwords masked. References are kept.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for server in &mut config.servers {
            if !server.password.is_empty() && !SecretRef::parse(&server.password).is_reference() {
                server.password = REDACTED.to_string();
            }
        }
        config
    }
}

impl ServerSettings {
    /// Identity used for duplicate detection.
    pub fn identity(&self) -> EndpointIdentity {
        ServerEndpoint::new(&self.url, &self.username, "").identity()
    }

    /// Resolves the password and builds the endpoint to probe.
    pub fn to_endpoint(&self) -> Result<ServerEndpoint, SecretError> {
        let password = secret::resolve(&self.password)?;
        Ok(ServerEndpoint::new(&self.url, &self.username, password).with_verify_tls(self.verify_ssl))
    }

    fn check(&self) -> Result<(), String> {
        let url = Url::parse(self.url.trim())
            .map_err(|e| format!("invalid url `{}`: {}", self.url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("url `{}` must use http or https", self.url));
        }
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        Ok(())
    }
}
