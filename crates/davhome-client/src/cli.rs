//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use davhome_core::{ComponentKind, ServerEndpoint};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// davhome - CalDAV connectivity and calendar discovery
#[derive(Debug, Parser)]
#[command(name = "davhome")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "DAVHOME_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that a server is reachable and accepts the credentials
    Probe {
        #[command(flatten)]
        target: TargetArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List the calendars supporting a component kind
    Calendars {
        #[command(flatten)]
        target: TargetArgs,

        /// Component kind to list (event or task)
        #[arg(long, short, default_value = "event")]
        kind: ComponentKind,

        /// Only list calendars that report supporting the kind
        #[arg(long)]
        verified_only: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Run every discovery step and report what the server answers
    Diagnose {
        #[command(flatten)]
        target: TargetArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Selects the server to talk to.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Index of the configured server to use
    #[arg(long, short, default_value_t = 0, conflicts_with = "url")]
    pub server: usize,

    /// Server URL (instead of a configured server)
    #[arg(long, requires = "username")]
    pub url: Option<String>,

    /// Username for --url
    #[arg(long, short)]
    pub username: Option<String>,

    /// Password for --url (supports `env::` and `pass::` references)
    #[arg(long, env = "DAVHOME_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Do not verify TLS certificates
    #[arg(long)]
    pub insecure: bool,
}

impl TargetArgs {
    /// Resolves the endpoint from the flags or the configuration file.
    pub fn resolve(&self, config: &ClientConfig) -> ClientResult<ServerEndpoint> {
        let endpoint = match self.url {
            Some(ref url) => {
                let username = self.username.as_deref().ok_or_else(|| {
                    ClientError::Config("--username is required with --url".to_string())
                })?;
                let password = crate::secret::resolve(self.password.as_deref().unwrap_or(""))?;
                ServerEndpoint::new(url, username, password)
            }
            None => {
                let settings = config.servers.get(self.server).ok_or_else(|| {
                    if config.servers.is_empty() {
                        ClientError::Config(format!(
                            "no server configured. Pass --url and --username, or add to {}:\n  \
                             [[servers]]\n  \
                             url = \"https://cal.example.com\"\n  \
                             username = \"alice\"\n  \
                             password = \"env::CALDAV_PASSWORD\"",
                            ClientConfig::default_path().display()
                        ))
                    } else {
                        ClientError::Config(format!(
                            "server index {} out of range ({} configured)",
                            self.server,
                            config.servers.len()
                        ))
                    }
                })?;
                settings.to_endpoint()?
            }
        };

        Ok(if self.insecure {
            endpoint.with_verify_tls(false)
        } else {
            endpoint
        })
    }
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration (inline passwords masked)
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerSettings;
    use clap::CommandFactory;

    fn configured() -> ClientConfig {
        ClientConfig {
            servers: vec![ServerSettings {
                url: "https://cal.example.com".to_string(),
                username: "alice".to_string(),
                password: "secret".to_string(),
                verify_ssl: true,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_calendars_command() {
        let cli = Cli::try_parse_from(["davhome", "calendars", "--kind", "task", "--json"]).unwrap();
        match cli.command {
            Command::Calendars { kind, json, .. } => {
                assert_eq!(kind, ComponentKind::Task);
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn url_requires_username() {
        assert!(Cli::try_parse_from(["davhome", "probe", "--url", "https://x"]).is_err());
    }

    #[test]
    fn resolve_from_config() {
        let target = TargetArgs::default();
        let endpoint = target.resolve(&configured()).unwrap();
        assert_eq!(endpoint.username, "alice");
        assert_eq!(endpoint.password, "secret");
        assert!(endpoint.verify_tls);
    }

    #[test]
    fn resolve_from_flags() {
        let target = TargetArgs {
            url: Some("https://other.example.com".to_string()),
            username: Some("bob".to_string()),
            password: Some("pw".to_string()),
            insecure: true,
            ..Default::default()
        };
        let endpoint = target.resolve(&configured()).unwrap();
        assert_eq!(endpoint.base_url, "https://other.example.com");
        assert_eq!(endpoint.username, "bob");
        assert!(!endpoint.verify_tls);
    }

    #[test]
    fn resolve_without_servers_explains_setup() {
        let err = TargetArgs::default()
            .resolve(&ClientConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("[[servers]]"));

        let err = TargetArgs {
            server: 3,
            ..Default::default()
        }
        .resolve(&configured())
        .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
