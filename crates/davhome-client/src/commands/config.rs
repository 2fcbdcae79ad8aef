//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout, inline passwords masked.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;

    println!(
        "Configuration is valid ({} server{}).",
        config.servers.len(),
        if config.servers.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    let config_path = ClientConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerSettings;

    #[test]
    fn redacted_config_serializes() {
        let config = ClientConfig {
            servers: vec![ServerSettings {
                url: "https://cal.example.com".to_string(),
                username: "alice".to_string(),
                password: "hunter2".to_string(),
                verify_ssl: true,
            }],
            ..Default::default()
        };
        let out = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(out.contains("[[servers]]"));
        assert!(!out.contains("hunter2"));

        let parsed: ClientConfig = toml::from_str(&out).unwrap();
        assert_eq!(parsed.servers[0].username, "alice");
        assert!(parsed.discovery.templates.is_none());
    }

    #[test]
    fn validate_reports_config_error() {
        let config = ClientConfig {
            servers: vec![
                ServerSettings {
                    url: "https://cal.example.com".to_string(),
                    username: "alice".to_string(),
                    password: String::new(),
                    verify_ssl: true,
                };
                2
            ],
            ..Default::default()
        };
        assert!(matches!(validate(&config), Err(ClientError::Config(_))));
        assert!(validate(&ClientConfig::default()).is_ok());
    }
}
