//! davhome CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use davhome_client::cli::{Cli, Command, ConfigAction};
use davhome_client::commands;
use davhome_client::config::ClientConfig;
use davhome_client::error::{ClientError, ClientResult};
use davhome_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path).map_err(ClientError::Config),
        None => ClientConfig::load().map_err(ClientError::Config),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tracing = if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing) {
        eprintln!("warning: {}", e);
    }

    match run(cli, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> ClientResult<ExitCode> {
    match cli.command {
        Command::Probe { target, json } => {
            let endpoint = target.resolve(config)?;
            let outcome = commands::probe::run(&endpoint, json).await?;
            Ok(if outcome.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Calendars {
            target,
            kind,
            verified_only,
            json,
        } => {
            let endpoint = target.resolve(config)?;
            let mut options = config.enumerate_options().map_err(ClientError::Config)?;
            if verified_only {
                options = options.with_include_unverified(false);
            }
            commands::calendars::run(&endpoint, kind, &options, json).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Diagnose { target, json } => {
            let endpoint = target.resolve(config)?;
            let options = config.enumerate_options().map_err(ClientError::Config)?;
            commands::diagnose::run(&endpoint, &options.templates, json).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { action } => {
            match action {
                ConfigAction::Dump => commands::config::dump(config)?,
                ConfigAction::Validate => commands::config::validate(config)?,
                ConfigAction::Path => commands::config::path()?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
