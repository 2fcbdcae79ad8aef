//! CLI, configuration and host setup glue
//!
//! This crate provides the `davhome` command-line interface and the mapping
//! from probe outcomes to setup behaviour.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;
pub mod setup;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
