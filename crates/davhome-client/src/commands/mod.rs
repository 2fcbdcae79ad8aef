//! Subcommand implementations.

pub mod calendars;
pub mod config;
pub mod diagnose;
pub mod probe;
