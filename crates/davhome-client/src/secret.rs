//! Secret references for passwords in `config.toml`.
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and takes the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is the password itself

use std::fmt;

const PASS_PREFIX: &str = "pass::";
const ENV_PREFIX: &str = "env::";

/// A password value as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretRef<'a> {
    /// Entry in the `pass` password store.
    Pass(&'a str),
    /// Environment variable.
    Env(&'a str),
    /// Inline plain text.
    Plain(&'a str),
}

/// Failure to resolve a [`SecretRef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// `pass` could not be started or exited with an error.
    Pass { path: String, detail: String },
    /// The environment variable is not set.
    MissingEnv(String),
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass { path, detail } => write!(f, "`pass show {}` failed: {}", path, detail),
            Self::MissingEnv(var) => write!(f, "environment variable `{}` is not set", var),
        }
    }
}

impl std::error::Error for SecretError {}

impl<'a> SecretRef<'a> {
    /// Parses a configuration value.
    pub fn parse(value: &'a str) -> Self {
        if let Some(path) = value.strip_prefix(PASS_PREFIX) {
            Self::Pass(path)
        } else if let Some(var) = value.strip_prefix(ENV_PREFIX) {
            Self::Env(var)
        } else {
            Self::Plain(value)
        }
    }

    /// Returns true for `pass::` and `env::` references.
    pub fn is_reference(&self) -> bool {
        !matches!(self, Self::Plain(_))
    }

    /// Resolves the reference to the secret value.
    pub fn resolve(&self) -> Result<String, SecretError> {
        match self {
            Self::Pass(path) => resolve_pass(path),
            Self::Env(var) => std::env::var(var).map_err(|_| SecretError::MissingEnv(var.to_string())),
            Self::Plain(value) => Ok(value.to_string()),
        }
    }
}

/// Resolves a configuration value that may be a secret reference.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    SecretRef::parse(value).resolve()
}

fn resolve_pass(path: &str) -> Result<String, SecretError> {
    let failed = |detail: String| SecretError::Pass {
        path: path.to_string(),
        detail,
    };

    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| failed(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failed(format!("exit {}: {}", output.status, stderr.trim())));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| failed("no output".to_string()))
}
