//! Environment-driven configuration for checks.
//!
//! Every expectation a check asserts against (version bounds, security
//! posture, service URLs and credentials) comes from the process
//! environment. Required settings fail fast with a clear error; optional
//! settings carry skip-if-absent semantics. Values are read once at check
//! time and never cached.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {name} is not set")]
    Missing { name: String },

    #[error("environment variable {name} has unrecognized value {value:?}")]
    Invalid { name: String, value: String },
}

/// Read a required environment variable.
///
/// A variable that is unset (or not valid unicode) is reported as missing
/// configuration, fatal for the checks that depend on it.
pub fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing {
        name: name.to_string(),
    })
}

/// Read an optional environment variable.
///
/// Returns `None` when unset, which callers interpret as "skip the bound
/// or feature this variable configures".
pub fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Parse a boolean from the small fixed vocabulary used across the suite.
///
/// Accepts (case-insensitively) `1/true/t/yes/y/on` and `0/false/f/no/n/off`.
pub fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Read a required boolean environment variable.
pub fn required_bool(name: &str) -> Result<bool, ConfigError> {
    let value = required(name)?;
    parse_bool(name, &value)
}
