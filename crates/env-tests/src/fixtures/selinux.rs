//! SELinux posture fixture.
//!
//! The expected state comes from the required `SELINUX_STATE` variable and
//! the observed state from the line-oriented sestatus output, matched after
//! collapsing duplicate whitespace. When the expected state is disabled
//! only the status line is checked; there is no mode to verify.

use std::fmt;
use std::process::Command;

use check_common::config::{self, ConfigError};
use thiserror::Error;

/// Distributions that ship without SELinux support. The check is skipped
/// there, reported distinctly from pass and fail.
const UNSUPPORTED_DISTRIBUTIONS: [&str; 2] = ["debian", "ubuntu"];

/// SELinux fixture errors.
#[derive(Debug, Error)]
pub enum SelinuxError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to run sestatus: {0}")]
    Spawn(std::io::Error),

    #[error("sestatus exited with {status}: {stderr}")]
    CommandFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("failed to read /etc/os-release: {0}")]
    OsRelease(std::io::Error),
}

/// Expected SELinux state, a tri-state read from `SELINUX_STATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelinuxState {
    Enforcing,
    Permissive,
    Disabled,
}

impl SelinuxState {
    /// Read the expected state from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let value = config::required("SELINUX_STATE")?;
        match value.as_str() {
            "enforcing" => Ok(Self::Enforcing),
            "permissive" => Ok(Self::Permissive),
            "disabled" => Ok(Self::Disabled),
            _ => Err(ConfigError::Invalid {
                name: "SELINUX_STATE".to_string(),
                value,
            }),
        }
    }

    /// The value the sestatus status line should report.
    fn expected_status(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Enforcing | Self::Permissive => "enabled",
        }
    }

    fn mode(self) -> &'static str {
        match self {
            Self::Enforcing => "enforcing",
            Self::Permissive => "permissive",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for SelinuxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode())
    }
}

/// The host's distribution ID from /etc/os-release.
pub fn host_distribution() -> Result<String, SelinuxError> {
    let contents = std::fs::read_to_string("/etc/os-release").map_err(SelinuxError::OsRelease)?;
    Ok(parse_os_release_id(&contents).unwrap_or_default())
}

fn parse_os_release_id(contents: &str) -> Option<String> {
    contents
        .lines()
        .find_map(|line| line.strip_prefix("ID="))
        .map(|value| value.trim().trim_matches('"').to_string())
}

/// Whether the distribution implements SELinux at all.
pub fn selinux_supported(distribution: &str) -> bool {
    !UNSUPPORTED_DISTRIBUTIONS.contains(&distribution)
}

/// Run sestatus and return its output lines with duplicate whitespace
/// collapsed, ready for exact line matching.
pub fn sestatus() -> Result<Vec<String>, SelinuxError> {
    tracing::debug!("querying sestatus");
    let output = Command::new("sestatus")
        .output()
        .map_err(SelinuxError::Spawn)?;
    if !output.status.success() {
        return Err(SelinuxError::CommandFailed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(normalize_lines(&String::from_utf8_lossy(&output.stdout)))
}

/// Collapse runs of whitespace within each line to single spaces.
pub fn normalize_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect()
}

/// Check normalized sestatus output against the expected state.
///
/// The status line must match the expected enabled/disabled value. When
/// the expected state is enforcing or permissive, the current mode and the
/// mode from the config file must both match it; when disabled, the mode
/// lines are not checked.
pub fn check_status(lines: &[String], expected: SelinuxState) -> Result<(), String> {
    let status_line = format!("SELinux status: {}", expected.expected_status());
    if !lines.iter().any(|line| line == &status_line) {
        return Err(format!("expected line {status_line:?} in sestatus output"));
    }
    if expected != SelinuxState::Disabled {
        for prefix in ["Current mode:", "Mode from config file:"] {
            let mode_line = format!("{prefix} {}", expected.mode());
            if !lines.iter().any(|line| line == &mode_line) {
                return Err(format!("expected line {mode_line:?} in sestatus output"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENABLED_ENFORCING: &str = "\
SELinux status:                 enabled
SELinuxfs mount:                /sys/fs/selinux
Loaded policy name:             targeted
Current mode:                   enforcing
Mode from config file:          enforcing
Policy MLS status:              enabled
";

    fn lines(output: &str) -> Vec<String> {
        normalize_lines(output)
    }

    #[test]
    fn normalization_collapses_duplicate_whitespace() {
        let normalized = lines("SELinux status:                 enabled");
        assert_eq!(normalized, vec!["SELinux status: enabled"]);
    }

    #[test]
    fn disabled_expectation_checks_only_the_status_line() {
        let output = lines("SELinux status: disabled");
        assert!(check_status(&output, SelinuxState::Disabled).is_ok());

        // Mode lines are irrelevant when disabled is expected.
        let with_modes = lines("SELinux status: disabled\nCurrent mode: enforcing");
        assert!(check_status(&with_modes, SelinuxState::Disabled).is_ok());
    }

    #[test]
    fn enforcing_expectation_passes_on_enforcing_host() {
        let output = lines(ENABLED_ENFORCING);
        assert!(check_status(&output, SelinuxState::Enforcing).is_ok());
    }

    #[test]
    fn permissive_mode_fails_an_enforcing_expectation() {
        let output = lines(
            "SELinux status: enabled\nCurrent mode: permissive\nMode from config file: enforcing",
        );
        let problem = check_status(&output, SelinuxState::Enforcing).unwrap_err();
        assert!(problem.contains("Current mode: enforcing"));

        let config_only = lines(
            "SELinux status: enabled\nCurrent mode: enforcing\nMode from config file: permissive",
        );
        assert!(check_status(&config_only, SelinuxState::Enforcing).is_err());
    }

    #[test]
    fn disabled_host_fails_an_enforcing_expectation() {
        let output = lines("SELinux status: disabled");
        assert!(check_status(&output, SelinuxState::Enforcing).is_err());
    }

    #[test]
    fn os_release_id_parsing_handles_quotes() {
        assert_eq!(
            parse_os_release_id("NAME=\"Rocky Linux\"\nID=\"rocky\"\n"),
            Some("rocky".to_string())
        );
        assert_eq!(
            parse_os_release_id("NAME=\"Ubuntu\"\nID=ubuntu\n"),
            Some("ubuntu".to_string())
        );
        assert_eq!(parse_os_release_id("NAME=minimal\n"), None);
    }

    #[test]
    fn debian_family_is_unsupported() {
        assert!(!selinux_supported("debian"));
        assert!(!selinux_supported("ubuntu"));
        assert!(selinux_supported("rocky"));
        assert!(selinux_supported("centos"));
    }

    #[test]
    #[serial]
    fn expected_state_comes_from_the_environment() {
        std::env::set_var("SELINUX_STATE", "permissive");
        assert_eq!(SelinuxState::from_env().unwrap(), SelinuxState::Permissive);

        std::env::set_var("SELINUX_STATE", "on");
        assert!(SelinuxState::from_env().is_err());

        std::env::remove_var("SELINUX_STATE");
        assert!(SelinuxState::from_env().is_err());
    }
}
