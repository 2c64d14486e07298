//! Docker host fixture querying the container runtime over the docker CLI.
//!
//! Responses are modeled as read-only views with named optional fields so
//! the assertion contracts stay checkable without open-ended JSON lookups.
//! The pure predicates (`container_problems`, `check_storage_driver`,
//! `bridge_network_problem`) are separated from the CLI plumbing so the
//! check semantics can be exercised offline.

use std::collections::HashMap;
use std::process::Command;

use check_common::config;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Log driver every container is expected to use.
pub const EXPECTED_LOG_DRIVER: &str = "json-file";

/// Storage driver expected when `DOCKER_STORAGE_DRIVER` is unset.
pub const DEFAULT_STORAGE_DRIVER: &str = "overlay2";

/// Docker fixture errors. All variants are setup failures, not assertion
/// failures: the runtime could not be queried at all.
#[derive(Debug, Error)]
pub enum DockerError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("failed to decode `{command}` output: {source}")]
    Decode {
        command: String,
        source: serde_json::Error,
    },

    #[error("docker inspect returned no record for container {id}")]
    EmptyInspect { id: String },
}

/// Daemon info view (subset of `docker info`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DockerInfo {
    pub driver: Option<String>,
    #[serde(rename = "IPv4Forwarding")]
    pub ipv4_forwarding: Option<bool>,
    pub bridge_nf_iptables: Option<bool>,
    #[serde(rename = "BridgeNfIp6tables")]
    pub bridge_nf_ip6tables: Option<bool>,
    pub live_restore_enabled: Option<bool>,
}

/// Client and server version strings from `docker version`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionReport {
    pub client: Option<VersionInfo>,
    pub server: Option<VersionInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionInfo {
    pub version: String,
}

/// One line of `docker ps --format json`.
#[derive(Debug, Deserialize)]
pub struct ContainerSummary {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Names")]
    pub names: String,
}

/// Per-container inspection view (subset of `docker inspect`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDetails {
    pub name: Option<String>,
    pub state: ContainerState,
    pub host_config: Option<HostConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerState {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub restarting: bool,
    #[serde(default)]
    pub dead: bool,
    #[serde(rename = "OOMKilled", default)]
    pub oom_killed: bool,
    pub health: Option<Health>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Health {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    pub log_config: Option<LogConfig>,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    #[serde(rename = "Type")]
    pub driver: String,
    #[serde(rename = "Config")]
    pub options: Option<HashMap<String, String>>,
}

/// One line of `docker network ls --format json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkSummary {
    pub name: String,
    pub driver: String,
}

/// Handle to the container runtime on the host under test.
///
/// Queries go through the docker CLI; the binary is overridable with the
/// optional `DOCKER_BIN` environment variable.
pub struct DockerHost {
    binary: String,
}

impl DockerHost {
    /// Create a handle using `DOCKER_BIN`, defaulting to `docker`.
    pub fn from_env() -> Self {
        Self {
            binary: config::optional("DOCKER_BIN").unwrap_or_else(|| "docker".to_string()),
        }
    }

    /// Create a handle for a specific docker binary.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, DockerError> {
        let command = format!("{} {}", self.binary, args.join(" "));
        tracing::debug!(command = %command, "querying docker");
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|source| DockerError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(DockerError::CommandFailed {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Daemon info as a typed view.
    pub fn info(&self) -> Result<DockerInfo, DockerError> {
        let stdout = self.run(&["info", "--format", "json"])?;
        decode("docker info", &stdout)
    }

    /// Client and server version strings.
    pub fn version(&self) -> Result<VersionReport, DockerError> {
        let stdout = self.run(&["version", "--format", "json"])?;
        decode("docker version", &stdout)
    }

    /// Enumerate running containers.
    pub fn list_containers(&self) -> Result<Vec<ContainerSummary>, DockerError> {
        let stdout = self.run(&["ps", "--format", "json"])?;
        decode_lines("docker ps", &stdout)
    }

    /// Inspect one container by ID or name.
    pub fn inspect(&self, id: &str) -> Result<ContainerDetails, DockerError> {
        let stdout = self.run(&["inspect", id])?;
        let records: Vec<ContainerDetails> = decode("docker inspect", &stdout)?;
        records
            .into_iter()
            .next()
            .ok_or_else(|| DockerError::EmptyInspect { id: id.to_string() })
    }

    /// Enumerate networks.
    pub fn networks(&self) -> Result<Vec<NetworkSummary>, DockerError> {
        let stdout = self.run(&["network", "ls", "--format", "json"])?;
        decode_lines("docker network ls", &stdout)
    }
}

fn decode<T: DeserializeOwned>(command: &str, stdout: &str) -> Result<T, DockerError> {
    serde_json::from_str(stdout).map_err(|source| DockerError::Decode {
        command: command.to_string(),
        source,
    })
}

/// Decode newline-delimited JSON, as emitted by the list subcommands.
fn decode_lines<T: DeserializeOwned>(command: &str, stdout: &str) -> Result<Vec<T>, DockerError> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| decode(command, line))
        .collect()
}

/// Evaluate one container against the health contract.
///
/// Returns every violation rather than stopping at the first: the
/// container must be running and not restarting, dead or OOM-killed; a
/// configured health probe must report "healthy"; a present log config
/// must use the expected file-based driver with rotation limits set.
pub fn container_problems(details: &ContainerDetails) -> Vec<String> {
    let mut problems = Vec::new();
    let state = &details.state;
    if !state.running {
        problems.push("not running".to_string());
    }
    if state.restarting {
        problems.push("restarting".to_string());
    }
    if state.dead {
        problems.push("dead".to_string());
    }
    if state.oom_killed {
        problems.push("OOM-killed".to_string());
    }
    if let Some(health) = &state.health {
        if health.status != "healthy" {
            problems.push(format!(
                "health status is {:?}, expected \"healthy\"",
                health.status
            ));
        }
    }
    if let Some(log_config) = details
        .host_config
        .as_ref()
        .and_then(|host_config| host_config.log_config.as_ref())
    {
        if log_config.driver != EXPECTED_LOG_DRIVER {
            problems.push(format!(
                "log driver is {:?}, expected {EXPECTED_LOG_DRIVER:?}",
                log_config.driver
            ));
        }
        for option in ["max-file", "max-size"] {
            let configured = log_config
                .options
                .as_ref()
                .is_some_and(|options| options.contains_key(option));
            if !configured {
                problems.push(format!("log option {option:?} is not configured"));
            }
        }
    }
    problems
}

/// Storage driver the daemon is expected to use.
///
/// Read from the optional `DOCKER_STORAGE_DRIVER` variable, defaulting to
/// overlay2.
pub fn expected_storage_driver() -> String {
    config::optional("DOCKER_STORAGE_DRIVER").unwrap_or_else(|| DEFAULT_STORAGE_DRIVER.to_string())
}

/// Check the daemon's storage driver against the expected value.
pub fn check_storage_driver(info: &DockerInfo, expected: &str) -> Result<(), String> {
    match info.driver.as_deref() {
        Some(observed) if observed == expected => Ok(()),
        Some(observed) => Err(format!(
            "expected storage driver {expected:?}, observed {observed:?}"
        )),
        None => Err(format!(
            "daemon info does not report a storage driver, expected {expected:?}"
        )),
    }
}

/// Why a network violates the no-default-bridge contract, if it does.
pub fn bridge_network_problem(network: &NetworkSummary) -> Option<String> {
    if network.name == "bridge" {
        Some("default bridge network is present".to_string())
    } else if network.driver == "bridge" {
        Some(format!(
            "network {:?} uses the bridge driver",
            network.name
        ))
    } else {
        None
    }
}
