//! Host checks: Docker runtime posture.
//!
//! Each test performs one read-only query against the container runtime
//! and asserts the deployed configuration. Collection-valued checks
//! (containers, networks) expand into labeled sub-checks so one bad
//! element does not hide the others.

#![cfg(feature = "host")]

use check_common::report::SubChecks;
use check_common::version::{Version, VersionBounds};
use env_tests::fixtures::docker::{self, DockerHost};

fn docker() -> DockerHost {
    DockerHost::from_env()
}

#[test]
fn test_docker_version() {
    let bounds = VersionBounds::from_env("DOCKER_VERSION_MIN", "DOCKER_VERSION_MAX")
        .expect("DOCKER_VERSION_MIN/MAX should be valid version strings when set");

    let report = docker()
        .version()
        .expect("docker version should be queryable");
    let client = report
        .client
        .expect("docker should report a client version");
    let server = report
        .server
        .expect("docker should report a server version");

    let client_version =
        Version::parse(&client.version).expect("client version string should parse");
    let server_version =
        Version::parse(&server.version).expect("server version string should parse");

    if let Err(violation) = bounds.check(&client_version) {
        panic!("client {violation}");
    }
    if let Err(violation) = bounds.check(&server_version) {
        panic!("server {violation}");
    }
}

#[test]
fn test_docker_containers_healthy() {
    let docker = docker();
    let containers = docker
        .list_containers()
        .expect("docker containers should be enumerable");

    let mut subchecks = SubChecks::new("docker containers");
    for container in containers {
        let label = format!("container={}", container.names);
        let result = match docker.inspect(&container.id) {
            Ok(details) => {
                let problems = docker::container_problems(&details);
                if problems.is_empty() {
                    Ok(())
                } else {
                    Err(problems.join("; "))
                }
            }
            Err(err) => Err(format!("inspect failed: {err}")),
        };
        subchecks.check(label, result);
    }

    if let Err(failures) = subchecks.finish() {
        panic!("{failures}");
    }
}

#[test]
fn test_docker_storage_driver() {
    let info = docker().info().expect("docker info should be queryable");
    let expected = docker::expected_storage_driver();
    if let Err(problem) = docker::check_storage_driver(&info, &expected) {
        panic!("{problem}");
    }
}

#[test]
fn test_no_bridge_network_exists() {
    let networks = docker()
        .networks()
        .expect("docker networks should be enumerable");

    let mut subchecks = SubChecks::new("docker networks");
    for network in networks {
        let label = format!("network={}", network.name);
        let result = match docker::bridge_network_problem(&network) {
            Some(problem) => Err(problem),
            None => Ok(()),
        };
        subchecks.check(label, result);
    }

    if let Err(failures) = subchecks.finish() {
        panic!("{failures}");
    }
}

#[test]
fn test_ip_forwarding_disabled() {
    let info = docker().info().expect("docker info should be queryable");
    assert_eq!(
        info.ipv4_forwarding,
        Some(false),
        "daemon should report IPv4 forwarding disabled"
    );
}

#[test]
fn test_iptables_manipulation_disabled() {
    let info = docker().info().expect("docker info should be queryable");
    assert_eq!(
        info.bridge_nf_iptables,
        Some(false),
        "daemon should report iptables manipulation disabled"
    );
    assert_eq!(
        info.bridge_nf_ip6tables,
        Some(false),
        "daemon should report ip6tables manipulation disabled"
    );
}

#[test]
fn test_live_restore_enabled() {
    let info = docker().info().expect("docker info should be queryable");
    assert_eq!(
        info.live_restore_enabled,
        Some(true),
        "daemon should report live restore enabled"
    );
}
