//! Environment Health-Check Suite
//!
//! This crate provides health-check tests for a deployed OpenStack host and
//! its monitoring stack. Each check performs one read-only query against a
//! live system (Docker daemon, SELinux, Grafana, OpenSearch, Prometheus) and
//! asserts an expected condition.
//!
//! # Features
//!
//! - `host`: Docker runtime and SELinux posture checks (run on the host under test)
//! - `monitoring`: Grafana, OpenSearch and Prometheus HTTP checks
//! - `all`: Enable both categories
//!
//! # Prerequisites
//!
//! 1. For `host` checks: docker CLI access and, on SELinux-capable
//!    distributions, the sestatus tool
//! 2. For `monitoring` checks: reachable service endpoints and credentials
//!    in the environment (see the per-fixture docs for variable names)
//!
//! # Usage
//!
//! ```bash
//! # From repo root - offline unit tests only (no default features)
//! cargo test
//!
//! # Host posture checks
//! cargo test -p env-tests --features host
//!
//! # Full suite against a live deployment
//! cargo test -p env-tests --features all
//! ```

pub mod fixtures;
