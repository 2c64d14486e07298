//! Fixtures for querying the host and monitoring services.
//!
//! Each fixture resolves its connection parameters from the environment,
//! constructs a short-lived client handle, and surfaces construction
//! problems as setup errors distinct from assertion failures.

pub mod docker;
pub mod grafana;
pub mod opensearch;
pub mod prometheus;
pub mod selinux;

pub use docker::DockerHost;
pub use grafana::GrafanaClient;
pub use opensearch::{DashboardsClient, OpenSearchClient};
pub use prometheus::PrometheusClient;
