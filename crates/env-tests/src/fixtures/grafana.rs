//! Grafana client fixture for the admin statistics endpoint.

use check_common::config::{self, ConfigError};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Grafana client errors.
#[derive(Debug, Error)]
pub enum GrafanaError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("admin stats request returned status {status}: {body}")]
    StatsFailed { status: u16, body: String },
}

/// Admin statistics view (subset of `/api/admin/stats`).
#[derive(Debug, Deserialize)]
pub struct AdminStats {
    pub dashboards: u64,
    pub datasources: u64,
}

/// Client for the Grafana HTTP API, authenticated with basic credentials.
pub struct GrafanaClient {
    base_url: String,
    username: String,
    password: String,
    http_client: Client,
}

impl GrafanaClient {
    /// Build a client from `GRAFANA_URL`, `GRAFANA_USERNAME` and
    /// `GRAFANA_PASSWORD` (all required).
    pub fn from_env() -> Result<Self, GrafanaError> {
        Ok(Self::new(
            config::required("GRAFANA_URL")?,
            config::required("GRAFANA_USERNAME")?,
            config::required("GRAFANA_PASSWORD")?,
        ))
    }

    /// Create a client against an explicit endpoint.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            http_client: Client::new(),
        }
    }

    /// Fetch instance statistics from the admin API.
    pub async fn admin_stats(&self) -> Result<AdminStats, GrafanaError> {
        let url = format!("{}/api/admin/stats", self.base_url);
        tracing::debug!(url = %url, "querying Grafana admin stats");

        let response = self
            .http_client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GrafanaError::StatsFailed {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // base64("admin:s3cret")
    const BASIC_AUTH: &str = "Basic YWRtaW46czNjcmV0";

    fn client(server: &MockServer) -> GrafanaClient {
        GrafanaClient::new(server.uri(), "admin", "s3cret")
    }

    #[tokio::test]
    async fn admin_stats_decodes_counts_and_sends_basic_auth() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/admin/stats"))
            .and(header("Authorization", BASIC_AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "users": 3,
                "dashboards": 42,
                "datasources": 5,
                "playlists": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stats = client(&server)
            .admin_stats()
            .await
            .expect("admin stats should decode");
        assert_eq!(stats.dashboards, 42);
        assert_eq!(stats.datasources, 5);
    }

    #[tokio::test]
    async fn non_success_status_is_a_setup_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/admin/stats"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
            .mount(&server)
            .await;

        let err = client(&server)
            .admin_stats()
            .await
            .expect_err("unauthorized response should error");
        match err {
            GrafanaError::StatsFailed { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid credentials"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_slash_is_trimmed_from_the_base_url() {
        let client = GrafanaClient::new("http://grafana:3000/", "admin", "s3cret");
        assert_eq!(client.base_url, "http://grafana:3000");
    }
}
