//! Prometheus client fixture for connectivity and metric inventory checks.

use check_common::config::{self, ConfigError};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Prometheus client errors.
#[derive(Debug, Error)]
pub enum PrometheusError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Label values response from `/api/v1/label/__name__/values`.
#[derive(Debug, Deserialize)]
struct LabelValuesResponse {
    status: String,
    #[serde(default)]
    data: Vec<String>,
}

/// Client for the Prometheus HTTP API.
///
/// Certificate verification is disabled: monitoring deployments commonly
/// front Prometheus with self-signed TLS.
pub struct PrometheusClient {
    base_url: String,
    auth: Option<(String, String)>,
    http_client: Client,
}

impl PrometheusClient {
    /// Build a client from the environment.
    ///
    /// `PROMETHEUS_URL` is required. Basic credentials are applied only
    /// when `PROMETHEUS_USERNAME` is set, in which case
    /// `PROMETHEUS_PASSWORD` is required too.
    pub fn from_env() -> Result<Self, PrometheusError> {
        let base_url = config::required("PROMETHEUS_URL")?;
        let auth = match config::optional("PROMETHEUS_USERNAME") {
            Some(username) => Some((username, config::required("PROMETHEUS_PASSWORD")?)),
            None => None,
        };
        Self::new(base_url, auth)
    }

    /// Create a client against an explicit endpoint.
    pub fn new(
        base_url: impl Into<String>,
        auth: Option<(String, String)>,
    ) -> Result<Self, PrometheusError> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            http_client,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.http_client.get(url);
        if let Some((username, password)) = &self.auth {
            request = request.basic_auth(username, Some(password));
        }
        request
    }

    /// Probe connectivity to the Prometheus endpoint.
    pub async fn check_connection(&self) -> bool {
        tracing::debug!(url = %self.base_url, "probing Prometheus connectivity");
        self.get(&self.base_url)
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    /// List all known metric names.
    pub async fn all_metrics(&self) -> Result<Vec<String>, PrometheusError> {
        let url = format!("{}/api/v1/label/__name__/values", self.base_url);
        tracing::debug!(url = %url, "listing Prometheus metric names");

        let response = self.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PrometheusError::QueryFailed(format!("status {status}")));
        }

        let result: LabelValuesResponse = response.json().await?;
        if result.status != "success" {
            return Err(PrometheusError::QueryFailed(format!(
                "response status {:?}",
                result.status
            )));
        }
        Ok(result.data)
    }
}
