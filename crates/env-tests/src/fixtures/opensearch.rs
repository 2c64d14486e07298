//! OpenSearch and OpenSearch Dashboards client fixtures.
//!
//! `OpenSearchClient` talks to the search API over one or more hosts,
//! trying each in order on connection failure. `DashboardsClient` talks to
//! the Dashboards UI status endpoint with basic credentials.

use check_common::config::{self, ConfigError};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// OpenSearch fixture errors.
#[derive(Debug, Error)]
pub enum OpenSearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search request returned status {status}: {body}")]
    SearchFailed { status: u16, body: String },

    #[error("status request returned status {status}: {body}")]
    StatusFailed { status: u16, body: String },

    #[error("no OpenSearch host reachable, last error: {0}")]
    NoHostReachable(reqwest::Error),
}

/// Search response view: only the returned hits matter to the checks.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    hits: Vec<serde_json::Value>,
}

/// Client for the OpenSearch search API.
pub struct OpenSearchClient {
    base_urls: Vec<String>,
    http_client: Client,
}

impl OpenSearchClient {
    /// Build a client from the environment.
    ///
    /// `OPENSEARCH_HOSTS` (comma separated), `OPENSEARCH_PORT` and
    /// `OPENSEARCH_TLS` are required. `OPENSEARCH_VERIFY_CERTS` is
    /// consulted only when TLS is enabled; verification is forced on for
    /// plain HTTP.
    pub fn from_env() -> Result<Self, OpenSearchError> {
        let hosts = config::required("OPENSEARCH_HOSTS")?;
        let port = config::required("OPENSEARCH_PORT")?;
        let tls = config::required_bool("OPENSEARCH_TLS")?;
        let verify_certs = if tls {
            config::required_bool("OPENSEARCH_VERIFY_CERTS")?
        } else {
            true
        };

        let scheme = if tls { "https" } else { "http" };
        let base_urls: Vec<String> = hosts
            .split(',')
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(|host| format!("{scheme}://{host}:{port}"))
            .collect();
        if base_urls.is_empty() {
            return Err(OpenSearchError::Config(ConfigError::Invalid {
                name: "OPENSEARCH_HOSTS".to_string(),
                value: hosts,
            }));
        }

        Self::new(base_urls, verify_certs)
    }

    /// Create a client against explicit base URLs.
    pub fn new(base_urls: Vec<String>, verify_certs: bool) -> Result<Self, OpenSearchError> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(!verify_certs)
            .build()?;
        Ok(Self {
            base_urls,
            http_client,
        })
    }

    /// Count documents matching a log level under an index pattern.
    ///
    /// Hosts are tried in order; a connection error moves on to the next
    /// host, while an HTTP-level failure from a reachable host is final.
    pub async fn count_log_hits(
        &self,
        index_pattern: &str,
        log_level: &str,
        size: usize,
    ) -> Result<usize, OpenSearchError> {
        let query = serde_json::json!({
            "query": {
                "match": {
                    "log_level": log_level,
                }
            }
        });

        let mut last_error = None;
        for base_url in &self.base_urls {
            let url = format!("{base_url}/{index_pattern}/_search?size={size}");
            tracing::debug!(url = %url, log_level, "querying OpenSearch");

            let response = match self.http_client.post(&url).json(&query).send().await {
                Ok(response) => response,
                Err(err) => {
                    last_error = Some(err);
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                return Err(OpenSearchError::SearchFailed {
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }

            let result: SearchResponse = response.json().await?;
            return Ok(result.hits.hits.len());
        }

        match last_error {
            Some(err) => Err(OpenSearchError::NoHostReachable(err)),
            // new() and from_env() guarantee at least one base URL
            None => Err(OpenSearchError::Config(ConfigError::Missing {
                name: "OPENSEARCH_HOSTS".to_string(),
            })),
        }
    }
}

/// Status response view from the Dashboards `/api/status` endpoint.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: StatusBody,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    overall: OverallStatus,
}

#[derive(Debug, Deserialize)]
struct OverallStatus {
    state: String,
}

/// Client for the OpenSearch Dashboards status endpoint.
pub struct DashboardsClient {
    base_url: String,
    username: String,
    password: String,
    http_client: Client,
}

impl DashboardsClient {
    /// Build a client from `OPENSEARCH_DASHBOARDS_URL`,
    /// `OPENSEARCH_DASHBOARDS_USERNAME` and `OPENSEARCH_DASHBOARDS_PASSWORD`
    /// (all required).
    pub fn from_env() -> Result<Self, OpenSearchError> {
        Ok(Self::new(
            config::required("OPENSEARCH_DASHBOARDS_URL")?,
            config::required("OPENSEARCH_DASHBOARDS_USERNAME")?,
            config::required("OPENSEARCH_DASHBOARDS_PASSWORD")?,
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

    /// The overall state reported by the status endpoint.
    pub async fn overall_state(&self) -> Result<String, OpenSearchError> {
        let url = format!("{}/api/status", self.base_url);
        tracing::debug!(url = %url, "querying Dashboards status");

        let response = self
            .http_client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OpenSearchError::StatusFailed {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let result: StatusResponse = response.json().await?;
        Ok(result.status.overall.state)
    }
}
