//! HTTP/JSON admin client.
//!
//! # Wire contract
//!
//! | call | request | response |
//! |------|---------|----------|
//! | describe cluster | `GET /v1/cluster` | `{"nodes": [...]}` |
//! | list resources | `GET /v1/resources?include_internal=<bool>` | `{"resources": [...]}` |
//! | describe resources | `POST /v1/resources/describe` `{"names": [...]}` | `{"descriptions": {...}}` |
//!
//! Every request carries the [`CLIENT_ID_HEADER`]. A `null` or missing
//! collection is read as empty.
//!
//! # Failover
//!
//! The bootstrap string is a comma-separated endpoint list. Each call tries
//! the endpoints in order and returns the first success; if every endpoint
//! fails, the last error is returned.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ClusterAdmin, ListResourcesOptions};
use crate::types::{Node, ResourceDescription, ResourceListing};
use crate::{KaijuError, Result};

/// Header carrying the configured client identifier.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Connection settings for [`HttpClusterAdmin`].
///
/// ```rust
/// # use kaiju::AdminConfig;
/// # use std::time::Duration;
/// let config = AdminConfig::new("broker-1:8082,broker-2:8082", "kaiju")
///     .request_timeout(Duration::from_secs(10));
/// assert_eq!(config.request_timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Comma-separated admin endpoints (`host:port` or full URLs).
    pub bootstrap_servers: String,
    /// Identifier sent with every request.
    pub client_id: String,
    /// Per-request timeout. Default: 30s.
    pub request_timeout: Duration,
}

impl AdminConfig {
    pub fn new(bootstrap_servers: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            client_id: client_id.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Deserialize)]
struct ClusterResponse {
    #[serde(default)]
    nodes: Option<Vec<Node>>,
}

#[derive(Deserialize)]
struct ResourcesResponse {
    #[serde(default)]
    resources: Option<Vec<ResourceListing>>,
}

#[derive(Serialize)]
struct DescribeRequest<'a> {
    names: &'a [String],
}

#[derive(Deserialize)]
struct DescribeResponse {
    #[serde(default)]
    descriptions: Option<HashMap<String, ResourceDescription>>,
}

/// [`ClusterAdmin`] over an HTTP/JSON admin endpoint.
///
/// [`close`](ClusterAdmin::close) drops the underlying connection pool;
/// requests already in flight finish on their own clone of it.
pub struct HttpClusterAdmin {
    client: Mutex<Option<reqwest::Client>>,
    endpoints: Vec<String>,
    client_id: String,
}

impl HttpClusterAdmin {
    /// Build a client from connection settings.
    ///
    /// Fails if no endpoint or an empty client id is configured.
    pub fn new(config: &AdminConfig) -> Result<Self> {
        let endpoints = parse_endpoints(&config.bootstrap_servers)?;
        let client_id = config.client_id.trim();
        if client_id.is_empty() {
            return Err(KaijuError::Configuration(
                "client id must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                KaijuError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        info!(endpoints = ?endpoints, client_id, "created admin client");
        Ok(Self {
            client: Mutex::new(Some(client)),
            endpoints,
            client_id: client_id.to_string(),
        })
    }

    /// Endpoints in failover order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Whether [`close`](ClusterAdmin::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock_client().is_none()
    }

    fn lock_client(&self) -> std::sync::MutexGuard<'_, Option<reqwest::Client>> {
        self.client.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle on the connection pool, or `ClientClosed` once closed.
    fn client(&self) -> Result<reqwest::Client> {
        self.lock_client().clone().ok_or(KaijuError::ClientClosed)
    }

    /// Run `request` against each endpoint until one succeeds.
    async fn with_failover<T, F, Fut>(&self, operation: &'static str, request: F) -> Result<T>
    where
        F: Fn(reqwest::Client, String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_err = None;
        for endpoint in &self.endpoints {
            let client = self.client()?;
            match request(client, endpoint.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(endpoint = %endpoint, operation, error = %e, "admin request failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or(KaijuError::ClientClosed))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        client: reqwest::Client,
        url: String,
    ) -> Result<T> {
        let response = client
            .get(&url)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .send()
            .await?;
        decode(response).await
    }
}

#[async_trait]
impl ClusterAdmin for HttpClusterAdmin {
    fn name(&self) -> &str {
        "http"
    }

    async fn describe_cluster(&self) -> Result<Vec<Node>> {
        let response: ClusterResponse = self
            .with_failover("describe_cluster", |client, base| {
                self.get_json(client, format!("{base}/v1/cluster"))
            })
            .await?;
        Ok(response.nodes.unwrap_or_default())
    }

    async fn list_resources(
        &self,
        options: &ListResourcesOptions,
    ) -> Result<Vec<ResourceListing>> {
        let response: ResourcesResponse = self
            .with_failover("list_resources", |client, base| {
                self.get_json(
                    client,
                    format!(
                        "{base}/v1/resources?include_internal={}",
                        options.include_internal
                    ),
                )
            })
            .await?;
        Ok(response.resources.unwrap_or_default())
    }

    async fn describe_resources(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, ResourceDescription>> {
        let body = DescribeRequest { names };
        let response: DescribeResponse = self
            .with_failover("describe_resources", |client, base| {
                let request = client
                    .post(format!("{base}/v1/resources/describe"))
                    .header(CLIENT_ID_HEADER, &self.client_id)
                    .json(&body);
                async move { decode(request.send().await?).await }
            })
            .await?;
        Ok(response.descriptions.unwrap_or_default())
    }

    fn close(&self) {
        if self.lock_client().take().is_some() {
            info!(client_id = %self.client_id, "closing admin client");
        }
    }
}

/// Map a response to `T`, turning non-2xx statuses into [`KaijuError::Api`].
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(KaijuError::Api {
            status: status.as_u16(),
            message,
        });
    }
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| KaijuError::Decode(e.to_string()))
}

/// Split a bootstrap string into base URLs.
///
/// Bare `host:port` entries get an `http://` scheme; trailing slashes are
/// dropped.
fn parse_endpoints(bootstrap: &str) -> Result<Vec<String>> {
    let endpoints: Vec<String> = bootstrap
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let url = if s.contains("://") {
                s.to_string()
            } else {
                format!("http://{s}")
            };
            url.trim_end_matches('/').to_string()
        })
        .collect();

    if endpoints.is_empty() {
        return Err(KaijuError::Configuration(
            "no bootstrap servers configured".to_string(),
        ));
    }
    Ok(endpoints)
}
