use std::time::Duration as StdDuration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use crate::core::client::prometheus_transport_trait::PrometheusTransport;
use crate::errors::QueryError;

/// reqwest-backed client for the Prometheus HTTP API.
pub struct PrometheusClient {
    client: Client,
    base_url: String,
}

impl PrometheusClient {
    pub fn new(base_url: &str, timeout: StdDuration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    async fn read_body(query: &str, resp: Response) -> Result<Value, QueryError> {
        let status = resp.status();
        let text = resp.text().await.map_err(|e| QueryError::Transport {
            name: query.to_string(),
            message: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            // Prometheus reports rejected queries as JSON with an `error` field
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(text);
            return Err(QueryError::Transport {
                name: query.to_string(),
                message: format!("{}: {}", status, message),
            });
        }

        serde_json::from_str(&text).map_err(|e| QueryError::Parse {
            name: query.to_string(),
            message: format!("response is not JSON: {}", e),
        })
    }

    fn send_err(query: &str, err: reqwest::Error) -> QueryError {
        QueryError::Transport {
            name: query.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl PrometheusTransport for PrometheusClient {
    async fn query(&self, query: &str) -> Result<Value, QueryError> {
        let url = self.endpoint("query");
        debug!("GET {} query={}", url, query);

        let resp = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| Self::send_err(query, e))?;

        Self::read_body(query, resp).await
    }

    async fn query_range(
        &self,
        query: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<Value, QueryError> {
        let url = self.endpoint("query_range");
        let start = start.to_rfc3339_opts(SecondsFormat::Millis, true);
        let end = end.to_rfc3339_opts(SecondsFormat::Millis, true);
        let step = step.num_seconds().max(1).to_string();
        debug!("GET {} query={} start={} end={} step={}", url, query, start, end, step);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("step", step.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Self::send_err(query, e))?;

        Self::read_body(query, resp).await
    }
}
