use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::errors::QueryError;

/// Wire access to the metrics backend. Implementations return the raw JSON
/// response; parsing into series happens in the query executor.
#[async_trait]
pub trait PrometheusTransport: Send + Sync {
    async fn query(&self, query: &str) -> Result<Value, QueryError>;

    async fn query_range(
        &self,
        query: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<Value, QueryError>;
}
