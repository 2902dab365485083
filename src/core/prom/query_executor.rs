use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::core::client::prometheus_transport_trait::PrometheusTransport;
use crate::core::prom::query_result::{parse_query_results, QueryResult};
use crate::errors::QueryError;

/// Runs a single fully-formed query and parses the response.
///
/// No retries here; retry policy, if any, belongs to the transport.
#[derive(Clone)]
pub struct QueryExecutor {
    transport: Arc<dyn PrometheusTransport>,
}

impl QueryExecutor {
    pub fn new(transport: Arc<dyn PrometheusTransport>) -> Self {
        Self { transport }
    }

    pub async fn execute(&self, query: &str) -> Result<Vec<QueryResult>, QueryError> {
        let raw = self.transport.query(query).await?;
        parse_query_results(&raw).map_err(|e| e.with_name(query))
    }

    pub async fn execute_range(
        &self,
        query: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<Vec<QueryResult>, QueryError> {
        let raw = self.transport.query_range(query, start, end, step).await?;
        parse_query_results(&raw).map_err(|e| e.with_name(query))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::{json, Value};

    use crate::core::client::prometheus_transport_trait::PrometheusTransport;
    use crate::errors::QueryError;

    /// Canned transport keyed by exact query text. Unknown queries answer with
    /// an empty vector.
    #[derive(Default)]
    pub struct MockTransport {
        pub responses: HashMap<String, Result<Value, String>>,
        pub calls: Mutex<Vec<String>>,
        pub range_calls: Mutex<Vec<(String, DateTime<Utc>, DateTime<Utc>, Duration)>>,
    }

    impl MockTransport {
        pub fn respond(mut self, query: &str, body: Value) -> Self {
            self.responses.insert(query.to_string(), Ok(body));
            self
        }

        pub fn fail(mut self, query: &str, message: &str) -> Self {
            self.responses.insert(query.to_string(), Err(message.to_string()));
            self
        }

        fn answer(&self, query: &str) -> Result<Value, QueryError> {
            match self.responses.get(query) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(message)) => Err(QueryError::Transport {
                    name: query.to_string(),
                    message: message.clone(),
                }),
                None => Ok(vector(vec![])),
            }
        }
    }

    #[async_trait]
    impl PrometheusTransport for MockTransport {
        async fn query(&self, query: &str) -> Result<Value, QueryError> {
            self.calls.lock().unwrap().push(query.to_string());
            self.answer(query)
        }

        async fn query_range(
            &self,
            query: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            step: Duration,
        ) -> Result<Value, QueryError> {
            self.range_calls
                .lock()
                .unwrap()
                .push((query.to_string(), start, end, step));
            self.answer(query)
        }
    }

    /// Instant-vector response; each entry is `(labels, value)`.
    pub fn vector(series: Vec<(Vec<(&str, &str)>, f64)>) -> Value {
        let result: Vec<Value> = series
            .into_iter()
            .map(|(labels, v)| {
                let metric: serde_json::Map<String, Value> = labels
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), json!(v)))
                    .collect();
                json!({ "metric": metric, "value": [1700000000.0, v.to_string()] })
            })
            .collect();
        json!({ "status": "success", "data": { "resultType": "vector", "result": result } })
    }

    /// Range-matrix response with a single unlabeled series.
    pub fn matrix(samples: Vec<(f64, f64)>) -> Value {
        let values: Vec<Value> = samples
            .into_iter()
            .map(|(t, v)| json!([t, v.to_string()]))
            .collect();
        json!({
            "status": "success",
            "data": { "resultType": "matrix", "result": [{ "metric": {}, "values": values }] }
        })
    }
}
