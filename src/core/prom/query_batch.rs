use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::core::prom::error_collector::ErrorCollector;
use crate::core::prom::query_executor::QueryExecutor;
use crate::core::prom::query_result::QueryResult;
use crate::errors::QueryError;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryRequest {
    Instant(String),
    Range {
        query: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    },
}

/// A query submitted to a batch under a caller-chosen name. Errors reported
/// by the query are tagged with that name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedQuery {
    pub name: String,
    pub request: QueryRequest,
}

impl NamedQuery {
    pub fn instant(name: &str, query: String) -> Self {
        Self {
            name: name.to_string(),
            request: QueryRequest::Instant(query),
        }
    }

    pub fn range(
        name: &str,
        query: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Self {
        Self {
            name: name.to_string(),
            request: QueryRequest::Range {
                query,
                start,
                end,
                step,
            },
        }
    }
}

/// Output of a batch: one (possibly empty) result set per submitted query, in
/// submission order, plus every error any query reported.
#[derive(Debug)]
pub struct BatchResults {
    results: Vec<(String, Vec<QueryResult>)>,
    errors: Arc<ErrorCollector>,
}

impl BatchResults {
    pub fn get(&self, name: &str) -> &[QueryResult] {
        self.results
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r.as_slice())
            .unwrap_or(&[])
    }

    #[cfg(test)]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|(n, _)| n.as_str())
    }

    pub fn errors(&self) -> &ErrorCollector {
        &self.errors
    }

    /// Joins the messages of every error reported by the named queries, or
    /// `None` if none of them failed.
    pub fn fatal_errors(&self, fatal: &[&str]) -> Option<String> {
        let messages: Vec<String> = fatal
            .iter()
            .flat_map(|name| self.errors.errors_for(name))
            .map(|e| e.to_string())
            .collect();

        if messages.is_empty() {
            None
        } else {
            Some(messages.join("; "))
        }
    }
}

/// Runs every query of the batch on its own task and waits for all of them.
///
/// A failing query never cancels its siblings: its error goes to the shared
/// collector and it still delivers an empty result set. There is no timeout
/// or cancellation here; the transport's own timeout bounds the batch.
pub async fn run_batch(executor: &QueryExecutor, queries: Vec<NamedQuery>) -> BatchResults {
    let collector = Arc::new(ErrorCollector::new());

    let handles: Vec<_> = queries
        .iter()
        .cloned()
        .map(|q| {
            let executor = executor.clone();
            let collector = collector.clone();
            tokio::spawn(async move {
                debug!("[{}] {:?}", q.name, q.request);
                let outcome = match &q.request {
                    QueryRequest::Instant(query) => executor.execute(query).await,
                    QueryRequest::Range {
                        query,
                        start,
                        end,
                        step,
                    } => executor.execute_range(query, *start, *end, *step).await,
                };

                match outcome {
                    Ok(results) => results,
                    Err(err) => {
                        collector.report(Some(err.with_name(&q.name)));
                        Vec::new()
                    }
                }
            })
        })
        .collect();

    // Completion barrier; drain afterwards in submission order
    let joined = join_all(handles).await;

    let results = queries
        .into_iter()
        .zip(joined)
        .map(|(q, outcome)| {
            let results = outcome.unwrap_or_else(|join_err| {
                warn!("query task {} did not complete: {}", q.name, join_err);
                collector.report(Some(QueryError::Transport {
                    name: q.name.clone(),
                    message: format!("query task did not complete: {}", join_err),
                }));
                Vec::new()
            });
            (q.name, results)
        })
        .collect();

    BatchResults {
        results,
        errors: collector,
    }
}
