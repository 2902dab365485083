use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::QueryError;

pub const CLUSTER_ID_LABEL: &str = "cluster_id";

/// One `(timestamp, value)` pair of a series. Timestamps are unix seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: f64,
    pub value: f64,
}

/// A single labeled time series returned by an instant or range query.
///
/// An instant query yields exactly one sample per series, a range query one
/// per step. A series with no samples is valid and means "no data".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub labels: BTreeMap<String, String>,
    pub values: Vec<Sample>,
}

impl QueryResult {
    pub fn new(labels: BTreeMap<String, String>, values: Vec<Sample>) -> Self {
        Self { labels, values }
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Cluster the series belongs to; an absent or empty `cluster_id` label
    /// falls back to `default_cluster_id`.
    pub fn cluster_id_or<'a>(&'a self, default_cluster_id: &'a str) -> &'a str {
        match self.label(CLUSTER_ID_LABEL) {
            Some(id) if !id.is_empty() => id,
            _ => default_cluster_id,
        }
    }

    pub fn first_value(&self) -> Option<f64> {
        self.values.first().map(|s| s.value)
    }
}

#[derive(Debug, Deserialize)]
struct PromResponse {
    status: String,
    data: Option<PromData>,
    #[serde(rename = "errorType")]
    error_type: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
enum PromData {
    Vector(Vec<PromSeries>),
    Matrix(Vec<PromSeries>),
    Scalar(PromSample),
    String(Value),
}

#[derive(Debug, Deserialize)]
struct PromSeries {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    value: Option<PromSample>,
    values: Option<Vec<PromSample>>,
}

// Prometheus encodes sample values as strings: [1435781451.781, "1"]
type PromSample = (f64, String);

fn to_sample((timestamp, raw): PromSample) -> Result<Sample, String> {
    raw.parse::<f64>()
        .map(|value| Sample { timestamp, value })
        .map_err(|e| format!("invalid sample value {:?} at {}: {}", raw, timestamp, e))
}

/// Parses a raw Prometheus API response into query results.
///
/// Errors carry an empty query name; the executor labels them with the query
/// they belong to.
pub fn parse_query_results(raw: &Value) -> Result<Vec<QueryResult>, QueryError> {
    let parse_err = |message: String| QueryError::Parse {
        name: String::new(),
        message,
    };

    let resp: PromResponse =
        serde_json::from_value(raw.clone()).map_err(|e| parse_err(e.to_string()))?;

    if resp.status != "success" {
        return Err(QueryError::Transport {
            name: String::new(),
            message: format!(
                "{}: {}",
                resp.error_type.unwrap_or_else(|| resp.status.clone()),
                resp.error.unwrap_or_default()
            ),
        });
    }

    let data = resp
        .data
        .ok_or_else(|| parse_err("response is missing the data field".into()))?;

    match data {
        PromData::Vector(series) | PromData::Matrix(series) => series
            .into_iter()
            .map(|s| {
                let samples = match (s.value, s.values) {
                    (Some(v), _) => vec![v],
                    (None, Some(vs)) => vs,
                    (None, None) => Vec::new(),
                };
                let values = samples
                    .into_iter()
                    .map(to_sample)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(parse_err)?;
                Ok(QueryResult::new(s.metric, values))
            })
            .collect(),
        PromData::Scalar(sample) => {
            let value = to_sample(sample).map_err(parse_err)?;
            Ok(vec![QueryResult::new(BTreeMap::new(), vec![value])])
        }
        PromData::String(_) => Err(parse_err("string results are not supported".into())),
    }
}
