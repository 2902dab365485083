use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failure of a single query against the metrics backend.
///
/// `name` is the batch name of the query (e.g. `totalCPU`), or the raw query
/// text when the query was issued outside a named batch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("query {name} failed: {message}")]
    Transport { name: String, message: String },

    #[error("query {name} returned an unexpected payload: {message}")]
    Parse { name: String, message: String },
}

impl QueryError {
    pub fn name(&self) -> &str {
        match self {
            QueryError::Transport { name, .. } | QueryError::Parse { name, .. } => name,
        }
    }

    /// Re-labels the error with the batch name it was issued under.
    pub fn with_name(self, name: &str) -> Self {
        match self {
            QueryError::Transport { message, .. } => QueryError::Transport {
                name: name.to_string(),
                message,
            },
            QueryError::Parse { message, .. } => QueryError::Parse {
                name: name.to_string(),
                message,
            },
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CostModelError {
    #[error("illegal time range: {0}")]
    InvalidRange(String),

    #[error("{0}")]
    InsufficientData(String),

    #[error("cluster cost queries failed: {0}")]
    BatchFailed(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Body parsing error: {0}")]
    BodyParsingError(String),

    #[error("Metrics backend error: {0}")]
    MetricsBackendError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Helper for mapping any unknown error into internal error
pub fn internal_error<E: ToString>(err: E) -> AppError {
    AppError::InternalServerError(err.to_string())
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(validation) = err.downcast_ref::<validator::ValidationErrors>() {
            return AppError::BodyParsingError(validation.to_string());
        }

        match err.downcast_ref::<CostModelError>() {
            Some(CostModelError::InvalidRange(_)) => AppError::BodyParsingError(err.to_string()),
            Some(CostModelError::InsufficientData(_)) => AppError::NotFound(err.to_string()),
            Some(CostModelError::BatchFailed(_)) => AppError::MetricsBackendError(err.to_string()),
            None => internal_error(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Choose status codes per variant
        let status = match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BodyParsingError(_) => StatusCode::BAD_REQUEST,
            AppError::MetricsBackendError(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        // String provided by thiserror → safe JSON message
        let body = Json(json!({
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}
