//! HTTP error mapping.
//!
//! Every error body is `{"message": ...}`: a list of problems for validation
//! failures, a single string otherwise.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::ingest::IngestError;
use crate::run::RunError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body failed validation.
    #[error("invalid request: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A run or ingest already holds the staging area.
    #[error("a run is already in progress")]
    Busy,

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![format!("body {}", rejection.body_text())])
    }
}

impl From<Vec<String>> for ApiError {
    fn from(problems: Vec<String>) -> Self {
        ApiError::Validation(problems)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(problems) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "message": problems })))
                    .into_response();
            }
            ApiError::Busy => StatusCode::CONFLICT,
            ApiError::Ingest(IngestError::ReadRoot { .. } | IngestError::NoSites(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Ingest(_) | ApiError::Run(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SiteName;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::Validation(vec![]).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Busy.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Run(RunError::StandardizationMiss(SiteName::new("unit-x")))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Ingest(IngestError::NoSites("./unidade".into()))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }
}
