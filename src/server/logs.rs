//! `POST /logs`: classify and stage the logs of a date range.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use tracing::info;

use super::request::LogsRequest;
use super::{ApiError, AppState, Connector};
use crate::ingest::{Ingestor, SiteReport};
use crate::progress::{ProgressSink, messages};

const LOGS_STAGED: &str = "Arquivo Gerado com sucesso";

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub message: &'static str,
    pub sites: Vec<SiteReport>,
}

/// Runs ingest on the blocking pool while holding the staging lock.
///
/// # Response
///
/// - 200 OK with `{message, sites}`
/// - 400 Bad Request with `{message: [problems]}`
/// - 404 Not Found if the log root is missing or empty
/// - 409 Conflict while a run holds the staging area
pub async fn logs_handler<C: Connector>(
    State(state): State<AppState<C>>,
    payload: Result<Json<LogsRequest>, JsonRejection>,
) -> Result<Json<LogsResponse>, ApiError> {
    let Json(request) = payload?;
    let interval = request.validate()?;

    let _guard = state.staging_lock().try_lock().map_err(|_| ApiError::Busy)?;

    let ingestor = Ingestor::new(
        state.vocabulary().clone(),
        state.overflow_threshold(),
        state.staging().clone(),
        state.hub().structure.clone(),
    );
    let root = state.log_root().to_path_buf();
    let sites = tokio::task::spawn_blocking(move || ingestor.ingest(&root, &interval))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    state.hub().structure.publish(&messages::ingest_complete());
    info!(sites = sites.len(), "Logs staged");
    Ok(Json(LogsResponse {
        message: LOGS_STAGED,
        sites,
    }))
}
