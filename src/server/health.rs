//! Liveness endpoint.

use axum::http::StatusCode;

/// `GET /health`: always `200 OK` with body `OK` while the process serves
/// requests. Does not touch GLPI or the staging area.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
