//! HTTP server for backup triage.
//!
//! # Endpoints
//!
//! - `POST /logs` - Classifies and stages the logs of a date range
//! - `POST /` - Files tickets for staged sites (409 while another run holds staging)
//! - `POST /entity` - Lists the entities visible to a user
//! - `GET /ws/structure` - Websocket feed of the log tree during ingest
//! - `GET /ws/progress` - Websocket feed of ticket-run progress
//! - `GET /health` - Returns 200 if server is running

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

pub mod connect;
pub mod error;
pub mod health;
pub mod logs;
pub mod request;
pub mod tickets;
pub mod ws;

pub use connect::{Connector, GlpiConnector};
pub use error::ApiError;
pub use health::health_handler;
pub use logs::logs_handler;
pub use tickets::{entity_handler, run_handler};

use crate::classify::Vocabulary;
use crate::config::AppConfig;
use crate::progress::ProgressHub;
use crate::run::RunConfig;
use crate::staging::StagingArea;
use crate::units::SiteTable;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. It owns the
/// progress feeds and the lock that keeps runs and ingests from overlapping
/// on the staging area.
pub struct AppState<C> {
    inner: Arc<AppStateInner<C>>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<C> {
    connector: C,
    log_root: PathBuf,
    staging: StagingArea,
    vocabulary: Vocabulary,
    overflow_threshold: usize,
    table: Arc<SiteTable>,
    excluded_entity_marker: String,
    run_config: RunConfig,
    hub: ProgressHub,
    staging_lock: Mutex<()>,
}

impl<C: Connector> AppState<C> {
    /// Creates the state from loaded configuration.
    pub fn new(connector: C, config: &AppConfig, vocabulary: Vocabulary, table: SiteTable) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                connector,
                log_root: config.log_root.clone(),
                staging: StagingArea::new(config.staging_dir.clone()),
                vocabulary,
                overflow_threshold: config.overflow_threshold,
                table: Arc::new(table),
                excluded_entity_marker: config.excluded_entity_marker.clone(),
                run_config: config.run.clone(),
                hub: ProgressHub::default(),
                staging_lock: Mutex::new(()),
            }),
        }
    }

    pub fn connector(&self) -> &C {
        &self.inner.connector
    }

    pub fn log_root(&self) -> &Path {
        &self.inner.log_root
    }

    pub fn staging(&self) -> &StagingArea {
        &self.inner.staging
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.inner.vocabulary
    }

    pub fn overflow_threshold(&self) -> usize {
        self.inner.overflow_threshold
    }

    pub fn table(&self) -> Arc<SiteTable> {
        Arc::clone(&self.inner.table)
    }

    pub fn excluded_entity_marker(&self) -> &str {
        &self.inner.excluded_entity_marker
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.inner.run_config
    }

    pub fn hub(&self) -> &ProgressHub {
        &self.inner.hub
    }

    /// Held for the whole of a run or an ingest.
    pub fn staging_lock(&self) -> &Mutex<()> {
        &self.inner.staging_lock
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<C: Connector>(app_state: AppState<C>) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", post(run_handler::<C>))
        .route("/entity", post(entity_handler::<C>))
        .route("/logs", post(logs_handler::<C>))
        .route("/ws/structure", get(ws::structure_handler::<C>))
        .route("/ws/progress", get(ws::progress_handler::<C>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::test_utils::MockTicketInterpreter;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn app_state_accessors_work() {
        let (state, dir) = test_app_state(MockConnector::new(MockTicketInterpreter::new));
        assert_eq!(state.log_root(), dir.path().join("unidade"));
        assert_eq!(state.staging().root(), dir.path().join("tmp"));
        assert_eq!(state.overflow_threshold(), 2000);
        assert_eq!(state.table().len(), 2);
        assert_eq!(state.excluded_entity_marker(), "Comunicação");
    }

    #[test]
    fn app_state_clones_share_the_lock() {
        let (state, _dir) = test_app_state(MockConnector::new(MockTicketInterpreter::new));
        let cloned = state.clone();
        let _guard = state.staging_lock().try_lock().unwrap();
        assert!(cloned.staging_lock().try_lock().is_err());
    }

    #[tokio::test]
    async fn health_returns_200() {
        let (state, _dir) = test_app_state(MockConnector::new(MockTicketInterpreter::new));
        let app = build_router(state);

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (state, _dir) = test_app_state(MockConnector::new(MockTicketInterpreter::new));
        let app = build_router(state);

        let request = Request::builder()
            .uri("/webhook")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
