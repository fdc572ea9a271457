//! `POST /` (ticket run) and `POST /entity` (entity listing).

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use tracing::info;

use super::request::{EntityRequest, RunRequest};
use super::{ApiError, AppState, Connector};
use crate::effects::EntityData;
use crate::run::{RunOutcome, TicketRun, visible_entities};

const RUN_COMPLETE: &str = "🎉 Processamento de chamados concluído!";
const NOTHING_TO_SEND: &str = "Não tem arquivo para ser enviado!";

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

/// Files tickets for every pending staged site.
///
/// The caller only learns the final result; intermediate status goes to the
/// progress feed.
///
/// # Response
///
/// - 200 OK with `{message, outcome, ...}`
/// - 400 Bad Request with `{message: [problems]}`
/// - 409 Conflict while another run or ingest holds the staging area
/// - 500 Internal Server Error when the run aborts
pub async fn run_handler<C: Connector>(
    State(state): State<AppState<C>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, ApiError> {
    let Json(request) = payload?;
    let (credentials, interval) = request.validate()?;

    let _guard = state.staging_lock().try_lock().map_err(|_| ApiError::Busy)?;

    let login = credentials.user.clone();
    let interpreter = state.connector().connect(credentials)?;
    let run = TicketRun::new(
        interpreter,
        state.staging().clone(),
        state.table(),
        state.hub().progress.clone(),
        state.run_config().clone(),
    );
    let outcome = run.execute(&login, &interval).await?;

    let message = match outcome {
        RunOutcome::NothingToDo => NOTHING_TO_SEND,
        RunOutcome::Completed { .. } => RUN_COMPLETE,
    };
    info!(user = %login, result = message, "Ticket run finished");
    Ok(Json(RunResponse { message, outcome }))
}

/// Lists entities visible to the user, minus the excluded ones.
pub async fn entity_handler<C: Connector>(
    State(state): State<AppState<C>>,
    payload: Result<Json<EntityRequest>, JsonRejection>,
) -> Result<Json<Vec<EntityData>>, ApiError> {
    let Json(request) = payload?;
    let credentials = request.validate()?;

    let interpreter = state.connector().connect(credentials)?;
    let entities = visible_entities(&interpreter, state.excluded_entity_marker()).await?;
    Ok(Json(entities))
}
