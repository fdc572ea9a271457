//! Session opening and entity listing over any ticket interpreter.

use std::fmt;

use tracing::{debug, instrument};

use crate::effects::{EntityData, TicketEffect, TicketInterpreter, TicketResponse, UserData};

use super::RunError;

async fn call<T>(interpreter: &T, effect: TicketEffect) -> Result<TicketResponse, RunError>
where
    T: TicketInterpreter,
    T::Error: fmt::Display,
{
    interpreter
        .interpret(effect)
        .await
        .map_err(|e| RunError::Remote(e.to_string()))
}

/// Logs in and resolves the acting user by login name.
#[instrument(skip(interpreter))]
pub async fn open_session<T>(interpreter: &T, login: &str) -> Result<UserData, RunError>
where
    T: TicketInterpreter,
    T::Error: fmt::Display,
{
    match call(interpreter, TicketEffect::InitSession).await? {
        TicketResponse::SessionOpened => {}
        other => return Err(RunError::unexpected("init_session", &other)),
    }

    let effect = TicketEffect::LookupUser {
        login: login.to_string(),
    };
    match call(interpreter, effect).await? {
        TicketResponse::User(user) => {
            debug!(user_id = %user.id, "Resolved acting user");
            Ok(user)
        }
        other => Err(RunError::unexpected("lookup_user", &other)),
    }
}

/// Logs in and lists entities, hiding those whose complete name contains
/// `excluded_marker`.
pub async fn visible_entities<T>(
    interpreter: &T,
    excluded_marker: &str,
) -> Result<Vec<EntityData>, RunError>
where
    T: TicketInterpreter,
    T::Error: fmt::Display,
{
    match call(interpreter, TicketEffect::InitSession).await? {
        TicketResponse::SessionOpened => {}
        other => return Err(RunError::unexpected("init_session", &other)),
    }

    match call(interpreter, TicketEffect::ListEntities).await? {
        TicketResponse::Entities(entities) => Ok(entities
            .into_iter()
            .filter(|e| excluded_marker.is_empty() || !e.completename.contains(excluded_marker))
            .collect()),
        other => Err(RunError::unexpected("list_entities", &other)),
    }
}
