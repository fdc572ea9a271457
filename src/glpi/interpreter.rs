//! Ticketing effect interpreter for the GLPI REST API.
//!
//! Field conventions of the GLPI search engine used here:
//! - search option `1` is the ticket title, `26` the per-day date field;
//! - result rows carry the ticket id under key `"2"` and the entity's
//!   complete name under key `"80"`.
//!
//! No retries happen at this layer: a failed call surfaces immediately and
//! the run decides what to do with it.

use std::collections::HashMap;

use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::effects::{
    EntityData, NewTicket, TicketEffect, TicketInterpreter, TicketResponse, TicketRow, UserData,
};
use crate::types::{DAY_FORMAT, EntityId, TicketId, UserId};

use super::client::GlpiClient;
use super::error::GlpiApiError;

/// Search option of the ticket title.
pub const FIELD_TITLE: &str = "1";
/// Search option of the ticket id.
pub const FIELD_TICKET_ID: &str = "2";
/// Search option of the per-day date field.
pub const FIELD_DAY: &str = "26";
/// Search option of the entity complete name.
pub const FIELD_ENTITY: &str = "80";

// ─── Ticket Template ──────────────────────────────────────────────────────────

// Fixed metadata every backup-check ticket is filed with.
const ITIL_CATEGORY: u64 = 2;
/// GLPI ticket type 2 is "request".
const TICKET_TYPE_REQUEST: u64 = 2;
const REQUEST_SOURCE: u64 = 1;
const GLOBAL_VALIDATION: u64 = 1;
const REQUESTER_USER: u64 = 0;
const ASSIGNED_USER: u64 = 0;
const ASSIGNED_GROUP: u64 = 1;
const SOLUTION_STATUS: u64 = 1;

const LIST_RANGE: &str = "0-9999";

// ─── Response Shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SessionBody {
    session_token: String,
}

#[derive(Debug, Deserialize)]
struct CreatedBody {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    data: Vec<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct EntityRecord {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    completename: String,
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl TicketInterpreter for GlpiClient {
    type Error = GlpiApiError;

    async fn interpret(&self, effect: TicketEffect) -> Result<TicketResponse, Self::Error> {
        interpret_ticket_effect(self, effect).await
    }
}

/// Executes a single effect against GLPI.
pub async fn interpret_ticket_effect(
    client: &GlpiClient,
    effect: TicketEffect,
) -> Result<TicketResponse, GlpiApiError> {
    match effect {
        TicketEffect::InitSession => init_session(client).await,
        TicketEffect::LookupUser { login } => lookup_user(client, &login).await,
        TicketEffect::SearchTickets { title, day } => {
            search_tickets(client, &title, &day.format(DAY_FORMAT).to_string()).await
        }
        TicketEffect::ListEntities => list_entities(client).await,
        TicketEffect::CreateTicket(ticket) => create_ticket(client, ticket).await,
        TicketEffect::AddTask {
            ticket,
            content,
            author,
        } => add_task(client, ticket, content, author).await,
        TicketEffect::AddSolution { ticket, content } => {
            add_solution(client, ticket, content).await
        }
    }
}

// ─── Session ──────────────────────────────────────────────────────────────────

#[instrument(skip(client), fields(user = %client.credentials().user))]
async fn init_session(client: &GlpiClient) -> Result<TicketResponse, GlpiApiError> {
    let body = json!({
        "login": client.credentials().user,
        "password": client.credentials().password,
        "auth": client.auth_source(),
    });
    let value = client
        .send_expect_object(Method::POST, "/initSession", &[], Some(&body))
        .await?;
    let session: SessionBody = serde_json::from_value(value)
        .map_err(|e| GlpiApiError::decode(format!("initSession: {}", e)))?;
    client.set_session_token(session.session_token).await;
    info!("GLPI session opened");
    Ok(TicketResponse::SessionOpened)
}

async fn lookup_user(client: &GlpiClient, login: &str) -> Result<TicketResponse, GlpiApiError> {
    let records = client
        .send_expect_list(Method::GET, "/user", &[("range", LIST_RANGE.to_string())])
        .await?;
    let user = records
        .into_iter()
        .filter_map(|v| serde_json::from_value::<UserRecord>(v).ok())
        .find(|u| u.name == login)
        .ok_or_else(|| GlpiApiError::remote(format!("user {:?} not found", login), None))?;
    Ok(TicketResponse::User(UserData {
        id: UserId(user.id),
        name: user.name,
    }))
}

// ─── Queries ──────────────────────────────────────────────────────────────────

/// Builds the search criteria: title contains `title` AND day field contains `day`.
pub fn search_query(title: &str, day: &str) -> Vec<(&'static str, String)> {
    vec![
        ("criteria[0][field]", FIELD_TITLE.to_string()),
        ("criteria[0][searchtype]", "contains".to_string()),
        ("criteria[0][value]", title.to_string()),
        ("criteria[1][link]", "AND".to_string()),
        ("criteria[1][field]", FIELD_DAY.to_string()),
        ("criteria[1][searchtype]", "contains".to_string()),
        ("criteria[1][value]", day.to_string()),
        ("forcedisplay[0]", FIELD_TICKET_ID.to_string()),
        ("forcedisplay[1]", FIELD_ENTITY.to_string()),
    ]
}

/// Extracts ticket rows from a search body.
pub fn parse_search_rows(value: Value) -> Result<Vec<TicketRow>, GlpiApiError> {
    let body: SearchBody = serde_json::from_value(value)
        .map_err(|e| GlpiApiError::decode(format!("search/Ticket: {}", e)))?;
    if body.count == 0 {
        return Ok(Vec::new());
    }

    body.data
        .into_iter()
        .map(|row| {
            let id = match row.get(FIELD_TICKET_ID) {
                Some(Value::Number(n)) => n.as_u64(),
                Some(Value::String(s)) => s.trim().parse().ok(),
                _ => None,
            }
            .ok_or_else(|| GlpiApiError::decode("search row without a ticket id"))?;
            let entity_name = row
                .get(FIELD_ENTITY)
                .and_then(Value::as_str)
                .ok_or_else(|| GlpiApiError::decode("search row without an entity name"))?
                .to_string();
            Ok(TicketRow {
                id: TicketId(id),
                entity_name,
            })
        })
        .collect()
}

#[instrument(skip(client))]
async fn search_tickets(
    client: &GlpiClient,
    title: &str,
    day: &str,
) -> Result<TicketResponse, GlpiApiError> {
    let value = client
        .send_expect_object(Method::GET, "/search/Ticket", &search_query(title, day), None)
        .await?;
    let rows = parse_search_rows(value)?;
    debug!(matches = rows.len(), "Ticket search done");
    Ok(TicketResponse::Tickets(rows))
}

async fn list_entities(client: &GlpiClient) -> Result<TicketResponse, GlpiApiError> {
    let records = client
        .send_expect_list(Method::GET, "/Entity", &[("range", LIST_RANGE.to_string())])
        .await?;
    let entities = records
        .into_iter()
        .map(|v| {
            serde_json::from_value::<EntityRecord>(v)
                .map(|e| EntityData {
                    id: EntityId(e.id),
                    name: e.name,
                    completename: e.completename,
                })
                .map_err(|e| GlpiApiError::decode(format!("Entity: {}", e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TicketResponse::Entities(entities))
}

// ─── Ticket Mutations ─────────────────────────────────────────────────────────

/// Builds the `POST /Ticket` body.
pub fn ticket_body(ticket: &NewTicket) -> Value {
    json!({
        "input": {
            "entities_id": ticket.entity.0,
            "itilcategories_id": ITIL_CATEGORY,
            "type": TICKET_TYPE_REQUEST,
            "requesttypes_id": REQUEST_SOURCE,
            "global_validation": GLOBAL_VALIDATION,
            "name": ticket.title,
            "content": ticket.description,
            "_users_id_requester": REQUESTER_USER,
            "_users_id_assign": ASSIGNED_USER,
            "_groups_id_assign": ASSIGNED_GROUP,
        }
    })
}

#[instrument(skip(client, ticket), fields(entity = %ticket.entity))]
async fn create_ticket(
    client: &GlpiClient,
    ticket: NewTicket,
) -> Result<TicketResponse, GlpiApiError> {
    let value = client
        .send_expect_object(Method::POST, "/Ticket", &[], Some(&ticket_body(&ticket)))
        .await?;
    let created: CreatedBody = serde_json::from_value(value)
        .map_err(|e| GlpiApiError::decode(format!("Ticket: {}", e)))?;
    info!(ticket = created.id, "Ticket created");
    Ok(TicketResponse::TicketCreated {
        id: TicketId(created.id),
    })
}

#[instrument(skip(client, content), fields(bytes = content.len()))]
async fn add_task(
    client: &GlpiClient,
    ticket: TicketId,
    content: String,
    author: Option<UserId>,
) -> Result<TicketResponse, GlpiApiError> {
    let body = json!({
        "input": {
            "tickets_id": ticket.0,
            "content": content,
            "users_id": author.map(|u| u.0),
        }
    });
    client
        .send_expect_object(Method::POST, "/TicketTask", &[], Some(&body))
        .await?;
    Ok(TicketResponse::TaskAdded)
}

#[instrument(skip(client, content))]
async fn add_solution(
    client: &GlpiClient,
    ticket: TicketId,
    content: String,
) -> Result<TicketResponse, GlpiApiError> {
    let body = json!({
        "input": {
            "items_id": ticket.0,
            "itemtype": "Ticket",
            "status": SOLUTION_STATUS,
            "content": content,
        }
    });
    client
        .send_expect_object(
            Method::POST,
            &format!("/Ticket/{}/ITILSolution", ticket.0),
            &[],
            Some(&body),
        )
        .await?;
    Ok(TicketResponse::SolutionAdded)
}
