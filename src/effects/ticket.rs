//! Ticketing effect types.
//!
//! These types describe operations against the remote ticketing system as
//! data, without executing them. The GLPI interpreter executes them over
//! HTTP; tests execute them against an in-memory mock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{EntityId, TicketId, UserId};

/// A ticketing effect.
///
/// Effects are session-scoped: the interpreter owns the credentials and the
/// session token, so effects never carry them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicketEffect {
    // ─── Session ──────────────────────────────────────────────────────────────
    /// Open a session with the interpreter's credentials.
    InitSession,

    /// Resolve a user record by exact login name.
    LookupUser { login: String },

    // ─── Queries ──────────────────────────────────────────────────────────────
    /// Find tickets whose title contains `title` and whose date field
    /// matches `day`.
    SearchTickets { title: String, day: NaiveDate },

    /// List all entities visible to the session.
    ListEntities,

    // ─── Ticket Mutations ─────────────────────────────────────────────────────
    /// Open a new ticket under an entity.
    CreateTicket(NewTicket),

    /// Attach a task (the evidence body) to a ticket.
    AddTask {
        ticket: TicketId,
        content: String,
        author: Option<UserId>,
    },

    /// Attach a solution to a ticket, closing it.
    AddSolution { ticket: TicketId, content: String },
}

impl TicketEffect {
    /// Short name of the variant, matching its serialized tag.
    pub fn kind(&self) -> &'static str {
        match self {
            TicketEffect::InitSession => "init_session",
            TicketEffect::LookupUser { .. } => "lookup_user",
            TicketEffect::SearchTickets { .. } => "search_tickets",
            TicketEffect::ListEntities => "list_entities",
            TicketEffect::CreateTicket(_) => "create_ticket",
            TicketEffect::AddTask { .. } => "add_task",
            TicketEffect::AddSolution { .. } => "add_solution",
        }
    }
}

/// The caller-chosen fields of a new ticket.
///
/// Category, type, request source and assignment are fixed by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewTicket {
    /// The entity (site) the ticket is filed under.
    pub entity: EntityId,
    /// Ticket title. Also the probe key for later runs.
    pub title: String,
    /// Ticket description.
    pub description: String,
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub id: UserId,
    /// The login name.
    pub name: String,
}

/// One row of a ticket search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRow {
    /// The ticket id.
    pub id: TicketId,
    /// The entity's complete name, region prefix included.
    pub entity_name: String,
}

/// An entity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityData {
    pub id: EntityId,
    pub name: String,
    /// Hierarchical name, e.g. `"REGIAO SACA > UBS Centro"`.
    pub completename: String,
}

/// Response from a ticketing effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TicketResponse {
    /// Response to `InitSession`.
    SessionOpened,

    /// Response to `LookupUser`.
    User(UserData),

    /// Response to `SearchTickets`. Empty when nothing matched.
    Tickets(Vec<TicketRow>),

    /// Response to `ListEntities`.
    Entities(Vec<EntityData>),

    /// Response to `CreateTicket`.
    TicketCreated { id: TicketId },

    /// Response to `AddTask`.
    TaskAdded,

    /// Response to `AddSolution`.
    SolutionAdded,
}

impl TicketResponse {
    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TicketResponse::SessionOpened => "session_opened",
            TicketResponse::User(_) => "user",
            TicketResponse::Tickets(_) => "tickets",
            TicketResponse::Entities(_) => "entities",
            TicketResponse::TicketCreated { .. } => "ticket_created",
            TicketResponse::TaskAdded => "task_added",
            TicketResponse::SolutionAdded => "solution_added",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_serializes_with_type_tag() {
        let effect = TicketEffect::SearchTickets {
            title: "Verificar backup FTP Servidor".to_string(),
            day: NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
        };
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(json["type"], "search_tickets");
        assert_eq!(json["day"], "2025-08-05");

        let back: TicketEffect = serde_json::from_value(json).unwrap();
        assert_eq!(back, effect);
    }

    #[test]
    fn response_serializes_with_data_content() {
        let response = TicketResponse::TicketCreated { id: TicketId(77) };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "ticket_created");
        assert_eq!(json["data"]["id"], 77);
    }

    #[test]
    fn response_kind_names_variant() {
        assert_eq!(TicketResponse::TaskAdded.kind(), "task_added");
        assert_eq!(TicketResponse::Tickets(vec![]).kind(), "tickets");
    }
}
