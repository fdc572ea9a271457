//! Shared test utilities: a scripted ticket interpreter, a recording progress
//! sink and arbitrary generators for property-based testing.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;

use proptest::prelude::*;

use crate::classify::fixtures;
use crate::effects::{
    EntityData, TicketEffect, TicketInterpreter, TicketResponse, TicketRow, UserData,
};
use crate::progress::ProgressSink;
use crate::types::{DAY_FORMAT, TicketId, UserId};

// ─── Mock Interpreter ─────────────────────────────────────────────────────────

/// An in-memory ticketing system.
///
/// Records every effect it receives, answers from scripted data, and fails
/// any effect whose kind was registered with `fail_on`.
#[derive(Debug, Default)]
pub struct MockTicketInterpreter {
    effects: Mutex<Vec<TicketEffect>>,
    user: Option<UserData>,
    searches: HashMap<String, Vec<TicketRow>>,
    entities: Vec<EntityData>,
    created_ids: Mutex<VecDeque<u64>>,
    failures: HashMap<&'static str, String>,
}

impl MockTicketInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `LookupUser` with this user, whatever login is asked for.
    pub fn with_user(mut self, id: u64, name: &str) -> Self {
        self.user = Some(UserData {
            id: UserId(id),
            name: name.to_string(),
        });
        self
    }

    /// Answers `SearchTickets` for `day` (`YYYY-MM-DD`) with `rows`.
    pub fn with_search(mut self, day: &str, rows: Vec<TicketRow>) -> Self {
        self.searches.insert(day.to_string(), rows);
        self
    }

    pub fn with_entities(mut self, entities: Vec<EntityData>) -> Self {
        self.entities = entities;
        self
    }

    /// Ids handed out by successive `CreateTicket` effects.
    pub fn with_created_ids(self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.created_ids.lock().unwrap().extend(ids);
        self
    }

    /// Fails every effect of `kind` (see `TicketEffect::kind`) with `message`.
    pub fn fail_on(mut self, kind: &'static str, message: &str) -> Self {
        self.failures.insert(kind, message.to_string());
        self
    }

    /// Every effect received so far, in order.
    pub fn effects(&self) -> Vec<TicketEffect> {
        self.effects.lock().unwrap().clone()
    }

    fn respond(&self, effect: TicketEffect) -> Result<TicketResponse, String> {
        self.effects.lock().unwrap().push(effect.clone());

        if let Some(message) = self.failures.get(effect.kind()) {
            return Err(message.clone());
        }

        match effect {
            TicketEffect::InitSession => Ok(TicketResponse::SessionOpened),
            TicketEffect::LookupUser { login } => self
                .user
                .clone()
                .map(TicketResponse::User)
                .ok_or_else(|| format!("user {login:?} not found")),
            TicketEffect::SearchTickets { day, .. } => Ok(TicketResponse::Tickets(
                self.searches
                    .get(&day.format(DAY_FORMAT).to_string())
                    .cloned()
                    .unwrap_or_default(),
            )),
            TicketEffect::ListEntities => Ok(TicketResponse::Entities(self.entities.clone())),
            TicketEffect::CreateTicket(_) => {
                let id = self
                    .created_ids
                    .lock()
                    .unwrap()
                    .pop_front()
                    .ok_or_else(|| "no scripted ticket id left".to_string())?;
                Ok(TicketResponse::TicketCreated { id: TicketId(id) })
            }
            TicketEffect::AddTask { .. } => Ok(TicketResponse::TaskAdded),
            TicketEffect::AddSolution { .. } => Ok(TicketResponse::SolutionAdded),
        }
    }
}

impl TicketInterpreter for MockTicketInterpreter {
    type Error = String;

    fn interpret(
        &self,
        effect: TicketEffect,
    ) -> impl Future<Output = Result<TicketResponse, Self::Error>> + Send {
        let result = self.respond(effect);
        async move { result }
    }
}

// ─── Recording Progress ───────────────────────────────────────────────────────

/// A progress sink that keeps every line.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    lines: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn publish(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

// ─── Generators ───────────────────────────────────────────────────────────────

/// Any vocabulary line or an unmarked one.
pub fn arb_log_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(fixtures::START.to_string()),
        Just(fixtures::RUNNING.to_string()),
        Just(fixtures::ERR_DISK.to_string()),
        Just(fixtures::REVERTING.to_string()),
        Just(fixtures::FINISHED.to_string()),
        Just(fixtures::PLAIN.to_string()),
        "[a-zA-Z0-9 :/]{0,40}",
    ]
}

pub fn arb_log_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_log_line(), 0..60)
}
