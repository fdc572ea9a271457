//! GLPI REST client and effect interpreter.
//!
//! This module executes ticketing effects against a GLPI instance. It
//! implements the `TicketInterpreter` trait defined in the effects module.
//!
//! Key features:
//! - One session per client, opened by the `InitSession` effect
//! - GLPI's array-shaped error bodies mapped to categorized errors
//! - No automatic retry: every failure surfaces to the caller

mod client;
mod error;
mod interpreter;

pub use client::{Credentials, GlpiClient, GlpiEndpoint};
pub use error::{GlpiApiError, GlpiErrorKind};
pub use interpreter::{interpret_ticket_effect, parse_search_rows, search_query, ticket_body};
