//! Effect interpreter trait.
//!
//! The trait-based design lets the ticket run be driven by the real GLPI
//! client in production and by a recording mock in tests.

use std::future::Future;

use super::ticket::{TicketEffect, TicketResponse};

/// Interprets ticketing effects against a remote ticketing system.
///
/// Implementations own the session: credentials and the session token live
/// inside the interpreter, so all effects executed through one instance act
/// as the same user.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct CannedInterpreter {
///     created: TicketId,
/// }
///
/// impl TicketInterpreter for CannedInterpreter {
///     type Error = String;
///
///     async fn interpret(&self, effect: TicketEffect) -> Result<TicketResponse, Self::Error> {
///         match effect {
///             TicketEffect::CreateTicket(_) => Ok(TicketResponse::TicketCreated { id: self.created }),
///             TicketEffect::SearchTickets { .. } => Ok(TicketResponse::Tickets(vec![])),
///             other => Err(format!("unexpected effect: {:?}", other)),
///         }
///     }
/// }
/// ```
pub trait TicketInterpreter {
    /// The error type returned by this interpreter.
    type Error;

    /// Execute a ticketing effect and return its response.
    fn interpret(
        &self,
        effect: TicketEffect,
    ) -> impl Future<Output = Result<TicketResponse, Self::Error>> + Send;
}
