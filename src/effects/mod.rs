//! Effects-as-data for ticketing operations.
//!
//! This module defines effect types that describe remote ticketing operations
//! without executing them. This enables:
//! - Run logic that is tested against a mock interpreter
//! - Logging/tracing of intended operations
//! - A single seam where the HTTP client plugs in

pub mod interpreter;
pub mod ticket;

pub use interpreter::TicketInterpreter;
pub use ticket::{
    EntityData, NewTicket, TicketEffect, TicketResponse, TicketRow, UserData,
};
