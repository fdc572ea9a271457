//! Core domain types.
//!
//! This module contains the identifiers and value types shared by the log
//! classifier, the staging area and the ticket run.

pub mod ids;
pub mod interval;

// Re-export commonly used types at the module level
pub use ids::{EntityId, SiteName, TicketId, UserId};
pub use interval::{DAY_FORMAT, DateInterval, IntervalError, parse_day};
