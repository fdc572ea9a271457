//! Ticket run: probe the interval, resolve pending sites, file tickets.
//!
//! A run is strictly sequential. Days are probed in ascending order, sites
//! are processed in staging order, and every remote call is awaited before
//! the next is issued. The first per-site failure ends the run; sites
//! ticketed before it stay ticketed.

mod orchestrator;
pub mod probe;
pub mod resolve;
pub mod session;

use thiserror::Error;

use crate::effects::TicketResponse;
use crate::staging::StagingError;
use crate::types::SiteName;

pub use orchestrator::{FiledTicket, RunConfig, RunOutcome, TicketRun, capitalize};
pub use probe::{ReportedUnit, dedupe_by_site, probe_interval, strip_region};
pub use resolve::{Resolution, resolve_pending};
pub use session::{open_session, visible_entities};

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A ticketing call failed outside per-site processing.
    #[error("ticketing call failed: {0}")]
    Remote(String),

    /// The staging area could not be read or cleaned.
    #[error("staging error: {0}")]
    Staging(#[from] StagingError),

    /// A staged site has no entry in the standardization table.
    #[error("site {0} is not in the standardization table")]
    StandardizationMiss(SiteName),

    /// Processing of one site failed; the remaining sites were not attempted.
    #[error("failed to process site {site}: {reason}")]
    SiteFailed { site: SiteName, reason: String },

    /// The interpreter answered an effect with the wrong response kind.
    #[error("unexpected response to {effect}: {response}")]
    UnexpectedResponse {
        effect: &'static str,
        response: &'static str,
    },
}

impl RunError {
    pub(crate) fn unexpected(effect: &'static str, response: &TicketResponse) -> Self {
        RunError::UnexpectedResponse {
            effect,
            response: response.kind(),
        }
    }
}
