//! Reconciles already-reported sites against the staging area.

use tracing::{debug, info};

use crate::progress::{ProgressSink, messages};
use crate::staging::{StagingArea, StagingError};
use crate::types::SiteName;
use crate::units::SiteTable;

use super::RunError;
use super::probe::ReportedUnit;

/// What is left to ticket after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Staged sites still needing a ticket, in staging order.
    Pending(Vec<SiteName>),
    /// Nothing is staged, or everything staged was already reported.
    NothingToDo,
}

/// Decides which staged sites still need a ticket.
///
/// With reported units, every staged site whose table entry names one of
/// them is removed before listing what remains. Staged directory names are
/// matched case-insensitively, the same way the orchestrator looks them up.
/// A missing or empty staging area is `NothingToDo`; any other staging
/// failure propagates.
pub fn resolve_pending(
    reported: &[ReportedUnit],
    staging: &StagingArea,
    table: &SiteTable,
    progress: &dyn ProgressSink,
) -> Result<Resolution, RunError> {
    if !reported.is_empty() {
        let names: Vec<String> = reported.iter().map(|u| u.site_name.clone()).collect();
        progress.publish(&messages::already_reported(&names));

        for site in staged_sites(staging)? {
            let reported = table
                .lookup(&site)
                .is_some_and(|entry| names.contains(&entry.name));
            if reported {
                staging.remove_site(&site)?;
                info!(site = %site, "Dropped staged site already reported");
            }
        }
    }

    match staging.list_sites() {
        Ok(sites) => {
            debug!(pending = sites.len(), "Resolved pending sites");
            Ok(Resolution::Pending(sites))
        }
        Err(StagingError::NotFound(_) | StagingError::Empty(_)) => {
            progress.publish(&messages::nothing_to_send());
            Ok(Resolution::NothingToDo)
        }
        Err(e) => Err(e.into()),
    }
}

/// Lists staged sites, treating a missing or empty staging area as empty.
fn staged_sites(staging: &StagingArea) -> Result<Vec<SiteName>, StagingError> {
    match staging.list_sites() {
        Ok(sites) => Ok(sites),
        Err(StagingError::NotFound(_) | StagingError::Empty(_)) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
