//! Per-run ticket orchestration.
//!
//! `TicketRun` owns everything one run touches: the interpreter (and so the
//! session), the staging handle, the standardization table and the progress
//! sink. Nothing is shared between runs.
//!
//! # Flow
//!
//! ```text
//! open session → probe interval → resolve pending ─┬─ NothingToDo
//!                                                  └─ for each site:
//!                                                       lookup → create → read → task
//!                                                       → [solution if clean] → unstage
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::effects::{NewTicket, TicketEffect, TicketInterpreter, TicketResponse, UserData};
use crate::progress::{ProgressSink, messages};
use crate::staging::StagingArea;
use crate::types::{DateInterval, SiteName, TicketId};
use crate::units::{SiteTable, UnitEntry};

use super::RunError;
use super::probe::probe_interval;
use super::resolve::{Resolution, resolve_pending};
use super::session::open_session;

/// Title of backup-check tickets. Also the probe key.
pub const DEFAULT_TICKET_TITLE: &str = "Verificar backup FTP Servidor";
/// Description of backup-check tickets.
pub const DEFAULT_TICKET_DESCRIPTION: &str = "Validar a conexão do FTP e evidenciar.";
/// Prefix GLPI puts in front of entity names.
pub const DEFAULT_REGION_PREFIX: &str = "REGIAO SACA > ";
/// Pause before a solution is posted, so the new task is visible remotely.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Fixed parameters of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub ticket_title: String,
    pub ticket_description: String,
    pub region_prefix: String,
    pub settle_delay: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            ticket_title: DEFAULT_TICKET_TITLE.to_string(),
            ticket_description: DEFAULT_TICKET_DESCRIPTION.to_string(),
            region_prefix: DEFAULT_REGION_PREFIX.to_string(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// A ticket filed by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiledTicket {
    pub site: SiteName,
    pub ticket: TicketId,
    /// True if a solution was posted (the site's logs were clean).
    pub closed: bool,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// No staged site needed a ticket.
    NothingToDo,
    /// Every pending site was ticketed.
    Completed { tickets: Vec<FiledTicket> },
}

/// Uppercases the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One ticket run.
pub struct TicketRun<T, P> {
    interpreter: T,
    staging: StagingArea,
    table: Arc<SiteTable>,
    progress: P,
    config: RunConfig,
}

impl<T, P> TicketRun<T, P>
where
    T: TicketInterpreter + Sync,
    T::Error: fmt::Display,
    P: ProgressSink,
{
    pub fn new(
        interpreter: T,
        staging: StagingArea,
        table: Arc<SiteTable>,
        progress: P,
        config: RunConfig,
    ) -> Self {
        TicketRun {
            interpreter,
            staging,
            table,
            progress,
            config,
        }
    }

    /// Returns the interpreter, e.g. to inspect recorded effects.
    pub fn interpreter(&self) -> &T {
        &self.interpreter
    }

    /// Runs the whole flow for `login` over `interval`.
    ///
    /// Probe and resolve failures propagate as they are. A per-site failure
    /// is published and ends the run as `SiteFailed`; a site missing from
    /// the table ends it as `StandardizationMiss` before any ticket is
    /// created for that site.
    #[instrument(skip(self), fields(start = %interval.start, end = %interval.end))]
    pub async fn execute(
        &self,
        login: &str,
        interval: &DateInterval,
    ) -> Result<RunOutcome, RunError> {
        let user = open_session(&self.interpreter, login).await?;

        let reported = probe_interval(
            &self.interpreter,
            &self.config.ticket_title,
            &self.config.region_prefix,
            interval,
        )
        .await?;
        info!(reported = reported.len(), "Probe complete");

        let sites = match resolve_pending(&reported, &self.staging, &self.table, &self.progress)? {
            Resolution::NothingToDo => {
                info!("Nothing pending");
                return Ok(RunOutcome::NothingToDo);
            }
            Resolution::Pending(sites) => sites,
        };

        let mut tickets = Vec::with_capacity(sites.len());
        for site in sites {
            self.progress.publish(&messages::site_started(&site));

            let Some(unit) = self.table.lookup(&site) else {
                warn!(site = %site, "Site missing from standardization table");
                self.progress.publish(&messages::standardization_miss(&site));
                return Err(RunError::StandardizationMiss(site));
            };

            match self.file_site(&site, unit, &user).await {
                Ok(filed) => tickets.push(filed),
                Err(e) => {
                    warn!(site = %site, error = %e, "Site failed, aborting run");
                    self.progress
                        .publish(&messages::site_failed(&site, &e.to_string()));
                    return Err(RunError::SiteFailed {
                        site,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.progress.publish(&messages::run_complete());
        info!(tickets = tickets.len(), "Run complete");
        Ok(RunOutcome::Completed { tickets })
    }

    async fn call(&self, effect: TicketEffect) -> Result<TicketResponse, RunError> {
        self.interpreter
            .interpret(effect)
            .await
            .map_err(|e| RunError::Remote(e.to_string()))
    }

    /// Tickets one site and removes it from staging.
    #[instrument(skip(self, unit, user), fields(entity = %unit.id))]
    async fn file_site(
        &self,
        site: &SiteName,
        unit: &UnitEntry,
        user: &UserData,
    ) -> Result<FiledTicket, RunError> {
        let created = self
            .call(TicketEffect::CreateTicket(NewTicket {
                entity: unit.id,
                title: self.config.ticket_title.clone(),
                description: self.config.ticket_description.clone(),
            }))
            .await?;
        let ticket = match created {
            TicketResponse::TicketCreated { id } => id,
            other => return Err(RunError::unexpected("create_ticket", &other)),
        };
        self.progress.publish(&messages::ticket_created(site, ticket));

        let staged = self.staging.read_site(site)?;

        match self
            .call(TicketEffect::AddTask {
                ticket,
                content: staged.content,
                author: Some(user.id),
            })
            .await?
        {
            TicketResponse::TaskAdded => {}
            other => return Err(RunError::unexpected("add_task", &other)),
        }

        if staged.is_clean {
            tokio::time::sleep(self.config.settle_delay).await;
            match self
                .call(TicketEffect::AddSolution {
                    ticket,
                    content: capitalize(&user.name),
                })
                .await?
            {
                TicketResponse::SolutionAdded => {}
                other => return Err(RunError::unexpected("add_solution", &other)),
            }
        }

        self.staging.remove_site(site)?;
        self.progress.publish(&messages::site_done(site));
        self.progress.publish(&messages::separator());
        info!(%ticket, closed = staged.is_clean, "Site ticketed");

        Ok(FiledTicket {
            site: site.clone(),
            ticket,
            closed: staged.is_clean,
        })
    }
}
