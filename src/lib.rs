//! Backup Triage - classifies per-site backup logs and files GLPI tickets for them.
//!
//! Logs are classified into clean and error blocks and staged per site
//! (`ingest`, `classify`, `staging`). A ticket run then probes GLPI for sites
//! already reported in the date range and files one ticket per remaining
//! site, closing it when the site's logs were clean (`run`, `glpi`).

pub mod classify;
pub mod config;
pub mod effects;
pub mod glpi;
pub mod ingest;
pub mod progress;
pub mod run;
pub mod server;
pub mod staging;
pub mod types;
pub mod units;

#[cfg(test)]
pub(crate) mod test_utils;
