//! Finding the log files of each site for an interval.
//!
//! Layout: `<root>/<site>/Logs/log YYYY-MM-DD.txt`. Root entries whose name
//! contains a `.` are not sites.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::types::{DateInterval, SiteName, parse_day};

use super::IngestError;

/// Directory under each site holding its daily logs.
pub const LOGS_DIR: &str = "Logs";

/// A site and the log files selected for it, in name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLogs {
    pub site: SiteName,
    pub logs: Vec<String>,
}

/// Extracts the day from a `log YYYY-MM-DD.txt` file name.
pub fn log_day(file_name: &str) -> Option<NaiveDate> {
    let stem = file_name.strip_prefix("log ")?.strip_suffix(".txt")?;
    parse_day(stem).ok()
}

fn sorted_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        if let Some(name) = entry?.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Lists every site under `root` with its logs inside `interval`.
///
/// A site whose `Logs` directory cannot be read is skipped. A site with no
/// log in the interval is kept with an empty list.
pub fn discover_sites(root: &Path, interval: &DateInterval) -> Result<Vec<SiteLogs>, IngestError> {
    let entries = sorted_names(root).map_err(|source| IngestError::ReadRoot {
        path: root.to_path_buf(),
        source,
    })?;
    if entries.is_empty() {
        return Err(IngestError::NoSites(root.to_path_buf()));
    }

    let mut sites = Vec::new();
    for name in entries.into_iter().filter(|n| !n.contains('.')) {
        let logs_dir = root.join(&name).join(LOGS_DIR);
        let files = match sorted_names(&logs_dir) {
            Ok(files) => files,
            Err(e) => {
                debug!(site = %name, error = %e, "Skipping site without readable logs");
                continue;
            }
        };
        let logs = files
            .into_iter()
            .filter(|f| log_day(f).is_some_and(|day| interval.contains(day)))
            .collect();
        sites.push(SiteLogs {
            site: SiteName::new(name),
            logs,
        });
    }
    Ok(sites)
}
