//! Log ingest: discover, classify and stage per-site logs for an interval.
//!
//! Each log file is decoded as UTF-16LE and scanned by a fresh
//! [`BlockScanner`](crate::classify::BlockScanner). The segments of all files
//! of a site are concatenated and split once, and the two bodies are written
//! to the staging area. The site/log tree is published on the structure feed
//! as files are processed.
//!
//! Ingest is blocking filesystem work; async callers run it on the blocking
//! pool.

mod discover;
mod tree;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::classify::{Vocabulary, scan_lines, split_segments};
use crate::progress::ProgressSink;
use crate::staging::{StagingArea, StagingError};
use crate::types::{DateInterval, SiteName};

pub use discover::{LOGS_DIR, SiteLogs, discover_sites, log_day};

/// Errors from ingest.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read log root {}: {source}", path.display())]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no sites under {}", .0.display())]
    NoSites(PathBuf),

    #[error("cannot read log {}: {source}", path.display())]
    ReadLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Staging(#[from] StagingError),
}

/// Decodes UTF-16LE bytes, dropping a leading byte-order mark.
///
/// A trailing odd byte is ignored; invalid surrogates become U+FFFD.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16_lossy(&units);
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Splits on `\n`, dropping one `\r` before each break.
pub fn split_log_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// What ingest did for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    pub site: SiteName,
    pub logs: usize,
    /// True if anything was staged.
    pub staged: bool,
    /// True if the staged output has no error body.
    pub clean: bool,
}

/// Classifies and stages logs.
#[derive(Debug, Clone)]
pub struct Ingestor<P> {
    vocabulary: Vocabulary,
    overflow_threshold: usize,
    staging: StagingArea,
    structure: P,
}

impl<P: ProgressSink> Ingestor<P> {
    pub fn new(
        vocabulary: Vocabulary,
        overflow_threshold: usize,
        staging: StagingArea,
        structure: P,
    ) -> Self {
        Ingestor {
            vocabulary,
            overflow_threshold,
            staging,
            structure,
        }
    }

    /// Ingests every site under `root` for `interval`.
    ///
    /// A log file that cannot be read aborts the ingest; sites staged before
    /// it stay staged.
    #[instrument(skip(self), fields(start = %interval.start, end = %interval.end))]
    pub fn ingest(&self, root: &Path, interval: &DateInterval) -> Result<Vec<SiteReport>, IngestError> {
        let sites = discover_sites(root, interval)?;
        let mut reports = Vec::with_capacity(sites.len());

        self.structure.publish(&tree::root_line());
        for (i, site_logs) in sites.iter().enumerate() {
            let last_site = i + 1 == sites.len();
            self.structure
                .publish(&tree::site_line(site_logs.site.as_str(), last_site));
            reports.push(self.ingest_site(root, site_logs, last_site)?);
        }

        info!(sites = reports.len(), "Ingest complete");
        Ok(reports)
    }

    fn ingest_site(
        &self,
        root: &Path,
        site_logs: &SiteLogs,
        last_site: bool,
    ) -> Result<SiteReport, IngestError> {
        let mut segments = Vec::new();
        for (j, log) in site_logs.logs.iter().enumerate() {
            let path = root.join(site_logs.site.as_str()).join(LOGS_DIR).join(log);
            let bytes = fs::read(&path).map_err(|source| IngestError::ReadLog {
                path: path.clone(),
                source,
            })?;
            let text = decode_utf16le(&bytes);
            segments.extend(scan_lines(
                &self.vocabulary,
                self.overflow_threshold,
                split_log_lines(&text),
            ));
            self.structure.publish(&tree::log_line(
                log,
                j + 1 == site_logs.logs.len(),
                last_site,
            ));
        }

        let output = split_segments(&segments);
        self.staging.save(&site_logs.site, &output)?;

        Ok(SiteReport {
            site: site_logs.site.clone(),
            logs: site_logs.logs.len(),
            staged: !output.success.is_empty() || !output.error.is_empty(),
            clean: output.is_clean(),
        })
    }
}
