//! Per-site staging area for classified log output.
//!
//! Layout: `<root>/<site>/<site>_success.txt` and `<root>/<site>/<site>_error.txt`.
//! Either file may be absent. A site is clean when its success file exists
//! and its error file does not. A site directory lives from ingest until its
//! ticket has been filed, then it is removed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::classify::ClassifiedOutput;
use crate::types::SiteName;

/// Suffix of the file holding the clean blocks.
const SUCCESS_SUFFIX: &str = "_success.txt";
/// Suffix of the file holding the error blocks.
const ERROR_SUFFIX: &str = "_error.txt";

/// Errors from staging operations.
#[derive(Debug, Error)]
pub enum StagingError {
    /// The staging root, a site directory or its files do not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The staging root exists but holds no site directories.
    #[error("no staged sites in {}", .0.display())]
    Empty(PathBuf),

    /// Filesystem failure.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StagingError>;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StagingError + '_ {
    move |source| StagingError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Staged content of one site, ready to be attached to a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedLog {
    /// Success body followed by error body, whichever exist.
    pub content: String,
    /// True if only a success body was staged.
    pub is_clean: bool,
}

/// Handle on the staging directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StagingArea { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn site_dir(&self, site: &SiteName) -> PathBuf {
        self.root.join(site.as_str())
    }

    fn success_path(&self, site: &SiteName) -> PathBuf {
        self.site_dir(site)
            .join(format!("{}{}", site.as_str(), SUCCESS_SUFFIX))
    }

    fn error_path(&self, site: &SiteName) -> PathBuf {
        self.site_dir(site)
            .join(format!("{}{}", site.as_str(), ERROR_SUFFIX))
    }

    /// Returns true if a directory is staged for `site`.
    pub fn contains(&self, site: &SiteName) -> bool {
        self.site_dir(site).is_dir()
    }

    /// Lists staged sites in name order.
    ///
    /// # Errors
    ///
    /// `NotFound` if the root does not exist, `Empty` if it holds no site
    /// directories.
    pub fn list_sites(&self) -> Result<Vec<SiteName>> {
        if !self.root.exists() {
            return Err(StagingError::NotFound(self.root.clone()));
        }

        let mut sites = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_error(&self.root))? {
            let entry = entry.map_err(io_error(&self.root))?;
            let file_type = entry.file_type().map_err(io_error(&entry.path()))?;
            if !file_type.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                sites.push(SiteName::new(name));
            }
        }

        if sites.is_empty() {
            return Err(StagingError::Empty(self.root.clone()));
        }
        sites.sort();
        Ok(sites)
    }

    /// Reads a site's staged content.
    ///
    /// With both files present the success body comes first, directly
    /// followed by the error body.
    pub fn read_site(&self, site: &SiteName) -> Result<StagedLog> {
        let success = read_if_exists(&self.success_path(site))?;
        let error = read_if_exists(&self.error_path(site))?;

        match (success, error) {
            (None, None) => Err(StagingError::NotFound(self.site_dir(site))),
            (Some(success), None) => Ok(StagedLog {
                content: success,
                is_clean: true,
            }),
            (None, Some(error)) => Ok(StagedLog {
                content: error,
                is_clean: false,
            }),
            (Some(success), Some(error)) => Ok(StagedLog {
                content: success + &error,
                is_clean: false,
            }),
        }
    }

    /// Writes a site's classified output. Empty bodies write nothing.
    pub fn save(&self, site: &SiteName, output: &ClassifiedOutput) -> Result<()> {
        for (path, body) in [
            (self.success_path(site), &output.success),
            (self.error_path(site), &output.error),
        ] {
            if body.is_empty() {
                continue;
            }
            let dir = self.site_dir(site);
            fs::create_dir_all(&dir).map_err(io_error(&dir))?;
            fs::write(&path, body).map_err(io_error(&path))?;
            debug!(path = %path.display(), bytes = body.len(), "Staged log body");
        }
        Ok(())
    }

    /// Removes a site's staging directory.
    pub fn remove_site(&self, site: &SiteName) -> Result<()> {
        let dir = self.site_dir(site);
        if !dir.exists() {
            return Err(StagingError::NotFound(dir));
        }
        fs::remove_dir_all(&dir).map_err(io_error(&dir))?;
        info!(site = %site, "Removed staged site");
        Ok(())
    }
}

fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StagingError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
