//! Service configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | `3000` |
//! | `GLPI_URL` | required |
//! | `GLPI_APP_TOKEN` | required |
//! | `GLPI_AUTH_SOURCE` | `ldap-22` |
//! | `LOG_ROOT` | `./unidade` |
//! | `STAGING_DIR` | `./tmp` |
//! | `UNITS_FILE` | `./units.json` |
//! | `ERROR_OVERFLOW_THRESHOLD` | `2000` |
//! | `SETTLE_DELAY_MS` | `1000` |
//! | `TICKET_TITLE` | `Verificar backup FTP Servidor` |
//! | `REGION_PREFIX` | `REGIAO SACA > ` |
//! | `EXCLUDED_ENTITY_MARKER` | `Comunicação` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::classify::DEFAULT_OVERFLOW_THRESHOLD;
use crate::glpi::GlpiEndpoint;
use crate::run::RunConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_AUTH_SOURCE: &str = "ldap-22";
pub const DEFAULT_LOG_ROOT: &str = "./unidade";
pub const DEFAULT_STAGING_DIR: &str = "./tmp";
pub const DEFAULT_UNITS_FILE: &str = "./units.json";
pub const DEFAULT_EXCLUDED_ENTITY_MARKER: &str = "Comunicação";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Everything the service needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub glpi: GlpiEndpoint,
    pub log_root: PathBuf,
    pub staging_dir: PathBuf,
    pub units_file: PathBuf,
    pub overflow_threshold: usize,
    pub excluded_entity_marker: String,
    pub run: RunConfig,
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let parsed = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            get(name).map(|v| parse(name, &v)).transpose()
        };

        let defaults = RunConfig::default();
        let settle_delay = parsed("SETTLE_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.settle_delay);

        Ok(AppConfig {
            port: get("PORT")
                .map(|v| parse("PORT", &v))
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
            glpi: GlpiEndpoint {
                base_url: required("GLPI_URL")?,
                app_token: required("GLPI_APP_TOKEN")?,
                auth_source: get("GLPI_AUTH_SOURCE")
                    .unwrap_or_else(|| DEFAULT_AUTH_SOURCE.to_string()),
            },
            log_root: get("LOG_ROOT")
                .unwrap_or_else(|| DEFAULT_LOG_ROOT.to_string())
                .into(),
            staging_dir: get("STAGING_DIR")
                .unwrap_or_else(|| DEFAULT_STAGING_DIR.to_string())
                .into(),
            units_file: get("UNITS_FILE")
                .unwrap_or_else(|| DEFAULT_UNITS_FILE.to_string())
                .into(),
            overflow_threshold: get("ERROR_OVERFLOW_THRESHOLD")
                .map(|v| parse("ERROR_OVERFLOW_THRESHOLD", &v))
                .transpose()?
                .unwrap_or(DEFAULT_OVERFLOW_THRESHOLD),
            excluded_entity_marker: lookup("EXCLUDED_ENTITY_MARKER")
                .unwrap_or_else(|| DEFAULT_EXCLUDED_ENTITY_MARKER.to_string()),
            run: RunConfig {
                ticket_title: get("TICKET_TITLE").unwrap_or(defaults.ticket_title),
                ticket_description: defaults.ticket_description,
                region_prefix: lookup("REGION_PREFIX").unwrap_or(defaults.region_prefix),
                settle_delay,
            },
        })
    }
}

fn parse<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
