//! Request bodies and their validation.
//!
//! Validation collects every problem instead of stopping at the first one.
//! Each problem is reported as `"<field> <reason>"`.

use serde::Deserialize;

use crate::glpi::Credentials;
use crate::types::{DateInterval, IntervalError, parse_day};

const REQUIRED: &str = "Required";
const DATE_FORMAT_REASON: &str = "Data deve estar no formato YYYY-MM-DD";
const DATE_INVALID_REASON: &str = "Data inválida";
const USER_REASON: &str = "Usuario obrigatório";
const PASSWORD_REASON: &str = "Senha obrigatório";

/// Date range as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeBody {
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

/// `POST /logs`.
pub type LogsRequest = DateRangeBody;

/// `POST /`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub user: Option<String>,
    pub password: Option<String>,
    pub date_interval: Option<DateRangeBody>,
}

/// `POST /entity`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityRequest {
    pub user: Option<String>,
    pub password: Option<String>,
}

fn check_day(field: &str, value: Option<&str>, problems: &mut Vec<String>) -> Option<chrono::NaiveDate> {
    let Some(value) = value else {
        problems.push(format!("{} {}", field, REQUIRED));
        return None;
    };
    match parse_day(value) {
        Ok(day) => Some(day),
        Err(IntervalError::Format(_)) => {
            problems.push(format!("{} {}", field, DATE_FORMAT_REASON));
            None
        }
        Err(IntervalError::InvalidDate(_)) => {
            problems.push(format!("{} {}", field, DATE_INVALID_REASON));
            None
        }
    }
}

fn check_text(field: &str, value: Option<&str>, reason: &str, problems: &mut Vec<String>) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        Some(_) => {
            problems.push(format!("{} {}", field, reason));
            None
        }
        None => {
            problems.push(format!("{} {}", field, REQUIRED));
            None
        }
    }
}

impl DateRangeBody {
    fn check(&self, prefix: &str, problems: &mut Vec<String>) -> Option<DateInterval> {
        let start = check_day(
            &format!("{}dateStart", prefix),
            self.date_start.as_deref(),
            problems,
        );
        let end = check_day(&format!("{}dateEnd", prefix), self.date_end.as_deref(), problems);
        Some(DateInterval::new(start?, end?))
    }

    pub fn validate(&self) -> Result<DateInterval, Vec<String>> {
        let mut problems = Vec::new();
        match self.check("", &mut problems) {
            Some(interval) if problems.is_empty() => Ok(interval),
            _ => Err(problems),
        }
    }
}

fn check_credentials(
    user: Option<&str>,
    password: Option<&str>,
    problems: &mut Vec<String>,
) -> Option<Credentials> {
    let user = check_text("user", user, USER_REASON, problems);
    let password = check_text("password", password, PASSWORD_REASON, problems);
    Some(Credentials::new(user?, password?))
}

impl RunRequest {
    pub fn validate(&self) -> Result<(Credentials, DateInterval), Vec<String>> {
        let mut problems = Vec::new();
        let credentials =
            check_credentials(self.user.as_deref(), self.password.as_deref(), &mut problems);
        let interval = match &self.date_interval {
            Some(range) => range.check("dateInterval.", &mut problems),
            None => {
                problems.push(format!("dateInterval {}", REQUIRED));
                None
            }
        };
        match (credentials, interval) {
            (Some(c), Some(i)) if problems.is_empty() => Ok((c, i)),
            _ => Err(problems),
        }
    }
}

impl EntityRequest {
    pub fn validate(&self) -> Result<Credentials, Vec<String>> {
        let mut problems = Vec::new();
        match check_credentials(self.user.as_deref(), self.password.as_deref(), &mut problems) {
            Some(c) if problems.is_empty() => Ok(c),
            _ => Err(problems),
        }
    }
}
