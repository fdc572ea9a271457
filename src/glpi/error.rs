//! GLPI API error types.
//!
//! GLPI reports failures in the response body rather than through a stable
//! error schema: an error response is a JSON array whose first element is an
//! error code and whose second element is a human-readable message, e.g.
//! `["ERROR_GLPI_LOGIN", "Incorrect username or password"]`. This module
//! turns that convention, transport failures and undecodable bodies into one
//! categorized error type.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The kind of GLPI API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlpiErrorKind {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    Transport,

    /// GLPI answered with an error array or an error status.
    Remote,

    /// GLPI answered, but the body did not have the expected shape.
    Decode,
}

/// A GLPI API error.
#[derive(Debug, Error)]
pub struct GlpiApiError {
    /// The kind of error.
    pub kind: GlpiErrorKind,

    /// The HTTP status code, if a response was received.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying reqwest error, if available.
    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for GlpiApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GLPI API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GLPI API error: {}", self.message),
        }
    }
}

impl GlpiApiError {
    /// Creates an error from a reqwest failure.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let kind = if err.is_decode() {
            GlpiErrorKind::Decode
        } else if status_code.is_some() {
            GlpiErrorKind::Remote
        } else {
            GlpiErrorKind::Transport
        };
        Self {
            kind,
            status_code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Creates a remote error without a reqwest source.
    pub fn remote(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            kind: GlpiErrorKind::Remote,
            status_code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a decode error without a reqwest source.
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: GlpiErrorKind::Decode,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Converts an error-shaped body into an error.
    ///
    /// Returns `None` if `body` is not a JSON array. The message is element 1
    /// of the array when it is a string, the whole array otherwise.
    pub fn from_error_array(body: &Value, status_code: Option<u16>) -> Option<Self> {
        let items = body.as_array()?;
        let message = match items.get(1) {
            Some(Value::String(message)) => message.clone(),
            _ => body.to_string(),
        };
        Some(Self::remote(message, status_code))
    }
}
