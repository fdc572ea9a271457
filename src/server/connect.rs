//! Building a ticket interpreter for one request's credentials.

use std::fmt;

use crate::effects::TicketInterpreter;
use crate::glpi::{Credentials, GlpiClient, GlpiEndpoint};
use crate::run::RunError;

/// Produces a fresh interpreter bound to a set of credentials.
///
/// Every run and every entity listing gets its own interpreter, so sessions
/// are never shared between requests.
pub trait Connector: Clone + Send + Sync + 'static {
    type Interpreter: TicketInterpreter<Error: fmt::Display + Send> + Send + Sync + 'static;

    fn connect(&self, credentials: Credentials) -> Result<Self::Interpreter, RunError>;
}

/// Connects to a GLPI instance.
#[derive(Debug, Clone)]
pub struct GlpiConnector {
    endpoint: GlpiEndpoint,
}

impl GlpiConnector {
    pub fn new(endpoint: GlpiEndpoint) -> Self {
        GlpiConnector { endpoint }
    }
}

impl Connector for GlpiConnector {
    type Interpreter = GlpiClient;

    fn connect(&self, credentials: Credentials) -> Result<GlpiClient, RunError> {
        GlpiClient::new(self.endpoint.clone(), credentials)
            .map_err(|e| RunError::Remote(e.to_string()))
    }
}
