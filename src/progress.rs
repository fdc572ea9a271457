//! User-facing progress feeds.
//!
//! Progress lines are HTML fragments pushed to whoever is watching, with no
//! acknowledgement and no backpressure. Two feeds exist: `structure` carries
//! the log tree seen during ingest, `progress` carries ticket-run status.
//! Operator diagnostics go through `tracing`, not through these feeds.

use std::sync::Arc;

use tokio::sync::broadcast;

/// Lines buffered per subscriber before a slow one starts lagging.
pub const FEED_CAPACITY: usize = 1024;

/// A one-way sink for progress lines.
pub trait ProgressSink: Send + Sync {
    /// Publishes one line. Never fails; lines nobody receives are dropped.
    fn publish(&self, line: &str);
}

impl<T: ProgressSink + ?Sized> ProgressSink for Arc<T> {
    fn publish(&self, line: &str) {
        (**self).publish(line)
    }
}

/// A sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn publish(&self, _line: &str) {}
}

/// A sink fanning lines out to every current subscriber.
#[derive(Debug, Clone)]
pub struct BroadcastProgress {
    tx: broadcast::Sender<String>,
}

impl BroadcastProgress {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        BroadcastProgress { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastProgress {
    fn default() -> Self {
        Self::new(FEED_CAPACITY)
    }
}

impl ProgressSink for BroadcastProgress {
    fn publish(&self, line: &str) {
        // Err only means there are no subscribers right now.
        let _ = self.tx.send(line.to_string());
    }
}

/// The two process-wide feeds, owned by the hosting service.
#[derive(Debug, Clone, Default)]
pub struct ProgressHub {
    pub structure: BroadcastProgress,
    pub progress: BroadcastProgress,
}

// ─── Messages ─────────────────────────────────────────────────────────────────

/// Run-status fragments published on the `progress` feed.
pub mod messages {
    use crate::types::{SiteName, TicketId};

    pub fn site_started(site: &SiteName) -> String {
        format!("<p>Iniciado abertura de chamado {}</p>", site)
    }

    pub fn ticket_created(site: &SiteName, ticket: TicketId) -> String {
        format!("<p>Chamado {} criado para {}</p>", ticket, site)
    }

    /// Lists units that already have a ticket in the interval.
    pub fn already_reported(names: &[String]) -> String {
        let items: String = names.iter().map(|n| format!("{}<br>", n)).collect();
        format!(
            "<p>Existem chamados já registrados dentro do intervalo informado:</p>\n<p style=\"color: #1da5c2\">{}</p>",
            items
        )
    }

    pub fn nothing_to_send() -> String {
        "<p>Não tem arquivo para ser enviado!</p>".to_string()
    }

    pub fn standardization_miss(site: &SiteName) -> String {
        format!(
            "<p>❌ Unidade \"{}\" não encontrada no arquivo de padronização!</p>",
            site
        )
    }

    pub fn site_failed(site: &SiteName, reason: &str) -> String {
        format!("<p>❌ Erro ao processar unidade \"{}\": {}</p>", site, reason)
    }

    pub fn site_done(site: &SiteName) -> String {
        format!(
            "<p style=\"color: #22c55e\">Chamado tramitado com sucesso <b>{}</b></p>",
            site
        )
    }

    pub fn separator() -> String {
        "<p>---------------------------------------</p>".to_string()
    }

    pub fn run_complete() -> String {
        "<p>🎉 Processamento de chamados concluído!</p>".to_string()
    }

    pub fn ingest_complete() -> String {
        "<p>✅ Logs processados e salvos para envio.</p>".to_string()
    }
}
