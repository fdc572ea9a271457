//! Websocket feeds of the progress channels.
//!
//! Each connection gets its own broadcast receiver and is sent every line
//! published after it subscribed. Incoming messages are ignored apart from
//! close frames, which end the subscription. A client that falls too far
//! behind skips the lines it missed.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use super::{AppState, Connector};

/// `GET /ws/structure`: the log tree published during ingest.
pub async fn structure_handler<C: Connector>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<C>>,
) -> Response {
    let rx = state.hub().structure.subscribe();
    ws.on_upgrade(move |socket| forward(socket, rx, "structure"))
}

/// `GET /ws/progress`: ticket-run status.
pub async fn progress_handler<C: Connector>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<C>>,
) -> Response {
    let rx = state.hub().progress.subscribe();
    ws.on_upgrade(move |socket| forward(socket, rx, "progress"))
}

async fn forward(mut socket: WebSocket, mut rx: broadcast::Receiver<String>, feed: &'static str) {
    debug!(feed, "Websocket subscriber connected");
    loop {
        tokio::select! {
            incoming = socket.recv() => {
                if client_gone(incoming.as_ref()) {
                    break;
                }
            }
            line = rx.recv() => match line {
                Ok(line) => {
                    if socket.send(Message::Text(line.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(feed, skipped, "Websocket subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    debug!(feed, "Websocket subscriber disconnected");
}

/// True once the client has closed or dropped the connection.
fn client_gone(incoming: Option<&Result<Message, axum::Error>>) -> bool {
    matches!(incoming, None | Some(Err(_)) | Some(Ok(Message::Close(_))))
}
