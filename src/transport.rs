//! WebSocket transport to the robot control server
//!
//! One long-lived connection per session. Outbound sends are fire-and-forget:
//! `emit` hands the event to a writer task and returns immediately, so a
//! failed send is never observable from the control path. Inbound frames are
//! validated here and surfaced as [`TransportEvent`]s; there is deliberately
//! no reconnection logic, a lost connection is terminal for the session.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::messages::{ClientEvent, ServerEvent};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("WebSocket connect failed: {0}")]
    Connect(#[from] tungstenite::Error),
}

/// Connection lifecycle and server events, delivered to the session loop
#[derive(Debug)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Event(ServerEvent),
}

/// Handle to the live connection
///
/// Cheap to use from the session: `emit` is synchronous and never blocks.
pub struct TransportHandle {
    tx: mpsc::UnboundedSender<ClientEvent>,
}

impl TransportHandle {
    /// Connect to the robot control server
    ///
    /// Spawns the writer and reader tasks and returns the handle plus the
    /// inbound event receiver. `Connected` is delivered as the first event.
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<TransportEvent>), TransportError> {
        let (ws_stream, _) = connect_async(url).await?;
        info!("WebSocket connected to {}", url);

        let (mut write, mut read) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientEvent>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<TransportEvent>();

        let _ = event_tx.send(TransportEvent::Connected);

        // Writer task: serialize and send outbound events in order
        tokio::spawn(async move {
            while let Some(event) = out_rx.recv().await {
                let json = match serde_json::to_string(&event) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!("Failed to serialize client event: {}", e);
                        continue;
                    },
                };
                if let Err(e) = write.send(Message::Text(json)).await {
                    warn!("WebSocket send failed: {}", e);
                    break;
                }
            }
            debug!("Transport writer task stopped");
        });

        // Reader task: validate inbound frames at the boundary
        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            if event_tx.send(TransportEvent::Event(event)).is_err() {
                                break;
                            }
                        },
                        Err(e) => {
                            warn!("Dropping malformed server frame: {}", e);
                        },
                    },
                    Ok(Message::Close(_)) => {
                        info!("Server closed connection");
                        break;
                    },
                    Ok(_) => {
                        // Ping/pong handled by tungstenite, binary frames unused
                    },
                    Err(e) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    },
                }
            }
            let _ = event_tx.send(TransportEvent::Disconnected);
            debug!("Transport reader task stopped");
        });

        Ok((Self { tx: out_tx }, event_rx))
    }

    /// Fire-and-forget send of a named event
    ///
    /// Callers cannot observe failure; after a disconnect the event is
    /// silently dropped, matching the display-only error model.
    pub fn emit(&self, event: ClientEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("Transport gone, dropping {}", event_name(&e.0));
        }
    }

    /// Detached handle for exercising the session without a socket
    #[cfg(test)]
    pub(crate) fn stub() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

fn event_name(event: &ClientEvent) -> &'static str {
    match event {
        ClientEvent::Move(_) => "move",
        ClientEvent::EmergencyStop => "emergency_stop",
    }
}
