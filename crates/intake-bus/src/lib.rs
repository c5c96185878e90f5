// SPDX-FileCopyrightText: 2026 Intake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process ticket event broadcaster.
//!
//! Best-effort fan-out of ticket events to currently connected dashboard
//! clients. There is no persistence and no replay: a subscriber only sees
//! events published while it is registered.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use intake_core::Ticket;

/// Per-subscriber channel capacity. A subscriber that falls this far behind
/// starts losing events.
const SUBSCRIBER_BUFFER: usize = 64;

/// An event announcing a change to the ticket table.
///
/// Wire form is what dashboard clients consume:
/// `{"type": "newTicket", "payload": <ticket>}` or
/// `{"type": "ticketUpdated", "payload": {"id": .., "status": ..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum TicketEvent {
    /// A ticket was created. Payload is the full ticket.
    #[serde(rename = "newTicket")]
    Created(Ticket),
    /// A ticket's status changed.
    #[serde(rename = "ticketUpdated")]
    StatusChanged { id: i64, status: String },
}

/// Fan-out registry of connected event subscribers.
///
/// Subscribers attach and detach at any time; delivery is best-effort to
/// whoever is registered at the moment of publish. Each subscriber receives
/// events in publish order.
#[derive(Debug, Default)]
pub struct Broadcaster {
    subscribers: DashMap<String, mpsc::Sender<String>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Register a new subscriber. Returns its id and the receiving end.
    pub fn subscribe(&self) -> (String, mpsc::Receiver<String>) {
        let id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.subscribers.insert(id.clone(), tx);
        (id, rx)
    }

    /// Remove a subscriber. Unknown ids are a silent no-op.
    pub fn unsubscribe(&self, id: &str) {
        self.subscribers.remove(id);
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Publish an event to every currently registered subscriber.
    ///
    /// Never blocks: a subscriber whose channel is full or closed loses this
    /// event. Closed entries are removed by the owning connection handler on
    /// disconnect, not here.
    pub fn publish(&self, event: &TicketEvent) {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize ticket event");
                return;
            }
        };
        for entry in self.subscribers.iter() {
            if let Err(e) = entry.value().try_send(text.clone()) {
                tracing::debug!(subscriber = %entry.key(), error = %e, "event dropped");
            }
        }
    }
}
