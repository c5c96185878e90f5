// SPDX-FileCopyrightText: 2026 Intake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket handler pushing ticket events to dashboard clients.
//!
//! Server -> Client (JSON text frames):
//! ```json
//! {"type": "newTicket", "payload": {"id": 1, "ticket_id": "TKT-..", ...}}
//! {"type": "ticketUpdated", "payload": {"id": 1, "status": "resolved"}}
//! ```
//!
//! The stream is one-way: inbound frames from the client are ignored except
//! Close. Clients connecting after an event was published do not receive it.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use crate::server::GatewayState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an individual dashboard connection.
///
/// Registers a broadcaster subscription for the lifetime of the socket: a
/// spawned sender task forwards published events as text frames, while the
/// receive loop only watches for the client going away.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (subscriber_id, mut rx) = state.broadcaster.subscribe();
    tracing::info!(subscriber = %subscriber_id, "dashboard client connected");

    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if ws_sender.send(Message::Text(event.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Close(_) => break,
            _ => {} // Ping/pong is handled by the protocol layer; other frames ignored.
        }
    }

    state.broadcaster.unsubscribe(&subscriber_id);
    sender_task.abort();
    tracing::info!(subscriber = %subscriber_id, "dashboard client disconnected");
}
