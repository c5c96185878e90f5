// SPDX-FileCopyrightText: 2026 Intake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use intake_bus::Broadcaster;
use intake_core::IntakeError;
use intake_storage::Database;

use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
///
/// Constructed once at startup and injected into every handler; there is no
/// process-global connection or broadcaster.
#[derive(Clone)]
pub struct GatewayState {
    /// Handle to the single SQLite connection.
    pub db: Database,
    /// Ticket event fan-out registry.
    pub broadcaster: Arc<Broadcaster>,
    /// Database location reported by the health probe.
    pub db_path: String,
}

/// Gateway server configuration (mirrors `ServerConfig` from intake-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router.
///
/// Routes:
/// - `POST /tickets` / `GET /tickets` (submit and list)
/// - `PUT /tickets/{id}/status` (triage)
/// - `GET /stats` (dashboard counters)
/// - `GET /health` (liveness probe)
/// - `GET /ws` (live event push)
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route(
            "/tickets",
            get(handlers::get_tickets).post(handlers::post_tickets),
        )
        .route("/tickets/{id}/status", put(handlers::put_ticket_status))
        .route("/stats", get(handlers::get_stats))
        .route("/health", get(handlers::get_health))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP/WebSocket server.
///
/// Binds to the configured host:port and serves until the server errors or
/// the surrounding task is cancelled.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), IntakeError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| IntakeError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| IntakeError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
