// SPDX-FileCopyrightText: 2026 Intake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the ticket REST API.
//!
//! Every failure is answered as a JSON `{"error": ..}` payload with a short
//! generic message; internal detail goes to the log only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use intake_bus::TicketEvent;
use intake_core::{IntakeError, NewTicket, Ticket};
use intake_storage::queries::tickets::{self, TicketFilter};

use crate::server::GatewayState;

/// Response body for POST /tickets.
#[derive(Debug, Serialize)]
pub struct CreateTicketResponse {
    pub success: bool,
    /// The fully populated ticket, including the generated ids.
    pub ticket: Ticket,
}

/// Request body for PUT /tickets/{id}/status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Response body for PUT /tickets/{id}/status.
#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
}

/// Optional query parameters for GET /tickets.
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsQuery {
    pub priority: Option<String>,
    pub status: Option<String>,
    pub reason: Option<String>,
    pub search: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Storage location identifier.
    pub db: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// POST /tickets
///
/// Persists the ticket, announces it to connected dashboards, then responds.
/// Required-field presence is not validated here: a missing field fails the
/// storage NOT NULL constraint and comes back as a 400.
pub async fn post_tickets(
    State(state): State<GatewayState>,
    Json(body): Json<NewTicket>,
) -> Response {
    match tickets::create_ticket(&state.db, body).await {
        Ok(ticket) => {
            state
                .broadcaster
                .publish(&TicketEvent::Created(ticket.clone()));
            (
                StatusCode::OK,
                Json(CreateTicketResponse {
                    success: true,
                    ticket,
                }),
            )
                .into_response()
        }
        Err(IntakeError::Constraint(detail)) => {
            tracing::warn!(detail = %detail, "rejected ticket create");
            error_response(StatusCode::BAD_REQUEST, "Failed to create ticket")
        }
        Err(e) => {
            tracing::error!(error = %e, "error creating ticket");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create ticket")
        }
    }
}

/// GET /tickets
///
/// Returns the full matching set as a bare array, newest first. No
/// pagination.
pub async fn get_tickets(
    State(state): State<GatewayState>,
    Query(query): Query<ListTicketsQuery>,
) -> Response {
    let filter = TicketFilter {
        priority: query.priority,
        status: query.status,
        reason: query.reason,
        search: query.search,
    };
    match tickets::list_tickets(&state.db, filter).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "error fetching tickets");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch tickets")
        }
    }
}

/// PUT /tickets/{id}/status
///
/// Updates the lifecycle field by surrogate id. A missing row is a distinct
/// 404, not a storage failure.
pub async fn put_ticket_status(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> Response {
    match tickets::update_ticket_status(&state.db, id, &body.status).await {
        Ok(true) => {
            state.broadcaster.publish(&TicketEvent::StatusChanged {
                id,
                status: body.status,
            });
            (StatusCode::OK, Json(UpdateStatusResponse { success: true })).into_response()
        }
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Ticket not found"),
        Err(e) => {
            tracing::error!(error = %e, ticket = id, "error updating ticket");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update ticket")
        }
    }
}

/// GET /stats
pub async fn get_stats(State(state): State<GatewayState>) -> Response {
    match tickets::ticket_stats(&state.db).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "error fetching statistics");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch statistics",
            )
        }
    }
}

/// GET /health
///
/// Liveness probe for hosting platforms and load balancers.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        db: state.db_path.clone(),
    })
}
