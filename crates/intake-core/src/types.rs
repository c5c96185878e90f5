// SPDX-FileCopyrightText: 2026 Intake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Intake workspace.

use serde::{Deserialize, Serialize};

/// A single support request record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Storage-assigned surrogate key, strictly increasing in insertion order.
    pub id: i64,
    /// Externally-visible unique identifier, e.g. `TKT-1754300000000-a1b2c3d4e`.
    pub ticket_id: String,
    pub name: String,
    pub email: String,
    pub reason: String,
    /// Free-text category. `"urgent"` is meaningful only to the statistics query.
    pub priority: String,
    /// Lifecycle field, `"new"` at creation. Any string is accepted.
    pub status: String,
    pub note: Option<String>,
    /// RFC 3339 UTC timestamp, set once at insert.
    pub created_at: String,
    /// RFC 3339 UTC timestamp, refreshed on every status update.
    pub updated_at: String,
}

/// Submitter-provided fields for a new ticket.
///
/// All fields are optional at this layer. Presence of the required fields is
/// enforced by the tickets table's NOT NULL constraints, not here; a missing
/// field surfaces from the insert as [`IntakeError::Constraint`].
///
/// [`IntakeError::Constraint`]: crate::IntakeError::Constraint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTicket {
    pub name: Option<String>,
    pub email: Option<String>,
    pub reason: Option<String>,
    pub priority: Option<String>,
    pub note: Option<String>,
}

/// Aggregate ticket counts for the dashboard.
///
/// The four counts are computed by independent queries, not from one atomic
/// snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStats {
    pub total: i64,
    /// Tickets whose priority is exactly `"urgent"`.
    pub urgent: i64,
    /// Tickets whose status is exactly `"new"`.
    pub new: i64,
    /// Tickets created on the current server-side (UTC) date.
    pub today: i64,
}
