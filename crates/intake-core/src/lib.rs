// SPDX-FileCopyrightText: 2026 Intake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Intake support portal.
//!
//! Provides the error type and the domain types shared by the storage,
//! bus, and gateway crates.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::IntakeError;
pub use types::{NewTicket, Ticket, TicketStats};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_error_has_all_variants() {
        let _config = IntakeError::Config("test".into());
        let _constraint = IntakeError::Constraint("test".into());
        let _storage = IntakeError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = IntakeError::Channel {
            message: "test".into(),
            source: None,
        };
        let _internal = IntakeError::Internal("test".into());
    }

    #[test]
    fn ticket_serializes_with_null_note() {
        let ticket = Ticket {
            id: 1,
            ticket_id: "TKT-1754300000000-a1b2c3d4e".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            reason: "cannot log in".into(),
            priority: "high".into(),
            status: "new".into(),
            note: None,
            created_at: "2026-08-04T10:15:00.000Z".into(),
            updated_at: "2026-08-04T10:15:00.000Z".into(),
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["ticket_id"], "TKT-1754300000000-a1b2c3d4e");
        assert_eq!(json["note"], serde_json::Value::Null);
        assert_eq!(json["status"], "new");
    }

    #[test]
    fn new_ticket_fields_default_to_none() {
        let new: NewTicket = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(new.name.as_deref(), Some("Ada"));
        assert!(new.email.is_none());
        assert!(new.reason.is_none());
        assert!(new.priority.is_none());
        assert!(new.note.is_none());
    }

    #[test]
    fn ticket_stats_uses_short_field_names() {
        let stats = TicketStats {
            total: 3,
            urgent: 1,
            new: 2,
            today: 3,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"total":3,"urgent":1,"new":2,"today":3}"#);
    }
}
