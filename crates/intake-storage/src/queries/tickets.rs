// SPDX-FileCopyrightText: 2026 Intake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket CRUD and aggregate operations.

use chrono::{SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::{params, params_from_iter};

use intake_core::IntakeError;

use crate::database::Database;
use crate::models::{NewTicket, Ticket, TicketStats};

/// Optional list filters, combined with AND when more than one is set.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Exact match on priority.
    pub priority: Option<String>,
    /// Exact match on status.
    pub status: Option<String>,
    /// Substring match on reason.
    pub reason: Option<String>,
    /// Substring match against any of name, email, reason, note.
    pub search: Option<String>,
}

const TICKET_COLUMNS: &str =
    "id, ticket_id, name, email, reason, priority, status, note, created_at, updated_at";

fn row_to_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        reason: row.get(4)?,
        priority: row.get(5)?,
        status: row.get(6)?,
        note: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Generate an externally-visible ticket identifier.
///
/// Combines the current unix-millisecond timestamp with a short random
/// suffix. Uniqueness is ultimately enforced by the UNIQUE constraint on the
/// column; a collision surfaces from the insert as a constraint error, never
/// a silent overwrite.
fn generate_ticket_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("TKT-{millis}-{}", suffix.to_lowercase())
}

/// Current server time as an RFC 3339 UTC string with millisecond precision.
///
/// Lexicographic order of these strings equals chronological order, and
/// SQLite's date functions parse the format directly.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Insert a new ticket and return the fully populated row.
///
/// Required-field presence is NOT checked here: a `None` in `new` reaches the
/// insert as SQL NULL and fails the column's NOT NULL constraint, which
/// callers surface as a client error. The insert and the read-back run in the
/// same closure on the writer thread, so the returned ticket is exactly the
/// durably committed row.
pub async fn create_ticket(db: &Database, new: NewTicket) -> Result<Ticket, IntakeError> {
    let ticket_id = generate_ticket_id();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tickets (ticket_id, name, email, reason, priority, status, note, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'new', ?6, ?7, ?7)",
                params![
                    ticket_id,
                    new.name,
                    new.email,
                    new.reason,
                    new.priority,
                    new.note,
                    now,
                ],
            )?;
            let id = conn.last_insert_rowid();
            let ticket = conn.query_row(
                &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
                params![id],
                row_to_ticket,
            )?;
            Ok(ticket)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List tickets matching the filter, most recent first.
///
/// Ordered by `created_at` descending with the surrogate id as a stable
/// tiebreak. The full result set is returned; there is no pagination.
pub async fn list_tickets(
    db: &Database,
    filter: TicketFilter,
) -> Result<Vec<Ticket>, IntakeError> {
    db.connection()
        .call(move |conn| {
            let mut sql = format!("SELECT {TICKET_COLUMNS} FROM tickets");
            let mut conditions: Vec<&str> = Vec::new();
            let mut params: Vec<String> = Vec::new();

            if let Some(priority) = filter.priority {
                conditions.push("priority = ?");
                params.push(priority);
            }
            if let Some(status) = filter.status {
                conditions.push("status = ?");
                params.push(status);
            }
            if let Some(reason) = filter.reason {
                conditions.push("reason LIKE ?");
                params.push(format!("%{reason}%"));
            }
            if let Some(search) = filter.search {
                conditions.push("(name LIKE ? OR email LIKE ? OR reason LIKE ? OR note LIKE ?)");
                let term = format!("%{search}%");
                params.extend([term.clone(), term.clone(), term.clone(), term]);
            }

            if !conditions.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&conditions.join(" AND "));
            }
            sql.push_str(" ORDER BY created_at DESC, id DESC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter()), row_to_ticket)?;
            let mut tickets = Vec::new();
            for row in rows {
                tickets.push(row?);
            }
            Ok(tickets)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update a ticket's status by surrogate id, refreshing `updated_at`.
///
/// Returns `Ok(false)` when no row has that id. Any status string is
/// accepted; values are meaningful by convention only.
pub async fn update_ticket_status(
    db: &Database,
    id: i64,
    status: &str,
) -> Result<bool, IntakeError> {
    let status = status.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE tickets SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status, now, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate dashboard counts.
///
/// The four counts run as four independent queries; a ticket created while
/// they execute may be reflected in some counts and not others. That weak
/// consistency is accepted for a dashboard readout.
pub async fn ticket_stats(db: &Database) -> Result<TicketStats, IntakeError> {
    let total = scalar_count(db, "SELECT COUNT(*) FROM tickets").await?;
    let urgent = scalar_count(db, "SELECT COUNT(*) FROM tickets WHERE priority = 'urgent'").await?;
    let new = scalar_count(db, "SELECT COUNT(*) FROM tickets WHERE status = 'new'").await?;
    let today = scalar_count(
        db,
        "SELECT COUNT(*) FROM tickets WHERE DATE(created_at) = DATE('now')",
    )
    .await?;
    Ok(TicketStats {
        total,
        urgent,
        new,
        today,
    })
}

async fn scalar_count(db: &Database, sql: &'static str) -> Result<i64, IntakeError> {
    db.connection()
        .call(move |conn| Ok(conn.query_row(sql, [], |row| row.get(0))?))
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_new(name: &str) -> NewTicket {
        NewTicket {
            name: Some(name.to_string()),
            email: Some(format!("{name}@example.com")),
            reason: Some("cannot log in".to_string()),
            priority: Some("low".to_string()),
            note: None,
        }
    }

    #[tokio::test]
    async fn create_returns_fully_populated_ticket() {
        let (db, _dir) = setup_db().await;

        let ticket = create_ticket(&db, make_new("ada")).await.unwrap();
        assert!(ticket.id > 0);
        assert!(ticket.ticket_id.starts_with("TKT-"));
        assert_eq!(ticket.name, "ada");
        assert_eq!(ticket.email, "ada@example.com");
        assert_eq!(ticket.status, "new");
        assert_eq!(ticket.created_at, ticket.updated_at);
        assert!(ticket.note.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn create_with_missing_required_field_is_a_constraint_error() {
        let (db, _dir) = setup_db().await;

        let mut new = make_new("ada");
        new.email = None;
        let err = create_ticket(&db, new).await.unwrap_err();
        assert!(
            matches!(err, IntakeError::Constraint(_)),
            "expected Constraint, got {err:?}"
        );

        // Nothing was committed.
        let all = list_tickets(&db, TicketFilter::default()).await.unwrap();
        assert!(all.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_creates_yield_distinct_ticket_ids() {
        let (db, _dir) = setup_db().await;

        let mut handles = Vec::new();
        for i in 0..16 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                create_ticket(&db, make_new(&format!("user-{i}"))).await
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            let ticket = handle.await.unwrap().unwrap();
            assert!(!ticket.ticket_id.is_empty());
            seen.insert(ticket.ticket_id);
        }
        assert_eq!(seen.len(), 16);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_ticket_id_is_a_constraint_error_not_an_overwrite() {
        let (db, _dir) = setup_db().await;

        let insert = |conn: &rusqlite::Connection| {
            conn.execute(
                "INSERT INTO tickets (ticket_id, name, email, reason, priority, status, note, created_at, updated_at)
                 VALUES ('TKT-dup', 'a', 'a@b.c', 'r', 'low', 'new', NULL, 't1', 't1')",
                [],
            )
        };

        db.connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                insert(conn)?;
                Ok(())
            })
            .await
            .unwrap();

        let err = db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                insert(conn)?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
            .unwrap_err();
        assert!(matches!(err, IntakeError::Constraint(_)));

        let all = list_tickets(&db, TicketFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let (db, _dir) = setup_db().await;

        let first = create_ticket(&db, make_new("first")).await.unwrap();
        // Timestamps carry millisecond precision; make sure the second
        // create lands on a later one.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = create_ticket(&db, make_new("second")).await.unwrap();

        let all = list_tickets(&db, TicketFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn equal_timestamps_tiebreak_on_id_descending() {
        let (db, _dir) = setup_db().await;

        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                for ticket_id in ["TKT-a", "TKT-b", "TKT-c"] {
                    conn.execute(
                        "INSERT INTO tickets (ticket_id, name, email, reason, priority, status, note, created_at, updated_at)
                         VALUES (?1, 'n', 'e@x.y', 'r', 'low', 'new', NULL, '2026-08-04T10:00:00.000Z', '2026-08-04T10:00:00.000Z')",
                        params![ticket_id],
                    )?;
                }
                Ok(())
            })
            .await
            .unwrap();

        let all = list_tickets(&db, TicketFilter::default()).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn filters_compose_with_and() {
        let (db, _dir) = setup_db().await;

        let mut low = make_new("low-prio");
        low.priority = Some("low".to_string());
        create_ticket(&db, low).await.unwrap();

        let mut high = make_new("high-prio");
        high.priority = Some("high".to_string());
        let high = create_ticket(&db, high).await.unwrap();

        let filter = TicketFilter {
            priority: Some("high".to_string()),
            status: Some("new".to_string()),
            ..TicketFilter::default()
        };
        let matched = list_tickets(&db, filter).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, high.id);

        // Same priority filter with a non-matching status matches nothing.
        let filter = TicketFilter {
            priority: Some("high".to_string()),
            status: Some("resolved".to_string()),
            ..TicketFilter::default()
        };
        assert!(list_tickets(&db, filter).await.unwrap().is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reason_filter_matches_substring() {
        let (db, _dir) = setup_db().await;

        let mut new = make_new("ada");
        new.reason = Some("billing portal shows the wrong amount".to_string());
        create_ticket(&db, new).await.unwrap();
        create_ticket(&db, make_new("bob")).await.unwrap();

        let filter = TicketFilter {
            reason: Some("billing".to_string()),
            ..TicketFilter::default()
        };
        let matched = list_tickets(&db, filter).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "ada");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn search_matches_across_all_text_fields() {
        let (db, _dir) = setup_db().await;

        // The term appears only in the note.
        let mut new = make_new("ada");
        new.note = Some("billing issue".to_string());
        create_ticket(&db, new).await.unwrap();
        create_ticket(&db, make_new("bob")).await.unwrap();

        let filter = TicketFilter {
            search: Some("billing".to_string()),
            ..TicketFilter::default()
        };
        let matched = list_tickets(&db, filter).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "ada");

        // And a term that appears only in the email.
        let filter = TicketFilter {
            search: Some("bob@example".to_string()),
            ..TicketFilter::default()
        };
        let matched = list_tickets(&db, filter).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "bob");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn no_match_returns_empty_not_error() {
        let (db, _dir) = setup_db().await;
        let filter = TicketFilter {
            search: Some("nothing-here".to_string()),
            ..TicketFilter::default()
        };
        assert!(list_tickets(&db, filter).await.unwrap().is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_status_changes_only_status_and_updated_at() {
        let (db, _dir) = setup_db().await;

        let created = create_ticket(&db, make_new("ada")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let updated = update_ticket_status(&db, created.id, "in-progress")
            .await
            .unwrap();
        assert!(updated);

        let all = list_tickets(&db, TicketFilter::default()).await.unwrap();
        let after = &all[0];
        assert_eq!(after.status, "in-progress");
        assert!(after.updated_at >= created.updated_at);
        assert_ne!(after.updated_at, created.updated_at);
        assert_eq!(after.created_at, created.created_at);
        assert_eq!(after.name, created.name);
        assert_eq!(after.email, created.email);
        assert_eq!(after.ticket_id, created.ticket_id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_status_on_missing_id_reports_not_found_and_changes_nothing() {
        let (db, _dir) = setup_db().await;

        let created = create_ticket(&db, make_new("ada")).await.unwrap();

        let updated = update_ticket_status(&db, created.id + 100, "resolved")
            .await
            .unwrap();
        assert!(!updated);

        let all = list_tickets(&db, TicketFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, "new");
        assert_eq!(all[0].updated_at, created.updated_at);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_status_accepts_any_string() {
        let (db, _dir) = setup_db().await;
        let created = create_ticket(&db, make_new("ada")).await.unwrap();

        assert!(update_ticket_status(&db, created.id, "escalated-to-legal")
            .await
            .unwrap());
        let all = list_tickets(&db, TicketFilter::default()).await.unwrap();
        assert_eq!(all[0].status, "escalated-to-legal");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stats_count_total_urgent_new_and_today() {
        let (db, _dir) = setup_db().await;

        let mut urgent = make_new("urgent-user");
        urgent.priority = Some("urgent".to_string());
        create_ticket(&db, urgent).await.unwrap();

        let a = create_ticket(&db, make_new("a")).await.unwrap();
        create_ticket(&db, make_new("b")).await.unwrap();

        // Move one ticket out of "new" so the counts diverge.
        update_ticket_status(&db, a.id, "resolved").await.unwrap();

        let stats = ticket_stats(&db).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.urgent, 1);
        assert_eq!(stats.new, 2);
        assert_eq!(stats.today, 3);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stats_today_excludes_older_days() {
        let (db, _dir) = setup_db().await;

        create_ticket(&db, make_new("today")).await.unwrap();
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO tickets (ticket_id, name, email, reason, priority, status, note, created_at, updated_at)
                     VALUES ('TKT-old', 'old', 'old@example.com', 'r', 'low', 'new', NULL, '2001-01-01T00:00:00.000Z', '2001-01-01T00:00:00.000Z')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let stats = ticket_stats(&db).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.today, 1);

        db.close().await.unwrap();
    }

    #[test]
    fn generated_ticket_ids_have_expected_shape() {
        let id = generate_ticket_id();
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts[0], "TKT");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
