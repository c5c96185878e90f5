// SPDX-FileCopyrightText: 2026 Intake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All access is serialized through tokio-rusqlite's single background
//! thread: the [`Database`] handle IS the single writer. Query functions
//! accept `&Database` and go through `connection().call()`, which eliminates
//! SQLITE_BUSY errors under concurrent requests. Do NOT open additional
//! `Connection` instances for writes.

use intake_core::IntakeError;
use tokio_rusqlite::Connection;

use crate::migrations;

/// Handle to the single SQLite connection.
///
/// Cloning is cheap; clones share the same background connection thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    ///
    /// A migration failure propagates out of here; callers treat it as a
    /// fatal startup error rather than serving requests against a
    /// half-bootstrapped schema.
    pub async fn open(path: &str) -> Result<Self, IntakeError> {
        let conn = Connection::open(path)
            .await
            .map_err(tokio_rusqlite::Error::from)
            .map_err(map_tr_err)?;

        conn.call(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| Ok(migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)??;

        tracing::debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), IntakeError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the crate error taxonomy.
///
/// Constraint violations (NOT NULL, UNIQUE) get their own variant so the
/// gateway can answer them as client errors instead of server failures.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> IntakeError {
    if let Some(rusqlite::Error::SqliteFailure(code, message)) = find_rusqlite_error(&e) {
        if code.code == rusqlite::ErrorCode::ConstraintViolation {
            return IntakeError::Constraint(
                message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string()),
            );
        }
    }
    IntakeError::Storage {
        source: Box::new(e),
    }
}

/// Walk the source chain looking for the underlying rusqlite error.
fn find_rusqlite_error<'a>(e: &'a (dyn std::error::Error + 'static)) -> Option<&'a rusqlite::Error> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(e);
    while let Some(err) = current {
        if let Some(sqlite_err) = err.downcast_ref::<rusqlite::Error>() {
            return Some(sqlite_err);
        }
        current = err.source();
    }
    None
}
