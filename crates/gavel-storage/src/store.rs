//! SQLite-backed audit log store.
//!
//! Persists every recorded invocation to the action_logs table and
//! provides query methods for audit review by target, actor, and action.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use gavel_core::error::GavelError;
use gavel_core::log::{ActionLog, LogError, LogStatus};
use gavel_core::store::LogStore;
use gavel_core::target::TargetRef;
use gavel_core::types::{ActorId, LogId, Timestamp};

use crate::db::Database;

/// Log store that writes invocation records to SQLite.
pub struct SqliteLogStore {
    db: Arc<Database>,
}

impl SqliteLogStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Find a log by ID.
    pub fn find(&self, id: &LogId) -> Result<Option<ActionLog>, GavelError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, status, actor_id, target_kind, target_id, action_code, action_label,
                            action_data, context, snapshot, before_state, after_state, error_message,
                            created_at, finished_at
                     FROM action_logs WHERE id = ?1",
                )
                .map_err(|e| GavelError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id.to_string()], |row| Ok(row_to_log(row)))
                .optional()
                .map_err(|e| GavelError::Storage(e.to_string()))?;

            match result {
                Some(log) => Ok(Some(log?)),
                None => Ok(None),
            }
        })
    }

    /// Most recently created logs, newest first.
    ///
    /// created_at has second precision, so rowid breaks ties in favor of
    /// later inserts.
    pub fn recent(&self, limit: u64) -> Result<Vec<ActionLog>, GavelError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, status, actor_id, target_kind, target_id, action_code, action_label,
                            action_data, context, snapshot, before_state, after_state, error_message,
                            created_at, finished_at
                     FROM action_logs
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?1",
                )
                .map_err(|e| GavelError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![limit], |row| Ok(row_to_log(row)))
                .map_err(|e| GavelError::Storage(e.to_string()))?;

            let mut logs = Vec::new();
            for row in rows {
                let log = row.map_err(|e| GavelError::Storage(e.to_string()))??;
                logs.push(log);
            }
            Ok(logs)
        })
    }

    /// Logs recorded against one target, newest first.
    pub fn for_target(
        &self,
        kind: &str,
        target_id: &str,
        limit: u64,
    ) -> Result<Vec<ActionLog>, GavelError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, status, actor_id, target_kind, target_id, action_code, action_label,
                            action_data, context, snapshot, before_state, after_state, error_message,
                            created_at, finished_at
                     FROM action_logs
                     WHERE target_kind = ?1 AND target_id = ?2
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?3",
                )
                .map_err(|e| GavelError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![kind, target_id, limit], |row| {
                    Ok(row_to_log(row))
                })
                .map_err(|e| GavelError::Storage(e.to_string()))?;

            let mut logs = Vec::new();
            for row in rows {
                let log = row.map_err(|e| GavelError::Storage(e.to_string()))??;
                logs.push(log);
            }
            Ok(logs)
        })
    }

    /// Logs recorded for one actor, newest first.
    pub fn for_actor(&self, actor: &ActorId, limit: u64) -> Result<Vec<ActionLog>, GavelError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, status, actor_id, target_kind, target_id, action_code, action_label,
                            action_data, context, snapshot, before_state, after_state, error_message,
                            created_at, finished_at
                     FROM action_logs
                     WHERE actor_id = ?1
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?2",
                )
                .map_err(|e| GavelError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![actor.as_str(), limit], |row| {
                    Ok(row_to_log(row))
                })
                .map_err(|e| GavelError::Storage(e.to_string()))?;

            let mut logs = Vec::new();
            for row in rows {
                let log = row.map_err(|e| GavelError::Storage(e.to_string()))??;
                logs.push(log);
            }
            Ok(logs)
        })
    }

    /// Logs recorded for one action code, newest first.
    pub fn for_action(&self, code: &str, limit: u64) -> Result<Vec<ActionLog>, GavelError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, status, actor_id, target_kind, target_id, action_code, action_label,
                            action_data, context, snapshot, before_state, after_state, error_message,
                            created_at, finished_at
                     FROM action_logs
                     WHERE action_code = ?1
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?2",
                )
                .map_err(|e| GavelError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![code, limit], |row| Ok(row_to_log(row)))
                .map_err(|e| GavelError::Storage(e.to_string()))?;

            let mut logs = Vec::new();
            for row in rows {
                let log = row.map_err(|e| GavelError::Storage(e.to_string()))??;
                logs.push(log);
            }
            Ok(logs)
        })
    }

    /// Count all stored logs.
    pub fn count(&self) -> Result<u64, GavelError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM action_logs", [], |row| row.get(0))
                .map_err(|e| GavelError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }

    /// Count stored logs with the given status.
    pub fn count_by_status(&self, status: LogStatus) -> Result<u64, GavelError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM action_logs WHERE status = ?1",
                    rusqlite::params![status.to_string()],
                    |row| row.get(0),
                )
                .map_err(|e| GavelError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

impl LogStore for SqliteLogStore {
    fn save(&self, log: &ActionLog) -> Result<(), GavelError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO action_logs (id, status, actor_id, target_kind, target_id,
                                          action_code, action_label, action_data, context, snapshot,
                                          before_state, after_state, error_message, created_at, finished_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                rusqlite::params![
                    log.id.to_string(),
                    log.status.to_string(),
                    log.actor.as_str(),
                    log.target.kind,
                    log.target.id,
                    log.action_code,
                    log.action_label,
                    log.action_data.to_string(),
                    log.context.to_string(),
                    log.snapshot.to_string(),
                    log.before.to_string(),
                    log.after.to_string(),
                    log.error.as_ref().map(|e| e.message.clone()),
                    log.created_at.0,
                    log.finished_at.map(|t| t.0),
                ],
            )
            .map_err(|e| GavelError::Storage(format!("Failed to save action log: {}", e)))?;
            Ok(())
        })
    }
}

impl std::fmt::Debug for SqliteLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLogStore").finish()
    }
}

// ============================================================================
// Helper functions for row-to-log conversion.
// ============================================================================

fn row_to_log(row: &rusqlite::Row<'_>) -> Result<ActionLog, GavelError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let status_str: String = row
        .get(1)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let actor_id: String = row
        .get(2)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let target_kind: String = row
        .get(3)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let target_id: String = row
        .get(4)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let action_code: String = row
        .get(5)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let action_label: String = row
        .get(6)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let action_data: String = row
        .get(7)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let context: String = row
        .get(8)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let snapshot: String = row
        .get(9)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let before_state: String = row
        .get(10)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let after_state: String = row
        .get(11)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let error_message: Option<String> = row
        .get(12)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let created_at: i64 = row
        .get(13)
        .map_err(|e| GavelError::Storage(e.to_string()))?;
    let finished_at: Option<i64> = row
        .get(14)
        .map_err(|e| GavelError::Storage(e.to_string()))?;

    Ok(ActionLog {
        id: LogId(
            Uuid::parse_str(&id_str)
                .map_err(|e| GavelError::Storage(format!("Invalid UUID: {}", e)))?,
        ),
        status: status_str.parse().map_err(GavelError::Storage)?,
        actor: ActorId::new(actor_id),
        target: TargetRef {
            kind: target_kind,
            id: target_id,
        },
        action_code,
        action_label,
        action_data: serde_json::from_str(&action_data).unwrap_or(Value::Null),
        context: serde_json::from_str(&context).unwrap_or(Value::Null),
        snapshot: serde_json::from_str(&snapshot).unwrap_or(Value::Null),
        before: serde_json::from_str(&before_state).unwrap_or(Value::Null),
        after: serde_json::from_str(&after_state).unwrap_or(Value::Null),
        error: error_message.map(LogError::new),
        created_at: Timestamp(created_at),
        finished_at: finished_at.map(Timestamp),
    })
}

/// Extension trait for rusqlite to support optional query results.
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
