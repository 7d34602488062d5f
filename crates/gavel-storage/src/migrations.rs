//! Database schema migrations.
//!
//! Applies the initial schema including the action_logs and
//! schema_migrations tables.

use rusqlite::Connection;
use tracing::info;

use gavel_core::error::GavelError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), GavelError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| GavelError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| GavelError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), GavelError> {
    conn.execute_batch(
        "
        -- One row per action invocation, written after the outcome is known.
        -- JSON payloads (data, context, snapshots, deltas) are stored as text.
        CREATE TABLE IF NOT EXISTS action_logs (
            id              TEXT PRIMARY KEY NOT NULL,
            status          TEXT NOT NULL DEFAULT 'created'
                            CHECK (status IN ('created', 'aborted', 'finished')),
            actor_id        TEXT NOT NULL,
            target_kind     TEXT NOT NULL,
            target_id       TEXT NOT NULL,
            action_code     TEXT NOT NULL,
            action_label    TEXT NOT NULL DEFAULT '',
            action_data     TEXT NOT NULL DEFAULT 'null',
            context         TEXT NOT NULL DEFAULT 'null',
            snapshot        TEXT NOT NULL DEFAULT 'null',
            before_state    TEXT NOT NULL DEFAULT 'null',
            after_state     TEXT NOT NULL DEFAULT 'null',
            error_message   TEXT,
            created_at      INTEGER NOT NULL,
            finished_at     INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_action_logs_created_at
            ON action_logs (created_at DESC);

        CREATE INDEX IF NOT EXISTS idx_action_logs_target
            ON action_logs (target_kind, target_id, created_at DESC);

        CREATE INDEX IF NOT EXISTS idx_action_logs_actor
            ON action_logs (actor_id, created_at DESC);

        CREATE INDEX IF NOT EXISTS idx_action_logs_action_code
            ON action_logs (action_code, created_at DESC);

        CREATE INDEX IF NOT EXISTS idx_action_logs_status
            ON action_logs (status, created_at DESC);

        -- Record migration.
        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| GavelError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
