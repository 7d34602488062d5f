//! Gavel storage crate - SQLite persistence for action audit logs.
//!
//! Provides a WAL-mode SQLite database with migrations and a LogStore
//! implementation that records every finished or aborted invocation,
//! with query methods for audit review.

pub mod db;
pub mod migrations;
pub mod store;

pub use db::Database;
pub use store::SqliteLogStore;
