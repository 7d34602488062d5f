//! Core vocabulary for the Gavel action engine.
//!
//! Shared across the workspace: the execution [`Context`], the [`Target`]
//! interface domain objects implement, the [`ActionLog`] audit record, the
//! [`LogStore`] persistence seam, engine configuration, and error types.

pub mod config;
pub mod context;
pub mod error;
pub mod log;
pub mod store;
pub mod target;
pub mod types;

pub use config::EngineConfig;
pub use context::Context;
pub use error::{CommitError, GavelError, Result};
pub use log::{ActionLog, LogError, LogStatus};
pub use store::{LogStore, MemoryLogStore};
pub use target::{ChangeTracker, FieldChange, FieldChanges, Target, TargetRef};
pub use types::{ActorId, LogId, Timestamp};
