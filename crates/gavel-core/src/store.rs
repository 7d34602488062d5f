//! Log persistence seam.
//!
//! The engine talks to a [`LogStore`]; [`MemoryLogStore`] is the in-process
//! implementation used in tests and short-lived tools. Durable backends
//! implement the same trait.

use std::sync::Mutex;

use crate::error::{GavelError, Result};
use crate::log::ActionLog;
use crate::target::TargetRef;
use crate::types::{ActorId, LogId};

/// Sink for finished and aborted action logs.
pub trait LogStore: Send + Sync {
    /// Persist one log. Called exactly once per commit invocation.
    fn save(&self, log: &ActionLog) -> Result<()>;
}

/// In-memory store backed by a mutex-guarded vec.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    logs: Mutex<Vec<ActionLog>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.logs.lock().map(|logs| logs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All logs in insertion order.
    pub fn all(&self) -> Vec<ActionLog> {
        self.logs.lock().map(|logs| logs.clone()).unwrap_or_default()
    }

    /// Most recent logs first, up to `limit`.
    pub fn recent(&self, limit: usize) -> Vec<ActionLog> {
        self.logs
            .lock()
            .map(|logs| logs.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    pub fn find(&self, id: &LogId) -> Option<ActionLog> {
        self.logs
            .lock()
            .ok()
            .and_then(|logs| logs.iter().find(|log| &log.id == id).cloned())
    }

    /// Logs for one target, in insertion order.
    pub fn for_target(&self, target: &TargetRef) -> Vec<ActionLog> {
        self.logs
            .lock()
            .map(|logs| {
                logs.iter()
                    .filter(|log| &log.target == target)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Logs recorded for one actor, in insertion order.
    pub fn for_actor(&self, actor: &ActorId) -> Vec<ActionLog> {
        self.logs
            .lock()
            .map(|logs| {
                logs.iter()
                    .filter(|log| &log.actor == actor)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl LogStore for MemoryLogStore {
    fn save(&self, log: &ActionLog) -> Result<()> {
        let mut logs = self
            .logs
            .lock()
            .map_err(|e| GavelError::Storage(format!("Lock poisoned: {}", e)))?;
        logs.push(log.clone());
        Ok(())
    }
}
