//! The audit record produced by every commit invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::target::{FieldChanges, TargetRef};
use crate::types::{ActorId, LogId, Timestamp};

/// Lifecycle state of an action log.
///
/// Every log starts as `Created` and makes exactly one transition, to
/// `Aborted` or `Finished`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Created,
    Aborted,
    Finished,
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogStatus::Created => "created",
            LogStatus::Aborted => "aborted",
            LogStatus::Finished => "finished",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for LogStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "created" => Ok(LogStatus::Created),
            "aborted" => Ok(LogStatus::Aborted),
            "finished" => Ok(LogStatus::Finished),
            other => Err(format!("Unknown log status: {}", other)),
        }
    }
}

/// Failure recorded on an aborted log.
///
/// Gate refusals and body errors land here. They are recorded on the log
/// and never surface as a caller error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogError {
    pub message: String,
}

impl LogError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The `authorized` gate refused.
    pub fn unauthorized() -> Self {
        Self::new("Unauthorized")
    }

    /// The `commitable` gate refused.
    pub fn wrong_context() -> Self {
        Self::new("Wrong context")
    }
}

/// Audit record for one commit invocation.
///
/// `snapshot` holds the target's full pre-execution state; `before` and
/// `after` hold the old and new values of only the fields this commit's
/// own body changed, as JSON objects.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionLog {
    pub id: LogId,
    pub status: LogStatus,
    pub actor: ActorId,
    pub target: TargetRef,
    pub action_code: String,
    pub action_label: String,
    /// Caller-supplied data payload for this invocation.
    pub action_data: Value,
    /// Serialized context at invocation time.
    pub context: Value,
    /// Full pre-execution state of the target.
    pub snapshot: Value,
    /// Old values of the fields this commit changed.
    pub before: Value,
    /// New values of the fields this commit changed.
    pub after: Value,
    pub error: Option<LogError>,
    pub created_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

impl ActionLog {
    /// Open a log for an invocation about to execute.
    #[allow(clippy::too_many_arguments)]
    pub fn begin(
        actor: ActorId,
        target: TargetRef,
        action_code: impl Into<String>,
        action_label: impl Into<String>,
        action_data: Value,
        context: Value,
        snapshot: Value,
    ) -> Self {
        Self {
            id: LogId::new(),
            status: LogStatus::Created,
            actor,
            target,
            action_code: action_code.into(),
            action_label: action_label.into(),
            action_data,
            context,
            snapshot,
            before: Value::Null,
            after: Value::Null,
            error: None,
            created_at: Timestamp::now(),
            finished_at: None,
        }
    }

    /// Record the old/new halves of the commit's own delta.
    pub fn record_changes(&mut self, changes: &FieldChanges) {
        self.before = changes.old_values();
        self.after = changes.new_values();
    }

    /// Terminal transition: the invocation did not commit.
    pub fn abort(&mut self, error: LogError) {
        self.status = LogStatus::Aborted;
        self.error = Some(error);
        self.finished_at = Some(Timestamp::now());
    }

    /// Terminal transition: the invocation committed.
    pub fn finish(&mut self) {
        self.status = LogStatus::Finished;
        self.finished_at = Some(Timestamp::now());
    }

    pub fn is_aborted(&self) -> bool {
        self.status == LogStatus::Aborted
    }

    pub fn is_finished(&self) -> bool {
        self.status == LogStatus::Finished
    }

    /// Message of the recorded error, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}
