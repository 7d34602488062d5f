use thiserror::Error;

/// Top-level error type for the Gavel engine.
///
/// These are invocation and integration failures that propagate to the
/// caller. Business failures inside a commit body use [`CommitError`] and
/// are recorded on the action log instead of being returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GavelError {
    #[error("Actor is required to commit '{0}'")]
    ActorMissing(String),

    #[error("Invalid action data: {0}")]
    InvalidData(String),

    #[error("Action not defined: {0}")]
    UnknownAction(String),

    #[error("Dependent action depth exceeded at '{code}' (max {max})")]
    DependencyDepth { code: String, max: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for GavelError {
    fn from(err: toml::de::Error) -> Self {
        GavelError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for GavelError {
    fn from(err: toml::ser::Error) -> Self {
        GavelError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GavelError {
    fn from(err: serde_json::Error) -> Self {
        GavelError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Gavel operations.
pub type Result<T> = std::result::Result<T, GavelError>;

/// Business failure raised by a commit body.
///
/// The engine catches these at the commit boundary, records the message on
/// the log, and returns the aborted log normally. Only the message
/// survives into the audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CommitError {
    message: String,
}

impl CommitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for CommitError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CommitError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for CommitError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}
