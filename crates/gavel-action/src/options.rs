//! Declarative options accepted when defining an action.
//!
//! The recognized vocabulary is fixed: `label`, `order`, `type`,
//! `use_policy`, `execute_before_action`, `execute_after_action`. Any
//! other key fails deserialization.

use gavel_core::error::GavelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A reference to another action that runs as part of a commit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DependentAction {
    pub code: String,
    /// Data handed to the dependent invocation as its context data.
    #[serde(default)]
    pub options: Value,
}

impl DependentAction {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(code: impl Into<String>, options: Value) -> Self {
        Self {
            code: code.into(),
            options,
        }
    }
}

/// Options block for one `define` call.
///
/// Every field is optional. Applying options to an existing action
/// overwrites only the fields that are present; dependent action lists
/// append rather than replace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub use_policy: Option<bool>,
    #[serde(rename = "execute_before_action", default)]
    pub before: Vec<DependentAction>,
    #[serde(rename = "execute_after_action", default)]
    pub after: Vec<DependentAction>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an options block from JSON, rejecting unrecognized keys.
    pub fn from_value(value: Value) -> Result<Self, GavelError> {
        serde_json::from_value(value).map_err(|e| GavelError::Config(e.to_string()))
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn use_policy(mut self, use_policy: bool) -> Self {
        self.use_policy = Some(use_policy);
        self
    }

    pub fn execute_before(mut self, code: impl Into<String>) -> Self {
        self.before.push(DependentAction::new(code));
        self
    }

    pub fn execute_before_with(mut self, code: impl Into<String>, options: Value) -> Self {
        self.before.push(DependentAction::with_options(code, options));
        self
    }

    pub fn execute_after(mut self, code: impl Into<String>) -> Self {
        self.after.push(DependentAction::new(code));
        self
    }

    pub fn execute_after_with(mut self, code: impl Into<String>, options: Value) -> Self {
        self.after.push(DependentAction::with_options(code, options));
        self
    }
}
