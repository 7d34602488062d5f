//! Builder handed to the closure of a `define` call.

use std::sync::Arc;

use gavel_core::context::Context;
use gavel_core::error::CommitError;
use gavel_core::log::ActionLog;
use gavel_core::target::Target;
use serde_json::Value;

use crate::action::Action;
use crate::options::DependentAction;

/// Mutable view over an action being defined or extended.
///
/// Each setter replaces one slot; slots not touched by this builder keep
/// whatever a previous definition installed.
pub struct ActionBuilder<'a, T: Target> {
    action: &'a mut Action<T>,
}

impl<'a, T: Target> ActionBuilder<'a, T> {
    pub(crate) fn new(action: &'a mut Action<T>) -> Self {
        Self { action }
    }

    /// Replace the visibility predicate.
    pub fn show<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&T, &Context) -> bool + Send + Sync + 'static,
    {
        self.action.show_fn = Some(Arc::new(predicate));
        self
    }

    /// Replace the authorization predicate.
    pub fn authorized<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&T, &Context) -> bool + Send + Sync + 'static,
    {
        self.action.authorized_fn = Some(Arc::new(predicate));
        self
    }

    /// Replace the precondition predicate.
    pub fn commitable<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&T, &Context) -> bool + Send + Sync + 'static,
    {
        self.action.commitable_fn = Some(Arc::new(predicate));
        self
    }

    /// Replace the commit body.
    pub fn commit<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut T, &Context) -> Result<(), CommitError> + Send + Sync + 'static,
    {
        self.action.commit_fn = Some(Arc::new(handler));
        self
    }

    /// Replace the finalize hook.
    pub fn finalize<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut ActionLog, &T, &Context) + Send + Sync + 'static,
    {
        self.action.finalize_fn = Some(Arc::new(hook));
        self
    }

    /// Append a dependent action that runs before the commit body.
    pub fn execute_before(&mut self, code: impl Into<String>) -> &mut Self {
        self.action.before_actions.push(DependentAction::new(code));
        self
    }

    /// Append a before-action carrying its own context data.
    pub fn execute_before_with(&mut self, code: impl Into<String>, options: Value) -> &mut Self {
        self.action
            .before_actions
            .push(DependentAction::with_options(code, options));
        self
    }

    /// Append a dependent action that runs after the commit body.
    pub fn execute_after(&mut self, code: impl Into<String>) -> &mut Self {
        self.action.after_actions.push(DependentAction::new(code));
        self
    }

    /// Append an after-action carrying its own context data.
    pub fn execute_after_with(&mut self, code: impl Into<String>, options: Value) -> &mut Self {
        self.action
            .after_actions
            .push(DependentAction::with_options(code, options));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_core::target::{ChangeTracker, FieldChanges};
    use serde_json::json;

    struct Doc {
        state: String,
        tracker: ChangeTracker,
    }

    impl Doc {
        fn new(state: &str) -> Self {
            Self {
                state: state.to_string(),
                tracker: ChangeTracker::new(),
            }
        }

        fn set_state(&mut self, state: &str) {
            self.tracker
                .record("state", json!(self.state), json!(state));
            self.state = state.to_string();
        }
    }

    impl Target for Doc {
        fn kind(&self) -> &str {
            "doc"
        }

        fn id(&self) -> String {
            "1".to_string()
        }

        fn snapshot(&self) -> Value {
            json!({ "state": self.state })
        }

        fn diff(&mut self) -> FieldChanges {
            self.tracker.drain()
        }
    }

    #[test]
    fn test_setters_fill_slots() {
        let mut action: Action<Doc> = Action::new("publish");
        let mut builder = ActionBuilder::new(&mut action);
        builder
            .show(|_, _| true)
            .authorized(|_, ctx| ctx.actor.is_some())
            .commitable(|doc, _| doc.state == "draft")
            .commit(|doc, _| {
                doc.set_state("published");
                Ok(())
            })
            .finalize(|log, _, _| {
                log.action_label = "Published".to_string();
            });

        assert!(action.show_fn.is_some());
        assert!(action.authorized_fn.is_some());
        assert!(action.commitable_fn.is_some());
        assert!(action.commit_fn.is_some());
        assert!(action.finalize_fn.is_some());
    }

    #[test]
    fn test_commit_slot_mutates_target() {
        let mut action: Action<Doc> = Action::new("publish");
        ActionBuilder::new(&mut action).commit(|doc, _| {
            doc.set_state("published");
            Ok(())
        });

        let mut doc = Doc::new("draft");
        let ctx = Context::for_actor("alice");
        if let Some(commit) = &action.commit_fn {
            commit(&mut doc, &ctx).unwrap();
        }
        assert_eq!(doc.state, "published");
        let changes = doc.diff();
        assert_eq!(changes.old_values(), json!({ "state": "draft" }));
        assert_eq!(changes.new_values(), json!({ "state": "published" }));
    }

    #[test]
    fn test_dependent_setters_append_in_order() {
        let mut action: Action<Doc> = Action::new("publish");
        ActionBuilder::new(&mut action)
            .execute_before("validate")
            .execute_before_with("audit", json!({ "level": "full" }))
            .execute_after("notify");

        let before: Vec<&str> = action.before_actions.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(before, vec!["validate", "audit"]);
        assert_eq!(action.before_actions[1].options, json!({ "level": "full" }));
        assert_eq!(action.after_actions[0].code, "notify");
    }

    #[test]
    fn test_setter_replaces_previous_slot() {
        let mut action: Action<Doc> = Action::new("publish");
        ActionBuilder::new(&mut action).commitable(|_, _| false);
        ActionBuilder::new(&mut action).commitable(|_, _| true);

        let doc = Doc::new("draft");
        assert!(action.commitable(&doc, &Context::for_actor("alice")));
    }
}
