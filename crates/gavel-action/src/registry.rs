//! Per-target-type action registry.

use std::collections::HashMap;
use std::sync::Arc;

use gavel_core::context::Context;
use gavel_core::target::Target;
use tracing::debug;

use crate::action::Action;
use crate::builder::ActionBuilder;
use crate::options::Options;
use crate::policy::Policy;

/// All actions defined for one target type, keyed by code.
///
/// `define` with a code that already exists re-opens the existing action:
/// the options layer on top and the builder closure replaces only the
/// slots it touches. This lets a base declaration install stock actions
/// and callers specialize them later.
pub struct Registry<T: Target> {
    actions: HashMap<String, Action<T>>,
    /// Codes in definition order.
    codes: Vec<String>,
    policy: Option<Arc<dyn Policy<T>>>,
}

impl<T: Target> Registry<T> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            codes: Vec::new(),
            policy: None,
        }
    }

    /// A registry pre-loaded with the stock `create` and `update` actions.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    /// Install the stock `create` and `update` actions. Both commit
    /// without preconditions until a later `define` specializes them.
    pub fn register_defaults(&mut self) {
        self.define("create", Options::new(), |_| {});
        self.define("update", Options::new(), |_| {});
    }

    /// Define a new action or extend an existing one.
    pub fn define<F>(&mut self, code: &str, options: Options, configure: F)
    where
        F: FnOnce(&mut ActionBuilder<'_, T>),
    {
        if !self.actions.contains_key(code) {
            let mut action = Action::new(code);
            action.policy = self.policy.clone();
            self.actions.insert(code.to_string(), action);
            self.codes.push(code.to_string());
            debug!("Defined action '{}'", code);
        } else {
            debug!("Extending action '{}'", code);
        }
        if let Some(action) = self.actions.get_mut(code) {
            action.apply_options(&options);
            let mut builder = ActionBuilder::new(action);
            configure(&mut builder);
        }
    }

    pub fn get(&self, code: &str) -> Option<&Action<T>> {
        self.actions.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.actions.contains_key(code)
    }

    /// Codes in definition order.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Every defined action, in definition order.
    pub fn all(&self) -> Vec<&Action<T>> {
        self.codes
            .iter()
            .filter_map(|code| self.actions.get(code))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions whose `show` gate passes for this target and context,
    /// sorted by order, then code.
    pub fn visible(&self, target: &T, ctx: &Context) -> Vec<&Action<T>> {
        let mut actions: Vec<&Action<T>> = self
            .codes
            .iter()
            .filter_map(|code| self.actions.get(code))
            .filter(|action| action.show(target, ctx))
            .collect();
        actions.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.code.cmp(&b.code)));
        actions
    }

    /// Install a policy backing the `authorized` gate of every action,
    /// current and future, that has no explicit predicate.
    pub fn set_policy(&mut self, policy: Arc<dyn Policy<T>>) {
        for action in self.actions.values_mut() {
            action.policy = Some(policy.clone());
        }
        self.policy = Some(policy);
    }
}

impl<T: Target> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Target> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            codes: self.codes.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<T: Target> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("codes", &self.codes)
            .finish_non_exhaustive()
    }
}
