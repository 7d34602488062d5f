//! A named, gated, auditable unit of business logic.

use std::sync::Arc;

use gavel_core::context::Context;
use gavel_core::error::CommitError;
use gavel_core::log::ActionLog;
use gavel_core::target::Target;

use crate::options::{DependentAction, Options};
use crate::policy::Policy;

/// Gating predicate slot, shared by `show`, `authorized` and `commitable`.
pub type Predicate<T> = Arc<dyn Fn(&T, &Context) -> bool + Send + Sync>;

/// Commit body slot. The only code allowed to mutate the target.
pub type CommitFn<T> =
    Arc<dyn Fn(&mut T, &Context) -> std::result::Result<(), CommitError> + Send + Sync>;

/// Finalize hook slot. Runs after the outcome is settled, before the log
/// is persisted, so it can annotate the record.
pub type FinalizeFn<T> = Arc<dyn Fn(&mut ActionLog, &T, &Context) + Send + Sync>;

/// An action definition: declarative attributes plus executable slots.
///
/// Constructed through [`Registry::define`](crate::registry::Registry::define);
/// slots are filled by the [`ActionBuilder`](crate::builder::ActionBuilder)
/// passed to the define closure. Unset slots fall back to permissive
/// defaults, so an action with no predicates is always visible and always
/// commits.
pub struct Action<T: Target> {
    pub code: String,
    pub label: String,
    pub order: i32,
    pub kind: Option<String>,
    pub use_policy: bool,
    pub before_actions: Vec<DependentAction>,
    pub after_actions: Vec<DependentAction>,
    pub(crate) show_fn: Option<Predicate<T>>,
    pub(crate) authorized_fn: Option<Predicate<T>>,
    pub(crate) commitable_fn: Option<Predicate<T>>,
    pub(crate) commit_fn: Option<CommitFn<T>>,
    pub(crate) finalize_fn: Option<FinalizeFn<T>>,
    pub(crate) policy: Option<Arc<dyn Policy<T>>>,
}

impl<T: Target> Action<T> {
    /// Create an empty action. The label is derived from the code,
    /// `"approve_post"` becoming `"Approve post"`.
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        let label = humanize(&code);
        Self {
            code,
            label,
            order: 0,
            kind: None,
            use_policy: false,
            before_actions: Vec::new(),
            after_actions: Vec::new(),
            show_fn: None,
            authorized_fn: None,
            commitable_fn: None,
            commit_fn: None,
            finalize_fn: None,
            policy: None,
        }
    }

    /// Layer an options block onto this action. Present fields overwrite,
    /// absent fields keep their current value, dependent lists append.
    pub fn apply_options(&mut self, options: &Options) {
        if let Some(label) = &options.label {
            self.label = label.clone();
        }
        if let Some(order) = options.order {
            self.order = order;
        }
        if let Some(kind) = &options.kind {
            self.kind = Some(kind.clone());
        }
        if let Some(use_policy) = options.use_policy {
            self.use_policy = use_policy;
        }
        self.before_actions.extend(options.before.iter().cloned());
        self.after_actions.extend(options.after.iter().cloned());
    }

    /// Whether the action should be offered to the caller.
    ///
    /// An explicit `show` predicate always wins. Otherwise visibility is
    /// unconditionally true, unless `use_policy` is set, in which case it
    /// follows `authorized && commitable`.
    pub fn show(&self, target: &T, ctx: &Context) -> bool {
        if let Some(check) = &self.show_fn {
            return check(target, ctx);
        }
        if self.use_policy {
            return self.authorized(target, ctx) && self.commitable(target, ctx);
        }
        true
    }

    /// Whether the actor may run this action. An explicit predicate wins,
    /// then a registry policy, then true.
    pub fn authorized(&self, target: &T, ctx: &Context) -> bool {
        if let Some(check) = &self.authorized_fn {
            return check(target, ctx);
        }
        if let Some(policy) = &self.policy {
            return policy.allows(target, ctx, &self.code);
        }
        true
    }

    /// Whether the target is in a state this action applies to.
    pub fn commitable(&self, target: &T, ctx: &Context) -> bool {
        match &self.commitable_fn {
            Some(check) => check(target, ctx),
            None => true,
        }
    }
}

impl<T: Target> Clone for Action<T> {
    fn clone(&self) -> Self {
        Self {
            code: self.code.clone(),
            label: self.label.clone(),
            order: self.order,
            kind: self.kind.clone(),
            use_policy: self.use_policy,
            before_actions: self.before_actions.clone(),
            after_actions: self.after_actions.clone(),
            show_fn: self.show_fn.clone(),
            authorized_fn: self.authorized_fn.clone(),
            commitable_fn: self.commitable_fn.clone(),
            commit_fn: self.commit_fn.clone(),
            finalize_fn: self.finalize_fn.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<T: Target> std::fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("code", &self.code)
            .field("label", &self.label)
            .field("order", &self.order)
            .field("kind", &self.kind)
            .field("use_policy", &self.use_policy)
            .field("before_actions", &self.before_actions)
            .field("after_actions", &self.after_actions)
            .finish_non_exhaustive()
    }
}

fn humanize(code: &str) -> String {
    let spaced = code.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}
