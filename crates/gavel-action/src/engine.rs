//! The execution state machine behind `commit`.

use std::sync::Arc;

use gavel_core::config::EngineConfig;
use gavel_core::context::Context;
use gavel_core::error::{GavelError, Result};
use gavel_core::log::{ActionLog, LogError};
use gavel_core::store::LogStore;
use gavel_core::target::{FieldChanges, Target, TargetRef};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::options::DependentAction;
use crate::registry::Registry;

/// Executes registered actions against targets and persists one log per
/// invocation.
///
/// Business failures (gate refusals, commit body errors, dependent action
/// trouble) are recorded on the log and never returned as errors. The
/// `Err` path is reserved for malformed invocations and storage failures.
pub struct Engine<T: Target> {
    registry: Registry<T>,
    store: Arc<dyn LogStore>,
    config: EngineConfig,
}

impl<T: Target> Engine<T> {
    pub fn new(registry: Registry<T>, store: Arc<dyn LogStore>) -> Self {
        Self::with_config(registry, store, EngineConfig::default())
    }

    pub fn with_config(
        registry: Registry<T>,
        store: Arc<dyn LogStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            store,
            config,
        }
    }

    pub fn registry(&self) -> &Registry<T> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry<T> {
        &mut self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Look up a defined action by code.
    pub fn action(&self, code: &str) -> Option<&Action<T>> {
        self.registry.get(code)
    }

    /// Actions visible for this target and context, in presentation order.
    pub fn visible(&self, target: &T, ctx: &Context) -> Vec<&Action<T>> {
        self.registry.visible(target, ctx)
    }

    /// Run one action against a target and return its terminal log.
    ///
    /// Exactly one log is saved per call, aborted or finished. Errors are
    /// returned only for invocations that never reach execution (missing
    /// actor, oversized data, unknown code), for dependency depth overruns
    /// and for failures while persisting the log.
    pub fn commit(&self, code: &str, target: &mut T, ctx: &Context) -> Result<ActionLog> {
        if ctx.actor.is_none() {
            return Err(GavelError::ActorMissing(code.to_string()));
        }
        if let Some(limit) = self.config.max_data_bytes {
            let size = serde_json::to_vec(&ctx.data)?.len();
            if size > limit {
                return Err(GavelError::InvalidData(format!(
                    "context data is {} bytes, limit is {}",
                    size, limit
                )));
            }
        }
        if !self.registry.contains(code) {
            return Err(GavelError::UnknownAction(code.to_string()));
        }
        self.execute(code, target, ctx, 0)
    }

    fn execute(&self, code: &str, target: &mut T, ctx: &Context, depth: u32) -> Result<ActionLog> {
        if depth > self.config.max_dependency_depth {
            return Err(GavelError::DependencyDepth {
                code: code.to_string(),
                max: self.config.max_dependency_depth,
            });
        }
        let action = self
            .registry
            .get(code)
            .ok_or_else(|| GavelError::UnknownAction(code.to_string()))?;
        let actor = ctx
            .actor
            .clone()
            .ok_or_else(|| GavelError::ActorMissing(code.to_string()))?;

        // Drop changes accumulated before this invocation.
        let _ = target.diff();

        let mut log = ActionLog::begin(
            actor,
            TargetRef::of(target),
            code,
            action.label.as_str(),
            ctx.data.clone(),
            ctx.to_value(),
            target.snapshot(),
        );

        let mut changes = FieldChanges::new();
        let outcome = if !action.authorized(target, ctx) {
            Some(LogError::unauthorized())
        } else if !action.commitable(target, ctx) {
            Some(LogError::wrong_context())
        } else {
            self.run_body(action, target, ctx, depth, &mut changes)?
        };

        log.record_changes(&changes);
        match outcome {
            Some(error) => log.abort(error),
            None => log.finish(),
        }

        if let Some(finalize) = &action.finalize_fn {
            finalize(&mut log, target, ctx);
        }

        if log.is_aborted() {
            warn!(
                "Action '{}' aborted for {}: {}",
                code,
                log.target,
                log.error_message().unwrap_or_default()
            );
        } else {
            info!("Action '{}' finished for {}", code, log.target);
        }

        self.store.save(&log)?;
        Ok(log)
    }

    /// The guarded region: before-actions, commit body, after-actions.
    ///
    /// `Ok(Some(_))` is a contained failure recorded on the caller's log;
    /// `Err(_)` abandons the invocation without saving it.
    fn run_body(
        &self,
        action: &Action<T>,
        target: &mut T,
        ctx: &Context,
        depth: u32,
        changes: &mut FieldChanges,
    ) -> Result<Option<LogError>> {
        if let Some(failure) = self.run_dependents(&action.before_actions, target, ctx, depth)? {
            return Ok(Some(failure));
        }

        let body = match &action.commit_fn {
            Some(commit) => commit(target, ctx),
            None => Ok(()),
        };
        // Capture this commit's own delta before after-actions write theirs.
        *changes = target.diff();
        if let Err(error) = body {
            return Ok(Some(LogError::new(error.message())));
        }

        self.run_dependents(&action.after_actions, target, ctx, depth)
    }

    fn run_dependents(
        &self,
        dependents: &[DependentAction],
        target: &mut T,
        ctx: &Context,
        depth: u32,
    ) -> Result<Option<LogError>> {
        for dependent in dependents {
            if !self.registry.contains(&dependent.code) {
                return Ok(Some(LogError::new(format!(
                    "Dependent action not defined: {}",
                    dependent.code
                ))));
            }
            let dep_ctx = match &dependent.options {
                Value::Null => ctx.clone(),
                options => Context {
                    actor: ctx.actor.clone(),
                    data: options.clone(),
                    extra: ctx.extra.clone(),
                },
            };
            debug!(
                "Running dependent action '{}' at depth {}",
                dependent.code,
                depth + 1
            );
            let dep_log = match self.execute(&dependent.code, target, &dep_ctx, depth + 1) {
                Ok(log) => log,
                Err(error @ GavelError::DependencyDepth { .. }) => return Err(error),
                Err(error) => return Ok(Some(LogError::new(error.to_string()))),
            };
            if dep_log.is_aborted() && self.config.strict_dependencies {
                return Ok(Some(LogError::new(format!(
                    "Dependent action '{}' aborted: {}",
                    dependent.code,
                    dep_log.error_message().unwrap_or_default()
                ))));
            }
        }
        Ok(None)
    }
}

impl<T: Target> std::fmt::Debug for Engine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
