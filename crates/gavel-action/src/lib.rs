//! Action definition and execution for Gavel.
//!
//! A [`Registry`] holds the actions defined for one target type. Each
//! action carries declarative attributes plus predicate, commit and
//! finalize slots filled through the [`ActionBuilder`]. The [`Engine`]
//! runs actions through their gates, executes dependent actions and the
//! commit body, and persists one audit log per invocation.

pub mod action;
pub mod builder;
pub mod engine;
pub mod options;
pub mod policy;
pub mod registry;

pub use action::{Action, CommitFn, FinalizeFn, Predicate};
pub use builder::ActionBuilder;
pub use engine::Engine;
pub use options::{DependentAction, Options};
pub use policy::Policy;
pub use registry::Registry;
