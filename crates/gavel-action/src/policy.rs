//! External authorization collaborator.

use gavel_core::context::Context;
use gavel_core::target::Target;

/// Decides whether an actor may run an action against a target.
///
/// A registry-level policy backs the `authorized` gate of every action
/// that does not carry its own predicate. Implemented for any matching
/// closure, so simple policies need no named type.
pub trait Policy<T: Target>: Send + Sync {
    fn allows(&self, target: &T, ctx: &Context, code: &str) -> bool;
}

impl<T, F> Policy<T> for F
where
    T: Target,
    F: Fn(&T, &Context, &str) -> bool + Send + Sync,
{
    fn allows(&self, target: &T, ctx: &Context, code: &str) -> bool {
        self(target, ctx, code)
    }
}
