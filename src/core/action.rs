//! Side effects run on state entry, state exit and transitions.

use super::context::StateContext;
use std::fmt;
use std::sync::Arc;

/// A side effect executed with a [`StateContext`].
///
/// Actions are cheap to clone; clones share the same closure.
pub struct Action<E> {
    run: Arc<dyn Fn(&StateContext<E>) + Send + Sync>,
}

impl<E> Action<E> {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&StateContext<E>) + Send + Sync + 'static,
    {
        Action { run: Arc::new(action) }
    }

    pub fn execute(&self, context: &StateContext<E>) {
        (self.run)(context)
    }
}

impl<E> Clone for Action<E> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<E> fmt::Debug for Action<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn execute_runs_closure_with_context() {
        let action: Action<&str> = Action::new(|ctx| {
            ctx.extended_state()
                .update("runs", |v| json!(v.and_then(Value::as_u64).unwrap_or(0) + 1));
        });
        let context = StateContext::detached();

        action.execute(&context);
        action.clone().execute(&context);

        assert_eq!(context.extended_state().get::<u64>("runs"), Some(2));
    }
}
