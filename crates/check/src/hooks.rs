//! Extension hooks for filters outside the built-in table
//!
//! A rule may name any filter. Names the engine does not know are looked up
//! in the checker's [`HookRegistry`]; when no hook answers, the value passes
//! through unchanged.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::check::Outcome;
use crate::rule::Rule;
use crate::value::Value;

/// Implementation of a custom filter.
///
/// Returning `None` declines the call and lets the next hook registered for
/// the same name try.
///
/// # Example
///
/// ```rust
/// use sift_check::{Checker, FilterError, Outcome, Rule, Value};
///
/// let checker = Checker::new();
/// checker.hooks().register("slug", |value: &Value, _args: &[Value], _rule: &Rule| {
///     let s = value.as_str()?;
///     let slug = s.to_lowercase().replace(' ', "-");
///     Some(if slug == s {
///         Outcome::ok(Value::from(slug))
///     } else {
///         Outcome::fail(Value::from(slug), FilterError::new("slug", "Not a slug"))
///     })
/// });
///
/// let out = checker.check(Value::from("Hello World"), &Rule::string().custom("slug", vec![]));
/// assert_eq!(out.value, Value::from("hello-world"));
/// ```
pub trait FilterHook: Send + Sync {
    /// Filter `value` with the arguments given in the rule.
    fn call(&self, value: &Value, args: &[Value], rule: &Rule) -> Option<Outcome>;

    /// Called once on registration.
    fn initialize(&self) {}

    /// Called once when the hook is removed.
    fn shutdown(&self) {}
}

impl<F> FilterHook for F
where
    F: Fn(&Value, &[Value], &Rule) -> Option<Outcome> + Send + Sync,
{
    fn call(&self, value: &Value, args: &[Value], rule: &Rule) -> Option<Outcome> {
        self(value, args, rule)
    }
}

/// Hooks keyed by filter name.
///
/// # Thread Safety
///
/// Registration takes a write lock; dispatch takes a read lock only long
/// enough to clone the hook list, so hooks may call back into the checker.
#[derive(Default)]
pub struct HookRegistry {
    hooks: RwLock<IndexMap<String, Vec<Arc<dyn FilterHook>>>>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for `name`.
    ///
    /// The hook's `initialize()` is called immediately. Hooks for the same
    /// name are tried in registration order.
    pub fn register(&self, name: impl Into<String>, hook: impl FilterHook + 'static) {
        self.register_arc(name, Arc::new(hook));
    }

    /// Register a shared hook.
    pub fn register_arc(&self, name: impl Into<String>, hook: Arc<dyn FilterHook>) {
        let name = name.into();
        hook.initialize();
        debug!(filter = %name, "filter hook registered");
        self.hooks.write().entry(name).or_default().push(hook);
    }

    /// Run the hooks for `name`; the first `Some` wins.
    pub fn invoke(
        &self,
        name: &str,
        value: &Value,
        args: &[Value],
        rule: &Rule,
    ) -> Option<Outcome> {
        let hooks = self.hooks.read().get(name)?.clone();
        for (index, hook) in hooks.iter().enumerate() {
            if let Some(outcome) = hook.call(value, args, rule) {
                debug!(
                    filter = name,
                    hook = index,
                    ok = outcome.is_ok(),
                    "filter hook handled value"
                );
                return Some(outcome);
            }
        }
        None
    }

    /// Remove the hooks for `name`, calling `shutdown()` on each.
    ///
    /// Returns how many hooks were removed.
    pub fn unregister(&self, name: &str) -> usize {
        let removed = self.hooks.write().shift_remove(name).unwrap_or_default();
        for hook in &removed {
            hook.shutdown();
        }
        removed.len()
    }

    /// Remove every hook, calling `shutdown()` on each.
    pub fn shutdown(&self) {
        let drained = std::mem::take(&mut *self.hooks.write());
        for hook in drained.values().flatten() {
            hook.shutdown();
        }
    }

    /// Whether any hook is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.hooks.read().contains_key(name)
    }

    /// Names with at least one hook, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.hooks.read().keys().cloned().collect()
    }

    /// Total number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.read().values().map(Vec::len).sum()
    }

    /// Whether no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("names", &self.names())
            .finish()
    }
}
