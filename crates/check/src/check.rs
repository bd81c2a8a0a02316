//! The rule interpreter
//!
//! [`Checker::filter`] walks a rule's filters in order, threading the value
//! through each one:
//!
//! 1. a filter that fails stops the walk, unless its error code is in the
//!    rule's ignore set, in which case the error is dropped and the filter's
//!    coerced value is carried on;
//! 2. if an error survives and the rule declares a default, the default
//!    replaces the value and the error is dropped.
//!
//! Structural filters (`arrays`, `any`) call back into the interpreter for
//! members and alternatives; nesting is bounded by
//! [`CheckConfig::max_depth`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::condition::ConditionNormalizer;
use crate::config::CheckConfig;
use crate::entity::EntityStore;
use crate::error::FilterError;
use crate::filter::Filter;
use crate::filters::{bounds, equality, format, scalar, structure, text, types};
use crate::hooks::{FilterHook, HookRegistry};
use crate::rule::Rule;
use crate::value::Value;

// ============================================================================
// OUTCOME
// ============================================================================

/// Result of filtering one value: the coerced value and any error.
///
/// The value is always usable, even when an error is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Coerced value
    pub value: Value,
    /// Validation error, if any
    pub error: Option<FilterError>,
}

impl Outcome {
    /// Success.
    pub fn ok(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            error: None,
        }
    }

    /// Failure with a best-effort value.
    pub fn fail(value: impl Into<Value>, error: FilterError) -> Self {
        Self {
            value: value.into(),
            error: Some(error),
        }
    }

    /// Whether no error was produced.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Code of the error, if any.
    pub fn code(&self) -> Option<&str> {
        self.error.as_ref().and_then(FilterError::code)
    }

    /// `Ok(value)` or `Err(error)`, dropping the coerced value on failure.
    pub fn into_result(self) -> Result<Value, FilterError> {
        match self.error {
            None => Ok(self.value),
            Some(error) => Err(error),
        }
    }
}

// ============================================================================
// CHECKER
// ============================================================================

/// Rule interpreter with its collaborators and hooks.
///
/// A checker holds no per-call state; share one between threads.
///
/// ```rust
/// use sift_check::{Checker, Rule, Value};
///
/// let checker = Checker::new();
/// let rule = Rule::arrays([
///     ("name", Rule::string().trim().max(20)),
///     ("age", Rule::int().min(0).required()),
/// ]);
///
/// let out = checker.check(serde_json::json!({"name": "Ann", "age": "x"}), &rule);
/// let error = out.error.unwrap();
/// assert_eq!(error.code(), Some("arrays"));
/// assert_eq!(error.child("age").and_then(|e| e.code()), Some("int"));
/// ```
pub struct Checker {
    config: CheckConfig,
    hooks: HookRegistry,
    entities: Option<Arc<dyn EntityStore>>,
    conditions: Option<Arc<dyn ConditionNormalizer>>,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checker")
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .field("entities", &self.entities.is_some())
            .field("conditions", &self.conditions.is_some())
            .finish()
    }
}

impl Checker {
    /// Checker with default configuration and no collaborators.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a checker.
    pub fn builder() -> CheckerBuilder {
        CheckerBuilder::default()
    }

    /// Active configuration.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Hook registry for custom filters.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Filter `value` by `rule`; without a rule the value passes unchanged.
    pub fn filter(&self, value: impl Into<Value>, rule: Option<&Rule>) -> Outcome {
        match rule {
            Some(rule) => self.run(value.into(), rule, 0),
            None => Outcome::ok(value),
        }
    }

    /// Filter `value` by `rule`.
    pub fn check(&self, value: impl Into<Value>, rule: &Rule) -> Outcome {
        self.run(value.into(), rule, 0)
    }

    pub(crate) fn run(&self, mut value: Value, rule: &Rule, depth: usize) -> Outcome {
        let mut error = None;

        for filter in rule.filters() {
            let outcome = self.apply(filter, value, rule, depth);
            value = outcome.value;
            trace!(filter = filter.name(), depth, ok = outcome.error.is_none(), "filter applied");

            let Some(err) = outcome.error else { continue };
            match err.code() {
                Some(code) if rule.ignores(code) => {
                    debug!(code, "filter error ignored");
                }
                _ => {
                    error = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = &error
            && let Some(default) = rule.default_value()
        {
            debug!(code = err.code(), "default substituted for failed value");
            return Outcome::ok(default.clone());
        }

        Outcome { value, error }
    }

    fn apply(&self, filter: &Filter, value: Value, rule: &Rule, depth: usize) -> Outcome {
        match filter {
            Filter::Bool => scalar::bool(value),
            Filter::Int => scalar::int(value, self.config.int_bound),
            Filter::Double => scalar::double(value),
            Filter::String => scalar::string(value),
            Filter::Scalar => scalar::scalar(value),
            Filter::Null => scalar::null(value),
            Filter::Arrays(arrays) => structure::arrays(self, value, arrays, rule, depth),
            Filter::Any(alternatives) => structure::any(self, value, alternatives, depth),
            Filter::Object(class) => types::object(value, class.as_deref()),
            Filter::Values => types::values(value),
            Filter::Entity(condition) => {
                types::entity(value, condition.as_ref(), self.entities.as_deref())
            }
            Filter::Condition => types::condition(value, self.conditions.as_deref()),
            Filter::Max(n) => bounds::max(value, *n),
            Filter::Min(n) => bounds::min(value, *n),
            Filter::Less(n) => bounds::less(value, *n),
            Filter::More(n) => bounds::more(value, *n),
            Filter::Eq { target, strict } => equality::eq(value, target, *strict),
            Filter::Not { target, strict } => equality::not(value, target, *strict),
            Filter::In(allowed) => equality::one_of(value, allowed),
            Filter::NotIn(rejected) => equality::none_of(value, rejected),
            Filter::Trim => text::trim(value),
            Filter::Escape { full } => text::escape(value, *full),
            Filter::StripTags { allowed } => text::strip_tags(value, allowed),
            Filter::Lowercase => text::lowercase(value),
            Filter::Uppercase => text::uppercase(value),
            Filter::Color => text::color(value),
            Filter::Email => format::email(value),
            Filter::Url => format::url(value),
            Filter::Ip => format::ip(value),
            Filter::Uri => format::uri(value),
            Filter::Regexp(patterns) => format::regexp(value, patterns),
            Filter::OsPatterns(patterns) => format::ospatterns(value, patterns),
            Filter::Custom { name, args } => match self.hooks.invoke(name, &value, args, rule) {
                Some(outcome) => outcome,
                None => {
                    debug!(filter = %name, "no hook for filter, value passed through");
                    Outcome::ok(value)
                }
            },
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`Checker`].
#[derive(Default)]
pub struct CheckerBuilder {
    config: CheckConfig,
    hooks: HookRegistry,
    entities: Option<Arc<dyn EntityStore>>,
    conditions: Option<Arc<dyn ConditionNormalizer>>,
}

impl CheckerBuilder {
    /// Engine configuration.
    #[must_use = "builder methods must be chained or built"]
    pub fn config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }

    /// Store used by the `entity` filter.
    #[must_use = "builder methods must be chained or built"]
    pub fn entity_store(mut self, store: impl EntityStore + 'static) -> Self {
        self.entities = Some(Arc::new(store));
        self
    }

    /// Shared store used by the `entity` filter.
    #[must_use = "builder methods must be chained or built"]
    pub fn shared_entity_store(mut self, store: Arc<dyn EntityStore>) -> Self {
        self.entities = Some(store);
        self
    }

    /// Normalizer used by the `condition` filter.
    #[must_use = "builder methods must be chained or built"]
    pub fn condition_normalizer(mut self, normalizer: impl ConditionNormalizer + 'static) -> Self {
        self.conditions = Some(Arc::new(normalizer));
        self
    }

    /// Register a custom filter hook.
    #[must_use = "builder methods must be chained or built"]
    pub fn hook(self, name: impl Into<String>, hook: impl FilterHook + 'static) -> Self {
        self.hooks.register(name, hook);
        self
    }

    /// Finish.
    pub fn build(self) -> Checker {
        Checker {
            config: self.config,
            hooks: self.hooks,
            entities: self.entities,
            conditions: self.conditions,
        }
    }
}

impl fmt::Debug for CheckerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckerBuilder")
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
