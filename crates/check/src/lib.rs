//! # sift-check
//!
//! Declarative value filtering for untyped input.
//!
//! A [`Rule`] lists filters to run over a [`Value`]. [`Checker`] runs them in
//! order and returns an [`Outcome`]: the coerced value (always usable) and,
//! when something was wrong, a [`FilterError`] tree shaped like the input.
//!
//! ## Quick Start
//!
//! ```rust
//! use sift_check::prelude::*;
//!
//! let rule = Rule::arrays([
//!     ("page", Rule::int().min(1).required().default(1)),
//!     ("q", Rule::string().trim().max(100)),
//!     ("tags", Rule::arrays_of(Rule::string().lowercase())),
//! ]);
//!
//! let checker = Checker::new();
//! let out = checker.check(serde_json::json!({"q": "rust", "tags": ["cli"]}), &rule);
//!
//! assert!(out.is_ok());
//! assert_eq!(out.value.get("page"), Some(&Value::Int(1)));
//! ```
//!
//! ## Control Flow
//!
//! - the first failing filter stops the rule, unless its code is listed in
//!   [`Rule::ignore`], in which case its coerced value is kept;
//! - a rule with [`Rule::default`] swaps a failed value for the default and
//!   drops the error;
//! - `arrays` filters members by key, collects member errors under their
//!   keys and recovers defaults for missing [`Rule::required`] members.
//!
//! ## Extension
//!
//! Filters the engine does not know are dispatched to hooks registered in
//! [`Checker::hooks`]. Entity lookup and search-condition normalization are
//! supplied by the host through [`EntityStore`] and [`ConditionNormalizer`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
mod compare;
mod condition;
mod config;
mod entity;
mod error;
mod filter;
mod filters;
mod hooks;
pub mod prelude;
mod rule;
mod value;
mod values;

pub use check::{Checker, CheckerBuilder, Outcome};
pub use compare::{loose_contains, loose_eq, strict_eq};
pub use condition::ConditionNormalizer;
pub use config::CheckConfig;
pub use entity::{Entity, EntityRef, EntityStore};
pub use error::{ConfigError, FilterError, Message, RuleError};
pub use filter::{ArraysRule, Filter, FilterArg, FilterKind, GlobPatterns};
pub use hooks::{FilterHook, HookRegistry};
pub use rule::Rule;
pub use value::{HostObject, Number, Value};
pub use values::Values;
