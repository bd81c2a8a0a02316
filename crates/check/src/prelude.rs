//! Common imports.
//!
//! ```rust
//! use sift_check::prelude::*;
//!
//! let out = Checker::new().check("42", &Rule::int().max(10));
//! assert_eq!(out.value, Value::Int(10));
//! ```

pub use crate::check::{Checker, Outcome};
pub use crate::error::FilterError;
pub use crate::hooks::FilterHook;
pub use crate::rule::Rule;
pub use crate::value::{Number, Value};
pub use crate::values::Values;
