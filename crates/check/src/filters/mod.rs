//! Built-in filter implementations
//!
//! Each function takes the current value and returns an [`Outcome`]. A
//! failing filter still returns a usable value, and its error code is the
//! filter's own name.
//!
//! [`Outcome`]: crate::Outcome

pub(crate) mod bounds;
pub(crate) mod equality;
pub(crate) mod format;
pub(crate) mod scalar;
pub(crate) mod structure;
pub(crate) mod text;
pub(crate) mod types;
