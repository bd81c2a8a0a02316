//! Query-condition collaborator

use crate::value::Value;

/// Normalizes user-supplied search conditions into the host's query format.
///
/// Used by the `condition` filter; `None` means the input is not a
/// condition at all.
pub trait ConditionNormalizer: Send + Sync {
    /// Normalize `value`.
    fn normalize(&self, value: &Value) -> Option<Value>;
}

impl<F> ConditionNormalizer for F
where
    F: Fn(&Value) -> Option<Value> + Send + Sync,
{
    fn normalize(&self, value: &Value) -> Option<Value> {
        self(value)
    }
}
