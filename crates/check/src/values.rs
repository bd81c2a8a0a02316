//! Lazily filtered value container

use std::sync::Arc;

use crate::check::{Checker, Outcome};
use crate::rule::Rule;
use crate::value::Value;

/// Container holding raw input and handing out members filtered on demand.
///
/// A handler that receives a `Values` does not need to validate the whole
/// input up front; it asks for each member with the rule it cares about:
///
/// ```rust
/// use sift_check::{Checker, Rule, Value, Values};
///
/// let input = Values::new(serde_json::json!({"page": "3", "q": " rust "}));
/// let checker = Checker::new();
///
/// let page = input.get("page", &Rule::int().default(1), &checker);
/// assert_eq!(page.value, Value::Int(3));
/// ```
///
/// Clones share the underlying value.
#[derive(Debug, Clone, Default)]
pub struct Values {
    raw: Arc<Value>,
}

impl Values {
    /// Wrap a raw value.
    pub fn new(raw: impl Into<Value>) -> Self {
        Self {
            raw: Arc::new(raw.into()),
        }
    }

    /// The unfiltered value.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The unfiltered value, cloning only when shared.
    pub fn into_raw(self) -> Value {
        Arc::unwrap_or_clone(self.raw)
    }

    /// Whether the wrapped value has a member at `key`.
    pub fn has(&self, key: &str) -> bool {
        self.raw.get(key).is_some()
    }

    /// Member keys of the wrapped list or map.
    pub fn keys(&self) -> Vec<String> {
        match &*self.raw {
            Value::Map(m) => m.keys().cloned().collect(),
            Value::List(l) => (0..l.len()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    /// Filter the member at `key`; a missing member is filtered as null.
    pub fn get(&self, key: &str, rule: &Rule, checker: &Checker) -> Outcome {
        let member = self.raw.get(key).cloned().unwrap_or_default();
        checker.check(member, rule)
    }

    /// Filter the whole wrapped value.
    pub fn filter(&self, rule: &Rule, checker: &Checker) -> Outcome {
        checker.check(self.raw().clone(), rule)
    }

    pub(crate) fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.raw, &other.raw)
    }
}

impl From<serde_json::Value> for Values {
    fn from(json: serde_json::Value) -> Self {
        Self::new(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn members_are_filtered_individually() {
        let checker = Checker::new();
        let values = Values::new(json!({"age": "42", "name": "  Ann "}));

        let age = values.get("age", &Rule::int(), &checker);
        assert!(age.is_ok());
        assert_eq!(age.value, Value::Int(42));

        let name = values.get("name", &Rule::string().trim(), &checker);
        assert_eq!(name.value, Value::from("Ann"));
        assert_eq!(name.error.unwrap().code(), Some("trim"));
    }

    #[test]
    fn missing_member_is_null() {
        let checker = Checker::new();
        let values = Values::new(json!({}));
        let out = values.get("limit", &Rule::int().default(10), &checker);
        assert!(out.is_ok());
        assert_eq!(out.value, Value::Int(10));
    }

    #[test]
    fn list_keys_are_indices() {
        let values = Values::new(json!(["a", "b"]));
        assert_eq!(values.keys(), vec!["0", "1"]);
        assert!(values.has("1"));
        assert!(!values.has("2"));
    }

    #[test]
    fn clones_share_identity() {
        let a = Values::new(json!([1]));
        let b = a.clone();
        assert!(a.same(&b));
        assert!(!a.same(&Values::new(json!([1]))));
    }
}
