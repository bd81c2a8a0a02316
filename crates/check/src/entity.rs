//! Entity store collaborator
//!
//! The `entity` filter turns references found in input (URIs, ids, JSON
//! descriptors) into persisted entities. Storage lives in the host
//! application behind [`EntityStore`].

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Persisted entity resolved by an [`EntityStore`].
pub trait Entity: fmt::Debug + Send + Sync {
    /// Canonical URI.
    fn uri(&self) -> &str;

    /// Whether the entity satisfies a (normalized) condition.
    fn matches_condition(&self, condition: &Value) -> bool;

    /// Whether the current caller may read the entity.
    fn is_readable(&self) -> bool;
}

/// Reference to an entity as found in input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    /// Entity URI, e.g. `/library/books/12`
    Uri(String),
    /// Store identifier
    Id(String),
    /// New entity derived from a prototype, optionally attached to a parent
    Derive {
        /// Prototype URI
        proto: String,
        /// Parent URI
        parent: Option<String>,
    },
}

impl EntityRef {
    /// Decode a reference.
    ///
    /// Strings beginning with `{` are decoded as JSON first. Plain strings
    /// are URIs, integers are ids, and maps are descriptors checked for
    /// `id`, then `uri`, then `proto` (with optional `parent`).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s.starts_with('{') => {
                let json: serde_json::Value = serde_json::from_str(s).ok()?;
                Self::from_descriptor(&Value::from(json))
            }
            Value::String(s) => Some(Self::Uri(s.clone())),
            Value::Int(i) => Some(Self::Id(i.to_string())),
            Value::Map(_) => Self::from_descriptor(value),
            _ => None,
        }
    }

    fn from_descriptor(value: &Value) -> Option<Self> {
        let field = |key: &str| value.get(key).and_then(Value::string_form);
        if let Some(id) = field("id") {
            Some(Self::Id(id))
        } else if let Some(uri) = field("uri") {
            Some(Self::Uri(uri))
        } else {
            field("proto").map(|proto| Self::Derive {
                proto,
                parent: field("parent"),
            })
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(uri) => f.write_str(uri),
            Self::Id(id) => write!(f, "#{id}"),
            Self::Derive { proto, parent: Some(parent) } => write!(f, "{parent}<-{proto}"),
            Self::Derive { proto, parent: None } => write!(f, "<-{proto}"),
        }
    }
}

/// Host-side entity storage.
///
/// `resolve` may block on I/O. A failed lookup is reported as `None` and
/// becomes an `entity` validation error.
pub trait EntityStore: Send + Sync {
    /// Look up (or, for [`EntityRef::Derive`], create) an entity.
    fn resolve(&self, reference: &EntityRef) -> Option<Arc<dyn Entity>>;
}
