//! The untyped value model filtered by rules
//!
//! [`Value`] is deliberately loose: request input arrives as strings, numbers
//! and nested containers of unknown shape, and filters coerce it into the
//! shape a rule describes. Conversions here follow the conventions of
//! dynamically typed web stacks (`"0"` is falsy, `true` prints as `"1"`,
//! integral floats print without a fraction).

use std::fmt;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use regex::Regex;

use crate::entity::Entity;
use crate::values::Values;

/// Complete numeric literal with optional surrounding whitespace.
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?\s*$").unwrap()
});

/// Numeric prefix of a string, used by lossy conversions.
static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
});

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

// ============================================================================
// HOST OBJECTS
// ============================================================================

/// Opaque object owned by the host application.
///
/// The engine never looks inside a host object; the `object` filter only
/// asks whether it belongs to a named class.
pub trait HostObject: fmt::Debug + Send + Sync {
    /// Class name reported in error messages and JSON output.
    fn class_name(&self) -> &str;

    /// Whether this object is an instance of `class` (or one of its parents).
    fn is_instance_of(&self, class: &str) -> bool {
        self.class_name() == class
    }
}

// ============================================================================
// NUMBER
// ============================================================================

/// Numeric bound or numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
}

impl Number {
    /// Value as `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// Value as a length bound for strings and containers.
    ///
    /// Negative bounds act as zero.
    pub fn as_len(self) -> usize {
        match self {
            Self::Int(i) => usize::try_from(i).unwrap_or(0),
            Self::Float(f) if f > 0.0 => f as usize,
            Self::Float(_) => 0,
        }
    }

    /// `self + delta`, staying integral where possible.
    pub fn offset(self, delta: i64) -> Self {
        match self {
            Self::Int(i) => match i.checked_add(delta) {
                Some(v) => Self::Int(v),
                None => Self::Float(i as f64 + delta as f64),
            },
            Self::Float(f) => Self::Float(f + delta as f64),
        }
    }

    /// Parse a numeric literal (`"12"`, `" -1.5e3 "`).
    pub fn parse(s: &str) -> Option<Self> {
        if !NUMERIC.is_match(s) {
            return None;
        }
        let s = s.trim();
        if INTEGER.is_match(s)
            && let Ok(i) = s.parse::<i64>()
        {
            return Some(Self::Int(i));
        }
        s.parse::<f64>().ok().map(Self::Float)
    }

    pub(crate) fn compare(self, other: Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => f.write_str(&float_string(v)),
        }
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Number {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<usize> for Number {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or(Self::Float(v as f64), Self::Int)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => Self::Int(i),
            Number::Float(f) => Self::Float(f),
        }
    }
}

fn float_string(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

// ============================================================================
// VALUE
// ============================================================================

/// Untyped input value.
///
/// Equality via `==` is strict: same variant, equal payload, host objects
/// and entities by identity. Loose equality lives in [`crate::compare`].
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent or null
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list; keys are the decimal indices
    List(Vec<Value>),
    /// Insertion-ordered map
    Map(IndexMap<String, Value>),
    /// Opaque host object
    Object(Arc<dyn HostObject>),
    /// Resolved persisted entity
    Entity(Arc<dyn Entity>),
    /// Lazily filtered container
    Values(Values),
}

impl Value {
    /// Short type name for messages and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
            Self::Entity(_) => "entity",
            Self::Values(_) => "values",
        }
    }

    /// Whether the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Bool, int, float or string. Null is not a scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::String(_)
        )
    }

    /// Int or float.
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// List or map.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    /// String payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Bool payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Int payload.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric payload.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// List payload.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Map payload.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Member lookup in a list (by decimal index) or map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(m) => m.get(key),
            Self::List(l) => key.parse::<usize>().ok().and_then(|i| l.get(i)),
            Self::Values(v) => v.raw().get(key),
            _ => None,
        }
    }

    /// Element count of a list or map.
    pub fn count(&self) -> Option<usize> {
        match self {
            Self::List(l) => Some(l.len()),
            Self::Map(m) => Some(m.len()),
            _ => None,
        }
    }

    /// Truthiness: null, `false`, `0`, `0.0`, `""`, `"0"` and empty
    /// containers are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !(s.is_empty() || s == "0"),
            Self::List(l) => !l.is_empty(),
            Self::Map(m) => !m.is_empty(),
            Self::Object(_) | Self::Entity(_) | Self::Values(_) => true,
        }
    }

    /// String form of a scalar: `true` is `"1"`, `false` is `""`,
    /// integral floats have no fraction.
    pub fn string_form(&self) -> Option<String> {
        match self {
            Self::Bool(true) => Some("1".to_string()),
            Self::Bool(false) => Some(String::new()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(float_string(*f)),
            Self::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Number held by a number or a numeric string.
    pub fn numeric(&self) -> Option<Number> {
        match self {
            Self::Int(_) | Self::Float(_) => self.as_number(),
            Self::String(s) => Number::parse(s),
            _ => None,
        }
    }

    /// Best-effort integer conversion.
    ///
    /// Strings use their leading numeric prefix (`"12abc"` is 12), floats
    /// truncate, containers are 0 when empty and 1 otherwise, objects are 1.
    pub fn to_int_lossy(&self) -> i64 {
        match self {
            Self::Null => 0,
            Self::Bool(b) => i64::from(*b),
            Self::Int(i) => *i,
            Self::Float(f) => *f as i64,
            Self::String(s) => match numeric_prefix(s) {
                Some(Number::Int(i)) => i,
                Some(Number::Float(f)) => f as i64,
                None => 0,
            },
            Self::List(_) | Self::Map(_) => i64::from(self.is_truthy()),
            Self::Object(_) | Self::Entity(_) | Self::Values(_) => 1,
        }
    }

    /// Best-effort float conversion, same rules as [`Self::to_int_lossy`].
    pub fn to_float_lossy(&self) -> f64 {
        match self {
            Self::Float(f) => *f,
            Self::String(s) => numeric_prefix(s).map_or(0.0, Number::as_f64),
            other => other.to_int_lossy() as f64,
        }
    }

    /// JSON rendering for transport and logging.
    ///
    /// Host objects render as their class name, entities as their URI,
    /// non-finite floats as null.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::String(s) => Json::String(s.clone()),
            Self::List(l) => Json::Array(l.iter().map(Self::to_json).collect()),
            Self::Map(m) => Json::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Object(o) => Json::String(o.class_name().to_string()),
            Self::Entity(e) => Json::String(e.uri().to_string()),
            Self::Values(v) => v.raw().to_json(),
        }
    }
}

fn numeric_prefix(s: &str) -> Option<Number> {
    let m = NUMERIC_PREFIX.find(s.trim_start())?;
    Number::parse(m.as_str())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::compare::strict_eq(self, other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.string_form() {
            Some(s) => f.write_str(&s),
            None => write!(f, "{}", self.to_json()),
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Number::from(v).into()
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Self::Map(v)
    }
}

impl From<Values> for Value {
    fn from(v: Values) -> Self {
        Self::Values(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            Json::String(s) => Self::String(s),
            Json::Array(a) => Self::List(a.into_iter().map(Self::from).collect()),
            Json::Object(o) => Self::Map(o.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}
