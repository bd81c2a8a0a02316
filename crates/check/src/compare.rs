//! Loose and strict equality
//!
//! `eq`, `not`, `in` and `not_in` compare values from untyped input against
//! typed rule arguments, so the cross-type rules are fixed here:
//!
//! - **strict**: same variant and equal payload. Lists and maps compare in
//!   order. Host objects, entities and `Values` containers compare by
//!   identity.
//! - **loose**: strict, plus
//!   - ints and floats compare numerically;
//!   - a number equals a string holding the same numeric value, and a
//!     non-numeric string equal to the number's string form;
//!   - two numeric strings compare numerically;
//!   - a bool equals any value with the same truthiness;
//!   - null equals `""`, `false`, `0`, `0.0` and empty containers;
//!   - lists and maps are equal when their keys match and members are
//!     loosely equal;
//!   - a `Values` container compares through the value it wraps.

use std::sync::Arc;

use crate::value::{Number, Value};

/// Strict equality.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| strict_eq(a, b))
        }
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y)
                    .all(|((ka, va), (kb, vb))| ka == kb && strict_eq(va, vb))
        }
        (Value::Object(x), Value::Object(y)) => std::ptr::addr_eq(Arc::as_ptr(x), Arc::as_ptr(y)),
        (Value::Entity(x), Value::Entity(y)) => std::ptr::addr_eq(Arc::as_ptr(x), Arc::as_ptr(y)),
        (Value::Values(x), Value::Values(y)) => x.same(y),
        _ => false,
    }
}

/// Loose equality.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    if strict_eq(a, b) {
        return true;
    }
    match (a, b) {
        (Value::Values(x), other) | (other, Value::Values(x)) => loose_eq(x.raw(), other),
        (Value::Null, other) | (other, Value::Null) => is_blank(other),
        (Value::Bool(x), other) | (other, Value::Bool(x)) => *x == other.is_truthy(),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            numbers_eq(a.as_number(), b.as_number())
        }
        (n @ (Value::Int(_) | Value::Float(_)), Value::String(s))
        | (Value::String(s), n @ (Value::Int(_) | Value::Float(_))) => match Number::parse(s) {
            Some(parsed) => numbers_eq(n.as_number(), Some(parsed)),
            None => n.string_form().as_deref() == Some(s.as_str()),
        },
        (Value::String(x), Value::String(y)) => match (Number::parse(x), Number::parse(y)) {
            (Some(nx), Some(ny)) => numbers_eq(Some(nx), Some(ny)),
            _ => false,
        },
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| loose_eq(a, b))
        }
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, va)| y.get(k).is_some_and(|vb| loose_eq(va, vb)))
        }
        _ => false,
    }
}

/// Loose membership.
pub fn loose_contains(list: &[Value], value: &Value) -> bool {
    list.iter().any(|candidate| loose_eq(value, candidate))
}

fn numbers_eq(a: Option<Number>, b: Option<Number>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b) == Some(std::cmp::Ordering::Equal),
        _ => false,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Int(i) => *i == 0,
        Value::Float(f) => *f == 0.0,
        Value::String(s) => s.is_empty(),
        Value::List(l) => l.is_empty(),
        Value::Map(m) => m.is_empty(),
        _ => false,
    }
}
