//! Comparison filters: `eq`, `not`, `in`, `not_in`

use crate::check::Outcome;
use crate::compare::{loose_contains, loose_eq, strict_eq};
use crate::error::FilterError;
use crate::value::Value;

fn equal(a: &Value, b: &Value, strict: bool) -> bool {
    if strict { strict_eq(a, b) } else { loose_eq(a, b) }
}

pub(crate) fn eq(value: Value, target: &Value, strict: bool) -> Outcome {
    if equal(&value, target, strict) {
        Outcome::ok(value)
    } else {
        Outcome::fail(
            target.clone(),
            FilterError::new("eq", "Must equal %s").with_arg(target),
        )
    }
}

pub(crate) fn not(value: Value, target: &Value, strict: bool) -> Outcome {
    if equal(&value, target, strict) {
        Outcome::fail(
            Value::Null,
            FilterError::new("not", "Must not equal %s").with_arg(target),
        )
    } else {
        Outcome::ok(value)
    }
}

pub(crate) fn one_of(value: Value, allowed: &[Value]) -> Outcome {
    if loose_contains(allowed, &value) {
        Outcome::ok(value)
    } else {
        Outcome::fail(Value::Null, FilterError::new("in", "Value is not in the allowed list"))
    }
}

pub(crate) fn none_of(value: Value, rejected: &[Value]) -> Outcome {
    if loose_contains(rejected, &value) {
        Outcome::fail(Value::Null, FilterError::new("not_in", "Value is in the forbidden list"))
    } else {
        Outcome::ok(value)
    }
}
