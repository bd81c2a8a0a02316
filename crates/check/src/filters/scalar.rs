//! Type coercions: `bool`, `int`, `double`, `string`, `scalar`, `null`

use std::sync::LazyLock;

use regex::Regex;

use crate::check::Outcome;
use crate::error::FilterError;
use crate::value::Value;

static INT_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+$").unwrap());

pub(crate) fn bool(value: Value) -> Outcome {
    match value {
        Value::Bool(_) => Outcome::ok(value),
        Value::String(s) => {
            let s = s.to_lowercase();
            Outcome::ok(!matches!(s.as_str(), "false" | "" | "0"))
        }
        Value::Int(_) | Value::Float(_) => Outcome::ok(value.is_truthy()),
        other => Outcome::fail(
            other.is_truthy(),
            FilterError::new("bool", "Must be a boolean (true/false, 1/0)"),
        ),
    }
}

pub(crate) fn int(value: Value, bound: i64) -> Outcome {
    let value = match value {
        Value::String(s) => Value::String(s.replace(' ', "")),
        other => other,
    };

    if !matches!(value, Value::Bool(_))
        && let Some(literal) = value.string_form()
        && INT_LITERAL.is_match(&literal)
    {
        let coerced = match literal.parse::<i64>() {
            Ok(i) if -bound < i && i < bound => Value::Int(i),
            _ => Value::Float(literal.parse::<f64>().unwrap_or_default()),
        };
        return Outcome::ok(coerced);
    }

    Outcome::fail(value.to_int_lossy(), FilterError::new("int", "Invalid integer"))
}

pub(crate) fn double(value: Value) -> Outcome {
    let value = match value {
        Value::String(s) => Value::String(s.replace(' ', "").replace(',', ".")),
        other => other,
    };
    match value.numeric() {
        Some(n) => Outcome::ok(n.as_f64()),
        None => Outcome::fail(value.to_float_lossy(), FilterError::new("double", "Invalid number")),
    }
}

pub(crate) fn string(value: Value) -> Outcome {
    match value.string_form() {
        Some(s) => Outcome::ok(s),
        None => Outcome::fail("", FilterError::new("string", "Must be a string")),
    }
}

pub(crate) fn scalar(value: Value) -> Outcome {
    if value.is_scalar() {
        Outcome::ok(value)
    } else {
        Outcome::fail(0, FilterError::new("scalar", "Must be a string, number or boolean"))
    }
}

pub(crate) fn null(value: Value) -> Outcome {
    if value.is_null() {
        Outcome::ok(Value::Null)
    } else {
        Outcome::fail(Value::Null, FilterError::new("null", "Must be null"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const BOUND: i64 = i32::MAX as i64;

    #[rstest]
    #[case(Value::Bool(false), false)]
    #[case(Value::from("FALSE"), false)]
    #[case(Value::from("0"), false)]
    #[case(Value::from(""), false)]
    #[case(Value::from("no"), true)]
    #[case(Value::Int(2), true)]
    #[case(Value::Float(0.0), false)]
    fn bool_accepts_scalars(#[case] input: Value, #[case] expected: bool) {
        assert_eq!(bool(input), Outcome::ok(expected));
    }

    #[test]
    fn bool_rejects_containers() {
        let out = bool(Value::from(json!([1])));
        assert_eq!(out.value, Value::Bool(true));
        assert_eq!(out.code(), Some("bool"));
        assert_eq!(bool(Value::Null).code(), Some("bool"));
    }

    #[rstest]
    #[case(Value::from("42"), Value::Int(42))]
    #[case(Value::from(" 1 000 "), Value::Int(1000))]
    #[case(Value::from("+7"), Value::Int(7))]
    #[case(Value::from("-7"), Value::Int(-7))]
    #[case(Value::Float(3.0), Value::Int(3))]
    #[case(Value::from("3000000000"), Value::Float(3e9))]
    #[case(Value::from("2147483647"), Value::Float(2_147_483_647.0))]
    fn int_accepts_literals(#[case] input: Value, #[case] expected: Value) {
        assert_eq!(int(input, BOUND), Outcome::ok(expected));
    }

    #[rstest]
    #[case(Value::from("12abc"), 12)]
    #[case(Value::Float(2.5), 2)]
    #[case(Value::Bool(true), 1)]
    #[case(Value::Null, 0)]
    #[case(Value::from(json!({"a": 1})), 1)]
    #[case(Value::from(json!([])), 0)]
    fn int_rejects_and_coerces(#[case] input: Value, #[case] coerced: i64) {
        let out = int(input, BOUND);
        assert_eq!(out.code(), Some("int"));
        assert_eq!(out.value, Value::Int(coerced));
    }

    #[test]
    fn int_bound_is_configurable() {
        assert_eq!(int(Value::from("150"), 100), Outcome::ok(150.0));
        assert_eq!(int(Value::from("99"), 100), Outcome::ok(99));
    }

    #[rstest]
    #[case(Value::from("1,5"), 1.5)]
    #[case(Value::from("1 000.25"), 1000.25)]
    #[case(Value::Int(3), 3.0)]
    #[case(Value::from("1e2"), 100.0)]
    fn double_accepts_numbers(#[case] input: Value, #[case] expected: f64) {
        assert_eq!(double(input), Outcome::ok(expected));
    }

    #[test]
    fn double_rejects_text() {
        let out = double(Value::from("2.5kg"));
        assert_eq!(out.code(), Some("double"));
        assert_eq!(out.value, Value::Float(2.5));
        assert_eq!(double(Value::Bool(true)).code(), Some("double"));
    }

    #[test]
    fn string_and_scalar() {
        assert_eq!(string(Value::Bool(true)), Outcome::ok("1"));
        assert_eq!(string(Value::Float(1.0)), Outcome::ok("1"));
        let out = string(Value::Null);
        assert_eq!(out.value, Value::from(""));
        assert_eq!(out.code(), Some("string"));

        assert_eq!(scalar(Value::from("x")), Outcome::ok("x"));
        let out = scalar(Value::from(json!([])));
        assert_eq!(out.value, Value::Int(0));
        assert_eq!(out.code(), Some("scalar"));
    }

    #[test]
    fn null_always_returns_null() {
        assert_eq!(null(Value::Null), Outcome::ok(Value::Null));
        let out = null(Value::from(""));
        assert_eq!(out.value, Value::Null);
        assert_eq!(out.code(), Some("null"));
    }
}
