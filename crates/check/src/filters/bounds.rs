//! Bound filters: `max`, `min`, `less`, `more`
//!
//! Numbers are compared by value, strings by character count and lists or
//! maps by member count. `max` and `min` are inclusive, `less` and `more`
//! exclusive. Other values pass untouched.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::check::Outcome;
use crate::error::FilterError;
use crate::value::{Number, Value};

enum Size {
    Number(Number),
    Chars(usize),
    Count(usize),
    Unmeasured,
}

fn size(value: &Value) -> Size {
    match value {
        Value::Int(_) | Value::Float(_) => {
            value.as_number().map_or(Size::Unmeasured, Size::Number)
        }
        Value::String(s) => Size::Chars(s.chars().count()),
        Value::List(l) => Size::Count(l.len()),
        Value::Map(m) => Size::Count(m.len()),
        _ => Size::Unmeasured,
    }
}

fn cmp(a: Number, b: Number) -> Option<Ordering> {
    a.compare(b)
}

fn len_cmp(len: usize, bound: Number) -> Option<Ordering> {
    (len as f64).partial_cmp(&bound.as_f64())
}

/// First `n` characters or members.
fn truncate(value: Value, n: usize) -> Value {
    match value {
        Value::String(s) => Value::String(s.chars().take(n).collect()),
        Value::List(mut l) => {
            l.truncate(n);
            Value::List(l)
        }
        Value::Map(m) => Value::Map(m.into_iter().take(n).collect::<IndexMap<_, _>>()),
        other => other,
    }
}

/// Truncate to `n`; an error only when something was actually cut.
fn shortened(value: Value, n: usize, error: impl FnOnce() -> FilterError) -> Outcome {
    let cut = truncate(value.clone(), n);
    if cut == value {
        Outcome::ok(value)
    } else {
        Outcome::fail(cut, error())
    }
}

pub(crate) fn max(value: Value, n: Number) -> Outcome {
    let over = |ord: Option<Ordering>| ord == Some(Ordering::Greater);
    let message = match size(&value) {
        Size::Number(v) if over(cmp(v, n)) => "Must be at most %s",
        Size::Chars(len) if over(len_cmp(len, n)) => "Must be at most %s characters",
        Size::Count(len) if over(len_cmp(len, n)) => "Must have at most %s elements",
        _ => return Outcome::ok(value),
    };
    if value.is_number() {
        return Outcome::fail(n, FilterError::new("max", message).with_arg(n));
    }
    shortened(value, n.as_len(), || FilterError::new("max", message).with_arg(n))
}

pub(crate) fn min(value: Value, n: Number) -> Outcome {
    let short = |ord: Option<Ordering>| ord == Some(Ordering::Less);
    let (message, under) = match size(&value) {
        Size::Number(v) => ("Must be at least %s", short(cmp(v, n))),
        Size::Chars(len) => ("Must be at least %s characters", short(len_cmp(len, n))),
        Size::Count(len) => ("Must have at least %s elements", short(len_cmp(len, n))),
        Size::Unmeasured => return Outcome::ok(value),
    };
    if !under {
        return Outcome::ok(value);
    }
    let clamped = if value.is_number() { n.into() } else { value };
    Outcome::fail(clamped, FilterError::new("min", message).with_arg(n))
}

pub(crate) fn less(value: Value, n: Number) -> Outcome {
    let below = |ord: Option<Ordering>| ord == Some(Ordering::Less);
    let message = match size(&value) {
        Size::Number(v) if !below(cmp(v, n)) => "Must be less than %s",
        Size::Chars(len) if !below(len_cmp(len, n)) => "Must be shorter than %s characters",
        Size::Count(len) if !below(len_cmp(len, n)) => "Must have fewer than %s elements",
        _ => return Outcome::ok(value),
    };
    let error = || FilterError::new("less", message).with_arg(n);
    if value.is_number() {
        return Outcome::fail(n.offset(-1), error());
    }
    shortened(value, n.offset(-1).as_len(), error)
}

pub(crate) fn more(value: Value, n: Number) -> Outcome {
    let above = |ord: Option<Ordering>| ord == Some(Ordering::Greater);
    match size(&value) {
        Size::Number(v) if !above(cmp(v, n)) => Outcome::fail(
            n.offset(1),
            FilterError::new("more", "Must be greater than %s").with_arg(n),
        ),
        Size::Chars(len) if !above(len_cmp(len, n)) => {
            let error = if n.as_f64() == 0.0 {
                FilterError::new("more", "Must be filled")
            } else {
                FilterError::new("more", "Must be longer than %s characters").with_arg(n)
            };
            Outcome::fail(value, error)
        }
        Size::Count(len) if !above(len_cmp(len, n)) => Outcome::fail(
            value,
            FilterError::new("more", "Must have more than %s elements").with_arg(n),
        ),
        _ => Outcome::ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn n(i: i64) -> Number {
        Number::Int(i)
    }

    #[rstest]
    #[case(Value::Int(10), Value::Int(10), None)]
    #[case(Value::Int(11), Value::Int(10), Some("max"))]
    #[case(Value::Float(10.5), Value::Int(10), Some("max"))]
    #[case(Value::from("привет мир"), Value::from("привет мир"), None)]
    #[case(Value::from("привет, мир"), Value::from("привет, ми"), Some("max"))]
    #[case(
        Value::from(json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11])),
        Value::from(json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10])),
        Some("max")
    )]
    #[case(Value::Null, Value::Null, None)]
    fn max_clamps(
        #[case] input: Value,
        #[case] expected: Value,
        #[case] code: Option<&str>,
    ) {
        let out = max(input, n(10));
        assert_eq!(out.value, expected);
        assert_eq!(out.code(), code);
    }

    #[test]
    fn max_message_names_the_bound() {
        let out = max(Value::from("abcdef"), n(3));
        assert_eq!(out.error.unwrap().message().as_deref(), Some("Must be at most 3 characters"));
    }

    #[test]
    fn max_truncates_maps_in_order() {
        let input: Value = [("a", Value::Int(1)), ("b", Value::Int(2)), ("c", Value::Int(3))]
            .into_iter()
            .collect();
        let out = max(input, n(2));
        let keys: Vec<_> = out.value.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[rstest]
    #[case(Value::Int(3), Value::Int(5), Some("min"))]
    #[case(Value::Int(5), Value::Int(5), None)]
    #[case(Value::from("abc"), Value::from("abc"), Some("min"))]
    #[case(Value::from("abcde"), Value::from("abcde"), None)]
    #[case(Value::from(json!([1])), Value::from(json!([1])), Some("min"))]
    fn min_clamps_numbers_only(
        #[case] input: Value,
        #[case] expected: Value,
        #[case] code: Option<&str>,
    ) {
        let out = min(input, n(5));
        assert_eq!(out.value, expected);
        assert_eq!(out.code(), code);
    }

    #[rstest]
    #[case(Value::Int(10), Value::Int(9), Some("less"))]
    #[case(Value::Int(9), Value::Int(9), None)]
    #[case(Value::from("abcdefghij"), Value::from("abcdefghi"), Some("less"))]
    #[case(
        Value::from(json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10])),
        Value::from(json!([1, 2, 3, 4, 5, 6, 7, 8, 9])),
        Some("less")
    )]
    fn less_is_exclusive(
        #[case] input: Value,
        #[case] expected: Value,
        #[case] code: Option<&str>,
    ) {
        let out = less(input, n(10));
        assert_eq!(out.value, expected);
        assert_eq!(out.code(), code);
    }

    #[rstest]
    #[case(Value::from("abc"), 0, Value::from(""), Some("less"))]
    #[case(Value::from(""), 0, Value::from(""), None)]
    #[case(Value::from(""), -3, Value::from(""), None)]
    #[case(Value::from(json!([1])), 0, Value::from(json!([])), Some("less"))]
    #[case(Value::from(json!([])), 0, Value::from(json!([])), None)]
    fn less_non_positive_bound_errors_only_when_cut(
        #[case] input: Value,
        #[case] bound: i64,
        #[case] expected: Value,
        #[case] code: Option<&str>,
    ) {
        let out = less(input, n(bound));
        assert_eq!(out.value, expected);
        assert_eq!(out.code(), code);
    }

    #[rstest]
    #[case(Value::from("abc"), Value::from(""), Some("max"))]
    #[case(Value::from(""), Value::from(""), None)]
    #[case(Value::from(json!([1, 2])), Value::from(json!([])), Some("max"))]
    #[case(Value::from(json!({})), Value::from(json!({})), None)]
    fn max_negative_bound_errors_only_when_cut(
        #[case] input: Value,
        #[case] expected: Value,
        #[case] code: Option<&str>,
    ) {
        let out = max(input, n(-1));
        assert_eq!(out.value, expected);
        assert_eq!(out.code(), code);
    }

    #[rstest]
    #[case(Value::Int(5), Value::Int(6), Some("more"))]
    #[case(Value::Int(6), Value::Int(6), None)]
    #[case(Value::from("abcde"), Value::from("abcde"), Some("more"))]
    #[case(
        Value::from(json!([1, 2, 3, 4, 5])),
        Value::from(json!([1, 2, 3, 4, 5])),
        Some("more")
    )]
    fn more_is_exclusive(
        #[case] input: Value,
        #[case] expected: Value,
        #[case] code: Option<&str>,
    ) {
        let out = more(input, n(5));
        assert_eq!(out.value, expected);
        assert_eq!(out.code(), code);
    }

    #[test]
    fn more_zero_on_strings_asks_to_fill() {
        let out = more(Value::from(""), n(0));
        assert_eq!(out.error.unwrap().message().as_deref(), Some("Must be filled"));
        assert!(more(Value::from("x"), n(0)).is_ok());
    }

    #[test]
    fn float_bounds() {
        let out = max(Value::Int(3), Number::Float(2.5));
        assert_eq!(out.value, Value::Float(2.5));
        assert!(min(Value::from("ab"), Number::Float(2.5)).error.is_some());
    }
}
