//! Structural filters: `arrays` and `any`
//!
//! Both call back into the interpreter. `arrays` descends one level per
//! container and is bounded by [`CheckConfig::max_depth`]; `any` retries the
//! same value at the same depth.
//!
//! [`CheckConfig::max_depth`]: crate::CheckConfig::max_depth

use indexmap::IndexMap;
use tracing::{trace, warn};

use crate::check::{Checker, Outcome};
use crate::error::FilterError;
use crate::filter::ArraysRule;
use crate::rule::Rule;
use crate::value::Value;

const INVALID_MEMBERS: &str = "Invalid array structure or member values";

fn record(error: &mut Option<FilterError>, key: &str, sub_error: FilterError) {
    error
        .get_or_insert_with(|| FilterError::new("arrays", INVALID_MEMBERS))
        .at(key)
        .add(sub_error);
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::List(_) | Value::Map(_) | Value::Values(_))
}

pub(crate) fn arrays(
    checker: &Checker,
    value: Value,
    arrays: &ArraysRule,
    rule: &Rule,
    depth: usize,
) -> Outcome {
    let value = match value {
        Value::Values(values) => values.into_raw(),
        other => other,
    };
    let (entries, list): (Vec<(String, Value)>, bool) = match value {
        Value::Map(map) => (map.into_iter().collect(), false),
        Value::List(list) => (
            list.into_iter()
                .enumerate()
                .map(|(index, member)| (index.to_string(), member))
                .collect(),
            true,
        ),
        _ => {
            return Outcome::fail(
                Value::Map(IndexMap::new()),
                FilterError::new("arrays", "Must be an array"),
            );
        }
    };

    let max_depth = checker.config().max_depth;
    if depth >= max_depth {
        warn!(depth, max_depth, "container nesting limit reached");
        return Outcome::fail(
            Value::Map(IndexMap::new()),
            FilterError::new("arrays", "Nesting is too deep"),
        );
    }

    let mut pending: IndexMap<&str, &Rule> =
        arrays.sub.iter().map(|(key, sub)| (key.as_str(), sub)).collect();
    let mut result = IndexMap::with_capacity(entries.len());
    let mut error = None;

    for (key, member) in entries {
        let mut sub_error = None;

        if let Some(sub) = pending.shift_remove(key.as_str()) {
            if sub.is_forbidden() {
                sub_error = Some(
                    FilterError::new("forbidden", "Element \"%s\" must be absent").with_arg(&key),
                );
            } else {
                let out = checker.run(member, sub, depth + 1);
                result.insert(key.clone(), out.value);
                sub_error = out.error;
            }
        } else {
            let retry = (arrays.tree && is_container(&member)).then(|| member.clone());

            if let Some(default) = &arrays.default {
                let out = checker.run(member, default, depth + 1);
                result.insert(key.clone(), out.value);
                sub_error = out.error;
            }

            if let Some(nested) = retry
                && (arrays.default.is_none() || sub_error.is_some())
            {
                trace!(key = %key, depth, "parent rule applied to nested container");
                let out = checker.run(nested, rule, depth + 1);
                result.insert(key.clone(), out.value);
                sub_error = out.error;
            }
        }

        if let Some(sub_error) = sub_error {
            record(&mut error, &key, sub_error);
        }
    }

    for (key, sub) in pending {
        if !sub.is_required() || sub.is_forbidden() {
            continue;
        }
        let out = checker.run(Value::Null, sub, depth + 1);
        result.insert(key.to_string(), out.value);
        if out.error.is_some() {
            record(
                &mut error,
                key,
                FilterError::new("required", "Required element has no default value"),
            );
        }
    }

    let value = if list {
        Value::List(result.into_values().collect())
    } else {
        Value::Map(result)
    };
    match error {
        Some(error) if error.exists() => Outcome::fail(value, error),
        _ => Outcome::ok(value),
    }
}

pub(crate) fn any(checker: &Checker, value: Value, alternatives: &[Rule], depth: usize) -> Outcome {
    let mut last = None;
    for (index, alternative) in alternatives.iter().enumerate() {
        let out = checker.run(value.clone(), alternative, depth);
        if out.is_ok() {
            trace!(alternative = index, "alternative accepted value");
            return out;
        }
        last = Some(out);
    }
    last.unwrap_or_else(|| Outcome::ok(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use crate::values::Values;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn check(input: serde_json::Value, rule: &Rule) -> Outcome {
        Checker::new().check(input, rule)
    }

    #[test]
    fn members_filtered_by_key() {
        let rule = Rule::arrays([("name", Rule::string().max(10)), ("age", Rule::int())]);
        let out = check(json!({"name": "Ann", "age": "31"}), &rule);
        assert_eq!(out.error, None);
        assert_eq!(out.value, Value::from(json!({"name": "Ann", "age": 31})));
    }

    #[test]
    fn member_errors_are_keyed() {
        let rule = Rule::arrays([("age", Rule::int()), ("email", Rule::string().email())]);
        let out = check(json!({"age": "x", "email": "a@b.co"}), &rule);

        let error = out.error.unwrap();
        assert_eq!(error.code(), Some("arrays"));
        assert_eq!(error.message().as_deref(), Some(INVALID_MEMBERS));
        assert_eq!(error.child("age").and_then(FilterError::code), Some("int"));
        assert!(error.child("email").is_none());
        assert_eq!(out.value.get("age"), Some(&Value::Int(0)));
    }

    #[test]
    fn unmatched_keys_are_dropped() {
        let rule = Rule::arrays([("keep", Rule::int())]);
        let out = check(json!({"keep": 1, "drop": 2}), &rule);
        assert_eq!(out.value, Value::from(json!({"keep": 1})));
    }

    #[test]
    fn list_input_stays_a_list() {
        let rule = Rule::arrays_of(Rule::int());
        let out = check(json!(["1", "x", 3]), &rule);
        assert_eq!(out.value, Value::from(json!([1, 0, 3])));
        assert_eq!(out.error.unwrap().find("1").and_then(FilterError::code), Some("int"));
    }

    #[test]
    fn forbidden_key_is_removed_with_error() {
        let rule = Rule::arrays([("id", Rule::int().forbidden()), ("name", Rule::string())]);
        let out = check(json!({"id": 5, "name": "x"}), &rule);

        assert_eq!(out.value, Value::from(json!({"name": "x"})));
        let forbidden = out.error.unwrap().child("id").cloned().unwrap();
        assert_eq!(forbidden.code(), Some("forbidden"));
        assert_eq!(forbidden.message().as_deref(), Some("Element \"id\" must be absent"));
    }

    #[test]
    fn absent_forbidden_key_is_fine() {
        let rule = Rule::arrays([("id", Rule::int().forbidden().required())]);
        let out = check(json!({}), &rule);
        assert_eq!(out, Outcome::ok(Value::from(json!({}))));
    }

    #[test]
    fn missing_required_key_uses_default() {
        let rule = Rule::arrays([("page", Rule::int().required().default(1))]);
        let out = check(json!({}), &rule);
        assert_eq!(out, Outcome::ok(Value::from(json!({"page": 1}))));
    }

    #[test]
    fn missing_required_key_without_default() {
        let rule = Rule::arrays([("page", Rule::int().required()), ("q", Rule::string())]);
        let out = check(json!({}), &rule);

        let error = out.error.unwrap();
        assert_eq!(error.find("page").and_then(FilterError::code), Some("required"));
        assert!(error.child("q").is_none());
    }

    #[test]
    fn missing_optional_key_is_not_inserted() {
        let rule = Rule::arrays([("q", Rule::string().default("none"))]);
        assert_eq!(check(json!({}), &rule), Outcome::ok(Value::from(json!({}))));
    }

    #[test]
    fn non_container_yields_empty_map() {
        let rule = Rule::arrays([("a", Rule::int().required().default(1))]);
        for input in [json!("text"), json!(5), json!(null)] {
            let out = check(input, &rule);
            assert_eq!(out.value, Value::Map(IndexMap::new()));
            assert_eq!(out.code(), Some("arrays"));
        }
    }

    #[test]
    fn values_input_is_unwrapped() {
        let rule = Rule::arrays([("n", Rule::int())]);
        let input = Values::new(json!({"n": "4"}));
        let out = Checker::new().check(Value::Values(input), &rule);
        assert_eq!(out, Outcome::ok(Value::from(json!({"n": 4}))));
    }

    #[test]
    fn tree_reapplies_parent_rule() {
        let rule = Rule::arrays_of(Rule::int()).tree();
        let out = check(json!({"a": "1", "b": {"c": "2", "d": "x"}}), &rule);

        assert_eq!(out.value, Value::from(json!({"a": 1, "b": {"c": 2, "d": 0}})));
        let error = out.error.unwrap();
        assert_eq!(error.find("b.d").and_then(FilterError::code), Some("int"));
        assert!(error.child("a").is_none());
    }

    #[test]
    fn tree_without_default_keeps_nested_containers_only() {
        let rule = Rule::arrays([("name", Rule::string())]).tree();
        let input = json!({"name": "root", "size": 3, "child": {"name": "leaf", "x": 1}});
        let out = check(input, &rule);
        let expected = json!({"name": "root", "child": {"name": "leaf"}});
        assert_eq!(out, Outcome::ok(Value::from(expected)));
    }

    #[test]
    fn depth_guard_stops_deep_trees() {
        let checker = Checker::builder()
            .config(CheckConfig::default().with_max_depth(2))
            .build();
        let rule = Rule::arrays_of(Rule::int()).tree();

        let out = checker.check(json!({"a": {"a": {"a": {"a": "1"}}}}), &rule);
        let error = out.error.unwrap();
        let deep = error.find("a.a").unwrap();
        assert_eq!(deep.code(), Some("arrays"));
        assert_eq!(deep.message().as_deref(), Some("Nesting is too deep"));
        assert_eq!(out.value.get("a").and_then(|a| a.get("a")), Some(&Value::Map(IndexMap::new())));
    }

    #[test]
    fn ignored_member_error_does_not_bubble() {
        let rule = Rule::arrays([("n", Rule::int().max(10).ignore(["max"]))]);
        let out = check(json!({"n": 50}), &rule);
        assert_eq!(out, Outcome::ok(Value::from(json!({"n": 10}))));
    }

    #[test]
    fn any_takes_first_passing_alternative() {
        let rule = Rule::any([Rule::int(), Rule::string().email()]);
        assert_eq!(check(json!("42"), &rule), Outcome::ok(42));
        assert_eq!(check(json!("a@b.co"), &rule), Outcome::ok("a@b.co"));
    }

    #[test]
    fn any_reports_last_attempt() {
        let rule = Rule::any([Rule::int(), Rule::string().email()]);
        let out = check(json!("nope"), &rule);
        assert_eq!(out.code(), Some("email"));
        assert_eq!(out.value, Value::from("nope"));
    }

    #[test]
    fn empty_any_passes_through() {
        let rule = Rule::any([]);
        assert_eq!(check(json!([1]), &rule), Outcome::ok(Value::from(json!([1]))));
    }
}
