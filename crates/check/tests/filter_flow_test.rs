//! End-to-end behaviour of the rule interpreter.

mod common;

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use sift_check::prelude::*;
use sift_check::{CheckConfig, FilterArg, RuleError};

// ============================================================================
// IDEMPOTENCE ON VALID INPUT
// ============================================================================

#[rstest]
#[case(Rule::bool(), Value::Bool(true))]
#[case(Rule::int(), Value::Int(-17))]
#[case(Rule::double(), Value::Float(2.5))]
#[case(Rule::string(), Value::from("plain"))]
#[case(Rule::scalar(), Value::from("x"))]
#[case(Rule::null(), Value::Null)]
#[case(Rule::string().trim(), Value::from("tidy"))]
#[case(Rule::string().lowercase(), Value::from("quiet"))]
#[case(Rule::string().uppercase(), Value::from("LOUD"))]
#[case(Rule::string().escape(), Value::from("fish and chips"))]
#[case(Rule::string().strip_tags(["b"]), Value::from("<b>bold</b>"))]
#[case(Rule::string().email(), Value::from("ann@example.com"))]
#[case(Rule::string().url(), Value::from("https://example.com/"))]
#[case(Rule::string().ip(), Value::from("10.0.0.1"))]
#[case(Rule::string().uri(), Value::from("/library/books/1"))]
#[case(Rule::string().color(), Value::from("#a0b1c2"))]
#[case(Rule::int().max(10).min(1), Value::Int(5))]
#[case(Rule::int().less(10).more(1), Value::Int(5))]
#[case(Rule::int().one_of([1, 2, 3]), Value::Int(2))]
#[case(Rule::int().none_of([1, 2, 3]), Value::Int(4))]
fn valid_input_passes_unchanged(#[case] rule: Rule, #[case] input: Value) {
    let out = Checker::new().check(input.clone(), &rule);
    assert_eq!(out, Outcome::ok(input));
}

#[rstest]
#[case(Rule::int().max(10), Value::Int(99))]
#[case(Rule::string().max(3), Value::from("abcdef"))]
#[case(Rule::arrays_of(Rule::int()).max(2), Value::from(json!([1, 2, 3])))]
#[case(Rule::string().trim(), Value::from("  padded  "))]
#[case(Rule::string().lowercase(), Value::from("MiXeD"))]
#[case(Rule::string().strip_tags(Vec::<String>::new()), Value::from("<p>hi</p>"))]
#[case(Rule::string().color(), Value::from("fff"))]
#[case(Rule::int().less(10), Value::Int(10))]
#[case(Rule::string().less(0), Value::from("abc"))]
#[case(Rule::string().max(-1), Value::from("abc"))]
#[case(Rule::new().less(0), Value::from(json!([1])))]
fn second_pass_is_clean(#[case] rule: Rule, #[case] input: Value) {
    let checker = Checker::new();
    let first = checker.check(input, &rule);
    let second = checker.check(first.value.clone(), &rule);
    assert_eq!(second, Outcome::ok(first.value));
}

// ============================================================================
// CONTROL FLOW
// ============================================================================

#[test]
fn ignore_suppresses_only_listed_codes() {
    let rule = Rule::new().min(5).max(10).ignore(["min"]);
    let checker = Checker::new();

    assert_eq!(checker.check(3, &rule), Outcome::ok(5));

    let out = checker.check(20, &rule);
    assert_eq!(out.code(), Some("max"));
    assert_eq!(out.error.unwrap().message().as_deref(), Some("Must be at most 10"));
}

#[test]
fn default_replaces_failed_value() {
    let rule = Rule::int().min(1).default(1);
    let checker = Checker::new();
    assert_eq!(checker.check("-4", &rule), Outcome::ok(1));
    assert_eq!(checker.check("abc", &rule), Outcome::ok(1));
    assert_eq!(checker.check("7", &rule), Outcome::ok(7));
}

#[test]
fn null_default_is_a_real_default() {
    let rule = Rule::string().default(Value::Null);
    assert_eq!(Checker::new().check(json!([1]), &rule), Outcome::ok(Value::Null));
}

#[test]
fn any_tries_alternatives_in_order() {
    let rule = Rule::any([Rule::int(), Rule::string().email()]);
    let checker = Checker::new();

    assert_eq!(checker.check("5", &rule), Outcome::ok(5));
    assert_eq!(checker.check("a@b.com", &rule), Outcome::ok("a@b.com"));

    let out = checker.check("abc", &rule);
    assert_eq!(out.code(), Some("email"));
    assert_eq!(out.value, Value::from("abc"));
}

#[test]
fn color_normalizes_or_falls_back() {
    let checker = Checker::new();
    assert_eq!(checker.check("fff", &Rule::string().color()), Outcome::ok("#fff"));

    let out = checker.check("zzz", &Rule::string().color());
    assert_eq!(out.value, Value::from("#000000"));
    assert_eq!(out.code(), Some("color"));
}

#[test]
fn eq_loose_and_strict() {
    let checker = Checker::new();
    assert_eq!(checker.check("5", &Rule::new().eq(5)), Outcome::ok("5"));

    let strict = checker.check("5", &Rule::new().eq_strict(5));
    assert_eq!(strict.code(), Some("eq"));
    assert_eq!(strict.value, Value::Int(5));
}

#[test]
fn arrays_on_scalar_is_empty_map() {
    let rule = Rule::arrays([("id", Rule::int().required().default(0))]);
    let out = Checker::new().check("not a container", &rule);
    assert_eq!(out.value, Value::from(json!({})));
    assert_eq!(out.code(), Some("arrays"));
}

#[test]
fn missing_required_key_with_default() {
    let rule = Rule::arrays([
        ("limit", Rule::int().max(100).required()),
        ("offset", Rule::int().required().default(0)),
    ]);
    let out = Checker::new().check(json!({"limit": "500"}), &rule);
    assert_eq!(out.code(), Some("arrays"));
    assert_eq!(out.value, Value::from(json!({"limit": 100, "offset": 0})));
    assert_eq!(
        out.error.unwrap().find("limit").and_then(FilterError::code),
        Some("max")
    );
}

// ============================================================================
// RULE CONSTRUCTION
// ============================================================================

#[test]
fn rules_built_by_name() {
    let rule = Rule::new()
        .add_filter("string", vec![])
        .and_then(|r| r.add_filter("max", vec![FilterArg::from(3)]))
        .and_then(|r| r.add_filter("required", vec![]))
        .unwrap();

    assert!(rule.is_required());
    assert_eq!(Checker::new().check("abcdef", &rule).value, Value::from("abc"));
}

#[test]
fn invalid_rules_are_rejected_up_front() {
    assert!(matches!(
        Rule::string().regexp(["(unclosed"]),
        Err(RuleError::InvalidRegex { .. })
    ));
    assert!(matches!(
        Rule::new().add_filter("max", vec![]),
        Err(RuleError::ArgumentCount { .. })
    ));
}

#[test]
fn integer_bound_follows_config() {
    let checker = Checker::builder()
        .config(CheckConfig::default().with_int_bound(1000))
        .build();
    assert_eq!(checker.check("999", &Rule::int()), Outcome::ok(999));
    assert_eq!(checker.check("1000", &Rule::int()), Outcome::ok(1000.0));
}

#[test]
fn error_tree_renders_paths() {
    let rule = Rule::arrays([(
        "author",
        Rule::arrays([("email", Rule::string().email()), ("age", Rule::int())]),
    )]);
    let out = common::checker().check(json!({"author": {"email": "nope", "age": "x"}}), &rule);
    let error = out.error.unwrap();

    assert_eq!(error.find("author.email").and_then(FilterError::code), Some("email"));
    let rendered = error.to_string();
    assert!(rendered.starts_with("arrays: "), "{rendered}");
    assert!(rendered.contains("author.email: email"), "{rendered}");
    assert!(rendered.contains("author.age: int"), "{rendered}");
}
