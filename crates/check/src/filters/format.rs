//! Format filters: `email`, `url`, `ip`, `uri`, `regexp`, `ospatterns`
//!
//! Format filters never rewrite the value.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::check::Outcome;
use crate::error::FilterError;
use crate::filter::GlobPatterns;
use crate::value::Value;

// RFC 5322 simplified email regex
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

static HAS_SCHEME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^:/]+://").unwrap());

/// Base prepended to scheme-less URIs before URL validation.
const URI_BASE: &str = "http://check/";

/// Absolute URL with a host (or a host-less scheme such as `mailto`).
fn is_url(s: &str) -> bool {
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    Url::parse(s)
        .is_ok_and(|url| url.has_host() || matches!(url.scheme(), "mailto" | "news" | "file"))
}

/// Strings only; the empty string passes.
fn string_format(
    value: Value,
    code: &'static str,
    message: &'static str,
    valid: impl Fn(&str) -> bool,
) -> Outcome {
    match &value {
        Value::String(s) if s.is_empty() || valid(s) => Outcome::ok(value),
        _ => Outcome::fail(value, FilterError::new(code, message)),
    }
}

pub(crate) fn email(value: Value) -> Outcome {
    string_format(value, "email", "Invalid email address", |s| {
        s.len() <= 254 && EMAIL_REGEX.is_match(s)
    })
}

pub(crate) fn url(value: Value) -> Outcome {
    string_format(value, "url", "Invalid URL", is_url)
}

pub(crate) fn ip(value: Value) -> Outcome {
    string_format(value, "ip", "Invalid IP address", |s| s.parse::<IpAddr>().is_ok())
}

pub(crate) fn uri(value: Value) -> Outcome {
    let text = match &value {
        Value::String(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        _ => None,
    };
    if let Some(s) = text {
        if !value.is_truthy() || s.trim_matches('/').is_empty() {
            return Outcome::ok(value);
        }
        let candidate = if HAS_SCHEME.is_match(&s) {
            s
        } else {
            format!("{URI_BASE}{}", s.trim_matches('/'))
        };
        if is_url(&candidate) {
            return Outcome::ok(value);
        }
    }
    let error = FilterError::new("uri", "Invalid URI \"%s\"").with_arg(&value);
    Outcome::fail(value, error)
}

pub(crate) fn regexp(value: Value, patterns: &[Option<Regex>]) -> Outcome {
    if let Some(s) = value.string_form() {
        let matched = patterns.iter().any(|pattern| match pattern {
            None => true,
            Some(re) => re.is_match(&s),
        });
        if matched {
            return Outcome::ok(value);
        }
    }
    Outcome::fail(value, FilterError::new("regexp", "Does not match the pattern"))
}

pub(crate) fn ospatterns(value: Value, patterns: &GlobPatterns) -> Outcome {
    match value.string_form() {
        Some(s) if patterns.is_match(&s) => Outcome::ok(value),
        _ => Outcome::fail(
            value,
            FilterError::new("ospatterns", "Does not match the shell pattern"),
        ),
    }
}
