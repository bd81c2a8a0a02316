//! Text filters: `trim`, `escape`, `strip_tags`, `lowercase`, `uppercase`,
//! `color`
//!
//! These rewrite the value and report an error when the rewrite changed it,
//! so a clean input passes silently and a second pass never fails.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::check::Outcome;
use crate::compare::loose_eq;
use crate::error::FilterError;
use crate::value::Value;

/// Comments, opening and closing tags (name in group 1), and `<!...>` or
/// `<?...?>` declarations.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|</?([A-Za-z][A-Za-z0-9:-]*)[^>]*>|<[!?][^>]*>").unwrap()
});

fn rewritten(original: Value, result: String, error: impl FnOnce() -> FilterError) -> Outcome {
    let result = Value::String(result);
    if loose_eq(&result, &original) {
        Outcome::ok(result)
    } else {
        Outcome::fail(result, error())
    }
}

pub(crate) fn trim(value: Value) -> Outcome {
    let Some(s) = value.string_form() else {
        return Outcome::ok(value);
    };
    let trimmed = s.trim().to_string();
    rewritten(value, trimmed, || {
        FilterError::new("trim", "Has whitespace at the start or end")
    })
}

fn escape_html(s: &str, full: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c if full && !c.is_ascii() => {
                let _ = write!(out, "&#{};", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn escape(value: Value, full: bool) -> Outcome {
    let Some(s) = value.string_form() else {
        return Outcome::ok(value);
    };
    let escaped = escape_html(&s, full);
    rewritten(value, escaped, || {
        FilterError::new("escape", "Contains HTML special characters")
    })
}

pub(crate) fn strip_tags(value: Value, allowed: &[String]) -> Outcome {
    let Some(s) = value.string_form() else {
        return Outcome::ok(value);
    };
    let stripped = MARKUP
        .replace_all(&s, |caps: &Captures<'_>| match caps.get(1) {
            Some(name) if allowed.contains(&name.as_str().to_lowercase()) => caps[0].to_string(),
            _ => String::new(),
        })
        .into_owned();
    rewritten(value, stripped, || {
        FilterError::new("strip_tags", "Contains forbidden HTML tags")
    })
}

pub(crate) fn lowercase(value: Value) -> Outcome {
    match value {
        Value::String(s) => {
            let lower = s.to_lowercase();
            if lower == s {
                Outcome::ok(s)
            } else {
                let error = FilterError::new("lowercase", "Not all characters are lowercase");
                Outcome::fail(lower, error)
            }
        }
        other => Outcome::ok(other),
    }
}

pub(crate) fn uppercase(value: Value) -> Outcome {
    match value {
        Value::String(s) => {
            let upper = s.to_uppercase();
            if upper == s {
                Outcome::ok(s)
            } else {
                let error = FilterError::new("uppercase", "Not all characters are uppercase");
                Outcome::fail(upper, error)
            }
        }
        other => Outcome::ok(other),
    }
}

pub(crate) fn color(value: Value) -> Outcome {
    if let Some(s) = value.string_form() {
        let code = s.trim_matches([' ', '#']);
        if matches!(code.len(), 3 | 6) && code.chars().all(|c| c.is_ascii_hexdigit()) {
            return Outcome::ok(format!("#{code}"));
        }
    }
    Outcome::fail("#000000", FilterError::new("color", "Invalid color code"))
}
