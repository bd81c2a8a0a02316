//! Error types
//!
//! [`FilterError`] is the validation result tree: it is returned alongside a
//! coerced value, never thrown. [`RuleError`] and [`ConfigError`] are
//! ordinary `Result` errors for building rules and loading configuration.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;

// ============================================================================
// FILTER ERROR
// ============================================================================

/// Message template with `%s` placeholders filled positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    template: Cow<'static, str>,
    args: Vec<String>,
}

impl Message {
    /// Template without arguments.
    pub fn new(template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            template: template.into(),
            args: Vec::new(),
        }
    }

    /// Raw template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Positional arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Template with placeholders replaced; missing arguments render empty.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut args = self.args.iter();
        let mut rest = self.template.as_ref();
        while let Some(pos) = rest.find("%s") {
            out.push_str(&rest[..pos]);
            if let Some(arg) = args.next() {
                out.push_str(arg);
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }
}

/// Validation error tree.
///
/// A node carries an optional code (the failing filter's name, or one of
/// the structural codes `arrays`, `forbidden`, `required`), an optional
/// message and child errors keyed like the validated container.
///
/// ```rust
/// use sift_check::FilterError;
///
/// let mut error = FilterError::new("arrays", "Invalid structure");
/// error.at("email").add(FilterError::new("email", "Invalid email address"));
///
/// assert_eq!(error.child("email").and_then(FilterError::code), Some("email"));
/// assert!(error.exists());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterError {
    code: Option<Cow<'static, str>>,
    message: Option<Message>,
    children: IndexMap<String, FilterError>,
}

impl FilterError {
    /// Error with a code and message template.
    pub fn new(code: impl Into<Cow<'static, str>>, template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code: Some(code.into()),
            message: Some(Message::new(template)),
            children: IndexMap::new(),
        }
    }

    /// Empty placeholder node; does not exist until something is added.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a positional message argument.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_arg(mut self, arg: impl fmt::Display) -> Self {
        if let Some(message) = &mut self.message {
            message.args.push(arg.to_string());
        }
        self
    }

    /// Error code, if any.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Rendered message, if any.
    pub fn message(&self) -> Option<String> {
        self.message.as_ref().map(Message::render)
    }

    /// Raw message template and arguments.
    pub fn raw_message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Child at `key`, inserting an empty placeholder when absent.
    pub fn at(&mut self, key: impl Into<String>) -> &mut FilterError {
        self.children.entry(key.into()).or_default()
    }

    /// Child at `key`.
    pub fn child(&self, key: &str) -> Option<&FilterError> {
        self.children.get(key)
    }

    /// Follow a dot-separated path of child keys.
    pub fn find(&self, path: &str) -> Option<&FilterError> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, key| node.child(key))
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &FilterError)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `other` into this node.
    ///
    /// Code and message are adopted only when this node has none; children
    /// merge recursively.
    pub fn add(&mut self, other: FilterError) -> &mut Self {
        if self.code.is_none() && self.message.is_none() {
            self.code = other.code;
            self.message = other.message;
        }
        for (key, child) in other.children {
            self.at(key).add(child);
        }
        self
    }

    /// Whether this node or any descendant carries a code or message.
    pub fn exists(&self) -> bool {
        self.code.is_some() || self.message.is_some() || self.children.values().any(Self::exists)
    }

    /// Existing nodes without existing children, with dot-joined paths.
    ///
    /// The root itself is reported with an empty path when it is a leaf.
    pub fn leaves(&self) -> Vec<(String, &FilterError)> {
        let mut out = Vec::new();
        self.collect_leaves(String::new(), &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, path: String, out: &mut Vec<(String, &'a FilterError)>) {
        let mut descended = false;
        for (key, child) in &self.children {
            if !child.exists() {
                continue;
            }
            descended = true;
            let child_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            child.collect_leaves(child_path, out);
        }
        if !descended && self.exists() {
            out.push((path, self));
        }
    }

    /// JSON tree: `{"code", "message", "children"}`, absent parts omitted.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        if let Some(code) = &self.code {
            object.insert("code".into(), code.as_ref().into());
        }
        if let Some(message) = self.message() {
            object.insert("message".into(), message.into());
        }
        let children: serde_json::Map<String, serde_json::Value> = self
            .children
            .iter()
            .filter(|(_, child)| child.exists())
            .map(|(key, child)| (key.clone(), child.to_json()))
            .collect();
        if !children.is_empty() {
            object.insert("children".into(), children.into());
        }
        serde_json::Value::Object(object)
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, self.message()) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}")?,
            (Some(code), None) => write!(f, "{code}")?,
            (None, Some(message)) => write!(f, "{message}")?,
            (None, None) => f.write_str("invalid value")?,
        }
        let leaves = self.leaves();
        let nested: Vec<_> = leaves.iter().filter(|(path, _)| !path.is_empty()).collect();
        if !nested.is_empty() {
            f.write_str(" (")?;
            for (i, (path, leaf)) in nested.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{path}: {}", leaf.code().unwrap_or("invalid"))?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl std::error::Error for FilterError {}

// ============================================================================
// RULE ERROR
// ============================================================================

/// Error building a [`Rule`](crate::Rule).
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Regular expression failed to compile
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        /// Pattern as given
        pattern: String,
        /// Compiler error
        #[source]
        source: regex::Error,
    },

    /// Shell pattern failed to compile
    #[error("invalid shell pattern '{pattern}': {source}")]
    InvalidGlob {
        /// Pattern as given
        pattern: String,
        /// Compiler error
        #[source]
        source: globset::Error,
    },

    /// Wrong number of arguments
    #[error("filter '{filter}' expects {expected} argument(s), got {got}")]
    ArgumentCount {
        /// Filter name
        filter: String,
        /// Accepted count, e.g. `"1"` or `"0..=1"`
        expected: &'static str,
        /// Supplied count
        got: usize,
    },

    /// Argument of the wrong shape
    #[error("filter '{filter}': {reason}")]
    InvalidArgument {
        /// Filter name
        filter: String,
        /// What was wrong
        reason: Cow<'static, str>,
    },
}

impl RuleError {
    pub(crate) fn argument(filter: &str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// CONFIG ERROR
// ============================================================================

/// Error loading [`CheckConfig`](crate::CheckConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Environment variable holds an unusable value
    #[error("environment variable {var}={value:?}: {reason}")]
    Env {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// Parse failure
        reason: String,
    },

    /// Value out of range
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// Constraint that failed
        reason: &'static str,
    },
}
