//! Typed filters and the built-in name table
//!
//! A rule stores its filters as [`Filter`] values whose arguments were
//! checked when the rule was built. Names outside [`FilterKind`] become
//! [`Filter::Custom`] and are resolved through the checker's hook registry.

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use regex::Regex;

use crate::error::RuleError;
use crate::rule::Rule;
use crate::value::{Number, Value};

// ============================================================================
// FILTER KIND
// ============================================================================

/// Built-in filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FilterKind {
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `double`
    Double,
    /// `string`
    String,
    /// `scalar`
    Scalar,
    /// `null`
    Null,
    /// `arrays`
    Arrays,
    /// `object`
    Object,
    /// `values`
    Values,
    /// `entity`
    Entity,
    /// `any`
    Any,
    /// `max`
    Max,
    /// `min`
    Min,
    /// `less`
    Less,
    /// `more`
    More,
    /// `eq`
    Eq,
    /// `not`
    Not,
    /// `in`
    In,
    /// `not_in`
    NotIn,
    /// `trim`
    Trim,
    /// `escape`
    Escape,
    /// `strip_tags`
    StripTags,
    /// `email`
    Email,
    /// `url`
    Url,
    /// `ip`
    Ip,
    /// `uri`
    Uri,
    /// `regexp`
    Regexp,
    /// `ospatterns`
    OsPatterns,
    /// `color`
    Color,
    /// `lowercase`
    Lowercase,
    /// `uppercase`
    Uppercase,
    /// `condition`
    Condition,
}

const TABLE: &[(&str, FilterKind)] = &[
    ("bool", FilterKind::Bool),
    ("int", FilterKind::Int),
    ("double", FilterKind::Double),
    ("string", FilterKind::String),
    ("scalar", FilterKind::Scalar),
    ("null", FilterKind::Null),
    ("arrays", FilterKind::Arrays),
    ("object", FilterKind::Object),
    ("values", FilterKind::Values),
    ("entity", FilterKind::Entity),
    ("any", FilterKind::Any),
    ("max", FilterKind::Max),
    ("min", FilterKind::Min),
    ("less", FilterKind::Less),
    ("more", FilterKind::More),
    ("eq", FilterKind::Eq),
    ("not", FilterKind::Not),
    ("in", FilterKind::In),
    ("not_in", FilterKind::NotIn),
    ("trim", FilterKind::Trim),
    ("escape", FilterKind::Escape),
    ("strip_tags", FilterKind::StripTags),
    ("email", FilterKind::Email),
    ("url", FilterKind::Url),
    ("ip", FilterKind::Ip),
    ("uri", FilterKind::Uri),
    ("regexp", FilterKind::Regexp),
    ("ospatterns", FilterKind::OsPatterns),
    ("color", FilterKind::Color),
    ("lowercase", FilterKind::Lowercase),
    ("uppercase", FilterKind::Uppercase),
    ("condition", FilterKind::Condition),
];

impl FilterKind {
    /// Look up a built-in by name.
    pub fn from_name(name: &str) -> Option<Self> {
        TABLE.iter().find(|(n, _)| *n == name).map(|(_, kind)| *kind)
    }

    /// Filter name; also the error code the filter reports.
    pub fn name(self) -> &'static str {
        TABLE
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or("", |(name, _)| name)
    }

    /// All built-ins in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        TABLE.iter().map(|(_, kind)| *kind)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ARGUMENTS
// ============================================================================

/// Argument to [`Rule::add_filter`].
#[derive(Debug, Clone)]
pub enum FilterArg {
    /// Plain value
    Value(Value),
    /// Nested rule (`arrays` default, `any` alternative)
    Rule(Rule),
    /// Several nested rules (`any` alternatives)
    Rules(Vec<Rule>),
    /// Per-key rules (`arrays` sub-rules)
    Keyed(IndexMap<String, Rule>),
}

impl FilterArg {
    fn kind(&self) -> &'static str {
        match self {
            Self::Value(v) => v.type_name(),
            Self::Rule(_) => "rule",
            Self::Rules(_) => "rule list",
            Self::Keyed(_) => "keyed rules",
        }
    }
}

macro_rules! value_args {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FilterArg {
                fn from(v: $ty) -> Self {
                    Self::Value(v.into())
                }
            }
        )*
    };
}

value_args!(Value, bool, i32, i64, u32, usize, f64, &str, String, Vec<Value>, Number);

impl From<Rule> for FilterArg {
    fn from(rule: Rule) -> Self {
        Self::Rule(rule)
    }
}

impl From<Vec<Rule>> for FilterArg {
    fn from(rules: Vec<Rule>) -> Self {
        Self::Rules(rules)
    }
}

impl From<IndexMap<String, Rule>> for FilterArg {
    fn from(sub: IndexMap<String, Rule>) -> Self {
        Self::Keyed(sub)
    }
}

// ============================================================================
// FILTER
// ============================================================================

/// Sub-rules of the `arrays` filter.
#[derive(Debug, Clone, Default)]
pub struct ArraysRule {
    /// Rules for specific keys
    pub sub: IndexMap<String, Rule>,
    /// Rule for keys not listed in `sub`
    pub default: Option<Box<Rule>>,
    /// Re-apply the parent rule to nested containers the default rejects
    pub tree: bool,
}

/// Compiled shell patterns.
#[derive(Debug, Clone)]
pub struct GlobPatterns {
    sources: Vec<String>,
    set: GlobSet,
}

impl GlobPatterns {
    /// Compile patterns such as `*gr[ae]y`.
    pub fn new<I, S>(patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut sources = Vec::new();
        for pattern in patterns {
            let pattern = pattern.into();
            let glob = Glob::new(&pattern).map_err(|source| RuleError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
            sources.push(pattern);
        }
        let set = builder.build().map_err(|source| RuleError::InvalidGlob {
            pattern: sources.join(" "),
            source,
        })?;
        Ok(Self { sources, set })
    }

    /// Whether any pattern matches `candidate`.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.set.is_match(candidate)
    }

    /// Patterns as given.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

/// One step of a rule.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Coerce to bool
    Bool,
    /// Coerce to integer
    Int,
    /// Coerce to float
    Double,
    /// Coerce to string
    String,
    /// Require a scalar
    Scalar,
    /// Require null
    Null,
    /// Structural validation of lists and maps
    Arrays(ArraysRule),
    /// Host object, optionally of a given class
    Object(Option<String>),
    /// `Values` container
    Values,
    /// Entity reference, optionally matching a condition
    Entity(Option<Value>),
    /// First matching alternative
    Any(Vec<Rule>),
    /// Inclusive upper bound
    Max(Number),
    /// Inclusive lower bound
    Min(Number),
    /// Exclusive upper bound
    Less(Number),
    /// Exclusive lower bound
    More(Number),
    /// Equal to target
    Eq {
        /// Expected value
        target: Value,
        /// Use strict equality
        strict: bool,
    },
    /// Not equal to target
    Not {
        /// Rejected value
        target: Value,
        /// Use strict equality
        strict: bool,
    },
    /// Member of list
    In(Vec<Value>),
    /// Not a member of list
    NotIn(Vec<Value>),
    /// No surrounding whitespace
    Trim,
    /// No HTML special characters
    Escape {
        /// Also encode every non-ASCII character
        full: bool,
    },
    /// No markup tags except the allowed ones
    StripTags {
        /// Lowercase tag names kept in place
        allowed: Vec<String>,
    },
    /// Email address
    Email,
    /// Absolute URL
    Url,
    /// IPv4 or IPv6 address
    Ip,
    /// URI or relative path
    Uri,
    /// Matches one pattern; `None` is an empty pattern and always matches
    Regexp(Vec<Option<Regex>>),
    /// Matches one shell pattern
    OsPatterns(GlobPatterns),
    /// Hex color
    Color,
    /// All lowercase
    Lowercase,
    /// All uppercase
    Uppercase,
    /// Query condition
    Condition,
    /// Filter provided by a registered hook
    Custom {
        /// Filter name
        name: String,
        /// Arguments handed to the hook
        args: Vec<Value>,
    },
}

impl Filter {
    /// Build a filter from a name and untyped arguments.
    ///
    /// Unknown names produce [`Filter::Custom`].
    pub fn parse(name: &str, args: Vec<FilterArg>) -> Result<Self, RuleError> {
        let Some(kind) = FilterKind::from_name(name) else {
            return Ok(Self::Custom {
                name: name.to_string(),
                args: plain_values(name, args)?,
            });
        };

        let filter = match kind {
            FilterKind::Bool => no_args(name, &args, Self::Bool)?,
            FilterKind::Int => no_args(name, &args, Self::Int)?,
            FilterKind::Double => no_args(name, &args, Self::Double)?,
            FilterKind::String => no_args(name, &args, Self::String)?,
            FilterKind::Scalar => no_args(name, &args, Self::Scalar)?,
            FilterKind::Null => no_args(name, &args, Self::Null)?,
            FilterKind::Values => no_args(name, &args, Self::Values)?,
            FilterKind::Trim => no_args(name, &args, Self::Trim)?,
            FilterKind::Email => no_args(name, &args, Self::Email)?,
            FilterKind::Url => no_args(name, &args, Self::Url)?,
            FilterKind::Ip => no_args(name, &args, Self::Ip)?,
            FilterKind::Uri => no_args(name, &args, Self::Uri)?,
            FilterKind::Color => no_args(name, &args, Self::Color)?,
            FilterKind::Lowercase => no_args(name, &args, Self::Lowercase)?,
            FilterKind::Uppercase => no_args(name, &args, Self::Uppercase)?,
            FilterKind::Condition => no_args(name, &args, Self::Condition)?,
            FilterKind::Arrays => Self::Arrays(parse_arrays(name, args)?),
            FilterKind::Object => {
                let mut values = plain_values(name, args)?;
                count(name, &values, 0..=1, "0..=1")?;
                match values.pop() {
                    None | Some(Value::Null) => Self::Object(None),
                    Some(Value::String(class)) => Self::Object(Some(class)),
                    Some(other) => {
                        return Err(RuleError::argument(
                            name,
                            format!("class name must be a string, got {}", other.type_name()),
                        ));
                    }
                }
            }
            FilterKind::Entity => {
                let mut values = plain_values(name, args)?;
                count(name, &values, 0..=1, "0..=1")?;
                Self::Entity(values.pop().filter(|v| !v.is_null()))
            }
            FilterKind::Any => {
                let mut rules = Vec::new();
                for arg in args {
                    match arg {
                        FilterArg::Rule(rule) => rules.push(rule),
                        FilterArg::Rules(list) => rules.extend(list),
                        other => {
                            return Err(RuleError::argument(
                                name,
                                format!("alternatives must be rules, got {}", other.kind()),
                            ));
                        }
                    }
                }
                Self::Any(rules)
            }
            FilterKind::Max => Self::Max(bound(name, args)?),
            FilterKind::Min => Self::Min(bound(name, args)?),
            FilterKind::Less => Self::Less(bound(name, args)?),
            FilterKind::More => Self::More(bound(name, args)?),
            FilterKind::Eq | FilterKind::Not => {
                let values = plain_values(name, args)?;
                count(name, &values, 1..=2, "1..=2")?;
                let mut values = values.into_iter();
                let target = values.next().unwrap_or_default();
                let strict = values.next().is_some_and(|v| v.is_truthy());
                if kind == FilterKind::Eq {
                    Self::Eq { target, strict }
                } else {
                    Self::Not { target, strict }
                }
            }
            FilterKind::In => Self::In(flatten(plain_values(name, args)?)),
            FilterKind::NotIn => Self::NotIn(flatten(plain_values(name, args)?)),
            FilterKind::Escape => {
                let values = plain_values(name, args)?;
                count(name, &values, 0..=1, "0..=1")?;
                Self::Escape {
                    full: values.first().is_some_and(Value::is_truthy),
                }
            }
            FilterKind::StripTags => {
                let mut allowed = Vec::new();
                for value in flatten(plain_values(name, args)?) {
                    let Value::String(s) = value else {
                        return Err(RuleError::argument(name, "allowed tags must be strings"));
                    };
                    allowed.extend(tag_names(&s));
                }
                Self::StripTags { allowed }
            }
            FilterKind::Regexp => {
                let patterns = strings(name, flatten(plain_values(name, args)?))?;
                let compiled = patterns
                    .into_iter()
                    .map(|pattern| {
                        if pattern.is_empty() {
                            return Ok(None);
                        }
                        Regex::new(&pattern)
                            .map(Some)
                            .map_err(|source| RuleError::InvalidRegex { pattern, source })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::Regexp(compiled)
            }
            FilterKind::OsPatterns => {
                let patterns = strings(name, flatten(plain_values(name, args)?))?;
                Self::OsPatterns(GlobPatterns::new(patterns)?)
            }
        };
        Ok(filter)
    }

    /// Built-in kind, `None` for custom filters.
    pub fn kind(&self) -> Option<FilterKind> {
        let kind = match self {
            Self::Bool => FilterKind::Bool,
            Self::Int => FilterKind::Int,
            Self::Double => FilterKind::Double,
            Self::String => FilterKind::String,
            Self::Scalar => FilterKind::Scalar,
            Self::Null => FilterKind::Null,
            Self::Arrays(_) => FilterKind::Arrays,
            Self::Object(_) => FilterKind::Object,
            Self::Values => FilterKind::Values,
            Self::Entity(_) => FilterKind::Entity,
            Self::Any(_) => FilterKind::Any,
            Self::Max(_) => FilterKind::Max,
            Self::Min(_) => FilterKind::Min,
            Self::Less(_) => FilterKind::Less,
            Self::More(_) => FilterKind::More,
            Self::Eq { .. } => FilterKind::Eq,
            Self::Not { .. } => FilterKind::Not,
            Self::In(_) => FilterKind::In,
            Self::NotIn(_) => FilterKind::NotIn,
            Self::Trim => FilterKind::Trim,
            Self::Escape { .. } => FilterKind::Escape,
            Self::StripTags { .. } => FilterKind::StripTags,
            Self::Email => FilterKind::Email,
            Self::Url => FilterKind::Url,
            Self::Ip => FilterKind::Ip,
            Self::Uri => FilterKind::Uri,
            Self::Regexp(_) => FilterKind::Regexp,
            Self::OsPatterns(_) => FilterKind::OsPatterns,
            Self::Color => FilterKind::Color,
            Self::Lowercase => FilterKind::Lowercase,
            Self::Uppercase => FilterKind::Uppercase,
            Self::Condition => FilterKind::Condition,
            Self::Custom { .. } => return None,
        };
        Some(kind)
    }

    /// Filter name.
    pub fn name(&self) -> &str {
        match self {
            Self::Custom { name, .. } => name,
            other => other.kind().map_or("", FilterKind::name),
        }
    }
}

fn no_args(name: &str, args: &[FilterArg], filter: Filter) -> Result<Filter, RuleError> {
    if args.is_empty() {
        Ok(filter)
    } else {
        Err(RuleError::ArgumentCount {
            filter: name.to_string(),
            expected: "0",
            got: args.len(),
        })
    }
}

fn count(
    name: &str,
    values: &[Value],
    range: std::ops::RangeInclusive<usize>,
    expected: &'static str,
) -> Result<(), RuleError> {
    if range.contains(&values.len()) {
        Ok(())
    } else {
        Err(RuleError::ArgumentCount {
            filter: name.to_string(),
            expected,
            got: values.len(),
        })
    }
}

pub(crate) fn plain_values(name: &str, args: Vec<FilterArg>) -> Result<Vec<Value>, RuleError> {
    args.into_iter()
        .map(|arg| match arg {
            FilterArg::Value(v) => Ok(v),
            other => Err(RuleError::argument(
                name,
                format!("expected a value, got {}", other.kind()),
            )),
        })
        .collect()
}

/// A single list argument stands for its elements.
pub(crate) fn flatten(mut values: Vec<Value>) -> Vec<Value> {
    if values.len() == 1 && matches!(values[0], Value::List(_)) {
        if let Some(Value::List(inner)) = values.pop() {
            return inner;
        }
    }
    values
}

fn strings(name: &str, values: Vec<Value>) -> Result<Vec<String>, RuleError> {
    values
        .into_iter()
        .map(|v| {
            v.string_form().ok_or_else(|| {
                RuleError::argument(
                    name,
                    format!("patterns must be strings, got {}", v.type_name()),
                )
            })
        })
        .collect()
}

fn bound(name: &str, args: Vec<FilterArg>) -> Result<Number, RuleError> {
    let values = plain_values(name, args)?;
    count(name, &values, 1..=1, "1")?;
    values[0].numeric().ok_or_else(|| {
        RuleError::argument(
            name,
            format!("bound must be numeric, got {}", values[0].type_name()),
        )
    })
}

fn tag_names(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(|c: char| c == '<' || c == '>' || c == '/' || c == ',' || c.is_whitespace())
        .filter(|name| !name.is_empty())
        .map(str::to_lowercase)
}

fn parse_arrays(name: &str, args: Vec<FilterArg>) -> Result<ArraysRule, RuleError> {
    let mut rule = ArraysRule::default();
    for arg in args {
        match arg {
            FilterArg::Keyed(sub) => rule.sub = sub,
            FilterArg::Rule(default) => rule.default = Some(Box::new(default)),
            FilterArg::Value(Value::String(kind)) => {
                rule.default = Some(Box::new(Rule::new().add_filter(&kind, Vec::new())?));
            }
            FilterArg::Value(Value::Bool(tree)) => rule.tree = tree,
            other => {
                return Err(RuleError::argument(
                    name,
                    format!("unexpected argument {}", other.kind()),
                ));
            }
        }
    }
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn name_table_round_trips() {
        for kind in FilterKind::all() {
            assert_eq!(FilterKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(FilterKind::all().count(), 32);
        assert_eq!(FilterKind::from_name("slugify"), None);
    }

    #[test]
    fn unknown_names_become_custom() {
        let filter = Filter::parse("slugify", vec![FilterArg::from("-")]).unwrap();
        assert_eq!(filter.name(), "slugify");
        assert_eq!(filter.kind(), None);
        assert!(matches!(
            filter,
            Filter::Custom { ref args, .. } if args == &vec![Value::from("-")]
        ));
    }

    #[test]
    fn custom_filters_reject_rule_arguments() {
        let err = Filter::parse("slugify", vec![FilterArg::from(Rule::int())]).unwrap_err();
        assert!(matches!(err, RuleError::InvalidArgument { .. }));
    }

    #[test]
    fn bounds_require_one_number() {
        assert!(matches!(
            Filter::parse("max", vec![10.into()]).unwrap(),
            Filter::Max(Number::Int(10))
        ));
        assert!(matches!(
            Filter::parse("min", vec!["2.5".into()]).unwrap(),
            Filter::Min(Number::Float(_))
        ));
        assert!(matches!(
            Filter::parse("max", vec![]).unwrap_err(),
            RuleError::ArgumentCount { got: 0, .. }
        ));
        assert!(matches!(
            Filter::parse("less", vec!["ten".into()]).unwrap_err(),
            RuleError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn type_filters_take_no_arguments() {
        let err = Filter::parse("int", vec![1.into()]).unwrap_err();
        assert_eq!(err.to_string(), "filter 'int' expects 0 argument(s), got 1");
    }

    #[test]
    fn membership_lists_flatten_one_level() {
        let nested =
            Filter::parse("in", vec![FilterArg::Value(Value::List(vec!["a".into(), "b".into()]))]).unwrap();
        let flat = Filter::parse("in", vec!["a".into(), "b".into()]).unwrap();
        let (Filter::In(nested), Filter::In(flat)) = (nested, flat) else {
            panic!("expected in filters");
        };
        assert_eq!(nested, flat);
    }

    #[test]
    fn bad_patterns_fail_at_construction() {
        assert!(matches!(
            Filter::parse("regexp", vec!["(".into()]).unwrap_err(),
            RuleError::InvalidRegex { .. }
        ));
        assert!(matches!(
            Filter::parse("ospatterns", vec!["[a".into()]).unwrap_err(),
            RuleError::InvalidGlob { .. }
        ));
    }

    #[test]
    fn empty_regexp_pattern_is_kept() {
        let Filter::Regexp(patterns) =
            Filter::parse("regexp", vec!["".into(), "^a".into()]).unwrap()
        else {
            panic!("expected regexp");
        };
        assert!(patterns[0].is_none());
        assert!(patterns[1].is_some());
    }

    #[test]
    fn strip_tags_accepts_markup_lists() {
        let Filter::StripTags { allowed } =
            Filter::parse("strip_tags", vec!["<b><I>".into(), "em".into()]).unwrap()
        else {
            panic!("expected strip_tags");
        };
        assert_eq!(allowed, vec!["b", "i", "em"]);
    }

    #[test]
    fn arrays_arguments() {
        let mut sub = IndexMap::new();
        sub.insert("id".to_string(), Rule::int());
        let filter =
            Filter::parse("arrays", vec![sub.into(), "string".into(), true.into()]).unwrap();
        let Filter::Arrays(arrays) = filter else {
            panic!("expected arrays");
        };
        assert!(arrays.tree);
        assert_eq!(arrays.sub.len(), 1);
        let default = arrays.default.unwrap();
        assert_eq!(default.filters()[0].name(), "string");
    }

    #[test]
    fn eq_strict_flag() {
        let filter = Filter::parse("eq", vec![5.into(), true.into()]).unwrap();
        assert!(matches!(filter, Filter::Eq { strict: true, .. }));
    }
}
