//! Rules: ordered filters plus modifiers
//!
//! A [`Rule`] is built once and shared read-only between checks. Filters
//! run in the order they were first added; re-adding a filter replaces its
//! arguments in place. The modifiers `required`, `default`, `ignore` and
//! `forbidden` are not filters and are stored separately.
//!
//! ```rust
//! use sift_check::{Checker, Rule, Value};
//!
//! let rule = Rule::string().trim().max(5).ignore(["trim"]);
//! let out = Checker::new().check(Value::from("  hello world "), &rule);
//!
//! assert_eq!(out.value, Value::from("hello"));
//! assert_eq!(out.error.and_then(|e| e.code().map(str::to_string)).as_deref(), Some("max"));
//! ```

use crate::error::RuleError;
use crate::filter::{ArraysRule, Filter, FilterArg, GlobPatterns, flatten, plain_values};
use crate::value::{Number, Value};

/// Description of accepted values.
#[derive(Debug, Clone)]
pub struct Rule {
    filters: Vec<Filter>,
    required: bool,
    default: Option<Value>,
    ignore: Vec<String>,
    forbidden: bool,
}

impl Default for Rule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule {
    /// Rule without filters; accepts anything unchanged.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            required: false,
            default: None,
            ignore: Vec::new(),
            forbidden: false,
        }
    }

    // ------------------------------------------------------------------------
    // Dynamic construction
    // ------------------------------------------------------------------------

    /// Add a filter (or modifier) by name.
    ///
    /// `required`, `forbidden`, `default` and `ignore` set modifiers; built-in
    /// names are parsed into typed filters; other names become custom filters
    /// resolved by registered hooks.
    pub fn add_filter(mut self, name: &str, args: Vec<FilterArg>) -> Result<Self, RuleError> {
        match name {
            "required" => self.required = flag(name, args)?,
            "forbidden" => self.forbidden = flag(name, args)?,
            "default" => {
                let mut values = plain_values(name, args)?;
                if values.len() != 1 {
                    return Err(RuleError::ArgumentCount {
                        filter: name.to_string(),
                        expected: "1",
                        got: values.len(),
                    });
                }
                self.default = values.pop();
            }
            "ignore" => {
                let codes = flatten(plain_values(name, args)?);
                let mut ignore = Vec::with_capacity(codes.len());
                for code in codes {
                    let Some(code) = code.string_form() else {
                        return Err(RuleError::argument(name, "error codes must be strings"));
                    };
                    ignore.push(code);
                }
                self = self.ignore(ignore);
            }
            _ => self = self.with_filter(Filter::parse(name, args)?),
        }
        Ok(self)
    }

    /// Add a typed filter, replacing a same-named one in place.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        match self.filters.iter_mut().find(|f| f.name() == filter.name()) {
            Some(slot) => *slot = filter,
            None => self.filters.push(filter),
        }
        self
    }

    /// Extend with `other`: its filters replace same-named ones in place or
    /// are appended, flags are or-ed, its default and ignore set win when
    /// present.
    pub fn merge(mut self, other: Rule) -> Self {
        for filter in other.filters {
            self = self.with_filter(filter);
        }
        self.required |= other.required;
        self.forbidden |= other.forbidden;
        if other.default.is_some() {
            self.default = other.default;
        }
        if !other.ignore.is_empty() {
            self.ignore = other.ignore;
        }
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Filters in evaluation order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Filter by name.
    pub fn filter(&self, name: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.name() == name)
    }

    /// Whether a filter with this name is present.
    pub fn has_filter(&self, name: &str) -> bool {
        self.filter(name).is_some()
    }

    /// `required` modifier.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// `forbidden` modifier.
    pub fn is_forbidden(&self) -> bool {
        self.forbidden
    }

    /// Declared default; `Some(Value::Null)` is a real default.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Ignored error codes.
    pub fn ignored(&self) -> &[String] {
        &self.ignore
    }

    /// Whether errors with `code` are ignored.
    pub fn ignores(&self, code: &str) -> bool {
        self.ignore.iter().any(|c| c == code)
    }

    // ------------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------------

    /// `bool`
    pub fn bool() -> Self {
        Self::new().with_filter(Filter::Bool)
    }

    /// `int`
    pub fn int() -> Self {
        Self::new().with_filter(Filter::Int)
    }

    /// `double`
    pub fn double() -> Self {
        Self::new().with_filter(Filter::Double)
    }

    /// `string`
    pub fn string() -> Self {
        Self::new().with_filter(Filter::String)
    }

    /// `scalar`
    pub fn scalar() -> Self {
        Self::new().with_filter(Filter::Scalar)
    }

    /// `null`
    pub fn null() -> Self {
        Self::new().with_filter(Filter::Null)
    }

    /// `values`
    pub fn values() -> Self {
        Self::new().with_filter(Filter::Values)
    }

    /// `condition`
    pub fn condition() -> Self {
        Self::new().with_filter(Filter::Condition)
    }

    /// `object` of any class.
    pub fn object() -> Self {
        Self::new().with_filter(Filter::Object(None))
    }

    /// `object` of the given class.
    pub fn object_of(class: impl Into<String>) -> Self {
        Self::new().with_filter(Filter::Object(Some(class.into())))
    }

    /// `entity` without a condition.
    pub fn entity() -> Self {
        Self::new().with_filter(Filter::Entity(None))
    }

    /// `entity` that must match `condition`.
    pub fn entity_where(condition: impl Into<Value>) -> Self {
        Self::new().with_filter(Filter::Entity(Some(condition.into())))
    }

    /// `arrays` with per-key rules.
    pub fn arrays<I, K>(sub: I) -> Self
    where
        I: IntoIterator<Item = (K, Rule)>,
        K: Into<String>,
    {
        Self::new().with_filter(Filter::Arrays(ArraysRule {
            sub: sub.into_iter().map(|(k, r)| (k.into(), r)).collect(),
            ..ArraysRule::default()
        }))
    }

    /// `arrays` applying `default` to every member.
    pub fn arrays_of(default: Rule) -> Self {
        Self::new().with_filter(Filter::Arrays(ArraysRule {
            default: Some(Box::new(default)),
            ..ArraysRule::default()
        }))
    }

    /// `any` of the alternatives.
    pub fn any(alternatives: impl IntoIterator<Item = Rule>) -> Self {
        Self::new().with_filter(Filter::Any(alternatives.into_iter().collect()))
    }

    // ------------------------------------------------------------------------
    // Refiners
    // ------------------------------------------------------------------------

    /// Default rule for keys without their own rule in `arrays`.
    pub fn each(self, default: Rule) -> Self {
        self.update_arrays(|arrays| arrays.default = Some(Box::new(default)))
    }

    /// Re-apply this rule to nested containers in `arrays`.
    pub fn tree(self) -> Self {
        self.update_arrays(|arrays| arrays.tree = true)
    }

    fn update_arrays(mut self, update: impl FnOnce(&mut ArraysRule)) -> Self {
        if let Some(Filter::Arrays(arrays)) = self
            .filters
            .iter_mut()
            .find(|f| matches!(f, Filter::Arrays(_)))
        {
            update(arrays);
            return self;
        }
        let mut arrays = ArraysRule::default();
        update(&mut arrays);
        self.with_filter(Filter::Arrays(arrays))
    }

    /// `max`: at most `n` (value, characters or members).
    pub fn max(self, n: impl Into<Number>) -> Self {
        self.with_filter(Filter::Max(n.into()))
    }

    /// `min`: at least `n`.
    pub fn min(self, n: impl Into<Number>) -> Self {
        self.with_filter(Filter::Min(n.into()))
    }

    /// `less`: below `n`.
    pub fn less(self, n: impl Into<Number>) -> Self {
        self.with_filter(Filter::Less(n.into()))
    }

    /// `more`: above `n`.
    pub fn more(self, n: impl Into<Number>) -> Self {
        self.with_filter(Filter::More(n.into()))
    }

    /// `eq` with loose comparison.
    pub fn eq(self, target: impl Into<Value>) -> Self {
        self.with_filter(Filter::Eq {
            target: target.into(),
            strict: false,
        })
    }

    /// `eq` with strict comparison.
    pub fn eq_strict(self, target: impl Into<Value>) -> Self {
        self.with_filter(Filter::Eq {
            target: target.into(),
            strict: true,
        })
    }

    /// `not` with loose comparison.
    pub fn not(self, target: impl Into<Value>) -> Self {
        self.with_filter(Filter::Not {
            target: target.into(),
            strict: false,
        })
    }

    /// `not` with strict comparison.
    pub fn not_strict(self, target: impl Into<Value>) -> Self {
        self.with_filter(Filter::Not {
            target: target.into(),
            strict: true,
        })
    }

    /// `in`
    pub fn one_of<I, V>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with_filter(Filter::In(allowed.into_iter().map(Into::into).collect()))
    }

    /// `not_in`
    pub fn none_of<I, V>(self, rejected: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with_filter(Filter::NotIn(rejected.into_iter().map(Into::into).collect()))
    }

    /// `trim`
    pub fn trim(self) -> Self {
        self.with_filter(Filter::Trim)
    }

    /// `escape` of HTML special characters.
    pub fn escape(self) -> Self {
        self.with_filter(Filter::Escape { full: false })
    }

    /// `escape`, also encoding every non-ASCII character.
    pub fn escape_full(self) -> Self {
        self.with_filter(Filter::Escape { full: true })
    }

    /// `strip_tags`, keeping the listed tags.
    pub fn strip_tags<I, S>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_filter(Filter::StripTags {
            allowed: allowed
                .into_iter()
                .map(|tag| tag.as_ref().trim_matches(['<', '>', '/']).to_lowercase())
                .collect(),
        })
    }

    /// `email`
    pub fn email(self) -> Self {
        self.with_filter(Filter::Email)
    }

    /// `url`
    pub fn url(self) -> Self {
        self.with_filter(Filter::Url)
    }

    /// `ip`
    pub fn ip(self) -> Self {
        self.with_filter(Filter::Ip)
    }

    /// `uri`
    pub fn uri(self) -> Self {
        self.with_filter(Filter::Uri)
    }

    /// `regexp`: must match one of the patterns; `""` matches anything.
    pub fn regexp<I, S>(self, patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = patterns
            .into_iter()
            .map(|p| FilterArg::from(Into::<String>::into(p)))
            .collect();
        Ok(self.with_filter(Filter::parse("regexp", args)?))
    }

    /// `ospatterns`: must match one shell pattern.
    pub fn ospatterns<I, S>(self, patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.with_filter(Filter::OsPatterns(GlobPatterns::new(patterns)?)))
    }

    /// `color`
    pub fn color(self) -> Self {
        self.with_filter(Filter::Color)
    }

    /// `lowercase`
    pub fn lowercase(self) -> Self {
        self.with_filter(Filter::Lowercase)
    }

    /// `uppercase`
    pub fn uppercase(self) -> Self {
        self.with_filter(Filter::Uppercase)
    }

    /// Filter resolved by a registered hook.
    pub fn custom(self, name: impl Into<String>, args: Vec<Value>) -> Self {
        self.with_filter(Filter::Custom {
            name: name.into(),
            args,
        })
    }

    // ------------------------------------------------------------------------
    // Modifiers
    // ------------------------------------------------------------------------

    /// Mark as required inside `arrays`.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark as forbidden inside `arrays`.
    pub fn forbidden(mut self) -> Self {
        self.forbidden = true;
        self
    }

    /// Value substituted when filtering fails.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Error codes to ignore; the failing filter's coerced value is kept.
    pub fn ignore<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for code in codes {
            let code = code.into();
            if !self.ignores(&code) {
                self.ignore.push(code);
            }
        }
        self
    }
}

fn flag(name: &str, args: Vec<FilterArg>) -> Result<bool, RuleError> {
    let values = plain_values(name, args)?;
    match values.as_slice() {
        [] => Ok(true),
        [value] => Ok(value.is_truthy()),
        _ => Err(RuleError::ArgumentCount {
            filter: name.to_string(),
            expected: "0..=1",
            got: values.len(),
        }),
    }
}
