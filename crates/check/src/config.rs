//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning knobs for a [`Checker`](crate::Checker).
///
/// ```toml
/// max_depth = 32
/// int_bound = 2147483647
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Maximum nesting of `arrays` filters (including `tree` recursion)
    /// before the structure is rejected
    pub max_depth: usize,

    /// Integer literals must lie strictly inside `(-int_bound, int_bound)`
    /// to become `Int`; larger ones become `Float`
    pub int_bound: i64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            int_bound: i64::from(i32::MAX),
        }
    }
}

impl CheckConfig {
    /// Parse from TOML; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()
    }

    /// Defaults overridden by `SIFT_MAX_DEPTH` and `SIFT_INT_BOUND`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup("SIFT_MAX_DEPTH") {
            config.max_depth = parse_var("SIFT_MAX_DEPTH", raw)?;
        }
        if let Some(raw) = lookup("SIFT_INT_BOUND") {
            config.int_bound = parse_var("SIFT_INT_BOUND", raw)?;
        }
        config.validate()
    }

    /// Set the nesting limit.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the integer bound.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_int_bound(mut self, int_bound: i64) -> Self {
        self.int_bound = int_bound;
        self
    }

    /// Check ranges.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_depth",
                reason: "must be at least 1",
            });
        }
        if self.int_bound <= 0 {
            return Err(ConfigError::Invalid {
                field: "int_bound",
                reason: "must be positive",
            });
        }
        Ok(self)
    }
}

fn parse_var<T>(var: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = raw.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Env {
        var,
        reason: e.to_string(),
        value: raw,
    })
}
