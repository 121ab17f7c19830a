//! Stored condition values

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The value a condition is checked against
///
/// Values coming from the persistent store are always `Text`. Values from
/// configuration may be any scalar YAML type, and programmatic callers may
/// hand over an already-parsed instant for the date conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    #[serde(skip_deserializing)]
    Instant(DateTime<Utc>),
}

impl ConditionValue {
    pub fn text(value: impl Into<String>) -> Self {
        ConditionValue::Text(value.into())
    }

    /// The string payload, if this value is textual
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConditionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Generic truthiness for non-string values
    pub fn truthy(&self) -> bool {
        match self {
            ConditionValue::Bool(b) => *b,
            ConditionValue::Integer(n) => *n != 0,
            ConditionValue::Float(n) => *n != 0.0,
            ConditionValue::Text(s) => !s.is_empty(),
            ConditionValue::Instant(_) => true,
        }
    }

    /// Boolean interpretation: permissive parsing for strings, truthiness otherwise.
    ///
    /// Returns `None` for strings that are not a recognised boolean spelling.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConditionValue::Text(s) => parse_bool(s),
            other => Some(other.truthy()),
        }
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Bool(true) => write!(f, "True"),
            ConditionValue::Bool(false) => write!(f, "False"),
            ConditionValue::Integer(n) => write!(f, "{}", n),
            ConditionValue::Float(n) => write!(f, "{}", n),
            ConditionValue::Text(s) => write!(f, "{}", s),
            ConditionValue::Instant(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Text(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        ConditionValue::Text(value)
    }
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        ConditionValue::Bool(value)
    }
}

impl From<i64> for ConditionValue {
    fn from(value: i64) -> Self {
        ConditionValue::Integer(value)
    }
}

impl From<DateTime<Utc>> for ConditionValue {
    fn from(value: DateTime<Utc>) -> Self {
        ConditionValue::Instant(value)
    }
}

/// Parse a boolean spelling.
///
/// Accepts `y`, `yes`, `t`, `true`, `on`, `1` and `n`, `no`, `f`, `false`,
/// `off`, `0`, case-insensitively, ignoring surrounding whitespace.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_true_spellings() {
        for s in ["True", "true", "t", "yes", "y", "on", "1", "true   ", " YES"] {
            assert_eq!(parse_bool(s), Some(true), "{s}");
        }
    }

    #[test]
    fn test_parse_bool_false_spellings() {
        for s in ["False", "false", "f", "no", "n", "off", "0"] {
            assert_eq!(parse_bool(s), Some(false), "{s}");
        }
    }

    #[test]
    fn test_parse_bool_rejects_other_strings() {
        assert_eq!(parse_bool("enabled"), None);
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn test_as_bool_non_string_uses_truthiness() {
        assert_eq!(ConditionValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ConditionValue::Integer(0).as_bool(), Some(false));
        assert_eq!(ConditionValue::Integer(7).as_bool(), Some(true));
        assert_eq!(ConditionValue::text("off").as_bool(), Some(false));
    }

    #[test]
    fn test_display_matches_stored_form() {
        assert_eq!(ConditionValue::Bool(true).to_string(), "True");
        assert_eq!(ConditionValue::Bool(false).to_string(), "False");
        assert_eq!(ConditionValue::text("/admin").to_string(), "/admin");
        assert_eq!(ConditionValue::Integer(3).to_string(), "3");
    }

    #[test]
    fn test_deserialize_scalars() {
        let v: ConditionValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, ConditionValue::Bool(true));
        let v: ConditionValue = serde_json::from_str("\"/foo\"").unwrap();
        assert_eq!(v, ConditionValue::text("/foo"));
        let v: ConditionValue = serde_json::from_str("1").unwrap();
        assert_eq!(v, ConditionValue::Integer(1));
    }
}
