//! Condition type names

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of a condition, by registered name
///
/// Built-in types get their own variant; anything else is carried as
/// `Custom` and resolved through the registry like the rest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionKind {
    Boolean,
    User,
    Anonymous,
    Parameter,
    PathMatches,
    BeforeDate,
    AfterDate,
    Custom(String),
}

impl ConditionKind {
    /// Every built-in kind, in registration order
    pub const BUILTIN: [ConditionKind; 7] = [
        ConditionKind::Boolean,
        ConditionKind::User,
        ConditionKind::Anonymous,
        ConditionKind::Parameter,
        ConditionKind::PathMatches,
        ConditionKind::AfterDate,
        ConditionKind::BeforeDate,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ConditionKind::Boolean => "boolean",
            ConditionKind::User => "user",
            ConditionKind::Anonymous => "anonymous",
            ConditionKind::Parameter => "parameter",
            ConditionKind::PathMatches => "path matches",
            ConditionKind::BeforeDate => "before date",
            ConditionKind::AfterDate => "after date",
            ConditionKind::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, ConditionKind::Custom(_))
    }
}

impl From<&str> for ConditionKind {
    fn from(name: &str) -> Self {
        match name {
            "boolean" => ConditionKind::Boolean,
            "user" => ConditionKind::User,
            "anonymous" => ConditionKind::Anonymous,
            "parameter" => ConditionKind::Parameter,
            "path matches" => ConditionKind::PathMatches,
            "before date" => ConditionKind::BeforeDate,
            "after date" => ConditionKind::AfterDate,
            other => ConditionKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for ConditionKind {
    fn from(name: String) -> Self {
        match ConditionKind::from(name.as_str()) {
            ConditionKind::Custom(_) => ConditionKind::Custom(name),
            kind => kind,
        }
    }
}

impl From<ConditionKind> for String {
    fn from(kind: ConditionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for kind in ConditionKind::BUILTIN {
            assert_eq!(ConditionKind::from(kind.as_str()), kind);
            assert!(kind.is_builtin());
        }
    }

    #[test]
    fn test_custom_kind() {
        let kind = ConditionKind::from("site");
        assert_eq!(kind, ConditionKind::Custom("site".to_string()));
        assert_eq!(kind.to_string(), "site");
        assert!(!kind.is_builtin());
    }
}
