//! Condition value object

use crate::conditions::{ConditionKind, ConditionRegistry};
use crate::context::EvaluationContext;
use crate::error::EvaluationError;
use crate::value::ConditionValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a persisted condition record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One condition of a flag: a condition type bound to a stored value
///
/// Conditions are rebuilt on every aggregation pass and never mutated.
/// Equality only looks at the type and the value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "condition")]
    pub kind: ConditionKind,

    pub value: ConditionValue,

    #[serde(default)]
    pub required: bool,

    /// The persisted record this condition was read from, if any
    #[serde(skip)]
    pub record: Option<RecordId>,
}

impl Condition {
    /// Create an optional condition
    pub fn new(kind: impl Into<ConditionKind>, value: impl Into<ConditionValue>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            required: false,
            record: None,
        }
    }

    /// Create a required condition
    pub fn required(kind: impl Into<ConditionKind>, value: impl Into<ConditionValue>) -> Self {
        Self::new(kind, value).with_required(true)
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_record(mut self, record: RecordId) -> Self {
        self.record = Some(record);
        self
    }

    /// Evaluate this condition.
    ///
    /// Returns `Ok(None)` when the condition type is not registered; such a
    /// condition never passes, but does not break the flag it belongs to.
    pub fn check(
        &self,
        registry: &ConditionRegistry,
        ctx: &EvaluationContext,
    ) -> Result<Option<bool>, EvaluationError> {
        match registry.get_kind(&self.kind) {
            Some(condition) => condition.evaluate(&self.value, ctx).map(Some),
            None => Ok(None),
        }
    }

    pub fn is_registered(&self, registry: &ConditionRegistry) -> bool {
        registry.get_kind(&self.kind).is_some()
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is {}", self.kind, self.value)?;
        if self.required {
            write!(f, " (required)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;

    #[test]
    fn test_equality_ignores_required_and_record() {
        let a = Condition::new("boolean", "True");
        let b = Condition::required("boolean", "True").with_record(RecordId(4));
        assert_eq!(a, b);
        assert_ne!(a, Condition::new("boolean", "False"));
        assert_ne!(a, Condition::new("parameter", "True"));
    }

    #[test]
    fn test_check_registered() {
        let registry = ConditionRegistry::with_builtins();
        let ctx = EvaluationContext::new();
        assert_eq!(Condition::new("boolean", true).check(&registry, &ctx), Ok(Some(true)));
        assert_eq!(Condition::new("boolean", "off").check(&registry, &ctx), Ok(Some(false)));
    }

    #[test]
    fn test_check_unknown_condition_is_none() {
        let registry = ConditionRegistry::with_builtins();
        let condition = Condition::new("nonexistent", "value");
        assert_eq!(condition.check(&registry, &EvaluationContext::new()), Ok(None));
        assert!(!condition.is_registered(&registry));
    }

    #[test]
    fn test_check_propagates_missing_context() {
        let registry = ConditionRegistry::with_builtins();
        let condition = Condition::new("path matches", "/admin");
        assert!(condition.check(&registry, &EvaluationContext::new()).is_err());

        let ctx = EvaluationContext::for_request(RequestContext::new("/admin/users"));
        assert_eq!(condition.check(&registry, &ctx), Ok(Some(true)));
    }

    #[test]
    fn test_deserialize_explicit_form() {
        let condition: Condition =
            serde_json::from_str(r#"{"condition": "path matches", "value": "^/beta", "required": true}"#)
                .unwrap();
        assert_eq!(condition.kind, ConditionKind::PathMatches);
        assert!(condition.required);
        assert!(condition.record.is_none());

        let condition: Condition =
            serde_json::from_str(r#"{"condition": "boolean", "value": true}"#).unwrap();
        assert!(!condition.required);
    }

    #[test]
    fn test_display() {
        assert_eq!(Condition::required("user", "alice").to_string(), "user is alice (required)");
    }
}
