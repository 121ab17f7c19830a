//! Flag aggregate and the condition combination algorithm

use crate::condition::Condition;
use crate::conditions::{ConditionKind, ConditionRegistry};
use crate::context::EvaluationContext;
use crate::error::EvaluationError;
use serde::{Deserialize, Serialize};

/// How the results of a flag's conditions combine into its state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationPolicy {
    /// All required conditions must pass, and at least one optional
    /// condition must pass if there are any.
    #[default]
    RequiredAndOptional,

    /// Any passing condition turns the flag on; `required` is ignored.
    AnyCondition,
}

impl CombinationPolicy {
    /// Combine per-condition results, given as `(required, result)` pairs.
    ///
    /// `None` results (unregistered condition types) count as falsy.
    pub fn combine<I>(self, results: I) -> bool
    where
        I: IntoIterator<Item = (bool, Option<bool>)>,
    {
        let mut any_condition = false;
        let mut any_optional = false;
        let mut optional_passed = false;
        let mut required_passed = true;

        for (required, result) in results {
            let passed = result.unwrap_or(false);
            any_condition = true;
            match self {
                CombinationPolicy::AnyCondition => optional_passed |= passed,
                CombinationPolicy::RequiredAndOptional if required => required_passed &= passed,
                CombinationPolicy::RequiredAndOptional => {
                    any_optional = true;
                    optional_passed |= passed;
                }
            }
        }

        if !any_condition {
            return false;
        }
        match self {
            CombinationPolicy::AnyCondition => optional_passed,
            CombinationPolicy::RequiredAndOptional => {
                (optional_passed || !any_optional) && required_passed
            }
        }
    }
}

/// Options for a single state evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateOptions {
    pub policy: CombinationPolicy,

    /// Emit an info record with the result and every condition's outcome
    pub log_state: bool,
}

impl StateOptions {
    pub fn with_policy(mut self, policy: CombinationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_logging(mut self, log_state: bool) -> Self {
        self.log_state = log_state;
        self
    }
}

/// A named feature flag and the conditions collected for it from every source
///
/// A flag's identity is its name; two flags with the same name compare equal
/// whatever their conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    pub conditions: Vec<Condition>,
}

impl Flag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
        }
    }

    pub fn with_conditions(name: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self {
            name: name.into(),
            conditions,
        }
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn extend(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        self.conditions.extend(conditions);
    }

    pub fn required_conditions(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter().filter(|c| c.required)
    }

    pub fn optional_conditions(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter().filter(|c| !c.required)
    }

    pub fn boolean_conditions(&self) -> impl Iterator<Item = &Condition> {
        self.conditions
            .iter()
            .filter(|c| c.kind == ConditionKind::Boolean)
    }

    /// Evaluate the flag with the default policy, propagating evaluator errors
    pub fn try_check_state(
        &self,
        registry: &ConditionRegistry,
        ctx: &EvaluationContext,
    ) -> Result<bool, EvaluationError> {
        self.try_check_state_with(registry, ctx, StateOptions::default())
    }

    /// Evaluate the flag, propagating the first evaluator error.
    ///
    /// Evaluation stops at that error and no audit record is written.
    pub fn try_check_state_with(
        &self,
        registry: &ConditionRegistry,
        ctx: &EvaluationContext,
        options: StateOptions,
    ) -> Result<bool, EvaluationError> {
        let results = self
            .conditions
            .iter()
            .map(|c| c.check(registry, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.combine(&results, options))
    }

    /// Evaluate the flag with the default policy; evaluator errors count as falsy
    pub fn check_state(&self, registry: &ConditionRegistry, ctx: &EvaluationContext) -> bool {
        self.check_state_with(registry, ctx, StateOptions::default())
    }

    /// Evaluate the flag, treating any condition that fails to evaluate as
    /// not passing.
    pub fn check_state_with(
        &self,
        registry: &ConditionRegistry,
        ctx: &EvaluationContext,
        options: StateOptions,
    ) -> bool {
        let results: Vec<Option<bool>> = self
            .conditions
            .iter()
            .map(|c| match c.check(registry, ctx) {
                Ok(result) => result,
                Err(e) => {
                    log::warn!("Flag {} condition '{}' not evaluated: {}", self.name, c.kind, e);
                    Some(false)
                }
            })
            .collect();
        self.combine(&results, options)
    }

    fn combine(&self, results: &[Option<bool>], options: StateOptions) -> bool {
        let state = options.policy.combine(
            self.conditions
                .iter()
                .zip(results)
                .map(|(c, result)| (c.required, *result)),
        );

        if options.log_state {
            let outcomes = self
                .conditions
                .iter()
                .zip(results)
                .map(|(c, result)| match result {
                    Some(passed) => format!("{} {}", c.kind, passed),
                    None => format!("{} unregistered", c.kind),
                })
                .collect::<Vec<_>>()
                .join(", ");
            log::info!(
                target: "vexil::state",
                "Flag {} evaluated {} with condition(s): {}",
                self.name,
                state,
                outcomes
            );
        }

        state
    }
}

impl PartialEq for Flag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Flag {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_empty_is_false() {
        assert!(!CombinationPolicy::RequiredAndOptional.combine([]));
        assert!(!CombinationPolicy::AnyCondition.combine([]));
    }

    #[test]
    fn test_combine_required_and_optional() {
        let policy = CombinationPolicy::RequiredAndOptional;
        assert!(policy.combine([(false, Some(false)), (false, Some(true))]));
        assert!(!policy.combine([(true, Some(true)), (true, Some(false))]));
        assert!(policy.combine([(true, Some(true)), (false, Some(true))]));
        assert!(!policy.combine([(true, Some(true)), (false, Some(false))]));
        assert!(!policy.combine([(true, None)]));
        assert!(!policy.combine([(false, None)]));
    }

    #[test]
    fn test_combine_any_condition_ignores_required() {
        let policy = CombinationPolicy::AnyCondition;
        assert!(policy.combine([(true, Some(false)), (true, Some(true))]));
        assert!(!policy.combine([(true, Some(false)), (false, None)]));
    }

    #[test]
    fn test_flag_identity_is_name() {
        let a = Flag::with_conditions("F", vec![Condition::new("boolean", true)]);
        let b = Flag::new("F");
        assert_eq!(a, b);
        assert_ne!(a, Flag::new("G"));
    }

    #[test]
    fn test_policy_serde_names() {
        let policy: CombinationPolicy = serde_json::from_str("\"any_condition\"").unwrap();
        assert_eq!(policy, CombinationPolicy::AnyCondition);
        assert_eq!(
            serde_json::to_string(&CombinationPolicy::RequiredAndOptional).unwrap(),
            "\"required_and_optional\""
        );
    }
}
