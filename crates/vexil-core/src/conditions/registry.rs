//! Condition registry
//!
//! Maps condition type names to evaluators and optional validators. A
//! registry is built once at start-up and then shared read-only (usually
//! behind an `Arc`); registration needs `&mut self`, so a registry that is
//! already shared cannot change underneath its readers.

use super::builtin::{self, BuiltinOptions};
use super::kind::ConditionKind;
use crate::context::EvaluationContext;
use crate::error::{EvaluationError, RegistryError, ValidationError};
use crate::value::ConditionValue;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Validates a value before it is persisted or configured
pub type Validator = Arc<dyn Fn(&ConditionValue) -> Result<(), ValidationError> + Send + Sync>;

/// A predicate over a stored value and the evaluation context
///
/// Closures of the right shape implement this trait, so ad-hoc conditions can
/// be registered without a named type.
pub trait ConditionEvaluator: Send + Sync {
    fn evaluate(
        &self,
        value: &ConditionValue,
        ctx: &EvaluationContext,
    ) -> Result<bool, EvaluationError>;

    /// The validator this evaluator carries, used when registration does not
    /// supply one explicitly
    fn validator(&self) -> Option<Validator> {
        None
    }
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&ConditionValue, &EvaluationContext) -> Result<bool, EvaluationError> + Send + Sync,
{
    fn evaluate(
        &self,
        value: &ConditionValue,
        ctx: &EvaluationContext,
    ) -> Result<bool, EvaluationError> {
        self(value, ctx)
    }
}

/// An evaluator together with its effective validator
#[derive(Clone)]
pub struct RegisteredCondition {
    evaluator: Arc<dyn ConditionEvaluator>,
    validator: Option<Validator>,
}

impl RegisteredCondition {
    pub fn new(evaluator: Arc<dyn ConditionEvaluator>, validator: Option<Validator>) -> Self {
        let validator = validator.or_else(|| evaluator.validator());
        Self {
            evaluator,
            validator,
        }
    }

    pub fn evaluate(
        &self,
        value: &ConditionValue,
        ctx: &EvaluationContext,
    ) -> Result<bool, EvaluationError> {
        self.evaluator.evaluate(value, ctx)
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// Run the validator; values of a type without one always pass
    pub fn validate(&self, value: &ConditionValue) -> Result<(), ValidationError> {
        match &self.validator {
            Some(validator) => validator(value),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for RegisteredCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCondition")
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Registry of condition types
#[derive(Debug, Clone, Default)]
pub struct ConditionRegistry {
    conditions: HashMap<String, RegisteredCondition>,
}

impl ConditionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in conditions
    pub fn with_builtins() -> Self {
        Self::with_builtin_options(BuiltinOptions::default())
    }

    /// Create a registry holding the built-in conditions, configured
    pub fn with_builtin_options(options: BuiltinOptions) -> Self {
        let conditions = builtin::builtin_conditions(&options)
            .into_iter()
            .map(|(kind, condition)| (kind.as_str().to_string(), condition))
            .collect();
        Self { conditions }
    }

    /// Register a condition type.
    ///
    /// An explicit `validator` overrides whatever validator the evaluator
    /// carries. Fails if the name is taken; the existing entry is untouched.
    pub fn register<E>(
        &mut self,
        name: impl Into<String>,
        evaluator: E,
        validator: Option<Validator>,
    ) -> Result<(), RegistryError>
    where
        E: ConditionEvaluator + 'static,
    {
        let name = name.into();
        if self.conditions.contains_key(&name) {
            return Err(RegistryError::DuplicateCondition(name));
        }
        let entry = RegisteredCondition::new(Arc::new(evaluator), validator);
        self.conditions.insert(name, entry);
        Ok(())
    }

    /// Builder-style registration
    pub fn with_condition<E>(
        mut self,
        name: impl Into<String>,
        evaluator: E,
    ) -> Result<Self, RegistryError>
    where
        E: ConditionEvaluator + 'static,
    {
        self.register(name, evaluator, None)?;
        Ok(self)
    }

    /// Builder-style registration with an explicit validator
    pub fn with_validated_condition<E>(
        mut self,
        name: impl Into<String>,
        evaluator: E,
        validator: Validator,
    ) -> Result<Self, RegistryError>
    where
        E: ConditionEvaluator + 'static,
    {
        self.register(name, evaluator, Some(validator))?;
        Ok(self)
    }

    /// Look up a condition type; unknown names yield `None`
    pub fn get(&self, name: &str) -> Option<&RegisteredCondition> {
        self.conditions.get(name)
    }

    pub fn get_kind(&self, kind: &ConditionKind) -> Option<&RegisteredCondition> {
        self.get(kind.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.conditions.contains_key(name)
    }

    /// Names of all registered condition types
    pub fn names(&self) -> BTreeSet<String> {
        self.conditions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Validate a candidate value for a condition type.
    ///
    /// Used by configuration tooling before a value is ever persisted.
    pub fn validate(&self, name: &str, value: &ConditionValue) -> Result<(), ValidationError> {
        match self.get(name) {
            Some(condition) => condition.validate(value),
            None => Err(ValidationError::UnknownCondition(name.to_string())),
        }
    }
}
