//! Flag engine - the main entry point
//!
//! Answers "is flag X on for this context?" and offers the write operations
//! used by operational tooling.

use std::sync::Arc;
use vexil_core::describe::state_description;
use vexil_core::{
    ConditionKind, ConditionRegistry, ConditionValue, Flag, RecordId, StateOptions,
};
use vexil_repository::{ConditionRecord, ConditionStore, NewConditionRecord};

use crate::aggregator::{FlagAggregator, FlagSet};
use crate::cache::{EvaluationScope, FlagCache};
use crate::checks::{check_flag_conditions, CheckWarning};
use crate::error::{Result, SdkError};
use crate::layers::{EvaluationLayer, Next};

/// Flag engine
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct FlagEngine {
    registry: Arc<ConditionRegistry>,
    aggregator: FlagAggregator,
    store: Option<Arc<dyn ConditionStore>>,
    cache: Arc<FlagCache>,
    layers: Vec<Arc<dyn EvaluationLayer>>,
    options: StateOptions,
}

impl FlagEngine {
    pub(crate) fn from_parts(
        registry: Arc<ConditionRegistry>,
        aggregator: FlagAggregator,
        store: Option<Arc<dyn ConditionStore>>,
        cache: Arc<FlagCache>,
        layers: Vec<Arc<dyn EvaluationLayer>>,
        options: StateOptions,
    ) -> Self {
        Self {
            registry,
            aggregator,
            store,
            cache,
            layers,
            options,
        }
    }

    pub fn registry(&self) -> &Arc<ConditionRegistry> {
        &self.registry
    }

    pub fn aggregator(&self) -> &FlagAggregator {
        &self.aggregator
    }

    /// The condition store read by the database source, if configured
    pub fn store(&self) -> Option<&Arc<dyn ConditionStore>> {
        self.store.as_ref()
    }

    pub fn cache(&self) -> &Arc<FlagCache> {
        &self.cache
    }

    pub fn options(&self) -> StateOptions {
        self.options
    }

    // ========== Flag definitions ==========

    /// Aggregated flags, through the process-wide cache
    pub fn all_flags(&self) -> Result<Arc<FlagSet>> {
        if let Some(flags) = self.cache.get() {
            return Ok(flags);
        }
        let generation = self.cache.generation();
        let flags = Arc::new(self.aggregator.aggregate(false)?);
        self.cache.insert(generation, Arc::clone(&flags));
        Ok(flags)
    }

    /// Aggregated flags for a scope, memoized when the scope is a request scope
    pub fn get_flags<S>(&self, scope: &S) -> Result<Arc<FlagSet>>
    where
        S: EvaluationScope + ?Sized,
    {
        match scope.memo() {
            Some(memo) => memo.get_or_try_insert(|| self.all_flags()),
            None => self.all_flags(),
        }
    }

    pub fn get_flag<S>(&self, name: &str, scope: &S) -> Result<Option<Flag>>
    where
        S: EvaluationScope + ?Sized,
    {
        Ok(self.get_flags(scope)?.get(name).cloned())
    }

    // ========== State queries ==========

    /// State of a flag; `None` if no source defines it.
    ///
    /// Condition evaluation errors are returned, not swallowed.
    pub fn flag_state<S>(&self, name: &str, scope: &S) -> Result<Option<bool>>
    where
        S: EvaluationScope + ?Sized,
    {
        self.query(name, scope, true)
    }

    /// Whether a flag is on. Unknown flags, and failures, count as off.
    pub fn flag_enabled<S>(&self, name: &str, scope: &S) -> bool
    where
        S: EvaluationScope + ?Sized,
    {
        match self.query(name, scope, false) {
            Ok(state) => state.unwrap_or(false),
            Err(error) => {
                tracing::warn!(flag = name, %error, "flag state unavailable, treating as off");
                false
            }
        }
    }

    /// Whether a flag is off. Unknown flags count as off.
    pub fn flag_disabled<S>(&self, name: &str, scope: &S) -> bool
    where
        S: EvaluationScope + ?Sized,
    {
        !self.flag_enabled(name, scope)
    }

    /// Whether every named flag is on
    pub fn flags_enabled<S, I, N>(&self, names: I, scope: &S) -> bool
    where
        S: EvaluationScope + ?Sized,
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        names
            .into_iter()
            .all(|name| self.flag_enabled(name.as_ref(), scope))
    }

    fn query<S>(&self, name: &str, scope: &S, strict: bool) -> Result<Option<bool>>
    where
        S: EvaluationScope + ?Sized,
    {
        let ctx = scope.context();
        let lookup = || -> Result<Option<bool>> {
            let flags = self.get_flags(scope)?;
            let Some(flag) = flags.get(name) else {
                return Ok(None);
            };
            if strict {
                Ok(Some(flag.try_check_state_with(&self.registry, ctx, self.options)?))
            } else {
                Ok(Some(flag.check_state_with(&self.registry, ctx, self.options)))
            }
        };
        Next::new(name, ctx, &self.layers, &lookup).run()
    }

    /// Plain-text description of when a flag is on
    pub fn describe_flag(&self, name: &str) -> Result<Option<String>> {
        let flags = self.all_flags()?;
        Ok(flags
            .get(name)
            .map(|flag| state_description(flag, &self.registry)))
    }

    // ========== Diagnostics ==========

    /// Conditions that reference unregistered types
    pub fn check_conditions(&self) -> Vec<CheckWarning> {
        check_flag_conditions(&self.aggregator, &self.registry)
    }

    /// Validate a candidate value for a condition type
    pub fn validate_condition(&self, condition: &str, value: &str) -> Result<()> {
        self.registry
            .validate(condition, &ConditionValue::text(value))
            .map_err(SdkError::from)
    }

    // ========== Writes ==========

    fn writable_store(&self) -> Result<&Arc<dyn ConditionStore>> {
        self.store.as_ref().ok_or_else(|| {
            SdkError::Config("no database flag source is configured".to_string())
        })
    }

    /// Store a new condition after validating its value
    pub fn create_condition(&self, record: NewConditionRecord) -> Result<ConditionRecord> {
        let store = self.writable_store()?;
        self.validate_condition(&record.condition, &record.value)?;
        let created = store.create(record)?;
        tracing::info!(flag = %created.name, condition = %created.condition, id = %created.id, "created flag condition");
        Ok(created)
    }

    /// Replace a stored condition after validating its value
    pub fn update_condition(&self, id: RecordId, record: NewConditionRecord) -> Result<ConditionRecord> {
        let store = self.writable_store()?;
        self.validate_condition(&record.condition, &record.value)?;
        let updated = store.update(id, record)?;
        tracing::info!(flag = %updated.name, condition = %updated.condition, id = %updated.id, "updated flag condition");
        Ok(updated)
    }

    pub fn delete_condition(&self, id: RecordId) -> Result<ConditionRecord> {
        let deleted = self.writable_store()?.delete(id)?;
        tracing::info!(flag = %deleted.name, condition = %deleted.condition, id = %deleted.id, "deleted flag condition");
        Ok(deleted)
    }

    /// Turn a flag on through its stored boolean condition
    ///
    /// When the flag has no stored boolean condition, one is created if
    /// `create_boolean_condition` is set.
    pub fn enable_flag(&self, name: &str, create_boolean_condition: bool) -> Result<ConditionRecord> {
        self.set_boolean(name, true, create_boolean_condition)
    }

    /// Turn a flag off through its stored boolean condition
    pub fn disable_flag(&self, name: &str, create_boolean_condition: bool) -> Result<ConditionRecord> {
        self.set_boolean(name, false, create_boolean_condition)
    }

    /// Leave the flag with exactly one stored boolean condition, holding
    /// `enabled`.
    ///
    /// Other boolean records of the flag are deleted: once they carried the
    /// same value they would clash on (name, condition, value). The record
    /// kept is one already holding the target value, else the lowest id, and
    /// it is required if any boolean record was.
    fn set_boolean(&self, name: &str, enabled: bool, create: bool) -> Result<ConditionRecord> {
        let flags = self.aggregator.aggregate(false)?;
        if !flags.contains_key(name) {
            return Err(SdkError::FlagNotFound(name.to_string()));
        }

        let store = self.writable_store()?;
        let value = ConditionValue::Bool(enabled).to_string();
        let mut booleans: Vec<ConditionRecord> = store
            .list_for_flag(name)?
            .into_iter()
            .filter(|r| ConditionKind::from(r.condition.as_str()) == ConditionKind::Boolean)
            .collect();
        booleans.sort_by_key(|r| r.id);

        if booleans.is_empty() {
            if !create {
                return Err(SdkError::NoBooleanCondition(name.to_string()));
            }
            let record = store.create(NewConditionRecord::new(
                name,
                ConditionKind::Boolean.as_str(),
                value,
            ))?;
            tracing::info!(flag = name, enabled, id = %record.id, "created flag boolean condition");
            return Ok(record);
        }

        let required = booleans.iter().any(|r| r.required);
        let keep = booleans
            .iter()
            .position(|r| r.value == value)
            .unwrap_or(0);
        let kept = booleans.swap_remove(keep);

        for other in booleans {
            store.delete(other.id)?;
            tracing::info!(flag = name, id = %other.id, "removed extra flag boolean condition");
        }

        let record = if kept.value == value && kept.required == required {
            kept
        } else {
            let mut fields = kept.fields();
            fields.value = value;
            fields.required = required;
            store.update(kept.id, fields)?
        };

        tracing::info!(flag = name, enabled, id = %record.id, "set flag boolean condition");
        Ok(record)
    }
}

impl std::fmt::Debug for FlagEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagEngine")
            .field("sources", &self.aggregator.sources().len())
            .field("conditions", &self.registry.len())
            .field("has_store", &self.store.is_some())
            .field("layers", &self.layers.len())
            .field("options", &self.options)
            .finish()
    }
}

