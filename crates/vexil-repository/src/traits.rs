//! Core trait definitions for flag sources and condition stores
//!
//! - [`FlagSource`]: anything that can produce flag definitions
//! - [`ConditionStore`]: mutable storage for condition records
//! - [`ChangeListener`]: notified after every store write
//!
//! All traits are synchronous; flag evaluation never suspends.

use std::collections::BTreeMap;
use std::sync::Arc;
use vexil_core::{Condition, RecordId};

use crate::models::{ChangeEvent, ConditionRecord, NewConditionRecord};
use crate::RepositoryResult;

/// Conditions per flag name, as produced by one source
pub type FlagMap = BTreeMap<String, Vec<Condition>>;

/// A provider of flag definitions
///
/// Implementations must be `Send + Sync` so one engine can serve many
/// concurrent callers.
pub trait FlagSource: Send + Sync {
    /// Short name used in logs and error reports
    fn name(&self) -> &str;

    /// Every flag this source defines, with its conditions
    fn get_flags(&self) -> RepositoryResult<FlagMap>;
}

/// Receives notifications about store writes
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

/// Mutable storage of condition records
///
/// Stores enforce the (name, condition, value) uniqueness constraint and
/// notify subscribed listeners after every successful write.
pub trait ConditionStore: Send + Sync {
    /// All records, ordered by id
    fn list(&self) -> RepositoryResult<Vec<ConditionRecord>>;

    /// Records of one flag, ordered by id
    fn list_for_flag(&self, name: &str) -> RepositoryResult<Vec<ConditionRecord>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|record| record.name == name)
            .collect())
    }

    fn get(&self, id: RecordId) -> RepositoryResult<Option<ConditionRecord>>;

    fn create(&self, record: NewConditionRecord) -> RepositoryResult<ConditionRecord>;

    fn update(&self, id: RecordId, record: NewConditionRecord) -> RepositoryResult<ConditionRecord>;

    fn delete(&self, id: RecordId) -> RepositoryResult<ConditionRecord>;

    /// Register a listener for subsequent writes
    fn subscribe(&self, listener: Arc<dyn ChangeListener>);
}
