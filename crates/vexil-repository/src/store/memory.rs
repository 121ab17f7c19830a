//! In-memory condition store

use std::sync::{Arc, PoisonError, RwLock};
use vexil_core::RecordId;

use super::{Listeners, RecordTable};
use crate::models::{ChangeEvent, ConditionRecord, NewConditionRecord};
use crate::traits::{ChangeListener, ConditionStore};
use crate::RepositoryResult;

/// Condition records held in process memory
///
/// Suited to tests and to deployments where dynamic conditions need not
/// survive a restart.
#[derive(Default)]
pub struct MemoryConditionStore {
    table: RwLock<RecordTable>,
    listeners: Listeners,
}

impl MemoryConditionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: Vec<NewConditionRecord>) -> RepositoryResult<Self> {
        let store = Self::new();
        for record in records {
            store.create(record)?;
        }
        Ok(store)
    }
}

impl ConditionStore for MemoryConditionStore {
    fn list(&self) -> RepositoryResult<Vec<ConditionRecord>> {
        Ok(self.table.read().unwrap_or_else(PoisonError::into_inner).list())
    }

    fn get(&self, id: RecordId) -> RepositoryResult<Option<ConditionRecord>> {
        Ok(self.table.read().unwrap_or_else(PoisonError::into_inner).get(id))
    }

    fn create(&self, record: NewConditionRecord) -> RepositoryResult<ConditionRecord> {
        let created = self
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .create(record)?;
        self.listeners.notify(ChangeEvent::Created(created.clone()));
        Ok(created)
    }

    fn update(&self, id: RecordId, record: NewConditionRecord) -> RepositoryResult<ConditionRecord> {
        let updated = self
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .update(id, record)?;
        self.listeners.notify(ChangeEvent::Updated(updated.clone()));
        Ok(updated)
    }

    fn delete(&self, id: RecordId) -> RepositoryResult<ConditionRecord> {
        let deleted = self
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .delete(id)?;
        self.listeners.notify(ChangeEvent::Deleted(deleted.clone()));
        Ok(deleted)
    }

    fn subscribe(&self, listener: Arc<dyn ChangeListener>) {
        self.listeners.add(listener);
    }
}
