//! Condition store implementations
//!
//! - [`MemoryConditionStore`]: records live in process memory
//! - [`FileConditionStore`]: records persisted to a YAML file

mod file;
mod memory;

pub use file::FileConditionStore;
pub use memory::MemoryConditionStore;

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use vexil_core::RecordId;

use crate::models::{ChangeEvent, ConditionRecord, NewConditionRecord};
use crate::traits::ChangeListener;
use crate::{RepositoryError, RepositoryResult};

/// The record set shared by both stores, serialized as the file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RecordTable {
    #[serde(default)]
    next_id: u64,

    #[serde(default)]
    records: Vec<ConditionRecord>,
}

impl RecordTable {
    /// Repair `next_id` after loading a hand-edited file
    pub(crate) fn normalize(&mut self) {
        self.records.sort_by_key(|r| r.id);
        let max_id = self.records.iter().map(|r| r.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id);
    }

    pub(crate) fn list(&self) -> Vec<ConditionRecord> {
        self.records.clone()
    }

    pub(crate) fn get(&self, id: RecordId) -> Option<ConditionRecord> {
        self.records.iter().find(|r| r.id == id).cloned()
    }

    fn ensure_unique(&self, fields: &NewConditionRecord, except: Option<RecordId>) -> RepositoryResult<()> {
        let clash = self
            .records
            .iter()
            .any(|r| Some(r.id) != except && r.same_key(fields));
        if clash {
            return Err(RepositoryError::DuplicateRecord {
                name: fields.name.clone(),
                condition: fields.condition.clone(),
                value: fields.value.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn create(&mut self, fields: NewConditionRecord) -> RepositoryResult<ConditionRecord> {
        self.ensure_unique(&fields, None)?;
        self.next_id += 1;
        let record = ConditionRecord {
            id: RecordId(self.next_id),
            name: fields.name,
            condition: fields.condition,
            value: fields.value,
            required: fields.required,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    pub(crate) fn update(
        &mut self,
        id: RecordId,
        fields: NewConditionRecord,
    ) -> RepositoryResult<ConditionRecord> {
        self.ensure_unique(&fields, Some(id))?;
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::RecordNotFound { id })?;
        record.name = fields.name;
        record.condition = fields.condition;
        record.value = fields.value;
        record.required = fields.required;
        Ok(record.clone())
    }

    pub(crate) fn delete(&mut self, id: RecordId) -> RepositoryResult<ConditionRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(RepositoryError::RecordNotFound { id })?;
        Ok(self.records.remove(index))
    }
}

/// Subscribed change listeners
#[derive(Default)]
pub(crate) struct Listeners {
    inner: RwLock<Vec<Arc<dyn ChangeListener>>>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: Arc<dyn ChangeListener>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub(crate) fn notify(&self, event: ChangeEvent) {
        tracing::debug!(flag = event.flag_name(), record = %event.record().id, "condition store changed");
        let listeners = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener.on_change(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase_and_survive_deletes() {
        let mut table = RecordTable::default();
        let a = table.create(NewConditionRecord::new("F", "boolean", "True")).unwrap();
        let b = table.create(NewConditionRecord::new("F", "user", "alice")).unwrap();
        assert_eq!((a.id, b.id), (RecordId(1), RecordId(2)));

        table.delete(b.id).unwrap();
        let c = table.create(NewConditionRecord::new("F", "user", "bob")).unwrap();
        assert_eq!(c.id, RecordId(3));
    }

    #[test]
    fn test_unique_key() {
        let mut table = RecordTable::default();
        table.create(NewConditionRecord::new("F", "boolean", "True")).unwrap();
        let err = table
            .create(NewConditionRecord::new("F", "boolean", "True").with_required(true))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateRecord { .. }));

        // same key on another flag is fine
        table.create(NewConditionRecord::new("G", "boolean", "True")).unwrap();
    }

    #[test]
    fn test_update_to_own_key_allowed() {
        let mut table = RecordTable::default();
        let record = table.create(NewConditionRecord::new("F", "boolean", "True")).unwrap();
        let updated = table
            .update(record.id, record.fields().with_required(true))
            .unwrap();
        assert!(updated.required);
    }

    #[test]
    fn test_normalize_repairs_next_id() {
        let mut table = RecordTable {
            next_id: 0,
            records: vec![ConditionRecord {
                id: RecordId(9),
                name: "F".to_string(),
                condition: "boolean".to_string(),
                value: "True".to_string(),
                required: false,
            }],
        };
        table.normalize();
        let record = table.create(NewConditionRecord::new("F", "user", "alice")).unwrap();
        assert_eq!(record.id, RecordId(10));
    }
}
