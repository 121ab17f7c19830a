//! YAML file backed condition store

use path_absolutize::Absolutize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use vexil_core::RecordId;

use super::{Listeners, RecordTable};
use crate::models::{ChangeEvent, ConditionRecord, NewConditionRecord};
use crate::traits::{ChangeListener, ConditionStore};
use crate::{RepositoryError, RepositoryResult};

/// Condition records persisted to a YAML file
///
/// The whole file is rewritten on every write. A write that cannot be
/// persisted leaves both the file and the in-memory records unchanged.
pub struct FileConditionStore {
    path: PathBuf,
    table: RwLock<RecordTable>,
    listeners: Listeners,
}

impl FileConditionStore {
    /// Open a store, loading the file if it already exists
    ///
    /// # Example
    /// ```no_run
    /// use vexil_repository::FileConditionStore;
    ///
    /// let store = FileConditionStore::open("conditions.yaml").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path
            .as_ref()
            .absolutize()
            .map_err(|e| RepositoryError::Other(format!("Failed to absolutize path: {}", e)))?
            .to_path_buf();

        if path.is_dir() {
            return Err(RepositoryError::InvalidPath { path });
        }

        let table = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut table: RecordTable = if content.trim().is_empty() {
                RecordTable::default()
            } else {
                serde_yaml::from_str(&content)?
            };
            table.normalize();
            tracing::debug!(path = %path.display(), "loaded condition records");
            table
        } else {
            RecordTable::default()
        };

        Ok(Self {
            path,
            table: RwLock::new(table),
            listeners: Listeners::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, table: &RecordTable) -> RepositoryResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(table)?;
        let tmp = self.path.with_extension("yaml.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply `op` to a copy of the records, persist it, then publish it
    fn write_with<F>(&self, op: F) -> RepositoryResult<ConditionRecord>
    where
        F: FnOnce(&mut RecordTable) -> RepositoryResult<ConditionRecord>,
    {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = table.clone();
        let record = op(&mut next)?;
        self.persist(&next)?;
        *table = next;
        Ok(record)
    }
}

impl ConditionStore for FileConditionStore {
    fn list(&self) -> RepositoryResult<Vec<ConditionRecord>> {
        Ok(self.table.read().unwrap_or_else(PoisonError::into_inner).list())
    }

    fn get(&self, id: RecordId) -> RepositoryResult<Option<ConditionRecord>> {
        Ok(self.table.read().unwrap_or_else(PoisonError::into_inner).get(id))
    }

    fn create(&self, record: NewConditionRecord) -> RepositoryResult<ConditionRecord> {
        let created = self.write_with(|table| table.create(record))?;
        self.listeners.notify(ChangeEvent::Created(created.clone()));
        Ok(created)
    }

    fn update(&self, id: RecordId, record: NewConditionRecord) -> RepositoryResult<ConditionRecord> {
        let updated = self.write_with(|table| table.update(id, record))?;
        self.listeners.notify(ChangeEvent::Updated(updated.clone()));
        Ok(updated)
    }

    fn delete(&self, id: RecordId) -> RepositoryResult<ConditionRecord> {
        let deleted = self.write_with(|table| table.delete(id))?;
        self.listeners.notify(ChangeEvent::Deleted(deleted.clone()));
        Ok(deleted)
    }

    fn subscribe(&self, listener: Arc<dyn ChangeListener>) {
        self.listeners.add(listener);
    }
}
