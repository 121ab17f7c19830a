//! Flags defined by stored condition records

use std::sync::Arc;

use crate::traits::{ConditionStore, FlagMap, FlagSource};
use crate::RepositoryResult;

/// Flag source over a [`ConditionStore`]
///
/// Produces one condition per record, each tagged with its record id so
/// tooling can edit or delete the exact record behind it.
#[derive(Clone)]
pub struct DatabaseFlagSource {
    store: Arc<dyn ConditionStore>,
}

impl DatabaseFlagSource {
    pub fn new(store: Arc<dyn ConditionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ConditionStore> {
        &self.store
    }
}

impl FlagSource for DatabaseFlagSource {
    fn name(&self) -> &str {
        "database"
    }

    fn get_flags(&self) -> RepositoryResult<FlagMap> {
        let mut flags = FlagMap::new();
        for record in self.store.list()? {
            flags
                .entry(record.name.clone())
                .or_default()
                .push(record.to_condition());
        }
        Ok(flags)
    }
}
