//! Merging flag definitions from every source

use std::collections::BTreeMap;
use std::sync::Arc;
use vexil_core::Flag;
use vexil_repository::FlagSource;

use crate::error::{Result, SdkError};

/// Merged flags, by name
pub type FlagSet = BTreeMap<String, Flag>;

/// Combines the flags of an ordered list of sources
///
/// A flag defined by several sources gets the conditions of all of them,
/// in source order.
#[derive(Clone, Default)]
pub struct FlagAggregator {
    sources: Vec<Arc<dyn FlagSource>>,
}

impl FlagAggregator {
    pub fn new(sources: Vec<Arc<dyn FlagSource>>) -> Self {
        Self { sources }
    }

    pub fn with_source(mut self, source: Arc<dyn FlagSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources(&self) -> &[Arc<dyn FlagSource>] {
        &self.sources
    }

    /// Query every source and merge the results.
    ///
    /// A failing source aborts aggregation, unless `ignore_errors` is set, in
    /// which case its flags are left out.
    pub fn aggregate(&self, ignore_errors: bool) -> Result<FlagSet> {
        let mut flags = FlagSet::new();

        for source in &self.sources {
            let source_flags = match source.get_flags() {
                Ok(source_flags) => source_flags,
                Err(error) if ignore_errors => {
                    tracing::warn!(source = source.name(), %error, "skipping flag source");
                    continue;
                }
                Err(error) => {
                    return Err(SdkError::SourceFailure {
                        source_name: source.name().to_string(),
                        error,
                    })
                }
            };

            for (name, conditions) in source_flags {
                flags
                    .entry(name)
                    .or_insert_with_key(|name| Flag::new(name.as_str()))
                    .extend(conditions);
            }
        }

        tracing::debug!(sources = self.sources.len(), flags = flags.len(), "aggregated flags");
        Ok(flags)
    }
}
