//! Builder pattern for FlagEngine

use std::sync::Arc;
use vexil_core::{CombinationPolicy, ConditionRegistry};
use vexil_repository::{
    CacheConfig, ConditionStore, DatabaseFlagSource, FileConditionStore, FlagSource,
    MemoryConditionStore, SettingsFlagSource,
};

use crate::aggregator::FlagAggregator;
use crate::cache::FlagCache;
use crate::config::{FlagsConfig, SourceKind, StoreConfig};
use crate::engine::FlagEngine;
use crate::error::Result;
use crate::layers::EvaluationLayer;

/// Builder for FlagEngine
///
/// # Example
///
/// ```rust,ignore
/// use vexil_sdk::{FlagEngineBuilder, FlagsConfig};
///
/// // From a settings file
/// let engine = FlagEngineBuilder::new()
///     .with_config(FlagsConfig::from_file("flags.yaml")?)
///     .build()?;
///
/// // With a custom condition
/// let registry = ConditionRegistry::with_builtins()
///     .with_condition("site", SiteCondition)?;
/// let engine = FlagEngineBuilder::new()
///     .with_registry(registry)
///     .with_flags_yaml("MY_FLAG:\n  - [site, blog]\n")?
///     .build()?;
/// ```
pub struct FlagEngineBuilder {
    config: FlagsConfig,
    registry: Option<Arc<ConditionRegistry>>,
    store: Option<Arc<dyn ConditionStore>>,
    extra_sources: Vec<Arc<dyn FlagSource>>,
    layers: Vec<Arc<dyn EvaluationLayer>>,
}

impl FlagEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: FlagsConfig::new(),
            registry: None,
            store: None,
            extra_sources: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: FlagsConfig) -> Self {
        self.config = config;
        self
    }

    /// Add flag definitions from a YAML mapping of flag name to conditions
    pub fn with_flags_yaml(mut self, content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(self);
        }
        let definitions: vexil_repository::FlagDefinitions = serde_yaml::from_str(content)
            .map_err(|e| crate::SdkError::Config(format!("Invalid flag definitions: {}", e)))?;
        self.config.flags.extend(definitions);
        Ok(self)
    }

    /// Use this registry instead of the built-in conditions only
    pub fn with_registry(mut self, registry: ConditionRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// Use a registry shared with other components
    pub fn with_shared_registry(mut self, registry: Arc<ConditionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use this condition store instead of the configured one
    pub fn with_store(mut self, store: Arc<dyn ConditionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Add a source after the configured ones
    pub fn add_source(mut self, source: Arc<dyn FlagSource>) -> Self {
        self.extra_sources.push(source);
        self
    }

    /// Wrap every state query in a layer; the first added is outermost
    pub fn with_layer(mut self, layer: Arc<dyn EvaluationLayer>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Set the combination policy
    pub fn with_policy(mut self, policy: CombinationPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Log every evaluation
    pub fn enable_state_logging(mut self, enable: bool) -> Self {
        self.config.state_logging = enable;
        self
    }

    /// Set the process-wide cache
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache.enabled = cache.enabled;
        self.config.cache.ttl_secs = cache.ttl.as_secs();
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<FlagEngine> {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ConditionRegistry::with_builtins()));

        let cache = Arc::new(FlagCache::new(self.config.cache.to_cache_config()));

        let mut sources: Vec<Arc<dyn FlagSource>> = Vec::new();
        let mut database_store = None;
        let mut store = self.store;

        for kind in &self.config.sources {
            match kind {
                SourceKind::Settings => {
                    sources.push(Arc::new(SettingsFlagSource::new(self.config.flags.clone())));
                }
                SourceKind::Database => {
                    let db_store = match store.take() {
                        Some(store) => store,
                        None => open_store(&self.config.store)?,
                    };
                    db_store.subscribe(cache.clone());
                    sources.push(Arc::new(DatabaseFlagSource::new(Arc::clone(&db_store))));
                    database_store = Some(db_store);
                }
            }
        }
        sources.extend(self.extra_sources);

        tracing::info!(
            sources = sources.len(),
            conditions = registry.len(),
            policy = ?self.config.policy,
            cache = self.config.cache.enabled,
            "flag engine ready"
        );

        Ok(FlagEngine::from_parts(
            registry,
            FlagAggregator::new(sources),
            database_store,
            cache,
            self.layers,
            self.config.state_options(),
        ))
    }
}

impl Default for FlagEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn open_store(config: &StoreConfig) -> Result<Arc<dyn ConditionStore>> {
    Ok(match config {
        StoreConfig::Memory => Arc::new(MemoryConditionStore::new()),
        StoreConfig::File { path } => Arc::new(FileConditionStore::open(path)?),
    })
}
