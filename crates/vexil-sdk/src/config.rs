//! Configuration types for FlagEngine

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vexil_core::{CombinationPolicy, StateOptions};
use vexil_repository::{CacheConfig, FlagDefinitions};

use crate::error::{Result, SdkError};

/// The flags settings document
///
/// ```yaml
/// flags:
///   MY_FLAG:
///     - [boolean, true]
///     - [path matches, ^/beta, true]
/// sources: [settings, database]
/// state_logging: false
/// policy: required_and_optional
/// cache:
///   enabled: true
///   ttl_secs: 30
/// store:
///   type: file
///   path: conditions.yaml
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    /// Flags defined in configuration
    pub flags: FlagDefinitions,

    /// Flag sources, in aggregation order
    pub sources: Vec<SourceKind>,

    /// Log every flag evaluation at info level
    pub state_logging: bool,

    /// How condition results combine
    pub policy: CombinationPolicy,

    /// Process-wide cache of the aggregated flags
    pub cache: CacheSettings,

    /// Storage for dynamic conditions
    pub store: StoreConfig,
}

impl FlagsConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML settings document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| SdkError::Config(format!("Invalid flags settings: {}", e)))
    }

    /// Load a YAML settings file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Set the sources
    pub fn with_sources(mut self, sources: Vec<SourceKind>) -> Self {
        self.sources = sources;
        self
    }

    /// Set the combination policy
    pub fn with_policy(mut self, policy: CombinationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable state logging
    pub fn with_state_logging(mut self, enable: bool) -> Self {
        self.state_logging = enable;
        self
    }

    /// Set the condition store
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Options applied to every flag evaluation
    pub fn state_options(&self) -> StateOptions {
        StateOptions::default()
            .with_policy(self.policy)
            .with_logging(self.state_logging)
    }
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            flags: FlagDefinitions::new(),
            sources: vec![SourceKind::Settings, SourceKind::Database],
            state_logging: false,
            policy: CombinationPolicy::default(),
            cache: CacheSettings::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Flag source type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Flags from the `flags` section of the settings
    Settings,
    /// Flags from the condition store
    Database,
}

/// Cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: 60,
        }
    }
}

impl CacheSettings {
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            enabled: self.enabled,
            ttl: Duration::from_secs(self.ttl_secs),
        }
    }
}

/// Condition store settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-memory store
    #[default]
    Memory,
    /// YAML file store
    File { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FlagsConfig::default();
        assert_eq!(config.sources, vec![SourceKind::Settings, SourceKind::Database]);
        assert!(!config.state_logging);
        assert_eq!(config.policy, CombinationPolicy::RequiredAndOptional);
        assert!(!config.cache.enabled);
        assert_eq!(config.store, StoreConfig::Memory);
    }

    #[test]
    fn test_full_document() {
        let config = FlagsConfig::from_yaml_str(
            r#"
flags:
  MY_FLAG:
    - [boolean, true]
    - [path matches, ^/beta, true]
  OLD_FLAG:
    boolean: false
sources: [database]
state_logging: true
policy: any_condition
cache:
  enabled: true
  ttl_secs: 5
store:
  type: file
  path: /var/lib/vexil/conditions.yaml
"#,
        )
        .unwrap();

        assert_eq!(config.flags.len(), 2);
        assert!(config.flags["OLD_FLAG"].is_legacy());
        assert_eq!(config.sources, vec![SourceKind::Database]);
        assert_eq!(config.policy, CombinationPolicy::AnyCondition);
        assert_eq!(config.cache.to_cache_config().ttl, Duration::from_secs(5));
        assert_eq!(
            config.store,
            StoreConfig::File {
                path: PathBuf::from("/var/lib/vexil/conditions.yaml")
            }
        );

        let options = config.state_options();
        assert!(options.log_state);
        assert_eq!(options.policy, CombinationPolicy::AnyCondition);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = FlagsConfig::from_yaml_str("state_logging: true\n").unwrap();
        assert!(config.state_logging);
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_invalid_document() {
        let result = FlagsConfig::from_yaml_str("policy: sometimes\n");
        assert!(matches!(result, Err(SdkError::Config(_))));
    }
}
