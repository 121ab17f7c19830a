//! Flags defined in static configuration
//!
//! Each flag maps to a list of condition entries, in any of these forms:
//!
//! ```yaml
//! MY_FLAG:
//!   - [boolean, true]                   # (type, value)
//!   - [path matches, ^/beta, true]      # (type, value, required)
//!   - condition: parameter              # explicit form
//!     value: preview
//!     required: false
//! ```
//!
//! The older mapping form (`MY_FLAG: {boolean: true}`) is still accepted,
//! with a deprecation warning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use vexil_core::{Condition, ConditionValue};

use crate::traits::{FlagMap, FlagSource};
use crate::{RepositoryError, RepositoryResult};

/// One configured condition entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionEntry {
    Explicit(Condition),
    WithRequired(String, ConditionValue, bool),
    Pair(String, ConditionValue),
}

impl ConditionEntry {
    pub fn into_condition(self) -> Condition {
        match self {
            ConditionEntry::Explicit(condition) => condition,
            ConditionEntry::WithRequired(kind, value, required) => {
                Condition::new(kind, value).with_required(required)
            }
            ConditionEntry::Pair(kind, value) => Condition::new(kind, value),
        }
    }
}

impl From<Condition> for ConditionEntry {
    fn from(condition: Condition) -> Self {
        ConditionEntry::Explicit(condition)
    }
}

/// The configured definition of one flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagDefinition {
    Entries(Vec<ConditionEntry>),

    /// `{condition: value}` mapping; deprecated
    Legacy(BTreeMap<String, ConditionValue>),
}

impl Default for FlagDefinition {
    fn default() -> Self {
        FlagDefinition::Entries(Vec::new())
    }
}

impl FlagDefinition {
    pub fn is_legacy(&self) -> bool {
        matches!(self, FlagDefinition::Legacy(_))
    }

    pub fn into_conditions(self) -> Vec<Condition> {
        match self {
            FlagDefinition::Entries(entries) => entries
                .into_iter()
                .map(ConditionEntry::into_condition)
                .collect(),
            FlagDefinition::Legacy(map) => map
                .into_iter()
                .map(|(kind, value)| Condition::new(kind, value))
                .collect(),
        }
    }
}

/// Configured flag definitions, by flag name
pub type FlagDefinitions = BTreeMap<String, FlagDefinition>;

/// Flag source backed by configuration; immutable once built
#[derive(Debug, Clone, Default)]
pub struct SettingsFlagSource {
    flags: FlagMap,
}

impl SettingsFlagSource {
    /// Normalize configured definitions into conditions
    pub fn new(definitions: FlagDefinitions) -> Self {
        let flags = definitions
            .into_iter()
            .map(|(name, definition)| {
                if definition.is_legacy() {
                    tracing::warn!(
                        flag = %name,
                        "flag uses the deprecated {{condition: value}} form; \
                         use a list of (condition, value[, required]) entries instead"
                    );
                }
                (name, definition.into_conditions())
            })
            .collect();
        Self { flags }
    }

    /// Build directly from conditions
    pub fn from_conditions(flags: FlagMap) -> Self {
        Self { flags }
    }

    /// Parse a YAML mapping of flag name to definition
    pub fn from_yaml_str(content: &str) -> RepositoryResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let definitions: FlagDefinitions = serde_yaml::from_str(content)?;
        Ok(Self::new(definitions))
    }

    /// Load a YAML file of flag definitions
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RepositoryError::NotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FlagSource for SettingsFlagSource {
    fn name(&self) -> &str {
        "settings"
    }

    fn get_flags(&self) -> RepositoryResult<FlagMap> {
        Ok(self.flags.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vexil_core::ConditionKind;

    #[test]
    fn test_entry_forms() {
        let source = SettingsFlagSource::from_yaml_str(
            r#"
MY_FLAG:
  - [boolean, "True"]
  - [path matches, ^/beta, true]
  - condition: parameter
    value: preview
"#,
        )
        .unwrap();

        let flags = source.get_flags().unwrap();
        let conditions = &flags["MY_FLAG"];
        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions[0], Condition::new("boolean", "True"));
        assert!(!conditions[0].required);
        assert_eq!(conditions[1].kind, ConditionKind::PathMatches);
        assert!(conditions[1].required);
        assert_eq!(conditions[2].kind, ConditionKind::Parameter);
        assert!(!conditions[2].required);
        assert!(conditions.iter().all(|c| c.record.is_none()));
    }

    #[test]
    fn test_legacy_mapping_form() {
        let source = SettingsFlagSource::from_yaml_str(
            r#"
OLD_FLAG:
  boolean: true
  path matches: ^/old
"#,
        )
        .unwrap();

        let flags = source.get_flags().unwrap();
        assert_eq!(flags["OLD_FLAG"].len(), 2);
    }

    #[test]
    fn test_flag_without_conditions() {
        let source = SettingsFlagSource::from_yaml_str("EMPTY_FLAG: []\n").unwrap();
        assert_eq!(source.get_flags().unwrap()["EMPTY_FLAG"].len(), 0);
    }

    #[test]
    fn test_empty_document() {
        assert!(SettingsFlagSource::from_yaml_str("").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_document() {
        let result = SettingsFlagSource::from_yaml_str("MY_FLAG: [[boolean]]\n");
        assert!(matches!(result, Err(RepositoryError::YamlParse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = SettingsFlagSource::from_file("/nonexistent/flags.yaml");
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }
}
