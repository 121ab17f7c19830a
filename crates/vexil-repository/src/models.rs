//! Data models for the repository layer

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use vexil_core::{Condition, ConditionValue, RecordId};

/// A persisted flag condition
///
/// The (name, condition, value) triple is unique across a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub id: RecordId,

    /// Flag name
    pub name: String,

    /// Condition type name
    pub condition: String,

    /// Stored value, free-form per condition type
    pub value: String,

    #[serde(default)]
    pub required: bool,
}

impl ConditionRecord {
    /// Build the evaluable condition, tagged with this record's id
    pub fn to_condition(&self) -> Condition {
        Condition::new(self.condition.as_str(), ConditionValue::text(self.value.as_str()))
            .with_required(self.required)
            .with_record(self.id)
    }

    /// Whether this record has the same (name, condition, value) key
    pub fn same_key(&self, other: &NewConditionRecord) -> bool {
        self.name == other.name && self.condition == other.condition && self.value == other.value
    }

    /// The writable fields of this record
    pub fn fields(&self) -> NewConditionRecord {
        NewConditionRecord {
            name: self.name.clone(),
            condition: self.condition.clone(),
            value: self.value.clone(),
            required: self.required,
        }
    }
}

/// Fields of a condition record that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConditionRecord {
    pub name: String,
    pub condition: String,
    pub value: String,
    #[serde(default)]
    pub required: bool,
}

impl NewConditionRecord {
    pub fn new(
        name: impl Into<String>,
        condition: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            condition: condition.into(),
            value: value.into(),
            required: false,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Record fields that persist `condition` for flag `name`
    pub fn from_condition(name: impl Into<String>, condition: &Condition) -> Self {
        Self {
            name: name.into(),
            condition: condition.kind.to_string(),
            value: condition.value.to_string(),
            required: condition.required,
        }
    }
}

/// What changed in a condition store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Created(ConditionRecord),
    Updated(ConditionRecord),
    Deleted(ConditionRecord),
}

impl ChangeEvent {
    pub fn record(&self) -> &ConditionRecord {
        match self {
            ChangeEvent::Created(r) | ChangeEvent::Updated(r) | ChangeEvent::Deleted(r) => r,
        }
    }

    /// Name of the flag the changed record belongs to
    pub fn flag_name(&self) -> &str {
        &self.record().name
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of invalidations
    pub invalidations: u64,
    /// Number of entries in cache
    pub size: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A cached value with TTL support
#[derive(Debug, Clone)]
pub struct CachedEntry<T> {
    pub data: T,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl<T> CachedEntry<T> {
    pub fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this cached entry has expired
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }

    pub fn age(&self) -> Duration {
        self.cached_at.elapsed()
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether caching is enabled
    pub enabled: bool,
    /// Time-to-live of the cached flag set
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// An enabled cache with the default TTL
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Disable caching
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}
