//! Vexil SDK
//!
//! High-level API for evaluating feature flags: aggregation of every flag
//! source, request-scoped and process-wide caching, state queries, the
//! operational write operations and startup checks.
//!
//! ```rust,ignore
//! use vexil_sdk::{EvaluationContext, FlagEngineBuilder, RequestContext, RequestScope};
//!
//! let engine = FlagEngineBuilder::new()
//!     .with_flags_yaml("BETA:\n  - [path matches, ^/beta]\n")?
//!     .build()?;
//!
//! let scope = RequestScope::new(EvaluationContext::for_request(RequestContext::new("/beta/home")));
//! assert!(engine.flag_enabled("BETA", &scope));
//! ```

pub mod aggregator;
pub mod builder;
pub mod cache;
pub mod checks;
pub mod config;
pub mod engine;
pub mod error;
pub mod layers;

// Re-export main types
pub use aggregator::{FlagAggregator, FlagSet};
pub use builder::FlagEngineBuilder;
pub use cache::{EvaluationScope, FlagCache, RequestScope};
pub use checks::{check_flag_conditions, CheckWarning, UNKNOWN_CONDITION};
pub use config::{CacheSettings, FlagsConfig, SourceKind, StoreConfig};
pub use engine::FlagEngine;
pub use error::{Result, SdkError};
pub use layers::{EvaluationLayer, FlagCheck, FlagCheckRecorder, Next};

// Re-export commonly used types from dependencies
pub use vexil_core::describe::state_description;
pub use vexil_core::{
    CombinationPolicy, Condition, ConditionKind, ConditionRegistry, ConditionValue,
    EvaluationContext, Flag, Identity, QueryParams, RecordId, RequestContext, User,
};
pub use vexil_repository::{CacheConfig, ConditionRecord, ConditionStore, NewConditionRecord};
