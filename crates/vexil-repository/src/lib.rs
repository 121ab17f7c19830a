//! Flag sources and condition stores for Vexil
//!
//! This crate provides the storage side of flag evaluation:
//!
//! - **Settings source**: flags defined in static YAML configuration
//! - **Database source**: flags defined by stored condition records
//! - **Condition stores**: in-memory and YAML-file record storage with
//!   uniqueness checks and change notification
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use vexil_repository::{
//!     ConditionStore, DatabaseFlagSource, FlagSource, MemoryConditionStore, NewConditionRecord,
//!     SettingsFlagSource,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = SettingsFlagSource::from_yaml_str("MY_FLAG:\n  - [boolean, true]\n")?;
//!
//!     let store = Arc::new(MemoryConditionStore::new());
//!     store.create(NewConditionRecord::new("MY_FLAG", "path matches", "^/beta"))?;
//!     let database = DatabaseFlagSource::new(store);
//!
//!     for source in [&settings as &dyn FlagSource, &database] {
//!         println!("{}: {:?}", source.name(), source.get_flags()?.keys());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │        Flag engine (vexil-sdk)         │
//! └──────────────┬─────────────────────────┘
//!                │ FlagSource trait
//!       ┌────────┴────────┐
//!       ↓                 ↓
//! ┌──────────────┐  ┌──────────────────┐
//! │ Settings     │  │  Database        │
//! │ FlagSource   │  │  FlagSource      │
//! └──────────────┘  └────────┬─────────┘
//!                            │ ConditionStore trait
//!                   ┌────────┴────────┐
//!                   ↓                 ↓
//!             ┌───────────┐    ┌─────────────┐
//!             │ Memory    │    │ YAML file   │
//!             └───────────┘    └─────────────┘
//! ```

pub mod database;
pub mod error;
pub mod models;
pub mod settings;
pub mod store;
pub mod traits;

// Re-exports - Error
pub use error::{RepositoryError, RepositoryResult};

// Re-exports - Sources
pub use database::DatabaseFlagSource;
pub use settings::{ConditionEntry, FlagDefinition, FlagDefinitions, SettingsFlagSource};

// Re-exports - Stores
pub use store::{FileConditionStore, MemoryConditionStore};

pub use models::*;
pub use traits::*;
