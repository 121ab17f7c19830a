//! Vexil Core - condition registry and flag evaluation
//!
//! This crate provides the evaluation model shared by the rest of Vexil:
//! - The condition registry and the built-in conditions
//! - Validators for condition values
//! - The evaluation context (request, user, query parameters, clock)
//! - `Condition` and `Flag`, with the required/optional combination algorithm
//! - Human-readable state descriptions

pub mod conditions;
pub mod context;
pub mod describe;
pub mod error;
pub mod value;

mod condition;
mod flag;

pub use condition::{Condition, RecordId};
pub use conditions::{ConditionKind, ConditionRegistry};
pub use context::{EvaluationContext, Identity, QueryParams, RequestContext, User};
pub use error::{EvaluationError, RegistryError, ValidationError};
pub use flag::{CombinationPolicy, Flag, StateOptions};
pub use value::{parse_bool, ConditionValue};
