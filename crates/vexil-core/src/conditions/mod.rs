//! Condition types, the registry that resolves them, and their validators
//!
//! # Built-in condition types
//!
//! | name | stored value | needs a request |
//! |---|---|---|
//! | `boolean` | `true`/`false`, `on`/`off`, `yes`/`no`, `1`/`0` ... | no |
//! | `user` | username | yes |
//! | `anonymous` | boolean | yes |
//! | `parameter` | `name` or `name=value` | yes |
//! | `path matches` | regular expression | yes |
//! | `after date` | ISO 8601 date-time | no |
//! | `before date` | ISO 8601 date-time | no |

mod builtin;
mod kind;
mod registry;
pub mod validators;

pub use builtin::{
    AfterDateCondition, AnonymousCondition, BeforeDateCondition, BooleanCondition,
    BuiltinOptions, ParameterCondition, PathMatchesCondition, UserCondition,
};
pub use kind::ConditionKind;
pub use registry::{ConditionEvaluator, ConditionRegistry, RegisteredCondition, Validator};
pub use validators::UserDirectory;
