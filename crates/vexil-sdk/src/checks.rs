//! Startup diagnostics

use std::fmt;
use vexil_core::ConditionRegistry;

use crate::aggregator::FlagAggregator;

/// Identifier of the unknown-condition warning
pub const UNKNOWN_CONDITION: &str = "vexil.W001";

/// A configuration problem found by a startup check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckWarning {
    pub id: &'static str,
    pub flag: String,
    pub condition: String,
    pub message: String,
    pub hint: String,
}

impl fmt::Display for CheckWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}\n\tHINT: {}", self.id, self.message, self.hint)
    }
}

/// Report every condition whose type is not registered.
///
/// Sources that fail are skipped, so a store that is not set up yet does
/// not hide problems in the others.
pub fn check_flag_conditions(
    aggregator: &FlagAggregator,
    registry: &ConditionRegistry,
) -> Vec<CheckWarning> {
    let flags = match aggregator.aggregate(true) {
        Ok(flags) => flags,
        Err(error) => {
            tracing::warn!(%error, "flag condition check could not aggregate flags");
            return Vec::new();
        }
    };

    flags
        .values()
        .flat_map(|flag| {
            flag.conditions
                .iter()
                .filter(|c| !c.is_registered(registry))
                .map(move |c| CheckWarning {
                    id: UNKNOWN_CONDITION,
                    flag: flag.name.clone(),
                    condition: c.kind.to_string(),
                    message: format!("Flag {} has non-existent condition \"{}\"", flag.name, c.kind),
                    hint: format!("Register \"{}\" as a Vexil condition.", c.kind),
                })
        })
        .collect()
}
