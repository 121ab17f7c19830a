//! Human-readable descriptions of flag state
//!
//! Boolean conditions are the on/off switch of a flag; every other condition
//! narrows when the flag applies. The description is phrased accordingly.

use crate::condition::Condition;
use crate::conditions::{ConditionKind, ConditionRegistry};
use crate::context::EvaluationContext;
use crate::flag::Flag;

const ENABLED_ALL: &str = " enabled for all requests";
const DISABLED_ALL: &str = " disabled for all requests";

/// Whether any boolean condition of the flag evaluates true
pub fn bool_enabled(flag: &Flag, registry: &ConditionRegistry) -> bool {
    let ctx = EvaluationContext::new();
    flag.boolean_conditions()
        .any(|c| matches!(c.check(registry, &ctx), Ok(Some(true))))
}

/// Conditions other than `boolean`
pub fn conditions_without_bool(flag: &Flag) -> Vec<&Condition> {
    flag.conditions
        .iter()
        .filter(|c| c.kind != ConditionKind::Boolean)
        .collect()
}

/// Required conditions other than `boolean`
pub fn required_conditions_without_bool(flag: &Flag) -> Vec<&Condition> {
    flag.required_conditions()
        .filter(|c| c.kind != ConditionKind::Boolean)
        .collect()
}

/// Describe when a flag is on, e.g.
/// `MYFLAG is enabled when all required conditions are met.`
pub fn state_description(flag: &Flag, registry: &ConditionRegistry) -> String {
    let non_bool = conditions_without_bool(flag).len();
    let required = required_conditions_without_bool(flag).len();
    let bools = flag.boolean_conditions().count();
    let required_bools = flag.boolean_conditions().filter(|c| c.required).count();
    let enabled = bool_enabled(flag, registry);

    let mut text = format!("{} is", flag.name);

    if required_bools > 0 {
        text.push_str(if enabled { ENABLED_ALL } else { DISABLED_ALL });
    } else if non_bool > 0 {
        if required > 0 {
            if bools > 0 && non_bool == required && !enabled {
                text.push_str(DISABLED_ALL);
                text.push_str(", even");
            } else {
                text.push_str(" enabled");
            }
            text.push_str(" when all required conditions");
            if non_bool == required || enabled {
                text.push_str(" are met");
            }
        } else if enabled {
            text.push_str(ENABLED_ALL);
        } else {
            text.push_str(" enabled when");
        }

        if !enabled && non_bool > required {
            if required > 0 {
                text.push_str(" and");
            }
            text.push_str(" any");
            if required > 0 {
                text.push_str(" non-required");
            }
            text.push_str(" condition is met");
        }
    } else if enabled {
        text.push_str(ENABLED_ALL);
    } else {
        text.push_str(DISABLED_ALL);
    }

    text.push('.');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(conditions: Vec<Condition>) -> String {
        let registry = ConditionRegistry::with_builtins();
        state_description(&Flag::with_conditions("MYFLAG", conditions), &registry)
    }

    #[test]
    fn test_helpers() {
        let registry = ConditionRegistry::with_builtins();
        let flag = Flag::with_conditions(
            "MYFLAG",
            vec![
                Condition::new("boolean", true),
                Condition::required("path matches", "/mypath"),
                Condition::new("path matches", "/myotherpath"),
            ],
        );
        assert!(bool_enabled(&flag, &registry));
        assert_eq!(conditions_without_bool(&flag).len(), 2);
        assert_eq!(required_conditions_without_bool(&flag).len(), 1);
    }

    #[test]
    fn test_required_only() {
        assert_eq!(
            describe(vec![Condition::required("anonymous", "False")]),
            "MYFLAG is enabled when all required conditions are met."
        );
        assert_eq!(
            describe(vec![
                Condition::required("anonymous", "False"),
                Condition::new("boolean", true),
            ]),
            "MYFLAG is enabled when all required conditions are met."
        );
    }

    #[test]
    fn test_required_with_false_boolean() {
        assert_eq!(
            describe(vec![
                Condition::required("anonymous", "False"),
                Condition::new("boolean", false),
            ]),
            "MYFLAG is disabled for all requests, even when all required conditions are met."
        );
    }

    #[test]
    fn test_required_and_optional_with_false_boolean() {
        assert_eq!(
            describe(vec![
                Condition::required("anonymous", "False"),
                Condition::new("path matches", "/mypath"),
                Condition::new("boolean", false),
            ]),
            "MYFLAG is enabled when all required conditions and any non-required condition is met."
        );
    }

    #[test]
    fn test_required_boolean_wins() {
        assert_eq!(
            describe(vec![
                Condition::required("anonymous", "False"),
                Condition::required("boolean", true),
                Condition::new("path matches", "/mypath"),
            ]),
            "MYFLAG is enabled for all requests."
        );
        assert_eq!(
            describe(vec![
                Condition::required("anonymous", "False"),
                Condition::required("boolean", false),
                Condition::new("path matches", "/mypath"),
            ]),
            "MYFLAG is disabled for all requests."
        );
    }

    #[test]
    fn test_optional_only() {
        assert_eq!(
            describe(vec![
                Condition::new("anonymous", "False"),
                Condition::new("boolean", true),
            ]),
            "MYFLAG is enabled for all requests."
        );
        assert_eq!(
            describe(vec![
                Condition::new("anonymous", "False"),
                Condition::new("boolean", false),
            ]),
            "MYFLAG is enabled when any condition is met."
        );
    }

    #[test]
    fn test_boolean_only() {
        assert_eq!(
            describe(vec![Condition::new("boolean", true)]),
            "MYFLAG is enabled for all requests."
        );
        assert_eq!(describe(vec![]), "MYFLAG is disabled for all requests.");
    }
}
