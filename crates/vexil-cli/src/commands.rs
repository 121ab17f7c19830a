//! Command implementations
//!
//! Each command returns the text to print, so it can be tested without a
//! terminal.

use anyhow::{anyhow, bail, Context, Result};
use std::fmt::Write;
use vexil_sdk::{
    state_description, EvaluationContext, FlagEngine, QueryParams, RequestContext, User,
};

/// Request described on the command line
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    pub path: String,
    pub params: Vec<String>,
    pub user: Option<String>,
    pub anonymous: bool,
}

impl CheckRequest {
    pub fn to_context(&self) -> Result<EvaluationContext> {
        let mut query = QueryParams::new();
        for param in &self.params {
            let (name, value) = param
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid parameter '{}', expected name=value", param))?;
            query.append(name, value);
        }
        let user = match (&self.user, self.anonymous) {
            (Some(_), true) => bail!("--user and --anonymous are mutually exclusive"),
            (Some(username), false) => User::named(username.as_str()),
            (None, _) => User::Anonymous,
        };
        let request = RequestContext::new(self.path.as_str())
            .with_query(query)
            .with_user(user);
        Ok(EvaluationContext::for_request(request))
    }
}

pub fn check(engine: &FlagEngine, flag: &str, request: &CheckRequest) -> Result<String> {
    let ctx = request.to_context()?;
    let state = engine
        .flag_state(flag, &ctx)
        .with_context(|| format!("Failed to evaluate flag {}", flag))?;
    Ok(match state {
        Some(true) => format!("{} is enabled", flag),
        Some(false) => format!("{} is disabled", flag),
        None => format!("{} is not defined (treated as disabled)", flag),
    })
}

pub fn list(engine: &FlagEngine) -> Result<String> {
    let flags = engine.all_flags()?;
    if flags.is_empty() {
        return Ok("No flags defined.".to_string());
    }

    let mut out = String::new();
    for flag in flags.values() {
        writeln!(out, "{}", state_description(flag, engine.registry()))?;
        for condition in &flag.conditions {
            match condition.record {
                Some(id) => writeln!(out, "  - {} [record {}]", condition, id)?,
                None => writeln!(out, "  - {}", condition)?,
            }
        }
    }
    Ok(out.trim_end().to_string())
}

pub fn conditions(engine: &FlagEngine) -> String {
    engine
        .registry()
        .names()
        .into_iter()
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn set_flag(engine: &FlagEngine, flag: &str, enable: bool, create: bool) -> Result<String> {
    let record = if enable {
        engine.enable_flag(flag, create)?
    } else {
        engine.disable_flag(flag, create)?
    };
    Ok(format!(
        "Successfully {} {} (boolean condition {} = {})",
        if enable { "enabled" } else { "disabled" },
        flag,
        record.id,
        record.value
    ))
}

pub fn validate(engine: &FlagEngine, condition: &str, value: &str) -> Result<String> {
    engine.validate_condition(condition, value)?;
    Ok(format!("'{}' is a valid value for condition '{}'", value, condition))
}

/// Startup checks; an error when any warning is found
pub fn doctor(engine: &FlagEngine) -> Result<String> {
    let warnings = engine.check_conditions();
    if warnings.is_empty() {
        return Ok("No issues found.".to_string());
    }
    let report = warnings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    Err(anyhow!("{}\n{} issue(s) found.", report, warnings.len()))
}
