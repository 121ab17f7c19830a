//! Value validators for the built-in conditions
//!
//! Validators run when a value is configured or persisted, so that
//! evaluation never has to deal with a malformed value.

use crate::error::ValidationError;
use crate::value::{parse_bool, ConditionValue};
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::{Arc, OnceLock};

use super::registry::Validator;

const BOOLEAN_MESSAGE: &str = "Enter one of 'on', 'off', 'true', 'false', etc.";
const PARAMETER_MESSAGE: &str = "Enter a valid HTTP parameter name.";
const PATH_MESSAGE: &str = "Enter either a valid path or a regular expression to match a path, \
     without a URL scheme, query string, or fragment.";
const DATE_MESSAGE: &str = "Enter an ISO 8601 date representation.";
const USER_MESSAGE: &str = "Enter the username of a valid user.";

/// Lookup of known users, consulted by the `user` validator
pub trait UserDirectory: Send + Sync {
    fn user_exists(&self, username: &str) -> bool;
}

pub fn validate_boolean(value: &ConditionValue) -> Result<(), ValidationError> {
    match value {
        ConditionValue::Text(s) if parse_bool(s).is_some() => Ok(()),
        ConditionValue::Bool(_) | ConditionValue::Integer(_) => Ok(()),
        _ => Err(ValidationError::invalid("boolean", BOOLEAN_MESSAGE)),
    }
}

pub fn validate_parameter(value: &ConditionValue) -> Result<(), ValidationError> {
    static PARAMETER_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = PARAMETER_RE.get_or_init(|| Regex::new(r"^[-_\w=]+$").ok());

    let valid = match (re, value.as_text()) {
        (Some(re), Some(text)) => re.is_match(text),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::invalid("parameter", PARAMETER_MESSAGE))
    }
}

pub fn validate_path_re(value: &ConditionValue) -> Result<(), ValidationError> {
    match value.as_text().map(Regex::new) {
        Some(Ok(_)) => Ok(()),
        _ => Err(ValidationError::invalid("path matches", PATH_MESSAGE)),
    }
}

pub fn validate_date(value: &ConditionValue) -> Result<(), ValidationError> {
    match value {
        ConditionValue::Instant(_) => Ok(()),
        ConditionValue::Text(s) if parse_datetime(s).is_some() => Ok(()),
        _ => Err(ValidationError::invalid("date", DATE_MESSAGE)),
    }
}

/// Checks only that a username was given
pub fn validate_user(value: &ConditionValue) -> Result<(), ValidationError> {
    match value.as_text().map(str::trim) {
        Some(name) if !name.is_empty() => Ok(()),
        _ => Err(ValidationError::invalid("user", USER_MESSAGE)),
    }
}

/// A `user` validator that also requires the user to exist in `directory`
pub fn user_validator(directory: Arc<dyn UserDirectory>) -> Validator {
    Arc::new(move |value: &ConditionValue| {
        validate_user(value)?;
        match value.as_text() {
            Some(name) if directory.user_exists(name.trim()) => Ok(()),
            _ => Err(ValidationError::invalid("user", USER_MESSAGE)),
        }
    })
}

/// Parse an ISO 8601 date-time.
///
/// Accepts RFC 3339 and the common space-separated variants, with or without
/// seconds and fractional seconds. Values without an offset are taken as UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    const OFFSET_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
    ];
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
