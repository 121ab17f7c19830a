//! Built-in conditions
//!
//! Each condition consumes its stored value plus the evaluation context.
//! Conditions that look at the request fail with
//! [`EvaluationError::MissingRequiredContext`] when no request is supplied;
//! a malformed stored value simply evaluates to `false`.

use super::kind::ConditionKind;
use super::registry::{ConditionEvaluator, RegisteredCondition, Validator};
use super::validators::{self, parse_datetime, UserDirectory};
use crate::context::{EvaluationContext, RequestContext};
use crate::error::EvaluationError;
use crate::value::ConditionValue;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::Arc;

/// Options applied when the built-in conditions are registered
#[derive(Clone, Default)]
pub struct BuiltinOptions {
    /// When set, `user` values must name a user known to this directory
    pub user_directory: Option<Arc<dyn UserDirectory>>,
}

impl BuiltinOptions {
    pub fn with_user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.user_directory = Some(directory);
        self
    }
}

pub(crate) fn builtin_conditions(
    options: &BuiltinOptions,
) -> Vec<(ConditionKind, RegisteredCondition)> {
    let user_validator = options
        .user_directory
        .clone()
        .map(validators::user_validator);

    vec![
        (ConditionKind::Boolean, entry(BooleanCondition, None)),
        (ConditionKind::User, entry(UserCondition, user_validator)),
        (ConditionKind::Anonymous, entry(AnonymousCondition, None)),
        (ConditionKind::Parameter, entry(ParameterCondition, None)),
        (ConditionKind::PathMatches, entry(PathMatchesCondition, None)),
        (ConditionKind::AfterDate, entry(AfterDateCondition, None)),
        (ConditionKind::BeforeDate, entry(BeforeDateCondition, None)),
    ]
}

fn entry<E: ConditionEvaluator + 'static>(
    evaluator: E,
    validator: Option<Validator>,
) -> RegisteredCondition {
    RegisteredCondition::new(Arc::new(evaluator), validator)
}

fn require_request<'a>(
    ctx: &'a EvaluationContext,
    kind: ConditionKind,
) -> Result<&'a RequestContext, EvaluationError> {
    ctx.request()
        .ok_or_else(|| EvaluationError::missing_request(kind.as_str()))
}

/// `boolean`: the stored value itself, parsed permissively
pub struct BooleanCondition;

impl ConditionEvaluator for BooleanCondition {
    fn evaluate(&self, value: &ConditionValue, _: &EvaluationContext) -> Result<bool, EvaluationError> {
        Ok(value.as_bool().unwrap_or(false))
    }

    fn validator(&self) -> Option<Validator> {
        Some(Arc::new(validators::validate_boolean))
    }
}

/// `user`: the request's user has the stored username
pub struct UserCondition;

impl ConditionEvaluator for UserCondition {
    fn evaluate(&self, value: &ConditionValue, ctx: &EvaluationContext) -> Result<bool, EvaluationError> {
        let request = require_request(ctx, ConditionKind::User)?;
        match request.user.username() {
            Some(username) => Ok(username == value.to_string()),
            None => Ok(false),
        }
    }

    fn validator(&self) -> Option<Validator> {
        Some(Arc::new(validators::validate_user))
    }
}

/// `anonymous`: whether the request's user is anonymous equals the stored boolean
pub struct AnonymousCondition;

impl ConditionEvaluator for AnonymousCondition {
    fn evaluate(&self, value: &ConditionValue, ctx: &EvaluationContext) -> Result<bool, EvaluationError> {
        let request = require_request(ctx, ConditionKind::Anonymous)?;
        let is_anonymous = request.user.is_anonymous();
        Ok(value.as_bool().map(|expected| expected == is_anonymous).unwrap_or(false))
    }

    fn validator(&self) -> Option<Validator> {
        Some(Arc::new(validators::validate_boolean))
    }
}

/// `parameter`: the query string carries `name`, or `name=value`
///
/// Without an explicit value the parameter must equal `True`.
pub struct ParameterCondition;

impl ParameterCondition {
    fn split(param: &str) -> (&str, &str) {
        let mut parts = param.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(value), None) => (name, value),
            _ => (param, "True"),
        }
    }
}

impl ConditionEvaluator for ParameterCondition {
    fn evaluate(&self, value: &ConditionValue, ctx: &EvaluationContext) -> Result<bool, EvaluationError> {
        let request = require_request(ctx, ConditionKind::Parameter)?;
        let param = value.to_string();
        let (name, expected) = Self::split(&param);
        Ok(request.query.get(name) == Some(expected))
    }

    fn validator(&self) -> Option<Validator> {
        Some(Arc::new(validators::validate_parameter))
    }
}

/// `path matches`: the stored regular expression is found in the request path
pub struct PathMatchesCondition;

impl ConditionEvaluator for PathMatchesCondition {
    fn evaluate(&self, value: &ConditionValue, ctx: &EvaluationContext) -> Result<bool, EvaluationError> {
        let request = require_request(ctx, ConditionKind::PathMatches)?;
        match Regex::new(&value.to_string()) {
            Ok(re) => Ok(re.is_match(&request.path)),
            Err(_) => Ok(false),
        }
    }

    fn validator(&self) -> Option<Validator> {
        Some(Arc::new(validators::validate_path_re))
    }
}

fn stored_instant(value: &ConditionValue) -> Option<DateTime<Utc>> {
    match value {
        ConditionValue::Instant(dt) => Some(*dt),
        ConditionValue::Text(s) => parse_datetime(s),
        _ => None,
    }
}

/// `after date`: now is strictly after the stored instant
pub struct AfterDateCondition;

impl ConditionEvaluator for AfterDateCondition {
    fn evaluate(&self, value: &ConditionValue, ctx: &EvaluationContext) -> Result<bool, EvaluationError> {
        Ok(stored_instant(value).is_some_and(|date| ctx.now() > date))
    }

    fn validator(&self) -> Option<Validator> {
        Some(Arc::new(validators::validate_date))
    }
}

/// `before date`: now is strictly before the stored instant
pub struct BeforeDateCondition;

impl ConditionEvaluator for BeforeDateCondition {
    fn evaluate(&self, value: &ConditionValue, ctx: &EvaluationContext) -> Result<bool, EvaluationError> {
        Ok(stored_instant(value).is_some_and(|date| ctx.now() < date))
    }

    fn validator(&self) -> Option<Validator> {
        Some(Arc::new(validators::validate_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Identity, QueryParams, User};
    use chrono::Duration;

    fn request_ctx(request: RequestContext) -> EvaluationContext {
        EvaluationContext::for_request(request)
    }

    #[test]
    fn test_boolean_condition() {
        let ctx = EvaluationContext::new();
        assert!(BooleanCondition.evaluate(&ConditionValue::Bool(true), &ctx).unwrap());
        assert!(!BooleanCondition.evaluate(&ConditionValue::Bool(false), &ctx).unwrap());
        for s in ["True", "true", "t", "yes", "y", "on", "1", "true   "] {
            assert!(BooleanCondition.evaluate(&s.into(), &ctx).unwrap(), "{s}");
        }
        for s in ["False", "false", "f", "no", "n", "off", "0"] {
            assert!(!BooleanCondition.evaluate(&s.into(), &ctx).unwrap(), "{s}");
        }
        assert!(!BooleanCondition.evaluate(&"garbage".into(), &ctx).unwrap());
    }

    #[test]
    fn test_user_condition() {
        let ctx = request_ctx(RequestContext::new("/").with_user(User::named("testuser")));
        assert!(UserCondition.evaluate(&"testuser".into(), &ctx).unwrap());
        assert!(!UserCondition.evaluate(&"nottestuser".into(), &ctx).unwrap());
    }

    #[test]
    fn test_user_condition_custom_username_field() {
        let user = User::Authenticated(Identity::with_username_field("identifier", "customuser"));
        let ctx = request_ctx(RequestContext::new("/").with_user(user));
        assert!(UserCondition.evaluate(&"customuser".into(), &ctx).unwrap());
    }

    #[test]
    fn test_user_condition_anonymous_is_false() {
        let ctx = request_ctx(RequestContext::new("/"));
        assert!(!UserCondition.evaluate(&"testuser".into(), &ctx).unwrap());
    }

    #[test]
    fn test_request_required() {
        let ctx = EvaluationContext::new();
        let value = ConditionValue::text("x");
        let evaluators: [(&str, &dyn ConditionEvaluator); 4] = [
            ("user", &UserCondition),
            ("anonymous", &AnonymousCondition),
            ("parameter", &ParameterCondition),
            ("path matches", &PathMatchesCondition),
        ];
        for (name, evaluator) in evaluators {
            let err = evaluator.evaluate(&value, &ctx).unwrap_err();
            assert_eq!(err, EvaluationError::missing_request(name));
        }
    }

    #[test]
    fn test_anonymous_condition() {
        let anonymous = request_ctx(RequestContext::new("/"));
        assert!(AnonymousCondition.evaluate(&ConditionValue::Bool(true), &anonymous).unwrap());
        assert!(AnonymousCondition.evaluate(&"True".into(), &anonymous).unwrap());
        assert!(!AnonymousCondition.evaluate(&"False".into(), &anonymous).unwrap());

        let named = request_ctx(RequestContext::new("/").with_user(User::named("notadminuser")));
        assert!(!AnonymousCondition.evaluate(&ConditionValue::Bool(true), &named).unwrap());
        assert!(AnonymousCondition.evaluate(&"false".into(), &named).unwrap());
    }

    #[test]
    fn test_parameter_condition() {
        let ctx = request_ctx(RequestContext::new("/").with_query_string("my_flag=True"));
        assert!(ParameterCondition.evaluate(&"my_flag".into(), &ctx).unwrap());

        let ctx = request_ctx(RequestContext::new("/").with_query_string("my_flag=today"));
        assert!(ParameterCondition.evaluate(&"my_flag=today".into(), &ctx).unwrap());

        let ctx = request_ctx(RequestContext::new("/").with_query_string("my_flag"));
        assert!(ParameterCondition.evaluate(&"my_flag=".into(), &ctx).unwrap());
    }

    #[test]
    fn test_parameter_condition_non_existent() {
        let ctx = request_ctx(RequestContext::new("/").with_query_string("my_flag=false"));
        assert!(!ParameterCondition.evaluate(&"my_flag=today".into(), &ctx).unwrap());
        assert!(!ParameterCondition.evaluate(&"my_flag".into(), &ctx).unwrap());

        let ctx = request_ctx(RequestContext::new("/").with_query(QueryParams::new()));
        assert!(!ParameterCondition.evaluate(&"my_flag".into(), &ctx).unwrap());
    }

    #[test]
    fn test_parameter_condition_multiple_equals_falls_back() {
        let ctx = request_ctx(RequestContext::new("/").with_query_string("a=b%3Dc"));
        assert!(!ParameterCondition.evaluate(&"a=b=c".into(), &ctx).unwrap());
        let ctx = request_ctx(RequestContext::new("/").with_query(
            [("a=b=c", "True")].into_iter().collect(),
        ));
        assert!(ParameterCondition.evaluate(&"a=b=c".into(), &ctx).unwrap());
    }

    #[test]
    fn test_path_matches_condition() {
        let ctx = request_ctx(RequestContext::new("/my/path"));
        assert!(PathMatchesCondition.evaluate(&"/my/path".into(), &ctx).unwrap());
        assert!(PathMatchesCondition.evaluate(&"^/my".into(), &ctx).unwrap());
        assert!(PathMatchesCondition.evaluate(&"path".into(), &ctx).unwrap());
        assert!(!PathMatchesCondition.evaluate(&"^/other".into(), &ctx).unwrap());
        assert!(!PathMatchesCondition.evaluate(&"/my/(path".into(), &ctx).unwrap());
    }

    #[test]
    fn test_after_date_condition() {
        let now = Utc::now();
        let ctx = EvaluationContext::new().with_now(now);
        let past = (now - Duration::days(1)).to_rfc3339();
        let future = (now + Duration::days(1)).to_rfc3339();

        assert!(AfterDateCondition.evaluate(&past.as_str().into(), &ctx).unwrap());
        assert!(!AfterDateCondition.evaluate(&future.as_str().into(), &ctx).unwrap());
        assert!(AfterDateCondition
            .evaluate(&ConditionValue::Instant(now - Duration::hours(1)), &ctx)
            .unwrap());
        assert!(!AfterDateCondition.evaluate(&"Not a date".into(), &ctx).unwrap());
        assert!(!AfterDateCondition.evaluate(&ConditionValue::Bool(true), &ctx).unwrap());
    }

    #[test]
    fn test_before_date_condition() {
        let now = Utc::now();
        let ctx = EvaluationContext::new().with_now(now);
        let past = (now - Duration::days(1)).to_rfc3339();
        let future = (now + Duration::days(1)).to_rfc3339();

        assert!(!BeforeDateCondition.evaluate(&past.as_str().into(), &ctx).unwrap());
        assert!(BeforeDateCondition.evaluate(&future.as_str().into(), &ctx).unwrap());
        assert!(!BeforeDateCondition.evaluate(&ConditionValue::Instant(now), &ctx).unwrap());
        assert!(!BeforeDateCondition.evaluate(&"Not a date".into(), &ctx).unwrap());
    }
}
