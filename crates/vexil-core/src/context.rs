//! Request-scoped evaluation context
//!
//! Every condition check receives an [`EvaluationContext`]. Conditions that
//! inspect the inbound request (user, parameter, path) need a
//! [`RequestContext`]; the date conditions only need "now", which defaults to
//! the wall clock when the caller does not pin it.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Default name of the identity attribute compared by the `user` condition
pub const DEFAULT_USERNAME_FIELD: &str = "username";

/// Input handed to every condition evaluator
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    /// The inbound request, if there is one
    pub request: Option<RequestContext>,

    /// Pinned "now"; the wall clock is used when absent
    pub now: Option<DateTime<Utc>>,

    /// Free-form values for custom conditions
    pub extra: HashMap<String, serde_json::Value>,
}

impl EvaluationContext {
    /// Create an empty context (no request, wall-clock time)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a request
    pub fn for_request(request: RequestContext) -> Self {
        Self::new().with_request(request)
    }

    /// Builder method to attach a request
    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }

    /// Builder method to pin the current instant
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Builder method to add a value for custom conditions
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn request(&self) -> Option<&RequestContext> {
        self.request.as_ref()
    }

    /// The instant conditions should treat as "now"
    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

/// The parts of an inbound request the built-in conditions look at
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Request path, without scheme, host or query string
    pub path: String,
    /// Query string parameters
    pub query: QueryParams,
    /// The current user
    pub user: User,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Parse and attach a raw query string (`a=1&b`)
    pub fn with_query_string(mut self, query: &str) -> Self {
        self.query = QueryParams::parse(query);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }
}

/// The user making a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum User {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl User {
    /// An authenticated user identified by the default username field
    pub fn named(username: impl Into<String>) -> Self {
        User::Authenticated(Identity::new(username))
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, User::Anonymous)
    }

    /// The value of the configured identity field, for authenticated users
    pub fn username(&self) -> Option<&str> {
        match self {
            User::Anonymous => None,
            User::Authenticated(identity) => identity.username(),
        }
    }
}

/// Attributes of an authenticated user plus the name of the identity field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username_field: String,
    attributes: HashMap<String, String>,
}

impl Identity {
    /// Identity keyed on [`DEFAULT_USERNAME_FIELD`]
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_username_field(DEFAULT_USERNAME_FIELD, username)
    }

    /// Identity keyed on a custom field (e.g. `email` or `identifier`)
    pub fn with_username_field(field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let mut attributes = HashMap::new();
        attributes.insert(field.clone(), value.into());
        Self {
            username_field: field,
            attributes,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn username_field(&self) -> &str {
        &self.username_field
    }

    pub fn username(&self) -> Option<&str> {
        self.attributes.get(&self.username_field).map(String::as_str)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Ordered, multi-valued query parameters
///
/// Lookups return the last value given for a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// A bare name (`?flag`) is recorded with an empty value.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((name, value)) => (decode_component(name), decode_component(value)),
                None => (decode_component(part), String::new()),
            })
            .collect();
        Self(pairs)
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
