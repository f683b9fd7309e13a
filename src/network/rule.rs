// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interception rules and mock responses

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use tracing::warn;

use super::pattern::UrlPattern;
use crate::error::{Error, Result};
use crate::http::Response;

static RULE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Verbs accepted by [`InterceptSpec::method`]
const STANDARD_METHODS: [&str; 9] = [
    "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "TRACE", "CONNECT",
];

/// Which matching rule answers when several carry a mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePrecedence {
    /// Most recently registered rule wins
    #[default]
    LastRegistered,
    /// Earliest registered rule wins
    FirstRegistered,
}

/// Mock body
#[derive(Debug, Clone, PartialEq)]
pub enum MockBody {
    Json(serde_json::Value),
    Text(String),
    Empty,
}

/// Deterministic response served instead of the network
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub body: MockBody,
    pub headers: HashMap<String, String>,
    pub delay: Option<Duration>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            body: MockBody::Empty,
            headers: HashMap::new(),
            delay: None,
        }
    }
}

impl MockResponse {
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            body: MockBody::Json(value),
            ..Default::default()
        }
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: MockBody::Text(body.into()),
            ..Default::default()
        }
    }

    /// Reject a status or header that cannot go on the wire
    pub fn validate(&self) -> Result<()> {
        if StatusCode::from_u16(self.status).is_err() {
            return Err(Error::Config(format!("invalid mock status {}", self.status)));
        }
        for (name, value) in &self.headers {
            HeaderName::try_from(name.as_str())
                .map_err(|e| Error::Config(format!("invalid mock header name '{}': {}", name, e)))?;
            HeaderValue::try_from(value.as_str()).map_err(|e| {
                Error::Config(format!("invalid value for mock header '{}': {}", name, e))
            })?;
        }
        Ok(())
    }

    /// Materialize for the given request URL
    ///
    /// Headers that fail [`MockResponse::validate`] are skipped with a warning.
    pub fn to_response(&self, url: &Url) -> Response {
        let mut headers = HeaderMap::new();
        let body = match &self.body {
            MockBody::Json(value) => {
                headers.insert("content-type", HeaderValue::from_static("application/json"));
                Bytes::from(value.to_string())
            }
            MockBody::Text(text) => {
                let content_type = if looks_like_html(text) {
                    "text/html; charset=utf-8"
                } else {
                    "text/plain; charset=utf-8"
                };
                headers.insert("content-type", HeaderValue::from_static(content_type));
                Bytes::from(text.clone())
            }
            MockBody::Empty => Bytes::new(),
        };
        for (name, value) in &self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %name, "skipping invalid mock header"),
            }
        }

        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        let mut response = Response::new(status, headers, body, url.clone());
        response.mocked = true;
        response
    }
}

fn looks_like_html(text: &str) -> bool {
    let head = text.trim_start();
    head.starts_with('<') && !head.starts_with("<?xml")
}

/// Builder passed to `Given::intercept_and_mock_response`
#[derive(Debug, Clone)]
pub struct InterceptSpec {
    url: String,
    regex: bool,
    method: Option<String>,
    mock: Option<MockResponse>,
    headers: HashMap<String, String>,
    delay: Option<Duration>,
    body_error: Option<String>,
    alias: Option<String>,
    times: Option<usize>,
}

impl InterceptSpec {
    /// Match URLs against a glob
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            regex: false,
            method: None,
            mock: None,
            headers: HashMap::new(),
            delay: None,
            body_error: None,
            alias: None,
            times: None,
        }
    }

    /// Match URLs against a raw regular expression
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            regex: true,
            ..Self::new(pattern)
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Mock with a JSON body
    pub fn response<T: Serialize>(mut self, body: T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.mock_mut().body = MockBody::Json(value),
            Err(e) => self.body_error = Some(e.to_string()),
        }
        self
    }

    /// Mock with a text body
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.mock_mut().body = MockBody::Text(body.into());
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.mock_mut().status = status;
        self
    }

    /// Header on the mock response; requires `response`, `text` or `status`
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Defer the mock answer; requires `response`, `text` or `status`
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Stop matching after `n` requests
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    fn mock_mut(&mut self) -> &mut MockResponse {
        self.mock.get_or_insert_with(MockResponse::default)
    }

    /// Validate and compile into a rule
    pub fn build(self) -> Result<InterceptionRule> {
        let pattern = if self.regex {
            UrlPattern::regex(&self.url)?
        } else {
            UrlPattern::glob(&self.url)?
        };

        let method = self.method.as_deref().map(parse_method).transpose()?;

        if let Some(reason) = self.body_error {
            return Err(Error::Serialization(<serde_json::Error as serde::ser::Error>::custom(
                reason,
            )));
        }

        let mock = match self.mock {
            Some(mut mock) => {
                mock.headers.extend(self.headers);
                mock.delay = self.delay.or(mock.delay);
                mock.validate()?;
                Some(mock)
            }
            None if !self.headers.is_empty() || self.delay.is_some() => {
                return Err(Error::Config(
                    "header and delay apply to mock responses; add a response, text or status"
                        .to_string(),
                ));
            }
            None => None,
        };

        if matches!(self.alias.as_deref(), Some(a) if a.trim().is_empty()) {
            return Err(Error::Config("alias must not be empty".to_string()));
        }

        Ok(InterceptionRule {
            id: RuleId(RULE_COUNTER.fetch_add(1, Ordering::Relaxed)),
            pattern,
            method,
            mock,
            alias: self.alias,
            times: self.times,
            matched: 0,
        })
    }
}

fn parse_method(method: &str) -> Result<Method> {
    let upper = method.trim().to_ascii_uppercase();
    if !STANDARD_METHODS.contains(&upper.as_str()) {
        return Err(Error::InvalidMethod(method.to_string()));
    }
    Method::from_bytes(upper.as_bytes()).map_err(|_| Error::InvalidMethod(method.to_string()))
}

/// Unique rule identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule_{}", self.0)
    }
}

/// Installed interception rule
#[derive(Debug, Clone)]
pub struct InterceptionRule {
    pub id: RuleId,
    pub pattern: UrlPattern,
    pub method: Option<Method>,
    pub mock: Option<MockResponse>,
    pub alias: Option<String>,
    pub times: Option<usize>,
    pub matched: usize,
}

impl InterceptionRule {
    /// Whether this rule applies to the request; exhausted rules never do
    pub fn matches(&self, method: &Method, url: &str) -> bool {
        if self.is_exhausted() {
            return false;
        }
        if let Some(ref m) = self.method {
            if m != method {
                return false;
            }
        }
        self.pattern.matches(url)
    }

    pub fn is_exhausted(&self) -> bool {
        self.times.map_or(false, |limit| self.matched >= limit)
    }
}

/// Handle returned on registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteHandle {
    pub rule_id: RuleId,
    pub alias: Option<String>,
    pub pattern: String,
}
