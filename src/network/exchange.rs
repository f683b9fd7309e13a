// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Captured request/response exchanges

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use super::rule::RuleId;
use crate::http::{Request, Response};

/// One request/response pair observed by the network
///
/// Immutable once recorded. The same exchange is stored under every alias
/// whose rule matched the request, each copy carrying its own `alias`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptedExchange {
    /// Exchange ID, shared across alias copies
    pub id: String,
    /// Monotonic capture order within the registry
    pub sequence: u64,
    /// Alias this copy is stored under
    pub alias: Option<String>,
    /// Rule that matched and carried this alias
    pub rule_id: Option<RuleId>,
    pub request: CapturedRequest,
    pub response: Option<CapturedResponse>,
    /// Passthrough failure, if any
    pub error: Option<String>,
    /// Answered by a mock
    pub mocked: bool,
    pub captured_at: DateTime<Utc>,
    pub duration: Duration,
}

/// Request as the network saw it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
    pub url: String,
    pub method: String,
    /// Percent-decoded query parameters, first occurrence of each name
    pub query_params: HashMap<String, String>,
    /// Lower-cased header names
    pub headers: HashMap<String, String>,
    /// Body as text, invalid UTF-8 replaced
    pub body: Option<String>,
    /// Body exactly as sent
    #[serde(skip)]
    pub raw_body: Option<Bytes>,
}

/// Response delivered to the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    /// Body as text, invalid UTF-8 replaced
    pub body: Option<String>,
    /// Body exactly as received
    #[serde(skip)]
    pub raw_body: Option<Bytes>,
}

impl CapturedRequest {
    pub fn from_request(request: &Request) -> Self {
        let mut query_params = HashMap::new();
        for (name, value) in request.url.query_pairs() {
            query_params
                .entry(name.into_owned())
                .or_insert_with(|| value.into_owned());
        }

        Self {
            url: request.url.to_string(),
            method: request.method.to_string(),
            query_params,
            headers: flatten_headers(&request.headers),
            body: request
                .body
                .as_ref()
                .map(|b| String::from_utf8_lossy(b).into_owned()),
            raw_body: request.body.clone(),
        }
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Body parsed as JSON; bytes that are not UTF-8 fail to parse
    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        parse_body(self.raw_body.as_ref(), self.body.as_deref())
    }
}

impl CapturedResponse {
    pub fn from_response(response: &Response) -> Self {
        Self {
            status: response.status_code(),
            headers: flatten_headers(&response.headers),
            body: (!response.body.is_empty()).then(|| response.text_lossy()),
            raw_body: (!response.body.is_empty()).then(|| response.body.clone()),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        parse_body(self.raw_body.as_ref(), self.body.as_deref())
    }
}

impl InterceptedExchange {
    pub fn is_success(&self) -> bool {
        self.response
            .as_ref()
            .map(|r| (200..300).contains(&r.status))
            .unwrap_or(false)
    }

    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }
}

/// Raw bytes win; the text form only backs deserialized snapshots
fn parse_body(raw: Option<&Bytes>, text: Option<&str>) -> serde_json::Result<serde_json::Value> {
    match raw {
        Some(bytes) => serde_json::from_slice(bytes),
        None => serde_json::from_str(text.unwrap_or("")),
    }
}

/// Repeated header names are joined with ", "
fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut out: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        out.entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    out
}
