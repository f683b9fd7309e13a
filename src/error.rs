// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for testhook
//!
//! Every failure names what it was waiting on or parsing: the alias, the
//! test-hook selector, or the URL. Nothing is reported as an empty value.

use thiserror::Error;

/// Result type alias for testhook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for testhook
#[derive(Error, Debug)]
pub enum Error {
    /// No exchange was captured for the alias before the wait deadline
    #[error("alias '@{alias}' never resolved: wait timed out after {waited_ms}ms")]
    AliasNotResolved { alias: String, waited_ms: u64 },

    /// A presence-assuming accessor found no element before the wait deadline
    #[error("element '{selector}' not found: wait timed out after {waited_ms}ms")]
    ElementNotFound { selector: String, waited_ms: u64 },

    /// Any other bounded wait that ran out
    #[error("operation timed out after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// Captured body was not well-formed JSON
    #[error("body of '@{alias}' is not valid JSON: {source}")]
    BodyParse {
        alias: String,
        #[source]
        source: serde_json::Error,
    },

    /// URL pattern rejected by the registrar
    #[error("invalid URL pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Method is not a standard HTTP verb
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// DOM action refused by the target element
    #[error("cannot {action} '{selector}': {reason}")]
    Action {
        action: String,
        selector: String,
        reason: String,
    },

    /// Page visit failed
    #[error("navigation to {url} failed: {reason}")]
    Navigation {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// Selector parsing error
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    /// DOM operation failed
    #[error("DOM error: {0}")]
    Dom(String),

    /// HTML parsing failed
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// Passthrough request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an unresolved-alias error
    pub fn alias_not_resolved(alias: impl Into<String>, waited_ms: u64) -> Self {
        Error::AliasNotResolved {
            alias: alias.into(),
            waited_ms,
        }
    }

    /// Create an element-not-found error
    pub fn element_not_found(selector: impl Into<String>, waited_ms: u64) -> Self {
        Error::ElementNotFound {
            selector: selector.into(),
            waited_ms,
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    /// Create a body parse error
    pub fn body_parse(alias: impl Into<String>, source: serde_json::Error) -> Self {
        Error::BodyParse {
            alias: alias.into(),
            source,
        }
    }

    /// Create a pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create an action error
    pub fn action(
        action: impl Into<String>,
        selector: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Action {
            action: action.into(),
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Create a navigation error
    pub fn navigation(url: impl Into<String>, status: Option<u16>, reason: impl Into<String>) -> Self {
        Error::Navigation {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Create a selector error
    pub fn selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Selector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Create a DOM error
    pub fn dom<S: Into<String>>(msg: S) -> Self {
        Error::Dom(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error came from a bounded wait running out
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::AliasNotResolved { .. } | Error::ElementNotFound { .. } | Error::Timeout { .. }
        )
    }

    /// Alias named by the error, if any
    pub fn alias(&self) -> Option<&str> {
        match self {
            Error::AliasNotResolved { alias, .. } | Error::BodyParse { alias, .. } => Some(alias),
            _ => None,
        }
    }

    /// Selector named by the error, if any
    pub fn selector_name(&self) -> Option<&str> {
        match self {
            Error::ElementNotFound { selector, .. }
            | Error::Action { selector, .. }
            | Error::Selector { selector, .. } => Some(selector),
            _ => None,
        }
    }

    /// HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Navigation { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Prefix the error with an operation description
    fn context(self, msg: &str) -> Result<T>;

    /// Attach an alias to a JSON failure
    fn with_alias(self, alias: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }

    fn with_alias(self, alias: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::Serialization(source) => Error::body_parse(alias, source),
            other => other,
        })
    }
}
