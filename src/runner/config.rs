// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Helper configuration

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use crate::network::{RulePrecedence, DEFAULT_MAX_EXCHANGES_PER_ALIAS};
use crate::wait::{BoundedWait, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};

/// Attribute used to locate elements unless configured otherwise
pub const DEFAULT_HOOK_ATTRIBUTE: &str = "data-hook";

/// Prefix for process environment lookups
pub const ENV_PREFIX: &str = "TESTHOOK_";

/// Helper configuration
#[derive(Debug, Clone)]
pub struct HelperConfig {
    /// Attribute elements are located by, `[<attr>='<hook>']`
    pub hook_attribute: String,
    /// Bounded wait for aliases and elements
    pub default_timeout: Duration,
    /// Poll interval when nothing signals a change
    pub poll_interval: Duration,
    /// Which overlapping rule answers
    pub precedence: RulePrecedence,
    /// Test environment values for `Get::env`
    pub env: HashMap<String, String>,
    /// Passthrough client settings
    pub http: HttpClientConfig,
    pub max_exchanges_per_alias: usize,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            hook_attribute: DEFAULT_HOOK_ATTRIBUTE.to_string(),
            default_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            precedence: RulePrecedence::default(),
            env: HashMap::new(),
            http: HttpClientConfig::default(),
            max_exchanges_per_alias: DEFAULT_MAX_EXCHANGES_PER_ALIAS,
        }
    }
}

impl HelperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `TESTHOOK_TIMEOUT_MS`, `TESTHOOK_POLL_MS` and
    /// `TESTHOOK_HOOK_ATTRIBUTE`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(ms) = read_env_millis("TIMEOUT_MS")? {
            config.default_timeout = ms;
        }
        if let Some(ms) = read_env_millis("POLL_MS")? {
            config.poll_interval = ms;
        }
        if let Ok(attr) = std::env::var(format!("{}HOOK_ATTRIBUTE", ENV_PREFIX)) {
            if !attr.trim().is_empty() {
                config.hook_attribute = attr.trim().to_string();
            }
        }

        Ok(config)
    }

    pub fn hook_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.hook_attribute = attribute.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn precedence(mut self, precedence: RulePrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn env_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    pub fn http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    pub fn max_exchanges_per_alias(mut self, max: usize) -> Self {
        self.max_exchanges_per_alias = max;
        self
    }

    /// Merge a JSON object of environment values from `path`
    ///
    /// Non-string values are stored in their JSON form.
    pub fn with_env_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let object = value.as_object().ok_or_else(|| {
            Error::Config(format!("{} must contain a JSON object", path.display()))
        })?;

        for (name, value) in object {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.env.insert(name.clone(), value);
        }
        Ok(self)
    }

    /// Wait settings shared by every accessor
    pub fn bounded_wait(&self) -> BoundedWait {
        BoundedWait::new(self.default_timeout, self.poll_interval)
    }

    /// Config map first, then `TESTHOOK_<NAME>` from the process environment
    pub fn env_value(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned().or_else(|| {
            std::env::var(format!("{}{}", ENV_PREFIX, name.to_ascii_uppercase())).ok()
        })
    }
}

fn read_env_millis(suffix: &str) -> Result<Option<Duration>> {
    let key = format!("{}{}", ENV_PREFIX, suffix);
    match std::env::var(&key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| Error::Config(format!("{}: {}", key, e))),
        Err(_) => Ok(None),
    }
}
