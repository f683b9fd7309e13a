// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interception and exchange capture
//!
//! Rules match page requests by URL glob and method. A matching rule may
//! answer with a mock; aliased rules record the completed exchange so tests
//! can query it by name.

mod exchange;
mod interceptor;
mod pattern;
mod registry;
mod rule;

#[cfg(test)]
pub(crate) mod test_support;

pub use exchange::{CapturedRequest, CapturedResponse, InterceptedExchange};
pub use interceptor::{Network, Transport};
pub use pattern::UrlPattern;
pub use registry::{AliasRegistry, RuleMatch, DEFAULT_MAX_EXCHANGES_PER_ALIAS};
pub use rule::{
    InterceptSpec, InterceptionRule, MockBody, MockResponse, RouteHandle, RuleId, RulePrecedence,
};
