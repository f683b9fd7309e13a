// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Testhook - Given/When/Get test helper
//!
//! A fluent test vocabulary for page-level tests. Elements are addressed by
//! a hook attribute (`data-hook` by default), page traffic can be
//! intercepted and mocked, and every intercepted exchange is queryable by
//! alias after the fact.
//!
//! ## Features
//!
//! - Given: interception rules with mocks, aliases and hit limits, spies and stubs
//! - When: visit, click, type, select, check, toggle radios, fetch
//! - Get: request query/body/headers by alias, element text/style/attributes
//! - Bounded waits: every query waits up to the configured timeout
//! - In-process runner: html5ever DOM, form submission, reqwest passthrough
//!
//! ## Example
//!
//! ```rust,no_run
//! use testhook::{HelperConfig, InterceptSpec, TestContext};
//!
//! #[tokio::main]
//! async fn main() -> testhook::Result<()> {
//!     let ctx = TestContext::start(HelperConfig::default())?;
//!
//!     ctx.given().intercept_and_mock_response(
//!         InterceptSpec::new("**/shellygo/whatever**")
//!             .response(serde_json::json!({ "shelly": "go" }))
//!             .alias("shellygo"),
//!     )?;
//!
//!     ctx.when().visit("https://app.example/index.html").await?;
//!     ctx.when().fetch("GET", "/shellygo/whatever?shelly=go").await?;
//!
//!     let value = ctx.get().request_query_param("shellygo", "shelly").await?;
//!     assert_eq!(value.as_deref(), Some("go"));
//!
//!     ctx.teardown();
//!     Ok(())
//! }
//! ```

pub mod dom;
pub mod error;
pub mod helper;
pub mod http;
pub mod network;
pub mod runner;
pub mod wait;

// Re-exports for convenience

// Given/When/Get
pub use helper::{Get, Given, TestContext, TestHelper, When};

// Spies and stubs
pub use helper::{CallRecorder, Spy, SpyHandle, SpyKind, SpyRegistry, Stub};

// Runner
pub use runner::{Form, HelperConfig, Page, DEFAULT_HOOK_ATTRIBUTE};

// Network
pub use network::{
    AliasRegistry, CapturedRequest, CapturedResponse, InterceptSpec, InterceptedExchange,
    MockBody, MockResponse, Network, RouteHandle, RulePrecedence, Transport, UrlPattern,
};

// DOM
pub use dom::{ComputedStyle, Document, Element, Selector};

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{HttpClient, HttpClientConfig, Request, Response};

// Waiting
pub use wait::{BoundedWait, Resolution};

/// Testhook version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Route `tracing` output through the test harness's captured writer
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("testhook=warn")),
        )
        .with_test_writer()
        .try_init();
}
