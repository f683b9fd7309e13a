// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Preconditions: interception rules, spies and stubs

use std::sync::Arc;

use super::context::ContextState;
use super::spy::{Spy, Stub};
use crate::error::Result;
use crate::network::{InterceptSpec, RouteHandle};

/// Arrange step of a test
#[derive(Clone)]
pub struct Given {
    state: Arc<ContextState>,
}

impl Given {
    pub(crate) fn new(state: Arc<ContextState>) -> Self {
        Self { state }
    }

    /// Install an interception rule; matching page requests are answered by
    /// the mock (if any) and recorded under the alias (if any)
    ///
    /// ```rust,no_run
    /// # use testhook::{HelperConfig, InterceptSpec, TestContext};
    /// # fn demo() -> testhook::Result<()> {
    /// let ctx = TestContext::start(HelperConfig::default())?;
    /// ctx.given().intercept_and_mock_response(
    ///     InterceptSpec::new("**/x")
    ///         .method("POST")
    ///         .response(serde_json::json!({ "shelly": "go" }))
    ///         .alias("postX"),
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn intercept_and_mock_response(&self, spec: InterceptSpec) -> Result<RouteHandle> {
        self.state.network().intercept(spec)
    }

    /// Remove a previously installed rule; exchanges already recorded stay
    pub fn remove_intercept(&self, handle: &RouteHandle) -> bool {
        self.state.registry().remove_rule(handle.rule_id)
    }

    /// Wrap `f` so every call is recorded before delegating
    pub fn spy_on<A, R, F>(&self, name: impl Into<String>, f: F) -> Spy<A, R>
    where
        A: Clone + Send + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let spy = Spy::new(name, f);
        self.state.spies.register_spy(&spy);
        spy
    }

    /// Stand-in returning `R::default()` until configured
    pub fn stub<A, R>(&self, name: impl Into<String>) -> Stub<A, R>
    where
        A: Clone + Send + 'static,
        R: Clone + Default,
    {
        let stub = Stub::new(name);
        self.state.spies.register_stub(&stub);
        stub
    }
}

impl std::fmt::Debug for Given {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Given").finish_non_exhaustive()
    }
}
