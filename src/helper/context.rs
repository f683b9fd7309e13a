// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-test state and lifecycle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::get::Get;
use super::given::Given;
use super::spy::SpyRegistry;
use super::when::When;
use crate::dom::{Element, Selector};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::network::{AliasRegistry, InterceptedExchange, Network, Transport};
use crate::runner::{HelperConfig, Page};
use crate::wait::Resolution;

/// State shared by the Given/When/Get handles of one test
pub(crate) struct ContextState {
    pub(crate) config: HelperConfig,
    pub(crate) page: Page,
    pub(crate) spies: SpyRegistry,
}

impl ContextState {
    pub(crate) fn network(&self) -> &Network {
        self.page.network()
    }

    pub(crate) fn registry(&self) -> &Arc<AliasRegistry> {
        self.page.network().registry()
    }

    /// `[<attr>='<hook>']`, as reported in errors
    pub(crate) fn hook_label(&self, hook: &str) -> String {
        format!("[{}='{}']", self.config.hook_attribute, hook)
    }

    /// Matches of `selector` inside `scope`, or the whole document
    pub(crate) fn select_now(&self, scope: Option<&Element>, selector: &Selector) -> Vec<Element> {
        match scope {
            Some(container) => container.select(selector),
            None => self
                .page
                .document()
                .map(|doc| doc.select(selector))
                .unwrap_or_default(),
        }
    }

    /// Wait for the `index`-th element matching `selector`
    pub(crate) async fn locate(
        &self,
        scope: Option<&Element>,
        selector: &Selector,
        label: &str,
        index: usize,
    ) -> Result<Element> {
        self.try_locate(scope, selector, label, index)
            .await?
            .or_else_err(|ms| Error::element_not_found(indexed(label, index), ms))
    }

    pub(crate) async fn try_locate(
        &self,
        scope: Option<&Element>,
        selector: &Selector,
        label: &str,
        index: usize,
    ) -> Result<Resolution<Element>> {
        self.config
            .bounded_wait()
            .resolve(label, Some(self.registry().subscribe()), || {
                Ok(self.select_now(scope, selector).into_iter().nth(index))
            })
            .await
    }

    /// Wait for the element carrying `hook`
    pub(crate) async fn locate_hook(
        &self,
        scope: Option<&Element>,
        hook: &str,
        index: usize,
    ) -> Result<Element> {
        let selector = Selector::hook(&self.config.hook_attribute, hook);
        self.locate(scope, &selector, &self.hook_label(hook), index)
            .await
    }

    /// Wait for the latest exchange recorded under `alias`
    pub(crate) async fn resolve_alias(&self, alias: &str) -> Result<InterceptedExchange> {
        let registry = self.registry();
        self.config
            .bounded_wait()
            .resolve(alias, Some(registry.subscribe()), || Ok(registry.latest(alias)))
            .await?
            .or_else_err(|ms| Error::alias_not_resolved(alias, ms))
    }

    fn clear(&self) {
        self.network().clear();
        self.spies.clear();
        self.page.reset();
    }
}

fn indexed(label: &str, index: usize) -> String {
    if index == 0 {
        label.to_string()
    } else {
        format!("{} (index {})", label, index)
    }
}

/// Per-test context owning the page, the alias registry and the spies
///
/// Teardown runs on drop if it was not called explicitly, so rules,
/// exchanges and spies never leak into the next test.
pub struct TestContext {
    state: Arc<ContextState>,
    torn_down: AtomicBool,
}

impl TestContext {
    /// Start a context whose passthrough traffic uses reqwest
    pub fn start(config: HelperConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http.clone())?;
        Ok(Self::with_transport(config, Arc::new(client)))
    }

    /// Start a context over a custom passthrough transport
    pub fn with_transport(config: HelperConfig, transport: Arc<dyn Transport>) -> Self {
        let registry = Arc::new(AliasRegistry::new(config.max_exchanges_per_alias));
        let network = Network::new(transport, registry, config.precedence);
        info!(
            hook_attribute = %config.hook_attribute,
            timeout_ms = config.default_timeout.as_millis() as u64,
            precedence = ?config.precedence,
            "test context started"
        );

        Self {
            state: Arc::new(ContextState {
                config,
                page: Page::new(network),
                spies: SpyRegistry::new(),
            }),
            torn_down: AtomicBool::new(false),
        }
    }

    pub fn given(&self) -> Given {
        Given::new(self.state.clone())
    }

    pub fn when(&self) -> When {
        When::new(self.state.clone(), None)
    }

    pub fn get(&self) -> Get {
        Get::new(self.state.clone(), None)
    }

    pub fn page(&self) -> &Page {
        &self.state.page
    }

    pub fn network(&self) -> &Network {
        self.state.network()
    }

    pub fn config(&self) -> &HelperConfig {
        &self.state.config
    }

    /// Discard rules, exchanges, spies, document and location
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.state.clear();
        debug!("test context torn down");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for TestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestContext")
            .field("page", &self.state.page)
            .field("network", self.state.network())
            .field("spies", &self.state.spies)
            .finish()
    }
}

/// Reusable configuration that starts a fresh context per test
#[derive(Debug, Clone, Default)]
pub struct TestHelper {
    config: HelperConfig,
}

impl TestHelper {
    pub fn new(config: HelperConfig) -> Self {
        Self { config }
    }

    /// Fresh context; tear it down (or drop it) when the test ends
    pub fn start(&self) -> Result<TestContext> {
        TestContext::start(self.config.clone())
    }

    pub fn start_with_transport(&self, transport: Arc<dyn Transport>) -> TestContext {
        TestContext::with_transport(self.config.clone(), transport)
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }
}
