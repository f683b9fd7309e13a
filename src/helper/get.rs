// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Queries: aliased exchanges and page state

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::context::ContextState;
use super::spy::SpyHandle;
use crate::dom::{computed_style, ComputedStyle, Element, Selector};
use crate::error::{Error, ErrorContext, Result};
use crate::network::InterceptedExchange;
use crate::wait::Resolution;

/// Assert step of a test, optionally scoped to a container element
///
/// Alias accessors wait for the alias's latest exchange and fail with
/// [`Error::AliasNotResolved`] on timeout. Element accessors wait for the
/// element and fail with [`Error::ElementNotFound`].
#[derive(Clone)]
pub struct Get {
    state: Arc<ContextState>,
    scope: Option<Element>,
}

impl Get {
    pub(crate) fn new(state: Arc<ContextState>, scope: Option<Element>) -> Self {
        Self { state, scope }
    }

    /// Latest exchange recorded under `alias`
    pub async fn exchange(&self, alias: &str) -> Result<InterceptedExchange> {
        self.state.resolve_alias(alias).await
    }

    /// First value of query parameter `name`, percent-decoded
    pub async fn request_query_param(&self, alias: &str, name: &str) -> Result<Option<String>> {
        let exchange = self.exchange(alias).await?;
        Ok(exchange.request.query_param(name).map(str::to_string))
    }

    /// Request body parsed as JSON
    pub async fn request_body(&self, alias: &str) -> Result<Value> {
        let exchange = self.exchange(alias).await?;
        exchange.request.body_json().with_alias(alias)
    }

    /// All request headers, names lower-cased
    pub async fn request_headers(&self, alias: &str) -> Result<HashMap<String, String>> {
        Ok(self.exchange(alias).await?.request.headers)
    }

    /// One request header, looked up case-insensitively
    pub async fn request_header(&self, alias: &str, name: &str) -> Result<Option<String>> {
        let exchange = self.exchange(alias).await?;
        Ok(exchange.request.header(name).map(str::to_string))
    }

    pub async fn request_url(&self, alias: &str) -> Result<String> {
        Ok(self.exchange(alias).await?.request.url)
    }

    /// Response body parsed as JSON
    pub async fn response_body(&self, alias: &str) -> Result<Value> {
        let exchange = self.exchange(alias).await?;
        match exchange.response {
            Some(ref response) => response.body_json().with_alias(alias),
            None => Err(Error::other(format!(
                "alias '@{}' has no response: {}",
                alias,
                exchange.error.as_deref().unwrap_or("request failed")
            ))),
        }
    }

    /// Exchanges recorded so far under `alias`, without waiting
    pub fn interception_count(&self, alias: &str) -> usize {
        self.state.registry().count(alias)
    }

    /// Every retained exchange for `alias`, oldest first, without waiting
    pub fn exchanges(&self, alias: &str) -> Vec<InterceptedExchange> {
        self.state.registry().all(alias)
    }

    pub async fn element_by_test_id(&self, hook: &str, index: usize) -> Result<Element> {
        self.state
            .locate_hook(self.scope.as_ref(), hook, index)
            .await
    }

    /// Declared style of the element: `<style>` rules, then inline style
    pub async fn elements_computed_style(&self, hook: &str, index: usize) -> Result<ComputedStyle> {
        let element = self.element_by_test_id(hook, index).await?;
        let doc = self.state.page.require_document()?;
        Ok(computed_style(&doc, &element))
    }

    pub async fn elements_attribute(
        &self,
        hook: &str,
        attribute: &str,
        index: usize,
    ) -> Result<Option<String>> {
        Ok(self
            .element_by_test_id(hook, index)
            .await?
            .get_attribute(&attribute.to_lowercase()))
    }

    /// Trimmed text content
    pub async fn elements_text(&self, hook: &str, index: usize) -> Result<String> {
        let element = self.element_by_test_id(hook, index).await?;
        Ok(element.text_content().trim().to_string())
    }

    /// Number of elements carrying `hook`, waiting for at least one
    pub async fn number_of_elements(&self, hook: &str) -> Result<usize> {
        let selector = Selector::hook(&self.state.config.hook_attribute, hook);
        self.element_by_test_id(hook, 0).await?;
        Ok(self.state.select_now(self.scope.as_ref(), &selector).len())
    }

    pub async fn is_element_disabled(&self, hook: &str, index: usize) -> Result<bool> {
        Ok(self.element_by_test_id(hook, index).await?.disabled())
    }

    pub async fn is_element_checked(&self, hook: &str, index: usize) -> Result<bool> {
        Ok(self.element_by_test_id(hook, index).await?.checked())
    }

    /// Value of a form control
    pub async fn input_value(&self, hook: &str, index: usize) -> Result<String> {
        Ok(self
            .element_by_test_id(hook, index)
            .await?
            .value()
            .unwrap_or_default())
    }

    /// Waits like the other accessors but answers `false` on timeout
    pub async fn element_exists(&self, hook: &str) -> Result<bool> {
        let selector = Selector::hook(&self.state.config.hook_attribute, hook);
        let label = self.state.hook_label(hook);
        let outcome = self
            .state
            .try_locate(self.scope.as_ref(), &selector, &label, 0)
            .await?;
        Ok(outcome.is_resolved())
    }

    /// Innermost element whose trimmed text equals `text`
    pub async fn element_by_text(&self, text: &str) -> Result<Element> {
        let label = format!("text '{}'", text);
        self.state
            .config
            .bounded_wait()
            .resolve(&label, Some(self.state.registry().subscribe()), || {
                Ok(match self.scope {
                    Some(ref container) => container.find_by_text(text),
                    None => self
                        .state
                        .page
                        .document()
                        .and_then(|doc| doc.find_by_text(text)),
                })
            })
            .await
            .and_then(|outcome: Resolution<Element>| {
                outcome.or_else_err(|ms| Error::element_not_found(label.clone(), ms))
            })
    }

    /// URL of the loaded page
    pub fn current_location(&self) -> Result<String> {
        self.state
            .page
            .url()
            .ok_or_else(|| Error::navigation("", None, "no page has been visited"))
    }

    /// Test environment value: config first, then `TESTHOOK_<NAME>`
    pub fn env(&self, name: &str) -> Option<String> {
        self.state.config.env_value(name)
    }

    /// Queries scoped to the first element carrying `hook`
    pub async fn within(&self, hook: &str) -> Result<Get> {
        let container = self.element_by_test_id(hook, 0).await?;
        Ok(Get::new(self.state.clone(), Some(container)))
    }

    /// Registered spy or stub by name
    pub fn spy(&self, name: &str) -> Option<SpyHandle> {
        self.state.spies.get(name)
    }
}

impl std::fmt::Debug for Get {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Get")
            .field("scoped", &self.scope.is_some())
            .finish()
    }
}
