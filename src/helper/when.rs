// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Actions against the page under test

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use super::context::ContextState;
use crate::dom::{Element, Selector};
use crate::error::{Error, Result};
use crate::http::{Request, Response};
use crate::network::InterceptedExchange;

/// Act step of a test, optionally scoped to a container element
#[derive(Clone)]
pub struct When {
    state: Arc<ContextState>,
    scope: Option<Element>,
}

impl When {
    pub(crate) fn new(state: Arc<ContextState>, scope: Option<Element>) -> Self {
        Self { state, scope }
    }

    /// Load a page through the network
    pub async fn visit(&self, url: &str) -> Result<Response> {
        self.state.page.visit(url).await
    }

    /// Replace the document directly
    pub fn set_content(&self, html: &str) -> Result<()> {
        self.state.page.set_content(html)
    }

    /// Page fetch; relative URLs resolve against the current location
    pub async fn fetch(&self, method: &str, url: &str) -> Result<Response> {
        let request = self.state.page.request(parse_method(method)?, url)?;
        self.state.page.fetch(request).await
    }

    /// Page fetch with a JSON body
    pub async fn fetch_json<T: Serialize>(&self, method: &str, url: &str, body: &T) -> Result<Response> {
        let request = self.state.page.request(parse_method(method)?, url)?.json(body)?;
        self.state.page.fetch(request).await
    }

    /// Issue a fully built request from the page
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.state.page.fetch(request).await
    }

    /// Click the `index`-th element carrying `hook`
    ///
    /// Checkboxes toggle, radios become checked, submit controls submit
    /// their form and links navigate.
    pub async fn click(&self, hook: &str, index: usize) -> Result<()> {
        let label = self.state.hook_label(hook);
        let element = self.locate(hook, index).await?;
        ensure_enabled(&element, "click", &label)?;
        debug!(selector = %label, tag = %element.local_name(), "click");

        if element.is_checkable() {
            if element.input_type().as_deref() == Some("radio") {
                self.check_radio(&element)?;
            } else {
                element.set_checked(!element.checked());
            }
            return Ok(());
        }

        if element.is_submit_control() {
            if let Some(form) = element.form() {
                self.state.page.submit_form(&form, Some(&element)).await?;
            }
            return Ok(());
        }

        if let Some(href) = element.href() {
            self.state.page.follow(&href).await?;
        }
        Ok(())
    }

    /// Append `text` to an input or textarea
    pub async fn type_text(&self, hook: &str, text: &str, index: usize) -> Result<()> {
        let label = self.state.hook_label(hook);
        let element = self.locate(hook, index).await?;
        ensure_editable(&element, "type", &label)?;

        let mut value = element.value().unwrap_or_default();
        value.push_str(text);
        element.set_value(value);
        Ok(())
    }

    /// Empty an input or textarea
    pub async fn clear(&self, hook: &str, index: usize) -> Result<()> {
        let label = self.state.hook_label(hook);
        let element = self.locate(hook, index).await?;
        ensure_editable(&element, "clear", &label)?;
        element.set_value("");
        Ok(())
    }

    /// Select an `<option>` by value, falling back to its text
    pub async fn select_option(&self, hook: &str, option: &str, index: usize) -> Result<()> {
        let label = self.state.hook_label(hook);
        let element = self.locate(hook, index).await?;
        ensure_enabled(&element, "select", &label)?;
        if element.local_name() != "select" {
            return Err(Error::action("select", label, "element is not a <select>"));
        }

        let options = element.options();
        let chosen = options
            .iter()
            .find(|o| o.get_attribute("value").as_deref() == Some(option))
            .or_else(|| options.iter().find(|o| o.text_content().trim() == option.trim()))
            .ok_or_else(|| {
                Error::action("select", label.clone(), format!("no option matching '{}'", option))
            })?;
        if chosen.has_attribute("disabled") {
            return Err(Error::action("select", label, format!("option '{}' is disabled", option)));
        }
        element.select_option(chosen);
        Ok(())
    }

    /// Check a checkbox or radio
    pub async fn check(&self, hook: &str, index: usize) -> Result<()> {
        let label = self.state.hook_label(hook);
        let element = self.locate(hook, index).await?;
        ensure_checkable(&element, "check", &label)?;
        if element.input_type().as_deref() == Some("radio") {
            self.check_radio(&element)
        } else {
            element.set_checked(true);
            Ok(())
        }
    }

    /// Uncheck a checkbox
    pub async fn uncheck(&self, hook: &str, index: usize) -> Result<()> {
        let label = self.state.hook_label(hook);
        let element = self.locate(hook, index).await?;
        ensure_checkable(&element, "uncheck", &label)?;
        if element.input_type().as_deref() == Some("radio") {
            return Err(Error::action("uncheck", label, "radios can only be checked"));
        }
        element.set_checked(false);
        Ok(())
    }

    /// Check the `index`-th radio input in the current scope
    pub async fn toggle(&self, index: usize) -> Result<()> {
        let selector = Selector::parse("input[type=radio i]")?;
        let label = "input[type=radio]";
        let element = self
            .state
            .locate(self.scope.as_ref(), &selector, label, index)
            .await?;
        ensure_enabled(&element, "check", label)?;
        self.check_radio(&element)
    }

    /// Check the `index`-th radio carrying `hook`
    pub async fn toggle_radio_by_selector(&self, hook: &str, index: usize) -> Result<()> {
        let label = self.state.hook_label(hook);
        let element = self.locate(hook, index).await?;
        ensure_enabled(&element, "check", &label)?;
        if element.input_type().as_deref() != Some("radio") {
            return Err(Error::action("check", label, "element is not a radio input"));
        }
        self.check_radio(&element)
    }

    /// Actions scoped to the first element carrying `hook`
    pub async fn within(&self, hook: &str) -> Result<When> {
        let container = self.locate(hook, 0).await?;
        Ok(When::new(self.state.clone(), Some(container)))
    }

    /// Wait for the latest exchange recorded under `alias`
    pub async fn wait_for_response(&self, alias: &str) -> Result<InterceptedExchange> {
        self.state.resolve_alias(alias).await
    }

    pub async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn locate(&self, hook: &str, index: usize) -> Result<Element> {
        self.state
            .locate_hook(self.scope.as_ref(), hook, index)
            .await
    }

    /// Check `radio` and uncheck the rest of its group
    fn check_radio(&self, radio: &Element) -> Result<()> {
        if let Some(name) = radio.get_attribute("name") {
            let group_selector = Selector::parse("input[type=radio i]")?;
            let candidates = match radio.form() {
                Some(form) => form.select(&group_selector),
                None => self.state.page.require_document()?.select(&group_selector),
            };
            for other in candidates {
                if other.get_attribute("name").as_deref() == Some(name.as_str()) && other != *radio {
                    other.set_checked(false);
                }
            }
        }
        radio.set_checked(true);
        Ok(())
    }
}

impl std::fmt::Debug for When {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("When")
            .field("scoped", &self.scope.is_some())
            .finish()
    }
}

fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| Error::InvalidMethod(method.to_string()))
}

fn ensure_enabled(element: &Element, action: &str, label: &str) -> Result<()> {
    if element.disabled() {
        return Err(Error::action(action, label, "element is disabled"));
    }
    Ok(())
}

fn ensure_editable(element: &Element, action: &str, label: &str) -> Result<()> {
    ensure_enabled(element, action, label)?;
    if !element.is_editable() {
        return Err(Error::action(
            action,
            label,
            format!("<{}> is not an editable field", element.local_name()),
        ));
    }
    Ok(())
}

fn ensure_checkable(element: &Element, action: &str, label: &str) -> Result<()> {
    ensure_enabled(element, action, label)?;
    if !element.is_checkable() {
        return Err(Error::action(action, label, "element is not a checkbox or radio"));
    }
    Ok(())
}
