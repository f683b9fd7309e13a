// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page under test

use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;
use reqwest::Method;
use tracing::{debug, info};
use url::Url;

use super::form::Form;
use crate::dom::{parse_html_with_url, Document, Element};
use crate::error::{Error, Result};
use crate::http::{Request, Response};
use crate::network::Network;

/// Page holding the current document and location
///
/// All traffic, navigations included, goes through the [`Network`], so
/// interception rules see every request the page makes.
#[derive(Clone)]
pub struct Page {
    network: Network,
    url: Arc<RwLock<Option<Url>>>,
    document: Arc<RwLock<Option<Document>>>,
    last_response: Arc<RwLock<Option<Response>>>,
    history: Arc<RwLock<Vec<String>>>,
}

impl Page {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            url: Arc::new(RwLock::new(None)),
            document: Arc::new(RwLock::new(None)),
            last_response: Arc::new(RwLock::new(None)),
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Navigate to a URL; relative URLs resolve against the current location
    pub async fn visit(&self, url: &str) -> Result<Response> {
        let target = self.resolve(url)?;
        info!(url = %target, "visiting page");

        let response = self.network.execute(Request::from_url(Method::GET, target.clone())).await?;

        if !response.is_success() {
            return Err(Error::navigation(
                target.as_str(),
                Some(response.status_code()),
                "server responded with a non-2xx status",
            ));
        }
        if !response.is_html() {
            return Err(Error::navigation(
                target.as_str(),
                Some(response.status_code()),
                format!(
                    "expected text/html, got {}",
                    response.content_type().unwrap_or("no content type")
                ),
            ));
        }

        self.load(&response)?;
        Ok(response)
    }

    /// Replace the document without network traffic
    pub fn set_content(&self, html: &str) -> Result<()> {
        let doc = parse_html_with_url(html, self.location())?;
        *self.document.write() = Some(doc);
        Ok(())
    }

    /// Build a request, resolving `url` against the current location
    pub fn request(&self, method: Method, url: &str) -> Result<Request> {
        Ok(Request::from_url(method, self.resolve(url)?))
    }

    /// Issue a fetch from the page
    pub async fn fetch(&self, request: Request) -> Result<Response> {
        debug!(method = %request.method, url = %request.url, "page fetch");
        self.network.execute(request).await
    }

    /// Issue several fetches concurrently, results in input order
    pub async fn fetch_all(&self, requests: Vec<Request>) -> Vec<Result<Response>> {
        join_all(requests.into_iter().map(|r| self.fetch(r))).await
    }

    /// Submit a form through the network; an HTML answer becomes the document
    pub async fn submit_form(&self, form: &Element, submitter: Option<&Element>) -> Result<Response> {
        let form = Form::from_element(form, submitter);
        let base = self.location();
        let request = form.to_request(base.as_ref())?;
        info!(method = %request.method, url = %request.url, "submitting form");

        let response = self.network.execute(request).await?;
        if response.is_html() {
            self.load(&response)?;
        }
        Ok(response)
    }

    /// Follow a link target
    pub async fn follow(&self, href: &str) -> Result<Response> {
        let target = self.resolve(href)?;
        if target.scheme() == "javascript" {
            return Err(Error::action("click", href, "javascript: links are not supported"));
        }
        self.visit(target.as_str()).await
    }

    fn load(&self, response: &Response) -> Result<()> {
        let doc = parse_html_with_url(&response.text_lossy(), Some(response.url.clone()))?;
        *self.url.write() = Some(response.url.clone());
        *self.document.write() = Some(doc);
        *self.last_response.write() = Some(response.clone());
        self.history.write().push(response.url.to_string());
        Ok(())
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        match Url::parse(url) {
            Ok(u) => Ok(u),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.location().ok_or_else(|| {
                    Error::navigation(url, None, "relative URL with no current location")
                })?;
                Ok(base.join(url)?)
            }
            Err(e) => Err(Error::navigation(url, None, e.to_string())),
        }
    }

    pub fn location(&self) -> Option<Url> {
        self.url.read().clone()
    }

    /// Current URL as a string
    pub fn url(&self) -> Option<String> {
        self.url.read().as_ref().map(|u| u.to_string())
    }

    pub fn document(&self) -> Option<Document> {
        self.document.read().clone()
    }

    pub fn require_document(&self) -> Result<Document> {
        self.document()
            .ok_or_else(|| Error::dom("no document loaded; visit a page or set content first"))
    }

    pub fn last_response(&self) -> Option<Response> {
        self.last_response.read().clone()
    }

    pub fn navigation_history(&self) -> Vec<String> {
        self.history.read().clone()
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Forget document, location and history
    pub fn reset(&self) {
        *self.url.write() = None;
        *self.document.write() = None;
        *self.last_response.write() = None;
        self.history.write().clear();
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url())
            .field("loaded", &self.document.read().is_some())
            .finish()
    }
}
