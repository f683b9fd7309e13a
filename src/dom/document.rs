// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Document representation

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use url::Url;

use super::element::Element;
use super::node::{Node, NodeData, NodeId, NodeStore};
use super::selector::Selector;

/// Parsed HTML document
#[derive(Debug, Clone)]
pub struct Document {
    /// Location the document was loaded from
    pub url: Option<Url>,
    root_id: NodeId,
    pub(crate) nodes: NodeStore,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        let root_id = NodeId::new();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, NodeData::document());

        Self {
            url: None,
            root_id,
            nodes: Arc::new(RwLock::new(nodes)),
        }
    }

    /// Create an empty document with a URL
    pub fn with_url(url: Url) -> Self {
        let mut doc = Self::new();
        doc.url = Some(url);
        doc
    }

    /// The document node
    pub fn root(&self) -> Node {
        Node::new(self.root_id, self.nodes.clone())
    }

    /// Text of the first `<title>`
    pub fn title(&self) -> String {
        self.query_selector("title")
            .map(|t| t.text_content().trim().to_string())
            .unwrap_or_default()
    }

    pub fn body(&self) -> Option<Element> {
        self.query_selector("body")
    }

    /// All elements matching a parsed selector, in document order
    pub fn select(&self, selector: &Selector) -> Vec<Element> {
        self.root()
            .descendant_elements()
            .into_iter()
            .filter(|n| selector.matches(n))
            .filter_map(Element::new)
            .collect()
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        Selector::parse(selector)
            .map(|sel| self.select(&sel))
            .unwrap_or_default()
    }

    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// Elements carrying `attribute="value"`
    pub fn find_by_hook(&self, attribute: &str, value: &str) -> Vec<Element> {
        self.select(&Selector::hook(attribute, value))
    }

    /// Distinct values of a hook attribute with their element counts
    pub fn hook_values(&self, attribute: &str) -> Vec<(String, usize)> {
        let attribute = attribute.to_lowercase();
        let mut counts: Vec<(String, usize)> = Vec::new();
        for node in self.root().descendant_elements() {
            if let Some(value) = node.get_attribute(&attribute) {
                match counts.iter_mut().find(|(v, _)| *v == value) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((value, 1)),
                }
            }
        }
        counts
    }

    /// First element, innermost within its subtree, whose text equals `text`
    /// after trimming
    pub fn find_by_text(&self, text: &str) -> Option<Element> {
        find_text_within(&self.root(), text)
    }

    /// Concatenated text of every `<style>` block, in source order
    pub fn style_sheets(&self) -> Vec<String> {
        self.query_selector_all("style")
            .into_iter()
            .map(|s| s.text_content())
            .collect()
    }

    /// Whole-document text
    pub fn text_content(&self) -> String {
        self.root().text_content()
    }
}

/// Text lookup shared by documents and scoped elements
pub(crate) fn find_text_within(root: &Node, text: &str) -> Option<Element> {
    let wanted = text.trim();
    let matches = root
        .descendant_elements()
        .into_iter()
        .filter(|n| {
            !matches!(
                n.local_name().as_deref(),
                Some("script" | "style" | "head" | "title")
            )
        })
        .filter(|n| n.text_content().trim() == wanted)
        .filter_map(Element::new);

    let mut best: Option<Element> = None;
    for candidate in matches {
        match &best {
            Some(current) if !candidate.is_inside(current) => break,
            _ => best = Some(candidate),
        }
    }
    best
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
