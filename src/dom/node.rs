// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Arena-backed DOM nodes
//!
//! Nodes live in a shared map keyed by [`NodeId`]. A [`Node`] is a cheap
//! handle into that map, so element handles returned to tests observe later
//! DOM actions on the same page.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Shared node storage
pub(crate) type NodeStore = Arc<RwLock<HashMap<NodeId, NodeData>>>;

/// Unique node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a fresh identifier
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of node stored in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
    Doctype,
}

/// Node payload
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Lower-cased tag name for elements
    pub tag: Option<String>,
    /// Text for text and comment nodes
    pub text: Option<String>,
    /// Attributes, names lower-cased
    pub attributes: HashMap<String, String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl NodeData {
    fn blank(kind: NodeKind) -> Self {
        Self {
            kind,
            tag: None,
            text: None,
            attributes: HashMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn element(tag: impl Into<String>) -> Self {
        let mut data = Self::blank(NodeKind::Element);
        data.tag = Some(tag.into().to_lowercase());
        data
    }

    pub fn text(content: impl Into<String>) -> Self {
        let mut data = Self::blank(NodeKind::Text);
        data.text = Some(content.into());
        data
    }

    pub fn comment(content: impl Into<String>) -> Self {
        let mut data = Self::blank(NodeKind::Comment);
        data.text = Some(content.into());
        data
    }

    pub fn document() -> Self {
        Self::blank(NodeKind::Document)
    }

    pub fn doctype() -> Self {
        Self::blank(NodeKind::Doctype)
    }
}

/// Handle to a node in a document's arena
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    store: NodeStore,
}

impl Node {
    pub(crate) fn new(id: NodeId, store: NodeStore) -> Self {
        Self { id, store }
    }

    fn read<T>(&self, f: impl FnOnce(&NodeData) -> T) -> Option<T> {
        self.store.read().get(&self.id).map(f)
    }

    fn handle(&self, id: NodeId) -> Node {
        Node::new(id, self.store.clone())
    }

    /// Node kind; a node removed from the arena reads as a comment
    pub fn kind(&self) -> NodeKind {
        self.read(|n| n.kind).unwrap_or(NodeKind::Comment)
    }

    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    /// Lower-cased tag name
    pub fn local_name(&self) -> Option<String> {
        self.read(|n| n.tag.clone()).flatten()
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let store = self.store.read();
        let mut out = String::new();
        collect_text(&store, self.id, &mut out);
        out
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.read(|n| n.attributes.get(&name.to_lowercase()).cloned())
            .flatten()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Some(node) = self.store.write().get_mut(&self.id) {
            node.attributes.insert(name.into().to_lowercase(), value.into());
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        if let Some(node) = self.store.write().get_mut(&self.id) {
            node.attributes.remove(&name.to_lowercase());
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.read(|n| n.attributes.contains_key(&name.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn attributes(&self) -> HashMap<String, String> {
        self.read(|n| n.attributes.clone()).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<Node> {
        self.read(|n| n.parent).flatten().map(|id| self.handle(id))
    }

    pub fn children(&self) -> Vec<Node> {
        self.read(|n| n.children.clone())
            .unwrap_or_default()
            .into_iter()
            .map(|id| self.handle(id))
            .collect()
    }

    /// Element siblings before this node, nearest last
    pub fn preceding_element_siblings(&self) -> Vec<Node> {
        let Some(parent) = self.parent() else {
            return Vec::new();
        };
        parent
            .children()
            .into_iter()
            .take_while(|c| c.id != self.id)
            .filter(Node::is_element)
            .collect()
    }

    /// Element siblings after this node
    pub fn following_element_siblings(&self) -> Vec<Node> {
        let Some(parent) = self.parent() else {
            return Vec::new();
        };
        parent
            .children()
            .into_iter()
            .skip_while(|c| c.id != self.id)
            .skip(1)
            .filter(Node::is_element)
            .collect()
    }

    /// Pre-order walk of all descendant elements, excluding self
    pub fn descendant_elements(&self) -> Vec<Node> {
        let store = self.store.read();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = store
            .get(&self.id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(id) = stack.pop() {
            if let Some(data) = store.get(&id) {
                if data.kind == NodeKind::Element {
                    out.push(Node::new(id, self.store.clone()));
                }
                stack.extend(data.children.iter().rev().copied());
            }
        }
        out
    }
}

fn collect_text(store: &HashMap<NodeId, NodeData>, id: NodeId, out: &mut String) {
    let Some(node) = store.get(&id) else {
        return;
    };
    match node.kind {
        NodeKind::Text => out.push_str(node.text.as_deref().unwrap_or("")),
        NodeKind::Element | NodeKind::Document => {
            for &child in &node.children {
                collect_text(store, child, out);
            }
        }
        NodeKind::Comment | NodeKind::Doctype => {}
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
