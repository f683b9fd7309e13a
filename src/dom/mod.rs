// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DOM for the in-process runner
//!
//! Built on top of html5ever. Elements are located by test-hook attribute
//! and mutated in place by DOM actions.

mod document;
mod element;
mod node;
mod parser;
mod selector;
mod style;

pub use document::Document;
pub use element::Element;
pub use node::{Node, NodeId, NodeKind};
pub use parser::{parse_html, parse_html_with_url};
pub use selector::{Combinator, NthExpr, Selector, Specificity};
pub use style::{computed_style, ComputedStyle};
