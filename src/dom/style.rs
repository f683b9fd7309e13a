// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Declared-style resolution
//!
//! Cascades the document's `<style>` rules and the element's inline `style`
//! attribute. Values are reported as declared; there is no layout, no
//! inheritance and no color normalization.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::document::Document;
use super::element::Element;
use super::selector::{Selector, Specificity};

lazy_static! {
    static ref CSS_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();
}

/// Resolved style declarations for one element, keyed by kebab-case property
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    properties: HashMap<String, String>,
}

impl ComputedStyle {
    /// Look up a property by kebab-case (`background-color`) or camelCase
    /// (`backgroundColor`) name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties
            .get(&to_kebab_case(name))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }
}

/// One rule from a `<style>` block
#[derive(Debug, Clone)]
struct StyleRule {
    selector: Selector,
    declarations: Vec<Declaration>,
}

#[derive(Debug, Clone)]
struct Declaration {
    property: String,
    value: String,
    important: bool,
}

type Rank = (bool, bool, Specificity, usize);

/// Resolve the declared style of `element` within `document`
pub fn computed_style(document: &Document, element: &Element) -> ComputedStyle {
    // (important, inline, specificity, order) decides which declaration wins
    let mut winners: HashMap<String, (Rank, String)> = HashMap::new();
    let mut order = 0usize;

    let mut apply = |decl: Declaration, inline: bool, specificity: Specificity, order: usize| {
        let rank = (decl.important, inline, specificity, order);
        let wins = winners
            .get(&decl.property)
            .map_or(true, |(existing, _)| *existing <= rank);
        if wins {
            winners.insert(decl.property, (rank, decl.value));
        }
    };

    for sheet in document.style_sheets() {
        for rule in parse_style_sheet(&sheet) {
            if let Some(specificity) = rule.selector.matching_specificity(&element.node) {
                for decl in rule.declarations {
                    order += 1;
                    apply(decl, false, specificity, order);
                }
            }
        }
    }

    if let Some(inline) = element.get_attribute("style") {
        for decl in parse_declarations(&inline) {
            order += 1;
            apply(decl, true, (0, 0, 0), order);
        }
    }

    ComputedStyle {
        properties: winners
            .into_iter()
            .map(|(property, (_, value))| (property, value))
            .collect(),
    }
}

/// Parse top-level rules, skipping at-rules and selectors we cannot match
fn parse_style_sheet(css: &str) -> Vec<StyleRule> {
    let css = CSS_COMMENT.replace_all(css, "");
    let mut rules = Vec::new();
    let mut rest: &str = &css;

    while let Some(open) = rest.find('{') {
        let prelude = rest[..open].trim();
        let Some(close) = matching_brace(&rest[open..]) else {
            break;
        };
        let body = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        if prelude.starts_with('@') {
            continue;
        }
        if let Ok(selector) = Selector::parse(prelude) {
            rules.push(StyleRule {
                selector,
                declarations: parse_declarations(body),
            });
        }
    }
    rules
}

/// Offset of the brace closing the one at the start of `s`
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_declarations(block: &str) -> Vec<Declaration> {
    block
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_lowercase();
            let mut value = value.trim().to_string();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            let important = value.to_lowercase().ends_with("!important");
            if important {
                value.truncate(value.len() - "!important".len());
                value = value.trim_end().to_string();
            }
            Some(Declaration {
                property,
                value,
                important,
            })
        })
        .collect()
}

fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
