// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Element handles and form-control state

use super::node::{Node, NodeKind};
use super::selector::Selector;

/// Element node with form-control helpers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub node: Node,
}

impl Element {
    /// Wrap a node if it is an element
    pub fn new(node: Node) -> Option<Self> {
        (node.kind() == NodeKind::Element).then_some(Self { node })
    }

    /// Lower-cased tag name
    pub fn local_name(&self) -> String {
        self.node.local_name().unwrap_or_default()
    }

    /// Upper-cased tag name, as browsers report it
    pub fn tag_name(&self) -> String {
        self.local_name().to_uppercase()
    }

    pub fn id(&self) -> Option<String> {
        self.get_attribute("id")
    }

    /// Lower-cased `type` attribute of an `<input>`/`<button>`
    pub fn input_type(&self) -> Option<String> {
        match self.local_name().as_str() {
            "input" => Some(
                self.get_attribute("type")
                    .unwrap_or_else(|| "text".to_string())
                    .to_lowercase(),
            ),
            "button" => Some(
                self.get_attribute("type")
                    .unwrap_or_else(|| "submit".to_string())
                    .to_lowercase(),
            ),
            _ => None,
        }
    }

    pub fn parent_element(&self) -> Option<Element> {
        self.node.parent().and_then(Element::new)
    }

    pub fn children(&self) -> Vec<Element> {
        self.node
            .children()
            .into_iter()
            .filter_map(Element::new)
            .collect()
    }

    /// All matching descendants in document order
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        match Selector::parse(selector) {
            Ok(sel) => self.select(&sel),
            Err(_) => Vec::new(),
        }
    }

    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// Descendants matching a pre-parsed selector
    pub fn select(&self, selector: &Selector) -> Vec<Element> {
        self.node
            .descendant_elements()
            .into_iter()
            .filter(|n| selector.matches(n))
            .filter_map(Element::new)
            .collect()
    }

    pub fn matches(&self, selector: &str) -> bool {
        Selector::parse(selector)
            .map(|sel| sel.matches(&self.node))
            .unwrap_or(false)
    }

    /// Nearest inclusive ancestor matching the selector
    pub fn closest(&self, selector: &str) -> Option<Element> {
        let sel = Selector::parse(selector).ok()?;
        let mut current = Some(self.clone());
        while let Some(el) = current {
            if sel.matches(&el.node) {
                return Some(el);
            }
            current = el.parent_element();
        }
        None
    }

    /// Innermost descendant whose trimmed text equals `text`
    pub fn find_by_text(&self, text: &str) -> Option<Element> {
        super::document::find_text_within(&self.node, text)
    }

    /// Whether this element is a descendant of `other`
    pub fn is_inside(&self, other: &Element) -> bool {
        let mut current = self.parent_element();
        while let Some(parent) = current {
            if parent == *other {
                return true;
            }
            current = parent.parent_element();
        }
        false
    }

    /// Current value of a form control
    ///
    /// Selects report the selected option's value (first option when none
    /// is marked). Textareas fall back to their text content.
    pub fn value(&self) -> Option<String> {
        match self.local_name().as_str() {
            "input" | "button" | "option" => self
                .get_attribute("value")
                .or_else(|| (self.local_name() == "option").then(|| self.text_content())),
            "textarea" => Some(
                self.get_attribute("value")
                    .unwrap_or_else(|| self.text_content()),
            ),
            "select" => {
                let options = self.options();
                options
                    .iter()
                    .find(|o| o.has_attribute("selected"))
                    .or_else(|| options.first())
                    .and_then(Element::value)
            }
            _ => None,
        }
    }

    /// Set the value of an input or textarea
    pub fn set_value(&self, value: impl Into<String>) {
        self.set_attribute("value", value);
    }

    /// `<option>` children of a select
    pub fn options(&self) -> Vec<Element> {
        self.query_selector_all("option")
    }

    /// Mark one option selected, clearing the rest
    pub fn select_option(&self, option: &Element) {
        for candidate in self.options() {
            if candidate == *option {
                candidate.set_attribute("selected", "selected");
            } else {
                candidate.remove_attribute("selected");
            }
        }
    }

    pub fn checked(&self) -> bool {
        self.has_attribute("checked")
    }

    pub fn set_checked(&self, checked: bool) {
        if checked {
            self.set_attribute("checked", "checked");
        } else {
            self.remove_attribute("checked");
        }
    }

    /// Disabled directly or through an enclosing disabled fieldset
    pub fn disabled(&self) -> bool {
        self.has_attribute("disabled")
            || self
                .parent_element()
                .and_then(|p| p.closest("fieldset[disabled]"))
                .is_some()
    }

    /// Whether `type`/`clear` may edit this element
    pub fn is_editable(&self) -> bool {
        match self.local_name().as_str() {
            "textarea" => !self.has_attribute("readonly"),
            "input" => {
                !self.has_attribute("readonly")
                    && !matches!(
                        self.input_type().as_deref(),
                        Some("checkbox" | "radio" | "submit" | "button" | "reset" | "image" | "file" | "hidden")
                    )
            }
            _ => false,
        }
    }

    pub fn is_checkable(&self) -> bool {
        matches!(self.input_type().as_deref(), Some("checkbox" | "radio"))
    }

    /// Whether activating this element submits its form
    pub fn is_submit_control(&self) -> bool {
        match self.local_name().as_str() {
            "button" => self.input_type().as_deref() == Some("submit"),
            "input" => matches!(self.input_type().as_deref(), Some("submit" | "image")),
            _ => false,
        }
    }

    pub fn href(&self) -> Option<String> {
        match self.local_name().as_str() {
            "a" | "area" => self.get_attribute("href"),
            _ => None,
        }
    }

    /// Owning form, if any
    pub fn form(&self) -> Option<Element> {
        self.closest("form")
    }
}

impl std::ops::Deref for Element {
    type Target = Node;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_html;

    #[test]
    fn test_select_value_defaults_to_first_option() {
        let doc = parse_html(
            r#"<select id="s"><option value="volvo">Volvo</option><option value="saab">Saab</option></select>"#,
        )
        .unwrap();
        let select = doc.query_selector("#s").unwrap();
        assert_eq!(select.value().as_deref(), Some("volvo"));

        let saab = select.options().into_iter().nth(1).unwrap();
        select.select_option(&saab);
        assert_eq!(select.value().as_deref(), Some("saab"));
    }

    #[test]
    fn test_fieldset_disables_descendants() {
        let doc = parse_html(
            r#"<fieldset disabled><input id="a"></fieldset><input id="b">"#,
        )
        .unwrap();
        assert!(doc.query_selector("#a").unwrap().disabled());
        assert!(!doc.query_selector("#b").unwrap().disabled());
    }

    #[test]
    fn test_editable_controls() {
        let doc = parse_html(
            r#"<input id="t"><input id="c" type="checkbox"><textarea id="ta" readonly></textarea>"#,
        )
        .unwrap();
        assert!(doc.query_selector("#t").unwrap().is_editable());
        assert!(!doc.query_selector("#c").unwrap().is_editable());
        assert!(doc.query_selector("#c").unwrap().is_checkable());
        assert!(!doc.query_selector("#ta").unwrap().is_editable());
    }
}
