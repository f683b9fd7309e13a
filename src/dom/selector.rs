// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSS selector parsing and matching
//!
//! Covers what test-hook lookup and `<style>` rule matching need: compound
//! selectors, the four combinators, selector lists and a handful of
//! structural and form-state pseudo-classes.

use crate::error::{Error, Result};

use super::node::Node;

/// A parsed selector list (`a, b > c`)
#[derive(Debug, Clone)]
pub struct Selector {
    alternatives: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators, stored left to right
#[derive(Debug, Clone)]
struct ComplexSelector {
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

/// Combinator between compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    parts: Vec<SelectorPart>,
}

#[derive(Debug, Clone)]
enum SelectorPart {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    Pseudo(PseudoClass),
}

#[derive(Debug, Clone)]
struct AttributeSelector {
    name: String,
    operator: Option<AttributeOperator>,
    value: String,
    case_insensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeOperator {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone)]
enum PseudoClass {
    FirstChild,
    LastChild,
    NthChild(NthExpr),
    Empty,
    Checked,
    Disabled,
    Enabled,
    Not(Box<Selector>),
}

/// Selector specificity as (ids, classes/attributes/pseudo-classes, types)
pub type Specificity = (u32, u32, u32);

/// An+B expression for `:nth-child`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpr {
    pub a: i32,
    pub b: i32,
}

impl Selector {
    /// Parse a selector list
    pub fn parse(selector: &str) -> Result<Self> {
        let trimmed = selector.trim();
        if trimmed.is_empty() {
            return Err(Error::selector(selector, "empty selector"));
        }
        SelectorParser::new(trimmed).parse_list()
    }

    /// Selector matching a test-hook attribute value
    pub fn hook(attribute: &str, value: &str) -> Self {
        let part = SelectorPart::Attribute(AttributeSelector {
            name: attribute.to_lowercase(),
            operator: Some(AttributeOperator::Equals),
            value: value.to_string(),
            case_insensitive: false,
        });
        Self {
            alternatives: vec![ComplexSelector {
                compounds: vec![Compound { parts: vec![part] }],
                combinators: Vec::new(),
            }],
        }
    }

    /// Check whether an element matches any alternative
    pub fn matches(&self, node: &Node) -> bool {
        self.matching_specificity(node).is_some()
    }

    /// Highest specificity among the alternatives matching `node`
    pub fn matching_specificity(&self, node: &Node) -> Option<Specificity> {
        if !node.is_element() {
            return None;
        }
        self.alternatives
            .iter()
            .filter(|complex| complex.matches_at(complex.compounds.len() - 1, node))
            .map(ComplexSelector::specificity)
            .max()
    }

    /// Highest specificity of any alternative
    fn max_specificity(&self) -> Specificity {
        self.alternatives
            .iter()
            .map(ComplexSelector::specificity)
            .max()
            .unwrap_or_default()
    }
}

impl ComplexSelector {
    fn specificity(&self) -> Specificity {
        self.compounds
            .iter()
            .flat_map(|compound| compound.parts.iter())
            .fold((0, 0, 0), |(a, b, c), part| match part {
                SelectorPart::Universal => (a, b, c),
                SelectorPart::Id(_) => (a + 1, b, c),
                SelectorPart::Class(_) | SelectorPart::Attribute(_) => (a, b + 1, c),
                SelectorPart::Pseudo(PseudoClass::Not(inner)) => {
                    let (ia, ib, ic) = inner.max_specificity();
                    (a + ia, b + ib, c + ic)
                }
                SelectorPart::Pseudo(_) => (a, b + 1, c),
                SelectorPart::Tag(_) => (a, b, c + 1),
            })
    }

    fn matches_at(&self, idx: usize, node: &Node) -> bool {
        if !self.compounds[idx].matches(node) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match self.combinators[idx - 1] {
            Combinator::Descendant => {
                let mut current = node.parent();
                while let Some(ancestor) = current {
                    if !ancestor.is_element() {
                        break;
                    }
                    if self.matches_at(idx - 1, &ancestor) {
                        return true;
                    }
                    current = ancestor.parent();
                }
                false
            }
            Combinator::Child => node
                .parent()
                .filter(Node::is_element)
                .map(|parent| self.matches_at(idx - 1, &parent))
                .unwrap_or(false),
            Combinator::AdjacentSibling => node
                .preceding_element_siblings()
                .last()
                .map(|prev| self.matches_at(idx - 1, prev))
                .unwrap_or(false),
            Combinator::GeneralSibling => node
                .preceding_element_siblings()
                .iter()
                .any(|prev| self.matches_at(idx - 1, prev)),
        }
    }
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        self.parts.iter().all(|part| part.matches(node))
    }
}

impl SelectorPart {
    fn matches(&self, node: &Node) -> bool {
        match self {
            SelectorPart::Universal => true,
            SelectorPart::Tag(tag) => node
                .local_name()
                .map(|n| n.eq_ignore_ascii_case(tag))
                .unwrap_or(false),
            SelectorPart::Id(id) => node.get_attribute("id").as_deref() == Some(id.as_str()),
            SelectorPart::Class(class) => node
                .get_attribute("class")
                .map(|c| c.split_whitespace().any(|c| c == class))
                .unwrap_or(false),
            SelectorPart::Attribute(attr) => attr.matches(node),
            SelectorPart::Pseudo(pseudo) => pseudo.matches(node),
        }
    }
}

impl AttributeSelector {
    fn matches(&self, node: &Node) -> bool {
        let Some(value) = node.get_attribute(&self.name) else {
            return false;
        };
        let Some(op) = self.operator else {
            return true;
        };

        let (value, target) = if self.case_insensitive {
            (value.to_lowercase(), self.value.to_lowercase())
        } else {
            (value, self.value.clone())
        };

        match op {
            AttributeOperator::Equals => value == target,
            AttributeOperator::Includes => value.split_whitespace().any(|w| w == target),
            AttributeOperator::DashMatch => {
                value == target || value.starts_with(&format!("{}-", target))
            }
            AttributeOperator::Prefix => !target.is_empty() && value.starts_with(&target),
            AttributeOperator::Suffix => !target.is_empty() && value.ends_with(&target),
            AttributeOperator::Substring => !target.is_empty() && value.contains(&target),
        }
    }
}

impl PseudoClass {
    fn matches(&self, node: &Node) -> bool {
        match self {
            PseudoClass::FirstChild => node.preceding_element_siblings().is_empty(),
            PseudoClass::LastChild => node.following_element_siblings().is_empty(),
            PseudoClass::NthChild(expr) => {
                expr.matches(node.preceding_element_siblings().len() as i32 + 1)
            }
            PseudoClass::Empty => node.children().iter().all(|c| {
                !c.is_element() && c.text_content().is_empty()
            }),
            PseudoClass::Checked => {
                node.has_attribute("checked") || node.has_attribute("selected")
            }
            PseudoClass::Disabled => node.has_attribute("disabled"),
            PseudoClass::Enabled => !node.has_attribute("disabled"),
            PseudoClass::Not(inner) => !inner.matches(node),
        }
    }
}

impl NthExpr {
    /// Check whether a 1-based position satisfies the expression
    pub fn matches(&self, index: i32) -> bool {
        if self.a == 0 {
            return index == self.b;
        }
        let diff = index - self.b;
        diff % self.a == 0 && diff / self.a >= 0
    }

    /// Parse `odd`, `even`, `3`, `2n+1`, `-n+3`
    pub fn parse(expr: &str) -> Option<Self> {
        let expr: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
        let expr = expr.to_lowercase();
        match expr.as_str() {
            "odd" => return Some(Self { a: 2, b: 1 }),
            "even" => return Some(Self { a: 2, b: 0 }),
            _ => {}
        }

        if let Ok(b) = expr.parse::<i32>() {
            return Some(Self { a: 0, b });
        }

        let (a_part, b_part) = expr.split_once('n')?;
        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            s => s.parse().ok()?,
        };
        let b = if b_part.is_empty() {
            0
        } else {
            b_part.trim_start_matches('+').parse().ok()?
        };
        Some(Self { a, b })
    }
}

/// Recursive-descent selector parser
struct SelectorParser<'a> {
    source: &'a str,
    input: Vec<char>,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            input: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::selector(self.source, reason)
    }

    fn parse_list(&mut self) -> Result<Selector> {
        let mut alternatives = vec![self.parse_complex()?];
        while self.peek() == Some(',') {
            self.advance();
            alternatives.push(self.parse_complex()?);
        }
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(format!("unexpected '{}'", self.input[self.pos])));
        }
        Ok(Selector { alternatives })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector> {
        self.skip_whitespace();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::AdjacentSibling,
                Some('~') => Combinator::GeneralSibling,
                Some(_) if had_space => {
                    combinators.push(Combinator::Descendant);
                    compounds.push(self.parse_compound()?);
                    continue;
                }
                Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            };
            self.advance();
            self.skip_whitespace();
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();

        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    self.advance();
                    compound.parts.push(SelectorPart::Id(self.read_identifier()?));
                }
                '.' => {
                    self.advance();
                    compound
                        .parts
                        .push(SelectorPart::Class(self.read_identifier()?));
                }
                '[' => compound
                    .parts
                    .push(SelectorPart::Attribute(self.parse_attribute()?)),
                ':' => compound.parts.push(SelectorPart::Pseudo(self.parse_pseudo()?)),
                '*' => {
                    self.advance();
                    compound.parts.push(SelectorPart::Universal);
                }
                c if c.is_alphabetic() || c == '_' || c == '-' => {
                    let tag = self.read_identifier()?;
                    compound.parts.push(SelectorPart::Tag(tag.to_lowercase()));
                }
                _ => break,
            }
        }

        if compound.parts.is_empty() {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector> {
        self.advance();
        self.skip_whitespace();
        let name = self.read_identifier()?.to_lowercase();
        self.skip_whitespace();

        let operator = match self.peek() {
            Some(']') => None,
            Some('=') => {
                self.advance();
                Some(AttributeOperator::Equals)
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.advance();
                self.expect('=')?;
                Some(match c {
                    '~' => AttributeOperator::Includes,
                    '|' => AttributeOperator::DashMatch,
                    '^' => AttributeOperator::Prefix,
                    '$' => AttributeOperator::Suffix,
                    _ => AttributeOperator::Substring,
                })
            }
            Some(c) => return Err(self.error(format!("unknown attribute operator '{}'", c))),
            None => return Err(self.error("unterminated attribute selector")),
        };

        let mut value = String::new();
        let mut case_insensitive = false;
        if operator.is_some() {
            self.skip_whitespace();
            value = self.read_string_or_ident()?;
            self.skip_whitespace();
            if matches!(self.peek(), Some('i') | Some('I')) {
                self.advance();
                case_insensitive = true;
                self.skip_whitespace();
            }
        }
        self.expect(']')?;

        Ok(AttributeSelector {
            name,
            operator,
            value,
            case_insensitive,
        })
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass> {
        self.advance();
        let name = self.read_identifier()?.to_lowercase();

        match name.as_str() {
            "first-child" => Ok(PseudoClass::FirstChild),
            "last-child" => Ok(PseudoClass::LastChild),
            "empty" => Ok(PseudoClass::Empty),
            "checked" => Ok(PseudoClass::Checked),
            "disabled" => Ok(PseudoClass::Disabled),
            "enabled" => Ok(PseudoClass::Enabled),
            "nth-child" => {
                let arg = self.read_function_arg()?;
                NthExpr::parse(&arg)
                    .map(PseudoClass::NthChild)
                    .ok_or_else(|| self.error(format!("invalid nth expression '{}'", arg)))
            }
            "not" => {
                let arg = self.read_function_arg()?;
                Ok(PseudoClass::Not(Box::new(Selector::parse(&arg)?)))
            }
            other => Err(self.error(format!("unsupported pseudo-class ':{}'", other))),
        }
    }

    fn read_function_arg(&mut self) -> Result<String> {
        self.expect('(')?;
        let mut depth = 1;
        let mut arg = String::new();
        while let Some(c) = self.advance() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(arg.trim().to_string());
                    }
                }
                _ => {}
            }
            arg.push(c);
        }
        Err(self.error("unterminated '('"))
    }

    fn read_string_or_ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                let mut value = String::new();
                loop {
                    match self.advance() {
                        Some(c) if c == quote => return Ok(value),
                        Some('\\') => {
                            if let Some(escaped) = self.advance() {
                                value.push(escaped);
                            }
                        }
                        Some(c) => value.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
            }
            _ => self.read_identifier(),
        }
    }

    fn read_identifier(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(ident)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    /// Returns true if any whitespace was consumed
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{}', got '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', got end of input", expected))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_selector_parsing() {
        assert!(Selector::parse("div").is_ok());
        assert!(Selector::parse("div.class#id").is_ok());
        assert!(Selector::parse("[data-hook='submit']").is_ok());
        assert!(Selector::parse("form > button, a:not(.x)").is_ok());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div >").is_err());
        assert!(Selector::parse("[attr").is_err());
    }

    #[test]
    fn test_combinators() {
        let doc = parse_html(
            r#"<div class="group"><label>A</label><input id="a"><span><input id="b"></span></div>"#,
        )
        .unwrap();

        let ids = |sel: &str| -> Vec<String> {
            doc.query_selector_all(sel)
                .iter()
                .filter_map(|e| e.get_attribute("id"))
                .collect()
        };

        assert_eq!(ids(".group input"), vec!["a", "b"]);
        assert_eq!(ids(".group > input"), vec!["a"]);
        assert_eq!(ids("label + input"), vec!["a"]);
        assert_eq!(ids("label ~ span input"), vec!["b"]);
    }

    #[test]
    fn test_hook_selector() {
        let doc = parse_html(r#"<button data-hook="submit">Go</button><i data-hook="x"></i>"#)
            .unwrap();
        let sel = Selector::hook("data-hook", "submit");
        let found: Vec<_> = doc
            .root()
            .descendant_elements()
            .into_iter()
            .filter(|n| sel.matches(n))
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text_content(), "Go");
    }

    #[test]
    fn test_form_state_pseudo_classes() {
        let doc = parse_html(
            r#"<input id="a" type="checkbox" checked><input id="b" disabled><input id="c">"#,
        )
        .unwrap();
        assert_eq!(doc.query_selector_all(":checked").len(), 1);
        assert_eq!(doc.query_selector_all("input:disabled").len(), 1);
        assert_eq!(doc.query_selector_all("input:enabled").len(), 2);
    }

    #[test]
    fn test_nth_expr() {
        let odd = NthExpr::parse("odd").unwrap();
        assert!(odd.matches(1));
        assert!(!odd.matches(2));

        let expr = NthExpr::parse("2n + 1").unwrap();
        assert!(expr.matches(3));
        assert!(!expr.matches(4));

        let first_three = NthExpr::parse("-n+3").unwrap();
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));
    }

    #[test]
    fn test_specificity() {
        let doc = parse_html(r#"<button id="go" class="a" data-hook="b">Go</button>"#).unwrap();
        let button = doc.query_selector("button").unwrap();
        let spec = |sel: &str| Selector::parse(sel).unwrap().matching_specificity(&button.node);

        assert_eq!(spec("button"), Some((0, 0, 1)));
        assert_eq!(spec("[data-hook='b']"), Some((0, 1, 0)));
        assert_eq!(spec("button#go.a"), Some((1, 1, 1)));
        assert_eq!(spec("button:not(#x)"), Some((1, 0, 1)));
        assert_eq!(spec("i, button.a"), Some((0, 1, 1)));
        assert_eq!(spec("i"), None);
    }
}
