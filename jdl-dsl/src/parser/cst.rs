//! Concrete syntax tree.
//!
//! A node is tagged with the rule that produced it and holds its children in
//! source order. Each child carries a label (`NAME`, `LCURLY`, a rule name,
//! ...) so consumers can pick out named child lists the same way regardless
//! of how many entries a list has.

use super::rule::Rule;
use crate::lexer::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum CstElement {
    Node(CstNode),
    Token(Token),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CstChild {
    pub label: &'static str,
    pub element: CstElement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CstNode {
    pub rule: Rule,
    pub entries: Vec<CstChild>,
    /// Set when the rule failed and this node holds only what was consumed
    /// before the failure.
    pub recovered: bool,
}

impl CstNode {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            entries: Vec::new(),
            recovered: false,
        }
    }

    /// Append a token under its kind's default label.
    pub fn push_token(&mut self, token: Token) {
        let label = token.kind.label();
        self.push_token_as(label, token);
    }

    /// Append a token under an explicit label, e.g. a keyword used as a name.
    pub fn push_token_as(&mut self, label: &'static str, token: Token) {
        self.entries.push(CstChild {
            label,
            element: CstElement::Token(token),
        });
    }

    pub fn push_node(&mut self, node: CstNode) {
        self.entries.push(CstChild {
            label: node.rule.name(),
            element: CstElement::Node(node),
        });
    }

    /// All children under `label`, in source order.
    pub fn children<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a CstElement> + 'a {
        self.entries
            .iter()
            .filter(move |child| child.label == label)
            .map(|child| &child.element)
    }

    /// Tokens under `label`, in source order.
    pub fn tokens<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Token> + 'a {
        self.children(label).filter_map(|element| match element {
            CstElement::Token(token) => Some(token),
            CstElement::Node(_) => None,
        })
    }

    /// First token under `label`.
    pub fn token<'a>(&'a self, label: &'a str) -> Option<&'a Token> {
        self.tokens(label).next()
    }

    /// Child nodes produced by `rule`, in source order.
    pub fn nodes(&self, rule: Rule) -> impl Iterator<Item = &CstNode> + '_ {
        self.entries.iter().filter_map(move |child| match &child.element {
            CstElement::Node(node) if node.rule == rule => Some(node),
            _ => None,
        })
    }

    /// First child node produced by `rule`.
    pub fn node(&self, rule: Rule) -> Option<&CstNode> {
        self.nodes(rule).next()
    }

    pub fn elements(&self) -> impl Iterator<Item = &CstElement> {
        self.entries.iter().map(|child| &child.element)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tokens of the whole subtree, in source order.
    pub fn flatten_tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        for element in self.elements() {
            match element {
                CstElement::Token(token) => out.push(token),
                CstElement::Node(node) => node.collect_tokens(out),
            }
        }
    }

    /// Whether this node or any descendant was cut short by an error.
    pub fn has_recovered(&self) -> bool {
        self.recovered
            || self.elements().any(|element| match element {
                CstElement::Node(node) => node.has_recovered(),
                CstElement::Token(_) => false,
            })
    }
}
