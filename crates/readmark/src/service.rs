//! MarkdownService - the entry point for tree to Markdown conversion.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::node::{Element, Node, NodeRef};
use crate::rules::{Rule, Rules};
use crate::utilities::{
    borders_block, collapse_whitespace, escape_markdown, inline, normalize_blank_lines,
};

/// Options for MarkdownService.
///
/// Heading style (ATX `#`) and code block style (fenced) are fixed.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Backslash-escape Markdown metacharacters in text nodes
    pub escape_text: bool,

    /// Elements nested deeper than this render to nothing
    pub max_depth: Option<usize>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            escape_text: true,
            max_depth: None,
        }
    }
}

/// The main service for converting document trees to Markdown
pub struct MarkdownService {
    options: MarkdownOptions,
    rules: Rules,
}

impl MarkdownService {
    /// Create a new MarkdownService with default options
    pub fn new() -> Self {
        Self::with_options(MarkdownOptions::default())
    }

    /// Create a MarkdownService with custom options
    pub fn with_options(options: MarkdownOptions) -> Self {
        Self::with_rules(options, Rules::new())
    }

    pub fn with_rules(options: MarkdownOptions, rules: Rules) -> Self {
        Self { options, rules }
    }

    /// Convert a node and its subtree to Markdown
    pub fn convert(&self, node: &Node) -> String {
        let output = match node {
            Node::Element(element) => self.convert_root(element),
            Node::Text(text) => self.render_text(text),
        };
        normalize_blank_lines(&output)
    }

    /// Convert an element and its subtree to Markdown
    pub fn convert_element(&self, element: &Element) -> String {
        normalize_blank_lines(&self.convert_root(element))
    }

    /// Add a custom rule
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Get the current options
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut MarkdownOptions {
        &mut self.options
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut Rules {
        &mut self.rules
    }

    fn convert_root(&self, element: &Element) -> String {
        self.process_element(&NodeRef::new(element), 1)
    }

    /// Process a single element
    fn process_element(&self, node: &NodeRef, depth: usize) -> String {
        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                warn!(tag = node.tag(), depth, limit, "element nested too deep, skipping subtree");
                return String::new();
            }
        }

        if let Some(rule) = self.rules.custom_rule(node, &self.options) {
            let content = self.process_children(node, depth);
            let replaced = catch_unwind(AssertUnwindSafe(|| {
                rule.replace(node, &content, &self.options)
            }));
            match replaced {
                Ok(markdown) => return markdown,
                Err(_) => warn!(
                    tag = node.tag(),
                    "custom rule panicked, falling back to built-in handling"
                ),
            }
        }

        if self.rules.should_remove(node, &self.options) {
            return String::new();
        }

        match self.rules.markdown_rule(node, &self.options) {
            Some(rule) => {
                let content = match node.tag() {
                    "ul" | "ol" => self.process_list_items(node, depth),
                    _ => self.process_children(node, depth),
                };
                rule.replace(node, &content, &self.options)
            }
            None => self.process_children(node, depth),
        }
    }

    /// Process children of an element
    fn process_children(&self, node: &NodeRef, depth: usize) -> String {
        let children = node.children();
        let mut result = String::new();

        for (index, child) in children.iter().enumerate() {
            match child {
                Node::Text(text) => {
                    if text.trim().is_empty() && borders_block(node.tag(), children, index) {
                        continue;
                    }
                    push_joined(&mut result, &self.render_text(text));
                }
                Node::Element(element) => {
                    let rendered = self.process_element(&node.child(element), depth + 1);
                    push_joined(&mut result, &rendered);
                }
            }
        }

        result
    }

    /// Direct `li` children, each flattened to a single line; items that
    /// render to nothing are left out
    fn process_list_items(&self, node: &NodeRef, depth: usize) -> String {
        node.element_children()
            .filter(|child| child.tag() == "li")
            .map(|item| inline(&self.process_element(&node.child(item), depth + 1)))
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_text(&self, text: &str) -> String {
        let collapsed = collapse_whitespace(text);
        if self.options.escape_text {
            escape_markdown(&collapsed)
        } else {
            collapsed
        }
    }
}

impl Default for MarkdownService {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert `root` to Markdown with the given rules and default options
pub fn convert(root: &Node, rules: Rules) -> String {
    MarkdownService::with_rules(MarkdownOptions::default(), rules).convert(root)
}

/// Append `piece`, letting a space already at the end absorb a leading one.
fn push_joined(result: &mut String, piece: &str) {
    match piece.strip_prefix(' ') {
        Some(rest) if result.ends_with(' ') => result.push_str(rest),
        _ => result.push_str(piece),
    }
}
