//! Document tree model shared by the extractor, the metadata resolver and
//! the Markdown engine.
//!
//! A [`Node`] owns its children outright. Upward navigation goes through
//! [`NodeRef`], a borrowed view that carries its ancestor chain, so the tree
//! itself never stores parent pointers.

use std::ops::Deref;

use indexmap::IndexMap;

use crate::{Error, Result};

/// A node in the document tree: either an element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Node::Element(Element::new(tag_name))
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        Node::Element(Element::with_attrs(tag_name, attrs))
    }

    /// Create a new text node
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Tag name for elements, `None` for text
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(Element::tag)
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => element.push_text(out),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// An element: lower-cased tag, unique attributes in source order, and
/// owned children in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag: tag_name.to_ascii_lowercase(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut element = Self::new(tag_name);
        for (name, value) in attrs {
            element.set_attr(name, value);
        }
        element
    }

    /// Builder-style variant of [`Element::add_child`]
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.add_child(child.into());
        self
    }

    /// Builder-style helper appending a text child
    pub fn text(self, content: &str) -> Self {
        self.child(Node::text(content))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get an attribute value by name (case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name.to_ascii_lowercase().as_str())
            .map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing any existing value in place
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// The raw `class` attribute, empty when absent
    pub fn class_name(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_name().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Get only element children
    pub fn element_children(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Keep only the children for which `keep` returns true
    pub fn retain_children<F>(&mut self, keep: F)
    where
        F: FnMut(&Node) -> bool,
    {
        self.children.retain(keep);
    }

    /// Insert nodes ahead of the existing children, keeping their order
    pub fn prepend_children(&mut self, nodes: Vec<Node>) {
        self.children.splice(0..0, nodes);
    }

    /// All descendant elements in document (pre-)order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// First element matching `selector`, testing `self` before its descendants
    pub fn find_first(&self, selector: &Selector) -> Option<&Element> {
        std::iter::once(self)
            .chain(self.descendants())
            .find(|element| selector.matches(element))
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            child.push_text(out);
        }
    }

    /// Maximum element nesting depth, counting `self` as 1
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((element, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(element.element_children().map(|child| (child, depth + 1)));
        }
        max
    }

    /// Fail when the tree nests deeper than `limit` elements.
    ///
    /// Extraction, conversion, `text_content` and the derived `Clone`,
    /// `PartialEq` and `Debug` impls recurse once per level, so callers
    /// handling untrusted input should run this before handing the tree
    /// over. Building, traversing and dropping a tree do not recurse.
    pub fn check_depth(&self, limit: usize) -> Result<()> {
        let depth = self.depth();
        if depth > limit {
            return Err(Error::TooDeep { depth, limit });
        }
        Ok(())
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

/// Pre-order iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(Node::Element(element)) => {
                    self.stack.push(element.children.iter());
                    return Some(element);
                }
                Some(Node::Text(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// The selector forms needed to locate content containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `article`
    Tag(String),
    /// `#content`
    Id(String),
    /// `.post`
    Class(String),
}

impl Selector {
    pub fn parse(selector: &str) -> Self {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            Selector::Id(id.to_string())
        } else if let Some(class) = selector.strip_prefix('.') {
            Selector::Class(class.to_string())
        } else {
            Selector::Tag(selector.to_ascii_lowercase())
        }
    }

    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Selector::Tag(tag) => element.tag() == tag,
            Selector::Id(id) => element.id() == Some(id.as_str()),
            Selector::Class(class) => element.has_class(class),
        }
    }
}

/// A reference to an element with its ancestor chain.
///
/// Built on the way down a traversal, so each level borrows the one above it
/// and lookups toward the root cost nothing to set up.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    element: &'a Element,
    parent: Option<&'a NodeRef<'a>>,
}

impl<'a> NodeRef<'a> {
    /// Create a new NodeRef without parent context
    pub fn new(element: &'a Element) -> Self {
        Self {
            element,
            parent: None,
        }
    }

    /// View of a child element with `self` as its parent
    pub fn child<'b>(&'b self, element: &'b Element) -> NodeRef<'b> {
        NodeRef {
            element,
            parent: Some(self),
        }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    pub fn parent(&self) -> Option<&'a NodeRef<'a>> {
        self.parent
    }

    /// Get the parent tag name if known
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent.map(|parent| parent.element.tag())
    }

    pub fn ancestors(&self) -> impl Iterator<Item = &'a Element> {
        std::iter::successors(self.parent, |node| node.parent).map(|node| node.element)
    }

    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.ancestors().any(|element| element.tag() == tag)
    }
}

impl Deref for NodeRef<'_> {
    type Target = Element;

    fn deref(&self) -> &Element {
        self.element
    }
}
