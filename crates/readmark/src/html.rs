//! HTML parsing support.
//!
//! This module parses HTML strings with scraper (html5ever) and converts the
//! result to the [`Element`] tree the extractor and converter work on.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::{Element, Node};

/// Parse an HTML fragment into an element tree rooted at `html`.
///
/// # Example
///
/// ```rust
/// use readmark::{parse_html, MarkdownService, Node};
///
/// let root = parse_html("<h1>Hello <em>World</em></h1>");
///
/// let service = MarkdownService::new();
/// let markdown = service.convert(&Node::from(root));
/// assert_eq!(markdown, "# Hello *World*");
/// ```
pub fn parse_html(html: &str) -> Element {
    let document = Html::parse_fragment(html);
    scraper_to_element(document.root_element())
}

/// Parse a complete HTML document, synthesizing `head` and `body` when missing.
pub fn parse_document(html: &str) -> Element {
    let document = Html::parse_document(html);
    scraper_to_element(document.root_element())
}

/// Convert a scraper ElementRef to our Element structure.
///
/// Walks with an explicit stack so arbitrarily deep markup converts without
/// exhausting the call stack; depth limits are left to the caller.
fn scraper_to_element(root: ElementRef) -> Element {
    let mut stack = vec![(shallow_copy(root), root.children())];
    let mut converted = None;

    while let Some((node, children)) = stack.last_mut() {
        match children.next() {
            Some(child) => match child.value() {
                ScraperNode::Text(text) => node.add_child(Node::text(&*text.text)),
                ScraperNode::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        stack.push((shallow_copy(child_element), child_element.children()));
                    }
                }
                _ => {}
            },
            None => {
                if let Some((finished, _)) = stack.pop() {
                    match stack.last_mut() {
                        Some((parent, _)) => parent.add_child(finished.into()),
                        None => converted = Some(finished),
                    }
                }
            }
        }
    }

    converted.unwrap_or_default()
}

/// Tag and attributes, without children
fn shallow_copy(element: ElementRef) -> Element {
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    Element::with_attrs(element.value().name(), attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Selector;

    #[test]
    fn test_parse_simple_html() {
        let root = parse_html("<p>Hello World</p>");
        assert_eq!(root.tag(), "html");
        let p = root.find_first(&Selector::parse("p")).unwrap();
        assert_eq!(p.text_content(), "Hello World");
    }

    #[test]
    fn test_parse_attributes() {
        let root = parse_html(r#"<a HREF="/x" class="btn primary">go</a>"#);
        let a = root.find_first(&Selector::parse("a")).unwrap();
        assert_eq!(a.attr("href"), Some("/x"));
        assert!(a.has_class("primary"));
    }

    #[test]
    fn test_parse_document_has_head_and_body() {
        let root = parse_document("<title>T</title><p>x</p>");
        assert!(root.find_first(&Selector::parse("head")).is_some());
        assert!(root.find_first(&Selector::parse("body")).is_some());
        assert_eq!(
            root.find_first(&Selector::parse("title")).map(Element::text_content),
            Some("T".to_string())
        );
    }

    #[test]
    fn test_deep_markup_converts() {
        let html = format!("{}<p>bottom</p>", "<div>".repeat(10_000));
        let root = parse_html(&html);
        assert!(root.depth() > 10_000);
        assert!(root.descendants().any(|element| element.tag() == "p"));
    }

    #[test]
    fn test_comments_are_dropped() {
        let root = parse_html("<p>a<!-- hidden -->b</p>");
        assert_eq!(root.text_content(), "ab");
    }
}
