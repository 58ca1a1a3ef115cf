//! Caller rules for rendering extracted articles.
//!
//! These live outside the engine's built-in table; pass them to
//! [`MarkdownService::with_rules`](crate::MarkdownService::with_rules) or
//! [`convert`](crate::convert) when rendering article content.

use super::{Filter, Rule, Rules};
use crate::utilities::is_noise;

/// Built-in rules plus the three article rules, in precedence order:
/// fenced code, short-link dropping, badge dropping.
pub fn article_rules() -> Rules {
    Rules::new()
        .with("fenced_code", fenced_code_rule())
        .with("drop_short_links", short_link_rule())
        .with("drop_badges", badge_rule())
}

/// A `pre` holding any `code` becomes one fenced block of the `pre`'s raw
/// text, so inline-code escaping never reaches the block.
pub fn fenced_code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            tag == "pre" && node.descendants().any(|element| element.tag() == "code")
        }),
        |node, _, _| format!("\n\n```\n{}\n```\n\n", node.text_content()),
    )
}

/// Anchors with two characters of text or fewer (icons, `#`, `×`).
pub fn short_link_rule() -> Rule {
    Rule::discard(|tag, node, _| tag == "a" && node.text_content().trim().chars().count() <= 2)
}

/// Elements whose class reads like decoration.
pub fn badge_rule() -> Rule {
    Rule::discard(|_, node, _| is_noise(node.class_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Element, Node};
    use crate::service::convert;

    fn render(node: Element) -> String {
        convert(&Node::from(node), article_rules())
    }

    #[test]
    fn test_short_link_dropped() {
        let a = Element::with_attrs("a", vec![("href", "#")]).text("×");
        assert_eq!(render(a), "");
    }

    #[test]
    fn test_list_item_of_dropped_link_left_out() {
        let anchor = |text: &str| Element::with_attrs("a", vec![("href", "#")]).text(text);
        let ul = Element::new("ul")
            .child(Element::new("li").child(anchor("×")))
            .child(Element::new("li").text("Real"));
        assert_eq!(render(ul), "- Real");

        let ol = Element::new("ol")
            .child(Element::new("li").text("First"))
            .child(Element::new("li").child(anchor("#")))
            .child(Element::new("li").text("Second"));
        assert_eq!(render(ol), "1. First\n2. Second");
    }

    #[test]
    fn test_three_char_link_kept() {
        let a = Element::with_attrs("a", vec![("href", "https://example.com/")]).text("abc");
        assert_eq!(render(a), "[abc](https://example.com/)");
    }

    #[test]
    fn test_badge_dropped_with_subtree() {
        let p = Element::new("p")
            .text("Read ")
            .child(Element::with_attrs("span", vec![("class", "share-button")]).text("Share this"))
            .text("on.");
        assert_eq!(render(p), "Read on.");
    }

    #[test]
    fn test_fenced_code_uses_raw_pre_text() {
        let pre = Element::new("pre").child(
            Element::new("code")
                .text("let x = `a`;\n")
                .child(Element::new("b").text("bold()")),
        );
        assert_eq!(render(pre), "```\nlet x = `a`;\nbold()\n```");
    }

    #[test]
    fn test_pre_without_code_uses_builtin() {
        let pre = Element::new("pre").text("plain\n");
        assert_eq!(render(pre), "```\nplain\n```");
    }
}
