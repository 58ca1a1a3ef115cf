//! Tag vocabularies and text helpers shared by extraction and conversion.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::node::{Element, Node};
use crate::Result;

/// Tags kept by the extractor's filtering copy
pub const ALLOWED_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "pre", "code",
    "blockquote", "a", "img", "figure", "figcaption", "hr", "strong", "b", "em", "i",
];

/// Page chrome the extractor removes together with its subtree
pub const DROPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "iframe", "form", "input", "button",
    "select", "textarea", "label", "nav", "header", "footer", "aside",
];

/// Tags the Markdown engine renders to nothing without descending
pub const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "svg", "iframe"];

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "dir", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "footer", "form", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "html", "isindex", "li", "main", "menu",
    "nav", "noframes", "noscript", "ol", "output", "p", "pre", "section",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Class/id vocabulary marking decorative or non-article elements
static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)share|social|promo|advert|ad-|ads|banner|subscribe|newsletter|paywall|modal|overlay|tooltip|icon|badge|tag|chip|pill|avatar|logo|breadcrumbs|author|related|comments|popup",
    )
    .expect("noise pattern is valid")
});

static LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\n\s*").expect("line break pattern is valid"));

static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

/// Text escapes, applied in order; backslash must come first
static ESCAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\\", r"\\"),
        (r"\*", r"\*"),
        (r"_", r"\_"),
        (r"`", r"\`"),
        (r"\[", r"\["),
        (r"\]", r"\]"),
        (r"(?m)^(#{1,6}) ", r"\${1} "),
        (r"(?m)^>", r"\>"),
        (r"(?m)^([-+]) ", r"\${1} "),
        (r"(?m)^(\d+)\. ", r"${1}\. "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("escape pattern is valid"),
            replacement,
        )
    })
    .collect()
});

pub fn is_allowed(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

pub fn is_dropped(tag: &str) -> bool {
    DROPPED_TAGS.contains(&tag)
}

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Whitespace-only text next to a block boundary carries no meaning.
pub fn borders_block(parent_tag: &str, siblings: &[Node], index: usize) -> bool {
    let is_block_at = |i: Option<usize>| match i.and_then(|i| siblings.get(i)) {
        Some(Node::Element(element)) => is_block(element.tag()),
        Some(Node::Text(_)) => false,
        None => is_block(parent_tag),
    };
    is_block_at(index.checked_sub(1)) || is_block_at(Some(index + 1))
}

/// Case-insensitive substring match against the noise vocabulary
pub fn is_noise(value: &str) -> bool {
    NOISE.is_match(value)
}

/// Whether the element's class or id marks it as page decoration
pub fn is_noise_element(element: &Element) -> bool {
    let class = element.class_name();
    let id = element.id().unwrap_or("");
    (!class.is_empty() || !id.is_empty()) && is_noise(&format!("{} {}", class, id))
}

/// Collapse whitespace in text
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Flatten rendered Markdown onto one line
pub fn inline(markdown: &str) -> String {
    LINE_BREAKS.replace_all(markdown, " ").trim().to_string()
}

/// Whitespace at either edge of rendered content, one space per side.
///
/// Inline delimiters must hug their text, so the rules emit this outside
/// the `*`, `**` or `[..](..)` instead.
pub fn flanking_whitespace(content: &str) -> (&'static str, &'static str) {
    let side = |present: bool| if present { " " } else { "" };
    (
        side(content.starts_with(char::is_whitespace)),
        side(content.ends_with(char::is_whitespace)),
    )
}

/// Trim the output and cap every newline run at one blank line
pub fn normalize_blank_lines(markdown: &str) -> String {
    BLANK_LINES.replace_all(markdown.trim(), "\n\n").into_owned()
}

/// Escape markdown special characters
pub fn escape_markdown(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Resolve `reference` against `base` into an absolute URL
pub fn resolve_url(base: &Url, reference: &str) -> Result<String> {
    Ok(base.join(reference.trim())?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("*test*"), "\\*test\\*");
        assert_eq!(escape_markdown("_test_"), "\\_test\\_");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
        assert_eq!(escape_markdown("a\\b"), "a\\\\b");
        assert_eq!(escape_markdown("normal."), "normal.");
    }

    #[test]
    fn test_escape_line_starts_only() {
        assert_eq!(escape_markdown("# not a heading"), "\\# not a heading");
        assert_eq!(escape_markdown("issue #4"), "issue #4");
        assert_eq!(escape_markdown("- item"), "\\- item");
        assert_eq!(escape_markdown("well-known"), "well-known");
        assert_eq!(escape_markdown("1. first"), "1\\. first");
        assert_eq!(escape_markdown("> quoted"), "\\> quoted");
    }

    #[test]
    fn test_noise_matching() {
        assert!(is_noise("share-button"));
        assert!(is_noise("Newsletter-Signup"));
        assert!(is_noise("ad-slot"));
        assert!(!is_noise("article-body"));
    }

    #[test]
    fn test_noise_element_reads_class_and_id() {
        assert!(is_noise_element(&Element::with_attrs("div", vec![("id", "related-posts")])));
        assert!(is_noise_element(&Element::with_attrs("div", vec![("class", "x BADGE")])));
        assert!(!is_noise_element(&Element::new("div")));
    }

    #[test]
    fn test_inline_flattening() {
        assert_eq!(inline("\n\nHello\n\n  world \n"), "Hello world");
    }

    #[test]
    fn test_flanking_whitespace() {
        assert_eq!(flanking_whitespace(" a\n"), (" ", " "));
        assert_eq!(flanking_whitespace("a "), ("", " "));
        assert_eq!(flanking_whitespace("a"), ("", ""));
        assert_eq!(flanking_whitespace(""), ("", ""));
    }

    #[test]
    fn test_normalize_blank_lines() {
        assert_eq!(normalize_blank_lines("\n\na\n\n\n\nb\n\n\n"), "a\n\nb");
        assert_eq!(normalize_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b "), " a b ");
    }

    #[test]
    fn test_is_block() {
        assert!(is_block("div"));
        assert!(is_block("P"));
        assert!(!is_block("span"));
        assert!(!is_block("a"));
    }

    #[test]
    fn test_borders_block() {
        let siblings = vec![
            Node::text(" "),
            Element::new("strong").into(),
            Node::text(" "),
            Element::new("em").into(),
            Node::text(" "),
            Element::new("p").into(),
        ];
        assert!(borders_block("p", &siblings, 0));
        assert!(!borders_block("span", &siblings, 0));
        assert!(!borders_block("p", &siblings, 2));
        assert!(borders_block("p", &siblings, 4));
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/posts/one").unwrap();
        assert_eq!(resolve_url(&base, "two").unwrap(), "https://example.com/posts/two");
        assert_eq!(resolve_url(&base, "/img/a.png").unwrap(), "https://example.com/img/a.png");
        assert_eq!(
            resolve_url(&base, "https://other.org/x").unwrap(),
            "https://other.org/x"
        );
    }
}
