//! Built-in tag handling for the Markdown engine.
//!
//! Consulted after caller rules and the skip list, in the order returned by
//! [`markdown_rules`].

use super::{Filter, Rule};
use crate::utilities::{clean_attribute, flanking_whitespace, inline};

/// Create all built-in rules
pub fn markdown_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        code_block_rule(),
        horizontal_rule(),
        link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        code_in_pre_rule(),
        image_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| {
        let content = inline(content);
        if content.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", content)
    })
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, _| "\n".to_string())
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |node, content, _| {
        let level: usize = node.tag()[1..].parse().unwrap_or(1);

        let content = inline(content);
        if content.is_empty() {
            return String::new();
        }

        format!("\n\n{} {}\n\n", "#".repeat(level), content)
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let quoted: Vec<String> = content
            .trim()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("> {}", line))
            .collect();
        if quoted.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

/// Lists receive one already-flattened item per line.
fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |node, content, _| {
        if content.is_empty() {
            return String::new();
        }
        let ordered = node.tag() == "ol";
        let items: Vec<String> = content
            .split('\n')
            .enumerate()
            .map(|(index, item)| {
                if ordered {
                    format!("{}. {}", index + 1, item)
                } else {
                    format!("- {}", item)
                }
            })
            .collect();
        format!("\n\n{}\n\n", items.join("\n"))
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |_, content, _| format!("{}\n", content))
}

fn code_block_rule() -> Rule {
    Rule::for_tag("pre", |node, _, _| {
        let code = node.text_content();
        let code = code.trim_end_matches('\n');
        if code.is_empty() {
            return String::new();
        }
        format!("\n\n```\n{}\n```\n\n", code)
    })
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, _| "\n---\n\n".to_string())
}

fn link_rule() -> Rule {
    Rule::for_tag("a", |node, content, _| {
        let href = clean_attribute(node.attr("href"));
        if href.is_empty() {
            return content.to_string();
        }

        let text = inline(content);
        if text.is_empty() {
            return format!("[{}]({})", href, href);
        }

        let (leading, trailing) = flanking_whitespace(content);
        format!("{}[{}]({}){}", leading, text, href, trailing)
    })
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, _| delimit(content, "*"))
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, _| delimit(content, "**"))
}

/// Wrap flattened content in `delimiter`, keeping edge whitespace outside.
fn delimit(content: &str, delimiter: &str) -> String {
    let (leading, trailing) = flanking_whitespace(content);
    let text = inline(content);
    if text.is_empty() {
        return leading.to_string();
    }
    format!("{}{}{}{}{}", leading, delimiter, text, delimiter, trailing)
}

/// Inline code; a zero-width space goes ahead of each literal backtick so
/// the single-backtick delimiters stay unambiguous.
fn code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "code" && node.parent_tag() != Some("pre")),
        |node, _, _| {
            let content = node.text_content();
            if content.is_empty() {
                return String::new();
            }
            format!("`{}`", content.replace('`', "\u{200B}`"))
        },
    )
}

/// The enclosing `pre` does the fencing.
fn code_in_pre_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "code" && node.parent_tag() == Some("pre")),
        |node, _, _| node.text_content(),
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _| {
        let alt = clean_attribute(node.attr("alt"));
        let src = clean_attribute(node.attr("src"));

        if src.is_empty() {
            return String::new();
        }

        format!("![{}]({})", alt, src)
    })
}
