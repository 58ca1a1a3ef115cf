//! Filtering copy of the chosen content root.

use url::Url;

use crate::node::{Element, Node};
use crate::utilities::{
    borders_block, collapse_whitespace, is_allowed, is_dropped, is_noise_element, resolve_url,
};

/// Build a fresh `article` holding the allow-listed content under `source`.
pub(crate) fn filtered_copy(source: &Element, base: Option<&Url>) -> Element {
    let mut article = Element::new("article");
    copy_children(source, base, false, &mut article);
    prune_block_edges(&mut article);
    article
}

fn copy_children(source: &Element, base: Option<&Url>, in_pre: bool, out: &mut Element) {
    for child in source.children() {
        match child {
            Node::Text(text) if in_pre => {
                if !text.is_empty() {
                    out.add_child(Node::text(text.as_str()));
                }
            }
            Node::Text(text) if text.trim().is_empty() => {
                if !text.is_empty() && !ends_with_space(out) {
                    out.add_child(Node::text(" "));
                }
            }
            Node::Text(text) => out.add_child(Node::text(collapse_whitespace(text))),
            Node::Element(element) => copy_element(element, base, in_pre, out),
        }
    }
}

fn copy_element(element: &Element, base: Option<&Url>, in_pre: bool, out: &mut Element) {
    let tag = element.tag();
    if is_dropped(tag) || is_noise_element(element) {
        return;
    }

    // Structural wrappers disappear but their content moves up a level.
    if !is_allowed(tag) {
        copy_children(element, base, in_pre, out);
        return;
    }

    let mut copy = Element::new(tag);
    match tag {
        "a" => {
            if let Some(href) = element.attr("href") {
                copy.set_attr("href", &absolute(base, href));
            }
        }
        "img" => {
            if let Some(src) = element.attr("src") {
                copy.set_attr("src", &absolute(base, src));
            }
            if let Some(alt) = element.attr("alt") {
                copy.set_attr("alt", alt);
            }
        }
        _ => {}
    }

    let in_pre = in_pre || tag == "pre";
    copy_children(element, base, in_pre, &mut copy);
    if !in_pre {
        prune_block_edges(&mut copy);
    }

    if (tag == "p" && copy.children().is_empty()) || is_icon_link(&copy) {
        return;
    }
    out.add_child(copy.into());
}

fn ends_with_space(out: &Element) -> bool {
    matches!(out.children().last(), Some(Node::Text(text)) if text.ends_with(' '))
}

/// Drop blank text at block boundaries. Decided on the copy rather than the
/// source, since removed siblings change what a space sits next to.
fn prune_block_edges(copy: &mut Element) {
    let children = copy.children();
    let keep: Vec<bool> = children
        .iter()
        .enumerate()
        .map(|(index, child)| match child {
            Node::Text(text) if text.trim().is_empty() => {
                !borders_block(copy.tag(), children, index)
            }
            _ => true,
        })
        .collect();
    let mut keep = keep.into_iter();
    copy.retain_children(|_| keep.next().unwrap_or(true));
}

/// Links that only wrap an image plus at most a glyph or two. Judged on the
/// filtered copy so a second pass reaches the same verdict.
fn is_icon_link(copy: &Element) -> bool {
    copy.tag() == "a"
        && copy.descendants().any(|d| d.tag() == "img")
        && copy.text_content().trim().chars().count() <= 2
}

fn absolute(base: Option<&Url>, reference: &str) -> String {
    base.and_then(|base| resolve_url(base, reference).ok())
        .unwrap_or_else(|| reference.to_string())
}
