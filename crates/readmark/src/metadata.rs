//! Article metadata from `<meta>` tags and JSON-LD.
//!
//! Meta tags are read first; the first JSON-LD block describing an
//! `Article` or `BlogPosting` then overrides each field it provides.

use serde_json::Value;
use tracing::debug;

use crate::node::Element;
use crate::Result;

const ARTICLE_TYPES: &[&str] = &["Article", "BlogPosting"];

/// Descriptive fields of a document; unresolved fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub section: String,
    pub date: String,
}

/// Resolve metadata for a whole document tree.
pub fn resolve(document: &Element) -> DocumentMetadata {
    let mut metadata = DocumentMetadata {
        title: meta_title(document).unwrap_or_default(),
        subtitle: meta_content(document, "name", "description")
            .or_else(|| meta_content(document, "property", "og:description"))
            .unwrap_or_default(),
        author: meta_content(document, "name", "author")
            .or_else(|| meta_content(document, "property", "article:author"))
            .unwrap_or_default(),
        section: meta_content(document, "property", "article:section").unwrap_or_default(),
        date: meta_content(document, "property", "article:published_time").unwrap_or_default(),
    };

    if let Some(article) = json_ld_article(document) {
        override_field(&mut metadata.title, string_field(&article, "headline"));
        override_field(&mut metadata.subtitle, string_field(&article, "description"));
        override_field(&mut metadata.author, article.get("author").and_then(author_name));
        override_field(&mut metadata.section, string_field(&article, "articleSection"));
        override_field(&mut metadata.date, string_field(&article, "datePublished"));
    }

    metadata
}

/// `og:title`, else the document `<title>`.
pub(crate) fn meta_title(document: &Element) -> Option<String> {
    meta_content(document, "property", "og:title").or_else(|| document_title(document))
}

/// Trimmed text of the first `<title>` element.
pub(crate) fn document_title(document: &Element) -> Option<String> {
    document
        .descendants()
        .find(|element| element.tag() == "title")
        .map(|title| title.text_content().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// `content` of the first `<meta {attr}="{key}">` carrying a non-empty value.
fn meta_content(document: &Element, attr: &str, key: &str) -> Option<String> {
    document
        .descendants()
        .filter(|element| element.tag() == "meta")
        .filter(|meta| meta.attr(attr).is_some_and(|value| value.trim().eq_ignore_ascii_case(key)))
        .filter_map(|meta| meta.attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn override_field(field: &mut String, value: Option<&str>) {
    if let Some(value) = value {
        *field = value.to_string();
    }
}

/// First JSON-LD block that is, or lists, an article object.
fn json_ld_article(document: &Element) -> Option<Value> {
    document
        .descendants()
        .filter(|element| element.tag() == "script")
        .filter(|script| {
            script
                .attr("type")
                .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("application/ld+json"))
        })
        .find_map(|script| {
            let text = script.text_content();
            if text.trim().is_empty() {
                return None;
            }
            match parse_json_ld(&text) {
                Ok(value) => find_article(value),
                Err(err) => {
                    debug!(%err, "skipping malformed JSON-LD block");
                    None
                }
            }
        })
}

fn parse_json_ld(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text.trim())?)
}

fn find_article(value: Value) -> Option<Value> {
    if is_article(&value) {
        return Some(value);
    }
    let candidates = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("@graph") {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };
    candidates.into_iter().find(is_article)
}

fn is_article(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => ARTICLE_TYPES.contains(&kind.as_str()),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| ARTICLE_TYPES.contains(&kind)),
        _ => false,
    }
}

/// A non-empty string, or the first one in an array.
fn string_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    match value.get(key)? {
        Value::String(s) => non_empty(s),
        Value::Array(items) => items.iter().filter_map(Value::as_str).find_map(non_empty),
        _ => None,
    }
}

/// `author` as a string, a `{ "name": .. }` object, or a list of either.
fn author_name(author: &Value) -> Option<&str> {
    match author {
        Value::String(name) => non_empty(name),
        Value::Object(_) => author.get("name").and_then(Value::as_str).and_then(non_empty),
        Value::Array(authors) => authors.iter().find_map(author_name),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
