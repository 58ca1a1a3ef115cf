//! Reader - document in, article Markdown out.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::extract::extract;
use crate::metadata::{self, DocumentMetadata};
use crate::node::{Element, Node};
use crate::rules::article_rules;
use crate::service::{MarkdownOptions, MarkdownService};
use crate::Result;

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]+"#).expect("file name pattern is valid"));

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})T").expect("date pattern is valid"));

const MAX_FILE_STEM: usize = 80;

/// Options for Reader
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Documents nesting deeper than this are rejected before any work
    pub max_depth: Option<usize>,

    /// Options for the Markdown stage
    pub markdown: MarkdownOptions,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(512),
            markdown: MarkdownOptions::default(),
        }
    }
}

/// A readable article produced by [`Reader::read`].
#[derive(Debug, Clone)]
pub struct Article {
    /// Title for display
    pub title: String,
    pub metadata: DocumentMetadata,
    /// Extracted content, title block included
    pub content: Element,
    pub plain_text: String,
    pub markdown: String,
}

impl Article {
    /// True when extraction found nothing readable
    pub fn is_empty(&self) -> bool {
        self.content.children().is_empty()
    }

    /// `{title}.md`, safe for common file systems
    pub fn file_name(&self) -> String {
        let title = if self.metadata.title.is_empty() {
            &self.title
        } else {
            &self.metadata.title
        };
        format!("{}.md", safe_file_stem(title))
    }
}

/// Runs extraction, metadata resolution and conversion with the article rules.
pub struct Reader {
    options: ReaderOptions,
    service: MarkdownService,
}

impl Reader {
    pub fn new() -> Self {
        Self::with_options(ReaderOptions::default())
    }

    pub fn with_options(options: ReaderOptions) -> Self {
        let service = MarkdownService::with_rules(options.markdown.clone(), article_rules());
        Self { options, service }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// The Markdown stage, for registering additional rules
    pub fn service_mut(&mut self) -> &mut MarkdownService {
        &mut self.service
    }

    /// Read an article out of a document tree.
    ///
    /// Fails only when the tree exceeds [`ReaderOptions::max_depth`].
    pub fn read(&self, document: &Element, base_url: &str) -> Result<Article> {
        if let Some(limit) = self.options.max_depth {
            document.check_depth(limit)?;
        }

        let extraction = extract(document, base_url);
        let metadata = metadata::resolve(document);

        if extraction.is_empty() {
            debug!("no readable content");
            return Ok(Article {
                title: first_non_empty(&[metadata.title.as_str(), extraction.title.as_str()])
                    .unwrap_or("Article")
                    .to_string(),
                metadata,
                content: extraction.content,
                plain_text: extraction.plain_text,
                markdown: String::new(),
            });
        }

        let mut content = extraction.content;
        ensure_title_block(&mut content, &metadata);
        let fallback = first_non_empty(&[metadata.title.as_str(), extraction.title.as_str()]);
        let title = derive_title(&content, fallback);
        let markdown = self.service.convert_element(&content);

        Ok(Article {
            title,
            metadata,
            content,
            plain_text: extraction.plain_text,
            markdown,
        })
    }

    /// Parse `html` as a full document and read it.
    ///
    /// Parsing itself is not depth-limited but does not recurse, so an
    /// over-deep page still ends in [`Error::TooDeep`](crate::Error::TooDeep).
    #[cfg(feature = "html")]
    pub fn read_html(&self, html: &str, base_url: &str) -> Result<Article> {
        self.read(&crate::html::parse_document(html), base_url)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|s| !s.trim().is_empty())
}

/// Put a heading, subtitle and byline in front of content lacking an `h1`.
pub fn ensure_title_block(content: &mut Element, metadata: &DocumentMetadata) {
    let has_heading = content
        .descendants()
        .any(|element| element.tag() == "h1" && !element.text_content().trim().is_empty());
    if has_heading {
        return;
    }

    let heading = if metadata.title.is_empty() {
        "Untitled"
    } else {
        metadata.title.as_str()
    };
    let mut block = vec![Node::from(Element::new("h1").text(heading))];

    if !metadata.subtitle.is_empty() {
        block.push(Element::new("p").child(Element::new("em").text(&metadata.subtitle)).into());
    }

    let mut byline = Vec::new();
    if !metadata.author.is_empty() {
        byline.push(format!("By {}", metadata.author));
    }
    if !metadata.section.is_empty() {
        byline.push(metadata.section.clone());
    }
    if !metadata.date.is_empty() {
        byline.push(display_date(&metadata.date).to_string());
    }
    if !byline.is_empty() {
        block.push(Element::new("p").text(&byline.join(" · ")).into());
    }

    content.prepend_children(block);
}

/// ISO timestamps shortened to their calendar date.
fn display_date(date: &str) -> &str {
    ISO_DATE
        .captures(date)
        .and_then(|captures| captures.get(1))
        .map_or(date, |day| day.as_str())
}

/// The content's first `h1` when it is descriptive, else `fallback`.
pub fn derive_title(content: &Element, fallback: Option<&str>) -> String {
    let heading = content
        .descendants()
        .find(|element| element.tag() == "h1")
        .map(|h1| h1.text_content().trim().to_string())
        .unwrap_or_default();
    if heading.chars().count() > 10 {
        return heading;
    }
    fallback.unwrap_or("Article").to_string()
}

/// File name stem from a title, without extension.
pub fn safe_file_stem(title: &str) -> String {
    let cleaned = UNSAFE_FILE_CHARS.replace_all(title, " ");
    let stem: String = cleaned.trim().chars().take(MAX_FILE_STEM).collect();
    if stem.is_empty() {
        "article".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn body_text(n: usize) -> String {
        "The quick brown fox jumps over the lazy dog. ".repeat(n)
    }

    fn meta(attr: &str, key: &str, content: &str) -> Element {
        Element::with_attrs("meta", vec![(attr, key), ("content", content)])
    }

    fn document() -> Element {
        Element::new("html")
            .child(
                Element::new("head")
                    .child(Element::new("title").text("Fallback"))
                    .child(meta("property", "og:title", "Meta Title"))
                    .child(meta("name", "author", "Jo Poe"))
                    .child(meta("property", "article:published_time", "2024-05-06T07:08:09Z")),
            )
            .child(
                Element::new("body").child(
                    Element::new("article")
                        .child(Element::new("p").text(&body_text(3)))
                        .child(Element::with_attrs("a", vec![("href", "#top")]).text("↑"))
                        .child(Element::new("p").text(&body_text(2))),
                ),
            )
    }

    #[test]
    fn test_read_builds_title_block() {
        let article = Reader::new().read(&document(), "https://example.com/").unwrap();
        assert!(article
            .markdown
            .starts_with("# Meta Title\n\nBy Jo Poe · 2024-05-06\n\nThe quick brown fox"));
        assert!(!article.markdown.contains('↑'));
        assert_eq!(article.title, "Meta Title");
        assert_eq!(article.file_name(), "Meta Title.md");
    }

    #[test]
    fn test_existing_heading_is_kept() {
        let mut content =
            Element::new("article").child(Element::new("h1").text("Own heading here"));
        let metadata = DocumentMetadata {
            title: "Other".into(),
            ..Default::default()
        };
        ensure_title_block(&mut content, &metadata);
        assert_eq!(content.children().len(), 1);
        assert_eq!(derive_title(&content, Some("Other")), "Own heading here");
    }

    #[test]
    fn test_title_block_with_subtitle() {
        let mut content = Element::new("article").child(Element::new("p").text("body"));
        let metadata = DocumentMetadata {
            subtitle: "Sub".into(),
            section: "News".into(),
            ..Default::default()
        };
        ensure_title_block(&mut content, &metadata);
        let markdown = MarkdownService::new().convert_element(&content);
        assert_eq!(markdown, "# Untitled\n\n*Sub*\n\nNews\n\nbody");
    }

    #[test]
    fn test_short_heading_uses_fallback() {
        let content = Element::new("article").child(Element::new("h1").text("Intro"));
        assert_eq!(derive_title(&content, Some("Real Title")), "Real Title");
        assert_eq!(derive_title(&content, None), "Article");
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("a/b: c?"), "a b  c");
        assert_eq!(safe_file_stem("  ***  "), "article");
        assert_eq!(safe_file_stem(&"x".repeat(100)).len(), 80);
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-05-06T07:08:09Z"), "2024-05-06");
        assert_eq!(display_date("May 6, 2024"), "May 6, 2024");
    }

    #[test]
    fn test_empty_document_reads_empty() {
        let doc = Element::new("html")
            .child(Element::new("body").child(Element::new("nav").text("menu")));
        let article = Reader::new().read(&doc, "https://example.com/").unwrap();
        assert!(article.is_empty());
        assert_eq!(article.markdown, "");
        assert_eq!(article.title, "Article");
    }

    #[test]
    fn test_depth_ceiling() {
        let reader = Reader::with_options(ReaderOptions {
            max_depth: Some(3),
            ..Default::default()
        });
        let result = reader.read(&document(), "https://example.com/");
        assert!(matches!(result, Err(Error::TooDeep { limit: 3, .. })));
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_inline_spacing_survives_the_pipeline() {
        let html = format!(
            "<html><body><article><p>Read <strong>this</strong> <em>carefully</em> {}</p>\
             </article></body></html>",
            body_text(2)
        );
        let article = Reader::new().read_html(&html, "https://example.com/").unwrap();
        assert!(article
            .markdown
            .starts_with("# Untitled\n\nRead **this** *carefully* The quick"));
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_deep_html_is_rejected() {
        let html = format!("<html><body>{}<p>x</p></body></html>", "<div>".repeat(10_000));
        let result = Reader::new().read_html(&html, "https://example.com/");
        assert!(matches!(result, Err(Error::TooDeep { limit: 512, .. })));
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_read_html() {
        let html = format!(
            r#"<html><head><title>Fallback</title>
            <script type="application/ld+json">{{"@type":"Article","headline":"A Long Enough Headline"}}</script>
            </head><body>
            <div class="sidebar"><p>Subscribe to our list</p></div>
            <div id="content">
              <h1>A Long Enough Headline</h1>
              <p>{}</p>
              <span class="badge">NEW</span>
              <pre><code>fn main() {{}}</code></pre>
              <p>{}</p>
            </div></body></html>"#,
            body_text(2),
            body_text(2)
        );
        let article = Reader::new().read_html(&html, "https://example.com/").unwrap();
        assert_eq!(article.title, "A Long Enough Headline");
        assert!(article.markdown.starts_with("# A Long Enough Headline\n\nThe quick"));
        assert!(article.markdown.contains("```\nfn main() {}\n```"));
        assert!(!article.markdown.contains("NEW"));
        assert!(!article.markdown.contains("Subscribe"));
    }
}
