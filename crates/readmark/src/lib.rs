//! # readmark
//!
//! Extract the main article from a document tree and render it as Markdown.
//!
//! The crate works on its own lightweight [`Element`]/[`Node`] tree, so any
//! HTML parser (or a browser DOM snapshot) can feed it. Three pieces do the
//! work:
//!
//! - [`extract`] scores paragraph density to find the article body and
//!   copies it through a tag allow-list and a noise filter.
//! - [`metadata::resolve`] reads title, byline and date from `<meta>` tags
//!   and JSON-LD.
//! - [`MarkdownService`] walks any tree and renders Markdown, letting caller
//!   [`Rule`]s take precedence over the built-in tag handling.
//!
//! [`Reader`] chains them with the [`article_rules`] preset.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use readmark::{MarkdownService, Node, Element};
//!
//! let service = MarkdownService::new();
//!
//! let h1 = Element::new("h1").text("Hello World");
//!
//! let markdown = service.convert(&Node::from(h1));
//! assert_eq!(markdown, "# Hello World");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use readmark::Reader;
//!
//! let html = "<html><body><article><h1>A headline of some length</h1>\
//!     <p>Enough words to count as a paragraph, and then a few more besides.</p>\
//!     </article></body></html>";
//! let article = Reader::new().read_html(html, "https://example.com/").unwrap();
//! assert!(article.markdown.starts_with("# A headline of some length"));
//! ```

mod extract;
#[cfg(feature = "html")]
pub mod html;
pub mod metadata;
pub mod node;
mod reader;
mod rules;
mod service;
mod utilities;

pub use extract::{extract, ExtractionResult};
#[cfg(feature = "html")]
pub use html::{parse_document, parse_html};
pub use metadata::DocumentMetadata;
pub use node::{Element, Node, NodeRef, Selector};
pub use reader::{derive_title, ensure_title_block, safe_file_stem, Article, Reader, ReaderOptions};
pub use rules::{
    article_rules, badge_rule, fenced_code_rule, markdown_rules, short_link_rule, Filter,
    PredicateFn, ReplacementFn, Rule, Rules,
};
pub use service::{convert, MarkdownOptions, MarkdownService};
pub use utilities::{is_allowed, is_noise, ALLOWED_TAGS};

/// Error type for readmark operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Document nests {depth} levels deep, limit is {limit}")]
    TooDeep { depth: usize, limit: usize },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid JSON-LD: {0}")]
    JsonLd(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
