//! Main-content extraction.
//!
//! [`extract`] narrows a whole document down to the subtree most likely to
//! be the article body, then copies it through the tag allow-list and the
//! noise filter. It never fails: without a better candidate the search root
//! is used, and without content the result is an empty `article`.

mod candidate;
mod filter;

use tracing::debug;
use url::Url;

use crate::metadata::meta_title;
use crate::node::Element;

/// Outcome of [`extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// `og:title`, falling back to the document `<title>`
    pub title: String,
    /// Newly built `article` whose descendants are all allow-listed
    pub content: Element,
    /// Concatenated text of `content`
    pub plain_text: String,
}

impl ExtractionResult {
    /// True when nothing readable survived filtering
    pub fn is_empty(&self) -> bool {
        self.content.children().is_empty()
    }
}

/// Extract the main content of `root`, resolving link and image URLs
/// against `base_url`.
///
/// ```rust
/// use readmark::{extract, Element};
///
/// let doc = Element::new("body")
///     .child(Element::new("div").child(Element::new("p").text(&"Long enough text. ".repeat(5))))
///     .child(Element::new("nav").child(Element::new("a").text("Home")));
///
/// let result = extract(&doc, "https://example.com/");
/// assert!(!result.plain_text.contains("Home"));
/// ```
pub fn extract(root: &Element, base_url: &str) -> ExtractionResult {
    let base = match Url::parse(base_url) {
        Ok(base) => Some(base),
        Err(err) => {
            debug!(base_url, %err, "unusable base URL, keeping relative links");
            None
        }
    };

    let search_root = candidate::search_root(root);
    let winner = candidate::best_candidate(search_root);
    let content = filter::filtered_copy(winner, base.as_ref());
    let plain_text = content.text_content();

    ExtractionResult {
        title: meta_title(root).unwrap_or_default(),
        content,
        plain_text,
    }
}
