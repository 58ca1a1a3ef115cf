//! Locating the article body: search-root selection and paragraph scoring.

use tracing::debug;

use crate::node::{Element, Selector};

/// Containers tried in priority order before falling back to `body`
const ROOT_SELECTORS: &[&str] = &[
    "article", "main", "#content", "#main", "#page", ".post", ".article", ".entry", ".content",
];

/// Blocks whose text length feeds the score of their ancestors
const SCORED_TAGS: &[&str] = &["p", "pre", "td"];

/// Shorter blocks are ignored
const MIN_PARAGRAPH_LEN: usize = 50;

/// Per-paragraph increment ceiling, reached at 300 characters
const MAX_LENGTH_BONUS: usize = 3;

/// The element scoring starts from.
pub(crate) fn search_root(document: &Element) -> &Element {
    for selector in ROOT_SELECTORS {
        if let Some(found) = document.find_first(&Selector::parse(selector)) {
            debug!(selector, "search root selected");
            return found;
        }
    }
    debug!("no content container, searching body");
    document
        .find_first(&Selector::Tag("body".to_string()))
        .unwrap_or(document)
}

/// Score contributed by a block of `len` characters.
pub(crate) fn paragraph_increment(len: usize) -> u32 {
    if len < MIN_PARAGRAPH_LEN {
        return 0;
    }
    1 + (len / 100).min(MAX_LENGTH_BONUS) as u32
}

/// Running scores keyed by pre-order element index within the search root.
struct ScoreTable {
    scores: Vec<f64>,
}

impl ScoreTable {
    fn new(len: usize) -> Self {
        Self {
            scores: vec![0.0; len],
        }
    }

    fn add(&mut self, index: usize, amount: f64) {
        self.scores[index] += amount;
    }

    /// Index of the strictly highest positive score; ties keep the earliest.
    fn best(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, &score) in self.scores.iter().enumerate() {
            if score <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Pre-order listing of `root` and its descendants with parent indices.
fn index_elements(root: &Element) -> (Vec<&Element>, Vec<Option<usize>>) {
    let mut elements = Vec::new();
    let mut parents = Vec::new();
    let mut stack = vec![(root, None)];

    while let Some((element, parent)) = stack.pop() {
        let index = elements.len();
        elements.push(element);
        parents.push(parent);
        stack.extend(element.element_children().rev().map(|child| (child, Some(index))));
    }

    (elements, parents)
}

/// The descendant of `search_root` (or `search_root` itself) holding the
/// densest run of long paragraphs.
pub(crate) fn best_candidate(search_root: &Element) -> &Element {
    let (elements, parents) = index_elements(search_root);
    let mut table = ScoreTable::new(elements.len());

    for (index, element) in elements.iter().enumerate() {
        if !SCORED_TAGS.contains(&element.tag()) {
            continue;
        }
        let len = element.text_content().trim().chars().count();
        let increment = paragraph_increment(len);
        if increment == 0 {
            continue;
        }
        let Some(parent) = parents[index] else {
            continue;
        };
        table.add(parent, f64::from(increment));
        if let Some(grandparent) = parents[parent] {
            table.add(grandparent, f64::from(increment) / 2.0);
        }
    }

    match table.best() {
        Some(index) => {
            debug!(
                tag = elements[index].tag(),
                score = table.scores[index],
                "content root selected"
            );
            elements[index]
        }
        None => {
            debug!("no scored candidate, using search root");
            search_root
        }
    }
}
