//! Rule system for tree to Markdown conversion.

mod article;
mod markdown;
mod rule;

pub use article::{article_rules, badge_rule, fenced_code_rule, short_link_rule};
pub use markdown::markdown_rules;
pub use rule::{Filter, PredicateFn, ReplacementFn, Rule};

use indexmap::IndexMap;

use crate::node::NodeRef;
use crate::service::MarkdownOptions;
use crate::utilities::SKIPPED_TAGS;

/// Collection of rules for conversion
pub struct Rules {
    /// Custom rules added by the caller (checked first, in registration order)
    custom_rules: IndexMap<String, Rule>,
    /// Remove rules (render nothing, children untouched)
    remove_rules: Vec<Filter>,
    /// Built-in tag handling
    markdown_rules: Vec<Rule>,
}

impl Rules {
    /// Create a new Rules instance with the built-in tag handling
    pub fn new() -> Self {
        Self {
            custom_rules: IndexMap::new(),
            remove_rules: vec![Filter::tags(SKIPPED_TAGS)],
            markdown_rules: markdown_rules(),
        }
    }

    /// Add a custom rule.
    ///
    /// Re-adding an existing key replaces that rule without moving it.
    pub fn add(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.custom_rules.insert(key.to_string(), rule);
        self
    }

    /// Builder-style variant of [`Rules::add`]
    pub fn with(mut self, key: &str, rule: Rule) -> Self {
        self.add(key, rule);
        self
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.remove_rules.push(filter);
        self
    }

    /// Keys of the custom rules in precedence order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.custom_rules.keys().map(String::as_str)
    }

    /// First custom rule whose filter accepts the node
    pub fn custom_rule<'a>(
        &'a self,
        node: &NodeRef,
        options: &MarkdownOptions,
    ) -> Option<&'a Rule> {
        self.custom_rules
            .values()
            .find(|rule| rule.filter.matches(node, options))
    }

    /// Check if a node should be removed
    pub fn should_remove(&self, node: &NodeRef, options: &MarkdownOptions) -> bool {
        self.remove_rules
            .iter()
            .any(|filter| filter.matches(node, options))
    }

    /// Built-in rule for the node, if its tag has one
    pub fn markdown_rule<'a>(
        &'a self,
        node: &NodeRef,
        options: &MarkdownOptions,
    ) -> Option<&'a Rule> {
        self.markdown_rules
            .iter()
            .find(|rule| rule.filter.matches(node, options))
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;

    #[test]
    fn test_custom_rules_keep_registration_order() {
        let mut rules = Rules::new();
        rules
            .add("first", Rule::for_tag("a", |_, _, _| "1".into()))
            .add("second", Rule::for_tag("a", |_, _, _| "2".into()))
            .add("first", Rule::for_tag("a", |_, _, _| "3".into()));

        assert_eq!(rules.keys().collect::<Vec<_>>(), vec!["first", "second"]);

        let a = Element::new("a");
        let node = NodeRef::new(&a);
        let options = MarkdownOptions::default();
        let rule = rules.custom_rule(&node, &options).unwrap();
        assert_eq!(rule.replace(&node, "", &options), "3");
    }

    #[test]
    fn test_skip_list_is_a_remove_rule() {
        let rules = Rules::new();
        let options = MarkdownOptions::default();
        for tag in ["script", "style", "noscript", "svg", "iframe"] {
            let element = Element::new(tag);
            assert!(rules.should_remove(&NodeRef::new(&element), &options));
        }
        let div = Element::new("div");
        assert!(!rules.should_remove(&NodeRef::new(&div), &options));
    }

    #[test]
    fn test_unknown_tags_have_no_builtin() {
        let rules = Rules::new();
        let options = MarkdownOptions::default();
        let span = Element::new("span");
        assert!(rules.markdown_rule(&NodeRef::new(&span), &options).is_none());
    }
}
