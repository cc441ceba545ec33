//! Attribute filter chain.
//!
//! Filters pre-process the raw attribute map of each element before any
//! value is parsed. They see only the element (tag, location, original
//! attributes) and the map handed to them, so a chain is deterministic and
//! filters compose in registration order.

mod message;

use std::sync::Arc;

use crate::xml::{Attributes, MarkupElement};

pub use message::MessageFilter;

/// Trait for attribute filters.
///
/// Closures of the shape `Fn(&MarkupElement, Attributes) -> Attributes` are
/// filters too.
pub trait AttributeFilter: Send + Sync {
    /// Return the rewritten attribute map for `element`.
    fn apply(&self, element: &MarkupElement, attributes: Attributes) -> Attributes;
}

impl<F> AttributeFilter for F
where
    F: Fn(&MarkupElement, Attributes) -> Attributes + Send + Sync,
{
    fn apply(&self, element: &MarkupElement, attributes: Attributes) -> Attributes {
        self(element, attributes)
    }
}

/// Ordered list of filters.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn AttributeFilter>>,
}

impl FilterChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter.
    pub fn push(&mut self, filter: impl AttributeFilter + 'static) {
        self.filters.push(Arc::new(filter));
    }

    /// Append a shared filter.
    pub fn push_shared(&mut self, filter: Arc<dyn AttributeFilter>) {
        self.filters.push(filter);
    }

    /// Number of filters in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter over the element's attributes.
    #[must_use]
    pub fn apply(&self, element: &MarkupElement) -> Attributes {
        self.filters
            .iter()
            .fold(element.attributes.clone(), |attributes, filter| {
                filter.apply(element, attributes)
            })
    }

    /// Filter a whole markup tree, returning a new tree.
    #[must_use]
    pub fn apply_tree(&self, element: MarkupElement) -> MarkupElement {
        if self.filters.is_empty() {
            return element;
        }
        let attributes = self.apply(&element);
        MarkupElement {
            attributes,
            children: element
                .children
                .into_iter()
                .map(|child| self.apply_tree(child))
                .collect(),
            name: element.name,
            location: element.location,
        }
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QualifiedName;
    use crate::xml::parse_markup;

    #[test]
    fn test_empty_chain_is_identity() {
        let root = parse_markup(
            "a.xml",
            r#"<VerticalLayout id="main" width="100%"><Button caption=" spaced "/></VerticalLayout>"#,
        )
        .unwrap();
        let chain = FilterChain::new();

        assert_eq!(chain.apply(&root), root.attributes);
        assert_eq!(chain.apply_tree(root.clone()), root);
    }

    #[test]
    fn test_filters_run_in_registration_order() {
        let root = parse_markup("a.xml", r#"<Button caption="ok"/>"#).unwrap();
        let mut chain = FilterChain::new();
        chain.push(|_: &MarkupElement, mut attributes: Attributes| {
            attributes.map_values(|_, value| format!("{value}-first"));
            attributes
        });
        chain.push(|_: &MarkupElement, mut attributes: Attributes| {
            attributes.map_values(|_, value| format!("{value}-second"));
            attributes
        });

        assert_eq!(chain.apply(&root).get_local("caption"), Some("ok-first-second"));
    }

    #[test]
    fn test_filter_sees_element_and_can_add_attributes() {
        let root = parse_markup("a.xml", r#"<VerticalLayout><Button/><Label/></VerticalLayout>"#)
            .unwrap();
        let mut chain = FilterChain::new();
        chain.push(|element: &MarkupElement, mut attributes: Attributes| {
            if element.name.local == "Button" {
                attributes.set(QualifiedName::local("caption"), "Default");
            }
            attributes
        });

        let filtered = chain.apply_tree(root);
        assert_eq!(filtered.children[0].attributes.get_local("caption"), Some("Default"));
        assert!(filtered.children[1].attributes.is_empty());
        assert!(filtered.attributes.is_empty());
    }
}
