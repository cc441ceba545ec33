//! Message substitution filter for localized layouts.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::AttributeFilter;
use crate::xml::{Attributes, MarkupElement};

/// Placeholder pattern: `{i18n:key}`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{i18n:([\w.-]+)\}").expect("valid regex"));

/// Replaces `{i18n:key}` placeholders in attribute values with messages.
///
/// Unknown keys are left in place so the untranslated placeholder is
/// visible in the built layout.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    messages: HashMap<String, String>,
}

impl MessageFilter {
    /// Create a filter from a message catalog.
    #[must_use]
    pub fn new(messages: HashMap<String, String>) -> Self {
        Self { messages }
    }

    /// Add a single message.
    #[must_use]
    pub fn with_message(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }
}

impl AttributeFilter for MessageFilter {
    fn apply(&self, element: &MarkupElement, mut attributes: Attributes) -> Attributes {
        attributes.map_values(|name, value| {
            PLACEHOLDER_PATTERN
                .replace_all(value, |caps: &Captures<'_>| {
                    let key = &caps[1];
                    match self.messages.get(key) {
                        Some(message) => message.clone(),
                        None => {
                            tracing::warn!(
                                key,
                                attribute = %name,
                                location = %element.location,
                                "Missing message"
                            );
                            caps[0].to_string()
                        }
                    }
                })
                .into_owned()
        });
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_markup;

    #[test]
    fn test_substitutes_known_messages() {
        let root = parse_markup(
            "a.xml",
            r#"<Button caption="{i18n:login.ok}" description="Press {i18n:login.ok} to continue"/>"#,
        )
        .unwrap();
        let filter = MessageFilter::default().with_message("login.ok", "Sign in");

        let attributes = filter.apply(&root, root.attributes.clone());
        assert_eq!(attributes.get_local("caption"), Some("Sign in"));
        assert_eq!(
            attributes.get_local("description"),
            Some("Press Sign in to continue")
        );
    }

    #[test]
    fn test_leaves_unknown_placeholders() {
        let root = parse_markup("a.xml", r#"<Button caption="{i18n:missing}"/>"#).unwrap();
        let filter = MessageFilter::default();

        let attributes = filter.apply(&root, root.attributes.clone());
        assert_eq!(attributes.get_local("caption"), Some("{i18n:missing}"));
    }
}
