//! Attribute value parser registry.
//!
//! Converts raw attribute strings into typed [`Value`]s for a target
//! [`ValueKind`]. Parsers registered by the caller are consulted first, in
//! registration order, followed by the built-in parsers. The first parser
//! that accepts the kind performs the parse; there is no fallback to later
//! parsers when it fails.

mod enumeration;
mod primitive;
mod reference;
mod widget;

use std::sync::{Arc, LazyLock};

use crate::error::InflateErrorKind;
use crate::types::{Value, ValueKind};

pub use enumeration::EnumParser;
pub use primitive::PrimitiveParser;
pub use reference::ComponentRefParser;
pub use widget::WidgetValueParser;

/// Outcome of parsing one attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    /// The value is complete and can be applied immediately.
    Ready(Value),
    /// The value names a component id that is resolved after inflation.
    Deferred(String),
}

/// Trait for attribute value parsers.
pub trait AttributeParser: Send + Sync {
    /// Check if this parser converts values of the given kind.
    fn can_handle(&self, kind: &ValueKind) -> bool;

    /// Convert a raw value.
    ///
    /// # Errors
    /// Returns a human readable reason when the value is not valid for `kind`.
    fn parse(&self, raw: &str, kind: &ValueKind) -> Result<ParsedValue, String>;
}

/// Built-in parsers, shared by every registry.
static DEFAULT_PARSERS: LazyLock<Vec<Arc<dyn AttributeParser>>> = LazyLock::new(|| {
    vec![
        Arc::new(PrimitiveParser),
        Arc::new(WidgetValueParser),
        Arc::new(EnumParser),
        Arc::new(ComponentRefParser),
    ]
});

/// Ordered parser list layered on top of the built-in parsers.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    custom: Vec<Arc<dyn AttributeParser>>,
}

impl ParserRegistry {
    /// Create a registry with only the built-in parsers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parser that takes precedence over the built-ins.
    pub fn register(&mut self, parser: impl AttributeParser + 'static) {
        self.custom.push(Arc::new(parser));
    }

    /// Add a shared parser that takes precedence over the built-ins.
    pub fn register_shared(&mut self, parser: Arc<dyn AttributeParser>) {
        self.custom.push(parser);
    }

    /// Number of caller registered parsers.
    #[must_use]
    pub fn custom_count(&self) -> usize {
        self.custom.len()
    }

    /// Find the parser responsible for a kind.
    #[must_use]
    pub fn parser_for(&self, kind: &ValueKind) -> Option<&dyn AttributeParser> {
        self.custom
            .iter()
            .chain(DEFAULT_PARSERS.iter())
            .find(|parser| parser.can_handle(kind))
            .map(|parser| parser.as_ref())
    }

    /// Parse the raw value of an attribute.
    ///
    /// # Arguments
    /// * `attribute` - Attribute name, for diagnostics
    /// * `raw` - Raw attribute value
    /// * `kind` - Kind of the target property
    ///
    /// # Errors
    /// Returns `AttributeParse` when no parser accepts the kind or the
    /// responsible parser rejects the value.
    pub fn parse(
        &self,
        attribute: &str,
        raw: &str,
        kind: &ValueKind,
    ) -> Result<ParsedValue, InflateErrorKind> {
        let error = |reason: String| InflateErrorKind::AttributeParse {
            attribute: attribute.to_string(),
            raw_value: raw.to_string(),
            target_type: kind.to_string(),
            reason,
        };

        let parser = self
            .parser_for(kind)
            .ok_or_else(|| error("no parser accepts this type".to_string()))?;
        let parsed = parser.parse(raw, kind).map_err(error)?;

        tracing::trace!(attribute, raw, kind = %kind, "Parsed attribute");
        Ok(parsed)
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("custom", &self.custom.len())
            .field("builtin", &DEFAULT_PARSERS.len())
            .finish()
    }
}
