//! Error types for the inflater.
//!
//! Uses the dual-error pattern: `LayoutError` for library consumers covering
//! every phase, and `InflateError` for failures of one inflation. Every
//! inflation failure carries the root cause, the offending element's tag and
//! its location in the source document.

use std::fmt;

use thiserror::Error;

use crate::types::Location;

/// Where the first holder of a duplicated id came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrigin {
    /// The id was reserved by the binder before inflation started.
    Reserved,
    /// The id was declared by another element.
    Declared(Location),
}

impl fmt::Display for IdOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved => f.write_str("reserved by the binder"),
            Self::Declared(location) => write!(f, "first declared at {location}"),
        }
    }
}

/// Root cause of an inflation failure.
#[derive(Debug, Error)]
pub enum InflateErrorKind {
    /// The document is not well-formed XML (includes duplicate attributes).
    #[error("Malformed markup: {0}")]
    Markup(#[from] roxmltree::Error),

    /// Elements are nested deeper than the inflater supports.
    #[error("Elements nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// No component type is known for the tag.
    #[error("Unknown component <{tag}>")]
    UnknownComponent { tag: String },

    /// The component type has no property with the attribute's name.
    #[error("Unknown attribute '{attribute}' for component {component}")]
    UnknownAttribute { attribute: String, component: String },

    /// The raw attribute value could not be converted to the property type.
    #[error("Cannot parse attribute '{attribute}' value \"{raw_value}\" as {target_type}: {reason}")]
    AttributeParse {
        attribute: String,
        raw_value: String,
        target_type: String,
        reason: String,
    },

    /// Two elements, or an element and the binder, claim the same id.
    #[error("Duplicate id '{id}' ({first})")]
    DuplicateId { id: String, first: IdOrigin },

    /// The parent does not accept the child.
    #[error("<{parent}> cannot contain <{child}>: {reason}")]
    InvalidChild {
        parent: String,
        child: String,
        reason: String,
    },

    /// A component reference names an id that never appeared.
    #[error("Attribute '{attribute}' references unknown id '{target}'")]
    UnresolvedReference { attribute: String, target: String },

    /// A fragment could not be loaded, or the include chain is cyclic or too deep.
    #[error("Cannot resolve include {}: {reason}", .chain.join(" -> "))]
    IncludeResolution { chain: Vec<String>, reason: String },

    /// The component factory or a property setter rejected the element.
    #[error("Failed to instantiate {component}: {reason}")]
    Instantiation { component: String, reason: String },

    /// An inflater listener rejected a freshly built subtree.
    #[error("Inflater listener failed: {0}")]
    Listener(String),
}

/// Failure of a single inflation, located in the source document.
#[derive(Debug, Error)]
#[error("Inflation failed at {location}{}: {kind}", .tag.as_ref().map(|t| format!(" in <{t}>")).unwrap_or_default())]
pub struct InflateError {
    #[source]
    kind: InflateErrorKind,
    tag: Option<String>,
    location: Location,
}

impl InflateError {
    /// Create an error at a document location.
    #[must_use]
    pub fn new(kind: InflateErrorKind, location: Location) -> Self {
        Self {
            kind,
            tag: None,
            location,
        }
    }

    /// Attach the offending element's tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Root cause of the failure.
    #[must_use]
    pub fn kind(&self) -> &InflateErrorKind {
        &self.kind
    }

    /// Tag of the offending element, if the failure is tied to one.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Location of the offending element.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Consume the error and return its root cause.
    #[must_use]
    pub fn into_kind(self) -> InflateErrorKind {
        self.kind
    }
}

/// Failure reported by a [`Binder`](crate::binder::Binder).
///
/// Kept apart from inflation failures: a binding error means the tree was
/// built correctly but could not be wired to the controller.
#[derive(Debug, Error)]
pub enum BindError {
    /// The controller expects a component the layout does not declare.
    #[error("No component with id '{0}' in layout")]
    MissingComponent(String),

    /// The component exists but has another type than the controller expects.
    #[error("Component '{id}' is a {actual}, expected {expected}")]
    TypeMismatch {
        id: String,
        expected: String,
        actual: String,
    },

    /// Any other binder specific failure.
    #[error("{0}")]
    Other(String),
}

/// Main error type for the inflater library.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Inflation failed.
    #[error(transparent)]
    Inflate(#[from] InflateError),

    /// Binding the inflated layout failed.
    #[error("Binding failed: {0}")]
    Bind(#[from] BindError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    /// Id prefix contains characters not allowed in ids.
    #[error("Invalid id prefix: '{0}'. Expected letters, digits, '_', '-' or '.'")]
    InvalidIdPrefix(String),
}

/// Result type alias for inflater operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflate_error_display_with_tag() {
        let err = InflateError::new(
            InflateErrorKind::UnknownComponent {
                tag: "bogus:Widget".to_string(),
            },
            Location::new("main.xml", 4, 3),
        )
        .with_tag("bogus:Widget");

        assert_eq!(
            err.to_string(),
            "Inflation failed at main.xml:4:3 in <bogus:Widget>: Unknown component <bogus:Widget>"
        );
    }

    #[test]
    fn test_inflate_error_display_without_tag() {
        let err = InflateError::new(
            InflateErrorKind::Listener("rejected".to_string()),
            Location::new("main.xml", 1, 1),
        );
        assert_eq!(
            err.to_string(),
            "Inflation failed at main.xml:1:1: Inflater listener failed: rejected"
        );
    }

    #[test]
    fn test_duplicate_id_display() {
        let kind = InflateErrorKind::DuplicateId {
            id: "ok".to_string(),
            first: IdOrigin::Declared(Location::new("main.xml", 2, 5)),
        };
        assert_eq!(
            kind.to_string(),
            "Duplicate id 'ok' (first declared at main.xml:2:5)"
        );

        let kind = InflateErrorKind::DuplicateId {
            id: "ok".to_string(),
            first: IdOrigin::Reserved,
        };
        assert_eq!(kind.to_string(), "Duplicate id 'ok' (reserved by the binder)");
    }

    #[test]
    fn test_include_error_display() {
        let kind = InflateErrorKind::IncludeResolution {
            chain: vec!["a.xml".to_string(), "b.xml".to_string(), "a.xml".to_string()],
            reason: "include cycle".to_string(),
        };
        assert_eq!(
            kind.to_string(),
            "Cannot resolve include a.xml -> b.xml -> a.xml: include cycle"
        );
    }

    #[test]
    fn test_bind_error_is_distinct() {
        let err: LayoutError = BindError::MissingComponent("ok".to_string()).into();
        assert!(matches!(err, LayoutError::Bind(_)));
        assert_eq!(err.to_string(), "Binding failed: No component with id 'ok' in layout");
    }
}
