//! Core data types shared by the inflater.
//!
//! These types describe markup names and locations, the kinds of values a
//! component property accepts, and the typed values produced by attribute
//! parsing (including the host library's native value types).

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Namespace-qualified XML name of an element or attribute.
///
/// Equality and hashing only consider the namespace URI and the local part;
/// the prefix is kept for diagnostics (`bogus:Widget`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Namespace URI, if the name is namespaced.
    pub namespace: Option<String>,
    /// Prefix used in the source document, if any.
    pub prefix: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl QualifiedName {
    /// Create a name without namespace.
    #[must_use]
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local: local.into(),
        }
    }

    /// Create a namespaced name.
    #[must_use]
    pub fn namespaced(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            prefix: None,
            local: local.into(),
        }
    }

    /// Set the prefix used for display.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Option<impl Into<String>>) -> Self {
        self.prefix = prefix.map(Into::into);
        self
    }

    /// Check whether this name has the given namespace and local part.
    #[must_use]
    pub fn is(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.local == other.local
    }
}

impl Eq for QualifiedName {}

impl Hash for QualifiedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Position of an element in its source document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    /// Name of the document (file name or caller supplied label).
    pub source: String,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    /// Element path from the document root, e.g. `/VerticalLayout/Button[2]`.
    pub path: String,
}

impl Location {
    /// Create a location without an element path.
    #[must_use]
    pub fn new(source: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            source: source.into(),
            line,
            column,
            path: String::new(),
        }
    }

    /// Set the element path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)?;
        if !self.path.is_empty() {
            write!(f, " ({})", self.path)?;
        }
        Ok(())
    }
}

/// Identifier of a node in a [`ComponentTree`](crate::inflater::ComponentTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declaration of an enumerated property type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    /// Name of the enum, used in diagnostics.
    pub name: String,
    /// Canonical variant names.
    pub variants: Vec<String>,
}

impl EnumSpec {
    /// Create an enum declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, variants: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Kind of value a component property accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// `true` / `false`.
    Bool,
    /// Signed integer.
    Integer,
    /// Floating point number.
    Float,
    /// Free text.
    Text,
    /// Host library size (`100px`, `50%`, `auto`).
    Size,
    /// Host library alignment (`TOP_LEFT`, `middle center`).
    Alignment,
    /// Host library color (`#ff0000`, `rgb(255, 0, 0)`).
    Color,
    /// Enumerated value matched by name.
    Enum(EnumSpec),
    /// Reference to another component by id, resolved after inflation.
    ComponentRef,
    /// Domain type handled only by caller supplied parsers.
    Custom(String),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("boolean"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Text => f.write_str("text"),
            Self::Size => f.write_str("size"),
            Self::Alignment => f.write_str("alignment"),
            Self::Color => f.write_str("color"),
            Self::Enum(spec) => write!(f, "enum {}", spec.name),
            Self::ComponentRef => f.write_str("component reference"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Unit of a [`Size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Px,
    Percent,
    Em,
    Rem,
    Ex,
    Pt,
    Pc,
    Cm,
    Mm,
    In,
}

impl SizeUnit {
    /// CSS suffix of the unit.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Percent => "%",
            Self::Em => "em",
            Self::Rem => "rem",
            Self::Ex => "ex",
            Self::Pt => "pt",
            Self::Pc => "pc",
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::In => "in",
        }
    }

    /// Parse a CSS suffix. An empty suffix means pixels.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" | "px" => Some(Self::Px),
            "%" => Some(Self::Percent),
            "em" => Some(Self::Em),
            "rem" => Some(Self::Rem),
            "ex" => Some(Self::Ex),
            "pt" => Some(Self::Pt),
            "pc" => Some(Self::Pc),
            "cm" => Some(Self::Cm),
            "mm" => Some(Self::Mm),
            "in" => Some(Self::In),
            _ => None,
        }
    }
}

/// Width or height of a component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    /// Size determined by the content.
    Undefined,
    /// Explicit size.
    Fixed { value: f32, unit: SizeUnit },
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("auto"),
            Self::Fixed { value, unit } => write!(f, "{value}{}", unit.as_str()),
        }
    }
}

/// Vertical component of an [`Alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

/// Horizontal component of an [`Alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
}

/// Placement of a component inside its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub vertical: VerticalAlignment,
    pub horizontal: HorizontalAlignment,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertical = match self.vertical {
            VerticalAlignment::Top => "TOP",
            VerticalAlignment::Middle => "MIDDLE",
            VerticalAlignment::Bottom => "BOTTOM",
        };
        let horizontal = match self.horizontal {
            HorizontalAlignment::Left => "LEFT",
            HorizontalAlignment::Center => "CENTER",
            HorizontalAlignment::Right => "RIGHT",
        };
        write!(f, "{vertical}_{horizontal}")
    }
}

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Typed value assigned to a component property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Size(Size),
    Alignment(Alignment),
    Color(Color),
    Enum {
        #[serde(rename = "enum")]
        type_name: String,
        variant: String,
    },
    /// Resolved reference to another node of the same tree.
    Component(NodeId),
    /// Value of a caller defined domain type.
    Custom {
        #[serde(rename = "type")]
        type_name: String,
        data: serde_json::Value,
    },
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
            Self::Size(size) => write!(f, "{size}"),
            Self::Alignment(alignment) => write!(f, "{alignment}"),
            Self::Color(color) => write!(f, "{color}"),
            Self::Enum { variant, .. } => f.write_str(variant),
            Self::Component(node) => write!(f, "{node}"),
            Self::Custom { data, .. } => write!(f, "{data}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_qualified_name_ignores_prefix_in_equality() {
        let a = QualifiedName::namespaced("urn:import:demo", "Gauge").with_prefix(Some("d"));
        let b = QualifiedName::namespaced("urn:import:demo", "Gauge").with_prefix(Some("x"));
        assert_eq!(a, b);

        let set: HashSet<_> = [a].into_iter().collect();
        assert!(set.contains(&b));
    }

    #[test]
    fn test_qualified_name_display() {
        let name = QualifiedName::namespaced("urn:bogus", "Widget").with_prefix(Some("bogus"));
        assert_eq!(name.to_string(), "bogus:Widget");
        assert_eq!(QualifiedName::local("Button").to_string(), "Button");
    }

    #[test]
    fn test_location_display() {
        let location = Location::new("main.xml", 3, 5).with_path("/VerticalLayout/Button[1]");
        assert_eq!(location.to_string(), "main.xml:3:5 (/VerticalLayout/Button[1])");
        assert_eq!(Location::new("main.xml", 1, 1).to_string(), "main.xml:1:1");
    }

    #[test]
    fn test_value_display() {
        let size = Value::Size(Size::Fixed {
            value: 50.0,
            unit: SizeUnit::Percent,
        });
        assert_eq!(size.to_string(), "50%");

        let color = Value::Color(Color {
            red: 255,
            green: 0,
            blue: 16,
        });
        assert_eq!(color.to_string(), "#ff0010");

        let alignment = Value::Alignment(Alignment {
            vertical: VerticalAlignment::Middle,
            horizontal: HorizontalAlignment::Center,
        });
        assert_eq!(alignment.to_string(), "MIDDLE_CENTER");
    }

    #[test]
    fn test_value_kind_display() {
        let kind = ValueKind::Enum(EnumSpec::new("ContentMode", ["text", "html"]));
        assert_eq!(kind.to_string(), "enum ContentMode");
        assert_eq!(ValueKind::Integer.to_string(), "integer");
    }
}
