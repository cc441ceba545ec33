//! Configuration constants, validation functions and the inflater config file.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Namespace of inflater directives such as `<in:include src="..."/>`.
pub const INFLATER_NAMESPACE: &str = "urn:inflater";

/// Namespace of attributes that configure the parent's slot for a child,
/// e.g. `p:expandRatio="1"`.
pub const PARENT_NAMESPACE: &str = "urn:inflater:parent";

/// Namespace prefix declaring a component package, e.g. `urn:import:acme.widgets`.
pub const IMPORT_NAMESPACE_PREFIX: &str = "urn:import:";

/// Package of the built-in component library.
pub const DEFAULT_PACKAGE: &str = "ui";

/// Namespace URI of the built-in component library. Elements without a
/// namespace resolve to the same package.
pub const DEFAULT_NAMESPACE: &str = "urn:import:ui";

/// Attribute naming an element's id.
pub const ID_ATTRIBUTE: &str = "id";

/// Local name of the include directive.
pub const INCLUDE_ELEMENT: &str = "include";

/// Attribute of the include directive naming the fragment.
pub const INCLUDE_SOURCE_ATTRIBUTE: &str = "src";

/// Source name of markup inflated without a file name.
pub const INLINE_SOURCE: &str = "<inline>";

/// Maximum nesting of include directives.
///
/// Cycles are detected separately; this bounds long acyclic chains.
pub const MAX_INCLUDE_DEPTH: usize = 16;

/// Maximum element nesting of a document, after includes are spliced in.
pub const MAX_ELEMENT_DEPTH: usize = 256;

/// Id pattern: starts with a letter or '_', followed by word characters, '-' or '.'.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][\w.-]*$").expect("valid regex"));

/// Package name in an import namespace: dotted identifiers.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PACKAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*$").expect("valid regex")
});

/// Check whether a string is usable as a component id.
///
/// # Examples
/// ```
/// use layout_inflater::config::is_valid_id;
///
/// assert!(is_valid_id("okButton"));
/// assert!(is_valid_id("form.name-field"));
/// assert!(!is_valid_id("1st"));
/// assert!(!is_valid_id(""));
/// ```
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    ID_PATTERN.is_match(id)
}

/// Validate an id prefix.
///
/// # Returns
/// * `Ok(())` if the prefix would produce valid ids
/// * `Err(LayoutError::InvalidIdPrefix)` otherwise
pub fn validate_id_prefix(prefix: &str) -> Result<()> {
    if is_valid_id(prefix) {
        Ok(())
    } else {
        Err(LayoutError::InvalidIdPrefix(prefix.to_string()))
    }
}

/// Extract the package declared by an import namespace.
///
/// # Examples
/// ```
/// use layout_inflater::config::import_package;
///
/// assert_eq!(import_package("urn:import:acme.widgets"), Some("acme.widgets"));
/// assert_eq!(import_package("urn:import:ui"), Some("ui"));
/// assert_eq!(import_package("http://example.com/ns"), None);
/// ```
#[must_use]
pub fn import_package(namespace: &str) -> Option<&str> {
    namespace
        .strip_prefix(IMPORT_NAMESPACE_PREFIX)
        .filter(|package| PACKAGE_PATTERN.is_match(package))
}

/// Settings read from an inflater config file.
///
/// ```yaml
/// id_prefix: login
/// reserved_ids: [okButton, cancelButton]
/// fragment_root: layouts/fragments
/// max_include_depth: 8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InflaterConfig {
    /// Prefix prepended to every id of the inflated layout.
    pub id_prefix: Option<String>,
    /// Ids the binder already owns.
    pub reserved_ids: Vec<String>,
    /// Directory fragments are loaded from. Relative paths are resolved
    /// against the config file's directory.
    pub fragment_root: Option<PathBuf>,
    /// Maximum nesting of include directives.
    pub max_include_depth: usize,
}

impl Default for InflaterConfig {
    fn default() -> Self {
        Self {
            id_prefix: None,
            reserved_ids: Vec::new(),
            fragment_root: None,
            max_include_depth: MAX_INCLUDE_DEPTH,
        }
    }
}

impl InflaterConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&content)?;

        if let (Some(root), Some(dir)) = (&config.fragment_root, path.parent()) {
            if root.is_relative() {
                config.fragment_root = Some(dir.join(root));
            }
        }

        tracing::debug!(path = %path.display(), "Loaded inflater config");
        Ok(config)
    }

    /// Validate field values.
    pub fn validate(&self) -> Result<()> {
        if let Some(prefix) = &self.id_prefix {
            validate_id_prefix(prefix)?;
        }
        Ok(())
    }
}
