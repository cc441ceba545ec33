//! Include resolution: loading fragments and splicing them into the markup.
//!
//! `<in:include src="header.xml"/>` (with `xmlns:in="urn:inflater"`) is
//! replaced by the root element of the named fragment. Attributes on the
//! include element other than `src` override the fragment root's
//! attributes, which allows one fragment to be included twice under
//! different ids.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::config::{
    INCLUDE_ELEMENT, INCLUDE_SOURCE_ATTRIBUTE, INFLATER_NAMESPACE, MAX_ELEMENT_DEPTH,
};
use crate::error::{InflateError, InflateErrorKind};
use crate::types::QualifiedName;
use crate::xml::{parse_markup, MarkupElement};

/// Source of included fragments.
pub trait FragmentLoader: Send + Sync {
    /// Load the markup text of a fragment.
    ///
    /// # Errors
    /// Returns an IO error if the fragment does not exist or cannot be read.
    fn load(&self, src: &str) -> std::io::Result<String>;
}

/// Loads fragments from files below a root directory.
#[derive(Debug, Clone)]
pub struct FsFragmentLoader {
    root: PathBuf,
}

impl FsFragmentLoader {
    /// Create a loader resolving `src` relative to `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the loader.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FragmentLoader for FsFragmentLoader {
    fn load(&self, src: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.root.join(src))
    }
}

/// Serves fragments from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFragmentLoader {
    fragments: HashMap<String, String>,
}

impl MemoryFragmentLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment.
    #[must_use]
    pub fn with_fragment(mut self, src: impl Into<String>, markup: impl Into<String>) -> Self {
        self.insert(src, markup);
        self
    }

    /// Add or replace a fragment.
    pub fn insert(&mut self, src: impl Into<String>, markup: impl Into<String>) {
        self.fragments.insert(src.into(), markup.into());
    }
}

impl FragmentLoader for MemoryFragmentLoader {
    fn load(&self, src: &str) -> std::io::Result<String> {
        self.fragments.get(src).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("fragment '{src}' not found"),
            )
        })
    }
}

/// Expands include directives of one document, depth-first in document order.
pub(crate) struct IncludeResolver<'a> {
    loader: Option<&'a dyn FragmentLoader>,
    max_depth: usize,
    stack: Vec<String>,
    nesting: usize,
}

impl<'a> IncludeResolver<'a> {
    /// Create a resolver for the document named `source`.
    pub fn new(loader: Option<&'a dyn FragmentLoader>, max_depth: usize, source: &str) -> Self {
        Self {
            loader,
            max_depth,
            stack: vec![normalize_src(source)],
            nesting: 0,
        }
    }

    /// Replace every include directive in the tree by its fragment.
    pub fn expand(&mut self, element: MarkupElement) -> Result<MarkupElement, InflateError> {
        if element.name.namespace.as_deref() == Some(INFLATER_NAMESPACE) {
            if element.name.local == INCLUDE_ELEMENT {
                return self.include(element);
            }
            return Err(InflateError::new(
                InflateErrorKind::UnknownComponent {
                    tag: element.name.to_string(),
                },
                element.location.clone(),
            )
            .with_tag(element.name.to_string()));
        }
        if self.nesting >= MAX_ELEMENT_DEPTH {
            return Err(InflateError::new(
                InflateErrorKind::NestingTooDeep {
                    limit: MAX_ELEMENT_DEPTH,
                },
                element.location.clone(),
            )
            .with_tag(element.name.to_string()));
        }

        let MarkupElement {
            name,
            attributes,
            children,
            location,
        } = element;
        self.nesting += 1;
        let children = children
            .into_iter()
            .map(|child| self.expand(child))
            .collect::<Result<Vec<_>, _>>()?;
        self.nesting -= 1;

        Ok(MarkupElement {
            name,
            attributes,
            children,
            location,
        })
    }

    fn include(&mut self, element: MarkupElement) -> Result<MarkupElement, InflateError> {
        let tag = element.name.to_string();
        let fail = |chain: Vec<String>, reason: String| {
            InflateError::new(
                InflateErrorKind::IncludeResolution { chain, reason },
                element.location.clone(),
            )
            .with_tag(tag.clone())
        };

        let Some(raw_src) = element.attributes.get_local(INCLUDE_SOURCE_ATTRIBUTE) else {
            return Err(fail(
                self.stack.clone(),
                format!("missing '{INCLUDE_SOURCE_ATTRIBUTE}' attribute"),
            ));
        };
        let src = normalize_src(raw_src);
        let src = src.as_str();
        let mut chain = self.stack.clone();
        chain.push(src.to_string());

        if !element.children.is_empty() {
            return Err(fail(chain, "include element cannot have children".to_string()));
        }
        if self.stack.iter().any(|s| s == src) {
            return Err(fail(chain, "include cycle".to_string()));
        }
        if self.stack.len() > self.max_depth {
            return Err(fail(
                chain,
                format!("include depth exceeds {}", self.max_depth),
            ));
        }
        let Some(loader) = self.loader else {
            return Err(fail(chain, "no fragment loader configured".to_string()));
        };

        let text = loader
            .load(src)
            .map_err(|e| fail(chain.clone(), e.to_string()))?;
        let fragment = parse_markup(src, &text)?;

        tracing::debug!(src, depth = self.stack.len(), "Resolved include");
        self.stack.push(src.to_string());
        let mut expanded = self.expand(fragment)?;
        self.stack.pop();

        let source_attribute = QualifiedName::local(INCLUDE_SOURCE_ATTRIBUTE);
        for attribute in &element.attributes {
            if attribute.name != source_attribute {
                expanded
                    .attributes
                    .set(attribute.name.clone(), attribute.value.clone());
            }
        }

        Ok(expanded)
    }
}

/// Normalize an include source lexically, so `sub/../a.xml` and `./a.xml`
/// name the same fragment as `a.xml`.
fn normalize_src(src: &str) -> String {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in Path::new(src.trim()).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(parts.last(), Some(Component::Normal(_))) => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.iter().collect::<PathBuf>().to_string_lossy().into_owned()
}
