//! Component registry mapping tags to component types.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::component::ComponentType;
use crate::config::{import_package, DEFAULT_NAMESPACE, DEFAULT_PACKAGE};
use crate::error::{InflateError, InflateErrorKind};
use crate::types::{Location, QualifiedName};

/// Registry resolving element tags to component types.
///
/// Two tables are kept: custom factories registered for an exact tag, and a
/// catalog of types by fully qualified name that backs `urn:import:`
/// namespaces and the built-in default namespace. A registry may be layered
/// on a shared base registry; each lookup step consults this registry first
/// and the base second.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    custom: HashMap<QualifiedName, Arc<ComponentType>>,
    catalog: HashMap<String, Arc<ComponentType>>,
    base: Option<&'static ComponentRegistry>,
}

impl ComponentRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that falls back to `base`.
    #[must_use]
    pub fn layered_on(base: &'static ComponentRegistry) -> Self {
        Self {
            base: Some(base),
            ..Self::default()
        }
    }

    /// Register a custom factory for an exact tag.
    pub fn register(&mut self, tag: QualifiedName, component_type: ComponentType) {
        self.custom.insert(tag, Arc::new(component_type));
    }

    /// Add a type to the catalog under its fully qualified name.
    pub fn register_type(&mut self, component_type: ComponentType) {
        self.catalog
            .insert(component_type.name().to_string(), Arc::new(component_type));
    }

    /// Check if a type with the given fully qualified name is known.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        self.lookup_type(name).is_some()
    }

    /// Return the fully qualified names of all catalog types, including the base.
    #[must_use]
    pub fn type_names(&self) -> HashSet<&str> {
        let mut names: HashSet<&str> = self.catalog.keys().map(String::as_str).collect();
        if let Some(base) = self.base {
            names.extend(base.type_names());
        }
        names
    }

    /// Resolve an element tag to its component type.
    ///
    /// Resolution order, first match wins:
    /// 1. custom factories registered for the exact tag;
    /// 2. `urn:import:<package>` namespaces, mapping `<p:Local>` to the
    ///    catalog type `<package>.Local`. Such a namespace is authoritative:
    ///    a miss is an error, nothing else is tried;
    /// 3. the default namespace (or no namespace), mapping to `ui.Local`.
    ///
    /// # Errors
    /// Returns `UnknownComponent` located at `location`.
    pub fn resolve(
        &self,
        tag: &QualifiedName,
        location: &Location,
    ) -> Result<Arc<ComponentType>, InflateError> {
        let unknown = || {
            InflateError::new(
                InflateErrorKind::UnknownComponent {
                    tag: tag.to_string(),
                },
                location.clone(),
            )
            .with_tag(tag.to_string())
        };

        if let Some(found) = self.lookup_custom(tag) {
            return Ok(found);
        }

        let package = match tag.namespace.as_deref() {
            None | Some(DEFAULT_NAMESPACE) => DEFAULT_PACKAGE,
            Some(namespace) => import_package(namespace).ok_or_else(unknown)?,
        };

        self.lookup_type(&format!("{package}.{}", tag.local))
            .ok_or_else(unknown)
    }

    fn lookup_custom(&self, tag: &QualifiedName) -> Option<Arc<ComponentType>> {
        self.custom
            .get(tag)
            .cloned()
            .or_else(|| self.base.and_then(|base| base.lookup_custom(tag)))
    }

    fn lookup_type(&self, name: &str) -> Option<Arc<ComponentType>> {
        self.catalog
            .get(name)
            .cloned()
            .or_else(|| self.base.and_then(|base| base.lookup_type(name)))
    }
}
