//! Layout inflater that turns markup into a component tree.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::sync::Arc;

use super::context::{DeferredReference, IdRegistry, InflationContext};
use super::include::{FragmentLoader, IncludeResolver};
use super::listener::{InflatedSubtree, InflaterListener};
use super::tree::ComponentNode;
use super::Layout;
use crate::config::{
    validate_id_prefix, ID_ATTRIBUTE, INLINE_SOURCE, MAX_INCLUDE_DEPTH, PARENT_NAMESPACE,
};
use crate::error::{IdOrigin, InflateError, InflateErrorKind, Result};
use crate::filter::{AttributeFilter, FilterChain};
use crate::parser::{AttributeParser, ParsedValue, ParserRegistry};
use crate::registry::{default_library, ComponentRegistry, ComponentType, PropertySpec};
use crate::types::{Location, NodeId, QualifiedName, Value};
use crate::xml::{parse_markup, Attribute, MarkupElement};

/// Engine that inflates layout documents.
///
/// The inflater is configured once and then only read: `inflate` takes
/// `&self` and keeps all per-call state in its own context, so one
/// inflater can serve many documents, also from several threads.
pub struct LayoutInflater {
    components: ComponentRegistry,
    filters: FilterChain,
    parsers: ParserRegistry,
    listeners: Vec<Arc<dyn InflaterListener>>,
    id_prefix: Option<String>,
    loader: Option<Arc<dyn FragmentLoader>>,
    max_include_depth: usize,
}

impl Default for LayoutInflater {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutInflater {
    /// Create an inflater backed by the built-in component library.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(ComponentRegistry::layered_on(default_library()))
    }

    /// Create an inflater with the given component registry.
    #[must_use]
    pub fn with_registry(components: ComponentRegistry) -> Self {
        Self {
            components,
            filters: FilterChain::new(),
            parsers: ParserRegistry::new(),
            listeners: Vec::new(),
            id_prefix: None,
            loader: None,
            max_include_depth: MAX_INCLUDE_DEPTH,
        }
    }

    /// Prepend `prefix` to every id the layout declares. An empty prefix
    /// clears it.
    ///
    /// # Errors
    /// Returns `InvalidIdPrefix` if the prefix contains characters not
    /// allowed in ids.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            self.id_prefix = None;
        } else {
            validate_id_prefix(&prefix)?;
            self.id_prefix = Some(prefix);
        }
        Ok(self)
    }

    /// Append an attribute filter.
    #[must_use]
    pub fn with_attribute_filter(mut self, filter: impl AttributeFilter + 'static) -> Self {
        self.filters.push(filter);
        self
    }

    /// Append a shared attribute filter.
    #[must_use]
    pub fn with_shared_attribute_filter(mut self, filter: Arc<dyn AttributeFilter>) -> Self {
        self.filters.push_shared(filter);
        self
    }

    /// Add an attribute parser consulted before the built-in parsers.
    #[must_use]
    pub fn with_attribute_parser(mut self, parser: impl AttributeParser + 'static) -> Self {
        self.parsers.register(parser);
        self
    }

    /// Add a shared attribute parser consulted before the built-in parsers.
    #[must_use]
    pub fn with_shared_attribute_parser(mut self, parser: Arc<dyn AttributeParser>) -> Self {
        self.parsers.register_shared(parser);
        self
    }

    /// Append a listener.
    #[must_use]
    pub fn with_listener(mut self, listener: impl InflaterListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Append a shared listener.
    #[must_use]
    pub fn with_shared_listener(mut self, listener: Arc<dyn InflaterListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Set the loader for `<in:include>` fragments.
    #[must_use]
    pub fn with_fragment_loader(mut self, loader: impl FragmentLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Set a shared loader for `<in:include>` fragments.
    #[must_use]
    pub fn with_shared_fragment_loader(mut self, loader: Arc<dyn FragmentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Register a custom component type for an exact tag.
    #[must_use]
    pub fn with_component(mut self, tag: QualifiedName, component_type: ComponentType) -> Self {
        self.components.register(tag, component_type);
        self
    }

    /// Add a component type to the catalog, reachable through its
    /// `urn:import:<package>` namespace.
    #[must_use]
    pub fn with_component_type(mut self, component_type: ComponentType) -> Self {
        self.components.register_type(component_type);
        self
    }

    /// Limit how deeply includes may nest.
    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// The component registry.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// The configured id prefix.
    #[must_use]
    pub fn id_prefix(&self) -> Option<&str> {
        self.id_prefix.as_deref()
    }

    /// Inflate markup that has no source name and no reserved ids.
    ///
    /// # Errors
    /// Returns the first failure of the inflation; no partial tree is
    /// returned.
    pub fn inflate(&self, xml: &str) -> std::result::Result<Layout, InflateError> {
        self.inflate_source(INLINE_SOURCE, xml, &HashSet::new())
    }

    /// Inflate a document.
    ///
    /// # Arguments
    /// * `source` - Document name used in error locations and include chains
    /// * `xml` - The markup
    /// * `reserved` - Ids (without prefix) already owned by the binder
    ///
    /// # Errors
    /// Returns the first failure of the inflation; no partial tree is
    /// returned.
    pub fn inflate_source(
        &self,
        source: &str,
        xml: &str,
        reserved: &HashSet<String>,
    ) -> std::result::Result<Layout, InflateError> {
        let root = parse_markup(source, xml)?;
        let root = IncludeResolver::new(self.loader.as_deref(), self.max_include_depth, source)
            .expand(root)?;
        let root = self.filters.apply_tree(root);

        let ids = IdRegistry::new(self.id_prefix.as_deref(), reserved);
        check_ids(&root, &ids)?;

        let mut context = InflationContext::new(&self.components, &self.parsers, &self.listeners, ids);
        let root_node = context.build(&root, None)?;
        context.resolve_deferred()?;

        tracing::debug!(
            source,
            components = context.tree.len(),
            ids = context.ids.len(),
            "Inflated layout"
        );
        Ok(Layout::new(context.tree, root_node, context.ids))
    }

    /// Read a document from `reader` and inflate it.
    ///
    /// # Errors
    /// Returns `Io` if reading fails and `Inflate` if inflation fails.
    pub fn inflate_reader(
        &self,
        source: &str,
        mut reader: impl Read,
        reserved: &HashSet<String>,
    ) -> Result<Layout> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        Ok(self.inflate_source(source, &xml, reserved)?)
    }
}

impl std::fmt::Debug for LayoutInflater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutInflater")
            .field("components", &self.components)
            .field("filters", &self.filters)
            .field("parsers", &self.parsers)
            .field("listeners", &self.listeners.len())
            .field("id_prefix", &self.id_prefix)
            .field("fragment_loader", &self.loader.is_some())
            .field("max_include_depth", &self.max_include_depth)
            .finish()
    }
}

/// Check every declared id against the reserved ids and the other
/// declarations, before any component is constructed.
fn check_ids(root: &MarkupElement, ids: &IdRegistry) -> std::result::Result<(), InflateError> {
    let id_attribute = QualifiedName::local(ID_ATTRIBUTE);
    let mut seen: HashMap<String, &Location> = HashMap::new();
    let mut result: std::result::Result<(), InflateError> = Ok(());

    root.walk(&mut |element| {
        if result.is_err() {
            return;
        }
        let Some(raw) = element.attributes.get(&id_attribute) else {
            return;
        };
        let fail = |kind: InflateErrorKind| {
            Err(InflateError::new(kind, element.location.clone()).with_tag(element.name.to_string()))
        };
        match ids.check(raw) {
            Err(kind) => result = fail(kind),
            Ok(id) => {
                if let Some(first) = seen.get(&id) {
                    result = fail(InflateErrorKind::DuplicateId {
                        id,
                        first: IdOrigin::Declared((*first).clone()),
                    });
                } else {
                    seen.insert(id, &element.location);
                }
            }
        }
    });

    result
}

/// Attribute sorted into its destination.
struct Assignment<'e> {
    spec: PropertySpec,
    attribute: &'e Attribute,
    on_slot: bool,
}

impl InflationContext<'_> {
    /// Build the component for `element` and its subtree.
    ///
    /// Returns the detached subtree root; the caller attaches it.
    fn build(
        &mut self,
        element: &MarkupElement,
        parent_type: Option<&ComponentType>,
    ) -> std::result::Result<NodeId, InflateError> {
        let tag = element.name.to_string();
        let fail = |kind: InflateErrorKind| {
            InflateError::new(kind, element.location.clone()).with_tag(tag.clone())
        };

        let component_type = self.components.resolve(&element.name, &element.location)?;
        let (id, assignments) =
            sort_attributes(element, &component_type, parent_type).map_err(fail)?;

        // Parse everything before constructing anything.
        let mut parsed = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let name = assignment.attribute.name.to_string();
            let value = self
                .parsers
                .parse(&name, &assignment.attribute.value, &assignment.spec.kind)
                .map_err(fail)?;
            parsed.push((assignment, value));
        }

        let instantiation = |reason: String| InflateErrorKind::Instantiation {
            component: component_type.name().to_string(),
            reason,
        };
        let mut component = component_type
            .instantiate()
            .map_err(|reason| fail(instantiation(reason)))?;
        for spec in component_type.properties() {
            if let Some(default) = &spec.default {
                component
                    .set_property(&spec.name, default.clone())
                    .map_err(|reason| fail(instantiation(format!("property '{}': {reason}", spec.name))))?;
            }
        }

        let node = self.tree.insert(ComponentNode {
            component,
            component_type: Arc::clone(&component_type),
            tag: element.name.clone(),
            id: None,
            parent: None,
            children: Vec::new(),
            slot: BTreeMap::new(),
            location: element.location.clone(),
        });

        for (assignment, value) in parsed {
            match value {
                ParsedValue::Ready(value) => {
                    self.assign(node, &assignment.spec.name, value, assignment.on_slot)
                        .map_err(|reason| {
                            fail(instantiation(format!("property '{}': {reason}", assignment.spec.name)))
                        })?;
                }
                ParsedValue::Deferred(target) => self.deferred.push(DeferredReference {
                    node,
                    property: assignment.spec.name,
                    target,
                    on_slot: assignment.on_slot,
                    attribute: assignment.attribute.name.to_string(),
                    tag: tag.clone(),
                    location: element.location.clone(),
                }),
            }
        }

        if let Some(raw) = id {
            let stored = self
                .ids
                .insert(raw, node, element.location.clone())
                .map_err(fail)?;
            if let Some(entry) = self.tree.get_mut(node) {
                entry.id = Some(stored);
            }
        }

        for child in &element.children {
            let existing = self.tree.get(node).map_or(0, |n| n.children.len());
            component_type.child_policy().accept(existing).map_err(|reason| {
                InflateError::new(
                    InflateErrorKind::InvalidChild {
                        parent: tag.clone(),
                        child: child.name.to_string(),
                        reason,
                    },
                    child.location.clone(),
                )
                .with_tag(child.name.to_string())
            })?;
            let child_node = self.build(child, Some(&component_type))?;
            self.tree.attach(node, child_node);
        }

        let listeners = self.listeners;
        for listener in listeners {
            let mut subtree = InflatedSubtree::new(node, &mut self.tree, &mut self.ids);
            listener.component_inflated(&mut subtree).map_err(fail)?;
        }

        tracing::debug!(
            tag = %tag,
            component = component_type.name(),
            node = %node,
            id = ?self.tree.get(node).and_then(ComponentNode::id),
            "Inflated component"
        );
        Ok(node)
    }

    /// Store a value on the component or on its parent slot.
    fn assign(
        &mut self,
        node: NodeId,
        property: &str,
        value: Value,
        on_slot: bool,
    ) -> std::result::Result<(), String> {
        let Some(entry) = self.tree.get_mut(node) else {
            return Err(format!("no node {node} in tree"));
        };
        if on_slot {
            entry.slot.insert(property.to_string(), value);
            Ok(())
        } else {
            entry.component.set_property(property, value)
        }
    }

    /// Point every component reference at its target, now that all ids are known.
    fn resolve_deferred(&mut self) -> std::result::Result<(), InflateError> {
        for reference in std::mem::take(&mut self.deferred) {
            let fail = |kind: InflateErrorKind| {
                InflateError::new(kind, reference.location.clone()).with_tag(reference.tag.clone())
            };
            let target = self.ids.lookup(&reference.target).ok_or_else(|| {
                fail(InflateErrorKind::UnresolvedReference {
                    attribute: reference.attribute.clone(),
                    target: reference.target.clone(),
                })
            })?;

            self.assign(
                reference.node,
                &reference.property,
                Value::Component(target),
                reference.on_slot,
            )
            .map_err(|reason| {
                let component = self
                    .tree
                    .get(reference.node)
                    .map(|n| n.component_type.name().to_string())
                    .unwrap_or_default();
                fail(InflateErrorKind::Instantiation {
                    component,
                    reason: format!("property '{}': {reason}", reference.property),
                })
            })?;
            tracing::trace!(
                attribute = %reference.attribute,
                target = %reference.target,
                node = %target,
                "Resolved component reference"
            );
        }
        Ok(())
    }
}

/// Split an element's attributes into its id and property assignments.
///
/// Plain attributes are looked up in the component's property table,
/// `urn:inflater:parent` attributes in the parent's slot table.
fn sort_attributes<'e>(
    element: &'e MarkupElement,
    component_type: &ComponentType,
    parent_type: Option<&ComponentType>,
) -> std::result::Result<(Option<&'e str>, Vec<Assignment<'e>>), InflateErrorKind> {
    let mut id = None;
    let mut assignments = Vec::with_capacity(element.attributes.len());

    for attribute in &element.attributes {
        let name = &attribute.name;
        let (spec, on_slot, owner) = match name.namespace.as_deref() {
            None if name.local == ID_ATTRIBUTE => {
                id = Some(attribute.value.as_str());
                continue;
            }
            None => (component_type.property(&name.local), false, component_type.name()),
            Some(PARENT_NAMESPACE) => match parent_type {
                Some(parent) => (parent.slot_property(&name.local), true, parent.name()),
                None => (None, true, "the document root"),
            },
            Some(_) => (None, false, component_type.name()),
        };

        let Some(spec) = spec else {
            return Err(InflateErrorKind::UnknownAttribute {
                attribute: name.to_string(),
                component: owner.to_string(),
            });
        };
        assignments.push(Assignment {
            spec: spec.clone(),
            attribute,
            on_slot,
        });
    }

    Ok((id, assignments))
}
