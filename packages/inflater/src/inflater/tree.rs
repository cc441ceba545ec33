//! Arena-backed component tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::registry::{Component, ComponentType};
use crate::types::{Location, NodeId, QualifiedName, Value};

/// A live component and its place in the tree.
#[derive(Debug)]
pub struct ComponentNode {
    pub(crate) component: Box<dyn Component>,
    pub(crate) component_type: Arc<ComponentType>,
    pub(crate) tag: QualifiedName,
    pub(crate) id: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) slot: BTreeMap<String, Value>,
    pub(crate) location: Location,
}

impl ComponentNode {
    /// The component instance.
    #[must_use]
    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    /// The component instance, mutably.
    pub fn component_mut(&mut self) -> &mut dyn Component {
        self.component.as_mut()
    }

    /// Resolved component type.
    #[must_use]
    pub fn component_type(&self) -> &ComponentType {
        &self.component_type
    }

    /// Tag of the element the node was built from.
    #[must_use]
    pub fn tag(&self) -> &QualifiedName {
        &self.tag
    }

    /// Assigned id, including the id prefix.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Values the node set on its slot in the parent (`p:` attributes).
    #[must_use]
    pub fn slot(&self) -> &BTreeMap<String, Value> {
        &self.slot
    }

    /// Source location of the element.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }
}

/// Arena of component nodes.
///
/// Ownership flows from the arena; parent links are plain ids used for
/// navigation only. Dropping the tree drops every component.
#[derive(Debug, Default)]
pub struct ComponentTree {
    nodes: Vec<ComponentNode>,
}

impl ComponentTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ComponentNode> {
        self.nodes.get(id.0)
    }

    /// Get a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ComponentNode> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn insert(&mut self, node: ComponentNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Link a detached child under `parent`, after its existing children.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child.0) {
            debug_assert!(node.parent.is_none(), "node attached twice");
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
    }

    /// Node ids of a subtree in document order (pre-order), starting at `root`.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                order.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Structural snapshot of a subtree.
    ///
    /// Snapshots compare equal for trees built from equal documents with
    /// equal configuration, and serialize to a readable dump.
    #[must_use]
    pub fn snapshot(&self, root: NodeId) -> Option<NodeSnapshot> {
        let node = self.get(root)?;
        Some(NodeSnapshot {
            tag: node.tag.to_string(),
            component_type: node.component_type.name().to_string(),
            id: node.id.clone(),
            properties: node
                .component
                .properties()
                .into_iter()
                .map(|(name, value)| (name.to_string(), self.snapshot_value(value)))
                .collect(),
            slot: node
                .slot
                .iter()
                .map(|(name, value)| (name.clone(), self.snapshot_value(value)))
                .collect(),
            children: node
                .children
                .iter()
                .filter_map(|&child| self.snapshot(child))
                .collect(),
        })
    }

    /// Replace node references by the referenced node's id for snapshots.
    fn snapshot_value(&self, value: &Value) -> Value {
        match value {
            Value::Component(target) => match self.get(*target).and_then(|n| n.id.clone()) {
                Some(id) => Value::Text(format!("#{id}")),
                None => value.clone(),
            },
            other => other.clone(),
        }
    }
}

/// Serializable view of a subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub tag: String,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub slot: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Widget;

    fn node(tree: &mut ComponentTree, name: &str, id: Option<&str>) -> NodeId {
        let component_type = Arc::new(ComponentType::new(format!("ui.{name}")));
        tree.insert(ComponentNode {
            component: Box::new(Widget::new(component_type.name())),
            component_type,
            tag: QualifiedName::local(name),
            id: id.map(String::from),
            parent: None,
            children: Vec::new(),
            slot: BTreeMap::new(),
            location: Location::new("test.xml", 1, 1),
        })
    }

    #[test]
    fn test_attach_links_both_directions() {
        let mut tree = ComponentTree::new();
        let root = node(&mut tree, "VerticalLayout", None);
        let child = node(&mut tree, "Button", Some("ok"));
        tree.attach(root, child);

        assert_eq!(tree.get(child).unwrap().parent(), Some(root));
        assert_eq!(tree.get(root).unwrap().children(), &[child]);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let mut tree = ComponentTree::new();
        let root = node(&mut tree, "VerticalLayout", None);
        let a = node(&mut tree, "HorizontalLayout", None);
        let a1 = node(&mut tree, "Button", None);
        let b = node(&mut tree, "Label", None);
        tree.attach(a, a1);
        tree.attach(root, a);
        tree.attach(root, b);

        assert_eq!(tree.descendants(root), vec![root, a, a1, b]);
    }

    #[test]
    fn test_snapshot_renders_references_by_id() {
        let mut tree = ComponentTree::new();
        let root = node(&mut tree, "VerticalLayout", None);
        let label = node(&mut tree, "Label", None);
        let field = node(&mut tree, "TextField", Some("name"));
        tree.attach(root, label);
        tree.attach(root, field);
        tree.get_mut(label)
            .unwrap()
            .component_mut()
            .set_property("for", Value::Component(field))
            .unwrap();

        let snapshot = tree.snapshot(root).unwrap();
        assert_eq!(snapshot.children.len(), 2);
        assert_eq!(
            snapshot.children[0].properties.get("for"),
            Some(&Value::Text("#name".to_string()))
        );
        assert_eq!(snapshot.children[1].id.as_deref(), Some("name"));
    }
}
