//! Tree builder turning markup into live component trees.
//!
//! [`LayoutInflater`] drives one inflation: it parses the document, splices
//! in included fragments, runs the attribute filters, checks ids, builds
//! components depth-first and finally resolves component references.

mod context;
mod engine;
mod include;
mod listener;
mod tree;

pub use context::IdRegistry;
pub use engine::LayoutInflater;
pub use include::{FragmentLoader, FsFragmentLoader, MemoryFragmentLoader};
pub use listener::{InflatedSubtree, InflaterListener};
pub use tree::{ComponentNode, ComponentTree, NodeSnapshot};

use crate::registry::Component;
use crate::types::NodeId;

/// Result of a successful inflation: the component tree and its ids.
#[derive(Debug)]
pub struct Layout {
    tree: ComponentTree,
    root: NodeId,
    ids: IdRegistry,
}

impl Layout {
    pub(crate) fn new(tree: ComponentTree, root: NodeId, ids: IdRegistry) -> Self {
        Self { tree, root, ids }
    }

    /// Root component of the layout.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The component tree.
    #[must_use]
    pub fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    /// The component tree, mutably.
    pub fn tree_mut(&mut self) -> &mut ComponentTree {
        &mut self.tree
    }

    /// Ids declared by the layout, stored with the id prefix.
    #[must_use]
    pub fn ids(&self) -> &IdRegistry {
        &self.ids
    }

    /// Node with the given markup id (the prefix is applied).
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&ComponentNode> {
        self.tree.get(self.ids.lookup(id)?)
    }

    /// Component with the given markup id (the prefix is applied).
    #[must_use]
    pub fn component(&self, id: &str) -> Option<&dyn Component> {
        self.node(id).map(ComponentNode::component)
    }

    /// Component with the given markup id, mutably.
    pub fn component_mut(&mut self, id: &str) -> Option<&mut dyn Component> {
        let node = self.ids.lookup(id)?;
        self.tree.get_mut(node).map(ComponentNode::component_mut)
    }

    /// Structural snapshot of the whole layout.
    #[must_use]
    pub fn snapshot(&self) -> NodeSnapshot {
        self.tree.snapshot(self.root).unwrap_or_default()
    }

    /// Split the layout into its tree, root and id registry.
    #[must_use]
    pub fn into_parts(self) -> (ComponentTree, NodeId, IdRegistry) {
        (self.tree, self.root, self.ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn test_layout_lookup_by_markup_id() {
        let mut layout = LayoutInflater::new()
            .with_id_prefix("x-")
            .unwrap()
            .inflate(r#"<VerticalLayout><Button id="ok" caption="OK"/></VerticalLayout>"#)
            .unwrap();

        assert_eq!(layout.node("ok").unwrap().id(), Some("x-ok"));
        assert!(layout.node("x-ok").is_none());

        layout
            .component_mut("ok")
            .unwrap()
            .set_property("caption", Value::Text("Save".to_string()))
            .unwrap();
        assert_eq!(
            layout.component("ok").unwrap().property("caption"),
            Some(&Value::Text("Save".to_string()))
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let layout = LayoutInflater::new()
            .inflate(r#"<VerticalLayout><Button id="ok" caption="OK"/></VerticalLayout>"#)
            .unwrap();

        let yaml = serde_yaml_ng::to_string(&layout.snapshot()).unwrap();
        assert!(yaml.contains("type: ui.VerticalLayout"));
        assert!(yaml.contains("caption: OK"));
        assert!(yaml.contains("id: ok"));
    }

    #[test]
    fn test_into_parts() {
        let layout = LayoutInflater::new().inflate("<Label/>").unwrap();
        let (tree, root, ids) = layout.into_parts();
        assert_eq!(tree.len(), 1);
        assert_eq!(root, NodeId(0));
        assert!(ids.is_empty());
    }
}
