//! Inflater listeners notified when a subtree is complete.

use super::context::IdRegistry;
use super::tree::{ComponentNode, ComponentTree};
use crate::error::InflateErrorKind;
use crate::registry::Component;
use crate::types::NodeId;

/// Trait for listeners notified after each component and its full subtree
/// have been built, before the component is attached to its parent.
///
/// Listeners run synchronously in registration order. Closures of the shape
/// `Fn(&mut InflatedSubtree<'_>) -> Result<(), InflateErrorKind>` are
/// listeners too.
pub trait InflaterListener: Send + Sync {
    /// Customize a freshly built subtree.
    ///
    /// # Errors
    /// An error aborts the whole inflation.
    fn component_inflated(&self, subtree: &mut InflatedSubtree<'_>) -> Result<(), InflateErrorKind>;
}

impl<F> InflaterListener for F
where
    F: Fn(&mut InflatedSubtree<'_>) -> Result<(), InflateErrorKind> + Send + Sync,
{
    fn component_inflated(&self, subtree: &mut InflatedSubtree<'_>) -> Result<(), InflateErrorKind> {
        self(subtree)
    }
}

/// Handle to a completed subtree given to listeners.
///
/// Ids are changed through [`set_id`](Self::set_id) so that the registry
/// stays consistent with the tree.
pub struct InflatedSubtree<'a> {
    root: NodeId,
    tree: &'a mut ComponentTree,
    ids: &'a mut IdRegistry,
}

impl<'a> InflatedSubtree<'a> {
    pub(crate) fn new(root: NodeId, tree: &'a mut ComponentTree, ids: &'a mut IdRegistry) -> Self {
        Self { root, tree, ids }
    }

    /// Root of the completed subtree.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node ids of the subtree in document order.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        self.tree.descendants(self.root)
    }

    /// Get a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&ComponentNode> {
        self.tree.get(id)
    }

    /// Get a component for modification.
    pub fn component_mut(&mut self, id: NodeId) -> Option<&mut dyn Component> {
        self.tree.get_mut(id).map(ComponentNode::component_mut)
    }

    /// Markup id of a node (without prefix).
    #[must_use]
    pub fn markup_id(&self, id: NodeId) -> Option<&str> {
        let stored = self.tree.get(id)?.id()?;
        Some(self.ids.unprefixed(stored))
    }

    /// Give a node a new markup id. The prefix is applied as for ids in markup.
    ///
    /// # Errors
    /// Returns `AttributeParse` if the new id is not a valid id and
    /// `DuplicateId` if it is reserved or taken; the node keeps its old id
    /// in both cases.
    pub fn set_id(&mut self, node: NodeId, raw: &str) -> Result<(), InflateErrorKind> {
        let Some(entry) = self.tree.get(node) else {
            return Err(InflateErrorKind::Listener(format!("no node {node} in tree")));
        };
        if entry.id.as_deref() == Some(self.ids.prefixed(raw).as_str()) {
            return Ok(());
        }

        let location = entry.location.clone();
        let previous = entry.id.clone();
        self.ids.check(raw)?;
        if let Some(previous) = &previous {
            self.ids.remove(previous);
        }
        let stored = self.ids.insert(raw, node, location)?;

        tracing::debug!(node = %node, from = ?previous, to = %stored, "Listener re-keyed component");
        if let Some(entry) = self.tree.get_mut(node) {
            entry.id = Some(stored);
        }
        Ok(())
    }

    /// Read-only access to the whole tree built so far.
    #[must_use]
    pub fn tree(&self) -> &ComponentTree {
        &*self.tree
    }

    /// Read-only access to the id registry.
    #[must_use]
    pub fn ids(&self) -> &IdRegistry {
        &*self.ids
    }
}
