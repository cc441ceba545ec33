//! Per-inflation state: the id registry and the inflation context.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::listener::InflaterListener;
use super::tree::ComponentTree;
use crate::config::{is_valid_id, ID_ATTRIBUTE};
use crate::error::{IdOrigin, InflateErrorKind};
use crate::parser::ParserRegistry;
use crate::registry::ComponentRegistry;
use crate::types::{Location, NodeId};

#[derive(Debug, Clone)]
struct IdEntry {
    node: NodeId,
    location: Location,
}

/// Mapping from component id to node, built during inflation.
///
/// Ids are stored with the id prefix applied. Callers that think in markup
/// ids (binders, listeners) use [`lookup`](Self::lookup) and
/// [`insert`](Self::insert), which apply the prefix themselves.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    prefix: String,
    reserved: HashSet<String>,
    entries: BTreeMap<String, IdEntry>,
}

impl IdRegistry {
    /// Create a registry.
    ///
    /// # Arguments
    /// * `prefix` - Prefix prepended to every id
    /// * `reserved` - Markup ids (without prefix) the binder already owns
    #[must_use]
    pub fn new(prefix: Option<&str>, reserved: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        let prefix = prefix.unwrap_or_default().to_string();
        let reserved = reserved
            .into_iter()
            .map(|id| format!("{prefix}{}", id.as_ref()))
            .collect();
        Self {
            prefix,
            reserved,
            entries: BTreeMap::new(),
        }
    }

    /// The id prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        (!self.prefix.is_empty()).then_some(self.prefix.as_str())
    }

    /// Apply the prefix to a markup id.
    #[must_use]
    pub fn prefixed(&self, raw: &str) -> String {
        format!("{}{raw}", self.prefix)
    }

    /// Strip the prefix from a stored id.
    #[must_use]
    pub fn unprefixed<'a>(&self, id: &'a str) -> &'a str {
        id.strip_prefix(self.prefix.as_str()).unwrap_or(id)
    }

    /// Check whether a markup id could be inserted.
    ///
    /// # Errors
    /// Returns `AttributeParse` if `raw` is not a valid id, and
    /// `DuplicateId` if the prefixed id is reserved or taken.
    pub fn check(&self, raw: &str) -> Result<String, InflateErrorKind> {
        if !is_valid_id(raw) {
            return Err(InflateErrorKind::AttributeParse {
                attribute: ID_ATTRIBUTE.to_string(),
                raw_value: raw.to_string(),
                target_type: "component id".to_string(),
                reason: "expected a letter or '_' followed by letters, digits, '_', '-' or '.'"
                    .to_string(),
            });
        }
        let id = self.prefixed(raw);
        if self.reserved.contains(&id) {
            return Err(InflateErrorKind::DuplicateId {
                id,
                first: IdOrigin::Reserved,
            });
        }
        if let Some(existing) = self.entries.get(&id) {
            return Err(InflateErrorKind::DuplicateId {
                id,
                first: IdOrigin::Declared(existing.location.clone()),
            });
        }
        Ok(id)
    }

    /// Register a markup id for a node, returning the stored (prefixed) id.
    ///
    /// # Errors
    /// Same as [`IdRegistry::check`].
    pub fn insert(&mut self, raw: &str, node: NodeId, location: Location) -> Result<String, InflateErrorKind> {
        let id = self.check(raw)?;
        self.entries.insert(id.clone(), IdEntry { node, location });
        Ok(id)
    }

    /// Remove a stored (prefixed) id.
    pub fn remove(&mut self, id: &str) -> Option<NodeId> {
        self.entries.remove(id).map(|entry| entry.node)
    }

    /// Get the node of a stored (prefixed) id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.entries.get(id).map(|entry| entry.node)
    }

    /// Get the node of a markup id, applying the prefix.
    #[must_use]
    pub fn lookup(&self, raw: &str) -> Option<NodeId> {
        self.get(&self.prefixed(raw))
    }

    /// Location of the element that declared a stored id.
    #[must_use]
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.entries.get(id).map(|entry| &entry.location)
    }

    /// Check if a stored (prefixed) id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Check if a stored (prefixed) id was reserved by the binder.
    #[must_use]
    pub fn is_reserved(&self, id: &str) -> bool {
        self.reserved.contains(id)
    }

    /// Number of registered ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no id is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate stored ids and their nodes, sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry.node))
    }

    /// Stored (prefixed) ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Reference value waiting for its target id.
#[derive(Debug, Clone)]
pub(crate) struct DeferredReference {
    pub node: NodeId,
    pub property: String,
    pub target: String,
    pub on_slot: bool,
    pub attribute: String,
    pub tag: String,
    pub location: Location,
}

/// State of one inflation call.
///
/// Created at the start of `inflate`, dropped at its end; never shared.
/// Included fragments are spliced in before building, so they share the
/// context of the including document.
pub(crate) struct InflationContext<'a> {
    pub components: &'a ComponentRegistry,
    pub parsers: &'a ParserRegistry,
    pub listeners: &'a [Arc<dyn InflaterListener>],
    pub tree: ComponentTree,
    pub ids: IdRegistry,
    pub deferred: Vec<DeferredReference>,
}

impl<'a> InflationContext<'a> {
    pub fn new(
        components: &'a ComponentRegistry,
        parsers: &'a ParserRegistry,
        listeners: &'a [Arc<dyn InflaterListener>],
        ids: IdRegistry,
    ) -> Self {
        Self {
            components,
            parsers,
            listeners,
            tree: ComponentTree::new(),
            ids,
            deferred: Vec::new(),
        }
    }
}
