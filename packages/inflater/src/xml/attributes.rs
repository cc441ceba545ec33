//! Ordered raw attribute map of a markup element.

use crate::types::QualifiedName;

/// A raw attribute name/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualifiedName,
    pub value: String,
}

/// Ordered attribute map with unique names.
///
/// Document order is preserved. Setting an existing name replaces its value
/// in place, so a map never holds the same name twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.entries.iter()
    }

    /// Get the value of an attribute.
    #[must_use]
    pub fn get(&self, name: &QualifiedName) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Get the value of an attribute without namespace.
    #[must_use]
    pub fn get_local(&self, local: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.name.is(None, local))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing the value of an existing one.
    ///
    /// Returns the previous value if the name was present.
    pub fn set(&mut self, name: QualifiedName, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.entries.push(Attribute { name, value });
                None
            }
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, name: &QualifiedName) -> Option<String> {
        let index = self.entries.iter().position(|a| &a.name == name)?;
        Some(self.entries.remove(index).value)
    }

    /// Rename an attribute, keeping its position.
    ///
    /// Returns `false` if `from` is absent or `to` is already taken.
    pub fn rename(&mut self, from: &QualifiedName, to: QualifiedName) -> bool {
        if from != &to && self.entries.iter().any(|a| a.name == to) {
            return false;
        }
        match self.entries.iter_mut().find(|a| &a.name == from) {
            Some(attribute) => {
                attribute.name = to;
                true
            }
            None => false,
        }
    }

    /// Rewrite every value in place.
    pub fn map_values(&mut self, mut f: impl FnMut(&QualifiedName, &str) -> String) {
        for attribute in &mut self.entries {
            attribute.value = f(&attribute.name, &attribute.value);
        }
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Attributes {
    type Item = Attribute;
    type IntoIter = std::vec::IntoIter<Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(QualifiedName, String)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (QualifiedName, String)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}
