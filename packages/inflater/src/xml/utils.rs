//! XML utility functions for navigating roxmltree documents.

use roxmltree::{Document, Node};

use crate::types::{Location, QualifiedName};

/// Get the namespace-qualified name of an element.
///
/// The prefix is looked up from the in-scope namespace declarations so that
/// diagnostics show the name as written in the document.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use layout_inflater::xml::qualified_name;
///
/// let xml = r#"<v:Panel xmlns:v="urn:import:ui"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// let name = qualified_name(doc.root_element());
/// assert_eq!(name.namespace.as_deref(), Some("urn:import:ui"));
/// assert_eq!(name.local, "Panel");
/// assert_eq!(name.to_string(), "v:Panel");
/// ```
pub fn qualified_name(node: Node<'_, '_>) -> QualifiedName {
    let tag = node.tag_name();
    match tag.namespace() {
        Some(namespace) => QualifiedName::namespaced(namespace, tag.name())
            .with_prefix(node.lookup_prefix(namespace).filter(|p| !p.is_empty())),
        None => QualifiedName::local(tag.name()),
    }
}

/// Get the qualified name of one of an element's attributes.
pub fn attribute_name(node: Node<'_, '_>, attribute: &roxmltree::Attribute<'_, '_>) -> QualifiedName {
    match attribute.namespace() {
        Some(namespace) => QualifiedName::namespaced(namespace, attribute.name())
            .with_prefix(node.lookup_prefix(namespace).filter(|p| !p.is_empty())),
        None => QualifiedName::local(attribute.name()),
    }
}

/// Compute the source location of a node.
///
/// # Arguments
/// * `doc` - Document the node belongs to
/// * `node` - The node
/// * `source` - Document name used in diagnostics
/// * `path` - Element path of the node
pub fn location_of(doc: &Document<'_>, node: Node<'_, '_>, source: &str, path: &str) -> Location {
    let pos = doc.text_pos_at(node.range().start);
    Location::new(source, pos.row, pos.col).with_path(path)
}

/// Get all element children of a node.
///
/// # Returns
/// Iterator over element children (excludes text nodes, comments, etc.)
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Get the non-whitespace text directly inside an element, if any.
pub fn direct_text(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_qualified_name_without_namespace() {
        let doc = Document::parse("<Button/>").unwrap();
        let name = qualified_name(doc.root_element());
        assert_eq!(name, QualifiedName::local("Button"));
        assert_eq!(name.prefix, None);
    }

    #[test]
    fn test_qualified_name_default_namespace() {
        let doc = Document::parse(r#"<Button xmlns="urn:import:ui"/>"#).unwrap();
        let name = qualified_name(doc.root_element());
        assert_eq!(name.namespace.as_deref(), Some("urn:import:ui"));
        assert_eq!(name.to_string(), "Button");
    }

    #[test]
    fn test_attribute_name_with_prefix() {
        let doc =
            Document::parse(r#"<Button xmlns:p="urn:inflater:parent" p:expandRatio="1"/>"#).unwrap();
        let node = doc.root_element();
        let attribute = node.attributes().next().unwrap();

        let name = attribute_name(node, &attribute);
        assert!(name.is(Some("urn:inflater:parent"), "expandRatio"));
        assert_eq!(name.to_string(), "p:expandRatio");
    }

    #[test]
    fn test_location_of() {
        let xml = "<VerticalLayout>\n    <Button/>\n</VerticalLayout>";
        let doc = Document::parse(xml).unwrap();
        let button = element_children(doc.root_element()).next().unwrap();

        let location = location_of(&doc, button, "main.xml", "/VerticalLayout/Button[1]");
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 5);
        assert_eq!(location.path, "/VerticalLayout/Button[1]");
    }

    #[test]
    fn test_element_children() {
        let doc = Document::parse("<root>text<child1/><!-- c --><child2/></root>").unwrap();
        assert_eq!(element_children(doc.root_element()).count(), 2);
    }

    #[test]
    fn test_direct_text() {
        let doc = Document::parse("<root>  hello <child/> world </root>").unwrap();
        assert_eq!(direct_text(doc.root_element()).as_deref(), Some("hello  world"));

        let doc = Document::parse("<root>\n  <child/>\n</root>").unwrap();
        assert_eq!(direct_text(doc.root_element()), None);
    }
}
