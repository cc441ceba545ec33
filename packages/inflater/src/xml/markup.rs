//! Owned markup model built from a parsed XML document.

use regex::Regex;
use roxmltree::{Document, Node};

use super::attributes::Attributes;
use super::utils::{attribute_name, direct_text, element_children, location_of, qualified_name};
use crate::config::MAX_ELEMENT_DEPTH;
use crate::error::{InflateError, InflateErrorKind};
use crate::types::{Location, QualifiedName};

/// One element of a layout document.
///
/// Immutable once parsed; include resolution and filtering produce new
/// elements instead of editing existing ones.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupElement {
    pub name: QualifiedName,
    pub attributes: Attributes,
    pub children: Vec<MarkupElement>,
    pub location: Location,
}

impl MarkupElement {
    /// Total number of elements in this subtree, including itself.
    #[must_use]
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(Self::element_count).sum::<usize>()
    }

    /// Visit this element and all descendants in document order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a MarkupElement)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Parse a layout document.
///
/// # Arguments
/// * `source` - Document name used in locations (file name or label)
/// * `text` - The XML text
///
/// # Errors
/// Malformed XML (including duplicate attributes) fails with
/// `InflateErrorKind::Markup`. An element using an undeclared namespace
/// prefix fails with `InflateErrorKind::UnknownComponent`. Nesting deeper
/// than `MAX_ELEMENT_DEPTH` fails with `InflateErrorKind::NestingTooDeep`.
pub fn parse_markup(source: &str, text: &str) -> Result<MarkupElement, InflateError> {
    check_depth(source, text)?;
    let doc = Document::parse(text).map_err(|err| markup_error(source, text, err))?;
    let root = doc.root_element();
    let path = format!("/{}", root.tag_name().name());
    Ok(convert(&doc, root, source, path))
}

fn convert(doc: &Document<'_>, node: Node<'_, '_>, source: &str, path: String) -> MarkupElement {
    let name = qualified_name(node);
    let location = location_of(doc, node, source, &path);

    if let Some(text) = direct_text(node) {
        tracing::warn!(element = %name, location = %location, text = %text, "Ignoring text content");
    }

    let attributes = node
        .attributes()
        .map(|attribute| (attribute_name(node, &attribute), attribute.value().to_string()))
        .collect();

    let children = element_children(node)
        .enumerate()
        .map(|(index, child)| {
            let child_path = format!("{path}/{}[{}]", child.tag_name().name(), index + 1);
            convert(doc, child, source, child_path)
        })
        .collect();

    MarkupElement {
        name,
        attributes,
        children,
        location,
    }
}

/// Map a roxmltree error to a located inflation error.
fn markup_error(source: &str, text: &str, err: roxmltree::Error) -> InflateError {
    let pos = err.pos();
    let location = Location::new(source, pos.row, pos.col);

    if let roxmltree::Error::UnknownNamespace(prefix, _) = &err {
        if let Some(tag) = find_prefixed_tag(text, prefix, pos.row) {
            return InflateError::new(InflateErrorKind::UnknownComponent { tag: tag.clone() }, location)
                .with_tag(tag);
        }
    }

    InflateError::new(InflateErrorKind::Markup(err), location)
}

/// Reject documents nested deeper than `MAX_ELEMENT_DEPTH` before handing
/// them to roxmltree, which recurses per level.
///
/// Only tags are counted. Anything the scan cannot make sense of is left for
/// the XML parser to report.
fn check_depth(source: &str, text: &str) -> Result<(), InflateError> {
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(found) = text[pos..].find('<') {
        let start = pos + found;
        let tail = &text[start..];
        let len = if tail.starts_with("<!--") {
            tail.find("-->").map(|end| end + 3)
        } else if tail.starts_with("<![CDATA[") {
            tail.find("]]>").map(|end| end + 3)
        } else if tail.starts_with("<?") {
            tail.find("?>").map(|end| end + 2)
        } else {
            tag_end(tail)
        };
        let Some(len) = len else {
            return Ok(());
        };

        let tag = &tail[..len];
        if tag.starts_with("</") {
            depth = depth.saturating_sub(1);
        } else if !tag.starts_with("<!") && !tag.starts_with("<?") && !tag.ends_with("/>") {
            depth += 1;
            if depth > MAX_ELEMENT_DEPTH {
                let name: String = tag[1..]
                    .chars()
                    .take_while(|c| !c.is_whitespace() && *c != '>' && *c != '/')
                    .collect();
                return Err(InflateError::new(
                    InflateErrorKind::NestingTooDeep {
                        limit: MAX_ELEMENT_DEPTH,
                    },
                    position_of(source, text, start),
                )
                .with_tag(name));
            }
        }
        pos = start + len;
    }

    Ok(())
}

/// Length of the tag at the start of `tail`, up to and including the `>`
/// that is not inside a quoted attribute value.
fn tag_end(tail: &str) -> Option<usize> {
    let mut quote = None;
    for (index, c) in tail.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, '>') => return Some(index + 1),
            _ => {}
        }
    }
    None
}

/// Line and column of a byte offset.
fn position_of(source: &str, text: &str, offset: usize) -> Location {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    Location::new(
        source,
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(column).unwrap_or(u32::MAX),
    )
}

/// Find `<prefix:Name` at or after the given line.
fn find_prefixed_tag(text: &str, prefix: &str, row: u32) -> Option<String> {
    let pattern = Regex::new(&format!(r"<{}:([\w.-]+)", regex::escape(prefix))).ok()?;
    let offset: usize = text
        .split_inclusive('\n')
        .take(row.saturating_sub(1) as usize)
        .map(str::len)
        .sum();
    let found = pattern.captures(text.get(offset..)?)?;
    Some(format!("{prefix}:{}", found.get(1)?.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order_and_locations() {
        let xml = r#"<VerticalLayout id="main">
    <Button id="ok" caption="OK"/>
    <Button id="cancel" caption="Cancel"/>
</VerticalLayout>"#;
        let root = parse_markup("main.xml", xml).unwrap();

        assert_eq!(root.name.local, "VerticalLayout");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].attributes.get_local("id"), Some("ok"));
        assert_eq!(root.children[1].attributes.get_local("id"), Some("cancel"));
        assert_eq!(root.children[1].location.line, 3);
        assert_eq!(root.children[1].location.path, "/VerticalLayout/Button[2]");
        assert_eq!(root.element_count(), 3);
    }

    #[test]
    fn test_parse_attribute_order() {
        let root = parse_markup("a.xml", r#"<Button z="1" a="2" m="3"/>"#).unwrap();
        let names: Vec<_> = root.attributes.iter().map(|a| a.name.local.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_duplicate_attribute_is_markup_error() {
        let err = parse_markup("a.xml", r#"<Button caption="a" caption="b"/>"#).unwrap_err();
        assert!(matches!(err.kind(), InflateErrorKind::Markup(_)));
        assert_eq!(err.location().line, 1);
    }

    #[test]
    fn test_undeclared_prefix_is_unknown_component() {
        let xml = "<VerticalLayout>\n  <bogus:Widget/>\n</VerticalLayout>";
        let err = parse_markup("a.xml", xml).unwrap_err();

        match err.kind() {
            InflateErrorKind::UnknownComponent { tag } => assert_eq!(tag, "bogus:Widget"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.location().line, 2);
    }

    fn nested(depth: usize) -> String {
        let mut xml = String::new();
        for _ in 0..depth {
            xml.push_str("<Panel>\n");
        }
        for _ in 0..depth {
            xml.push_str("</Panel>\n");
        }
        xml
    }

    #[test]
    fn test_nesting_limit() {
        let root = parse_markup("a.xml", &nested(MAX_ELEMENT_DEPTH)).unwrap();
        assert_eq!(root.element_count(), MAX_ELEMENT_DEPTH);

        let err = parse_markup("deep.xml", &nested(1500)).unwrap_err();
        match err.kind() {
            InflateErrorKind::NestingTooDeep { limit } => assert_eq!(*limit, MAX_ELEMENT_DEPTH),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.location().source, "deep.xml");
        assert_eq!(err.location().line, MAX_ELEMENT_DEPTH as u32 + 1);
        assert_eq!(err.location().column, 1);
        assert_eq!(err.tag(), Some("Panel"));
    }

    #[test]
    fn test_nesting_scan_skips_comments_and_self_closing_tags() {
        let xml = r#"<VerticalLayout>
    <!-- <Panel><Panel> -->
    <Button caption="a > b" description='c > d' id="ok"/>
</VerticalLayout>"#;
        assert!(check_depth("a.xml", xml).is_ok());
        let root = parse_markup("a.xml", xml).unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_walk_visits_in_document_order() {
        let xml = "<A><B><C/></B><D/></A>";
        let root = parse_markup("a.xml", xml).unwrap();

        let mut names = Vec::new();
        root.walk(&mut |element| names.push(element.name.local.clone()));
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }
}
