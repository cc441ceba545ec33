//! Parser for references to other components.

use super::{AttributeParser, ParsedValue};
use crate::config::is_valid_id;
use crate::types::ValueKind;

/// Parses `ComponentRef` values into deferred references.
///
/// The value is the referenced element's id as written in the markup
/// (without id prefix). Resolution happens after the whole document has
/// been built, so forward references are allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentRefParser;

impl AttributeParser for ComponentRefParser {
    fn can_handle(&self, kind: &ValueKind) -> bool {
        *kind == ValueKind::ComponentRef
    }

    fn parse(&self, raw: &str, _kind: &ValueKind) -> Result<ParsedValue, String> {
        let id = raw.trim();
        if !is_valid_id(id) {
            return Err("expected the id of another component".to_string());
        }
        Ok(ParsedValue::Deferred(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference() {
        assert_eq!(
            ComponentRefParser.parse(" nameField ", &ValueKind::ComponentRef),
            Ok(ParsedValue::Deferred("nameField".to_string()))
        );
    }

    #[test]
    fn test_rejects_invalid_id() {
        assert!(ComponentRefParser.parse("", &ValueKind::ComponentRef).is_err());
        assert!(ComponentRefParser.parse("two words", &ValueKind::ComponentRef).is_err());
    }
}
