//! Parser for enumerated values.

use super::{AttributeParser, ParsedValue};
use crate::types::{Value, ValueKind};

/// Matches a raw value against the variants of an enum by name.
///
/// Matching ignores case as well as `_` and `-`, so `PRIMARY`, `primary`
/// and `Primary` all select the `primary` variant, and `read-only` matches
/// `READ_ONLY`. The canonical variant name is stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumParser;

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl AttributeParser for EnumParser {
    fn can_handle(&self, kind: &ValueKind) -> bool {
        matches!(kind, ValueKind::Enum(_))
    }

    fn parse(&self, raw: &str, kind: &ValueKind) -> Result<ParsedValue, String> {
        let ValueKind::Enum(spec) = kind else {
            return Err(format!("unsupported type {kind}"));
        };

        let wanted = normalize(raw.trim());
        spec.variants
            .iter()
            .find(|variant| normalize(variant) == wanted)
            .map(|variant| {
                ParsedValue::Ready(Value::Enum {
                    type_name: spec.name.clone(),
                    variant: variant.clone(),
                })
            })
            .ok_or_else(|| format!("expected one of: {}", spec.variants.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnumSpec;

    fn content_mode() -> ValueKind {
        ValueKind::Enum(EnumSpec::new("ContentMode", ["text", "preformatted", "html"]))
    }

    #[test]
    fn test_case_insensitive_match() {
        let expected = ParsedValue::Ready(Value::Enum {
            type_name: "ContentMode".to_string(),
            variant: "html".to_string(),
        });
        assert_eq!(EnumParser.parse("HTML", &content_mode()), Ok(expected.clone()));
        assert_eq!(EnumParser.parse(" Html ", &content_mode()), Ok(expected));
    }

    #[test]
    fn test_separator_insensitive_match() {
        let kind = ValueKind::Enum(EnumSpec::new("Mode", ["READ_ONLY", "EDITABLE"]));
        let parsed = EnumParser.parse("read-only", &kind).unwrap();
        assert_eq!(
            parsed,
            ParsedValue::Ready(Value::Enum {
                type_name: "Mode".to_string(),
                variant: "READ_ONLY".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_variant_lists_choices() {
        let err = EnumParser.parse("markdown", &content_mode()).unwrap_err();
        assert_eq!(err, "expected one of: text, preformatted, html");
    }
}
