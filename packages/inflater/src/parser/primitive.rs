//! Parser for booleans, numbers and text.

use super::{AttributeParser, ParsedValue};
use crate::types::{Value, ValueKind};

/// Parses `Bool`, `Integer`, `Float` and `Text` values.
///
/// Booleans accept `true` and `false` in any case. Numbers are trimmed
/// before parsing; text is taken verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveParser;

impl AttributeParser for PrimitiveParser {
    fn can_handle(&self, kind: &ValueKind) -> bool {
        matches!(
            kind,
            ValueKind::Bool | ValueKind::Integer | ValueKind::Float | ValueKind::Text
        )
    }

    fn parse(&self, raw: &str, kind: &ValueKind) -> Result<ParsedValue, String> {
        let value = match kind {
            ValueKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err("expected 'true' or 'false'".to_string()),
            },
            ValueKind::Integer => Value::Integer(raw.trim().parse::<i64>().map_err(|e| e.to_string())?),
            ValueKind::Float => {
                let value = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
                if !value.is_finite() {
                    return Err("expected a finite number".to_string());
                }
                Value::Float(value)
            }
            ValueKind::Text => Value::Text(raw.to_string()),
            other => return Err(format!("unsupported type {other}")),
        };
        Ok(ParsedValue::Ready(value))
    }
}
