//! Parser for the host library's native value types.

use std::sync::LazyLock;

use regex::Regex;

use super::{AttributeParser, ParsedValue};
use crate::types::{
    Alignment, Color, HorizontalAlignment, Size, SizeUnit, Value, ValueKind, VerticalAlignment,
};

/// Size pattern: optional sign, number, optional CSS unit.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+(?:\.\d+)?|-?\.\d+)\s*(px|%|em|rem|ex|pt|pc|cm|mm|in)?$")
        .expect("valid regex")
});

/// Functional color pattern: `rgb(r, g, b)`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static RGB_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$").expect("valid regex")
});

/// Parses `Size`, `Alignment` and `Color` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidgetValueParser;

impl AttributeParser for WidgetValueParser {
    fn can_handle(&self, kind: &ValueKind) -> bool {
        matches!(kind, ValueKind::Size | ValueKind::Alignment | ValueKind::Color)
    }

    fn parse(&self, raw: &str, kind: &ValueKind) -> Result<ParsedValue, String> {
        let value = match kind {
            ValueKind::Size => Value::Size(parse_size(raw)?),
            ValueKind::Alignment => Value::Alignment(parse_alignment(raw)?),
            ValueKind::Color => Value::Color(parse_color(raw)?),
            other => return Err(format!("unsupported type {other}")),
        };
        Ok(ParsedValue::Ready(value))
    }
}

/// Parse a size such as `100px`, `50%`, `12.5em` or `auto`.
///
/// A unitless number is in pixels. `auto`, an empty value and any negative
/// number mean the size is undefined.
pub fn parse_size(raw: &str) -> Result<Size, String> {
    let trimmed = raw.trim().to_ascii_lowercase();
    if trimmed.is_empty() || trimmed == "auto" {
        return Ok(Size::Undefined);
    }

    let caps = SIZE_PATTERN
        .captures(&trimmed)
        .ok_or_else(|| "expected a number with optional unit, or 'auto'".to_string())?;
    let value: f32 = caps[1].parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if !value.is_finite() {
        return Err("size is out of range".to_string());
    }
    if value < 0.0 {
        return Ok(Size::Undefined);
    }
    let suffix = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let unit = SizeUnit::from_suffix(suffix).ok_or_else(|| format!("unknown unit '{suffix}'"))?;

    Ok(Size::Fixed { value, unit })
}

/// Parse an alignment such as `TOP_LEFT`, `middle center` or `bottom-right`.
///
/// The vertical and horizontal parts may come in either order.
pub fn parse_alignment(raw: &str) -> Result<Alignment, String> {
    let lower = raw.trim().to_ascii_lowercase();
    let parts: Vec<&str> = lower
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    let mut vertical = None;
    let mut horizontal = None;
    for part in &parts {
        match *part {
            "top" => vertical = Some(VerticalAlignment::Top),
            "middle" => vertical = Some(VerticalAlignment::Middle),
            "bottom" => vertical = Some(VerticalAlignment::Bottom),
            "left" => horizontal = Some(HorizontalAlignment::Left),
            "center" => horizontal = Some(HorizontalAlignment::Center),
            "right" => horizontal = Some(HorizontalAlignment::Right),
            other => return Err(format!("unknown alignment part '{other}'")),
        }
    }

    match (parts.len(), vertical, horizontal) {
        (2, Some(vertical), Some(horizontal)) => Ok(Alignment {
            vertical,
            horizontal,
        }),
        _ => Err("expected a vertical and a horizontal part, e.g. TOP_LEFT".to_string()),
    }
}

/// Parse a color such as `#f00`, `#ff0000` or `rgb(255, 0, 0)`.
pub fn parse_color(raw: &str) -> Result<Color, String> {
    let trimmed = raw.trim();

    if let Some(hex) = trimmed.strip_prefix('#') {
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err("expected #rgb or #rrggbb".to_string()),
        };
        let channel = |index: usize| {
            expanded
                .get(index..index + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex color '{trimmed}'"))
        };
        return Ok(Color {
            red: channel(0)?,
            green: channel(2)?,
            blue: channel(4)?,
        });
    }

    let caps = RGB_PATTERN
        .captures(trimmed)
        .ok_or_else(|| "expected #rrggbb or rgb(r, g, b)".to_string())?;
    let channel = |index: usize| {
        caps[index]
            .parse::<u8>()
            .map_err(|_| format!("color channel '{}' out of range 0-255", &caps[index]))
    };
    Ok(Color {
        red: channel(1)?,
        green: channel(2)?,
        blue: channel(3)?,
    })
}
