//! Field-level parameter validation.
//!
//! Tool arguments arrive as loosely typed JSON. Identifier fields accept a
//! number, a single integer-like string or a comma-separated list of them;
//! enum fields accept a fixed set of literals. The validators here check one
//! field at a time and never touch the network.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{ToolError, ToolResult};

/// A scalar argument value: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Whether the value carries content. Empty strings count as absent.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// The value exactly as supplied, without trimming.
    pub fn verbatim(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Number(_) => None,
        }
    }
}

/// Renders identifier, enum and page values; surrounding whitespace is dropped.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s.trim()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// Returns the field only when it is present and non-empty.
pub fn present(value: &Option<FieldValue>) -> Option<&FieldValue> {
    value.as_ref().filter(|v| !v.is_empty())
}

/// Check that `text` is `\d+(,\d+)*`.
pub fn is_comma_separated_numbers(text: &str) -> bool {
    !text.is_empty()
        && text
            .split(',')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// Validate an identifier field: a number, or digits optionally separated by commas.
pub fn validate_comma_separated_numbers(
    value: Option<&FieldValue>,
    field: &str,
) -> ToolResult<()> {
    match value {
        None | Some(FieldValue::Number(_)) => Ok(()),
        Some(FieldValue::Text(text)) if is_comma_separated_numbers(text.trim()) => Ok(()),
        Some(FieldValue::Text(text)) => Err(ToolError::invalid_arguments(format!(
            "{} must be a number or a comma-separated list of numbers (e.g. \"1\" or \"1,2,3\"), got \"{}\"",
            field, text
        ))),
    }
}

/// Validate an enum field against its allowed literals.
pub fn validate_string_enum(
    value: Option<&FieldValue>,
    field: &str,
    allowed: &[&str],
) -> ToolResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    match value.as_text() {
        Some(text) if allowed.contains(&text.trim()) => Ok(()),
        _ => Err(ToolError::invalid_arguments(format!(
            "{} must be one of: {}, got \"{}\"",
            field,
            allowed.join(", "),
            value
        ))),
    }
}

/// Validate a field that must be a JSON number.
pub fn validate_number(value: Option<&FieldValue>, field: &str) -> ToolResult<()> {
    match value {
        None | Some(FieldValue::Number(_)) => Ok(()),
        Some(other) => Err(ToolError::invalid_arguments(format!(
            "{} must be a number, got \"{}\"",
            field, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::from(s)
    }

    #[test]
    fn test_comma_separated_accepts_lists() {
        for ok in ["1", "1,2", "10,20,30", "007"] {
            assert!(
                validate_comma_separated_numbers(Some(&text(ok)), "alert_type").is_ok(),
                "{ok} should pass"
            );
        }
        assert!(validate_comma_separated_numbers(Some(&FieldValue::from(42u64)), "id").is_ok());
        assert!(validate_comma_separated_numbers(None, "id").is_ok());
    }

    #[test]
    fn test_comma_separated_rejects_malformed() {
        for bad in ["12a", "1,,2", "-1", "1,", ",1", "1 2", "1.5", "abc"] {
            let err = validate_comma_separated_numbers(Some(&text(bad)), "alert_phase")
                .expect_err(bad);
            let msg = err.to_string();
            assert!(msg.contains("alert_phase"), "{msg}");
            assert!(msg.contains("comma-separated"), "{msg}");
        }
    }

    #[test]
    fn test_string_enum() {
        let allowed = ["yes", "no"];
        assert!(validate_string_enum(Some(&text("yes")), "alert_severity", &allowed).is_ok());
        assert!(validate_string_enum(None, "alert_severity", &allowed).is_ok());

        let err = validate_string_enum(Some(&text("maybe")), "alert_severity", &allowed)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("alert_severity"));
        assert!(msg.contains("yes, no"));

        assert!(validate_string_enum(Some(&FieldValue::from(1u64)), "order_by_date", &["asc"]).is_err());
    }

    #[test]
    fn test_number() {
        assert!(validate_number(Some(&FieldValue::from(2u64)), "page").is_ok());
        assert!(validate_number(None, "page").is_ok());
        assert!(validate_number(Some(&text("2")), "page").is_err());
    }

    #[test]
    fn test_field_value_deserializes_numbers_and_strings() {
        let n: FieldValue = serde_json::from_str("11204").unwrap();
        assert!(n.is_number());
        assert_eq!(n.to_string(), "11204");

        let s: FieldValue = serde_json::from_str("\"1,2\"").unwrap();
        assert_eq!(s.as_text(), Some("1,2"));
    }

    #[test]
    fn test_present_skips_empty_strings() {
        assert!(present(&Some(text("  "))).is_none());
        assert!(present(&None).is_none());
        assert!(present(&Some(text("5"))).is_some());
    }
}
