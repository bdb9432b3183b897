//! Helpers shared by the tool definitions.
//!
//! Paging defaults, the alert filter block reused by the alert and
//! masterview tools, and small validation shorthands.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::tools::client::UpstreamQuery;
use crate::domains::tools::error::{ToolError, ToolResult};
use crate::domains::tools::validation::{
    FieldValue, present, validate_comma_separated_numbers, validate_number,
    validate_string_enum,
};

/// Page requested when the caller does not supply one.
pub const DEFAULT_PAGE: u64 = 1;

/// Allowed values of `alert_severity`.
pub const SEVERITY_VALUES: &[&str] = &["yes", "no"];

/// Allowed values of `order_by_date` and `order_by_adv`.
pub const ORDER_VALUES: &[&str] = &["asc", "desc"];

/// Validate each named field as a number or comma-separated number list.
pub fn validate_ids(fields: &[(&str, &Option<FieldValue>)]) -> ToolResult<()> {
    for (name, value) in fields {
        validate_comma_separated_numbers(present(value), name)?;
    }
    Ok(())
}

/// Validated page number, defaulting to [`DEFAULT_PAGE`].
pub fn page_or_default(value: &Option<FieldValue>) -> ToolResult<FieldValue> {
    let value = present(value);
    validate_number(value, "page")?;
    Ok(value.cloned().unwrap_or_else(|| FieldValue::from(DEFAULT_PAGE)))
}

/// Trimmed free-text search term; rejects blank input.
pub fn search_term(value: &str, field: &str, min_len: usize) -> ToolResult<String> {
    let term = value.trim();
    if term.is_empty() {
        return Err(ToolError::invalid_arguments(format!("{} must not be empty", field)));
    }
    if term.chars().count() < min_len {
        return Err(ToolError::invalid_arguments(format!(
            "{} must be at least {} characters long",
            field, min_len
        )));
    }
    Ok(term.to_string())
}

/// Combination rule violation.
pub fn rule_violation(rule: &str) -> ToolError {
    ToolError::invalid_arguments(format!("invalid parameter combination: {}", rule))
}

/// Combination rule violation with the specific conflict spelled out.
pub fn rule_violation_detail(rule: &str, detail: &str) -> ToolError {
    ToolError::invalid_arguments(format!(
        "invalid parameter combination: {} ({})",
        detail, rule
    ))
}

/// Alert filters accepted by the alert and masterview tools.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AlertFilters {
    /// Reference source type id(s), e.g. "1" or "1,2".
    #[serde(default)]
    pub ref_source_type: Option<FieldValue>,

    /// Alert type id(s).
    #[serde(default)]
    pub alert_type: Option<FieldValue>,

    /// Development phase id(s) in which the alert was observed.
    #[serde(default)]
    pub alert_phase: Option<FieldValue>,

    /// Level of evidence id(s).
    #[serde(default)]
    pub alert_level_evidence: Option<FieldValue>,

    /// On-target / off-target id(s).
    #[serde(default)]
    pub alert_onoff_target: Option<FieldValue>,

    /// Only severe alerts ("yes") or only non-severe ones ("no").
    #[serde(default)]
    pub alert_severity: Option<FieldValue>,

    /// Sort by adverse event name: "asc" or "desc".
    #[serde(default)]
    pub order_by_adv: Option<FieldValue>,
}

impl AlertFilters {
    pub fn validate(&self) -> ToolResult<()> {
        validate_ids(&[
            ("ref_source_type", &self.ref_source_type),
            ("alert_type", &self.alert_type),
            ("alert_phase", &self.alert_phase),
            ("alert_level_evidence", &self.alert_level_evidence),
            ("alert_onoff_target", &self.alert_onoff_target),
        ])?;
        validate_string_enum(present(&self.alert_severity), "alert_severity", SEVERITY_VALUES)?;
        validate_string_enum(present(&self.order_by_adv), "order_by_adv", ORDER_VALUES)
    }

    pub fn append_to(&self, query: &mut UpstreamQuery) {
        query
            .push_opt("ref_source_type", &self.ref_source_type)
            .push_opt("alert_type", &self.alert_type)
            .push_opt("alert_phase", &self.alert_phase)
            .push_opt("alert_level_evidence", &self.alert_level_evidence)
            .push_opt("alert_onoff_target", &self.alert_onoff_target)
            .push_opt("alert_severity", &self.alert_severity)
            .push_opt("order_by_adv", &self.order_by_adv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_to_one() {
        assert_eq!(page_or_default(&None).unwrap().to_string(), "1");
        assert_eq!(
            page_or_default(&Some(FieldValue::from(""))).unwrap().to_string(),
            "1"
        );
        assert_eq!(
            page_or_default(&Some(FieldValue::from(3u64))).unwrap().to_string(),
            "3"
        );
        assert!(page_or_default(&Some(FieldValue::from("two"))).is_err());
    }

    #[test]
    fn test_search_term() {
        assert_eq!(search_term("  aspirin ", "drug", 1).unwrap(), "aspirin");
        assert!(search_term("   ", "drug", 1).is_err());
        let err = search_term("ab", "adverse_event", 3).unwrap_err();
        assert!(err.to_string().contains("at least 3"));
    }

    #[test]
    fn test_alert_filters_validate_and_append() {
        let filters = AlertFilters {
            alert_phase: Some(FieldValue::from("1,2")),
            alert_severity: Some(FieldValue::from("yes")),
            order_by_adv: Some(FieldValue::from("desc")),
            ..Default::default()
        };
        filters.validate().unwrap();

        let mut query = UpstreamQuery::new();
        filters.append_to(&mut query);
        assert_eq!(query.keys(), vec!["alert_phase", "alert_severity", "order_by_adv"]);
    }

    #[test]
    fn test_alert_filters_reject_bad_enum_and_list() {
        let filters = AlertFilters {
            alert_severity: Some(FieldValue::from("high")),
            ..Default::default()
        };
        assert!(filters.validate().unwrap_err().to_string().contains("alert_severity"));

        let filters = AlertFilters {
            alert_type: Some(FieldValue::from("1,,2")),
            ..Default::default()
        };
        assert!(filters.validate().unwrap_err().to_string().contains("alert_type"));
    }
}
