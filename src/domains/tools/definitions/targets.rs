//! Target tools: name search, target masterview, and the targets of a drug
//! or an adverse event.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::common::{
    AlertFilters, page_or_default, rule_violation, rule_violation_detail, search_term,
    validate_ids,
};
use crate::domains::tools::client::{Endpoint, UpstreamQuery, UpstreamRequest};
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::handlers::ToolDefinition;
use crate::domains::tools::validation::{FieldValue, present, validate_string_enum};

// ============================================================================
// search_targets
// ============================================================================

/// Parameters for target name search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchTargetsParams {
    /// Target name, symbol or fragment to search for.
    pub target: String,
}

/// Search targets by name.
pub struct SearchTargetsTool;

impl ToolDefinition for SearchTargetsTool {
    type Params = SearchTargetsParams;

    const NAME: &'static str = "search_targets";
    const HTTP_PATH: &'static str = "/search_targets";
    const DESCRIPTION: &'static str = "Search targets (proteins, genes, target classes) by name. Returns matching targets with their identifiers (target_id). Example: {\"target\": \"hERG\"}";
    const COMBINATION_RULE: &'static str = "target (name string) is required";
    const BARE_STRING_FIELD: Option<&'static str> = Some("target");

    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest> {
        let target = search_term(&params.target, "target", 1)?;
        let mut query = UpstreamQuery::new();
        query.push("target", target);
        Ok(UpstreamRequest::new(Endpoint::TargetSearch, query))
    }
}

// ============================================================================
// get_target (masterview)
// ============================================================================

/// Parameters for the target masterview.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTargetParams {
    /// Target id (required).
    #[serde(default)]
    pub target_id: Option<FieldValue>,

    /// Action id (required).
    #[serde(default)]
    pub action_id: Option<FieldValue>,

    /// Result page (default 1).
    #[serde(default)]
    pub page: Option<FieldValue>,

    /// Restrict to adverse event id(s).
    #[serde(default)]
    pub adverse_event_id: Option<FieldValue>,

    /// Restrict to drug id(s).
    #[serde(default)]
    pub drug_id: Option<FieldValue>,

    #[serde(flatten)]
    pub filters: AlertFilters,
}

/// Masterview of a target for one mechanism of action.
pub struct GetTargetTool;

impl ToolDefinition for GetTargetTool {
    type Params = GetTargetParams;

    const NAME: &'static str = "get_target";
    const HTTP_PATH: &'static str = "/get_target";
    const DESCRIPTION: &'static str = "Get the masterview of a target for a given mechanism of action: a summary of its safety alerts grouped by adverse event and drug. Example: {\"target_id\": \"158\", \"action_id\": \"12\", \"page\": 1}";
    const COMBINATION_RULE: &'static str = "target_id, action_id and page are required (page defaults to 1)";

    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest> {
        validate_ids(&[
            ("target_id", &params.target_id),
            ("action_id", &params.action_id),
            ("adverse_event_id", &params.adverse_event_id),
            ("drug_id", &params.drug_id),
        ])?;
        params.filters.validate()?;
        let page = page_or_default(&params.page)?;

        let (target_id, action_id) = match (present(&params.target_id), present(&params.action_id))
        {
            (Some(target_id), Some(action_id)) => (target_id, action_id),
            (Some(_), None) => {
                return Err(rule_violation_detail(Self::COMBINATION_RULE, "action_id is missing"));
            }
            (None, Some(_)) => {
                return Err(rule_violation_detail(Self::COMBINATION_RULE, "target_id is missing"));
            }
            (None, None) => return Err(rule_violation(Self::COMBINATION_RULE)),
        };

        let mut query = UpstreamQuery::new();
        query
            .push("target_id", target_id)
            .push("action_id", action_id)
            .push("page", page)
            .push_opt("adverse_event_id", &params.adverse_event_id)
            .push_opt("drug_id", &params.drug_id);
        params.filters.append_to(&mut query);

        Ok(UpstreamRequest::new(Endpoint::TargetMasterview, query))
    }
}

// ============================================================================
// get_targets
// ============================================================================

/// Allowed values of `type`.
pub const TARGET_TYPE_VALUES: &[&str] = &["primary", "secondary"];

/// Parameters for listing targets of a drug or of an adverse event.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTargetsParams {
    /// Drug id; exclusive with adverse_event_id.
    #[serde(default)]
    pub drug_id: Option<FieldValue>,

    /// With drug_id: "primary" (default) or "secondary" targets.
    #[serde(default, rename = "type")]
    pub target_type: Option<FieldValue>,

    /// Adverse event id; exclusive with drug_id.
    #[serde(default)]
    pub adverse_event_id: Option<FieldValue>,
}

/// Primary or secondary targets of a drug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Primary,
    Secondary,
}

/// Decoded `get_targets` lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetsLookup {
    Drug { drug_id: FieldValue, kind: TargetKind },
    AdverseEvent { adverse_event_id: FieldValue },
}

impl TargetsLookup {
    pub fn decode(params: &GetTargetsParams) -> ToolResult<Self> {
        validate_ids(&[
            ("drug_id", &params.drug_id),
            ("adverse_event_id", &params.adverse_event_id),
        ])?;
        let target_type = present(&params.target_type);
        validate_string_enum(target_type, "type", TARGET_TYPE_VALUES)?;

        match (present(&params.drug_id), present(&params.adverse_event_id)) {
            (Some(drug_id), None) => {
                let kind = match target_type.and_then(FieldValue::as_text).map(str::trim) {
                    Some("secondary") => TargetKind::Secondary,
                    _ => TargetKind::Primary,
                };
                Ok(Self::Drug {
                    drug_id: drug_id.clone(),
                    kind,
                })
            }
            (None, Some(_)) if target_type.is_some() => Err(rule_violation_detail(
                GetTargetsTool::COMBINATION_RULE,
                "type only applies together with drug_id",
            )),
            (None, Some(adverse_event_id)) => Ok(Self::AdverseEvent {
                adverse_event_id: adverse_event_id.clone(),
            }),
            _ => Err(rule_violation(GetTargetsTool::COMBINATION_RULE)),
        }
    }
}

/// Normalize an upstream targets payload into a JSON array.
fn target_list(value: Value) -> Value {
    match value {
        Value::Array(_) => value,
        Value::Null => Value::Array(Vec::new()),
        Value::Object(mut map) => match map.remove("targets") {
            Some(Value::Array(items)) => Value::Array(items),
            Some(other) => {
                map.insert("targets".to_string(), other);
                Value::Array(vec![Value::Object(map)])
            }
            None => Value::Array(vec![Value::Object(map)]),
        },
        other => Value::Array(vec![other]),
    }
}

/// Targets of a drug (primary or secondary), or targets linked to an adverse event.
pub struct GetTargetsTool;

impl ToolDefinition for GetTargetsTool {
    type Params = GetTargetsParams;

    const NAME: &'static str = "get_targets";
    const HTTP_PATH: &'static str = "/get_targets";
    const DESCRIPTION: &'static str = "List the targets of a drug, or the targets linked to an adverse event. For a drug, type selects \"primary\" (default) or \"secondary\" targets and the result is {\"primary_targets\": [...]} or {\"secondary_targets\": [...]}; for an adverse event the result is {\"targets\": [...]}. Examples: {\"drug_id\": \"11204\"} or {\"adverse_event_id\": \"10001551\"}";
    const COMBINATION_RULE: &'static str = "exactly one of drug_id (optionally with type \"primary\" or \"secondary\", default \"primary\") or adverse_event_id";

    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest> {
        let mut query = UpstreamQuery::new();
        let endpoint = match TargetsLookup::decode(params)? {
            TargetsLookup::Drug { drug_id, kind } => {
                query.push("drug_id", drug_id);
                match kind {
                    TargetKind::Primary => Endpoint::PrimaryTargetSearch,
                    TargetKind::Secondary => Endpoint::SecondaryTargetSearch,
                }
            }
            TargetsLookup::AdverseEvent { adverse_event_id } => {
                query.push("adverse_event_id", adverse_event_id);
                Endpoint::TargetSearch
            }
        };
        Ok(UpstreamRequest::new(endpoint, query))
    }

    fn reshape(request: &UpstreamRequest, value: Value) -> Value {
        let targets = target_list(value);
        match request.endpoint {
            Endpoint::PrimaryTargetSearch => json!({ "primary_targets": targets }),
            Endpoint::SecondaryTargetSearch => json!({ "secondary_targets": targets }),
            _ => json!({ "targets": targets }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::handlers::{Handler, ToolHandler, parse_arguments};
    use crate::domains::tools::testing::MockUpstream;

    fn targets(args: Value) -> ToolResult<UpstreamRequest> {
        GetTargetsTool::build(&parse_arguments::<GetTargetsTool>(args)?)
    }

    #[test]
    fn test_search_targets() {
        let params = parse_arguments::<SearchTargetsTool>(json!("kinase")).unwrap();
        let request = SearchTargetsTool::build(&params).unwrap();
        assert_eq!(request.endpoint, Endpoint::TargetSearch);
        assert_eq!(request.query.get("target"), Some("kinase"));
    }

    #[test]
    fn test_get_target_requires_target_and_action() {
        let params = parse_arguments::<GetTargetTool>(json!({"target_id": "158"})).unwrap();
        let err = GetTargetTool::build(&params).unwrap_err();
        assert!(err.to_string().contains("action_id is missing"));

        let params =
            parse_arguments::<GetTargetTool>(json!({"target_id": "158", "action_id": "2"})).unwrap();
        let request = GetTargetTool::build(&params).unwrap();
        assert_eq!(request.endpoint, Endpoint::TargetMasterview);
        assert_eq!(request.query.keys(), vec!["target_id", "action_id", "page"]);
    }

    #[test]
    fn test_get_targets_defaults_to_primary() {
        let request = targets(json!({"drug_id": "11204"})).unwrap();
        assert_eq!(request.endpoint, Endpoint::PrimaryTargetSearch);
        assert_eq!(request.query.get("drug_id"), Some("11204"));

        let request = targets(json!({"drug_id": "11204", "type": "secondary"})).unwrap();
        assert_eq!(request.endpoint, Endpoint::SecondaryTargetSearch);
    }

    #[test]
    fn test_get_targets_rules() {
        assert!(targets(json!({})).is_err());
        assert!(targets(json!({"drug_id": "1", "adverse_event_id": "2"})).is_err());
        assert!(targets(json!({"adverse_event_id": "2", "type": "primary"})).is_err());

        let err = targets(json!({"drug_id": "1", "type": "tertiary"})).unwrap_err();
        assert!(err.to_string().contains("primary, secondary"));
    }

    #[test]
    fn test_target_list_shapes() {
        assert_eq!(target_list(json!([1, 2])), json!([1, 2]));
        assert_eq!(target_list(json!(null)), json!([]));
        assert_eq!(target_list(json!({"targets": [{"id": 3}]})), json!([{"id": 3}]));
        assert_eq!(target_list(json!({"id": 4})), json!([{"id": 4}]));
    }

    #[tokio::test]
    async fn test_drug_targets_reshaped_as_primary() {
        let mock = MockUpstream::start(200, json!([{"target_id": 158}])).await;
        let client = mock.client("tok");

        let result = Handler::<GetTargetsTool>::new()
            .call(json!({"drug_id": "11204"}), &client)
            .await
            .unwrap();

        assert_eq!(result, json!({"primary_targets": [{"target_id": 158}]}));
        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/api/target/search/primary");
        assert_eq!(calls[0].param("drug_id"), Some("11204"));
    }

    #[tokio::test]
    async fn test_adverse_event_targets_reshaped() {
        let mock = MockUpstream::start(200, json!({"targets": [{"target_id": 9}]})).await;
        let client = mock.client("tok");

        let result = Handler::<GetTargetsTool>::new()
            .call(json!({"adverse_event_id": "10001551"}), &client)
            .await
            .unwrap();

        assert_eq!(result, json!({"targets": [{"target_id": 9}]}));
        assert_eq!(mock.calls()[0].path, "/api/target/search");
    }
}
