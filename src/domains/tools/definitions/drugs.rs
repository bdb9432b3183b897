//! Drug tools: name search, drug lookup by target or adverse event, and the
//! drug masterview.

use schemars::JsonSchema;
use serde::Deserialize;

use super::common::{AlertFilters, page_or_default, rule_violation, search_term, validate_ids};
use crate::domains::tools::client::{Endpoint, UpstreamQuery, UpstreamRequest};
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::handlers::ToolDefinition;
use crate::domains::tools::validation::{FieldValue, present};

// ============================================================================
// search_drugs_by_name
// ============================================================================

/// Parameters for drug name search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchDrugsParams {
    /// Drug name, or part of it, to search for.
    pub drug: String,
}

/// Search drugs by name.
pub struct SearchDrugsTool;

impl ToolDefinition for SearchDrugsTool {
    type Params = SearchDrugsParams;

    const NAME: &'static str = "search_drugs_by_name";
    const HTTP_PATH: &'static str = "/search_drugs";
    const DESCRIPTION: &'static str = "Search drugs by name. Returns matching drugs with their identifiers (drug_id), which the other drug tools take as input. Example: {\"drug\": \"aspirin\"}";
    const COMBINATION_RULE: &'static str = "drug (name string) is required";
    const BARE_STRING_FIELD: Option<&'static str> = Some("drug");

    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest> {
        let drug = search_term(&params.drug, "drug", 1)?;
        let mut query = UpstreamQuery::new();
        query.push("drug", drug);
        Ok(UpstreamRequest::new(Endpoint::DrugSearch, query))
    }
}

// ============================================================================
// get_drugs
// ============================================================================

/// Parameters for looking up drugs by target/action or by adverse event.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetDrugsParams {
    /// Target id(s); requires action_id.
    #[serde(default)]
    pub target_id: Option<FieldValue>,

    /// Action id(s); requires target_id.
    #[serde(default)]
    pub action_id: Option<FieldValue>,

    /// Adverse event id(s); cannot be combined with target_id/action_id.
    #[serde(default)]
    pub adverse_event_id: Option<FieldValue>,

    /// Result page (default 1).
    #[serde(default)]
    pub page: Option<FieldValue>,
}

/// Decoded `get_drugs` lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum DrugsLookup {
    ByTargetAction {
        target_id: FieldValue,
        action_id: FieldValue,
    },
    ByAdverseEvent {
        adverse_event_id: FieldValue,
    },
}

impl DrugsLookup {
    pub fn decode(params: &GetDrugsParams) -> ToolResult<Self> {
        validate_ids(&[
            ("target_id", &params.target_id),
            ("action_id", &params.action_id),
            ("adverse_event_id", &params.adverse_event_id),
        ])?;

        match (
            present(&params.target_id),
            present(&params.action_id),
            present(&params.adverse_event_id),
        ) {
            (Some(target_id), Some(action_id), None) => Ok(Self::ByTargetAction {
                target_id: target_id.clone(),
                action_id: action_id.clone(),
            }),
            (None, None, Some(adverse_event_id)) => Ok(Self::ByAdverseEvent {
                adverse_event_id: adverse_event_id.clone(),
            }),
            _ => Err(rule_violation(GetDrugsTool::COMBINATION_RULE)),
        }
    }
}

/// Find drugs acting on a target, or drugs associated with an adverse event.
pub struct GetDrugsTool;

impl ToolDefinition for GetDrugsTool {
    type Params = GetDrugsParams;

    const NAME: &'static str = "get_drugs";
    const HTTP_PATH: &'static str = "/get_drugs";
    const DESCRIPTION: &'static str = "List drugs either by target and mechanism of action, or by adverse event. Identifiers accept a number, a numeric string, or a comma-separated list such as \"1,2,3\". Examples: {\"target_id\": \"123\", \"action_id\": \"456\"} or {\"adverse_event_id\": \"10001551\"}";
    const COMBINATION_RULE: &'static str = "provide both target_id and action_id (without adverse_event_id), or adverse_event_id alone; page defaults to 1";

    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest> {
        let lookup = DrugsLookup::decode(params)?;
        let page = page_or_default(&params.page)?;

        let mut query = UpstreamQuery::new();
        match &lookup {
            DrugsLookup::ByTargetAction {
                target_id,
                action_id,
            } => {
                query.push("target_id", target_id).push("action_id", action_id);
            }
            DrugsLookup::ByAdverseEvent { adverse_event_id } => {
                query.push("adverse_event_id", adverse_event_id);
            }
        }
        query.push("page", page);

        Ok(UpstreamRequest::new(Endpoint::DrugSearch, query))
    }
}

// ============================================================================
// get_drug (masterview)
// ============================================================================

/// Parameters for the drug masterview.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetDrugParams {
    /// Drug id (required).
    #[serde(default)]
    pub drug_id: Option<FieldValue>,

    /// Result page (default 1).
    #[serde(default)]
    pub page: Option<FieldValue>,

    /// Restrict to adverse event id(s).
    #[serde(default)]
    pub adverse_event_id: Option<FieldValue>,

    /// Restrict to target id(s).
    #[serde(default)]
    pub target_id: Option<FieldValue>,

    /// Restrict to action id(s).
    #[serde(default)]
    pub action_id: Option<FieldValue>,

    #[serde(flatten)]
    pub filters: AlertFilters,
}

/// Masterview of a single drug.
pub struct GetDrugTool;

impl ToolDefinition for GetDrugTool {
    type Params = GetDrugParams;

    const NAME: &'static str = "get_drug";
    const HTTP_PATH: &'static str = "/get_drug";
    const DESCRIPTION: &'static str = "Get the masterview of a drug: a summary of its safety alerts grouped by adverse event, target and action. Optional filters narrow the alerts taken into account. Example: {\"drug_id\": \"99402\", \"page\": 1}";
    const COMBINATION_RULE: &'static str = "drug_id and page are required (page defaults to 1)";

    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest> {
        validate_ids(&[
            ("drug_id", &params.drug_id),
            ("adverse_event_id", &params.adverse_event_id),
            ("target_id", &params.target_id),
            ("action_id", &params.action_id),
        ])?;
        params.filters.validate()?;
        let page = page_or_default(&params.page)?;

        let drug_id =
            present(&params.drug_id).ok_or_else(|| rule_violation(Self::COMBINATION_RULE))?;

        let mut query = UpstreamQuery::new();
        query
            .push("drug_id", drug_id)
            .push("page", page)
            .push_opt("adverse_event_id", &params.adverse_event_id)
            .push_opt("target_id", &params.target_id)
            .push_opt("action_id", &params.action_id);
        params.filters.append_to(&mut query);

        Ok(UpstreamRequest::new(Endpoint::DrugMasterview, query))
    }
}
