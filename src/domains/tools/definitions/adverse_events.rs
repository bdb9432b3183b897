//! Adverse event tools.

use schemars::JsonSchema;
use serde::Deserialize;

use super::common::{rule_violation, search_term, validate_ids};
use crate::domains::tools::client::{Endpoint, UpstreamQuery, UpstreamRequest};
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::handlers::ToolDefinition;
use crate::domains::tools::validation::{FieldValue, present};

/// Shortest adverse event name accepted by the search.
pub const MIN_ADVERSE_EVENT_LEN: usize = 3;

/// Parameters for adverse event name search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchAdverseEventsParams {
    /// Adverse event name or fragment (at least 3 characters).
    pub adverse_event: String,
}

/// Search adverse events by name.
pub struct SearchAdverseEventsTool;

impl ToolDefinition for SearchAdverseEventsTool {
    type Params = SearchAdverseEventsParams;

    const NAME: &'static str = "search_adverse_events";
    const HTTP_PATH: &'static str = "/search_adverse_events";
    const DESCRIPTION: &'static str = "Search adverse events by name. Returns matching adverse events with their identifiers (adverse_event_id). Example: {\"adverse_event\": \"hepatotoxicity\"}";
    const COMBINATION_RULE: &'static str = "adverse_event (name string, at least 3 characters) is required";
    const BARE_STRING_FIELD: Option<&'static str> = Some("adverse_event");

    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest> {
        let term = search_term(&params.adverse_event, "adverse_event", MIN_ADVERSE_EVENT_LEN)?;
        let mut query = UpstreamQuery::new();
        query.push("adverse_event", term);
        Ok(UpstreamRequest::new(Endpoint::AdverseEventSearch, query))
    }
}

/// Parameters for listing the adverse events of a drug or a target.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetAdverseEventsParams {
    /// Drug id; exclusive with target_id.
    #[serde(default)]
    pub drug_id: Option<FieldValue>,

    /// Target id; exclusive with drug_id.
    #[serde(default)]
    pub target_id: Option<FieldValue>,
}

/// List the adverse events associated with a drug or a target.
pub struct GetAdverseEventsTool;

impl ToolDefinition for GetAdverseEventsTool {
    type Params = GetAdverseEventsParams;

    const NAME: &'static str = "get_adverse_events";
    const HTTP_PATH: &'static str = "/get_adverse_events";
    const DESCRIPTION: &'static str = "List the adverse events associated with a drug or with a target. Example: {\"drug_id\": \"99402\"}";
    const COMBINATION_RULE: &'static str = "exactly one of drug_id or target_id";

    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest> {
        validate_ids(&[("drug_id", &params.drug_id), ("target_id", &params.target_id)])?;

        let mut query = UpstreamQuery::new();
        match (present(&params.drug_id), present(&params.target_id)) {
            (Some(drug_id), None) => query.push("drug_id", drug_id),
            (None, Some(target_id)) => query.push("target_id", target_id),
            _ => return Err(rule_violation(Self::COMBINATION_RULE)),
        };

        Ok(UpstreamRequest::new(Endpoint::AdverseEventSearch, query))
    }
}
