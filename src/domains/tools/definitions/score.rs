//! Safety score of a drug, or of a target/action pair.

use schemars::JsonSchema;
use serde::Deserialize;

use super::common::{rule_violation_detail, validate_ids};
use crate::domains::tools::client::{Endpoint, UpstreamQuery, UpstreamRequest};
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::handlers::ToolDefinition;
use crate::domains::tools::validation::{FieldValue, present};

/// Parameters for score lookup.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetScoreParams {
    /// Drug id; cannot be combined with target_id or action_id.
    #[serde(default)]
    pub drug_id: Option<FieldValue>,

    /// Target id; requires action_id.
    #[serde(default)]
    pub target_id: Option<FieldValue>,

    /// Action id; requires target_id.
    #[serde(default)]
    pub action_id: Option<FieldValue>,

    /// Restrict the score to adverse event id(s).
    #[serde(default)]
    pub adverse_event_id: Option<FieldValue>,
}

/// What the score is computed for.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreSubject {
    Drug {
        drug_id: FieldValue,
    },
    TargetAction {
        target_id: FieldValue,
        action_id: FieldValue,
    },
}

impl ScoreSubject {
    pub fn decode(params: &GetScoreParams) -> ToolResult<Self> {
        let violation = |detail: &str| rule_violation_detail(GetScoreTool::COMBINATION_RULE, detail);

        match (
            present(&params.drug_id),
            present(&params.target_id),
            present(&params.action_id),
        ) {
            (Some(drug_id), None, None) => Ok(Self::Drug {
                drug_id: drug_id.clone(),
            }),
            (None, Some(target_id), Some(action_id)) => Ok(Self::TargetAction {
                target_id: target_id.clone(),
                action_id: action_id.clone(),
            }),
            (Some(_), Some(_), _) => Err(violation("drug_id cannot be combined with target_id")),
            (Some(_), None, Some(_)) => Err(violation("drug_id cannot be combined with action_id")),
            (None, Some(_), None) => Err(violation("target_id requires action_id")),
            (None, None, Some(_)) => Err(violation("action_id requires target_id")),
            (None, None, None) => Err(violation("no drug_id or target_id given")),
        }
    }
}

/// Drug-score branch.
fn drug_score_request(drug_id: &FieldValue, adverse_event_id: &Option<FieldValue>) -> UpstreamRequest {
    let mut query = UpstreamQuery::new();
    query
        .push("drug_id", drug_id)
        .push_opt("adverse_event_id", adverse_event_id);
    UpstreamRequest::new(Endpoint::DrugScore, query)
}

/// Target-score branch.
fn target_score_request(
    target_id: &FieldValue,
    action_id: &FieldValue,
    adverse_event_id: &Option<FieldValue>,
) -> UpstreamRequest {
    let mut query = UpstreamQuery::new();
    query
        .push("target_id", target_id)
        .push("action_id", action_id)
        .push_opt("adverse_event_id", adverse_event_id);
    UpstreamRequest::new(Endpoint::TargetScore, query)
}

/// Evidence-strength score for a drug or for a target/action pair.
pub struct GetScoreTool;

impl ToolDefinition for GetScoreTool {
    type Params = GetScoreParams;

    const NAME: &'static str = "get_score";
    const HTTP_PATH: &'static str = "/get_score";
    const DESCRIPTION: &'static str = "Get the safety score summarising the strength of evidence linking a drug, or a target with a given mechanism of action, to adverse events. Optionally restrict it to adverse_event_id. Examples: {\"drug_id\": \"99402\"} or {\"target_id\": \"158\", \"action_id\": \"12\"}";
    const COMBINATION_RULE: &'static str = "drug_id alone, or target_id together with action_id; adverse_event_id is optional in both cases";

    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest> {
        validate_ids(&[
            ("drug_id", &params.drug_id),
            ("target_id", &params.target_id),
            ("action_id", &params.action_id),
            ("adverse_event_id", &params.adverse_event_id),
        ])?;

        Ok(match ScoreSubject::decode(params)? {
            ScoreSubject::Drug { drug_id } => drug_score_request(&drug_id, &params.adverse_event_id),
            ScoreSubject::TargetAction {
                target_id,
                action_id,
            } => target_score_request(&target_id, &action_id, &params.adverse_event_id),
        })
    }
}
