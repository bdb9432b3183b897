//! Alert listing for a drug or a target.

use schemars::JsonSchema;
use serde::Deserialize;

use super::common::{
    AlertFilters, ORDER_VALUES, page_or_default, rule_violation, validate_ids,
};
use crate::domains::tools::client::{Endpoint, UpstreamQuery, UpstreamRequest};
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::handlers::ToolDefinition;
use crate::domains::tools::validation::{FieldValue, present, validate_string_enum};

/// Parameters for alert listing.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetAlertsParams {
    /// Drug id; exclusive with target_id.
    #[serde(default)]
    pub drug_id: Option<FieldValue>,

    /// Target id; exclusive with drug_id.
    #[serde(default)]
    pub target_id: Option<FieldValue>,

    /// Result page (default 1).
    #[serde(default)]
    pub page: Option<FieldValue>,

    /// Restrict to adverse event id(s).
    #[serde(default)]
    pub adverse_event_id: Option<FieldValue>,

    /// Restrict to action id(s).
    #[serde(default)]
    pub action_id: Option<FieldValue>,

    /// Species in which the alert was observed.
    #[serde(default)]
    pub alert_species: Option<FieldValue>,

    /// Causality assessment of the alert.
    #[serde(default)]
    pub alert_causality: Option<FieldValue>,

    /// Earliest alert date (YYYY-MM-DD).
    #[serde(default)]
    pub alert_date_from: Option<FieldValue>,

    /// Latest alert date (YYYY-MM-DD).
    #[serde(default)]
    pub alert_date_to: Option<FieldValue>,

    /// Sort by alert date: "asc" or "desc".
    #[serde(default)]
    pub order_by_date: Option<FieldValue>,

    #[serde(flatten)]
    pub filters: AlertFilters,
}

/// Whose alerts are listed.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertsSubject {
    Drug(FieldValue),
    Target(FieldValue),
}

impl AlertsSubject {
    pub fn decode(params: &GetAlertsParams) -> ToolResult<Self> {
        match (present(&params.drug_id), present(&params.target_id)) {
            (Some(drug_id), None) => Ok(Self::Drug(drug_id.clone())),
            (None, Some(target_id)) => Ok(Self::Target(target_id.clone())),
            _ => Err(rule_violation(GetAlertsTool::COMBINATION_RULE)),
        }
    }

    fn endpoint(&self) -> Endpoint {
        match self {
            Self::Drug(_) => Endpoint::DrugAlerts,
            Self::Target(_) => Endpoint::TargetAlerts,
        }
    }
}

/// List the safety alerts recorded for a drug or a target.
pub struct GetAlertsTool;

impl ToolDefinition for GetAlertsTool {
    type Params = GetAlertsParams;

    const NAME: &'static str = "get_alerts";
    const HTTP_PATH: &'static str = "/get_alerts";
    const DESCRIPTION: &'static str = "List the safety alerts recorded for a drug or for a target. Each alert links the drug or target to an adverse event with phase, severity, level of evidence, source type, species, causality and dates. Id filters accept a comma-separated list (\"1,2\"); alert_severity is \"yes\" or \"no\"; order_by_date and order_by_adv are \"asc\" or \"desc\". Example: {\"drug_id\": \"99402\", \"page\": 1, \"alert_phase\": \"1,2\"}";
    const COMBINATION_RULE: &'static str = "exactly one of drug_id or target_id; page defaults to 1";

    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest> {
        validate_ids(&[
            ("drug_id", &params.drug_id),
            ("target_id", &params.target_id),
            ("adverse_event_id", &params.adverse_event_id),
            ("action_id", &params.action_id),
        ])?;
        validate_string_enum(present(&params.order_by_date), "order_by_date", ORDER_VALUES)?;
        params.filters.validate()?;
        let page = page_or_default(&params.page)?;

        let subject = AlertsSubject::decode(params)?;

        let mut query = UpstreamQuery::new();
        match &subject {
            AlertsSubject::Drug(drug_id) => query.push("drug_id", drug_id),
            AlertsSubject::Target(target_id) => query.push("target_id", target_id),
        };
        query
            .push("page", page)
            .push_opt("adverse_event_id", &params.adverse_event_id)
            .push_opt("action_id", &params.action_id)
            .push_verbatim_opt("alert_species", &params.alert_species)
            .push_verbatim_opt("alert_causality", &params.alert_causality)
            .push_verbatim_opt("alert_date_from", &params.alert_date_from)
            .push_verbatim_opt("alert_date_to", &params.alert_date_to)
            .push_opt("order_by_date", &params.order_by_date);
        params.filters.append_to(&mut query);

        Ok(UpstreamRequest::new(subject.endpoint(), query))
    }
}
