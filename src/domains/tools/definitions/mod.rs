//! Tool definitions module.
//!
//! This module exports all available tool definitions, grouped by the
//! upstream entity they query.

pub mod adverse_events;
pub mod alerts;
pub mod common;
pub mod drugs;
pub mod score;
pub mod targets;

pub use adverse_events::{GetAdverseEventsTool, SearchAdverseEventsTool};
pub use alerts::GetAlertsTool;
pub use drugs::{GetDrugTool, GetDrugsTool, SearchDrugsTool};
pub use score::GetScoreTool;
pub use targets::{GetTargetTool, GetTargetsTool, SearchTargetsTool};
