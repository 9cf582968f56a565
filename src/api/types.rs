//! API request and response bodies.

use serde::{Deserialize, Serialize};

use crate::plan::overload::ElementStatus;
use crate::plan::{Assignment, PlanSummary, SharingMode, Warning};
use crate::topology::LineupId;

/// `?name=` query parameter.
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// `POST /api/save-config` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveRequest {
    pub name: Option<String>,
    /// Configuration blob, stored as given.
    pub data: Option<serde_json::Value>,
}

/// `POST /api/plan` body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Configuration blob in the stored format.
    pub config: serde_json::Value,
    /// Overrides `targetLoadMW` from the configuration.
    #[serde(default, rename = "targetMW")]
    pub target_mw: Option<f64>,
    /// Overrides `networkedLoadbanks` from the configuration.
    #[serde(default)]
    pub sharing_mode: Option<SharingMode>,
}

/// `POST /api/plan` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    /// Mode used for the subfeed projections.
    pub sharing_mode: SharingMode,
    /// Load per participating PDU.
    pub assignment: Assignment,
    /// Target load that could not be placed (kW).
    pub unassigned_kw: f64,
    /// Lineups filled to their effective maximum.
    pub saturated_lineups: Vec<LineupId>,
    /// Exceeded ceilings in priority order.
    pub warnings: Vec<Warning>,
    /// Elements in the elevated and high bands.
    pub advisories: Vec<ElementStatus>,
    pub summary: PlanSummary,
}

/// Success acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
