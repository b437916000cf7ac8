use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::{DataSummary, Proposal},
    error::ShapeError,
};

pub const ANALYZE_PATH: &str = "api/analyze";
pub const GENERATE_PATH: &str = "api/generate";
pub const HEALTH_PATH: &str = "health";

/// Successful `/api/analyze` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub data_summary: DataSummary,
    pub proposals: Vec<Proposal>,
}

impl AnalyzeResponse {
    pub fn validate(&self) -> Result<(), ShapeError> {
        for (index, proposal) in self.proposals.iter().enumerate() {
            if proposal.chart_type.trim().is_empty() {
                return Err(ShapeError::malformed(format!(
                    "proposal {index} has an empty chart_type"
                )));
            }
            if proposal.title.trim().is_empty() {
                return Err(ShapeError::malformed(format!(
                    "proposal {index} has an empty title"
                )));
            }
        }
        Ok(())
    }
}

/// `/api/generate` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub proposal: Proposal,
    pub csv_data: String,
}

/// Plotly figure as produced by `fig.to_json()` on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotlyFigure {
    pub data: Value,
    #[serde(default)]
    pub layout: Value,
}

impl PlotlyFigure {
    pub fn traces(&self) -> &[Value] {
        self.data.as_array().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn layout_object(&self) -> Option<&Map<String, Value>> {
        self.layout.as_object()
    }
}

/// Successful `/api/generate` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResult {
    pub plotly_json: PlotlyFigure,
    pub code: String,
}

impl GenerateResult {
    pub fn validate(&self) -> Result<(), ShapeError> {
        if !self.plotly_json.data.is_array() {
            return Err(ShapeError::malformed("plotly_json.data must be an array"));
        }
        if !(self.plotly_json.layout.is_null() || self.plotly_json.layout.is_object()) {
            return Err(ShapeError::malformed("plotly_json.layout must be an object"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
