use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chart suggestion returned by the analysis endpoint.
///
/// Fields the client does not model are kept in `extra` so the proposal can be
/// posted back to the generation endpoint exactly as it was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub chart_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Proposal {
    pub fn best_practices(&self) -> Option<&str> {
        self.extra
            .get("best_practices")
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    pub fn variables(&self) -> &[String] {
        self.variables.as_deref().unwrap_or_default()
    }

    pub fn justification(&self) -> &str {
        self.justification.as_deref().unwrap_or_default()
    }

    pub fn variables_label(&self) -> String {
        self.variables().join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSummary {
    #[serde(default)]
    pub insights: String,
    #[serde(default)]
    pub relevant_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_approach: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub column_types: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const EMPTY_INSIGHTS_PLACEHOLDER: &str = "No insight available.";

impl DataSummary {
    pub fn insights_or_placeholder(&self) -> &str {
        if self.insights.trim().is_empty() {
            EMPTY_INSIGHTS_PLACEHOLDER
        } else {
            &self.insights
        }
    }

    pub fn recommended_approach(&self) -> Option<&str> {
        self.recommended_approach
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// Column name and type label pairs, in the order the server sent them.
    pub fn column_type_labels(&self) -> Vec<(String, String)> {
        self.column_types
            .iter()
            .map(|(column, kind)| {
                let label = match kind {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (column.clone(), label)
            })
            .collect()
    }
}
