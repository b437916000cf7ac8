//! Front-end agnostic view models derived from [`WizardState`].

use crate::{
    chart::ChartModel,
    wizard::state::WizardState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalCard {
    pub index: usize,
    pub chart_type: String,
    pub title: String,
    pub variables: String,
    pub justification: String,
    pub best_practices: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub insights: String,
    pub column_tags: Vec<String>,
    pub recommended_approach: Option<String>,
    pub column_types: Vec<(String, String)>,
}

/// One card per proposal, in server order.
pub fn proposal_cards(state: &WizardState) -> Vec<ProposalCard> {
    state
        .proposals
        .iter()
        .enumerate()
        .map(|(index, proposal)| ProposalCard {
            index,
            chart_type: proposal.chart_type.clone(),
            title: proposal.title.clone(),
            variables: format!("Variables: {}", proposal.variables_label()),
            justification: proposal.justification().to_string(),
            best_practices: proposal.best_practices().map(str::to_string),
            selected: state.selected_proposal == Some(index),
        })
        .collect()
}

pub fn summary_view(state: &WizardState) -> Option<SummaryView> {
    let summary = state.data_summary.as_ref()?;
    Some(SummaryView {
        insights: summary.insights_or_placeholder().to_string(),
        column_tags: summary.relevant_columns.clone(),
        recommended_approach: summary.recommended_approach().map(str::to_string),
        column_types: summary.column_type_labels(),
    })
}

pub fn chart_view(state: &WizardState) -> Option<ChartModel> {
    state
        .result
        .as_ref()
        .map(|result| ChartModel::from_figure(&result.plotly_json))
}

pub fn code_view(state: &WizardState) -> Option<&str> {
    state.result.as_ref().map(|result| result.code.as_str())
}
