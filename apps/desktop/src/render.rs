//! Plain-text rendering of the wizard for the terminal front end.

use std::fmt::Write as _;

use client_core::{
    chart::{ChartModel, SeriesData},
    wizard::{
        chart_view, code_view, proposal_cards, summary_view, BackendStatus, IndicatorState,
    },
    Step, WizardController,
};

pub fn prompt(controller: &WizardController) -> String {
    format!("dataviz[{}]> ", controller.step().number())
}

pub fn backend_line(controller: &WizardController) -> String {
    match controller.backend_status() {
        BackendStatus::Unknown => "Backend: still checking".to_string(),
        BackendStatus::Online(message) | BackendStatus::Offline(message) => {
            format!("Backend: {message}")
        }
    }
}

pub fn ignored_hint(controller: &WizardController) -> &'static str {
    match controller.step() {
        Step::Upload => "Nothing sent: choose a file and describe the problem first.",
        _ => "Nothing to do.",
    }
}

pub fn view(controller: &WizardController) -> String {
    let state = controller.state();
    let mut out = String::new();
    let indicators = state
        .indicators()
        .into_iter()
        .map(|(step, indicator)| {
            let mark = match indicator {
                IndicatorState::Done => "x",
                IndicatorState::Active => ">",
                IndicatorState::Pending => " ",
            };
            format!("[{mark}] {} {}", step.number(), step.label())
        })
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{indicators}");

    match state.step {
        Step::Upload => {
            let file = match state.file_name() {
                "" => "(none)",
                name => name,
            };
            let _ = writeln!(out, "File:    {file}");
            let _ = writeln!(out, "Problem: {}", state.problem.trim());
        }
        Step::Proposals => {
            if let Some(summary) = summary_view(state) {
                let _ = writeln!(out, "Insights: {}", summary.insights);
                if !summary.column_tags.is_empty() {
                    let _ = writeln!(out, "Columns:  {}", summary.column_tags.join(", "));
                }
                if let Some(approach) = &summary.recommended_approach {
                    let _ = writeln!(out, "Approach: {approach}");
                }
                for (column, kind) in &summary.column_types {
                    let _ = writeln!(out, "  {column}: {kind}");
                }
            }
            for card in proposal_cards(state) {
                let marker = if card.selected { '*' } else { ' ' };
                let _ = writeln!(
                    out,
                    "{marker}{}. [{}] {}",
                    card.index + 1,
                    card.chart_type,
                    card.title
                );
                let _ = writeln!(out, "    {}", card.variables);
                if !card.justification.is_empty() {
                    let _ = writeln!(out, "    {}", card.justification);
                }
                if let Some(tips) = &card.best_practices {
                    let _ = writeln!(out, "    Tip: {tips}");
                }
            }
        }
        Step::Result => {
            if let Some(chart) = chart_view(state) {
                out.push_str(&chart_outline(&chart));
            }
            if let Some(code) = code_view(state) {
                let _ = writeln!(out, "--- code ---\n{}\n------------", code.trim_end());
            }
        }
    }
    out
}

fn chart_outline(chart: &ChartModel) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Chart: {}",
        chart.title.as_deref().unwrap_or("(untitled)")
    );
    for series in &chart.series {
        let (kind, size) = match &series.data {
            SeriesData::Xy { points, .. } => ("xy", points.len()),
            SeriesData::Bars { bars, .. } => ("bars", bars.len()),
            SeriesData::Box { .. } => ("box", 1),
            SeriesData::Pie { slices } => ("pie", slices.len()),
        };
        let _ = writeln!(out, "  - {} ({kind}, {size} values)", series.name);
    }
    if !chart.unsupported.is_empty() {
        let _ = writeln!(out, "  skipped: {}", chart.unsupported.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use client_core::UiEvent;
    use serde_json::json;

    use super::*;

    fn controller() -> (
        WizardController,
        crossbeam_channel::Receiver<client_core::BackendCommand>,
    ) {
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(4);
        (
            WizardController::new(cmd_tx, Duration::from_secs(5)),
            cmd_rx,
        )
    }

    #[test]
    fn upload_view_shows_file_and_problem() {
        let (mut controller, _rx) = controller();
        assert!(view(&controller).contains("File:    (none)"));

        controller.select_file("/data/sales.csv");
        controller.set_problem("  trend  ");
        let text = view(&controller);
        assert!(text.starts_with("[>] 1 "));
        assert!(text.contains("File:    sales.csv"));
        assert!(text.contains("Problem: trend"));
        assert_eq!(prompt(&controller), "dataviz[1]> ");
    }

    #[test]
    fn proposals_view_numbers_cards_from_one() {
        let (mut controller, _rx) = controller();
        let response = serde_json::from_value(json!({
            "data_summary": {"insights": "", "relevant_columns": ["a", "b"]},
            "proposals": [
                {"chart_type": "bar", "title": "A by B", "variables": ["a", "b"], "justification": "compare"},
                {"chart_type": "pie", "title": "Share", "variables": ["a"], "justification": "parts", "best_practices": "few slices"}
            ]
        }))
        .expect("response");
        controller.apply_event(UiEvent::AnalysisReady {
            csv_text: "a,b\n".to_string(),
            response,
        });

        let text = view(&controller);
        assert!(text.contains("[x] 1 "));
        assert!(text.contains("Insights: No insight available."));
        assert!(text.contains("Columns:  a, b"));
        assert!(text.contains(" 1. [bar] A by B"));
        assert!(text.contains(" 2. [pie] Share"));
        assert!(text.contains("Variables: a, b"));
        assert!(text.contains("Tip: few slices"));
    }

    #[test]
    fn result_view_outlines_chart_and_prints_code() {
        let (mut controller, _rx) = controller();
        let result = serde_json::from_value(json!({
            "plotly_json": {
                "data": [{"type": "scatter", "name": "sales", "x": [1, 2, 3], "y": [2, 4, 8]},
                         {"type": "sankey"}],
                "layout": {"title": "Growth"}
            },
            "code": "fig.show()\n"
        }))
        .expect("result");
        controller.apply_event(UiEvent::VisualizationReady {
            proposal_index: 0,
            result,
        });

        let text = view(&controller);
        assert!(text.contains("Chart: Growth"));
        assert!(text.contains("  - sales (xy, 3 values)"));
        assert!(text.contains("skipped: sankey"));
        assert!(text.contains("--- code ---\nfig.show()\n---"));
    }
}
