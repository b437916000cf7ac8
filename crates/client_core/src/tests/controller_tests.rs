use super::*;
use crate::bridge::events::UiErrorCategory;
use crossbeam_channel::bounded;
use serde_json::json;
use shared::protocol::{AnalyzeResponse, GenerateResult};

fn controller() -> (WizardController, Receiver<BackendCommand>) {
    let (cmd_tx, cmd_rx) = bounded(16);
    (WizardController::new(cmd_tx, DEFAULT_NOTIFICATION_TTL), cmd_rx)
}

fn analyze_response() -> AnalyzeResponse {
    serde_json::from_value(json!({
        "data_summary": {
            "insights": "Sales peak in Q4",
            "relevant_columns": ["date", "value"],
            "column_types": {"date": "object", "value": "int64"}
        },
        "proposals": [
            {"chart_type": "line", "title": "Trend", "variables": ["date", "value"], "justification": "time on x", "best_practices": "label axes"},
            {"chart_type": "bar", "title": "Totals", "variables": ["value"], "justification": "compare"}
        ]
    }))
    .expect("analyze response")
}

fn generate_result() -> GenerateResult {
    serde_json::from_value(json!({
        "plotly_json": {"data": [{"type": "scatter", "x": [1, 2], "y": [3, 4]}], "layout": {}},
        "code": "import plotly.express as px\nfig = px.line(df)"
    }))
    .expect("generate result")
}

fn at_proposals(controller: &mut WizardController, cmd_rx: &Receiver<BackendCommand>) {
    controller.select_file("/data/data.csv");
    controller.set_problem("trend over time");
    assert!(controller.submit_analysis());
    cmd_rx.try_recv().expect("analyze command");
    controller.apply_event(UiEvent::AnalysisReady {
        csv_text: "date,value\n2024-01,1\n".to_string(),
        response: analyze_response(),
    });
}

#[test]
fn submit_without_file_queues_nothing() {
    let (mut controller, cmd_rx) = controller();
    controller.set_problem("trend over time");

    assert!(!controller.submit_analysis());
    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(controller.step(), Step::Upload);
    assert!(controller.loading().is_none());
}

#[test]
fn submit_with_blank_problem_queues_nothing() {
    let (mut controller, cmd_rx) = controller();
    controller.select_file("/data/data.csv");
    controller.set_problem("  \n\t ");

    assert!(!controller.submit_analysis());
    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(controller.step(), Step::Upload);
}

#[test]
fn submit_queues_trimmed_problem_and_shows_loading() {
    let (mut controller, cmd_rx) = controller();
    controller.select_file("/data/data.csv");
    controller.set_problem("  trend over time ");

    assert!(controller.submit_analysis());
    assert_eq!(
        cmd_rx.try_recv().expect("command"),
        BackendCommand::Analyze {
            problem: "trend over time".to_string(),
            file: PathBuf::from("/data/data.csv"),
        }
    );
    assert_eq!(controller.loading(), Some(ANALYZE_LOADING_TEXT));
    assert!(controller.is_busy());
    assert_eq!(controller.step(), Step::Upload);
}

#[test]
fn analysis_result_advances_to_proposals() {
    let (mut controller, cmd_rx) = controller();
    at_proposals(&mut controller, &cmd_rx);

    assert_eq!(controller.step(), Step::Proposals);
    assert!(controller.loading().is_none());
    let state = controller.state();
    assert_eq!(state.proposals.len(), 2);
    assert_eq!(
        state.data_summary.as_ref().map(|s| s.insights.as_str()),
        Some("Sales peak in Q4")
    );
    assert_eq!(state.csv_text.as_deref(), Some("date,value\n2024-01,1\n"));
}

#[test]
fn selecting_a_proposal_sends_it_with_the_captured_csv() {
    let (mut controller, cmd_rx) = controller();
    at_proposals(&mut controller, &cmd_rx);

    assert!(controller.select_proposal(1));
    let expected = controller.state().proposals[1].clone();
    match cmd_rx.try_recv().expect("generate command") {
        BackendCommand::Generate {
            proposal_index,
            request,
        } => {
            assert_eq!(proposal_index, 1);
            assert_eq!(request.proposal, expected);
            assert_eq!(request.csv_data, "date,value\n2024-01,1\n");
        }
        other => panic!("unexpected command {other:?}"),
    }
    assert_eq!(controller.state().selected_proposal, Some(1));
    assert_eq!(controller.loading(), Some(GENERATE_LOADING_TEXT));

    assert!(controller.select_proposal(0));
    assert_eq!(controller.state().selected_proposal, Some(0));
}

#[test]
fn selecting_out_of_range_proposal_is_ignored() {
    let (mut controller, cmd_rx) = controller();
    at_proposals(&mut controller, &cmd_rx);

    assert!(!controller.select_proposal(7));
    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(controller.state().selected_proposal, None);
}

#[test]
fn visualization_result_advances_to_result_step() {
    let (mut controller, cmd_rx) = controller();
    at_proposals(&mut controller, &cmd_rx);
    controller.select_proposal(0);

    controller.apply_event(UiEvent::VisualizationReady {
        proposal_index: 0,
        result: generate_result(),
    });

    assert_eq!(controller.step(), Step::Result);
    assert!(controller.loading().is_none());
    assert_eq!(
        crate::wizard::view::code_view(controller.state()),
        Some("import plotly.express as px\nfig = px.line(df)")
    );
}

#[test]
fn analysis_error_shows_server_detail_and_keeps_step() {
    let (mut controller, _cmd_rx) = controller();
    controller.select_file("/data/data.csv");
    controller.set_problem("trend over time");
    controller.submit_analysis();

    controller.apply_event(UiEvent::Error(UiError::new(
        UiErrorCategory::Server,
        UiErrorContext::Analyze,
        "bad csv",
    )));

    assert_eq!(controller.step(), Step::Upload);
    assert!(controller.loading().is_none());
    assert_eq!(
        controller.notification().map(Notification::message),
        Some("bad csv")
    );
    assert!(controller.state().proposals.is_empty());
}

#[test]
fn generation_error_stays_on_proposals() {
    let (mut controller, cmd_rx) = controller();
    at_proposals(&mut controller, &cmd_rx);
    controller.select_proposal(0);

    controller.apply_event(UiEvent::Error(UiError::new(
        UiErrorCategory::Transport,
        UiErrorContext::Generate,
        "network error: connection refused",
    )));

    assert_eq!(controller.step(), Step::Proposals);
    assert!(!controller.is_busy());
    assert!(controller.state().result.is_none());
    assert!(controller.notification().is_some());
}

#[test]
fn notification_expires_after_its_ttl() {
    let (mut controller, _cmd_rx) = controller();
    controller.notify_error("bad csv");
    let raised = controller.notification().expect("notification").clone();

    let now = Instant::now();
    controller.expire_notification(now);
    assert!(controller.notification().is_some());

    controller.expire_notification(now + DEFAULT_NOTIFICATION_TTL);
    assert!(controller.notification().is_none());
    assert!(raised.is_expired_at(now + DEFAULT_NOTIFICATION_TTL));
    assert!(raised.remaining_at(now) <= DEFAULT_NOTIFICATION_TTL);
}

#[test]
fn restart_after_result_clears_everything() {
    let (mut controller, cmd_rx) = controller();
    at_proposals(&mut controller, &cmd_rx);
    controller.select_proposal(0);
    controller.apply_event(UiEvent::VisualizationReady {
        proposal_index: 0,
        result: generate_result(),
    });
    assert_eq!(controller.step(), Step::Result);

    controller.restart();

    let state = controller.state();
    assert_eq!(state.step, Step::Upload);
    assert!(state.selected_file.is_none());
    assert_eq!(state.file_name(), "");
    assert!(state.problem.is_empty());
    assert!(state.csv_text.is_none());
    assert!(state.proposals.is_empty());
    assert!(state.data_summary.is_none());
    assert!(state.selected_proposal.is_none());
    assert!(state.result.is_none());
}

#[test]
fn back_actions_follow_the_state_machine() {
    let (mut controller, cmd_rx) = controller();
    at_proposals(&mut controller, &cmd_rx);
    controller.back();
    assert_eq!(controller.step(), Step::Upload);
    assert_eq!(controller.state().proposals.len(), 2);

    controller.go_to_step(Step::Result);
    controller.back();
    assert_eq!(controller.step(), Step::Proposals);
}

#[test]
fn disconnected_worker_surfaces_an_error_instead_of_loading() {
    let (cmd_tx, cmd_rx) = bounded(1);
    drop(cmd_rx);
    let mut controller = WizardController::new(cmd_tx, DEFAULT_NOTIFICATION_TTL);
    controller.select_file("/data/data.csv");
    controller.set_problem("trend");

    assert!(!controller.submit_analysis());
    assert!(!controller.is_busy());
    assert!(controller
        .notification()
        .is_some_and(|n| n.message().contains("not running")));
}

#[test]
fn health_events_update_backend_status() {
    let (mut controller, cmd_rx) = controller();
    controller.check_backend_health();
    assert_eq!(cmd_rx.try_recv().expect("command"), BackendCommand::CheckHealth);
    assert_eq!(controller.backend_status(), &BackendStatus::Unknown);

    controller.apply_event(UiEvent::BackendHealth {
        reachable: true,
        message: "Backend online".to_string(),
    });
    assert_eq!(
        controller.backend_status(),
        &BackendStatus::Online("Backend online".to_string())
    );
    assert!(!controller.is_busy());
}

#[test]
fn drain_applies_every_pending_event() {
    let (mut controller, _cmd_rx) = controller();
    let (ui_tx, ui_rx) = bounded(4);
    ui_tx
        .send(UiEvent::BackendHealth {
            reachable: true,
            message: "up".to_string(),
        })
        .expect("send");
    ui_tx
        .send(UiEvent::BackendHealth {
            reachable: false,
            message: "down".to_string(),
        })
        .expect("send");

    assert_eq!(controller.drain_events(&ui_rx), 2);
    assert_eq!(
        controller.backend_status(),
        &BackendStatus::Offline("down".to_string())
    );
}
