use std::{
    env, fs,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use crossbeam_channel::bounded;
use serde_json::json;
use shared::protocol::{AnalyzeResponse, GenerateRequest, GenerateResult, HealthResponse};

use super::*;
use crate::error::ClientError;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct Recorded {
    analyzed: Vec<(String, CsvUpload)>,
    generated: Vec<GenerateRequest>,
}

#[derive(Clone, Default)]
struct FakeBackend {
    recorded: Arc<Mutex<Recorded>>,
    fail_generate_with: Option<String>,
    health_status: Option<String>,
}

fn analyze_response() -> AnalyzeResponse {
    serde_json::from_value(json!({
        "data_summary": {"insights": "two columns", "relevant_columns": ["x", "y"]},
        "proposals": [
            {"chart_type": "scatter", "title": "X vs Y", "variables": ["x", "y"], "justification": "correlation"}
        ]
    }))
    .expect("analyze response")
}

#[async_trait]
impl AnalysisBackend for FakeBackend {
    async fn analyze(
        &self,
        problem: &str,
        upload: &CsvUpload,
    ) -> Result<AnalyzeResponse, ClientError> {
        self.recorded
            .lock()
            .expect("lock")
            .analyzed
            .push((problem.to_string(), upload.clone()));
        Ok(analyze_response())
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, ClientError> {
        self.recorded
            .lock()
            .expect("lock")
            .generated
            .push(request.clone());
        if let Some(detail) = &self.fail_generate_with {
            return Err(ClientError::server(500, Some(detail.clone())));
        }
        Ok(serde_json::from_value(json!({
            "plotly_json": {"data": [], "layout": {}},
            "code": "fig.show()"
        }))
        .expect("generate result"))
    }

    async fn health(&self) -> Result<HealthResponse, ClientError> {
        match &self.health_status {
            Some(status) => Ok(HealthResponse {
                status: status.clone(),
            }),
            None => Err(ClientError::server(503, None)),
        }
    }
}

fn temp_csv(name: &str, contents: &[u8]) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("dataviz_bridge_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join(name);
    fs::write(&path, contents).expect("write csv");
    path
}

fn start(backend: FakeBackend) -> (Sender<BackendCommand>, Receiver<UiEvent>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(8);
    let handle = launch_with_backend(backend, cmd_rx, ui_tx);
    (cmd_tx, ui_rx, handle)
}

#[test]
fn analyze_reads_the_file_and_returns_its_text_with_the_response() {
    let backend = FakeBackend::default();
    let recorded = backend.recorded.clone();
    let path = temp_csv("sales.csv", b"x,y\n1,2\n3,4\n");
    let (cmd_tx, ui_rx, handle) = start(backend);

    cmd_tx
        .send(BackendCommand::Analyze {
            problem: "is x related to y".to_string(),
            file: path.clone(),
        })
        .expect("send");

    match ui_rx.recv_timeout(EVENT_TIMEOUT).expect("event") {
        UiEvent::AnalysisReady { csv_text, response } => {
            assert_eq!(csv_text, "x,y\n1,2\n3,4\n");
            assert_eq!(response.proposals.len(), 1);
        }
        other => panic!("unexpected event {other:?}"),
    }

    {
        let recorded = recorded.lock().expect("lock");
        assert_eq!(recorded.analyzed.len(), 1);
        let (problem, upload) = &recorded.analyzed[0];
        assert_eq!(problem, "is x related to y");
        assert_eq!(upload.file_name, "sales.csv");
        assert_eq!(upload.bytes, b"x,y\n1,2\n3,4\n");
    }

    drop(cmd_tx);
    handle.join().expect("worker exits");
    if let Some(dir) = path.parent() {
        fs::remove_dir_all(dir).expect("cleanup");
    }
}

#[test]
fn unreadable_file_is_reported_as_a_local_analyze_error() {
    let (cmd_tx, ui_rx, handle) = start(FakeBackend::default());

    cmd_tx
        .send(BackendCommand::Analyze {
            problem: "anything".to_string(),
            file: PathBuf::from("/definitely/not/here.csv"),
        })
        .expect("send");

    match ui_rx.recv_timeout(EVENT_TIMEOUT).expect("event") {
        UiEvent::Error(err) => {
            assert_eq!(err.context(), UiErrorContext::Analyze);
            assert_eq!(err.category(), UiErrorCategory::Local);
            assert!(err.message().contains("here.csv"));
        }
        other => panic!("unexpected event {other:?}"),
    }

    drop(cmd_tx);
    handle.join().expect("worker exits");
}

#[test]
fn generate_failures_carry_the_server_detail() {
    let backend = FakeBackend {
        fail_generate_with: Some("unsupported chart".to_string()),
        ..FakeBackend::default()
    };
    let recorded = backend.recorded.clone();
    let (cmd_tx, ui_rx, handle) = start(backend);
    let proposal = analyze_response().proposals.remove(0);

    cmd_tx
        .send(BackendCommand::Generate {
            proposal_index: 0,
            request: GenerateRequest {
                proposal: proposal.clone(),
                csv_data: "x,y\n1,2\n".to_string(),
            },
        })
        .expect("send");

    match ui_rx.recv_timeout(EVENT_TIMEOUT).expect("event") {
        UiEvent::Error(err) => {
            assert_eq!(err.context(), UiErrorContext::Generate);
            assert_eq!(err.category(), UiErrorCategory::Server);
            assert_eq!(err.message(), "unsupported chart");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(
        recorded.lock().expect("lock").generated[0].proposal,
        proposal
    );

    drop(cmd_tx);
    handle.join().expect("worker exits");
}

#[test]
fn commands_are_answered_in_queue_order() {
    let backend = FakeBackend {
        health_status: Some("healthy".to_string()),
        ..FakeBackend::default()
    };
    let (cmd_tx, ui_rx, handle) = start(backend);
    let proposal = analyze_response().proposals.remove(0);

    cmd_tx.send(BackendCommand::CheckHealth).expect("send");
    cmd_tx
        .send(BackendCommand::Generate {
            proposal_index: 3,
            request: GenerateRequest {
                proposal,
                csv_data: String::new(),
            },
        })
        .expect("send");

    assert!(matches!(
        ui_rx.recv_timeout(EVENT_TIMEOUT).expect("health event"),
        UiEvent::BackendHealth { reachable: true, .. }
    ));
    assert!(matches!(
        ui_rx.recv_timeout(EVENT_TIMEOUT).expect("generate event"),
        UiEvent::VisualizationReady {
            proposal_index: 3,
            ..
        }
    ));

    drop(cmd_tx);
    handle.join().expect("worker exits");
}

#[test]
fn failed_health_check_reports_unreachable_backend() {
    let (cmd_tx, ui_rx, handle) = start(FakeBackend::default());

    cmd_tx.send(BackendCommand::CheckHealth).expect("send");
    match ui_rx.recv_timeout(EVENT_TIMEOUT).expect("event") {
        UiEvent::BackendHealth { reachable, message } => {
            assert!(!reachable);
            assert!(message.starts_with("Backend unreachable"));
        }
        other => panic!("unexpected event {other:?}"),
    }

    drop(cmd_tx);
    handle.join().expect("worker exits");
}

#[test]
fn launch_reports_invalid_server_url_at_startup() {
    let (_cmd_tx, cmd_rx) = bounded(1);
    let (ui_tx, ui_rx) = bounded(1);
    let settings = Settings {
        server_url: "ftp://nowhere".to_string(),
        ..Settings::default()
    };

    let handle = launch(settings, cmd_rx, ui_tx);

    match ui_rx.recv_timeout(EVENT_TIMEOUT).expect("event") {
        UiEvent::Error(err) => {
            assert_eq!(err.context(), UiErrorContext::BackendStartup);
            assert_eq!(err.category(), UiErrorCategory::Local);
        }
        other => panic!("unexpected event {other:?}"),
    }
    handle.join().expect("worker exits");
}
