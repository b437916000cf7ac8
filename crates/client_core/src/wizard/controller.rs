//! Wizard controller: owns the [`WizardState`], queues backend commands for
//! user actions and applies the worker's events.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::protocol::GenerateRequest;
use tracing::{debug, info, warn};

use crate::{
    bridge::{
        commands::BackendCommand,
        events::{UiError, UiErrorContext, UiEvent},
    },
    wizard::state::{SelectedFile, Step, WizardState},
};

pub const ANALYZE_LOADING_TEXT: &str = "Analyzing data...";
pub const GENERATE_LOADING_TEXT: &str = "Generating visualization...";
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Transient error message, dismissed automatically once `ttl` has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    message: String,
    raised_at: Instant,
    ttl: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, raised_at: Instant, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            raised_at,
            ttl,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.ttl
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.ttl
            .saturating_sub(now.saturating_duration_since(self.raised_at))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Online(String),
    Offline(String),
}

pub struct WizardController {
    cmd_tx: Sender<BackendCommand>,
    state: WizardState,
    pending_requests: usize,
    loading: Option<&'static str>,
    notification: Option<Notification>,
    notification_ttl: Duration,
    backend_status: BackendStatus,
}

impl WizardController {
    pub fn new(cmd_tx: Sender<BackendCommand>, notification_ttl: Duration) -> Self {
        Self {
            cmd_tx,
            state: WizardState::default(),
            pending_requests: 0,
            loading: None,
            notification: None,
            notification_ttl,
            backend_status: BackendStatus::Unknown,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    pub fn loading(&self) -> Option<&'static str> {
        self.loading
    }

    pub fn is_busy(&self) -> bool {
        self.pending_requests > 0
    }

    pub fn backend_status(&self) -> &BackendStatus {
        &self.backend_status
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn go_to_step(&mut self, step: Step) {
        debug!(from = self.state.step.number(), to = step.number(), "wizard: step change");
        self.state.step = step;
    }

    /// Explicit "back" action: results go back to proposals, proposals to upload.
    pub fn back(&mut self) {
        if let Some(previous) = self.state.step.previous() {
            self.go_to_step(previous);
        }
    }

    /// File chosen through the picker or dropped on the drop zone.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        let file = SelectedFile::from_path(path.into());
        info!(file = %file.name, "wizard: file selected");
        self.state.selected_file = Some(file);
    }

    pub fn set_problem(&mut self, problem: impl Into<String>) {
        self.state.problem = problem.into();
    }

    pub fn problem_mut(&mut self) -> &mut String {
        &mut self.state.problem
    }

    /// Queues the analysis request. Returns `false` without side effects when
    /// no file is selected or the problem text is blank.
    pub fn submit_analysis(&mut self) -> bool {
        let Some(file) = self.state.selected_file.as_ref() else {
            return false;
        };
        let problem = self.state.problem.trim();
        if problem.is_empty() {
            return false;
        }

        let cmd = BackendCommand::Analyze {
            problem: problem.to_string(),
            file: file.path.clone(),
        };
        self.queue_request(cmd, ANALYZE_LOADING_TEXT)
    }

    /// Marks the card at `index` selected and queues the generation request.
    pub fn select_proposal(&mut self, index: usize) -> bool {
        let Some(proposal) = self.state.proposals.get(index).cloned() else {
            warn!(index, "wizard: proposal index out of range");
            return false;
        };
        let Some(csv_data) = self.state.csv_text.clone() else {
            warn!(index, "wizard: no csv text captured; analysis has not completed");
            return false;
        };

        self.state.selected_proposal = Some(index);
        let cmd = BackendCommand::Generate {
            proposal_index: index,
            request: GenerateRequest { proposal, csv_data },
        };
        self.queue_request(cmd, GENERATE_LOADING_TEXT)
    }

    /// Clears every wizard field, the file name, and the problem text, then
    /// returns to the first step. In-flight requests are not cancelled.
    pub fn restart(&mut self) {
        info!("wizard: restart");
        self.state.reset();
    }

    pub fn check_backend_health(&mut self) {
        if let Err(message) = dispatch_backend_command(&self.cmd_tx, BackendCommand::CheckHealth) {
            self.backend_status = BackendStatus::Offline(message);
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|notification| notification.is_expired_at(now))
        {
            self.notification = None;
        }
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "wizard: error notification");
        self.notification = Some(Notification::new(
            message,
            Instant::now(),
            self.notification_ttl,
        ));
    }

    /// Applies every event currently waiting on `ui_rx` and returns how many
    /// were applied.
    pub fn drain_events(&mut self, ui_rx: &Receiver<UiEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = ui_rx.try_recv() {
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    pub fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::BackendHealth { reachable, message } => {
                self.backend_status = if reachable {
                    BackendStatus::Online(message)
                } else {
                    BackendStatus::Offline(message)
                };
            }
            UiEvent::AnalysisReady { csv_text, response } => {
                self.finish_request();
                info!(
                    proposals = response.proposals.len(),
                    columns = response.data_summary.relevant_columns.len(),
                    "wizard: analysis applied"
                );
                self.state.csv_text = Some(csv_text);
                self.state.data_summary = Some(response.data_summary);
                self.state.proposals = response.proposals;
                self.state.selected_proposal = None;
                self.state.result = None;
                self.go_to_step(Step::Proposals);
            }
            UiEvent::VisualizationReady {
                proposal_index,
                result,
            } => {
                self.finish_request();
                info!(proposal_index, "wizard: visualization applied");
                self.state.selected_proposal = Some(proposal_index);
                self.state.result = Some(result);
                self.go_to_step(Step::Result);
            }
            UiEvent::Error(err) => self.apply_error(err),
        }
    }

    fn apply_error(&mut self, err: UiError) {
        debug!(
            category = ?err.category(),
            context = ?err.context(),
            "wizard: worker reported an error"
        );
        match err.context() {
            UiErrorContext::Analyze | UiErrorContext::Generate => self.finish_request(),
            UiErrorContext::BackendStartup => {
                self.pending_requests = 0;
                self.loading = None;
                self.backend_status = BackendStatus::Offline(err.message().to_string());
            }
        }
        self.notify_error(err.message());
    }

    fn queue_request(&mut self, cmd: BackendCommand, loading_text: &'static str) -> bool {
        match dispatch_backend_command(&self.cmd_tx, cmd) {
            Ok(()) => {
                self.pending_requests += 1;
                self.loading = Some(loading_text);
                true
            }
            Err(message) => {
                self.notify_error(message);
                false
            }
        }
    }

    fn finish_request(&mut self) {
        self.pending_requests = self.pending_requests.saturating_sub(1);
        if self.pending_requests == 0 {
            self.loading = None;
        }
    }
}

/// Queues `cmd` for the backend worker without blocking the UI thread.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), String> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err("Request queue is full; please retry".to_string()),
        Err(TrySendError::Disconnected(_)) => Err(
            "Backend worker is not running (startup or runtime failure); restart the app"
                .to_string(),
        ),
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
