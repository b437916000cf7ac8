//! Backend worker: a dedicated thread with its own Tokio runtime that drains the
//! command queue in order and posts results back to the UI.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info, warn};

use crate::{
    bridge::{
        commands::BackendCommand,
        events::{UiError, UiErrorCategory, UiErrorContext, UiEvent},
    },
    config::Settings,
    AnalysisBackend, CsvUpload, DatavizClient,
};

/// Starts the worker against the HTTP backend described by `settings`.
pub fn launch(
    settings: Settings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let client = match DatavizClient::from_settings(&settings) {
            Ok(client) => client,
            Err(err) => {
                error!("backend worker startup failure: {err}");
                let _ = ui_tx.send(UiEvent::Error(UiError::from_client_error(
                    UiErrorContext::BackendStartup,
                    &err,
                )));
                return;
            }
        };
        info!(server_url = %client.base_url(), "backend worker configured");
        run_on_runtime(&client, cmd_rx, ui_tx);
    })
}

/// Starts the worker against any [`AnalysisBackend`].
pub fn launch_with_backend<B>(
    backend: B,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> JoinHandle<()>
where
    B: AnalysisBackend + 'static,
{
    thread::spawn(move || run_on_runtime(&backend, cmd_rx, ui_tx))
}

fn run_on_runtime<B>(backend: &B, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>)
where
    B: AnalysisBackend + ?Sized,
{
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to build backend runtime: {err}");
            let _ = ui_tx.send(UiEvent::Error(UiError::new(
                UiErrorCategory::Local,
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: failed to build runtime: {err}"),
            )));
            return;
        }
    };

    runtime.block_on(run_commands(backend, cmd_rx, ui_tx));
}

/// Processes commands one at a time until the controller drops its sender or
/// stops listening for events.
pub async fn run_commands<B>(
    backend: &B,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) where
    B: AnalysisBackend + ?Sized,
{
    while let Ok(cmd) = cmd_rx.recv() {
        let name = cmd.name();
        let event = handle_command(backend, cmd).await;
        if ui_tx.send(event).is_err() {
            warn!(command = name, "ui event receiver dropped; stopping backend worker");
            break;
        }
    }
    info!("backend worker stopped");
}

async fn handle_command<B>(backend: &B, cmd: BackendCommand) -> UiEvent
where
    B: AnalysisBackend + ?Sized,
{
    match cmd {
        BackendCommand::CheckHealth => match backend.health().await {
            Ok(health) if health.is_healthy() => UiEvent::BackendHealth {
                reachable: true,
                message: "Backend online".to_string(),
            },
            Ok(health) => UiEvent::BackendHealth {
                reachable: true,
                message: format!("Backend reports status '{}'", health.status),
            },
            Err(err) => {
                warn!("backend: health check failed: {err}");
                UiEvent::BackendHealth {
                    reachable: false,
                    message: format!("Backend unreachable: {}", err.user_message()),
                }
            }
        },
        BackendCommand::Analyze { problem, file } => {
            info!(file = %file.display(), "backend: analyze");
            let upload = match CsvUpload::read(&file).await {
                Ok(upload) => upload,
                Err(err) => {
                    warn!("backend: analyze aborted: {err}");
                    return UiEvent::Error(UiError::from_client_error(
                        UiErrorContext::Analyze,
                        &err,
                    ));
                }
            };
            let csv_text = upload.text();
            match backend.analyze(&problem, &upload).await {
                Ok(response) => UiEvent::AnalysisReady { csv_text, response },
                Err(err) => {
                    warn!("backend: analyze failed: {err}");
                    UiEvent::Error(UiError::from_client_error(UiErrorContext::Analyze, &err))
                }
            }
        }
        BackendCommand::Generate {
            proposal_index,
            request,
        } => {
            info!(proposal_index, "backend: generate");
            match backend.generate(&request).await {
                Ok(result) => UiEvent::VisualizationReady {
                    proposal_index,
                    result,
                },
                Err(err) => {
                    warn!(proposal_index, "backend: generate failed: {err}");
                    UiEvent::Error(UiError::from_client_error(UiErrorContext::Generate, &err))
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/bridge_tests.rs"]
mod tests;
