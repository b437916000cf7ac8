use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    time::{Duration, Instant},
};

mod render;

use anyhow::Context as _;
use clap::Parser;
use client_core::{
    bridge,
    wizard::{dispatch, dispatch::help_text, ActionOutcome, BackendStatus, DispatchError},
    BackendCommand, Settings, UiEvent, WizardController,
};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use tracing_subscriber::EnvFilter;

/// How long startup waits for the health check before showing the prompt.
const HEALTH_WAIT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "dataviz", about = "Terminal front end for the DataViz wizard")]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run these actions in order and exit instead of reading stdin.
    #[arg(long = "action", value_name = "ACTION")]
    actions: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())
        .context("failed to load settings")?
        .with_server_url(args.server_url);
    settings.base_url().context("invalid --server-url")?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
    let worker = bridge::launch(settings.clone(), cmd_rx, ui_tx);
    let mut controller = WizardController::new(cmd_tx, settings.notification_ttl());
    controller.check_backend_health();
    wait_for_health(&mut controller, &ui_rx, HEALTH_WAIT);

    let mut out = io::stdout().lock();
    writeln!(out, "{}", render::backend_line(&controller))?;

    if args.actions.is_empty() {
        writeln!(out, "Type 'help' for the list of actions.")?;
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            write!(out, "{}", render::prompt(&controller))?;
            out.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            if !run_line(&mut controller, &ui_rx, &line?, &mut out)? {
                break;
            }
        }
    } else {
        for action in &args.actions {
            writeln!(out, "{}{action}", render::prompt(&controller))?;
            if !run_line(&mut controller, &ui_rx, action, &mut out)? {
                break;
            }
        }
    }

    drop(controller);
    if worker.join().is_err() {
        tracing::error!("backend worker panicked");
    }
    Ok(())
}

/// Runs one action line and prints its result. Returns `false` on `quit`.
fn run_line(
    controller: &mut WizardController,
    ui_rx: &Receiver<UiEvent>,
    line: &str,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    controller.drain_events(ui_rx);
    match dispatch(controller, line) {
        Ok(ActionOutcome::Quit) => return Ok(false),
        Ok(ActionOutcome::Help) => writeln!(out, "{}", help_text())?,
        Ok(ActionOutcome::Show | ActionOutcome::Updated) => {
            write!(out, "{}", render::view(controller))?
        }
        Ok(ActionOutcome::Ignored) => writeln!(out, "{}", render::ignored_hint(controller))?,
        Ok(ActionOutcome::Queued) => {
            if let Some(text) = controller.loading() {
                writeln!(out, "{text}")?;
            }
            let step = controller.step();
            wait_for_worker(controller, ui_rx);
            if controller.step() != step {
                write!(out, "{}", render::view(controller))?;
            }
        }
        Err(DispatchError::Empty) => {}
        Err(err) => writeln!(out, "error: {err}")?,
    }

    if let Some(notification) = controller.notification() {
        writeln!(out, "! {}", notification.message())?;
        controller.dismiss_notification();
    }
    Ok(true)
}

/// Waits at most `limit` for the startup health check to answer. A late
/// answer is applied with the next action.
fn wait_for_health(
    controller: &mut WizardController,
    ui_rx: &Receiver<UiEvent>,
    limit: Duration,
) {
    let deadline = Instant::now() + limit;
    while *controller.backend_status() == BackendStatus::Unknown {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match ui_rx.recv_timeout(remaining) {
            Ok(event) => controller.apply_event(event),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(?limit, "health check still pending");
                break;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Blocks until every queued request has been answered or the worker stops.
fn wait_for_worker(controller: &mut WizardController, ui_rx: &Receiver<UiEvent>) {
    while controller.is_busy() {
        match ui_rx.recv() {
            Ok(event) => controller.apply_event(event),
            Err(_) => {
                controller.notify_error("Backend worker stopped");
                break;
            }
        }
    }
}
