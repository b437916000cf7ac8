use std::path::PathBuf;

mod ui;

use anyhow::Context as _;
use clap::Parser;
use client_core::{bridge, BackendCommand, Settings, UiEvent};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::ui::DatavizApp;

const APP_TITLE: &str = "DataViz Wizard";

#[derive(Parser, Debug)]
#[command(name = "dataviz-gui", about = "Upload a CSV, pick a proposal, get a chart")]
struct Args {
    /// Backend base url, overrides `dataviz.toml` and `DATAVIZ__SERVER_URL`.
    #[arg(long)]
    server_url: Option<String>,
    /// Explicit settings file instead of `./dataviz.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())
        .context("failed to load settings")?
        .with_server_url(args.server_url);
    let base_url = settings.base_url().context("invalid --server-url")?;
    tracing::info!(server_url = %base_url, "starting {APP_TITLE}");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let _worker = bridge::launch(settings.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([1100.0, 820.0])
            .with_min_inner_size([760.0, 560.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(DatavizApp::new(cmd_tx, ui_rx, &settings)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to open the {APP_TITLE} window: {err}"))
}
