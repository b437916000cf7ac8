use std::{
    fs,
    path::PathBuf,
    time::{Duration, Instant},
};

use arboard::Clipboard;
use client_core::{
    wizard::{
        chart_view, code_view, proposal_cards, summary_view, BackendStatus, ProposalCard,
        SummaryView,
    },
    BackendCommand, Settings, Step, UiEvent, WizardController,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui::{self, RichText};

use crate::ui::{chart, widgets};

const CHART_HEIGHT: f32 = 420.0;
const IDLE_REPAINT: Duration = Duration::from_millis(250);
const BUSY_REPAINT: Duration = Duration::from_millis(50);

pub struct DatavizApp {
    controller: WizardController,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    status: String,
    /// Rebuilt only after worker events or a restart.
    chart: Option<client_core::chart::ChartModel>,
}

impl DatavizApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &Settings,
    ) -> Self {
        let mut controller = WizardController::new(cmd_tx, settings.notification_ttl());
        controller.check_backend_health();
        Self {
            controller,
            ui_rx,
            server_url: settings.server_url.clone(),
            status: String::new(),
            chart: None,
        }
    }

    fn process_ui_events(&mut self) {
        if self.controller.drain_events(&self.ui_rx) > 0 {
            self.refresh_chart();
        }
        self.controller.expire_notification(Instant::now());
    }

    fn refresh_chart(&mut self) {
        self.chart = chart_view(self.controller.state());
    }

    fn capture_dropped_file(&mut self, ctx: &egui::Context) -> bool {
        let (dropped, hovering) = ctx.input(|input| {
            (
                first_dropped_path(&input.raw.dropped_files),
                !input.raw.hovered_files.is_empty(),
            )
        });
        if self.controller.step() == Step::Upload {
            if let Some(path) = dropped {
                self.controller.select_file(path);
            }
        }
        hovering
    }

    fn pick_file(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("CSV", &["csv"]);
        if let Some(dir) = default_data_dir() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.controller.select_file(path);
        }
    }

    fn copy_code(&mut self, code: &str) {
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(code.to_string())) {
            Ok(()) => self.status = "Copied code to clipboard".to_string(),
            Err(err) => self.status = format!("Failed to copy code: {err}"),
        }
    }

    fn save_code_as(&mut self, code: &str) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Python", &["py"])
            .set_file_name("visualization.py")
            .save_file()
        {
            match fs::write(&path, code) {
                Ok(()) => self.status = format!("Saved code to {}", path.display()),
                Err(err) => self.status = format!("Failed to save code: {err}"),
            }
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("wizard_steps")
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::symmetric(12, 10)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("DataViz");
                    ui.add_space(16.0);
                    widgets::step_indicator(ui, self.controller.state());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let (text, color) = match self.controller.backend_status() {
                            BackendStatus::Unknown => (
                                "Checking backend...".to_string(),
                                ui.visuals().weak_text_color(),
                            ),
                            BackendStatus::Online(message) => (message.clone(), widgets::ONLINE),
                            BackendStatus::Offline(message) => {
                                (message.clone(), ui.visuals().error_fg_color)
                            }
                        };
                        ui.label(RichText::new(text).small().color(color))
                            .on_hover_text(&self.server_url);
                    });
                });
            });
    }

    fn show_upload_step(&mut self, ui: &mut egui::Ui, hovering: bool) {
        ui.heading("Upload your data");
        ui.add_space(8.0);
        if widgets::drop_zone(ui, self.controller.state().file_name(), hovering).clicked() {
            self.pick_file();
        }

        ui.add_space(12.0);
        ui.label(RichText::new("What do you want to learn from this data?").strong());
        ui.add(
            egui::TextEdit::multiline(self.controller.problem_mut())
                .hint_text("e.g. How do sales evolve over the year for each product?")
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );

        ui.add_space(8.0);
        let label = RichText::new("Analyze").strong().color(egui::Color32::WHITE);
        let analyze = egui::Button::new(label)
            .fill(widgets::ACCENT)
            .min_size(egui::vec2(120.0, 32.0));
        if ui.add(analyze).clicked() {
            self.controller.submit_analysis();
        }
    }

    fn show_proposals_step(&mut self, ui: &mut egui::Ui) {
        if let Some(summary) = summary_view(self.controller.state()) {
            show_summary(ui, &summary);
            ui.add_space(12.0);
        }

        ui.heading("Proposed visualizations");
        ui.add_space(4.0);
        let cards: Vec<ProposalCard> = proposal_cards(self.controller.state());
        if cards.is_empty() {
            ui.label(RichText::new("The backend returned no proposals.").weak());
        }
        let mut clicked = None;
        for card in &cards {
            if widgets::proposal_card(ui, card).clicked() {
                clicked = Some(card.index);
            }
            ui.add_space(6.0);
        }
        if let Some(index) = clicked {
            self.controller.select_proposal(index);
        }

        ui.add_space(8.0);
        if ui.button("← Back").clicked() {
            self.controller.back();
        }
    }

    fn show_result_step(&mut self, ui: &mut egui::Ui) {
        if let Some(proposal) = self.controller.state().selected() {
            let heading = format!("{} · {}", proposal.chart_type, proposal.title);
            ui.label(RichText::new(heading).weak());
        }
        match &self.chart {
            Some(model) => chart::show_chart(ui, model, CHART_HEIGHT),
            None => {
                ui.label("No chart available.");
            }
        }

        ui.add_space(12.0);
        let code = code_view(self.controller.state()).map(str::to_string);
        if let Some(code) = code {
            ui.horizontal(|ui| {
                ui.heading("Generated code");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Save as…").clicked() {
                        self.save_code_as(&code);
                    }
                    if ui.button("Copy").clicked() {
                        self.copy_code(&code);
                    }
                });
            });
            egui::ScrollArea::vertical()
                .id_salt("generated_code")
                .max_height(260.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut code.as_str())
                            .code_editor()
                            .desired_width(f32::INFINITY),
                    );
                });
        }
        if !self.status.is_empty() {
            ui.label(RichText::new(&self.status).small().weak());
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("← Back to proposals").clicked() {
                self.controller.back();
            }
            if ui.button("New analysis").clicked() {
                self.controller.restart();
                self.status.clear();
                self.refresh_chart();
            }
        });
    }
}

fn show_summary(ui: &mut egui::Ui, summary: &SummaryView) {
    ui.heading("Data summary");
    ui.label(&summary.insights);
    if !summary.column_tags.is_empty() {
        ui.add_space(4.0);
        widgets::column_tags(ui, &summary.column_tags);
    }
    if let Some(approach) = &summary.recommended_approach {
        ui.add_space(4.0);
        ui.label(RichText::new(format!("Recommended approach: {approach}")).italics());
    }
    if !summary.column_types.is_empty() {
        egui::CollapsingHeader::new("Column types")
            .default_open(false)
            .show(ui, |ui| {
                egui::Grid::new("column_types").striped(true).show(ui, |ui| {
                    for (column, kind) in &summary.column_types {
                        ui.monospace(column);
                        ui.label(RichText::new(kind).weak());
                        ui.end_row();
                    }
                });
            });
    }
}

fn first_dropped_path(files: &[egui::DroppedFile]) -> Option<PathBuf> {
    files.iter().find_map(|file| file.path.clone())
}

fn default_data_dir() -> Option<PathBuf> {
    dirs::download_dir()
        .or_else(dirs::document_dir)
        .or_else(dirs::home_dir)
}

impl eframe::App for DatavizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        let hovering = self.capture_dropped_file(ctx);

        self.show_top_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_max_width(960.0);
                match self.controller.step() {
                    Step::Upload => self.show_upload_step(ui, hovering),
                    Step::Proposals => self.show_proposals_step(ui),
                    Step::Result => self.show_result_step(ui),
                }
            });
        });

        if let Some(text) = self.controller.loading() {
            widgets::loading_modal(ctx, text);
        }
        let dismissed = self
            .controller
            .notification()
            .is_some_and(|notification| widgets::error_toast(ctx, notification.message()));
        if dismissed {
            self.controller.dismiss_notification();
        }

        let now = Instant::now();
        let repaint = match self.controller.notification() {
            _ if self.controller.is_busy() => BUSY_REPAINT,
            Some(notification) => notification.remaining_at(now).min(IDLE_REPAINT),
            None => IDLE_REPAINT,
        };
        ctx.request_repaint_after(repaint);
    }
}
