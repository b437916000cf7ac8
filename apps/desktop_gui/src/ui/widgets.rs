//! Small reusable wizard widgets.

use client_core::wizard::{IndicatorState, ProposalCard, WizardState};
use eframe::egui::{self, Color32, RichText, Sense, Stroke};

pub const ACCENT: Color32 = Color32::from_rgb(76, 110, 245);
pub const ONLINE: Color32 = Color32::from_rgb(46, 160, 110);
const ERROR_FILL: Color32 = Color32::from_rgb(111, 53, 53);
const ERROR_STROKE: Color32 = Color32::from_rgb(175, 96, 96);

pub fn step_indicator(ui: &mut egui::Ui, state: &WizardState) {
    ui.horizontal(|ui| {
        for (position, (step, indicator)) in state.indicators().into_iter().enumerate() {
            if position > 0 {
                ui.label(RichText::new("›").weak());
            }
            let (fill, text) = match indicator {
                IndicatorState::Active => (ACCENT, Color32::WHITE),
                IndicatorState::Done => (ONLINE, Color32::WHITE),
                IndicatorState::Pending => {
                    (ui.visuals().faint_bg_color, ui.visuals().weak_text_color())
                }
            };
            egui::Frame::NONE
                .fill(fill)
                .corner_radius(12.0)
                .inner_margin(egui::Margin::symmetric(10, 4))
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("{}. {}", step.number(), step.label()))
                            .color(text)
                            .strong(),
                    );
                });
        }
    });
}

/// Drop target for the CSV file; clicking it opens the file picker.
pub fn drop_zone(ui: &mut egui::Ui, file_name: &str, hovering: bool) -> egui::Response {
    let visuals = ui.visuals();
    let (fill, stroke) = if hovering {
        (ACCENT.gamma_multiply(0.15), Stroke::new(2.0, ACCENT))
    } else {
        (
            visuals.extreme_bg_color,
            Stroke::new(1.0, visuals.widgets.noninteractive.bg_stroke.color),
        )
    };

    egui::Frame::NONE
        .fill(fill)
        .stroke(stroke)
        .corner_radius(10.0)
        .inner_margin(egui::Margin::symmetric(16, 28))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Drop a CSV file here, or click to browse").strong());
                if file_name.is_empty() {
                    ui.label(RichText::new("No file selected").weak());
                } else {
                    ui.label(RichText::new(file_name).color(ACCENT).monospace());
                }
            });
        })
        .response
        .interact(Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
}

pub fn column_tags(ui: &mut egui::Ui, tags: &[String]) {
    ui.horizontal_wrapped(|ui| {
        for tag in tags {
            egui::Frame::NONE
                .fill(ACCENT.gamma_multiply(0.2))
                .corner_radius(10.0)
                .inner_margin(egui::Margin::symmetric(8, 2))
                .show(ui, |ui| {
                    ui.label(RichText::new(tag).small().monospace());
                });
        }
    });
}

pub fn proposal_card(ui: &mut egui::Ui, card: &ProposalCard) -> egui::Response {
    let stroke = if card.selected {
        Stroke::new(2.0, ACCENT)
    } else {
        Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
    };

    egui::Frame::NONE
        .fill(ui.visuals().faint_bg_color)
        .stroke(stroke)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(12, 10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                egui::Frame::NONE
                    .fill(ACCENT)
                    .corner_radius(4.0)
                    .inner_margin(egui::Margin::symmetric(6, 1))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(card.chart_type.to_uppercase())
                                .small()
                                .color(Color32::WHITE),
                        );
                    });
                ui.label(RichText::new(&card.title).strong().size(16.0));
            });
            ui.label(RichText::new(&card.variables).weak());
            ui.label(&card.justification);
            if let Some(tips) = &card.best_practices {
                ui.label(RichText::new(tips).italics().small());
            }
        })
        .response
        .interact(Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
}

pub fn loading_modal(ctx: &egui::Context, text: &str) {
    egui::Modal::new(egui::Id::new("dataviz_loading")).show(ctx, |ui| {
        ui.set_min_width(260.0);
        ui.vertical_centered(|ui| {
            ui.add_space(8.0);
            ui.spinner();
            ui.add_space(8.0);
            ui.label(text);
            ui.add_space(4.0);
        });
    });
}

/// Error toast in the bottom-right corner. Returns `true` when dismissed.
pub fn error_toast(ctx: &egui::Context, message: &str) -> bool {
    let mut dismissed = false;
    egui::Area::new(egui::Id::new("dataviz_error_toast"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(ERROR_FILL)
                .stroke(Stroke::new(1.0, ERROR_STROKE))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.set_max_width(380.0);
                    ui.horizontal_wrapped(|ui| {
                        ui.label(RichText::new(message).color(Color32::WHITE));
                        if ui.button("Dismiss").clicked() {
                            dismissed = true;
                        }
                    });
                });
        });
    dismissed
}
