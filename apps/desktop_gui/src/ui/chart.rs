//! egui_plot rendering of a [`ChartModel`].

use std::f64::consts::{FRAC_PI_2, TAU};

use client_core::chart::{
    format_number, palette_color, CategoryAxis, ChartModel, ChartSeries, Margin, PieSlice,
    SeriesData, XyStyle,
};
use eframe::egui::{self, Color32, RichText, Sense, Stroke};
use egui_plot::{BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotUi, Points};

const PIE_SEGMENTS: f64 = 120.0;

pub fn color32(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

pub fn show_chart(ui: &mut egui::Ui, chart: &ChartModel, height: f32) {
    if let Some(title) = &chart.title {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(title).heading().strong());
        });
    }
    if !chart.unsupported.is_empty() {
        ui.label(
            RichText::new(format!(
                "Skipped trace types: {}",
                chart.unsupported.join(", ")
            ))
            .weak()
            .italics(),
        );
    }
    if chart.is_empty() {
        ui.label("The figure has no drawable traces.");
        return;
    }

    egui::Frame::NONE
        .inner_margin(plot_padding(chart.margin))
        .show(ui, |ui| {
            if chart.is_pie() {
                show_pie(ui, chart, height);
            } else {
                show_plot(ui, chart, height);
            }
        });
}

fn show_plot(ui: &mut egui::Ui, chart: &ChartModel, height: f32) {
    let mut plot = Plot::new("dataviz_chart")
        .legend(Legend::default())
        .height(height)
        .allow_scroll(false);
    if let Some(title) = &chart.x_title {
        plot = plot.x_axis_label(title.clone());
    }
    if let Some(title) = &chart.y_title {
        plot = plot.y_axis_label(title.clone());
    }
    if !chart.x_categories.is_empty() {
        let axis = chart.x_categories.clone();
        plot = plot.x_axis_formatter(move |mark, _range| category_label(&axis, mark.value));
    }
    if !chart.y_categories.is_empty() {
        let axis = chart.y_categories.clone();
        plot = plot.y_axis_formatter(move |mark, _range| category_label(&axis, mark.value));
    }

    plot.show(ui, |plot_ui| {
        for series in &chart.series {
            add_series(plot_ui, series);
        }
    });
}

fn add_series(plot_ui: &mut PlotUi, series: &ChartSeries) {
    let color = color32(series.color);
    match &series.data {
        SeriesData::Xy { style, points } => {
            if matches!(style, XyStyle::Lines | XyStyle::LinesAndMarkers) {
                plot_ui.line(
                    Line::new(series.name.clone(), points.clone())
                        .color(color)
                        .width(2.0),
                );
            }
            if matches!(style, XyStyle::Markers | XyStyle::LinesAndMarkers) {
                plot_ui.points(
                    Points::new(series.name.clone(), points.clone())
                        .color(color)
                        .radius(3.5),
                );
            }
        }
        SeriesData::Bars { horizontal, bars } => {
            let bars = bars
                .iter()
                .map(|bar| {
                    egui_plot::Bar::new(bar.position, bar.value)
                        .width(bar.width)
                        .fill(color)
                })
                .collect();
            let mut chart = BarChart::new(series.name.clone(), bars).color(color);
            if *horizontal {
                chart = chart.horizontal();
            }
            plot_ui.bar_chart(chart);
        }
        SeriesData::Box { position, summary } => {
            let spread = BoxSpread::new(
                summary.min,
                summary.q1,
                summary.median,
                summary.q3,
                summary.max,
            );
            let elem = BoxElem::new(*position, spread)
                .box_width(0.5)
                .fill(color.gamma_multiply(0.35))
                .stroke(Stroke::new(1.5, color));
            plot_ui.box_plot(BoxPlot::new(series.name.clone(), vec![elem]).color(color));
        }
        // Drawn by `show_pie`; a pie never shares a plot with cartesian traces.
        SeriesData::Pie { .. } => {}
    }
}

fn show_pie(ui: &mut egui::Ui, chart: &ChartModel, height: f32) {
    let Some(slices) = chart.series.iter().find_map(|series| match &series.data {
        SeriesData::Pie { slices } => Some(slices),
        _ => None,
    }) else {
        return;
    };
    let fractions = pie_fractions(slices);
    if fractions.is_empty() {
        ui.label("All pie values are zero.");
        return;
    }

    ui.horizontal(|ui| {
        let size = height.min(ui.available_width() * 0.6).max(120.0);
        let (rect, _) = ui.allocate_exact_size(egui::vec2(size, size), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = size * 0.45;

        let mut start = -FRAC_PI_2;
        for (index, fraction) in fractions.iter().enumerate() {
            let sweep = fraction * TAU;
            let color = color32(palette_color(index));
            let steps = (fraction * PIE_SEGMENTS).ceil().max(1.0) as usize;
            let point = |angle: f64| {
                center + radius * egui::vec2(angle.cos() as f32, angle.sin() as f32)
            };
            for step in 0..steps {
                let a0 = start + sweep * step as f64 / steps as f64;
                let a1 = start + sweep * (step + 1) as f64 / steps as f64;
                painter.add(egui::Shape::convex_polygon(
                    vec![center, point(a0), point(a1)],
                    color,
                    Stroke::NONE,
                ));
            }
            painter.line_segment(
                [center, point(start)],
                Stroke::new(1.0, ui.visuals().panel_fill),
            );
            start += sweep;
        }

        ui.vertical(|ui| {
            for (index, (slice, fraction)) in slices
                .iter()
                .filter(|slice| slice.value > 0.0)
                .zip(&fractions)
                .enumerate()
            {
                ui.horizontal(|ui| {
                    let (swatch, _) =
                        ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                    ui.painter()
                        .rect_filled(swatch, 2.0, color32(palette_color(index)));
                    ui.label(format!(
                        "{}  {} ({:.1}%)",
                        slice.label,
                        format_number(slice.value),
                        fraction * 100.0
                    ));
                });
            }
        });
    });
}

/// Share of the total for every slice with a positive value, in order.
pub fn pie_fractions(slices: &[PieSlice]) -> Vec<f64> {
    let total: f64 = slices
        .iter()
        .map(|slice| slice.value)
        .filter(|value| *value > 0.0)
        .sum();
    if total <= 0.0 {
        return Vec::new();
    }
    slices
        .iter()
        .filter(|slice| slice.value > 0.0)
        .map(|slice| slice.value / total)
        .collect()
}

fn category_label(axis: &CategoryAxis, value: f64) -> String {
    axis.label_at(value).map(str::to_string).unwrap_or_default()
}

/// egui_plot reserves its own room for axis labels on the left and bottom, so
/// only the right and top sides of the layout margin are applied.
fn plot_padding(margin: Margin) -> egui::Margin {
    let px = |value: f64| value.clamp(0.0, f64::from(i8::MAX)) as i8;
    egui::Margin {
        left: 0,
        right: px(margin.r),
        top: px(margin.t / 4.0),
        bottom: 0,
    }
}

#[cfg(test)]
mod tests {
    use client_core::chart::DEFAULT_MARGIN;

    use super::*;

    fn slice(label: &str, value: f64) -> PieSlice {
        PieSlice {
            label: label.to_string(),
            value,
        }
    }

    #[test]
    fn pie_fractions_skip_non_positive_slices() {
        let fractions = pie_fractions(&[slice("a", 1.0), slice("b", 0.0), slice("c", 3.0)]);
        assert_eq!(fractions, vec![0.25, 0.75]);
    }

    #[test]
    fn pie_without_positive_values_has_no_fractions() {
        assert!(pie_fractions(&[slice("a", 0.0), slice("b", -2.0)]).is_empty());
        assert!(pie_fractions(&[]).is_empty());
    }

    #[test]
    fn category_ticks_only_label_whole_positions() {
        let mut axis = CategoryAxis::default();
        axis.position("Q1");
        axis.position("Q2");
        assert_eq!(category_label(&axis, 1.0), "Q2");
        assert_eq!(category_label(&axis, 0.5), "");
        assert_eq!(category_label(&axis, 5.0), "");
    }

    #[test]
    fn default_margin_maps_to_right_and_top_padding() {
        let padding = plot_padding(DEFAULT_MARGIN);
        assert_eq!(padding.left, 0);
        assert_eq!(padding.right, 30);
        assert_eq!(padding.top, 15);
        assert_eq!(padding.bottom, 0);

        let wide = plot_padding(Margin {
            l: 0.0,
            r: 500.0,
            t: -4.0,
            b: 0.0,
        });
        assert_eq!(wide.right, i8::MAX);
        assert_eq!(wide.top, 0);
    }
}
