//! Chart Plotter Module
//! View content model and interactive chart/table rendering with egui_plot.

use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Plot};

/// Series colors, one per dashboard section.
pub const TREND_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const REFUND_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red
pub const REVENUE_COLOR: Color32 = Color32::from_rgb(46, 204, 113); // Green
pub const VOLATILITY_COLOR: Color32 = Color32::from_rgb(243, 156, 18); // Orange

/// Longest category label drawn on a chart axis.
const MAX_AXIS_LABEL: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An ordered labeled series ready for a bar chart.
#[derive(Debug, Clone)]
pub struct BarSeries {
    /// Stable plot id, unique per section.
    pub id: String,
    pub title: String,
    /// Axis title for the numeric side.
    pub value_label: String,
    pub entries: Vec<(String, f64)>,
    pub orientation: Orientation,
    pub color: Color32,
}

/// A two-column table with named columns.
#[derive(Debug, Clone)]
pub struct TableBlock {
    pub title: String,
    pub columns: (String, String),
    pub rows: Vec<(String, String)>,
}

/// Everything one dashboard section displays.
#[derive(Debug, Clone, Default)]
pub struct ViewContent {
    pub heading: String,
    pub tables: Vec<TableBlock>,
    pub charts: Vec<BarSeries>,
    pub insight: Option<String>,
}

/// Draws bar charts and tables for the central panel.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw one bar chart. Horizontal charts show the first entry at the
    /// top, which keeps ranked views reading best-first.
    pub fn draw_bar_chart(ui: &mut egui::Ui, series: &BarSeries) {
        let n = series.entries.len();
        if n == 0 {
            ui.label(RichText::new("No qualifying records").italics());
            return;
        }

        let horizontal = series.orientation == Orientation::Horizontal;
        let bars: Vec<Bar> = series
            .entries
            .iter()
            .enumerate()
            .map(|(i, (label, value))| {
                let pos = if horizontal { (n - 1 - i) as f64 } else { i as f64 };
                Bar::new(pos, *value)
                    .width(0.6)
                    .fill(series.color)
                    .name(label)
            })
            .collect();

        let mut chart = BarChart::new(bars).name(&series.title);
        if horizontal {
            chart = chart.horizontal();
        }

        let labels: Vec<String> = series
            .entries
            .iter()
            .map(|(label, _)| short_label(label))
            .collect();

        let mut plot = Plot::new(series.id.clone())
            .height(380.0)
            .allow_scroll(false)
            .allow_drag(false)
            .allow_zoom(false);

        if horizontal {
            plot = plot
                .x_axis_label(series.value_label.clone())
                .y_axis_formatter(move |mark, _range| {
                    let idx = mark.value.round() as usize;
                    if idx < labels.len() {
                        labels[labels.len() - 1 - idx].clone()
                    } else {
                        String::new()
                    }
                });
        } else {
            plot = plot
                .y_axis_label(series.value_label.clone())
                .x_axis_formatter(move |mark, _range| {
                    let idx = mark.value.round() as usize;
                    if idx < labels.len() {
                        labels[idx].clone()
                    } else {
                        String::new()
                    }
                });
        }

        plot.show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
    }

    /// Draw a two-column table in a framed, striped grid.
    pub fn draw_table(ui: &mut egui::Ui, table: &TableBlock) {
        if !table.title.is_empty() {
            ui.label(RichText::new(&table.title).size(14.0).strong());
            ui.add_space(4.0);
        }

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(&table.title))
                    .striped(true)
                    .min_col_width(140.0)
                    .spacing([24.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new(&table.columns.0).strong().size(12.0));
                        ui.label(RichText::new(&table.columns.1).strong().size(12.0));
                        ui.end_row();

                        for (name, value) in &table.rows {
                            ui.label(RichText::new(name).size(12.0));
                            ui.label(RichText::new(value).size(12.0));
                            ui.end_row();
                        }
                    });
            });
    }
}

fn short_label(label: &str) -> String {
    if label.chars().count() <= MAX_AXIS_LABEL {
        label.to_string()
    } else {
        let mut out: String = label.chars().take(MAX_AXIS_LABEL - 1).collect();
        out.push('…');
        out
    }
}
