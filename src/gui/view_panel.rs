//! View Panel Widget
//! Central scrollable panel showing the selected section's tables, charts
//! and insight commentary.

use crate::charts::{ChartPlotter, ViewContent};
use egui::{RichText, ScrollArea};

pub struct ViewPanel {
    content: Option<ViewContent>,
}

impl Default for ViewPanel {
    fn default() -> Self {
        Self { content: None }
    }
}

impl ViewPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.content = None;
    }

    pub fn set_content(&mut self, content: ViewContent) {
        self.content = Some(content);
    }

    /// Draw the current view
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(content) = &self.content else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(8.0);
                ui.label(RichText::new(&content.heading).size(20.0).strong());
                ui.add_space(10.0);

                for table in &content.tables {
                    ChartPlotter::draw_table(ui, table);
                    ui.add_space(14.0);
                }

                for series in &content.charts {
                    ui.label(RichText::new(&series.title).size(14.0).strong());
                    ui.add_space(4.0);
                    ChartPlotter::draw_bar_chart(ui, series);
                    ui.add_space(14.0);
                }

                if let Some(insight) = &content.insight {
                    ui.label(RichText::new(insight).italics());
                    ui.add_space(10.0);
                }
            });
    }
}
