//! Sidebar Widget
//! Left side panel with the data source controls, the section selector,
//! report export and the progress/status line.

use egui::{Color32, RichText};
use std::path::PathBuf;

/// The five dashboard sections, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Summary,
    RefundAnalysis,
    TopProducts,
    PriceVolatility,
    RevenueTrends,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Summary,
        Section::RefundAnalysis,
        Section::TopProducts,
        Section::PriceVolatility,
        Section::RevenueTrends,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Summary => "Summary Dashboard",
            Section::RefundAnalysis => "Refund Analysis",
            Section::TopProducts => "Top Products",
            Section::PriceVolatility => "Price Volatility",
            Section::RevenueTrends => "Revenue Trends",
        }
    }
}

/// Actions triggered by the sidebar
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarAction {
    None,
    BrowseCsv,
    LoadData,
    SectionChanged,
    ExportReport,
}

/// Left side control panel.
pub struct Sidebar {
    pub selected: Section,
    pub data_path: PathBuf,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl Sidebar {
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            selected: Section::Summary,
            data_path,
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }

    /// Draw the sidebar
    pub fn show(&mut self, ui: &mut egui::Ui) -> SidebarAction {
        let mut action = SidebarAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🛒 Retail Pulse")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Sales & Product Health Check")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .data_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(Color32::WHITE));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = SidebarAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("▶ Load Data").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(button).clicked() {
                action = SidebarAction::LoadData;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Section Selector =====
        ui.label(RichText::new("🧭 Jump to Section").size(14.0).strong());
        ui.add_space(5.0);

        for section in Section::ALL {
            if ui
                .radio_value(&mut self.selected, section, section.title())
                .changed()
            {
                action = SidebarAction::SectionChanged;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Report Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("📄 Export Report").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = SidebarAction::ExportReport;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") || self.status.contains("exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}
