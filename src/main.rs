//! Retail Pulse - E-Commerce Sales & Product Health Dashboard
//!
//! Loads a retail transaction extract and renders five fixed analytics
//! views selected from a sidebar.

mod charts;
mod config;
mod data;
mod gui;
mod ppt;
mod stats;

use config::AppConfig;
use eframe::egui;
use gui::DashboardApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = AppConfig::load();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 700.0])
            .with_title("Retail Pulse"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Retail Pulse",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
}
