//! Retail Pulse Main Application
//! Main window wiring the sidebar, the view panel, background data loading
//! and the report export.

use crate::charts::{
    BarSeries, Orientation, StaticChartRenderer, TableBlock, ViewContent, REFUND_COLOR,
    REVENUE_COLOR, TREND_COLOR, VOLATILITY_COLOR,
};
use crate::config::AppConfig;
use crate::data::DatasetStore;
use crate::gui::{Section, Sidebar, SidebarAction, ViewPanel};
use crate::ppt::{PptGenerator, ReportSlide};
use crate::stats::{format, Aggregator};
use egui::SidePanel;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;

/// Chart size for report slides; 3:2 matches the slide's picture box.
const EXPORT_CHART_WIDTH: u32 = 1350;
const EXPORT_CHART_HEIGHT: u32 = 900;

/// Loading result from background thread
enum LoadResult {
    Progress(String),
    Complete { rows: usize, cleaned_rows: usize },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: AppConfig,
    store: Arc<DatasetStore>,
    sidebar: Sidebar,
    view_panel: ViewPanel,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let store = Arc::new(DatasetStore::new(&config.data_path));
        let sidebar = Sidebar::new(config.data_path.clone());

        let mut app = Self {
            config,
            store,
            sidebar,
            view_panel: ViewPanel::new(),
            load_rx: None,
            is_loading: false,
        };

        // The dashboard is useless without its extract; start reading the
        // configured file right away when it exists.
        if app.store.path().exists() {
            app.start_load();
        } else {
            app.sidebar
                .set_progress(0.0, "Data file not found - browse to a CSV");
        }

        app
    }

    /// Handle CSV file selection.
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            // A different source gets a fresh store; memoization is per source.
            self.store = Arc::new(DatasetStore::new(&path));
            self.sidebar.data_path = path;
            self.sidebar.export_enabled = false;
            self.view_panel.clear();
            self.start_load();
        }
    }

    /// Read and clean the dataset on a background thread. The store
    /// guarantees the file is only ever read once per source.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }
        self.is_loading = true;
        self.sidebar.set_progress(5.0, "Loading dataset...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let store = Arc::clone(&self.store);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));
            let raw = match store.get_or_load() {
                Ok(raw) => raw,
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                    return;
                }
            };

            let _ = tx.send(LoadResult::Progress("Cleaning dataset...".to_string()));
            match store.get_or_clean() {
                Ok(cleaned) => {
                    let _ = tx.send(LoadResult::Complete {
                        rows: raw.len(),
                        cleaned_rows: cleaned.len(),
                    });
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.sidebar.set_progress(40.0, &status);
                    }
                    LoadResult::Complete { rows, cleaned_rows } => {
                        self.sidebar.set_progress(
                            100.0,
                            &format!("Loaded {} rows ({} after cleaning)", rows, cleaned_rows),
                        );
                        self.sidebar.export_enabled = true;
                        self.is_loading = false;
                        should_keep_receiver = false;
                        self.refresh_view();
                    }
                    LoadResult::Error(error) => {
                        self.sidebar.set_progress(0.0, &format!("Error: {}", error));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Recompute the selected section's content. Aggregates are built per
    /// render pass and discarded; only the datasets themselves are cached.
    fn refresh_view(&mut self) {
        if !self.store.is_loaded() {
            return;
        }
        match self.build_view_content(self.sidebar.selected) {
            Ok(content) => self.view_panel.set_content(content),
            Err(e) => {
                self.sidebar.set_progress(0.0, &format!("Error: {}", e));
                self.view_panel.clear();
            }
        }
    }

    fn build_view_content(&self, section: Section) -> anyhow::Result<ViewContent> {
        let raw = self.store.get_or_load()?;
        let symbol = self.config.currency_symbol.as_str();

        let content = match section {
            Section::Summary => {
                let cleaned = self.store.get_or_clean()?;
                let metrics = Aggregator::summary_metrics(&raw)?;
                let cleaning = Aggregator::cleaning_summary(&raw, &cleaned);
                ViewContent {
                    heading: "📊 Key Metrics Summary".to_string(),
                    tables: vec![
                        TableBlock {
                            title: "Key Metrics".to_string(),
                            columns: ("Metric".to_string(), "Value".to_string()),
                            rows: metrics.rows(symbol),
                        },
                        TableBlock {
                            title: "🧼 Data Cleaning Summary".to_string(),
                            columns: ("Step".to_string(), "Rows".to_string()),
                            rows: cleaning.rows(),
                        },
                    ],
                    charts: Vec::new(),
                    insight: None,
                }
            }
            Section::RefundAnalysis => {
                let ranked = Aggregator::refund_prone_products(&raw);
                ViewContent {
                    heading: "🔁 Refund-Prone Products".to_string(),
                    tables: Vec::new(),
                    charts: vec![BarSeries {
                        id: "refund_chart".to_string(),
                        title: "Top Refund-Prone Products".to_string(),
                        value_label: "Refund Records".to_string(),
                        entries: ranked
                            .into_iter()
                            .map(|(desc, count)| (desc, count as f64))
                            .collect(),
                        orientation: Orientation::Horizontal,
                        color: REFUND_COLOR,
                    }],
                    insight: None,
                }
            }
            Section::TopProducts => {
                let ranked = Aggregator::top_products_by_revenue(&raw);
                ViewContent {
                    heading: "🏆 Top Products by Revenue".to_string(),
                    tables: Vec::new(),
                    charts: vec![BarSeries {
                        id: "revenue_chart".to_string(),
                        title: format!("Top Products by Revenue ({})", symbol),
                        value_label: format!("{} Revenue", symbol),
                        entries: ranked,
                        orientation: Orientation::Horizontal,
                        color: REVENUE_COLOR,
                    }],
                    insight: None,
                }
            }
            Section::PriceVolatility => {
                let ranked = Aggregator::price_volatility_ranking(&raw);
                let table_rows = ranked
                    .iter()
                    .map(|(desc, count)| (desc.clone(), format::count(*count)))
                    .collect();
                ViewContent {
                    heading: "📈 Price Volatility".to_string(),
                    tables: vec![TableBlock {
                        title: "Unique Prices per Product".to_string(),
                        columns: ("Description".to_string(), "Unique Prices".to_string()),
                        rows: table_rows,
                    }],
                    charts: vec![BarSeries {
                        id: "volatility_chart".to_string(),
                        title: "Products with High Price Variation".to_string(),
                        value_label: "Unique Price Points".to_string(),
                        entries: ranked
                            .into_iter()
                            .map(|(desc, count)| (desc, count as f64))
                            .collect(),
                        orientation: Orientation::Vertical,
                        color: VOLATILITY_COLOR,
                    }],
                    insight: None,
                }
            }
            Section::RevenueTrends => {
                let trend = Aggregator::monthly_revenue_trend(&raw);
                let insight = trend
                    .iter()
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(month, revenue)| {
                        format!(
                            "Insight: {} is the peak revenue month at {}.",
                            month,
                            format::currency(*revenue, symbol)
                        )
                    });
                ViewContent {
                    heading: "📆 Monthly Revenue Trend".to_string(),
                    tables: Vec::new(),
                    charts: vec![BarSeries {
                        id: "trend_chart".to_string(),
                        title: format!("Monthly Revenue ({})", symbol),
                        value_label: format!("{} Revenue", symbol),
                        entries: trend
                            .into_iter()
                            .map(|(month, revenue)| (month.to_string(), revenue))
                            .collect(),
                        orientation: Orientation::Vertical,
                        color: TREND_COLOR,
                    }],
                    insight,
                }
            }
        };

        Ok(content)
    }

    /// Handle report export - render every section and write the PPT.
    fn handle_export_report(&mut self) {
        if !self.store.is_loaded() {
            self.sidebar.set_progress(0.0, "No data loaded");
            return;
        }

        let output_path = match rfd::FileDialog::new()
            .add_filter("PowerPoint", &["pptx"])
            .set_file_name("retail_pulse_report.pptx")
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        self.sidebar.set_progress(10.0, "Rendering charts...");

        match self.export_report(&output_path) {
            Ok(slide_count) => {
                self.sidebar
                    .set_progress(100.0, &format!("Report exported: {} slides", slide_count));
                let _ = open::that(&output_path);
            }
            Err(e) => {
                self.sidebar.set_progress(0.0, &format!("Export error: {}", e));
            }
        }
    }

    fn export_report(&self, output_path: &Path) -> anyhow::Result<usize> {
        let mut slides = Vec::new();

        for section in Section::ALL {
            let content = self.build_view_content(section)?;

            // Chart-bearing sections export their chart; the summary
            // section exports its tables as bullet lines instead.
            let image = match content.charts.first() {
                Some(series) => Some(StaticChartRenderer::render_bar_chart_png(
                    series,
                    EXPORT_CHART_WIDTH,
                    EXPORT_CHART_HEIGHT,
                )?),
                None => None,
            };

            let bullets = if image.is_none() {
                content
                    .tables
                    .iter()
                    .flat_map(|table| {
                        table
                            .rows
                            .iter()
                            .map(|(name, value)| format!("{}: {}", name, value))
                    })
                    .collect()
            } else {
                Vec::new()
            };

            slides.push(ReportSlide {
                title: section.title().to_string(),
                image,
                bullets,
            });
        }

        let slide_count = slides.len();
        PptGenerator::generate_report(&slides, output_path, "Retail Pulse Report")?;
        Ok(slide_count)
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - sidebar
        SidePanel::left("sidebar")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.sidebar.show(ui);

                    match action {
                        SidebarAction::BrowseCsv => self.handle_browse_csv(),
                        SidebarAction::LoadData => {
                            if !self.is_loading {
                                self.start_load();
                            }
                        }
                        SidebarAction::SectionChanged => self.refresh_view(),
                        SidebarAction::ExportReport => self.handle_export_report(),
                        SidebarAction::None => {}
                    }
                });
            });

        // Central panel - selected view
        egui::CentralPanel::default().show(ctx, |ui| {
            self.view_panel.show(ui);
        });
    }
}
