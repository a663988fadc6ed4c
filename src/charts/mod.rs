//! Charts module - view content model and chart rendering

mod plotter;
mod renderer;

pub use plotter::{
    BarSeries, ChartPlotter, Orientation, TableBlock, ViewContent, REFUND_COLOR, REVENUE_COLOR,
    TREND_COLOR, VOLATILITY_COLOR,
};
pub use renderer::StaticChartRenderer;
