//! Static Chart Renderer
//! Renders a `BarSeries` to PNG bytes with Plotters for report embedding.

use crate::charts::plotter::{BarSeries, Orientation};
use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one bar chart into in-memory PNG bytes.
    pub fn render_bar_chart_png(series: &BarSeries, width: u32, height: u32) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; (width as usize) * (height as usize) * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| anyhow!("chart background fill failed: {}", e))?;

            match series.orientation {
                Orientation::Vertical => Self::draw_vertical(&root, series)?,
                Orientation::Horizontal => Self::draw_horizontal(&root, series)?,
            }

            root.present()
                .map_err(|e| anyhow!("chart present failed: {}", e))?;
        }

        let img = image::RgbImage::from_raw(width, height, buf)
            .context("chart buffer size mismatch")?;
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )?;
        Ok(bytes)
    }

    fn draw_vertical(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        series: &BarSeries,
    ) -> Result<()> {
        let n = series.entries.len().max(1);
        let (lo, hi) = value_range(&series.entries);
        let color = to_rgb(series.color);

        let mut chart = ChartBuilder::on(root)
            .caption(&series.title, ("sans-serif", 26))
            .margin(14)
            .x_label_area_size(110)
            .y_label_area_size(80)
            .build_cartesian_2d((0usize..n).into_segmented(), lo..hi)
            .map_err(|e| anyhow!("chart layout failed: {}", e))?;

        let labels: Vec<&str> = series.entries.iter().map(|(l, _)| l.as_str()).collect();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|seg| match seg {
                SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .x_label_style(
                ("sans-serif", 13)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_desc(&series.value_label)
            .label_style(("sans-serif", 14))
            .draw()
            .map_err(|e| anyhow!("chart mesh failed: {}", e))?;

        chart
            .draw_series(series.entries.iter().enumerate().map(|(i, (_, value))| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), *value),
                    ],
                    color.filled(),
                )
            }))
            .map_err(|e| anyhow!("chart series failed: {}", e))?;

        Ok(())
    }

    fn draw_horizontal(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        series: &BarSeries,
    ) -> Result<()> {
        let n = series.entries.len().max(1);
        let (lo, hi) = value_range(&series.entries);
        let color = to_rgb(series.color);

        let mut chart = ChartBuilder::on(root)
            .caption(&series.title, ("sans-serif", 26))
            .margin(14)
            .x_label_area_size(50)
            .y_label_area_size(230)
            .build_cartesian_2d(lo..hi, (0usize..n).into_segmented())
            .map_err(|e| anyhow!("chart layout failed: {}", e))?;

        // First entry drawn at the top row.
        let labels: Vec<&str> = series.entries.iter().map(|(l, _)| l.as_str()).collect();
        let label_count = labels.len();
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n)
            .y_label_formatter(&|seg| match seg {
                SegmentValue::CenterOf(i) if *i < label_count => {
                    labels[label_count - 1 - *i].to_string()
                }
                _ => String::new(),
            })
            .x_desc(&series.value_label)
            .label_style(("sans-serif", 14))
            .draw()
            .map_err(|e| anyhow!("chart mesh failed: {}", e))?;

        chart
            .draw_series(series.entries.iter().enumerate().map(|(i, (_, value))| {
                let row = label_count - 1 - i;
                Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(row)),
                        (*value, SegmentValue::Exact(row + 1)),
                    ],
                    color.filled(),
                )
            }))
            .map_err(|e| anyhow!("chart series failed: {}", e))?;

        Ok(())
    }
}

fn to_rgb(color: egui::Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

/// Numeric axis range covering zero and all values, with a little headroom.
fn value_range(entries: &[(String, f64)]) -> (f64, f64) {
    let mut lo = 0.0f64;
    let mut hi = 0.0f64;
    for (_, v) in entries {
        lo = lo.min(*v);
        hi = hi.max(*v);
    }
    if lo == hi {
        hi = 1.0;
    }
    let pad = (hi - lo) * 0.05;
    (
        if lo < 0.0 { lo - pad } else { lo },
        hi + pad,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_range_covers_zero_and_pads_the_top() {
        let entries = vec![("A".to_string(), 100.0), ("B".to_string(), 40.0)];
        let (lo, hi) = value_range(&entries);
        assert_eq!(lo, 0.0);
        assert!(hi > 100.0);
    }

    #[test]
    fn value_range_handles_negative_revenue() {
        let entries = vec![("A".to_string(), -50.0), ("B".to_string(), 80.0)];
        let (lo, hi) = value_range(&entries);
        assert!(lo < -50.0);
        assert!(hi > 80.0);
    }
}
