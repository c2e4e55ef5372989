use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::colormaps::ViridisRGB;
use plotters::style::FontTransform;
use std::path::Path;

use super::config::PlotOptions;
use super::error::RenderError;
use super::tree::{Field, Series, SummaryStats};

/// The render target of the walker. The production implementation draws PNGs
/// with plotters; tests substitute a recording implementation.
pub trait Renderer {
    fn render_series(
        &self,
        run_number: i32,
        series: &Series,
        options: &PlotOptions,
        out_dir: &Path,
    ) -> Result<(), RenderError>;

    fn render_field(
        &self,
        run_number: i32,
        field: &Field,
        options: &PlotOptions,
        out_dir: &Path,
    ) -> Result<(), RenderError>;
}

/// Draws one measurement per PNG file: line plots for 1D measurements and
/// Viridis heat maps with a color bar for 2D measurements.
#[derive(Debug, Clone, Copy)]
pub struct PngRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Output filename of a measurement: its name with parentheses stripped
pub fn output_filename(name: &str) -> String {
    let stem: String = name.chars().filter(|c| *c != '(' && *c != ')').collect();
    format!("{stem}.png")
}

/// The caption always carries the run number as a prefix label
fn caption_for(run_number: i32, title: Option<&str>, name: &str) -> String {
    format!("Run {run_number}: {}", title.unwrap_or(name))
}

/// Padded y-range for a line plot; a flat or empty series still gets a
/// non-degenerate axis.
fn value_range(stats: Option<SummaryStats>) -> (f64, f64) {
    match stats {
        Some(s) if s.max > s.min => {
            let pad = 0.05 * (s.max - s.min);
            (s.min - pad, s.max + pad)
        }
        Some(s) => (s.min - 0.5, s.max + 0.5),
        None => (0.0, 1.0),
    }
}

impl Renderer for PngRenderer {
    fn render_series(
        &self,
        run_number: i32,
        series: &Series,
        options: &PlotOptions,
        out_dir: &Path,
    ) -> Result<(), RenderError> {
        let path = out_dir.join(output_filename(&series.name));
        let caption = caption_for(run_number, options.title.as_deref(), &series.name);
        let bins = series.values.len().max(1);
        let (y_min, y_max) = value_range(series.stats());

        let root = BitMapBackend::new(&path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(&caption, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(0f64..bins as f64, y_min..y_max)?;

        let mut mesh = chart.configure_mesh();
        if let Some(label) = &options.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &options.y_label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw()?;

        chart.draw_series(LineSeries::new(
            series
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(|(i, v)| (i as f64, *v)),
            &BLUE,
        ))?;
        root.present()?;
        Ok(())
    }

    fn render_field(
        &self,
        run_number: i32,
        field: &Field,
        options: &PlotOptions,
        out_dir: &Path,
    ) -> Result<(), RenderError> {
        let path = out_dir.join(output_filename(&field.name));
        let caption = caption_for(run_number, options.title.as_deref(), &field.name);
        let (rows, cols) = field.shape();
        let (z_min, z_max) = match field.stats() {
            Some(s) if s.max > s.min => (s.min, s.max),
            Some(s) => (s.min - 0.5, s.max + 0.5),
            None => (0.0, 1.0),
        };

        let root = BitMapBackend::new(&path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let (chart_area, bar_area) = root.split_horizontally(self.width as i32 - 90);

        let mut chart = ChartBuilder::on(&chart_area)
            .caption(&caption, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(0f64..cols.max(1) as f64, 0f64..rows.max(1) as f64)?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh();
        if let Some(label) = &options.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &options.y_label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw()?;

        for ((row, col), value) in field.values.indexed_iter() {
            if !value.is_finite() {
                continue;
            }
            let norm = ((value - z_min) / (z_max - z_min)).clamp(0.0, 1.0);
            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (col as f64, row as f64),
                    ((col + 1) as f64, (row + 1) as f64),
                ],
                ViridisRGB.get_color(norm).filled(),
            )))?;
        }

        draw_color_bar(&bar_area, z_min, z_max, options.z_label.as_deref())?;
        root.present()?;
        Ok(())
    }
}

/// Draw a vertical Viridis color bar with min/max labels and an optional
/// rotated axis title into the given strip.
pub(crate) fn draw_color_bar(
    area: &DrawingArea<BitMapBackend, Shift>,
    z_min: f64,
    z_max: f64,
    title: Option<&str>,
) -> Result<(), RenderError> {
    let (width, height) = area.dim_in_pixel();
    let top_margin = 30i32;
    let bottom_margin = 30i32;
    let usable_height = (height as i32).saturating_sub(top_margin + bottom_margin);
    if usable_height > 1 {
        for i in 0..usable_height {
            let frac = 1.0 - (i as f64 / (usable_height - 1) as f64);
            let color = ViridisRGB.get_color(frac);
            area.draw(&Rectangle::new(
                [(8, top_margin + i), (28, top_margin + i + 1)],
                color.filled(),
            ))?;
        }
    }

    let label_font = ("sans-serif", 16).into_font();
    area.draw(&Text::new(
        format!("{z_max:.2}"),
        (32, top_margin - 8),
        label_font.clone(),
    ))?;
    area.draw(&Text::new(
        format!("{z_min:.2}"),
        (32, top_margin + usable_height - 8),
        label_font,
    ))?;

    if let Some(text) = title {
        area.draw(&Text::new(
            text.to_string(),
            (width as i32 - 10, top_margin + usable_height / 2 + 40),
            ("sans-serif", 18)
                .into_font()
                .transform(FontTransform::Rotate270),
        ))?;
    }
    Ok(())
}
