//! Chart selection and PNG rendering (plotters bitmap backend).
//!
//! The core picks the chart kind and column; rasterization sits behind the
//! [`Renderer`] capability trait so tests can substitute a fake and a host
//! can plug in its own backend.

use crate::aggregate::{frequency_table, FrequencyTable};
use crate::config::BotConfig;
use crate::dataset::{extract_numeric, Dataset};
use chrono::Local;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use plotters::style::RGBColor;
use std::path::{Path, PathBuf};

/// Kind of chart to draw for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Histogram,
    Bar,
}

impl ChartKind {
    pub const ALL: [Self; 3] = [Self::Pie, Self::Histogram, Self::Bar];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pie => "pie",
            Self::Histogram => "histogram",
            Self::Bar => "bar",
        }
    }

    /// Emoji prefix for the chart caption.
    fn marker(self) -> &'static str {
        match self {
            Self::Pie => "🟢",
            Self::Histogram => "📈",
            Self::Bar => "📊",
        }
    }
}

/// A chart request: the resolved column, the chosen kind and a caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub column: String,
    pub kind: ChartKind,
    pub title: String,
}

/// Picks a chart kind for a column: designated numeric columns get a
/// histogram; low-cardinality categorical columns a pie; everything else a
/// bar chart.
pub fn select_kind(dataset: &Dataset, config: &BotConfig, column: &str) -> ChartKind {
    if config.is_numeric_column(column) {
        return ChartKind::Histogram;
    }
    let distinct = frequency_table(dataset, column)
        .map(|t| t.distinct_count())
        .unwrap_or(0);
    if distinct > 0 && distinct <= config.chart.pie_max_categories {
        ChartKind::Pie
    } else {
        ChartKind::Bar
    }
}

/// Builds a chart request for a resolved column.
pub fn chart_spec(
    dataset: &Dataset,
    config: &BotConfig,
    column: &str,
    title: impl Into<String>,
) -> ChartSpec {
    ChartSpec {
        column: column.to_string(),
        kind: select_kind(dataset, config, column),
        title: title.into(),
    }
}

/// Chart rasterization capability. Returns the path of the written image.
pub trait Renderer {
    fn render(&self, dataset: &Dataset, spec: &ChartSpec, config: &BotConfig) -> Result<PathBuf>;
}

/// Truncates a category label for axis/legend display.
fn truncate_label(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

// Soft categorical palette (ColorBrewer Set3).
const PALETTE: [RGBColor; 8] = [
    RGBColor(141, 211, 199),
    RGBColor(255, 255, 179),
    RGBColor(190, 186, 218),
    RGBColor(251, 128, 114),
    RGBColor(128, 177, 211),
    RGBColor(253, 180, 98),
    RGBColor(179, 222, 105),
    RGBColor(252, 205, 229),
];

const HISTOGRAM_COLOR: RGBColor = RGBColor(76, 114, 176);

/// PNG renderer writing timestamped files into an output directory.
pub struct PlottersRenderer {
    out_dir: PathBuf,
    size: (u32, u32),
}

impl PlottersRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            size: (900, 600),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    fn output_path(&self, spec: &ChartSpec) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d-%H%M%S%.3f");
        self.out_dir
            .join(format!("{}-{}.png", spec.kind.as_str(), stamp))
    }
}

impl Renderer for PlottersRenderer {
    fn render(&self, dataset: &Dataset, spec: &ChartSpec, config: &BotConfig) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.output_path(spec);
        let caption = format!("{} {}", spec.kind.marker(), spec.title);
        match spec.kind {
            ChartKind::Pie => {
                let table = frequency_table(dataset, &spec.column)
                    .ok_or_else(|| eyre!("Unknown column: {}", spec.column))?;
                write_pie_png(&path, &table, &caption, config, self.size)?;
            }
            ChartKind::Bar => {
                let table = frequency_table(dataset, &spec.column)
                    .ok_or_else(|| eyre!("Unknown column: {}", spec.column))?;
                write_bar_png(&path, &table, &spec.column, &caption, config, self.size)?;
            }
            ChartKind::Histogram => {
                let values = dataset
                    .column(&spec.column)
                    .ok_or_else(|| eyre!("Unknown column: {}", spec.column))?;
                let numbers = extract_numeric(&values);
                write_histogram_png(&path, &numbers, &spec.column, &caption, config, self.size)?;
            }
        }
        Ok(path)
    }
}

/// Write a pie chart to PNG. One wedge per distinct value, percentage labels.
fn write_pie_png(
    path: &Path,
    table: &FrequencyTable,
    caption: &str,
    config: &BotConfig,
    (width, height): (u32, u32),
) -> Result<()> {
    use plotters::prelude::*;

    if table.is_empty() {
        return Err(eyre!("No data to draw"));
    }

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(caption, ("sans-serif", 24))?;

    let sizes: Vec<f64> = table.entries().iter().map(|(_, c)| *c as f64).collect();
    let labels: Vec<String> = table
        .entries()
        .iter()
        .map(|(v, _)| truncate_label(v, config.chart.label_max_chars))
        .collect();
    let colors: Vec<RGBColor> = (0..sizes.len()).map(|i| PALETTE[i % PALETTE.len()]).collect();

    let center = (width as i32 / 2, height as i32 / 2);
    let radius = (width.min(height) as f64) * 0.35;
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(140.0);
    pie.label_style(("sans-serif", 18).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 14).into_font().color(&BLACK));
    root.draw(&pie)?;

    root.present()?;
    Ok(())
}

/// Write a bar chart to PNG: one bar per distinct value, counts on top.
fn write_bar_png(
    path: &Path,
    table: &FrequencyTable,
    column: &str,
    caption: &str,
    config: &BotConfig,
    (width, height): (u32, u32),
) -> Result<()> {
    use plotters::prelude::*;

    let entries = table.entries();
    if entries.is_empty() {
        return Err(eyre!("No data to draw"));
    }
    let n = entries.len();
    let y_max = entries.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .caption(caption, ("sans-serif", 24))
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max * 1.15)?;

    let labels: Vec<String> = entries
        .iter()
        .map(|(v, _)| truncate_label(v, config.chart.label_max_chars))
        .collect();
    let x_formatter = move |v: &f64| {
        let i = v.round();
        if (v - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < labels.len() {
            labels[i as usize].clone()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_formatter)
        .x_desc(column)
        .y_desc("Количество")
        .draw()?;

    chart.draw_series(entries.iter().enumerate().map(|(i, (_, count))| {
        Rectangle::new(
            [(i as f64 - 0.3, 0.0), (i as f64 + 0.3, *count as f64)],
            PALETTE[i % PALETTE.len()].filled(),
        )
    }))?;
    chart.draw_series(entries.iter().enumerate().map(|(i, (_, count))| {
        Text::new(
            count.to_string(),
            (i as f64, *count as f64 + y_max * 0.02),
            ("sans-serif", 14),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Write a histogram to PNG with fixed-width bins starting at the minimum.
fn write_histogram_png(
    path: &Path,
    values: &[f64],
    column: &str,
    caption: &str,
    config: &BotConfig,
    (width, height): (u32, u32),
) -> Result<()> {
    use plotters::prelude::*;

    if values.is_empty() {
        return Err(eyre!("No data to draw"));
    }
    let bin_width = config.chart.histogram_bin_width.max(1.0);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min).floor();
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let bins = (((max - min) / bin_width).floor() as usize) + 1;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / bin_width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let y_max = counts.iter().copied().max().unwrap_or(1) as f64;
    let x_end = min + bins as f64 * bin_width;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .caption(caption, ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(min..x_end, 0f64..y_max * 1.15)?;

    chart
        .configure_mesh()
        .x_desc(column)
        .y_desc("Количество")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
        let x0 = min + i as f64 * bin_width;
        Rectangle::new(
            [(x0, 0.0), (x0 + bin_width, count as f64)],
            HISTOGRAM_COLOR.filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}
