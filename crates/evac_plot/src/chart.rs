pub mod layout;
pub mod pdf;
pub mod scene;
pub mod svg;

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::constants::*;
use crate::dataset::Dataset;
use crate::error::Result;

pub use layout::{AxisScale, build_bar_chart, nice_ticks};
pub use scene::{Anchor, Rgb, Scene, Shape};

/// Output file format
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChartFormat {
    #[default]
    Pdf,
    Svg,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Pdf => "pdf",
            ChartFormat::Svg => "svg",
        }
    }

    /// Guesses the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

/// Page margins around the plot area (pt)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Bar chart rendering options
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margins: Margins,

    /// Bar width in group units
    pub bar_width: f32,
    /// Number of series actually drawn, taken from the front of the method list
    pub rendered_series: usize,

    pub label_font_size: f32,
    pub tick_font_size: f32,

    pub show_title: bool,
    pub show_legend: bool,
    pub show_grid: bool,
    /// Value label above each bar
    pub annotate: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width_pt: FIGURE_WIDTH_IN * POINTS_PER_INCH,
            height_pt: FIGURE_HEIGHT_IN * POINTS_PER_INCH,
            margins: Margins {
                left: 82.0,
                right: 16.0,
                top: 16.0,
                bottom: 58.0,
            },
            bar_width: BAR_WIDTH,
            rendered_series: DEFAULT_RENDERED_SERIES,
            label_font_size: AXIS_LABEL_FONT_SIZE,
            tick_font_size: AXIS_TICK_FONT_SIZE,
            show_title: false,
            show_legend: true,
            show_grid: true,
            annotate: false,
        }
    }
}

/// Lays out the chart and writes it in `format`
pub fn render_chart<W: Write>(
    dataset: &Dataset,
    opt: &ChartOptions,
    format: ChartFormat,
    w: &mut W,
) -> Result<()> {
    let scene = build_bar_chart(dataset, opt)?;
    write_scene(&scene, format, w)
}

pub fn write_scene<W: Write>(scene: &Scene, format: ChartFormat, w: &mut W) -> Result<()> {
    match format {
        ChartFormat::Pdf => pdf::write_pdf(scene, w)?,
        ChartFormat::Svg => svg::write_svg(scene, w)?,
    }
    Ok(())
}
