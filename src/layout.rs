//! Project layout and rendering configuration.
//!
//! All inputs live under `<root>/data/csv` and all charts are written to
//! `<root>/data/png`; file names are fixed.

use std::path::{Path, PathBuf};

/// Input and output file names relative to the data directories
pub mod files {
    pub const SUMMARY: &str = "summary.csv";
    pub const HC_HISTORY: &str = "hc_history.csv";
    pub const BEAM_HISTORY: &str = "beam_history.csv";
    pub const SA_HISTORY: &str = "sa_history.csv";

    pub const ALGORITHMS_SCORE: &str = "algorithms_score";
    pub const ALGORITHMS_METRICS: &str = "algorithms_metrics";
    pub const HC_CONVERGENCE: &str = "hc_convergence";
    pub const BEAM_CONVERGENCE: &str = "beam_convergence";
    pub const SA_TEMPERATURE_SCORE: &str = "sa_temperature_score";
    pub const SA_TEMPERATURE_SCORE_SMOOTH: &str = "sa_temperature_score_smooth";
}

/// Directory structure rooted at the project root
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Project root
    pub root: PathBuf,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        ProjectLayout {
            root: PathBuf::from("."),
        }
    }
}

impl ProjectLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        ProjectLayout {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the experiment CSV files
    pub fn csv_dir(&self) -> PathBuf {
        self.root.join("data").join("csv")
    }

    /// Directory receiving rendered charts
    pub fn png_dir(&self) -> PathBuf {
        self.root.join("data").join("png")
    }

    pub fn input(&self, file_name: &str) -> PathBuf {
        self.csv_dir().join(file_name)
    }

    /// Output path for a chart stem, with the extension of `format`
    pub fn output(&self, stem: &str, format: ImageFormat) -> PathBuf {
        self.png_dir().join(stem).with_extension(format.extension())
    }
}

/// Image format written for each chart
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ImageFormat {
    /// Rasterised PNG (falls back to SVG if rasterisation fails)
    #[default]
    Png,
    /// Vector SVG, written as composed
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Output image format
    pub format: ImageFormat,
    /// Output resolution; SVG canvases use 100 units per inch
    pub dpi: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            format: ImageFormat::Png,
            dpi: 200.0,
        }
    }
}

impl RenderConfig {
    /// Raster scale applied to the SVG canvas
    pub fn scale(&self) -> f32 {
        (self.dpi / 100.0).max(0.1)
    }
}
