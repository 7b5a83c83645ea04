//! Chart pipelines: load a result table, derive series, render, persist.
//!
//! Each pipeline hands one [`PlotOutcome`] per chart to an [`OutcomeSink`]
//! as soon as that chart is done. Recoverable input problems become
//! [`PlotOutcome::Skipped`]; only failures to write into the output
//! directory are returned as errors, after the earlier outcomes were recorded.

pub mod annealing;
pub mod comparison;
pub mod convergence;

use crate::error::PlotError;
use crate::layout::{ImageFormat, ProjectLayout, RenderConfig};
use crate::visualization::ChartRenderer;
use std::path::PathBuf;

/// Result of one rendering step
#[derive(Debug)]
pub enum PlotOutcome {
    /// Chart written to this path
    Saved(PathBuf),
    /// PNG rasterisation failed, the SVG was written instead
    SavedSvgFallback { path: PathBuf, reason: String },
    /// Input missing or unusable; nothing was written
    Skipped(PlotError),
}

impl PlotOutcome {
    /// Human-readable status line
    pub fn status_line(&self) -> String {
        match self {
            PlotOutcome::Saved(path) => format!("[OK] Saved chart: {}", path.display()),
            PlotOutcome::SavedSvgFallback { path, reason } => format!(
                "[WARN] PNG conversion failed ({}). Saved SVG to {}",
                reason,
                path.display()
            ),
            PlotOutcome::Skipped(err) => format!("[WARN] {}", err),
        }
    }

    pub fn is_saved(&self) -> bool {
        !matches!(self, PlotOutcome::Skipped(_))
    }
}

/// Receives each outcome as soon as its chart is finished
pub trait OutcomeSink {
    fn record(&mut self, outcome: PlotOutcome);
}

impl OutcomeSink for Vec<PlotOutcome> {
    fn record(&mut self, outcome: PlotOutcome) {
        self.push(outcome);
    }
}

/// Prints one status line per outcome on stdout
pub struct StatusPrinter;

impl OutcomeSink for StatusPrinter {
    fn record(&mut self, outcome: PlotOutcome) {
        println!("{}", outcome.status_line());
    }
}

/// Turn a recoverable error into a skipped outcome, pass others through.
pub(crate) fn recover<T>(
    result: Result<T, PlotError>,
) -> Result<Result<T, PlotOutcome>, PlotError> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(err) if err.is_recoverable() => {
            log::debug!("Skipping chart: {}", err);
            Ok(Err(PlotOutcome::Skipped(err)))
        }
        Err(err) => Err(err),
    }
}

/// Where charts come from and go to, and how they are written
#[derive(Debug, Clone, Default)]
pub struct PlotContext {
    pub layout: ProjectLayout,
    pub config: RenderConfig,
}

impl PlotContext {
    pub fn new(layout: ProjectLayout, config: RenderConfig) -> Self {
        PlotContext { layout, config }
    }

    /// Renderer for a figure of `width_in` x `height_in` inches
    pub fn renderer(&self, width_in: f64, height_in: f64) -> ChartRenderer {
        ChartRenderer::with_size(width_in * 100.0, height_in * 100.0).scale(self.config.scale())
    }

    /// Create the output directory if absent
    pub fn ensure_output_dir(&self) -> Result<(), PlotError> {
        let dir = self.layout.png_dir();
        std::fs::create_dir_all(&dir).map_err(|e| PlotError::io(&dir, e))
    }

    /// Write a composed chart under the output directory, creating it if
    /// needed. A PNG that cannot be rasterised is written as SVG instead.
    pub fn persist(
        &self,
        renderer: &ChartRenderer,
        svg: &str,
        stem: &str,
    ) -> Result<PlotOutcome, PlotError> {
        self.ensure_output_dir()?;

        let path = self.layout.output(stem, self.config.format);
        match self.config.format {
            ImageFormat::Svg => {
                renderer.save_svg(svg, &path)?;
                Ok(PlotOutcome::Saved(path))
            }
            ImageFormat::Png => match renderer.save_png(svg, &path) {
                Ok(()) => Ok(PlotOutcome::Saved(path)),
                Err(PlotError::Render { reason, .. }) => {
                    log::warn!("PNG conversion of {} failed: {}", path.display(), reason);
                    let svg_path = self.layout.output(stem, ImageFormat::Svg);
                    renderer.save_svg(svg, &svg_path)?;
                    Ok(PlotOutcome::SavedSvgFallback {
                        path: svg_path,
                        reason,
                    })
                }
                Err(err) => Err(err),
            },
        }
    }
}

/// Run the three pipelines in sequence.
pub fn render_all(ctx: &PlotContext, sink: &mut dyn OutcomeSink) -> Result<(), PlotError> {
    comparison::run(ctx, sink)?;
    convergence::run(ctx, sink)?;
    annealing::run(ctx, sink)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::layout::files;

    #[test]
    fn test_status_lines() {
        let saved = PlotOutcome::Saved(PathBuf::from("data/png/hc_convergence.png"));
        assert_eq!(saved.status_line(), "[OK] Saved chart: data/png/hc_convergence.png");

        let missing = PlotError::MissingInput(PathBuf::from("data/csv/summary.csv"));
        let skipped = PlotOutcome::Skipped(missing);
        assert_eq!(skipped.status_line(), "[WARN] File data/csv/summary.csv not found");
        assert!(!skipped.is_saved());
    }

    #[test]
    fn test_render_all_without_inputs_only_warns() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = svg_context(dir.path());

        let mut outcomes = Vec::new();
        render_all(&ctx, &mut outcomes).unwrap();
        // summary (1) + hc, beam (2) + sa (1)
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(|o| !o.is_saved()));
        assert!(ctx.layout.png_dir().is_dir());
    }

    #[test]
    fn test_render_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = svg_context(dir.path());
        write_input(&ctx, files::HC_HISTORY, "iter,score\n0,0.5\n1,0.6\n2,0.65\n");

        let chart_path = ctx.layout.output(files::HC_CONVERGENCE, ImageFormat::Svg);
        let status = |ctx: &PlotContext| -> Vec<String> {
            let mut outcomes = Vec::new();
            render_all(ctx, &mut outcomes).unwrap();
            outcomes.iter().map(PlotOutcome::status_line).collect()
        };

        let first = status(&ctx);
        let chart = std::fs::read_to_string(&chart_path).unwrap();
        let second = status(&ctx);
        let again = std::fs::read_to_string(&chart_path).unwrap();

        assert_eq!(first, second);
        assert_eq!(chart, again);
    }

    #[test]
    fn test_png_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = svg_context(dir.path());
        ctx.config = RenderConfig {
            format: ImageFormat::Png,
            dpi: 100.0,
        };
        write_input(&ctx, files::BEAM_HISTORY, "iter,score\n0,0.5\n1,0.6\n");

        let mut outcomes = Vec::new();
        convergence::run(&ctx, &mut outcomes).unwrap();
        let png = ctx.layout.output(files::BEAM_CONVERGENCE, ImageFormat::Png);
        assert!(matches!(&outcomes[1], PlotOutcome::Saved(path) if *path == png));
        assert!(png.exists());
    }

    #[test]
    fn test_fatal_error_keeps_earlier_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = svg_context(dir.path());
        write_input(&ctx, files::HC_HISTORY, "iter,score\n0,0.5\n1,0.6\n");
        write_input(&ctx, files::BEAM_HISTORY, "iter,score\n0,0.5\n1,0.55\n");
        // a directory where the Beam chart should go makes its write fail
        let beam = ctx.layout.output(files::BEAM_CONVERGENCE, ImageFormat::Svg);
        std::fs::create_dir_all(&beam).unwrap();

        let mut outcomes = Vec::new();
        let err = convergence::run(&ctx, &mut outcomes).unwrap_err();

        assert!(matches!(err, PlotError::Io { .. }));
        assert!(!err.is_recoverable());
        assert_eq!(outcomes.len(), 1);
        let hc = ctx.layout.output(files::HC_CONVERGENCE, ImageFormat::Svg);
        assert_eq!(outcomes[0].status_line(), format!("[OK] Saved chart: {}", hc.display()));
        assert!(hc.exists());
    }
}
