//! Simulated annealing process: temperature against smoothed score.
//!
//! Two figures are produced from `sa_history.csv`, one per [`Smoothing`]
//! level. Rows before the first full window are dropped, so the two lines
//! may start at different iterations.

use super::{recover, OutcomeSink, PlotContext, PlotOutcome};
use crate::dataset::{load_annealing, AnnealingRecord, Table};
use crate::error::PlotError;
use crate::layout::files;
use crate::smoothing::{SmoothedSeries, Smoothing};
use crate::visualization::{DualAxisLabels, LineSeries};
use std::path::Path;

pub fn run(ctx: &PlotContext, sink: &mut dyn OutcomeSink) -> Result<(), PlotError> {
    ctx.ensure_output_dir()?;
    let path = ctx.layout.input(files::SA_HISTORY);
    log::info!("Rendering annealing process from {}", path.display());

    let table = match recover(load_annealing(&path).and_then(Table::require_rows))? {
        Ok(table) => table,
        Err(skipped) => {
            sink.record(skipped);
            return Ok(());
        }
    };

    let worse = table.rows.iter().filter(|r| r.accepted_worse()).count();
    log::debug!("{} annealing steps, {} worse moves accepted", table.len(), worse);

    for smoothing in Smoothing::ALL {
        sink.record(plot_smoothed(ctx, &table.path, &table.rows, smoothing)?);
    }
    Ok(())
}

/// One dual-axis figure for a smoothing level.
pub fn plot_smoothed(
    ctx: &PlotContext,
    source: &Path,
    records: &[AnnealingRecord],
    smoothing: Smoothing,
) -> Result<PlotOutcome, PlotError> {
    let window = smoothing.window(records.len());
    let series = SmoothedSeries::from_records(records, window);
    log::debug!(
        "{}: window {}, {} of {} rows kept",
        smoothing.label(),
        window,
        series.len(),
        records.len()
    );

    if series.is_empty() {
        return Ok(PlotOutcome::Skipped(PlotError::InsufficientRows {
            path: source.to_path_buf(),
            rows: records.len(),
            window,
        }));
    }

    let title = format!(
        "Simulated annealing: temperature and quality by iteration ({})",
        smoothing.label()
    );
    let mut renderer = ctx.renderer(11.0, 6.0);
    // room for the secondary axis
    renderer.margin_right = renderer.margin_left;

    let svg = renderer.dual_axis_chart_svg(
        &DualAxisLabels {
            title: &title,
            x_label: "Iteration",
            left_label: "Temperature T",
            right_label: "Objective value (score)",
        },
        &LineSeries {
            label: "Temperature T",
            xs: &series.iters,
            ys: &series.temperature,
        },
        &LineSeries {
            label: "Objective (score, smoothed)",
            xs: &series.iters,
            ys: &series.score,
        },
    );

    ctx.persist(&renderer, &svg, smoothing.output_stem())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ImageFormat;
    use crate::plots::test_support::*;

    fn history(n: usize) -> String {
        let mut csv = String::from("iter,T,score,accepted_worse\n");
        let mut t = 1.5;
        for i in 0..n {
            let flag = if i % 2 == 0 { "false" } else { "true" };
            csv.push_str(&format!("{},{},{},{}\n", i, t, 0.6 + i as f64 * 0.001, flag));
            t *= 0.995;
        }
        csv
    }

    #[test]
    fn test_long_history_renders_both() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = svg_context(dir.path());
        write_input(&ctx, files::SA_HISTORY, &history(300));

        let mut outcomes = Vec::new();
        run(&ctx, &mut outcomes).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(PlotOutcome::is_saved));

        let moderate_path = ctx.layout.output(files::SA_TEMPERATURE_SCORE, ImageFormat::Svg);
        let moderate = std::fs::read_to_string(moderate_path).unwrap();
        assert!(moderate.contains("(moderate smoothing)"));
        assert!(moderate.contains("Objective (score, smoothed)"));

        let strong_path = ctx.layout.output(files::SA_TEMPERATURE_SCORE_SMOOTH, ImageFormat::Svg);
        let strong = std::fs::read_to_string(strong_path).unwrap();
        assert!(strong.contains("(strong smoothing)"));
    }

    #[test]
    fn test_short_history_skips_strong_only() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = svg_context(dir.path());
        write_input(&ctx, files::SA_HISTORY, &history(9));

        let mut outcomes = Vec::new();
        run(&ctx, &mut outcomes).unwrap();
        assert!(outcomes[0].is_saved());
        match &outcomes[1] {
            PlotOutcome::Skipped(PlotError::InsufficientRows { rows, window, .. }) => {
                assert_eq!(*rows, 9);
                assert_eq!(*window, 10);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        let strong_path = ctx.layout.output(files::SA_TEMPERATURE_SCORE_SMOOTH, ImageFormat::Svg);
        assert!(!strong_path.exists());
    }

    #[test]
    fn test_ten_rows_strong_keeps_one_point() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = svg_context(dir.path());
        write_input(&ctx, files::SA_HISTORY, &history(10));

        let mut outcomes = Vec::new();
        run(&ctx, &mut outcomes).unwrap();
        assert!(outcomes.iter().all(PlotOutcome::is_saved));
    }

    #[test]
    fn test_missing_temperature_column() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = svg_context(dir.path());
        write_input(&ctx, files::SA_HISTORY, "iter,score\n0,0.5\n");

        let mut outcomes = Vec::new();
        run(&ctx, &mut outcomes).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], PlotOutcome::Skipped(PlotError::InvalidSchema { .. })));
        assert!(ctx.layout.png_dir().is_dir());
        assert!(!ctx.layout.output(files::SA_TEMPERATURE_SCORE, ImageFormat::Svg).exists());
    }
}
