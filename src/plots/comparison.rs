//! Final comparison of the search algorithms from `summary.csv`.
//!
//! Produces `algorithms_score` (one bar per algorithm) and
//! `algorithms_metrics` (accuracy, F1 and inverted latency side by side).

use super::{recover, OutcomeSink, PlotContext, PlotOutcome};
use crate::dataset::{inverted_latency, load_summary, SummaryRecord, Table};
use crate::error::PlotError;
use crate::layout::files;
use crate::visualization::{BarSeries, ChartLabels};

/// Offset between the grouped bars of one algorithm, in category slots
pub const GROUP_BAR_WIDTH: f64 = 0.25;

pub fn run(ctx: &PlotContext, sink: &mut dyn OutcomeSink) -> Result<(), PlotError> {
    ctx.ensure_output_dir()?;
    let path = ctx.layout.input(files::SUMMARY);
    log::info!("Rendering algorithm comparison from {}", path.display());

    let table = match recover(load_summary(&path).and_then(Table::require_rows))? {
        Ok(table) => table,
        Err(skipped) => {
            sink.record(skipped);
            return Ok(());
        }
    };

    sink.record(plot_score(ctx, &table.rows)?);
    sink.record(plot_metrics(ctx, &table.rows)?);
    Ok(())
}

fn algorithm_names(rows: &[SummaryRecord]) -> Vec<String> {
    rows.iter().map(|r| r.algorithm.clone()).collect()
}

/// Bar chart of the objective value, in row order.
pub fn plot_score(ctx: &PlotContext, rows: &[SummaryRecord]) -> Result<PlotOutcome, PlotError> {
    let renderer = ctx.renderer(6.0, 4.0);
    let scores: Vec<f64> = rows.iter().map(|r| r.score).collect();

    let svg = renderer.bar_chart_svg(
        &ChartLabels {
            title: "Algorithm comparison by objective function",
            x_label: "Algorithm",
            y_label: "Objective value (score)",
        },
        &algorithm_names(rows),
        &scores,
    );

    ctx.persist(&renderer, &svg, files::ALGORITHMS_SCORE)
}

/// Grouped bars of accuracy, F1 and `max(latency) - latency`.
pub fn plot_metrics(
    ctx: &PlotContext,
    rows: &[SummaryRecord],
) -> Result<PlotOutcome, PlotError> {
    let renderer = ctx.renderer(7.0, 5.0);
    let accuracy: Vec<f64> = rows.iter().map(|r| r.accuracy).collect();
    let f1: Vec<f64> = rows.iter().map(|r| r.f1).collect();
    let inv_latency = inverted_latency(rows);

    let svg = renderer.grouped_bar_chart_svg(
        &ChartLabels {
            title: "Comparison of accuracy / F1 / latency",
            x_label: "Algorithm",
            y_label: "Metric value (relative)",
        },
        &algorithm_names(rows),
        &[
            BarSeries { label: "accuracy", values: &accuracy },
            BarSeries { label: "F1", values: &f1 },
            BarSeries { label: "(max_latency - latency)", values: &inv_latency },
        ],
        GROUP_BAR_WIDTH,
    );

    ctx.persist(&renderer, &svg, files::ALGORITHMS_METRICS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ImageFormat;
    use crate::plots::test_support::*;

    const SUMMARY: &str = "algorithm,accuracy,f1,latency,score\n\
                           HC,0.8,0.78,1.2,10\n\
                           Beam,0.82,0.80,1.5,12\n\
                           SA,0.79,0.77,0.9,9\n";

    #[test]
    fn test_both_charts_written() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = svg_context(dir.path());
        write_input(&ctx, files::SUMMARY, SUMMARY);

        let mut outcomes = Vec::new();
        run(&ctx, &mut outcomes).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(PlotOutcome::is_saved));

        let score_path = ctx.layout.output(files::ALGORITHMS_SCORE, ImageFormat::Svg);
        let score = std::fs::read_to_string(score_path).unwrap();
        let hc = score.find(">HC</text>").unwrap();
        let beam = score.find(">Beam</text>").unwrap();
        let sa = score.find(">SA</text>").unwrap();
        assert!(hc < beam && beam < sa);

        let metrics_path = ctx.layout.output(files::ALGORITHMS_METRICS, ImageFormat::Svg);
        let metrics = std::fs::read_to_string(metrics_path).unwrap();
        assert_eq!(metrics.matches(r#"class="bar""#).count(), 9);
    }

    #[test]
    fn test_missing_summary() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = svg_context(dir.path());

        let mut outcomes = Vec::new();
        run(&ctx, &mut outcomes).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], PlotOutcome::Skipped(PlotError::MissingInput(_))));
        assert!(ctx.layout.png_dir().is_dir());
        assert!(!ctx.layout.output(files::ALGORITHMS_SCORE, ImageFormat::Svg).exists());
    }

    #[test]
    fn test_invalid_summary_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = svg_context(dir.path());
        write_input(&ctx, files::SUMMARY, "algorithm,accuracy,f1,score\nHC,0.8,0.78,10\n");

        let mut outcomes = Vec::new();
        run(&ctx, &mut outcomes).unwrap();
        assert_eq!(outcomes.len(), 1);
        let schema_error = &outcomes[0];
        assert!(matches!(schema_error, PlotOutcome::Skipped(PlotError::InvalidSchema { .. })));
        assert!(!ctx.layout.output(files::ALGORITHMS_SCORE, ImageFormat::Svg).exists());
        assert!(!ctx.layout.output(files::ALGORITHMS_METRICS, ImageFormat::Svg).exists());
    }
}
