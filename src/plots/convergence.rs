//! Convergence curves of Hill Climbing and Beam Search.

use super::{recover, OutcomeSink, PlotContext, PlotOutcome};
use crate::dataset::{load_history, Table};
use crate::error::PlotError;
use crate::layout::files;
use crate::visualization::{ChartLabels, LineSeries};

/// History files rendered by [`run`]: input, chart title, output stem
pub const HISTORIES: [(&str, &str, &str); 2] = [
    (
        files::HC_HISTORY,
        "Hill Climbing: convergence by iteration",
        files::HC_CONVERGENCE,
    ),
    (
        files::BEAM_HISTORY,
        "Beam Search: convergence by iteration",
        files::BEAM_CONVERGENCE,
    ),
];

/// Render every history file; each one is skipped independently.
pub fn run(ctx: &PlotContext, sink: &mut dyn OutcomeSink) -> Result<(), PlotError> {
    ctx.ensure_output_dir()?;
    for &(input, title, stem) in &HISTORIES {
        sink.record(plot_convergence(ctx, input, title, stem)?);
    }
    Ok(())
}

/// Score against iteration as a marked line.
pub fn plot_convergence(
    ctx: &PlotContext,
    input: &str,
    title: &str,
    stem: &str,
) -> Result<PlotOutcome, PlotError> {
    let path = ctx.layout.input(input);
    let table = match recover(load_history(&path).and_then(Table::require_rows))? {
        Ok(table) => table,
        Err(skipped) => return Ok(skipped),
    };

    let iters = table.column(|r| r.iter as f64);
    let scores = table.column(|r| r.score);
    log::debug!("{}: {} steps", input, table.len());

    let renderer = ctx.renderer(8.0, 5.0);
    let svg = renderer.line_chart_svg(
        &ChartLabels {
            title,
            x_label: "Iteration",
            y_label: "Objective value (score)",
        },
        &LineSeries {
            label: "score",
            xs: &iters,
            ys: &scores,
        },
        true,
    );

    ctx.persist(&renderer, &svg, stem)
}
