//! Experiment driver producing the CSV inputs of the charts.
//!
//! Runs Hill Climbing and Beam Search from a shared random start and
//! Simulated Annealing from the middle of the search space, then exports the
//! three iteration histories and the final summary.

use crate::dataset::SummaryRecord;
use crate::error::PlotError;
use crate::heuristics::{
    BeamSearch, HillClimbing, SearchOutcome, SearchStrategy, SimulatedAnnealing,
};
use crate::layout::{files, ProjectLayout};
use crate::model::{evaluate_model, Bounds, HyperParams};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Experiment configuration
pub struct ExperimentConfig {
    /// Random seed
    pub seed: u64,
    pub bounds: Bounds,
    pub hill_climbing: HillClimbing,
    pub beam_search: BeamSearch,
    pub annealing: SimulatedAnnealing,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            seed: 42,
            bounds: Bounds::default(),
            hill_climbing: HillClimbing::new(),
            beam_search: BeamSearch::default(),
            annealing: SimulatedAnnealing::new(),
        }
    }
}

impl ExperimentConfig {
    pub fn with_seed(seed: u64) -> Self {
        ExperimentConfig {
            seed,
            ..Default::default()
        }
    }
}

/// Experiment engine
pub struct Experiment {
    config: ExperimentConfig,
    start: Option<HyperParams>,
    summary: Vec<SummaryRecord>,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Self {
        Experiment {
            config,
            start: None,
            summary: Vec::new(),
        }
    }

    /// Run the three searches and write their CSV files under `layout`.
    pub fn run(&mut self, layout: &ProjectLayout) -> Result<(), PlotError> {
        let csv_dir = layout.csv_dir();
        std::fs::create_dir_all(&csv_dir).map_err(|e| PlotError::io(&csv_dir, e))?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let bounds = &self.config.bounds;
        let start = bounds.random(&mut rng);
        self.start = Some(start);
        log::info!("Start hyper-parameters: {} -> {}", start, evaluate_model(&start));

        self.summary.clear();

        let hc = &self.config.hill_climbing;
        let outcome = hc.search(&start, bounds, &mut rng);
        export_to_csv(layout.input(files::HC_HISTORY), &outcome.history)?;
        let hc_row = summary_row(hc.name(), &outcome);

        let beam = &self.config.beam_search;
        let outcome = beam.search(&start, bounds, &mut rng);
        export_to_csv(layout.input(files::BEAM_HISTORY), &outcome.history)?;
        let beam_row = summary_row(beam.name(), &outcome);

        let sa = &self.config.annealing;
        let outcome = sa.search(&bounds.midpoint(), bounds, &mut rng);
        export_to_csv(layout.input(files::SA_HISTORY), &outcome.history)?;
        let sa_row = summary_row(sa.name(), &outcome);

        self.summary = vec![hc_row, beam_row, sa_row];
        export_to_csv(layout.input(files::SUMMARY), &self.summary)?;

        Ok(())
    }

    /// Final result per algorithm, in run order
    pub fn summary(&self) -> &[SummaryRecord] {
        &self.summary
    }

    /// Export the summary as pretty JSON
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> Result<(), PlotError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.summary).map_err(|source| PlotError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|e| PlotError::io(path, e))
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("   Hyper-parameter Search Report\n");
        report.push_str("========================================\n\n");

        if let Some(start) = &self.start {
            report.push_str(&format!("Seed: {}\n", self.config.seed));
            report.push_str(&format!("Start: {} -> {}\n\n", start, evaluate_model(start)));
        }

        report.push_str(&format!(
            "{:<8} {:>8} {:>6} {:>8} {:>10} {:>8} {:>10} {:>10}\n",
            "Algo", "lr", "depth", "reg", "accuracy", "f1", "latency", "score"
        ));
        report.push_str("-".repeat(74).as_str());
        report.push('\n');

        for row in &self.summary {
            report.push_str(&format!(
                "{:<8} {:>8.4} {:>6} {:>8.4} {:>10.4} {:>8.4} {:>10.4} {:>10.4}\n",
                row.algorithm,
                row.lr.unwrap_or(f64::NAN),
                row.depth.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                row.reg.unwrap_or(f64::NAN),
                row.accuracy,
                row.f1,
                row.latency,
                row.score
            ));
        }

        report
    }
}

fn summary_row<S>(algorithm: &str, outcome: &SearchOutcome<S>) -> SummaryRecord {
    SummaryRecord {
        algorithm: algorithm.to_string(),
        lr: Some(outcome.best.lr),
        depth: Some(outcome.best.depth),
        reg: Some(outcome.best.reg),
        accuracy: outcome.metrics.accuracy,
        f1: outcome.metrics.f1,
        latency: outcome.metrics.latency,
        score: outcome.score,
    }
}

/// Write serialisable rows as CSV with a header line
pub fn export_to_csv<P: AsRef<Path>, T: Serialize>(path: P, rows: &[T]) -> Result<(), PlotError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| PlotError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);

    for row in rows {
        writer.serialize(row).map_err(|source| PlotError::CsvWrite {
            path: path.to_path_buf(),
            source,
        })?;
    }

    writer.flush().map_err(|e| PlotError::io(path, e))?;
    log::debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
