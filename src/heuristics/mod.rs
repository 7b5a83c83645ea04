//! Search strategies over the hyper-parameter space.
//!
//! Every strategy records one history row per step so that its run can be
//! exported to CSV and charted afterwards.

pub mod beam_search;
pub mod hill_climbing;
pub mod simulated_annealing;

pub use beam_search::BeamSearch;
pub use hill_climbing::HillClimbing;
pub use simulated_annealing::SimulatedAnnealing;

use crate::dataset::HistoryRecord;
use crate::model::{Bounds, HyperParams, Metrics, Objective};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Trait for hyper-parameter search methods
pub trait SearchStrategy {
    /// History row written per step
    type Step: Serialize;

    fn search(
        &self,
        start: &HyperParams,
        bounds: &Bounds,
        rng: &mut ChaCha8Rng,
    ) -> SearchOutcome<Self::Step>;
    fn name(&self) -> &str;
    fn objective(&self) -> Objective;
}

/// Result of one search run
#[derive(Debug, Clone)]
pub struct SearchOutcome<S> {
    /// Best configuration found
    pub best: HyperParams,
    /// Metrics of `best`
    pub metrics: Metrics,
    /// Objective value of `best`
    pub score: f64,
    /// One row per recorded step, starting with the initial state
    pub history: Vec<S>,
    /// Number of iterations performed
    pub iterations: usize,
}

pub(crate) fn history_step(iter: usize, score: f64, metrics: &Metrics) -> HistoryRecord {
    HistoryRecord {
        iter: iter as i64,
        score,
        accuracy: Some(metrics.accuracy),
        f1: Some(metrics.f1),
        latency: Some(metrics.latency),
    }
}
