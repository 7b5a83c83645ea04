//! Steepest-ascent hill climbing.

use super::{history_step, SearchOutcome, SearchStrategy};
use crate::dataset::HistoryRecord;
use crate::model::{evaluate_model, generate_neighbors, Bounds, HyperParams, Objective};
use ordered_float::OrderedFloat;
use rand_chacha::ChaCha8Rng;

/// Hill Climbing
///
/// Moves to the best of a sample of neighbours while it strictly improves
/// accuracy; stops at the first step without improvement.
pub struct HillClimbing {
    /// Maximum number of moves
    pub max_iterations: usize,
    /// Neighbours sampled per step
    pub neighbors_per_step: usize,
    /// Standard deviation of the neighbourhood
    pub step_scale: f64,
}

impl HillClimbing {
    pub fn new() -> Self {
        HillClimbing {
            max_iterations: 100,
            neighbors_per_step: 10,
            step_scale: 0.2,
        }
    }
}

impl Default for HillClimbing {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStrategy for HillClimbing {
    type Step = HistoryRecord;

    fn search(
        &self,
        start: &HyperParams,
        bounds: &Bounds,
        rng: &mut ChaCha8Rng,
    ) -> SearchOutcome<HistoryRecord> {
        let objective = self.objective();

        let mut current = *start;
        let mut metrics = evaluate_model(&current);
        let mut score = objective.score(&metrics);
        let mut history = vec![history_step(0, score, &metrics)];
        let mut iterations = 0;

        for iter in 1..=self.max_iterations {
            iterations = iter;

            let neighbors =
                generate_neighbors(&current, self.neighbors_per_step, rng, bounds, self.step_scale);
            let best_neighbor = neighbors
                .into_iter()
                .map(|n| {
                    let m = evaluate_model(&n);
                    (objective.score(&m), n, m)
                })
                .max_by_key(|(s, _, _)| OrderedFloat(*s));

            match best_neighbor {
                Some((s, n, m)) if s > score => {
                    current = n;
                    metrics = m;
                    score = s;
                    history.push(history_step(iter, score, &metrics));
                }
                _ => {
                    log::info!("[HC] stopped at iteration {}: local maximum reached", iter);
                    break;
                }
            }
        }

        SearchOutcome {
            best: current,
            metrics,
            score,
            history,
            iterations,
        }
    }

    fn name(&self) -> &str {
        "HC"
    }

    fn objective(&self) -> Objective {
        Objective::Accuracy
    }
}
