//! Beam search balancing accuracy, F1 and latency.

use super::{history_step, SearchOutcome, SearchStrategy};
use crate::dataset::HistoryRecord;
use crate::model::{evaluate_model, generate_neighbors, Bounds, HyperParams, Objective};
use ordered_float::OrderedFloat;
use rand_chacha::ChaCha8Rng;
use std::cmp::Reverse;

/// Beam Search
///
/// Expands every state of the beam, keeps the `beam_width` best candidates
/// and tracks the best configuration seen across all levels.
pub struct BeamSearch {
    /// States kept per level
    pub beam_width: usize,
    /// Number of levels
    pub depth: usize,
    /// Neighbours sampled per beam state
    pub neighbors_per_state: usize,
    /// Standard deviation of the neighbourhood
    pub step_scale: f64,
}

impl BeamSearch {
    pub fn new(beam_width: usize) -> Self {
        BeamSearch {
            beam_width,
            depth: 20,
            neighbors_per_state: 10,
            step_scale: 0.2,
        }
    }
}

impl Default for BeamSearch {
    fn default() -> Self {
        Self::new(5)
    }
}

impl SearchStrategy for BeamSearch {
    type Step = HistoryRecord;

    fn search(
        &self,
        start: &HyperParams,
        bounds: &Bounds,
        rng: &mut ChaCha8Rng,
    ) -> SearchOutcome<HistoryRecord> {
        let objective = self.objective();

        let mut beam = vec![*start];
        let mut best = *start;
        let mut best_metrics = evaluate_model(start);
        let mut best_score = objective.score(&best_metrics);
        let mut history = vec![history_step(0, best_score, &best_metrics)];
        let mut iterations = 0;

        for level in 1..=self.depth {
            let mut candidates: Vec<(f64, HyperParams)> = Vec::new();
            for state in &beam {
                let k = self.neighbors_per_state;
                for n in generate_neighbors(state, k, rng, bounds, self.step_scale) {
                    candidates.push((objective.score(&evaluate_model(&n)), n));
                }
            }

            if candidates.is_empty() {
                break;
            }
            iterations = level;

            candidates.sort_by_key(|&(s, _)| Reverse(OrderedFloat(s)));
            candidates.truncate(self.beam_width);

            for &(s, n) in &candidates {
                if s > best_score {
                    best_score = s;
                    best = n;
                    best_metrics = evaluate_model(&best);
                }
            }

            beam = candidates.into_iter().map(|(_, n)| n).collect();
            history.push(history_step(level, best_score, &best_metrics));
        }

        SearchOutcome {
            best,
            metrics: best_metrics,
            score: best_score,
            history,
            iterations,
        }
    }

    fn name(&self) -> &str {
        "Beam"
    }

    fn objective(&self) -> Objective {
        Objective::Balanced
    }
}
