//! Simulated annealing with geometric cooling.

use super::{SearchOutcome, SearchStrategy};
use crate::dataset::AnnealingRecord;
use crate::model::{evaluate_model, local_neighbor, Bounds, HyperParams, Objective};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Simulated Annealing
///
/// Accepts worse configurations with probability `exp(-delta / T)`; the
/// temperature is multiplied by `cooling_rate` after every step.
pub struct SimulatedAnnealing {
    /// Maximum number of steps
    pub max_iterations: usize,
    /// Initial temperature
    pub initial_temp: f64,
    /// Search stops once the temperature falls to this value
    pub final_temp: f64,
    /// Cooling rate
    pub cooling_rate: f64,
    /// Standard deviation of the neighbourhood
    pub step_scale: f64,
}

impl SimulatedAnnealing {
    pub fn new() -> Self {
        SimulatedAnnealing {
            max_iterations: 2000,
            initial_temp: 1.5,
            final_temp: 1e-4,
            cooling_rate: 0.995,
            step_scale: 0.4,
        }
    }

    pub fn with_params(
        max_iterations: usize,
        initial_temp: f64,
        final_temp: f64,
        cooling_rate: f64,
    ) -> Self {
        SimulatedAnnealing {
            max_iterations,
            initial_temp,
            final_temp,
            cooling_rate,
            ..Self::new()
        }
    }
}

impl Default for SimulatedAnnealing {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStrategy for SimulatedAnnealing {
    type Step = AnnealingRecord;

    fn search(
        &self,
        start: &HyperParams,
        bounds: &Bounds,
        rng: &mut ChaCha8Rng,
    ) -> SearchOutcome<AnnealingRecord> {
        let objective = self.objective();

        let mut current = *start;
        let mut current_score = objective.score(&evaluate_model(&current));
        let mut best = current;
        let mut best_score = current_score;

        let mut temp = self.initial_temp;
        let mut history = vec![AnnealingRecord {
            iter: 0,
            temperature: temp,
            score: current_score,
            accepted_worse: Some(false),
        }];
        let mut iterations = 0;

        while iterations < self.max_iterations && temp > self.final_temp {
            iterations += 1;

            let next = local_neighbor(&current, rng, bounds, self.step_scale);
            let next_score = objective.score(&evaluate_model(&next));

            // maximising: a negative delta is an improvement
            let delta = current_score - next_score;
            let mut accepted_worse = false;

            if delta < 0.0 {
                current = next;
                current_score = next_score;
            } else {
                let prob = (-delta / temp).exp();
                if rng.gen::<f64>() < prob {
                    current = next;
                    current_score = next_score;
                    accepted_worse = true;
                }
            }

            if current_score > best_score {
                best = current;
                best_score = current_score;
            }

            history.push(AnnealingRecord {
                iter: iterations as i64,
                temperature: temp,
                score: current_score,
                accepted_worse: Some(accepted_worse),
            });

            temp *= self.cooling_rate;
        }

        log::info!(
            "[SA] {} iterations, final temperature {:.6}, best score {:.4}",
            iterations,
            temp,
            best_score
        );

        SearchOutcome {
            best,
            metrics: evaluate_model(&best),
            score: best_score,
            history,
            iterations,
        }
    }

    fn name(&self) -> &str {
        "SA"
    }

    fn objective(&self) -> Objective {
        Objective::Exploratory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooling_schedule_ends_run() {
        let bounds = Bounds::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let sa = SimulatedAnnealing::new();

        let outcome = sa.search(&bounds.midpoint(), &bounds, &mut rng);

        // 1.5 * 0.995^k drops below 1e-4 after 1919 steps
        assert_eq!(outcome.iterations, 1919);
        assert_eq!(outcome.history.len(), outcome.iterations + 1);
        for pair in outcome.history.windows(2) {
            assert!(pair[1].temperature < pair[0].temperature || pair[1].iter == 1);
            assert_eq!(pair[1].iter, pair[0].iter + 1);
        }
        assert!(outcome.history.iter().all(|r| r.score <= outcome.score + 1e-12));
    }

    #[test]
    fn test_iteration_cap() {
        let bounds = Bounds::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let sa = SimulatedAnnealing::with_params(50, 1.5, 1e-4, 0.995);

        let outcome = sa.search(&bounds.midpoint(), &bounds, &mut rng);
        assert_eq!(outcome.iterations, 50);
        assert_eq!(outcome.history.len(), 51);
        assert_eq!(outcome.history[1].temperature, 1.5);
    }

    #[test]
    fn test_frozen_start_records_only_initial_state() {
        let bounds = Bounds::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let sa = SimulatedAnnealing::with_params(100, 1e-5, 1e-4, 0.995);

        let outcome = sa.search(&bounds.midpoint(), &bounds, &mut rng);
        assert_eq!(outcome.history.len(), 1);
        assert_eq!(outcome.best, bounds.midpoint());
    }
}
