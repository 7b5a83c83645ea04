//! Hyper-parameter space and the synthetic model being tuned.
//!
//! The model is a deterministic surrogate: accuracy peaks around
//! `lr = 0.08`, `depth = 8`, `reg = 0.02`, F1 tracks accuracy with a
//! regularisation penalty and latency grows linearly with depth.

use rand::prelude::*;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point of the search space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Learning rate
    pub lr: f64,
    /// Tree depth
    pub depth: i32,
    /// L2 regularisation
    pub reg: f64,
}

impl fmt::Display for HyperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{lr={:.4}, depth={}, reg={:.4}}}", self.lr, self.depth, self.reg)
    }
}

/// Box constraints of the search space
#[derive(Debug, Clone)]
pub struct Bounds {
    pub lr_min: f64,
    pub lr_max: f64,
    pub depth_min: i32,
    pub depth_max: i32,
    pub reg_min: f64,
    pub reg_max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds {
            lr_min: 0.001,
            lr_max: 0.3,
            depth_min: 1,
            depth_max: 16,
            reg_min: 0.0,
            reg_max: 0.1,
        }
    }
}

impl Bounds {
    /// Uniform random point
    pub fn random<R: Rng>(&self, rng: &mut R) -> HyperParams {
        HyperParams {
            lr: rng.gen_range(self.lr_min..=self.lr_max),
            depth: rng.gen_range(self.depth_min..=self.depth_max),
            reg: rng.gen_range(self.reg_min..=self.reg_max),
        }
    }

    /// Centre of the box
    pub fn midpoint(&self) -> HyperParams {
        HyperParams {
            lr: (self.lr_min + self.lr_max) / 2.0,
            depth: (self.depth_min + self.depth_max) / 2,
            reg: (self.reg_min + self.reg_max) / 2.0,
        }
    }

    pub fn clamp(&self, h: HyperParams) -> HyperParams {
        HyperParams {
            lr: h.lr.clamp(self.lr_min, self.lr_max),
            depth: h.depth.clamp(self.depth_min, self.depth_max),
            reg: h.reg.clamp(self.reg_min, self.reg_max),
        }
    }

    pub fn contains(&self, h: &HyperParams) -> bool {
        (self.lr_min..=self.lr_max).contains(&h.lr)
            && (self.depth_min..=self.depth_max).contains(&h.depth)
            && (self.reg_min..=self.reg_max).contains(&h.reg)
    }
}

/// Quality of a trained model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub f1: f64,
    /// Inference latency in milliseconds
    pub latency: f64,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{accuracy={:.4}, f1={:.4}, latency={:.3}ms}}",
            self.accuracy, self.f1, self.latency
        )
    }
}

fn bump(x: f64, center: f64, width: f64) -> f64 {
    (-((x - center) / width).powi(2)).exp()
}

/// Evaluate the surrogate model at `h`.
pub fn evaluate_model(h: &HyperParams) -> Metrics {
    let depth = h.depth as f64;
    let lr_fit = bump(h.lr, 0.08, 0.06);
    let depth_fit = bump(depth, 8.0, 5.0);
    let reg_fit = bump(h.reg, 0.02, 0.04);

    let fit = lr_fit * (0.5 + 0.5 * depth_fit) * (0.7 + 0.3 * reg_fit);
    let accuracy = (0.55 + 0.4 * fit).clamp(0.0, 1.0);
    let f1 = (accuracy - 0.03 - 0.2 * (h.reg - 0.02).abs()).clamp(0.0, 1.0);
    let latency = 0.2 + 0.1 * depth + 0.5 * h.reg;

    Metrics { accuracy, f1, latency }
}

/// Objective maximised by a search strategy
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Objective {
    /// Accuracy alone
    Accuracy,
    /// Accuracy and F1 traded against latency
    Balanced,
    /// Accuracy and F1 with a light latency penalty
    Exploratory,
}

impl Objective {
    pub fn score(&self, m: &Metrics) -> f64 {
        match self {
            Objective::Accuracy => m.accuracy,
            Objective::Balanced => 0.5 * m.accuracy + 0.4 * m.f1 - 0.1 * m.latency,
            Objective::Exploratory => 0.6 * m.accuracy + 0.4 * m.f1 - 0.05 * m.latency,
        }
    }
}

/// Gaussian perturbation of `h` with standard deviation `step_scale`,
/// clamped to `bounds`.
pub fn local_neighbor<R: Rng>(
    h: &HyperParams,
    rng: &mut R,
    bounds: &Bounds,
    step_scale: f64,
) -> HyperParams {
    let mut d = || -> f64 { rng.sample::<f64, _>(StandardNormal) * step_scale };

    let lr = h.lr + d() * 0.02;
    let reg = h.reg + d() * 0.01;
    let depth = h.depth + (d() * 2.0).round() as i32;

    bounds.clamp(HyperParams { lr, depth, reg })
}

pub fn generate_neighbors<R: Rng>(
    h: &HyperParams,
    k: usize,
    rng: &mut R,
    bounds: &Bounds,
    step_scale: f64,
) -> Vec<HyperParams> {
    (0..k).map(|_| local_neighbor(h, rng, bounds, step_scale)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_optimum_beats_corners() {
        let best = evaluate_model(&HyperParams { lr: 0.08, depth: 8, reg: 0.02 });
        let corner = evaluate_model(&HyperParams { lr: 0.3, depth: 1, reg: 0.1 });

        assert!(best.accuracy > corner.accuracy);
        assert!(best.accuracy <= 1.0);
        assert!(best.f1 < best.accuracy);
    }

    #[test]
    fn test_latency_grows_with_depth() {
        let shallow = evaluate_model(&HyperParams { lr: 0.1, depth: 2, reg: 0.0 });
        let deep = evaluate_model(&HyperParams { lr: 0.1, depth: 12, reg: 0.0 });
        assert!(deep.latency > shallow.latency);
    }

    #[test]
    fn test_objectives() {
        let m = Metrics { accuracy: 0.8, f1: 0.7, latency: 1.0 };
        assert!((Objective::Accuracy.score(&m) - 0.8).abs() < 1e-12);
        assert!((Objective::Balanced.score(&m) - 0.58).abs() < 1e-12);
        assert!((Objective::Exploratory.score(&m) - 0.71).abs() < 1e-12);
    }

    #[test]
    fn test_neighbors_stay_in_bounds() {
        let bounds = Bounds::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let corner = HyperParams {
            lr: bounds.lr_max,
            depth: bounds.depth_max,
            reg: bounds.reg_min,
        };

        for n in generate_neighbors(&corner, 200, &mut rng, &bounds, 3.0) {
            assert!(bounds.contains(&n));
        }
    }

    #[test]
    fn test_random_and_midpoint_in_bounds() {
        let bounds = Bounds::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            assert!(bounds.contains(&bounds.random(&mut rng)));
        }
        let mid = bounds.midpoint();
        assert!(bounds.contains(&mid));
        assert_eq!(mid.depth, 8);
    }
}
