//! Rolling-mean smoothing of the annealing score curve.

use crate::dataset::AnnealingRecord;
use crate::layout::files;
use statrs::statistics::Statistics;

/// Smoothing level applied to the annealing score
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Smoothing {
    /// Window of 20 on long runs
    Moderate,
    /// Window of at least 50 on long runs
    Strong,
}

impl Smoothing {
    pub const ALL: [Smoothing; 2] = [Smoothing::Moderate, Smoothing::Strong];

    /// Window width for a series of `n` points
    pub fn window(&self, n: usize) -> usize {
        match self {
            Smoothing::Moderate => moderate_window(n),
            Smoothing::Strong => strong_window(n),
        }
    }

    /// Chart title suffix
    pub fn label(&self) -> &'static str {
        match self {
            Smoothing::Moderate => "moderate smoothing",
            Smoothing::Strong => "strong smoothing",
        }
    }

    /// Output chart stem
    pub fn output_stem(&self) -> &'static str {
        match self {
            Smoothing::Moderate => files::SA_TEMPERATURE_SCORE,
            Smoothing::Strong => files::SA_TEMPERATURE_SCORE_SMOOTH,
        }
    }
}

fn at_least_one(w: usize) -> usize {
    if w == 0 {
        1
    } else {
        w
    }
}

pub fn moderate_window(n: usize) -> usize {
    if n > 20 {
        20
    } else {
        3.max(at_least_one(n / 5))
    }
}

pub fn strong_window(n: usize) -> usize {
    if n > 100 {
        50.max(n / 10)
    } else {
        10.max(at_least_one(n / 3))
    }
}

/// Trailing rolling mean. Entry `i` is `None` until a full window is
/// available, i.e. for `i < window - 1`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                Some(values[i + 1 - window..=i].iter().mean())
            }
        })
        .collect()
}

/// Annealing series restricted to the rows where the smoothed score is defined
#[derive(Debug, Clone, Default)]
pub struct SmoothedSeries {
    /// Window width used
    pub window: usize,
    pub iters: Vec<f64>,
    /// Raw temperature
    pub temperature: Vec<f64>,
    /// Smoothed score
    pub score: Vec<f64>,
}

impl SmoothedSeries {
    /// Smooth the score column and drop the undefined leading rows.
    pub fn from_records(records: &[AnnealingRecord], window: usize) -> Self {
        let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
        let smoothed = rolling_mean(&scores, window);

        let mut series = SmoothedSeries {
            window,
            ..Default::default()
        };

        for (record, value) in records.iter().zip(smoothed) {
            if let Some(score) = value {
                series.iters.push(record.iter as f64);
                series.temperature.push(record.temperature);
                series.score.push(score);
            }
        }

        series
    }

    pub fn len(&self) -> usize {
        self.score.len()
    }

    pub fn is_empty(&self) -> bool {
        self.score.is_empty()
    }
}
