//! Hyper-parameter Search Visualisation Library
//!
//! Turns the CSV results of hyper-parameter search experiments (Hill
//! Climbing, Beam Search, Simulated Annealing) into chart images.
//!
//! # Features
//!
//! - Algorithm comparison bar charts from `summary.csv`
//! - Convergence curves from per-iteration histories
//! - Dual-axis temperature/score charts of the annealing run, smoothed at two strengths
//! - A seeded experiment driver that produces all input tables
//!
//! # Example
//!
//! ```no_run
//! use hparam_search_viz::plots::{self, PlotContext, StatusPrinter};
//!
//! let ctx = PlotContext::default();
//! plots::render_all(&ctx, &mut StatusPrinter).unwrap();
//! ```

pub mod dataset;
pub mod error;
pub mod experiment;
pub mod heuristics;
pub mod layout;
pub mod model;
pub mod plots;
pub mod smoothing;
pub mod visualization;

pub use error::PlotError;
pub use layout::{ImageFormat, ProjectLayout, RenderConfig};
pub use plots::{OutcomeSink, PlotContext, PlotOutcome, StatusPrinter};
