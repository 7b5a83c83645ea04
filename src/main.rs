//! Hyper-parameter Search Visualisation - Command Line Interface
//!
//! Runs the search experiment and renders its charts.

use clap::{Parser, Subcommand, ValueEnum};
use hparam_search_viz::experiment::{Experiment, ExperimentConfig};
use hparam_search_viz::heuristics::SimulatedAnnealing;
use hparam_search_viz::layout::{ImageFormat, ProjectLayout, RenderConfig};
use hparam_search_viz::plots::{self, PlotContext, StatusPrinter};
use hparam_search_viz::PlotError;

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "hparam-search-viz")]
#[command(author = "Optimization Methods Lab")]
#[command(version = "1.0")]
#[command(about = "Charts for hyper-parameter search experiments")]
struct Cli {
    /// Project root holding data/csv and data/png
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Output image format
    #[arg(long, global = true, value_enum, default_value = "png")]
    format: Format,

    /// Output resolution
    #[arg(long, global = true, default_value = "200")]
    dpi: f32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run HC, Beam and SA and write their result tables
    Experiment {
        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Iteration cap of simulated annealing
        #[arg(long, default_value = "2000")]
        sa_iterations: usize,

        /// Also write the summary as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Bar charts comparing the algorithms
    Compare,

    /// Convergence curves of HC and Beam
    Convergence,

    /// Temperature and score of the annealing run
    Annealing,

    /// Every chart
    All,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Format {
    Png,
    Svg,
}

impl From<Format> for ImageFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Png => ImageFormat::Png,
            Format::Svg => ImageFormat::Svg,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let layout = ProjectLayout::new(&cli.root);
    let ctx = PlotContext::new(
        layout.clone(),
        RenderConfig {
            format: cli.format.into(),
            dpi: cli.dpi,
        },
    );

    let result = match cli.command {
        Commands::Experiment { seed, sa_iterations, output } => {
            run_experiment(&layout, seed, sa_iterations, output)
        }
        Commands::Compare => plots::comparison::run(&ctx, &mut StatusPrinter),
        Commands::Convergence => plots::convergence::run(&ctx, &mut StatusPrinter),
        Commands::Annealing => plots::annealing::run(&ctx, &mut StatusPrinter),
        Commands::All => plots::render_all(&ctx, &mut StatusPrinter),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_experiment(
    layout: &ProjectLayout,
    seed: u64,
    sa_iterations: usize,
    output: Option<PathBuf>,
) -> Result<(), PlotError> {
    let defaults = SimulatedAnnealing::new();
    let config = ExperimentConfig {
        annealing: SimulatedAnnealing::with_params(
            sa_iterations,
            defaults.initial_temp,
            defaults.final_temp,
            defaults.cooling_rate,
        ),
        ..ExperimentConfig::with_seed(seed)
    };

    println!("Running experiment (seed {})...", seed);
    let start = Instant::now();

    let mut experiment = Experiment::new(config);
    experiment.run(layout)?;

    println!("Finished in {:.2}s", start.elapsed().as_secs_f64());
    println!("\n{}", experiment.generate_report());
    println!("Tables written to {}", layout.csv_dir().display());

    if let Some(path) = output {
        experiment.export_json(&path)?;
        println!("Summary saved to {}", path.display());
    }

    Ok(())
}
