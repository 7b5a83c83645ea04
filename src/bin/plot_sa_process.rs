//! Renders the smoothed temperature and score charts of the annealing run.

use hparam_search_viz::plots::{self, PlotContext, StatusPrinter};

fn main() {
    env_logger::init();

    if let Err(e) = plots::annealing::run(&PlotContext::default(), &mut StatusPrinter) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
