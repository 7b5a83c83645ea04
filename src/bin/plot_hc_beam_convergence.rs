//! Renders the HC and Beam convergence curves.

use hparam_search_viz::plots::{self, PlotContext, StatusPrinter};

fn main() {
    env_logger::init();

    if let Err(e) = plots::convergence::run(&PlotContext::default(), &mut StatusPrinter) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
