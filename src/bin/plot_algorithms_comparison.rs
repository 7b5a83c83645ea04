//! Renders the algorithm comparison bar charts from data/csv/summary.csv.

use hparam_search_viz::plots::{self, PlotContext, StatusPrinter};

fn main() {
    env_logger::init();

    if let Err(e) = plots::comparison::run(&PlotContext::default(), &mut StatusPrinter) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
