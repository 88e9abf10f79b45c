// Main entry point - Logging setup and command dispatch
use clap::Parser;
use ha_dashboards::presentation::cli::{Cli, init_tracing};
use ha_dashboards::presentation::handlers::run;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    run(Cli::parse())
}
