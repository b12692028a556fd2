//! # rach-sim
//!
//! CLI runner for the random access simulator.
//!
//! The per-subframe progress trace goes through `tracing` to stderr
//! (one line per subframe by default, `RUST_LOG=debug` adds every
//! transition, `RUST_LOG=warn` silences it). The final summary goes to stdout.

mod config;
mod report;

use anyhow::Context;
use clap::Parser;
use config::{Cli, OutputFormat};
use rach_sim_core::SubframeScheduler;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let sim_config = cli.simulation_config();
    tracing::info!(seed = sim_config.seed, "starting simulation");

    if cli.print_config {
        config::print_config(&sim_config);
    }

    let mut scheduler = SubframeScheduler::new(sim_config).context("invalid simulation configuration")?;
    let summary = scheduler.run().context("simulation aborted")?;

    match cli.format {
        OutputFormat::Text => {
            print!("{}", report::render_text(&summary));
            summary.metrics.print_summary();
        }
        OutputFormat::Json => {
            println!("{}", report::render_json(&summary).context("failed to encode summary")?);
        }
    }

    Ok(())
}
