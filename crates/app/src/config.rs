//! Configuration for the rach-sim application.
//!
//! Handles parsing command-line arguments and resolving the seed.
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments: the defaults describe one PRACH
//! occasion of 64 preambles shared by 100 terminals with a retry budget of 5.
//! When no seed is given a time-based one is chosen and logged, so every run
//! can be reproduced.

use clap::{Parser, ValueEnum};
use rach_sim_core::config::{DEFAULT_INITIAL_POPULATION, DEFAULT_RETRY_LIMIT};
use rach_sim_core::preamble::DEFAULT_SLOT_COUNT;
use rach_sim_core::{SelectionMode, SimulationConfig, Termination};

/// Output format for the final summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON for programmatic consumption
    Json,
}

/// rach-sim - contention-based random access simulator
#[derive(Parser, Debug)]
#[command(name = "rach-sim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of contention preambles per subframe
    #[arg(long = "slots", default_value_t = DEFAULT_SLOT_COUNT)]
    pub slot_count: usize,

    /// Collisions a terminal tolerates before it is excluded
    #[arg(long, default_value_t = DEFAULT_RETRY_LIMIT)]
    pub retry_limit: u32,

    /// Terminals present at subframe 0
    #[arg(long, default_value_t = DEFAULT_INITIAL_POPULATION)]
    pub initial_population: usize,

    /// Max terminals admitted per subframe (0 disables growth)
    #[arg(long, default_value_t = 0)]
    pub growth_bound: usize,

    /// Cap on the total population when growth is enabled
    #[arg(long)]
    pub max_population: Option<usize>,

    /// Max subframes to simulate (0 = run until every terminal is resolved)
    #[arg(long, default_value_t = 0)]
    pub horizon: u64,

    /// Random seed for determinism (default: time-based)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Record slot selections from a worker pool
    #[arg(long)]
    pub parallel: bool,

    /// Summary output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print resolved configuration
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Resolve CLI arguments into a simulation configuration.
    ///
    /// Validation is left to the scheduler.
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            slot_count: self.slot_count,
            retry_limit: self.retry_limit,
            initial_population: self.initial_population,
            growth_bound: self.growth_bound,
            max_population: self.max_population,
            horizon: self.horizon,
            seed: self.seed.unwrap_or_else(time_seed),
            selection: if self.parallel {
                SelectionMode::Parallel
            } else {
                SelectionMode::Sequential
            },
        }
    }
}

/// Seed derived from the wall clock.
fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Print the configuration in human-readable form.
pub fn print_config(config: &SimulationConfig) {
    println!("=== Configuration ===");
    println!("Seed: {}", config.seed);
    println!();
    println!("Preamble slots: {}", config.slot_count);
    println!("Retry limit: {}", config.retry_limit);
    println!();
    println!("=== Population ===");
    println!("Initial population: {}", config.initial_population);
    if config.growth_bound == 0 {
        println!("Growth: disabled");
    } else {
        println!("Growth: up to {} per subframe", config.growth_bound);
    }
    match config.max_population {
        Some(max) => println!("Max population: {}", max),
        None => println!("Max population: unbounded"),
    }
    println!();
    println!("=== Scheduling ===");
    match config.termination() {
        Termination::UntilResolved => println!("Termination: until resolved"),
        Termination::Horizon(n) => println!("Termination: after {} subframes", n),
    }
    println!("Selection: {:?}", config.selection);
    println!();
}
