//! rach-sim-core: Contention-based random access simulator
//!
//! This library models how a population of terminals (UEs) competes for a
//! limited set of random access preambles, subframe by subframe:
//! - Terminals draw a preamble uniformly at random each subframe
//! - A preamble chosen by exactly one terminal connects it
//! - A preamble chosen by several terminals is a collision for all of them
//! - Terminals that collide more often than the retry limit are excluded
//! - New terminals may join the population as the simulation runs
//!
//! # Architecture
//!
//! - `preamble`: per-subframe slot usage, safe for concurrent selection
//! - `terminal`: per-terminal state machine (Pending, Connected, Excluded)
//! - `registry`: population bookkeeping and connected/excluded sequences
//! - `growth`: pluggable admission policies
//! - `resolver`: per-slot outcome and state transitions
//! - `scheduler`: the subframe loop and termination policies
//! - `config`: simulation parameters and validation
//! - `metrics`: observable run statistics
//!
//! # Design Principles
//!
//! - **No globals**: all simulation state is owned by a `SubframeScheduler`
//! - **Exclusion is not an error**: it is a regular terminal state
//! - **Deterministic**: seeded randomness makes runs reproducible, with or
//!   without parallel selection

pub mod config;
pub mod error;
pub mod growth;
pub mod metrics;
pub mod preamble;
pub mod registry;
pub mod resolver;
pub mod scheduler;
pub mod terminal;

// Re-export commonly used types
pub use config::{SelectionMode, SimulationConfig, Termination};
pub use error::{ConfigError, Error, Result};
pub use scheduler::{SimulationSummary, SubframeReport, SubframeScheduler};
pub use terminal::{TerminalId, TerminalStatus};
