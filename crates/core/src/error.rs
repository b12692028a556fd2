//! Error types for the random-access simulator.
//!
//! A terminal failing to connect is NOT an error: exclusion is a regular
//! terminal state. Errors here cover invalid configuration and misuse of the
//! engine's building blocks (out-of-range slots, illegal state transitions).

use crate::terminal::{TerminalId, TerminalStatus};
use thiserror::Error;

/// Top-level error type for all operations in the system.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Simulation parameters rejected at startup
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Slot identifier outside `0..slot_count`
    #[error("slot {slot} out of range (pool has {slot_count} slots)")]
    SlotOutOfRange { slot: usize, slot_count: usize },

    /// Terminal identifier never admitted to the registry
    #[error("unknown terminal {0}")]
    UnknownTerminal(TerminalId),

    /// Attempted to move a terminal out of an absorbing state
    #[error("terminal {id} cannot leave state {from}")]
    InvalidTransition { id: TerminalId, from: TerminalStatus },

    /// Terminal already appears in the connected or excluded sequence
    #[error("terminal {0} already recorded")]
    AlreadyRecorded(TerminalId),

    /// Admission would run past the terminal identifier space
    #[error("cannot admit {requested} terminals: {admitted} already admitted, identifiers exhausted")]
    PopulationOverflow { admitted: usize, requested: usize },
}

/// Configuration errors, reported before the first subframe runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No contention slots: every draw would be undefined
    #[error("slot_count must be at least 1")]
    ZeroSlots,

    /// Retry limit of zero would exclude every terminal on its first collision
    #[error("retry_limit must be at least 1")]
    ZeroRetryLimit,

    /// Dynamic admission with no horizon and no population cap never ends
    #[error("growth_bound {growth_bound} requires a horizon or a max_population")]
    UnboundedGrowth { growth_bound: usize },

    /// Growth policy that never exhausts, with no horizon to stop the run
    #[error("growth policy never stops admitting and no horizon is set")]
    UnboundedPolicy,

    /// Population cap smaller than the population present at start
    #[error("max_population {max} is below initial_population {initial}")]
    CapBelowInitial { max: usize, initial: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
