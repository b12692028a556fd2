//! Metrics collection and reporting for a simulation run.
//!
//! Counters are cumulative over all subframes and are fed one
//! `SubframeReport` at a time by the scheduler. They are observational
//! only: nothing in the engine branches on them.
//!
//! # Thread Safety
//!
//! `Metrics` is updated from the sequential part of the subframe loop only
//! and needs no synchronization.

use crate::scheduler::SubframeReport;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Cumulative counters for one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    // === Timing ===
    /// Wall-clock start of the run
    #[serde(skip)]
    pub start_time: Instant,

    /// Wall-clock end of the run (set on completion)
    #[serde(skip)]
    pub end_time: Option<Instant>,

    // === Population ===
    /// Subframes simulated
    pub subframes: u64,

    /// Terminals admitted after subframe 0 started (growth only)
    pub admitted: u64,

    // === Contention ===
    /// Slot selections recorded across all subframes
    pub selections: u64,

    /// Slots won by a single terminal
    pub successes: u64,

    /// Slots with two or more users
    pub collisions: u64,

    /// Terminal-level collision participations
    pub colliding_terminals: u64,

    /// Terminals excluded
    pub exclusions: u64,

    /// Slots nobody used
    pub idle_slots: u64,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            subframes: 0,
            admitted: 0,
            selections: 0,
            successes: 0,
            collisions: 0,
            colliding_terminals: 0,
            exclusions: 0,
            idle_slots: 0,
        }
    }

    /// Fold one subframe into the totals.
    pub fn record(&mut self, report: &SubframeReport) {
        self.subframes += 1;
        self.admitted += report.admitted as u64;
        self.selections += report.selections as u64;
        self.successes += report.successes as u64;
        self.collisions += report.collisions as u64;
        self.colliding_terminals += report.colliding_terminals as u64;
        self.exclusions += report.excluded.len() as u64;
        self.idle_slots += report.idle_slots as u64;
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Fraction of selections that ended in a collision.
    pub fn collision_rate(&self) -> f64 {
        if self.selections == 0 {
            0.0
        } else {
            self.colliding_terminals as f64 / self.selections as f64
        }
    }

    /// Fraction of selections that connected.
    pub fn success_rate(&self) -> f64 {
        if self.selections == 0 {
            0.0
        } else {
            self.successes as f64 / self.selections as f64
        }
    }

    /// Mean number of connections per subframe.
    pub fn successes_per_subframe(&self) -> f64 {
        if self.subframes == 0 {
            0.0
        } else {
            self.successes as f64 / self.subframes as f64
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Contention ===");
        println!("Subframes: {}", self.subframes);
        println!("Selections: {}", self.selections);
        println!("Successes: {} ({:.2}%)", self.successes, self.success_rate() * 100.0);
        println!(
            "Collisions: {} slots, {} terminals ({:.2}%)",
            self.collisions,
            self.colliding_terminals,
            self.collision_rate() * 100.0
        );
        println!("Exclusions: {}", self.exclusions);
        println!("Idle slots: {}", self.idle_slots);
        println!("Admitted by growth: {}", self.admitted);
        println!();

        println!("=== Performance ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Connections per subframe: {:.2}", self.successes_per_subframe());
        println!();
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "subframes={}\n\
             admitted={}\n\
             selections={}\n\
             successes={}\n\
             success_rate={:.4}\n\
             collisions={}\n\
             colliding_terminals={}\n\
             collision_rate={:.4}\n\
             exclusions={}\n\
             idle_slots={}\n",
            self.subframes,
            self.admitted,
            self.selections,
            self.successes,
            self.success_rate(),
            self.collisions,
            self.colliding_terminals,
            self.collision_rate(),
            self.exclusions,
            self.idle_slots,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
