//! Subframe scheduler: the top-level simulation loop.
//!
//! Each call to [`SubframeScheduler::step`] runs one subframe:
//!
//! 1. Reset the preamble pool
//! 2. Admit new terminals from the growth policy
//! 3. Every pending terminal draws a slot and records it in the pool
//! 4. Resolve contention and apply state transitions
//! 5. Advance the subframe counter
//!
//! [`SubframeScheduler::run`] repeats this until the configured termination
//! condition holds.
//!
//! # Determinism
//!
//! Growth draws and timing advances come from one ChaCha8 stream seeded with
//! the configured seed. Slot draws come from [`UniformSelector`], which keys
//! each draw on `(seed, subframe, terminal)` instead of consuming a shared
//! stream, so sequential and parallel selection produce bit-identical runs.

use crate::config::{SelectionMode, SimulationConfig, Termination};
use crate::error::{ConfigError, Result};
use crate::growth::GrowthPolicy;
use crate::metrics::Metrics;
use crate::preamble::PreamblePool;
use crate::registry::PopulationRegistry;
use crate::resolver::ContentionResolver;
use crate::terminal::TerminalId;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Mixed into the run seed so slot draws never share a keystream with the
/// growth/timing-advance generator.
const SELECTOR_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Chooses the slot a pending terminal transmits on.
///
/// Called at most once per terminal per subframe, possibly from several
/// threads at once.
pub trait SlotSelector: Send + Sync {
    fn select_slot(&self, subframe: u64, terminal: TerminalId, slot_count: usize) -> usize;
}

/// Memoryless uniform draw over all slots, every subframe.
///
/// Every `(seed, subframe, terminal)` triple gets its own ChaCha8 key, so a
/// draw that needs extra rejection rounds never reads another terminal's
/// keystream.
#[derive(Debug, Clone, Copy)]
pub struct UniformSelector {
    seed: u64,
}

impl UniformSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            seed: seed ^ SELECTOR_SEED_SALT,
        }
    }
}

impl SlotSelector for UniformSelector {
    fn select_slot(&self, subframe: u64, terminal: TerminalId, slot_count: usize) -> usize {
        let mut key = [0u8; 32];
        key[0..8].copy_from_slice(&self.seed.to_le_bytes());
        key[8..16].copy_from_slice(&subframe.to_le_bytes());
        key[16..20].copy_from_slice(&terminal.0.to_le_bytes());

        ChaCha8Rng::from_seed(key).gen_range(0..slot_count)
    }
}

/// What happened in one subframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubframeReport {
    /// Subframe index (0-based)
    pub subframe: u64,

    /// Terminals admitted at the start of this subframe
    pub admitted: usize,

    /// Terminals that recorded a selection
    pub selections: usize,

    pub successes: usize,

    /// Slots with two or more users
    pub collisions: usize,

    pub colliding_terminals: usize,

    /// Terminals excluded this subframe
    pub excluded: Vec<TerminalId>,

    pub idle_slots: usize,

    /// Pending terminals after resolution
    pub active: usize,

    /// Registry total after admission
    pub total_admitted: usize,
}

/// Final state of a run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub subframes: u64,
    pub total_admitted: usize,
    pub connected: usize,
    pub excluded: usize,
    pub pending: usize,

    /// Excluded terminals in order of exclusion
    pub excluded_ids: Vec<TerminalId>,

    pub metrics: Metrics,
}

impl SimulationSummary {
    /// True when every admitted terminal connected.
    pub fn all_connected(&self) -> bool {
        self.connected == self.total_admitted
    }
}

/// Owns the whole simulation state and drives it subframe by subframe.
pub struct SubframeScheduler {
    config: SimulationConfig,
    pool: PreamblePool,
    registry: PopulationRegistry,
    resolver: ContentionResolver,
    growth: Box<dyn GrowthPolicy>,
    selector: Arc<dyn SlotSelector>,
    rng: ChaCha8Rng,
    subframe: u64,
    metrics: Metrics,
}

impl SubframeScheduler {
    /// Build a scheduler from a validated configuration.
    ///
    /// # Errors
    /// `Error::Config` if the configuration is rejected by
    /// [`SimulationConfig::validate`].
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            pool: PreamblePool::new(config.slot_count),
            registry: PopulationRegistry::with_population(config.initial_population)?,
            resolver: ContentionResolver::new(config.retry_limit),
            growth: config.growth_policy(),
            selector: Arc::new(UniformSelector::new(config.seed)),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            subframe: 0,
            metrics: Metrics::new(),
            config,
        })
    }

    /// Replace the growth policy derived from the configuration.
    ///
    /// # Errors
    /// `ConfigError::UnboundedPolicy` when the run has no horizon and the
    /// policy would keep admitting terminals forever.
    pub fn with_growth(mut self, growth: Box<dyn GrowthPolicy>) -> Result<Self> {
        if self.config.termination() == Termination::UntilResolved && !growth.is_exhausted(usize::MAX) {
            return Err(ConfigError::UnboundedPolicy.into());
        }
        self.growth = growth;
        Ok(self)
    }

    /// Replace the default uniform slot selector.
    pub fn with_selector(mut self, selector: Arc<dyn SlotSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of subframes simulated so far.
    pub fn subframe(&self) -> u64 {
        self.subframe
    }

    pub fn registry(&self) -> &PopulationRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &PreamblePool {
        &self.pool
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Whether the configured termination condition holds.
    pub fn is_finished(&self) -> bool {
        match self.config.termination() {
            Termination::Horizon(max) => self.subframe >= max,
            Termination::UntilResolved => {
                self.registry.active_count() == 0 && self.growth.is_exhausted(self.registry.total_admitted())
            }
        }
    }

    /// Run one subframe with the configured selector.
    pub fn step(&mut self) -> Result<SubframeReport> {
        let selector = Arc::clone(&self.selector);
        self.step_with(selector.as_ref())
    }

    /// Run one subframe with an explicit selector.
    pub fn step_with(&mut self, selector: &dyn SlotSelector) -> Result<SubframeReport> {
        let subframe = self.subframe;
        self.pool.reset();

        let admitted = self
            .growth
            .admissions(subframe, self.registry.total_admitted(), &mut self.rng);
        if admitted > 0 {
            let ids = self.registry.admit(admitted)?;
            debug!(subframe, first = ids.start, count = admitted, "admitted terminals");
        }

        let pending = self.registry.pending_ids();
        self.select_slots(&pending, selector)?;

        let resolution = self
            .resolver
            .resolve(&self.pool, &mut self.registry, subframe, &mut self.rng)?;

        let report = SubframeReport {
            subframe,
            admitted,
            selections: pending.len(),
            successes: resolution.successes(),
            collisions: resolution.collisions,
            colliding_terminals: resolution.colliding_terminals,
            excluded: resolution.excluded,
            idle_slots: resolution.idle,
            active: self.registry.active_count(),
            total_admitted: self.registry.total_admitted(),
        };

        info!(
            subframe,
            admitted = report.admitted,
            active = report.active,
            successes = report.successes,
            collisions = report.collisions,
            exclusions = report.excluded.len(),
            "subframe resolved"
        );

        self.metrics.record(&report);
        self.subframe += 1;
        Ok(report)
    }

    /// Run subframes until the termination condition holds.
    ///
    /// Always simulates at least one subframe.
    pub fn run(&mut self) -> Result<SimulationSummary> {
        loop {
            self.step()?;
            if self.is_finished() {
                break;
            }
        }

        self.metrics.complete();
        let summary = self.summary();
        info!(
            subframes = summary.subframes,
            connected = summary.connected,
            excluded = summary.excluded,
            pending = summary.pending,
            "simulation finished"
        );
        Ok(summary)
    }

    /// Snapshot of the current state as a summary.
    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            seed: self.config.seed,
            subframes: self.subframe,
            total_admitted: self.registry.total_admitted(),
            connected: self.registry.connected().len(),
            excluded: self.registry.excluded().len(),
            pending: self.registry.active_count(),
            excluded_ids: self.registry.excluded().to_vec(),
            metrics: self.metrics.clone(),
        }
    }

    fn select_slots(&self, pending: &[TerminalId], selector: &dyn SlotSelector) -> Result<()> {
        let subframe = self.subframe;
        let slot_count = self.pool.slot_count();
        let pool = &self.pool;

        match self.config.selection {
            SelectionMode::Sequential => {
                for &id in pending {
                    pool.select(id, selector.select_slot(subframe, id, slot_count))?;
                }
                Ok(())
            }
            SelectionMode::Parallel => pending
                .par_iter()
                .try_for_each(|&id| pool.select(id, selector.select_slot(subframe, id, slot_count))),
        }
    }
}
