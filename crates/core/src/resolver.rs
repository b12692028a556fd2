//! Contention resolution for one subframe.
//!
//! The resolver walks the pool slot by slot and classifies each slot:
//!
//! - **Idle**: nobody transmitted, nothing happens.
//! - **Success**: exactly one terminal; it connects and receives a grant.
//! - **Collision**: two or more terminals; none of them connects, each one's
//!   attempt counter goes up, and any terminal pushed past the retry limit
//!   is excluded for good.
//!
//! # Determinism
//!
//! Slots are visited in ascending order and the members of a colliding slot
//! in ascending identifier order. The order in which terminals recorded
//! their selections (which varies under parallel selection) therefore never
//! shows up in the connected or excluded sequences.

use crate::error::Result;
use crate::preamble::PreamblePool;
use crate::registry::PopulationRegistry;
use crate::terminal::{CollisionOutcome, Grant, TempId, TerminalId};
use rand::{Rng, RngCore};
use serde::Serialize;
use tracing::debug;

/// First temporary identifier handed out (0x0001..=0x003C are RA-RNTIs).
pub const FIRST_TEMP_ID: u32 = 0x003D;

/// Timing advance placeholders are drawn from `0..MAX_TIMING_ADVANCE`.
pub const MAX_TIMING_ADVANCE: u32 = 100;

/// Per-subframe outcome counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Terminals that connected, in slot order
    pub connected: Vec<TerminalId>,

    /// Slots with two or more users
    pub collisions: usize,

    /// Terminals involved in any collision
    pub colliding_terminals: usize,

    /// Terminals excluded this subframe, in increment-then-check order
    pub excluded: Vec<TerminalId>,

    /// Slots with no users
    pub idle: usize,
}

impl Resolution {
    pub fn successes(&self) -> usize {
        self.connected.len()
    }
}

/// Applies per-slot outcomes to the registry.
#[derive(Debug, Clone)]
pub struct ContentionResolver {
    retry_limit: u32,
    next_temp_id: u32,
}

impl ContentionResolver {
    pub fn new(retry_limit: u32) -> Self {
        Self {
            retry_limit,
            next_temp_id: FIRST_TEMP_ID,
        }
    }

    pub fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    /// Resolve every slot in `pool` for the given subframe.
    ///
    /// Temporary identifiers come from a monotonic allocator and are never
    /// reused within a run, so no two connected terminals share one.
    ///
    /// # Errors
    /// Only on inconsistent input: a slot lists a terminal the registry does
    /// not know, or one that is no longer pending.
    pub fn resolve(
        &mut self,
        pool: &PreamblePool,
        registry: &mut PopulationRegistry,
        subframe: u64,
        rng: &mut dyn RngCore,
    ) -> Result<Resolution> {
        let mut resolution = Resolution::default();

        for slot in 0..pool.slot_count() {
            let mut users = pool.usage(slot);

            match users.len() {
                0 => resolution.idle += 1,
                1 => {
                    let id = users[0];
                    let grant = Grant {
                        temp_id: self.allocate_temp_id(),
                        timing_advance: rng.gen_range(0..MAX_TIMING_ADVANCE),
                        subframe,
                    };
                    registry.terminal_mut(id)?.connect(grant)?;
                    registry.record_connected(id)?;

                    debug!(subframe, slot, terminal = %id, temp_id = %grant.temp_id, "terminal connected");
                    resolution.connected.push(id);
                }
                n => {
                    resolution.collisions += 1;
                    resolution.colliding_terminals += n;
                    users.sort_unstable();

                    for id in users {
                        let outcome = registry.terminal_mut(id)?.record_collision(self.retry_limit, subframe)?;
                        if outcome == CollisionOutcome::Excluded {
                            registry.record_excluded(id)?;
                            debug!(subframe, slot, terminal = %id, "terminal excluded");
                            resolution.excluded.push(id);
                        }
                    }
                }
            }
        }

        Ok(resolution)
    }

    fn allocate_temp_id(&mut self) -> TempId {
        let id = TempId(self.next_temp_id);
        self.next_temp_id += 1;
        id
    }
}
