//! Preamble pool: the shared contention slots of one random access occasion.
//!
//! For each subframe the pool records which terminals transmitted on which
//! preamble. Nothing survives a `reset()`: usage never carries across
//! subframes.
//!
//! # Thread Safety
//!
//! `select` takes `&self` and locks only the targeted slot, so terminals can
//! record their draws from a worker pool. Two selections on the same slot are
//! serialized by that slot's mutex; selections on different slots never
//! contend. `reset` takes `&mut self` and needs no locking at all.

use crate::error::{Error, Result};
use crate::terminal::TerminalId;
use parking_lot::Mutex;

/// Number of contention preambles in one PRACH occasion.
pub const DEFAULT_SLOT_COUNT: usize = 64;

/// Fixed-size set of contention slots with per-slot usage sets.
#[derive(Debug)]
pub struct PreamblePool {
    slots: Vec<Mutex<Vec<TerminalId>>>,
}

impl PreamblePool {
    /// Create a pool with `slot_count` empty slots.
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: (0..slot_count).map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Clear every slot's usage set.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.get_mut().clear();
        }
    }

    /// Record that `terminal` transmitted on `slot` this subframe.
    ///
    /// The pool does not deduplicate: the scheduler guarantees at most one
    /// selection per terminal per subframe.
    ///
    /// # Errors
    /// `SlotOutOfRange` if `slot >= slot_count`.
    pub fn select(&self, terminal: TerminalId, slot: usize) -> Result<()> {
        let usage = self.slots.get(slot).ok_or(Error::SlotOutOfRange {
            slot,
            slot_count: self.slots.len(),
        })?;
        usage.lock().push(terminal);
        Ok(())
    }

    /// Snapshot of the terminals that selected `slot` this subframe.
    ///
    /// Out-of-range slots have no users.
    pub fn usage(&self, slot: usize) -> Vec<TerminalId> {
        self.slots
            .get(slot)
            .map(|usage| usage.lock().clone())
            .unwrap_or_default()
    }

    /// Sum of usage-set sizes across all slots.
    pub fn total_selections(&self) -> usize {
        self.slots.iter().map(|usage| usage.lock().len()).sum()
    }

    /// Number of slots nobody selected this subframe.
    pub fn idle_slots(&self) -> usize {
        self.slots.iter().filter(|usage| usage.lock().is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_select_and_usage() {
        let pool = PreamblePool::new(4);
        pool.select(TerminalId(0), 2).unwrap();
        pool.select(TerminalId(1), 2).unwrap();
        pool.select(TerminalId(2), 0).unwrap();

        assert_eq!(pool.usage(2), vec![TerminalId(0), TerminalId(1)]);
        assert_eq!(pool.usage(0), vec![TerminalId(2)]);
        assert!(pool.usage(1).is_empty());
        assert_eq!(pool.total_selections(), 3);
        assert_eq!(pool.idle_slots(), 2);
    }

    #[test]
    fn test_out_of_range() {
        let pool = PreamblePool::new(2);
        let err = pool.select(TerminalId(0), 2).unwrap_err();

        assert_eq!(err, Error::SlotOutOfRange { slot: 2, slot_count: 2 });
        assert!(pool.usage(7).is_empty());
        assert_eq!(pool.total_selections(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut pool = PreamblePool::new(3);
        for i in 0..9 {
            pool.select(TerminalId(i), i as usize % 3).unwrap();
        }

        pool.reset();
        assert_eq!(pool.total_selections(), 0);
        assert_eq!(pool.idle_slots(), 3);
    }

    #[test]
    fn test_reset_idempotent() {
        let mut pool = PreamblePool::new(3);
        pool.select(TerminalId(0), 1).unwrap();

        pool.reset();
        pool.reset();

        for slot in 0..3 {
            assert!(pool.usage(slot).is_empty());
        }
    }

    #[test]
    fn test_concurrent_selection_loses_nothing() {
        let pool = PreamblePool::new(8);

        (0..10_000u32).into_par_iter().for_each(|i| {
            pool.select(TerminalId(i), (i % 8) as usize).unwrap();
        });

        assert_eq!(pool.total_selections(), 10_000);
        for slot in 0..8 {
            assert_eq!(pool.usage(slot).len(), 1250);
        }
    }
}
