//! Population registry: every terminal ever admitted to a simulation run.
//!
//! Terminal identifiers are handed out sequentially from the total-admitted
//! counter, so the identifier doubles as the index into the terminal table
//! and is never reused. The connected and excluded sequences are append-only
//! and keep the order in which terminals reached those states.

use crate::error::{Error, Result};
use crate::terminal::{Terminal, TerminalId, TerminalStatus};
use std::collections::HashSet;
use std::ops::Range;

/// Owner of all terminal records plus the connected/excluded sequences.
#[derive(Debug, Clone, Default)]
pub struct PopulationRegistry {
    terminals: Vec<Terminal>,
    connected: Vec<TerminalId>,
    excluded: Vec<TerminalId>,
    // The status check alone lets a second record of an already connected
    // or excluded terminal through, since its status still matches.
    recorded: HashSet<TerminalId>,
}

impl PopulationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with `count` pending terminals.
    pub fn with_population(count: usize) -> Result<Self> {
        let mut registry = Self::new();
        registry.admit(count)?;
        Ok(registry)
    }

    /// Admit `count` fresh terminals, all `Pending`.
    ///
    /// Returns the identifier range that was assigned. `count == 0` is a
    /// no-op and returns an empty range.
    ///
    /// # Errors
    /// `PopulationOverflow` if the new identifiers would not fit in a
    /// `TerminalId`. Nothing is admitted in that case.
    pub fn admit(&mut self, count: usize) -> Result<Range<u32>> {
        let admitted = self.terminals.len();
        let overflow = || Error::PopulationOverflow {
            admitted,
            requested: count,
        };
        let start = u32::try_from(admitted).map_err(|_| overflow())?;
        let end = u32::try_from(count)
            .ok()
            .and_then(|count| start.checked_add(count))
            .ok_or_else(overflow)?;

        self.terminals.extend((start..end).map(|id| Terminal::new(TerminalId(id))));
        Ok(start..end)
    }

    /// Total terminals ever admitted (never decreases).
    pub fn total_admitted(&self) -> usize {
        self.terminals.len()
    }

    /// Terminals that are neither connected nor excluded.
    pub fn active_count(&self) -> usize {
        self.terminals.len() - self.connected.len() - self.excluded.len()
    }

    /// Identifiers of all pending terminals, in ascending order.
    pub fn pending_ids(&self) -> Vec<TerminalId> {
        self.terminals
            .iter()
            .filter(|t| t.is_pending())
            .map(Terminal::id)
            .collect()
    }

    /// Connected terminals in order of connection.
    pub fn connected(&self) -> &[TerminalId] {
        &self.connected
    }

    /// Excluded terminals in order of exclusion.
    pub fn excluded(&self) -> &[TerminalId] {
        &self.excluded
    }

    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    /// Look up a terminal by identifier.
    pub fn terminal(&self, id: TerminalId) -> Result<&Terminal> {
        self.terminals
            .get(id.0 as usize)
            .ok_or(Error::UnknownTerminal(id))
    }

    pub(crate) fn terminal_mut(&mut self, id: TerminalId) -> Result<&mut Terminal> {
        self.terminals
            .get_mut(id.0 as usize)
            .ok_or(Error::UnknownTerminal(id))
    }

    /// Append a terminal that has just moved to `Connected`.
    ///
    /// # Errors
    /// - `UnknownTerminal` if the id was never admitted
    /// - `InvalidTransition` if the terminal is not actually connected
    /// - `AlreadyRecorded` on a second call for the same id
    pub fn record_connected(&mut self, id: TerminalId) -> Result<()> {
        let status = self.terminal(id)?.status();
        if !matches!(status, TerminalStatus::Connected(_)) {
            return Err(Error::InvalidTransition { id, from: status });
        }
        self.mark_recorded(id)?;
        self.connected.push(id);
        Ok(())
    }

    /// Append a terminal that has just moved to `Excluded`.
    ///
    /// # Errors
    /// Same conditions as [`record_connected`](Self::record_connected).
    pub fn record_excluded(&mut self, id: TerminalId) -> Result<()> {
        let status = self.terminal(id)?.status();
        if !matches!(status, TerminalStatus::Excluded { .. }) {
            return Err(Error::InvalidTransition { id, from: status });
        }
        self.mark_recorded(id)?;
        self.excluded.push(id);
        Ok(())
    }

    fn mark_recorded(&mut self, id: TerminalId) -> Result<()> {
        if !self.recorded.insert(id) {
            return Err(Error::AlreadyRecorded(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::{Grant, TempId};

    fn connect(registry: &mut PopulationRegistry, id: u32) {
        let grant = Grant {
            temp_id: TempId(id + 100),
            timing_advance: 0,
            subframe: 0,
        };
        registry.terminal_mut(TerminalId(id)).unwrap().connect(grant).unwrap();
        registry.record_connected(TerminalId(id)).unwrap();
    }

    #[test]
    fn test_initial_population() {
        let registry = PopulationRegistry::with_population(5).unwrap();
        assert_eq!(registry.total_admitted(), 5);
        assert_eq!(registry.active_count(), 5);
        assert_eq!(registry.pending_ids().len(), 5);
    }

    #[test]
    fn test_admit_assigns_fresh_sequential_ids() {
        let mut registry = PopulationRegistry::with_population(3).unwrap();

        assert_eq!(registry.admit(2).unwrap(), 3..5);
        assert_eq!(registry.admit(0).unwrap(), 5..5);
        assert_eq!(registry.admit(1).unwrap(), 5..6);

        assert_eq!(registry.total_admitted(), 6);
        assert_eq!(registry.terminal(TerminalId(5)).unwrap().id(), TerminalId(5));
    }

    #[test]
    fn test_connected_order_is_connection_order() {
        let mut registry = PopulationRegistry::with_population(4).unwrap();
        connect(&mut registry, 3);
        connect(&mut registry, 0);

        assert_eq!(registry.connected(), &[TerminalId(3), TerminalId(0)]);
        assert_eq!(registry.active_count(), 2);
        assert_eq!(registry.pending_ids(), vec![TerminalId(1), TerminalId(2)]);
    }

    #[test]
    fn test_record_excluded() {
        let mut registry = PopulationRegistry::with_population(2).unwrap();
        let terminal = registry.terminal_mut(TerminalId(1)).unwrap();
        terminal.record_collision(1, 0).unwrap();
        terminal.record_collision(1, 1).unwrap();

        registry.record_excluded(TerminalId(1)).unwrap();
        assert_eq!(registry.excluded(), &[TerminalId(1)]);
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_double_record_rejected() {
        let mut registry = PopulationRegistry::with_population(1).unwrap();
        connect(&mut registry, 0);

        let err = registry.record_connected(TerminalId(0)).unwrap_err();
        assert_eq!(err, Error::AlreadyRecorded(TerminalId(0)));
        assert_eq!(registry.connected().len(), 1);
    }

    #[test]
    fn test_record_requires_matching_status() {
        let mut registry = PopulationRegistry::with_population(1).unwrap();

        assert!(matches!(
            registry.record_connected(TerminalId(0)),
            Err(Error::InvalidTransition { .. })
        ));
        assert!(matches!(
            registry.record_excluded(TerminalId(0)),
            Err(Error::InvalidTransition { .. })
        ));
        assert!(registry.connected().is_empty());
    }

    #[test]
    fn test_admit_past_identifier_space_rejected() {
        let mut registry = PopulationRegistry::with_population(2).unwrap();

        let err = registry.admit(u32::MAX as usize).unwrap_err();
        assert_eq!(
            err,
            Error::PopulationOverflow {
                admitted: 2,
                requested: u32::MAX as usize,
            }
        );
        assert_eq!(registry.total_admitted(), 2);

        // Still usable afterwards
        assert_eq!(registry.admit(1).unwrap(), 2..3);
    }

    #[test]
    fn test_double_record_excluded_rejected() {
        let mut registry = PopulationRegistry::with_population(1).unwrap();
        let terminal = registry.terminal_mut(TerminalId(0)).unwrap();
        terminal.record_collision(1, 0).unwrap();
        terminal.record_collision(1, 1).unwrap();
        registry.record_excluded(TerminalId(0)).unwrap();

        // Status still says excluded, only the recorded set catches this
        assert_eq!(
            registry.record_excluded(TerminalId(0)).unwrap_err(),
            Error::AlreadyRecorded(TerminalId(0))
        );
        assert_eq!(registry.excluded(), &[TerminalId(0)]);
    }

    #[test]
    fn test_unknown_terminal() {
        let registry = PopulationRegistry::with_population(1).unwrap();
        assert_eq!(
            registry.terminal(TerminalId(9)).unwrap_err(),
            Error::UnknownTerminal(TerminalId(9))
        );
    }
}
