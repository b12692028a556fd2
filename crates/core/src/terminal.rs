//! Per-terminal state machine.
//!
//! Each terminal starts `Pending` with zero attempts and ends in exactly one
//! of two absorbing states:
//!
//! ```text
//!            sole user of a slot
//! Pending ─────────────────────────► Connected
//!    │  ▲
//!    │  │ collision, attempts <= retry_limit
//!    └──┘
//!    │
//!    │ collision, attempts > retry_limit
//!    └─────────────────────────────► Excluded
//! ```
//!
//! The status is a single tagged enum, so a terminal can never be connected
//! and excluded at the same time.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Permanent identity of a terminal, assigned at admission and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TerminalId(pub u32);

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UE{}", self.0)
    }
}

/// Session-scoped identifier handed out on connection (temporary C-RNTI).
///
/// Lives in its own namespace: it has no relation to the `TerminalId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TempId(pub u32);

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Random access response delivered to a terminal that won its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grant {
    /// Temporary identifier for the connected-mode session
    pub temp_id: TempId,

    /// Timing advance placeholder (no timing model behind it)
    pub timing_advance: u32,

    /// Subframe in which the terminal connected (0-based)
    pub subframe: u64,
}

/// Lifecycle status of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TerminalStatus {
    /// Still competing for a slot
    Pending,

    /// Won a slot; absorbing
    Connected(Grant),

    /// Exhausted its retry budget; absorbing
    Excluded {
        /// Subframe of the collision that pushed it past the limit
        subframe: u64,
    },
}

impl TerminalStatus {
    /// True for `Connected` and `Excluded`.
    pub fn is_absorbing(&self) -> bool {
        !matches!(self, TerminalStatus::Pending)
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalStatus::Pending => write!(f, "pending"),
            TerminalStatus::Connected(grant) => write!(f, "connected({})", grant.temp_id),
            TerminalStatus::Excluded { subframe } => write!(f, "excluded@{}", subframe),
        }
    }
}

/// What a collision did to a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Still under the retry limit; draws again next subframe
    Retry,

    /// Pushed past the retry limit
    Excluded,
}

/// Mutable record of one simulated terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Terminal {
    id: TerminalId,
    attempts: u32,
    status: TerminalStatus,
}

impl Terminal {
    /// Create a fresh `Pending` terminal with no attempts.
    pub fn new(id: TerminalId) -> Self {
        Self {
            id,
            attempts: 0,
            status: TerminalStatus::Pending,
        }
    }

    pub fn id(&self) -> TerminalId {
        self.id
    }

    /// Number of collisions this terminal has taken part in.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn status(&self) -> TerminalStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == TerminalStatus::Pending
    }

    /// Grant received on connection, if connected.
    pub fn grant(&self) -> Option<Grant> {
        match self.status {
            TerminalStatus::Connected(grant) => Some(grant),
            _ => None,
        }
    }

    /// Move to `Connected` with the given grant.
    ///
    /// # Errors
    /// `InvalidTransition` if the terminal is already connected or excluded.
    pub fn connect(&mut self, grant: Grant) -> Result<()> {
        self.ensure_pending()?;
        self.status = TerminalStatus::Connected(grant);
        Ok(())
    }

    /// Register participation in a collision.
    ///
    /// Increments the attempt counter, then excludes the terminal if the
    /// counter is now strictly greater than `retry_limit`.
    ///
    /// # Errors
    /// `InvalidTransition` if the terminal is not pending. The attempt counter
    /// is left untouched in that case.
    pub fn record_collision(&mut self, retry_limit: u32, subframe: u64) -> Result<CollisionOutcome> {
        self.ensure_pending()?;

        self.attempts += 1;
        if self.attempts > retry_limit {
            self.status = TerminalStatus::Excluded { subframe };
            Ok(CollisionOutcome::Excluded)
        } else {
            Ok(CollisionOutcome::Retry)
        }
    }

    fn ensure_pending(&self) -> Result<()> {
        if self.status.is_absorbing() {
            return Err(Error::InvalidTransition {
                id: self.id,
                from: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(temp: u32) -> Grant {
        Grant {
            temp_id: TempId(temp),
            timing_advance: 7,
            subframe: 0,
        }
    }

    #[test]
    fn test_new_terminal_is_pending() {
        let t = Terminal::new(TerminalId(3));
        assert!(t.is_pending());
        assert_eq!(t.attempts(), 0);
        assert!(t.grant().is_none());
    }

    #[test]
    fn test_connect() {
        let mut t = Terminal::new(TerminalId(0));
        t.connect(grant(0x3d)).unwrap();

        assert_eq!(t.grant().unwrap().temp_id, TempId(0x3d));
        assert!(t.status().is_absorbing());
    }

    #[test]
    fn test_collision_below_limit_retries() {
        let mut t = Terminal::new(TerminalId(0));
        assert_eq!(t.record_collision(2, 0).unwrap(), CollisionOutcome::Retry);
        assert_eq!(t.record_collision(2, 1).unwrap(), CollisionOutcome::Retry);
        assert_eq!(t.attempts(), 2);
        assert!(t.is_pending());
    }

    #[test]
    fn test_excluded_on_first_collision_past_limit() {
        let mut t = Terminal::new(TerminalId(0));
        t.record_collision(1, 0).unwrap();
        assert_eq!(t.record_collision(1, 4).unwrap(), CollisionOutcome::Excluded);

        assert_eq!(t.attempts(), 2);
        assert_eq!(t.status(), TerminalStatus::Excluded { subframe: 4 });
    }

    #[test]
    fn test_connected_is_absorbing() {
        let mut t = Terminal::new(TerminalId(5));
        t.connect(grant(1)).unwrap();

        assert!(matches!(t.connect(grant(2)), Err(Error::InvalidTransition { .. })));
        assert!(t.record_collision(1, 1).is_err());
        assert_eq!(t.attempts(), 0);
        assert_eq!(t.grant().unwrap().temp_id, TempId(1));
    }

    #[test]
    fn test_excluded_is_absorbing() {
        let mut t = Terminal::new(TerminalId(5));
        t.record_collision(1, 0).unwrap();
        t.record_collision(1, 1).unwrap();

        assert!(t.connect(grant(9)).is_err());
        assert!(t.record_collision(1, 2).is_err());
        assert_eq!(t.attempts(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(TerminalId(12).to_string(), "UE12");
        assert_eq!(TempId(0x3d).to_string(), "0x003d");
        assert_eq!(TerminalStatus::Excluded { subframe: 3 }.to_string(), "excluded@3");
    }
}
