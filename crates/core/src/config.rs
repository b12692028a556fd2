//! Simulation parameters and their validation.

use crate::error::{ConfigError, Result};
use crate::growth::{BoundedGrowth, GrowthPolicy, NoGrowth};
use crate::preamble::DEFAULT_SLOT_COUNT;
use serde::Serialize;

/// Default retry budget before a terminal is excluded.
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

/// Default number of terminals present at subframe 0.
pub const DEFAULT_INITIAL_POPULATION: usize = 100;

/// How pending terminals record their slot draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// One terminal after another on the scheduler thread
    #[default]
    Sequential,

    /// One rayon task per terminal
    Parallel,
}

/// When the scheduler stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No pending terminal left and nobody else will join
    UntilResolved,

    /// Fixed number of subframes
    Horizon(u64),
}

/// Complete configuration for one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationConfig {
    /// Number of contention preambles
    pub slot_count: usize,

    /// Collisions tolerated before exclusion
    pub retry_limit: u32,

    /// Terminals present at start
    pub initial_population: usize,

    /// Max terminals admitted per subframe (0 disables growth)
    pub growth_bound: usize,

    /// Cap on the total admitted population
    pub max_population: Option<usize>,

    /// Max subframes to simulate (0 = run until resolved)
    pub horizon: u64,

    /// Seed for every random draw in the run
    pub seed: u64,

    pub selection: SelectionMode,
}

impl SimulationConfig {
    /// Fixed population with the default slot count and retry limit.
    pub fn fixed_population(initial_population: usize, seed: u64) -> Self {
        Self {
            initial_population,
            seed,
            ..Self::default()
        }
    }

    /// Reject parameter sets the engine cannot run meaningfully.
    pub fn validate(&self) -> Result<()> {
        if self.slot_count == 0 {
            return Err(ConfigError::ZeroSlots.into());
        }
        if self.retry_limit == 0 {
            return Err(ConfigError::ZeroRetryLimit.into());
        }
        if let Some(max) = self.max_population {
            if max < self.initial_population {
                return Err(ConfigError::CapBelowInitial {
                    max,
                    initial: self.initial_population,
                }
                .into());
            }
        }
        if self.growth_bound > 0 && self.horizon == 0 && self.max_population.is_none() {
            return Err(ConfigError::UnboundedGrowth {
                growth_bound: self.growth_bound,
            }
            .into());
        }
        Ok(())
    }

    pub fn termination(&self) -> Termination {
        match self.horizon {
            0 => Termination::UntilResolved,
            n => Termination::Horizon(n),
        }
    }

    /// Growth policy matching `growth_bound` and `max_population`.
    pub fn growth_policy(&self) -> Box<dyn GrowthPolicy> {
        if self.growth_bound == 0 {
            Box::new(NoGrowth)
        } else {
            Box::new(BoundedGrowth::new(self.growth_bound, self.max_population))
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            retry_limit: DEFAULT_RETRY_LIMIT,
            initial_population: DEFAULT_INITIAL_POPULATION,
            growth_bound: 0,
            max_population: None,
            horizon: 0,
            seed: 0,
            selection: SelectionMode::Sequential,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.termination(), Termination::UntilResolved);
    }

    #[test]
    fn test_zero_slots_rejected() {
        let config = SimulationConfig {
            slot_count: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(Error::Config(ConfigError::ZeroSlots)));
    }

    #[test]
    fn test_zero_retry_limit_rejected() {
        let config = SimulationConfig {
            retry_limit: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(Error::Config(ConfigError::ZeroRetryLimit)));
    }

    #[test]
    fn test_growth_needs_bound() {
        let mut config = SimulationConfig {
            growth_bound: 4,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::UnboundedGrowth { growth_bound: 4 }))
        ));

        config.horizon = 50;
        assert!(config.validate().is_ok());
        assert_eq!(config.termination(), Termination::Horizon(50));

        config.horizon = 0;
        config.max_population = Some(500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cap_below_initial_rejected() {
        let config = SimulationConfig {
            max_population: Some(10),
            ..SimulationConfig::fixed_population(20, 1)
        };
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::CapBelowInitial { max: 10, initial: 20 }))
        ));
    }
}
