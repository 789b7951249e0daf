use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Hard upper bound on seats; seats are stored inline in a fixed array.
pub const MAX_SEATS: usize = 6;

/// Longest accepted action or randomness window: one year.
pub const MAX_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

/// Engine-wide rules shared by every table in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Percentage of each settled pot kept as commission (0-100).
    pub commission_rate: u64,
    /// Seconds the current actor has before anyone may force a fold.
    pub action_timeout_secs: u64,
    /// Seconds to wait for randomness before the game may be cancelled.
    pub randomness_timeout_secs: u64,
    pub min_players: usize,
    pub max_players: usize,
    /// Minimum buy-in, in big blinds.
    pub min_buy_in_big_blinds: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            commission_rate: 5,
            action_timeout_secs: 300,
            randomness_timeout_secs: 3600,
            min_players: 2,
            max_players: MAX_SEATS,
            min_buy_in_big_blinds: 10,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.commission_rate > 100 {
            return Err(GameError::InvalidConfig(
                "commission_rate must be <= 100".into(),
            ));
        }
        let window = 1..=MAX_TIMEOUT_SECS;
        if !window.contains(&self.action_timeout_secs)
            || !window.contains(&self.randomness_timeout_secs)
        {
            return Err(GameError::InvalidConfig(format!(
                "timeouts must be between 1 and {} seconds",
                MAX_TIMEOUT_SECS
            )));
        }
        if self.min_players < 2 || self.max_players > MAX_SEATS || self.min_players > self.max_players
        {
            return Err(GameError::InvalidConfig(format!(
                "player bounds must satisfy 2 <= min <= max <= {}",
                MAX_SEATS
            )));
        }
        Ok(())
    }
}
