//! Engine configuration with validation and defaults.

use crate::errors::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for one game session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    pub crash: CrashConfig,
    pub dice: DiceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            crash: CrashConfig::default(),
            dice: DiceConfig::default(),
        }
    }
}

/// Timing and payout parameters for the crash round loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrashConfig {
    /// Seconds counted down before each flight.
    pub countdown_secs: u64,
    /// Cadence of the flight tick in milliseconds.
    pub flight_tick_ms: u64,
    /// Multiplier increment applied on every flight tick.
    pub multiplier_step: f64,
    /// Pause between a crash and the next countdown.
    pub intermission_secs: u64,
    /// House edge folded into the crash-point draw.
    pub house_edge: f64,
    /// Upper clamp on the drawn crash point.
    pub max_multiplier: f64,
    /// How many past crash points the history keeps.
    pub history_capacity: usize,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 10,
            flight_tick_ms: 50,
            multiplier_step: 0.01,
            intermission_secs: 3,
            house_edge: 0.01,
            max_multiplier: 100.0,
            history_capacity: 5,
        }
    }
}

impl CrashConfig {
    pub fn countdown_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    pub fn flight_interval(&self) -> Duration {
        Duration::from_millis(self.flight_tick_ms)
    }

    pub fn intermission(&self) -> Duration {
        Duration::from_secs(self.intermission_secs)
    }
}

/// Payout parameters for the threshold-roll mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiceConfig {
    /// Return-to-player, as a percentage. Payout is `rtp / win_chance`.
    pub rtp: f64,
    /// How many past rolls the history keeps.
    pub history_capacity: usize,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            rtp: 98.0,
            history_capacity: 10,
        }
    }
}

impl EngineConfig {
    /// Shorter countdown and intermission for demos and local play.
    pub fn quick_play() -> Self {
        Self {
            crash: CrashConfig {
                countdown_secs: 3,
                intermission_secs: 2,
                ..CrashConfig::default()
            },
            dice: DiceConfig::default(),
        }
    }

    /// Validate parameter ranges and timing relationships.
    pub fn validate(&self) -> EngineResult<()> {
        if self.crash.countdown_secs == 0 {
            return Err(EngineError::InvalidConfig(
                "countdown_secs must be > 0".to_string(),
            ));
        }
        if self.crash.flight_tick_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "flight_tick_ms must be > 0".to_string(),
            ));
        }
        if self.crash.multiplier_step <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "multiplier_step must be > 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.crash.house_edge) {
            return Err(EngineError::InvalidConfig(
                "house_edge must be in [0, 1)".to_string(),
            ));
        }
        if self.crash.max_multiplier < 1.0 {
            return Err(EngineError::InvalidConfig(
                "max_multiplier must be >= 1.0".to_string(),
            ));
        }
        if self.crash.history_capacity == 0 || self.dice.history_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "history_capacity must be > 0".to_string(),
            ));
        }
        if self.dice.rtp <= 0.0 || self.dice.rtp > 100.0 {
            return Err(EngineError::InvalidConfig(
                "rtp must be in (0, 100]".to_string(),
            ));
        }
        Ok(())
    }
}
