//! Outcome generation for both game modes.
//!
//! The crash-point formula reproduces the shipped behavior exactly. It is an
//! ordinary pseudo-random draw, not a commit-reveal construction; see
//! DESIGN.md before relying on it for verifiable fairness.

use crate::config::EngineConfig;
use crate::games::types::DiceDirection;
use crate::rng::RandomSource;
use std::sync::Arc;

/// Computes crash points and dice outcomes from uniform draws.
pub struct OutcomeGenerator {
    rng: Arc<dyn RandomSource>,
    house_edge: f64,
    max_multiplier: f64,
    rtp: f64,
}

impl OutcomeGenerator {
    pub fn new(rng: Arc<dyn RandomSource>, config: &EngineConfig) -> Self {
        Self {
            rng,
            house_edge: config.crash.house_edge,
            max_multiplier: config.crash.max_multiplier,
            rtp: config.dice.rtp,
        }
    }

    /// Draw the multiplier at which the next round will crash.
    ///
    /// `floor((1 - house_edge) / r)` plus up to 2.0 of jitter, clamped to
    /// `[1.0, max_multiplier]`. A zero draw rides the clamp to the maximum.
    pub fn draw_crash_point(&self) -> f64 {
        let r = self.rng.next_unit();
        let raw = ((1.0 - self.house_edge) / r).floor();
        let jitter = self.rng.next_unit() * 2.0;
        (raw + jitter).clamp(1.0, self.max_multiplier)
    }

    /// Draw a dice roll, uniform over `[0, 100)`.
    pub fn draw_dice_roll(&self) -> f64 {
        self.rng.next_unit() * 100.0
    }

    /// A roll exactly on the target loses in both directions.
    pub fn resolve_dice(&self, target: f64, direction: DiceDirection, rolled: f64) -> bool {
        match direction {
            DiceDirection::Under => rolled < target,
            DiceDirection::Over => rolled > target,
        }
    }

    /// Win probability, as a percentage, for a target and direction.
    pub fn dice_win_chance(&self, target: f64, direction: DiceDirection) -> f64 {
        match direction {
            DiceDirection::Under => target,
            DiceDirection::Over => 100.0 - target,
        }
    }

    /// Payout multiplier for a win chance at the configured RTP.
    pub fn dice_payout(&self, win_chance: f64) -> f64 {
        if win_chance > 0.0 {
            self.rtp / win_chance
        } else {
            0.0
        }
    }
}
