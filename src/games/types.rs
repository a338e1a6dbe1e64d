//! Shared type definitions for the two game modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Lifecycle state of a crash round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoundState {
    Countdown,
    Flight,
    Crashed,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundState::Countdown => write!(f, "countdown"),
            RoundState::Flight => write!(f, "flight"),
            RoundState::Crashed => write!(f, "crashed"),
        }
    }
}

/// One cycle of the rising-multiplier game.
///
/// The crash point is fixed when the round enters flight and stays hidden
/// from consumers until the round has crashed.
#[derive(Debug, Clone)]
pub struct Round {
    pub id: String,
    pub state: RoundState,
    /// Drawn at flight entry; infinity while still counting down.
    crash_point: f64,
    pub multiplier: f64,
    /// Unix-ms timestamp of the latest state transition.
    pub started_at: u64,
}

impl Round {
    pub(crate) fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            state: RoundState::Countdown,
            crash_point: f64::INFINITY,
            multiplier: 1.0,
            started_at: current_timestamp_ms(),
        }
    }

    pub(crate) fn enter_flight(&mut self, crash_point: f64) {
        self.state = RoundState::Flight;
        self.crash_point = crash_point;
        self.multiplier = 1.0;
        self.started_at = current_timestamp_ms();
    }

    /// Freeze the multiplier at the crash point.
    pub(crate) fn crash(&mut self) {
        self.state = RoundState::Crashed;
        self.multiplier = self.crash_point;
        self.started_at = current_timestamp_ms();
    }

    /// The crash point, revealed only once the round has crashed.
    pub fn crash_point(&self) -> Option<f64> {
        (self.state == RoundState::Crashed).then_some(self.crash_point)
    }

    /// Crash-check threshold for the flight tick.
    pub(crate) fn flight_ceiling(&self) -> f64 {
        self.crash_point
    }
}

/// Status of a crash-mode wager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WagerStatus {
    Pending,
    Active,
    CashedOut,
    Lost,
}

impl fmt::Display for WagerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WagerStatus::Pending => write!(f, "pending"),
            WagerStatus::Active => write!(f, "active"),
            WagerStatus::CashedOut => write!(f, "cashedout"),
            WagerStatus::Lost => write!(f, "lost"),
        }
    }
}

/// A stake riding one crash round. At most one non-terminal wager exists per
/// session at any time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wager {
    pub round_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_cash_out: Option<f64>,
    pub status: WagerStatus,
    /// Set iff the wager was cashed out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashed_out_at: Option<f64>,
}

impl Wager {
    /// Pending and active wagers block further placement.
    pub fn is_live(&self) -> bool {
        matches!(self.status, WagerStatus::Pending | WagerStatus::Active)
    }
}

/// Which side of the target a dice roll must land on to win.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiceDirection {
    Under,
    Over,
}

impl fmt::Display for DiceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiceDirection::Under => write!(f, "under"),
            DiceDirection::Over => write!(f, "over"),
        }
    }
}

/// Parameters for a single dice roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceRollRequest {
    pub amount: f64,
    /// Threshold in `(0, 100)`; fractional targets are allowed.
    pub target: f64,
    pub direction: DiceDirection,
}

/// A fully resolved dice bet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceBet {
    pub amount: f64,
    pub target: f64,
    pub direction: DiceDirection,
    /// Win probability as a percentage.
    pub win_chance: f64,
    /// Payout multiplier applied on a win.
    pub payout_multiplier: f64,
    pub rolled_value: f64,
    pub won: bool,
    /// Credited amount; zero on a loss.
    pub payout: f64,
}

/// Read-only view of the crash session, pushed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashSnapshot {
    pub round_id: String,
    pub state: RoundState,
    pub multiplier: f64,
    /// Countdown seconds remaining; zero outside the countdown.
    pub seconds_left: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager: Option<Wager>,
    /// Revealed once the round has crashed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crash_point: Option<f64>,
}

/// Current unix time in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
