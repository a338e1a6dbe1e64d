//! Push stream from the engine to the presentation layer.
//!
//! One event per tick or resolution. Subscribers render; they never drive
//! timing. Events serialize with a `type` tag so they can go straight over
//! any transport.

use crate::games::types::DiceBet;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Events published by a running session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A fresh round is armed and counting down.
    NewRound { round_id: String, seconds_left: u64 },
    CountdownTick { round_id: String, seconds_left: u64 },
    BetPlaced {
        round_id: String,
        amount: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        auto_cash_out: Option<f64>,
    },
    /// A bet was refused; `reason` is presentable to the user.
    BetRejected { reason: String },
    FlightStarted { round_id: String },
    MultiplierTick { round_id: String, multiplier: f64 },
    CashedOut {
        round_id: String,
        multiplier: f64,
        payout: f64,
        /// True when triggered by the auto-cash-out threshold.
        auto: bool,
    },
    Crashed { round_id: String, crash_point: f64 },
    DiceResolved { bet: DiceBet },
    SessionClosed,
}

/// Broadcast fan-out for session events.
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; having no subscribers is not an error.
    pub fn publish(&self, event: SessionEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("no subscribers for session event: {}", e);
        }
    }
}
