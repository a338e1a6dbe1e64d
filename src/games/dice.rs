//! Single-shot threshold roll.
//!
//! No lifecycle: one call validates, debits, draws, and settles. A session
//! gate serializes the debit → draw → credit sequence against other
//! operations on the same account, so no transient balance is observable.

use crate::errors::EngineResult;
use crate::events::{EventBus, SessionEvent};
use crate::games::types::{DiceBet, DiceRollRequest};
use crate::history::HistoryLog;
use crate::ledger::WagerLedger;
use crate::outcome::OutcomeGenerator;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tracing::debug;

/// Resolves threshold-roll bets for one session.
pub struct DiceResolver {
    user_id: String,
    ledger: Arc<WagerLedger>,
    outcome: Arc<OutcomeGenerator>,
    history: Arc<StdMutex<HistoryLog>>,
    events: Arc<EventBus>,
    /// Serializes settlement against concurrent rolls on this session.
    gate: Mutex<()>,
}

impl DiceResolver {
    pub fn new(
        user_id: String,
        ledger: Arc<WagerLedger>,
        outcome: Arc<OutcomeGenerator>,
        history: Arc<StdMutex<HistoryLog>>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            user_id,
            ledger,
            outcome,
            history,
            events,
            gate: Mutex::new(()),
        }
    }

    /// Resolve one bet atomically and record the roll.
    pub async fn roll(&self, request: DiceRollRequest) -> EngineResult<DiceBet> {
        let _guard = self.gate.lock().await;
        match self
            .ledger
            .resolve_dice_bet(&self.user_id, &request, &self.outcome)
            .await
        {
            Ok(bet) => {
                if let Ok(mut history) = self.history.lock() {
                    history.push(bet.rolled_value);
                }
                debug!(user = %self.user_id, rolled = bet.rolled_value, won = bet.won, "dice rolled");
                self.events.publish(SessionEvent::DiceResolved { bet: bet.clone() });
                Ok(bet)
            }
            Err(e) => {
                self.events.publish(SessionEvent::BetRejected {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
