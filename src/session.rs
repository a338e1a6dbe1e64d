//! Session lifecycle.
//!
//! One user, one private crash round loop, one dice resolver, one event
//! stream. The session owns all mutable game state; the presentation layer
//! only observes snapshots and events.

use crate::balance::BalanceStore;
use crate::config::EngineConfig;
use crate::errors::EngineResult;
use crate::events::{EventBus, SessionEvent};
use crate::games::crash::RoundScheduler;
use crate::games::dice::DiceResolver;
use crate::games::types::{CrashSnapshot, DiceBet, DiceRollRequest, Wager};
use crate::history::{HistoryEntry, HistoryLog};
use crate::ledger::WagerLedger;
use crate::outcome::OutcomeGenerator;
use crate::rng::{RandomSource, ThreadRngSource};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const EVENT_CAPACITY: usize = 1024;

/// A running game session: create with [`GameSession::open`], observe via
/// [`GameSession::subscribe`], tear down with [`GameSession::close`].
pub struct GameSession {
    user_id: String,
    balances: Arc<dyn BalanceStore>,
    scheduler: Arc<RoundScheduler>,
    dice: DiceResolver,
    crash_history: Arc<StdMutex<HistoryLog>>,
    dice_history: Arc<StdMutex<HistoryLog>>,
    events: Arc<EventBus>,
    driver: StdMutex<Option<JoinHandle<()>>>,
}

impl GameSession {
    /// Open a session with the production randomness source.
    pub fn open(
        config: EngineConfig,
        user_id: impl Into<String>,
        balances: Arc<dyn BalanceStore>,
    ) -> EngineResult<Self> {
        Self::open_with_rng(config, user_id, balances, Arc::new(ThreadRngSource))
    }

    /// Open a session with an injected randomness source.
    pub fn open_with_rng(
        config: EngineConfig,
        user_id: impl Into<String>,
        balances: Arc<dyn BalanceStore>,
        rng: Arc<dyn RandomSource>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let user_id = user_id.into();

        let events = Arc::new(EventBus::new(EVENT_CAPACITY));
        let outcome = Arc::new(OutcomeGenerator::new(rng, &config));
        let ledger = Arc::new(WagerLedger::new(Arc::clone(&balances)));
        let crash_history = Arc::new(StdMutex::new(HistoryLog::new(
            config.crash.history_capacity,
        )));
        let dice_history = Arc::new(StdMutex::new(HistoryLog::new(config.dice.history_capacity)));

        let scheduler = RoundScheduler::new(
            config.crash.clone(),
            user_id.clone(),
            Arc::clone(&ledger),
            Arc::clone(&outcome),
            Arc::clone(&crash_history),
            Arc::clone(&events),
        );
        let driver = scheduler.spawn();
        let dice = DiceResolver::new(
            user_id.clone(),
            ledger,
            outcome,
            Arc::clone(&dice_history),
            Arc::clone(&events),
        );

        info!(user = %user_id, "session opened");
        Ok(Self {
            user_id,
            balances,
            scheduler,
            dice,
            crash_history,
            dice_history,
            events,
            driver: StdMutex::new(Some(driver)),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Subscribe to the push stream of session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current balance, read through the balance boundary.
    pub async fn balance(&self) -> EngineResult<f64> {
        self.balances.balance(&self.user_id).await
    }

    /// Place a crash-mode bet for the upcoming flight.
    pub async fn place_bet(
        &self,
        amount: f64,
        auto_cash_out: Option<f64>,
    ) -> EngineResult<Option<Wager>> {
        self.scheduler.place_bet(amount, auto_cash_out).await
    }

    /// Cash the live wager out at the current multiplier.
    pub async fn cash_out(&self) -> EngineResult<Option<f64>> {
        self.scheduler.cash_out().await
    }

    /// Resolve a single dice bet.
    pub async fn roll_dice(&self, request: DiceRollRequest) -> EngineResult<DiceBet> {
        self.dice.roll(request).await
    }

    /// Read-only view of the crash round.
    pub async fn crash_snapshot(&self) -> CrashSnapshot {
        self.scheduler.snapshot().await
    }

    /// Recent crash points, newest first.
    pub fn crash_history(&self) -> Vec<HistoryEntry> {
        self.crash_history
            .lock()
            .map(|h| h.snapshot())
            .unwrap_or_default()
    }

    /// Recent dice rolls, newest first.
    pub fn dice_history(&self) -> Vec<HistoryEntry> {
        self.dice_history
            .lock()
            .map(|h| h.snapshot())
            .unwrap_or_default()
    }

    /// Stop all round timers and join the driver task. Safe to call more
    /// than once; only the first call does work.
    pub async fn close(&self) {
        self.scheduler.stop();
        let handle = match self.driver.lock() {
            Ok(mut driver) => driver.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(user = %self.user_id, "crash driver join failed: {}", e);
            }
            self.events.publish(SessionEvent::SessionClosed);
            info!(user = %self.user_id, "session closed");
        }
    }
}
