//! Crash round lifecycle.
//!
//! A driver task loops countdown → flight → crashed intermission, mutating
//! the shared session state only under its mutex. Bet placement and cash-out
//! take the same mutex, so user commands never interleave with a tick
//! mid-update. Stopping the scheduler flips a running flag that every phase
//! re-checks under the lock before mutating; nothing scheduled before the
//! stop mutates after it.

use crate::config::CrashConfig;
use crate::errors::EngineResult;
use crate::events::{EventBus, SessionEvent};
use crate::games::types::{CrashSnapshot, Round, RoundState, Wager, WagerStatus};
use crate::history::HistoryLog;
use crate::ledger::WagerLedger;
use crate::outcome::OutcomeGenerator;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex as StdMutex,
};
use tokio::{
    sync::{Mutex, Notify},
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

/// Mutable crash-mode state shared between the driver task and user commands.
struct CrashState {
    round: Round,
    seconds_left: u64,
    wager: Option<Wager>,
}

/// Outcome of one scheduler phase.
enum Phase {
    Continue,
    Cancelled,
}

/// Drives the crash round lifecycle for one session.
pub struct RoundScheduler {
    config: CrashConfig,
    user_id: String,
    ledger: Arc<WagerLedger>,
    outcome: Arc<OutcomeGenerator>,
    history: Arc<StdMutex<HistoryLog>>,
    events: Arc<EventBus>,
    state: Mutex<CrashState>,
    running: AtomicBool,
    shutdown: Notify,
}

impl RoundScheduler {
    pub fn new(
        config: CrashConfig,
        user_id: String,
        ledger: Arc<WagerLedger>,
        outcome: Arc<OutcomeGenerator>,
        history: Arc<StdMutex<HistoryLog>>,
        events: Arc<EventBus>,
    ) -> Arc<Self> {
        let state = CrashState {
            round: Round::new(),
            seconds_left: config.countdown_secs,
            wager: None,
        };
        Arc::new(Self {
            config,
            user_id,
            ledger,
            outcome,
            history,
            events,
            state: Mutex::new(state),
            running: AtomicBool::new(true),
            shutdown: Notify::new(),
        })
    }

    /// Spawn the driver task; the handle resolves once the loop has stopped.
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run().await })
    }

    async fn run(self: Arc<Self>) {
        {
            let state = self.state.lock().await;
            self.events.publish(SessionEvent::NewRound {
                round_id: state.round.id.clone(),
                seconds_left: state.seconds_left,
            });
        }
        loop {
            if let Phase::Cancelled = self.run_countdown().await {
                break;
            }
            if let Phase::Cancelled = self.run_flight().await {
                break;
            }
            if let Phase::Cancelled = self.run_intermission().await {
                break;
            }
            self.arm_next_round().await;
        }
        debug!(user = %self.user_id, "crash driver stopped");
    }

    async fn run_countdown(&self) -> Phase {
        let mut tick = interval(self.config.countdown_interval());
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately.
        tick.tick().await;
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.notified() => return Phase::Cancelled,
                _ = tick.tick() => {
                    let mut state = self.state.lock().await;
                    if !self.is_running() {
                        return Phase::Cancelled;
                    }
                    state.seconds_left = state.seconds_left.saturating_sub(1);
                    self.events.publish(SessionEvent::CountdownTick {
                        round_id: state.round.id.clone(),
                        seconds_left: state.seconds_left,
                    });
                    if state.seconds_left == 0 {
                        self.begin_flight(&mut state);
                        return Phase::Continue;
                    }
                }
            }
        }
    }

    /// Draw the crash point and put the round into flight, promoting any
    /// pending wager to active.
    fn begin_flight(&self, state: &mut CrashState) {
        let crash_point = self.outcome.draw_crash_point();
        state.round.enter_flight(crash_point);
        if let Some(wager) = state.wager.as_mut() {
            if wager.status == WagerStatus::Pending {
                wager.status = WagerStatus::Active;
            }
        }
        info!(user = %self.user_id, round = %state.round.id, "flight started");
        self.events.publish(SessionEvent::FlightStarted {
            round_id: state.round.id.clone(),
        });
    }

    async fn run_flight(&self) -> Phase {
        let mut tick = interval(self.config.flight_interval());
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tick.tick().await;
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.notified() => return Phase::Cancelled,
                _ = tick.tick() => {
                    let mut state = self.state.lock().await;
                    if !self.is_running() {
                        return Phase::Cancelled;
                    }
                    if self.flight_tick(&mut state).await {
                        return Phase::Continue;
                    }
                }
            }
        }
    }

    /// One flight tick: advance the multiplier, run the auto-cash-out check,
    /// then the crash check. Returns true once the round has crashed.
    async fn flight_tick(&self, state: &mut CrashState) -> bool {
        state.round.multiplier += self.config.multiplier_step;
        let multiplier = state.round.multiplier;
        let round_id = state.round.id.clone();

        // Auto cash-out strictly precedes the crash check: a wager may bail
        // at exactly the crash tick, never after it.
        let auto_trigger = match state.wager.as_ref() {
            Some(wager) if wager.status == WagerStatus::Active => {
                wager.auto_cash_out.filter(|auto| multiplier >= *auto)
            }
            _ => None,
        };
        if let Some(auto) = auto_trigger {
            if let Some(wager) = state.wager.as_mut() {
                // Settle at the registered threshold, not the overshooting
                // tick value.
                match self.ledger.settle_cash_out(&self.user_id, wager, auto).await {
                    Ok(Some(payout)) => self.events.publish(SessionEvent::CashedOut {
                        round_id: round_id.clone(),
                        multiplier: auto,
                        payout,
                        auto: true,
                    }),
                    Ok(None) => {}
                    Err(e) => warn!(user = %self.user_id, error = %e, "auto cash-out failed"),
                }
            }
        }

        if multiplier >= state.round.flight_ceiling() {
            let crash_point = state.round.flight_ceiling();
            state.round.crash();
            if let Some(wager) = state.wager.as_mut() {
                self.ledger.settle_loss(wager);
            }
            if let Ok(mut history) = self.history.lock() {
                history.push(crash_point);
            }
            info!(user = %self.user_id, round = %round_id, crash_point, "round crashed");
            self.events.publish(SessionEvent::Crashed {
                round_id,
                crash_point,
            });
            return true;
        }

        self.events.publish(SessionEvent::MultiplierTick {
            round_id,
            multiplier,
        });
        false
    }

    async fn run_intermission(&self) -> Phase {
        tokio::select! {
            biased;
            _ = self.shutdown.notified() => Phase::Cancelled,
            _ = tokio::time::sleep(self.config.intermission()) => {
                if self.is_running() {
                    Phase::Continue
                } else {
                    Phase::Cancelled
                }
            }
        }
    }

    /// Fresh round, cleared wager, countdown re-armed.
    async fn arm_next_round(&self) {
        let mut state = self.state.lock().await;
        if !self.is_running() {
            return;
        }
        state.round = Round::new();
        state.seconds_left = self.config.countdown_secs;
        state.wager = None;
        self.events.publish(SessionEvent::NewRound {
            round_id: state.round.id.clone(),
            seconds_left: state.seconds_left,
        });
    }

    /// Accept a bet while the round is counting down and no live wager
    /// exists. Ineligible calls are silent no-ops returning `None`; invalid
    /// or unfunded bets fail and surface a `BetRejected` event.
    pub async fn place_bet(
        &self,
        amount: f64,
        auto_cash_out: Option<f64>,
    ) -> EngineResult<Option<Wager>> {
        let mut state = self.state.lock().await;
        if !self.is_running() || state.round.state != RoundState::Countdown {
            return Ok(None);
        }
        if state.wager.as_ref().is_some_and(|w| w.is_live()) {
            return Ok(None);
        }
        match self
            .ledger
            .place_bet(&self.user_id, &state.round.id, amount, auto_cash_out)
            .await
        {
            Ok(wager) => {
                self.events.publish(SessionEvent::BetPlaced {
                    round_id: wager.round_id.clone(),
                    amount: wager.amount,
                    auto_cash_out: wager.auto_cash_out,
                });
                state.wager = Some(wager.clone());
                Ok(Some(wager))
            }
            Err(e) => {
                self.events.publish(SessionEvent::BetRejected {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Manual cash-out at the current multiplier. A no-op unless the round
    /// is in flight with an active wager.
    pub async fn cash_out(&self) -> EngineResult<Option<f64>> {
        let mut state = self.state.lock().await;
        if !self.is_running() || state.round.state != RoundState::Flight {
            return Ok(None);
        }
        let multiplier = state.round.multiplier;
        let round_id = state.round.id.clone();
        let Some(wager) = state.wager.as_mut() else {
            return Ok(None);
        };
        let Some(payout) = self
            .ledger
            .settle_cash_out(&self.user_id, wager, multiplier)
            .await?
        else {
            return Ok(None);
        };
        self.events.publish(SessionEvent::CashedOut {
            round_id,
            multiplier,
            payout,
            auto: false,
        });
        Ok(Some(payout))
    }

    /// Read-only view of the current round and wager.
    pub async fn snapshot(&self) -> CrashSnapshot {
        let state = self.state.lock().await;
        CrashSnapshot {
            round_id: state.round.id.clone(),
            state: state.round.state,
            multiplier: state.round.multiplier,
            seconds_left: if state.round.state == RoundState::Countdown {
                state.seconds_left
            } else {
                0
            },
            wager: state.wager.clone(),
            crash_point: state.round.crash_point(),
        }
    }

    /// Cancel the countdown and flight timers. Idempotent.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.shutdown.notify_waiters();
            debug!(user = %self.user_id, "scheduler stop requested");
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
