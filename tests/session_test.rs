//! End-to-end session test: a full crash round with dice rolls mid-flight,
//! manual cash-out, and deterministic shutdown — all on paused time.

use rushline::{
    DiceDirection, DiceRollRequest, EngineConfig, GameSession, InMemoryBalanceStore, RoundState,
    ScriptedSource, SessionEvent, WagerStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

async fn next_matching(
    rx: &mut broadcast::Receiver<SessionEvent>,
    pred: impl Fn(&SessionEvent) -> bool,
) -> SessionEvent {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(600), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event stream closed");
        if pred(&event) {
            return event;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_session_round_trip() {
    // Draw script, cycling: round one crashes at floor(0.99 / 0.5) + 0.2 =
    // 1.2; the two dice rolls mid-flight both draw 40.0.
    let rng = Arc::new(ScriptedSource::new([0.5, 0.1, 0.4, 0.4]));
    let balances = Arc::new(InMemoryBalanceStore::new());
    balances.open_account("player", 100.0);

    let session = GameSession::open_with_rng(
        EngineConfig::default(),
        "player",
        balances.clone(),
        rng,
    )
    .expect("session should open");
    let mut rx = session.subscribe();

    // === PHASE 1: bet during the countdown ===
    let wager = session
        .place_bet(10.0, None)
        .await
        .expect("placement should succeed")
        .expect("countdown placement should be accepted");
    assert_eq!(wager.status, WagerStatus::Pending);
    assert_eq!(session.balance().await.unwrap(), 90.0);

    next_matching(&mut rx, |e| matches!(e, SessionEvent::FlightStarted { .. })).await;

    // === PHASE 2: dice rolls while the round is in flight ===
    let win = session
        .roll_dice(DiceRollRequest {
            amount: 10.0,
            target: 50.0,
            direction: DiceDirection::Under,
        })
        .await
        .unwrap();
    assert!(win.won);
    assert!((win.rolled_value - 40.0).abs() < 1e-9);
    assert!((win.payout - 19.60).abs() < 1e-9);

    let loss = session
        .roll_dice(DiceRollRequest {
            amount: 10.0,
            target: 50.0,
            direction: DiceDirection::Over,
        })
        .await
        .unwrap();
    assert!(!loss.won);
    assert_eq!(loss.payout, 0.0);

    let after_dice = session.balance().await.unwrap();
    assert!((after_dice - 89.60).abs() < 1e-9);

    // === PHASE 3: manual cash-out at the first flight tick ===
    let event = next_matching(&mut rx, |e| matches!(e, SessionEvent::MultiplierTick { .. })).await;
    let SessionEvent::MultiplierTick { multiplier, .. } = event else {
        unreachable!();
    };

    let payout = session
        .cash_out()
        .await
        .unwrap()
        .expect("active wager in flight should cash out");
    assert_eq!(payout, 10.0 * multiplier);

    // Repeat requests change nothing.
    assert_eq!(session.cash_out().await.unwrap(), None);
    let after_cash_out = session.balance().await.unwrap();
    assert!((after_cash_out - (89.60 + payout)).abs() < 1e-9);

    // === PHASE 4: the round crashes; the cashed-out wager stays frozen ===
    let event = next_matching(&mut rx, |e| matches!(e, SessionEvent::Crashed { .. })).await;
    let SessionEvent::Crashed { crash_point, .. } = event else {
        unreachable!();
    };
    assert!((crash_point - 1.2).abs() < 1e-9);

    let snapshot = session.crash_snapshot().await;
    assert_eq!(snapshot.state, RoundState::Crashed);
    let frozen = snapshot.wager.expect("wager survives until the reset");
    assert_eq!(frozen.status, WagerStatus::CashedOut);
    assert_eq!(frozen.cashed_out_at, Some(multiplier));

    let crash_history = session.crash_history();
    assert_eq!(crash_history.len(), 1);
    assert!((crash_history[0].value - 1.2).abs() < 1e-9);

    let dice_history = session.dice_history();
    assert_eq!(dice_history.len(), 2);
    assert!((dice_history[0].value - 40.0).abs() < 1e-9);

    // === PHASE 5: next round arms, then the session closes cleanly ===
    next_matching(&mut rx, |e| matches!(e, SessionEvent::NewRound { .. })).await;
    let snapshot = session.crash_snapshot().await;
    assert_eq!(snapshot.state, RoundState::Countdown);
    assert_eq!(snapshot.multiplier, 1.0);
    assert!(snapshot.wager.is_none());

    session.close().await;
    next_matching(&mut rx, |e| matches!(e, SessionEvent::SessionClosed)).await;

    // Closing twice is fine, and the balance stays settled.
    session.close().await;
    let final_balance = session.balance().await.unwrap();
    assert!((final_balance - (89.60 + payout)).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_session_rejects_invalid_config() {
    let balances = Arc::new(InMemoryBalanceStore::new());
    balances.open_account("player", 100.0);

    let mut config = EngineConfig::default();
    config.crash.multiplier_step = 0.0;
    assert!(GameSession::open(config, "player", balances).is_err());
}
