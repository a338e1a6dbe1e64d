//! Demo driver: opens a session, rides a few crash rounds with an
//! auto-cash-out bet, then rolls the dice twice. Presentation only — all
//! timing and settlement stays inside the engine.

use clap::Parser;
use rushline::{
    DiceDirection, DiceRollRequest, EngineConfig, EngineResult, GameSession, InMemoryBalanceStore,
    SessionEvent,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rushline", about = "Round-based wagering engine demo")]
struct Args {
    /// Starting balance for the demo account
    #[arg(long, default_value_t = 1000.0)]
    balance: f64,

    /// Number of crash rounds to watch before exiting
    #[arg(long, default_value_t = 2)]
    rounds: u32,

    /// Bet placed each round
    #[arg(long, default_value_t = 10.0)]
    bet: f64,

    /// Auto cash-out multiplier for the crash bets
    #[arg(long, default_value_t = 2.0)]
    auto: f64,

    /// Demo account name
    #[arg(long, default_value = "guest")]
    user: String,
}

#[tokio::main]
async fn main() -> EngineResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let balances = Arc::new(InMemoryBalanceStore::new());
    balances.open_account(&args.user, args.balance);

    let session = GameSession::open(EngineConfig::quick_play(), &args.user, balances)?;
    let mut events = session.subscribe();

    info!(user = %args.user, balance = args.balance, "watching {} crash round(s)", args.rounds);

    let mut rounds_seen = 0;
    let mut bet_placed = false;
    while rounds_seen < args.rounds {
        match events.recv().await {
            Ok(SessionEvent::NewRound { round_id, .. }) => {
                bet_placed = false;
                info!(round = %round_id, "new round armed");
            }
            Ok(SessionEvent::CountdownTick { seconds_left, .. }) if !bet_placed => {
                match session.place_bet(args.bet, Some(args.auto)).await {
                    Ok(Some(wager)) => {
                        bet_placed = true;
                        info!(
                            amount = wager.amount,
                            auto = args.auto,
                            seconds_left,
                            "bet placed"
                        );
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("bet refused: {}", e);
                        bet_placed = true;
                    }
                }
            }
            Ok(SessionEvent::CashedOut {
                multiplier, payout, auto, ..
            }) => {
                info!(multiplier, payout, auto, "cashed out");
            }
            Ok(SessionEvent::Crashed { crash_point, .. }) => {
                rounds_seen += 1;
                info!(crash_point, "round crashed");
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("event stream lagged; skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    for direction in [DiceDirection::Under, DiceDirection::Over] {
        let bet = session
            .roll_dice(DiceRollRequest {
                amount: args.bet,
                target: 50.0,
                direction,
            })
            .await?;
        println!("{}", serde_json::to_string(&bet).unwrap_or_default());
    }

    let crash_history: Vec<f64> = session.crash_history().iter().map(|e| e.value).collect();
    info!(?crash_history, "recent crash points");

    let balance = session.balance().await?;
    println!("final balance: {:.2}", balance);

    session.close().await;
    Ok(())
}
