//! Rushline — round-based wagering engine.
//!
//! Two game modes behind one session facade: a continuously rising
//! multiplier round that ends at a hidden crash point, and a single-shot
//! threshold roll. The engine owns round lifecycle timing, outcome
//! generation, bet placement and settlement; presentation layers subscribe
//! to the event stream and render snapshots, never driving timing
//! themselves.
//!
//! Funds live behind the [`balance::BalanceStore`] boundary — the engine
//! applies debits and credits through it but never owns a balance.

pub mod balance;
pub mod config;
pub mod errors;
pub mod events;
pub mod games;
pub mod history;
pub mod ledger;
pub mod outcome;
pub mod rng;
pub mod session;

pub use balance::{BalanceStore, InMemoryBalanceStore};
pub use config::{CrashConfig, DiceConfig, EngineConfig};
pub use errors::{EngineError, EngineResult};
pub use events::{EventBus, SessionEvent};
pub use games::types::{
    CrashSnapshot, DiceBet, DiceDirection, DiceRollRequest, Round, RoundState, Wager, WagerStatus,
};
pub use games::{DiceResolver, RoundScheduler};
pub use history::{HistoryEntry, HistoryLog};
pub use ledger::WagerLedger;
pub use outcome::OutcomeGenerator;
pub use rng::{RandomSource, ScriptedSource, ThreadRngSource};
pub use session::GameSession;
