//! Error types for the wagering engine.
//!
//! Nothing in here is fatal to the process. Every error is recoverable at
//! the session boundary and surfaces to the presentation layer as a
//! rejected-bet notification.

use thiserror::Error;

/// Errors produced by engine operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Bet amount exceeds the account balance at placement time.
    #[error("insufficient funds: bet {requested:.2} exceeds balance {available:.2}")]
    InsufficientFunds { requested: f64, available: f64 },

    /// A user-supplied parameter is out of range. Always rejected before any
    /// balance mutation.
    #[error("invalid {field}: {value} ({reason})")]
    InvalidParameter {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The balance store has no record of the account.
    #[error("unknown account: {0}")]
    UnknownAccount(String),

    /// Engine configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;
