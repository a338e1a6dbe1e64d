//! Balance boundary.
//!
//! The engine never owns funds. Every debit and credit reads the backing
//! store and writes the new value through this interface, so an external
//! wallet or database can stand in without touching game logic.

use crate::errors::{EngineError, EngineResult};
use async_trait::async_trait;
use dashmap::DashMap;

/// Sole source of truth for account funds.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Current balance for the account.
    async fn balance(&self, user_id: &str) -> EngineResult<f64>;

    /// Overwrite the account balance.
    async fn set_balance(&self, user_id: &str, value: f64) -> EngineResult<()>;
}

/// In-process balance store for sessions without external persistence.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    accounts: DashMap<String, f64>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account, replacing any previous balance.
    pub fn open_account(&self, user_id: &str, balance: f64) {
        self.accounts.insert(user_id.to_string(), balance);
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn balance(&self, user_id: &str) -> EngineResult<f64> {
        self.accounts
            .get(user_id)
            .map(|entry| *entry)
            .ok_or_else(|| EngineError::UnknownAccount(user_id.to_string()))
    }

    async fn set_balance(&self, user_id: &str, value: f64) -> EngineResult<()> {
        match self.accounts.get_mut(user_id) {
            Some(mut entry) => {
                *entry = value;
                Ok(())
            }
            None => Err(EngineError::UnknownAccount(user_id.to_string())),
        }
    }
}
