//! Wager placement and settlement against the balance boundary.
//!
//! The stake leaves the balance at placement time, before any outcome is
//! known; a loss therefore never touches the balance again. Parameter
//! validation always runs before the first balance read.

use crate::balance::BalanceStore;
use crate::errors::{EngineError, EngineResult};
use crate::games::types::{DiceBet, DiceRollRequest, Wager, WagerStatus};
use crate::outcome::OutcomeGenerator;
use std::sync::Arc;
use tracing::{debug, info};

/// Validates and executes bet placement, cash-out, and settlement.
pub struct WagerLedger {
    balances: Arc<dyn BalanceStore>,
}

impl WagerLedger {
    pub fn new(balances: Arc<dyn BalanceStore>) -> Self {
        Self { balances }
    }

    /// Validate and debit a crash-mode bet, returning a `Pending` wager.
    pub async fn place_bet(
        &self,
        user_id: &str,
        round_id: &str,
        amount: f64,
        auto_cash_out: Option<f64>,
    ) -> EngineResult<Wager> {
        if !(amount > 0.0) {
            return Err(EngineError::InvalidParameter {
                field: "amount",
                value: amount,
                reason: "must be positive",
            });
        }
        if let Some(auto) = auto_cash_out {
            if !(auto > 1.0) {
                return Err(EngineError::InvalidParameter {
                    field: "auto_cash_out",
                    value: auto,
                    reason: "must exceed 1.0",
                });
            }
        }

        let balance = self.balances.balance(user_id).await?;
        if amount > balance {
            return Err(EngineError::InsufficientFunds {
                requested: amount,
                available: balance,
            });
        }
        self.balances.set_balance(user_id, balance - amount).await?;
        debug!(user = %user_id, amount, "bet debited");

        Ok(Wager {
            round_id: round_id.to_string(),
            amount,
            auto_cash_out,
            status: WagerStatus::Pending,
            cashed_out_at: None,
        })
    }

    /// Credit an active wager at the given multiplier.
    ///
    /// Non-active wagers are left untouched and yield `None`, which makes
    /// repeated cash-out requests free no-ops.
    pub async fn settle_cash_out(
        &self,
        user_id: &str,
        wager: &mut Wager,
        multiplier: f64,
    ) -> EngineResult<Option<f64>> {
        if wager.status != WagerStatus::Active {
            return Ok(None);
        }

        let payout = wager.amount * multiplier;
        let balance = self.balances.balance(user_id).await?;
        self.balances.set_balance(user_id, balance + payout).await?;
        wager.status = WagerStatus::CashedOut;
        wager.cashed_out_at = Some(multiplier);
        info!(user = %user_id, multiplier, payout, "wager cashed out");

        Ok(Some(payout))
    }

    /// The stake was debited at placement; a loss only freezes the wager.
    pub fn settle_loss(&self, wager: &mut Wager) {
        if wager.status == WagerStatus::Active {
            wager.status = WagerStatus::Lost;
        }
    }

    /// Debit, roll, and settle a dice bet as one ledger call.
    pub async fn resolve_dice_bet(
        &self,
        user_id: &str,
        request: &DiceRollRequest,
        outcome: &OutcomeGenerator,
    ) -> EngineResult<DiceBet> {
        if !(request.amount > 0.0) {
            return Err(EngineError::InvalidParameter {
                field: "amount",
                value: request.amount,
                reason: "must be positive",
            });
        }
        if !(request.target > 0.0 && request.target < 100.0) {
            return Err(EngineError::InvalidParameter {
                field: "target",
                value: request.target,
                reason: "must be inside (0, 100)",
            });
        }

        let balance = self.balances.balance(user_id).await?;
        if request.amount > balance {
            return Err(EngineError::InsufficientFunds {
                requested: request.amount,
                available: balance,
            });
        }
        self.balances
            .set_balance(user_id, balance - request.amount)
            .await?;

        let rolled_value = outcome.draw_dice_roll();
        let won = outcome.resolve_dice(request.target, request.direction, rolled_value);
        let win_chance = outcome.dice_win_chance(request.target, request.direction);
        let payout_multiplier = outcome.dice_payout(win_chance);
        let payout = if won {
            request.amount * payout_multiplier
        } else {
            0.0
        };

        if won {
            let balance = self.balances.balance(user_id).await?;
            self.balances.set_balance(user_id, balance + payout).await?;
        }
        info!(user = %user_id, rolled = rolled_value, won, payout, "dice bet settled");

        Ok(DiceBet {
            amount: request.amount,
            target: request.target,
            direction: request.direction,
            win_chance,
            payout_multiplier,
            rolled_value,
            won,
            payout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::InMemoryBalanceStore;
    use crate::config::EngineConfig;
    use crate::games::types::DiceDirection;
    use crate::rng::ScriptedSource;

    fn harness(balance: f64) -> (WagerLedger, Arc<InMemoryBalanceStore>) {
        let store = Arc::new(InMemoryBalanceStore::new());
        store.open_account("player", balance);
        (WagerLedger::new(store.clone()), store)
    }

    fn dice_outcome(draws: impl IntoIterator<Item = f64>) -> OutcomeGenerator {
        OutcomeGenerator::new(
            Arc::new(ScriptedSource::new(draws)),
            &EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_placement_debits_immediately() {
        let (ledger, store) = harness(100.0);

        let wager = ledger
            .place_bet("player", "round-1", 10.0, Some(2.0))
            .await
            .unwrap();

        assert_eq!(wager.status, WagerStatus::Pending);
        assert_eq!(wager.amount, 10.0);
        assert_eq!(store.balance("player").await.unwrap(), 90.0);
    }

    #[tokio::test]
    async fn test_insufficient_funds_leaves_balance_untouched() {
        let (ledger, store) = harness(100.0);

        let result = ledger.place_bet("player", "round-1", 150.0, None).await;
        assert!(matches!(
            result,
            Err(EngineError::InsufficientFunds {
                requested,
                available
            }) if requested == 150.0 && available == 100.0
        ));
        assert_eq!(store.balance("player").await.unwrap(), 100.0);
    }

    #[tokio::test]
    async fn test_invalid_parameters_rejected_before_debit() {
        let (ledger, store) = harness(100.0);

        assert!(ledger
            .place_bet("player", "round-1", 0.0, None)
            .await
            .is_err());
        assert!(ledger
            .place_bet("player", "round-1", -5.0, None)
            .await
            .is_err());
        assert!(ledger
            .place_bet("player", "round-1", 10.0, Some(1.0))
            .await
            .is_err());
        assert_eq!(store.balance("player").await.unwrap(), 100.0);
    }

    #[tokio::test]
    async fn test_cash_out_credits_exactly_once() {
        let (ledger, store) = harness(100.0);

        let mut wager = ledger
            .place_bet("player", "round-1", 10.0, None)
            .await
            .unwrap();
        wager.status = WagerStatus::Active;

        let payout = ledger
            .settle_cash_out("player", &mut wager, 2.0)
            .await
            .unwrap();
        assert_eq!(payout, Some(20.0));
        assert_eq!(wager.status, WagerStatus::CashedOut);
        assert_eq!(wager.cashed_out_at, Some(2.0));
        assert_eq!(store.balance("player").await.unwrap(), 110.0);

        // Second settlement is a no-op.
        let payout = ledger
            .settle_cash_out("player", &mut wager, 3.0)
            .await
            .unwrap();
        assert_eq!(payout, None);
        assert_eq!(store.balance("player").await.unwrap(), 110.0);
    }

    #[tokio::test]
    async fn test_pending_wager_cannot_cash_out() {
        let (ledger, store) = harness(100.0);

        let mut wager = ledger
            .place_bet("player", "round-1", 10.0, None)
            .await
            .unwrap();

        let payout = ledger
            .settle_cash_out("player", &mut wager, 2.0)
            .await
            .unwrap();
        assert_eq!(payout, None);
        assert_eq!(wager.status, WagerStatus::Pending);
        assert_eq!(store.balance("player").await.unwrap(), 90.0);
    }

    #[tokio::test]
    async fn test_loss_keeps_stake_debited() {
        let (ledger, store) = harness(100.0);

        let mut wager = ledger
            .place_bet("player", "round-1", 10.0, None)
            .await
            .unwrap();
        wager.status = WagerStatus::Active;

        ledger.settle_loss(&mut wager);
        assert_eq!(wager.status, WagerStatus::Lost);
        assert_eq!(store.balance("player").await.unwrap(), 90.0);

        // Settling a cashed-out wager as lost changes nothing.
        wager.status = WagerStatus::CashedOut;
        ledger.settle_loss(&mut wager);
        assert_eq!(wager.status, WagerStatus::CashedOut);
    }

    #[tokio::test]
    async fn test_dice_win_scenario() {
        // Balance 100, bet 10 under 50, roll 40.0: payout 1.96x.
        let (ledger, store) = harness(100.0);
        let outcome = dice_outcome([0.40]);

        let request = DiceRollRequest {
            amount: 10.0,
            target: 50.0,
            direction: DiceDirection::Under,
        };
        let bet = ledger
            .resolve_dice_bet("player", &request, &outcome)
            .await
            .unwrap();

        assert!(bet.won);
        assert!((bet.rolled_value - 40.0).abs() < 1e-9);
        assert_eq!(bet.win_chance, 50.0);
        assert!((bet.payout_multiplier - 1.96).abs() < 1e-12);
        assert!((bet.payout - 19.60).abs() < 1e-9);

        let balance = store.balance("player").await.unwrap();
        assert!((balance - 109.60).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_dice_loss_scenario() {
        // Balance 100, bet 10 over 50, roll 40.0: stake lost.
        let (ledger, store) = harness(100.0);
        let outcome = dice_outcome([0.40]);

        let request = DiceRollRequest {
            amount: 10.0,
            target: 50.0,
            direction: DiceDirection::Over,
        };
        let bet = ledger
            .resolve_dice_bet("player", &request, &outcome)
            .await
            .unwrap();

        assert!(!bet.won);
        assert_eq!(bet.payout, 0.0);
        assert_eq!(store.balance("player").await.unwrap(), 90.0);
    }

    #[tokio::test]
    async fn test_dice_target_validation() {
        let (ledger, store) = harness(100.0);
        let outcome = dice_outcome([0.40]);

        for target in [0.0, -1.0, 100.0, 250.0] {
            let request = DiceRollRequest {
                amount: 10.0,
                target,
                direction: DiceDirection::Under,
            };
            assert!(matches!(
                ledger.resolve_dice_bet("player", &request, &outcome).await,
                Err(EngineError::InvalidParameter { field: "target", .. })
            ));
        }
        assert_eq!(store.balance("player").await.unwrap(), 100.0);
    }
}
