// 9.0 wallet.rs: balance custody and the payment flow. the critical
// contract is withdraw(): the sufficiency check and the debit happen inside
// one critical section, so two concurrent buyers cannot both pass the check
// against a stale balance. balances never go negative.

use crate::types::{Timestamp, UserId};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub Uuid);

impl PaymentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Settled against the internal wallet balance.
    Wallet,
    /// External card rails; no wallet debit.
    Card,
    /// External UPI rails; no wallet debit.
    Upi,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Wallet => write!(f, "WALLET"),
            PaymentMethod::Card => write!(f, "CARD"),
            PaymentMethod::Upi => write!(f, "UPI"),
        }
    }
}

/// One settled payment, kept for reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub payment_id: PaymentId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub settled_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("no wallet for {0}")]
    AccountNotFound(UserId),

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("payment rejected: {0}")]
    PaymentRejected(String),
}

pub trait WalletLedger: Send + Sync {
    fn balance(&self, user_id: UserId) -> Result<Decimal, WalletError>;

    /// Credits `amount`, creating the wallet on first deposit.
    fn deposit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, WalletError>;

    /// Conditionally debits `amount` and returns the new balance. Check and
    /// debit are a single atomic operation.
    fn withdraw(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, WalletError>;

    /// Settles a payment (commission) and returns its transaction id.
    fn charge(
        &self,
        user_id: UserId,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<PaymentId, WalletError>;
}

// 9.1: reference implementation. one lock guards the balance map so every
// check-then-mutate is atomic; settled payments land in a transaction log.
#[derive(Debug, Default)]
pub struct InMemoryWallet {
    balances: Mutex<HashMap<UserId, Decimal>>,
    transactions: Mutex<Vec<WalletTransaction>>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transactions_for(&self, user_id: UserId) -> Vec<WalletTransaction> {
        self.transactions
            .lock()
            .iter()
            .filter(|tx| tx.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl WalletLedger for InMemoryWallet {
    fn balance(&self, user_id: UserId) -> Result<Decimal, WalletError> {
        self.balances
            .lock()
            .get(&user_id)
            .copied()
            .ok_or(WalletError::AccountNotFound(user_id))
    }

    fn deposit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        let mut balances = self.balances.lock();
        let balance = balances.entry(user_id).or_insert(Decimal::ZERO);
        *balance += amount;
        Ok(*balance)
    }

    fn withdraw(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        let mut balances = self.balances.lock();
        let balance = balances
            .get_mut(&user_id)
            .ok_or(WalletError::AccountNotFound(user_id))?;
        if *balance < amount {
            return Err(WalletError::InsufficientFunds {
                required: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(*balance)
    }

    fn charge(
        &self,
        user_id: UserId,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<PaymentId, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        if method == PaymentMethod::Wallet {
            self.withdraw(user_id, amount)?;
        }
        let payment_id = PaymentId::new();
        self.transactions.lock().push(WalletTransaction {
            payment_id,
            user_id,
            amount,
            method,
            settled_at: Timestamp::now(),
        });
        Ok(payment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn deposit_creates_wallet() {
        let wallet = InMemoryWallet::new();
        assert_eq!(
            wallet.balance(UserId(1)),
            Err(WalletError::AccountNotFound(UserId(1)))
        );
        assert_eq!(wallet.deposit(UserId(1), dec!(500)).unwrap(), dec!(500));
        assert_eq!(wallet.balance(UserId(1)).unwrap(), dec!(500));
    }

    #[test]
    fn withdraw_is_conditional() {
        let wallet = InMemoryWallet::new();
        wallet.deposit(UserId(1), dec!(50)).unwrap();

        let err = wallet.withdraw(UserId(1), dec!(100)).unwrap_err();
        assert_eq!(
            err,
            WalletError::InsufficientFunds {
                required: dec!(100),
                available: dec!(50),
            }
        );
        // the failed attempt did not touch the balance
        assert_eq!(wallet.balance(UserId(1)).unwrap(), dec!(50));
        assert_eq!(wallet.withdraw(UserId(1), dec!(50)).unwrap(), dec!(0));
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let wallet = InMemoryWallet::new();
        wallet.deposit(UserId(1), dec!(10)).unwrap();
        assert_eq!(wallet.deposit(UserId(1), dec!(0)), Err(WalletError::InvalidAmount));
        assert_eq!(wallet.withdraw(UserId(1), dec!(-1)), Err(WalletError::InvalidAmount));
    }

    #[test]
    fn charge_on_wallet_rails_debits_and_records() {
        let wallet = InMemoryWallet::new();
        wallet.deposit(UserId(1), dec!(10)).unwrap();

        wallet.charge(UserId(1), dec!(4), PaymentMethod::Wallet).unwrap();
        assert_eq!(wallet.balance(UserId(1)).unwrap(), dec!(6));

        let txs = wallet.transactions_for(UserId(1));
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, dec!(4));
        assert_eq!(txs[0].method, PaymentMethod::Wallet);
    }

    #[test]
    fn charge_on_external_rails_leaves_balance_alone() {
        let wallet = InMemoryWallet::new();
        wallet.deposit(UserId(1), dec!(10)).unwrap();

        wallet.charge(UserId(1), dec!(100), PaymentMethod::Card).unwrap();
        assert_eq!(wallet.balance(UserId(1)).unwrap(), dec!(10));
        assert_eq!(wallet.transactions_for(UserId(1)).len(), 1);
    }

    #[test]
    fn concurrent_withdrawals_never_overdraw() {
        let wallet = Arc::new(InMemoryWallet::new());
        wallet.deposit(UserId(1), dec!(100)).unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let wallet = Arc::clone(&wallet);
                thread::spawn(move || wallet.withdraw(UserId(1), dec!(30)).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        // only three 30-unit withdrawals fit in a 100-unit balance
        assert_eq!(successes, 3);
        assert_eq!(wallet.balance(UserId(1)).unwrap(), dec!(10));
    }
}
