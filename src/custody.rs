// 9.2 custody.rs: MOCKED. just balance changes, no real token transfers.
// the keeper moves collateral between a depositor and the module's pooled account through `Bank`.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::types::{AccountId, Coin};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("Account {account} has {available} spendable, {requested} requested")]
    InsufficientBalance {
        account: AccountId,
        available: Decimal,
        requested: Coin,
    },

    #[error("Module account holds {available} {denom}, cannot release {requested}")]
    ModuleUnderfunded {
        denom: String,
        available: Decimal,
        requested: Coin,
    },

    #[error("Transfer rejected: {reason}")]
    TransferRejected { reason: String },

    #[error("Transfer amount must be positive")]
    InvalidAmount,
}

// Trait for custody adapters. Implement this for the token layer the module runs against.
pub trait Bank {
    // spendable balance of `denom`, zero if the account holds none
    fn spendable(&self, account: AccountId, denom: &str) -> Decimal;

    // depositor -> module account
    fn send_to_module(&mut self, from: AccountId, coin: &Coin) -> Result<(), CustodyError>;

    // module account -> depositor
    fn send_from_module(&mut self, to: AccountId, coin: &Coin) -> Result<(), CustodyError>;
}

// Mock bank for testing and the simulation binary
#[derive(Debug, Default)]
pub struct MockBank {
    balances: HashMap<(AccountId, String), Decimal>,
    module: HashMap<String, Decimal>,
    // forces the next module -> account transfer to fail
    fail_next_release: Option<String>,
    total_received: Decimal,
    total_released: Decimal,
}

impl MockBank {
    pub fn new() -> Self {
        Self::default()
    }

    // mint straight into an account
    pub fn fund(&mut self, account: AccountId, coin: &Coin) {
        *self
            .balances
            .entry((account, coin.denom().to_string()))
            .or_insert(Decimal::ZERO) += coin.amount();
    }

    pub fn balance(&self, account: AccountId, denom: &str) -> Decimal {
        self.balances
            .get(&(account, denom.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn module_balance(&self, denom: &str) -> Decimal {
        self.module.get(denom).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn fail_next_release(&mut self, reason: &str) {
        self.fail_next_release = Some(reason.to_string());
    }

    // drain the module account out from under the keeper
    pub fn seize_module_funds(&mut self, denom: &str) {
        self.module.remove(denom);
    }

    pub fn total_received(&self) -> Decimal {
        self.total_received
    }

    pub fn total_released(&self) -> Decimal {
        self.total_released
    }
}

impl Bank for MockBank {
    fn spendable(&self, account: AccountId, denom: &str) -> Decimal {
        self.balance(account, denom)
    }

    fn send_to_module(&mut self, from: AccountId, coin: &Coin) -> Result<(), CustodyError> {
        if !coin.is_positive() {
            return Err(CustodyError::InvalidAmount);
        }
        let key = (from, coin.denom().to_string());
        let available = self.balances.get(&key).copied().unwrap_or(Decimal::ZERO);
        if coin.amount() > available {
            return Err(CustodyError::InsufficientBalance {
                account: from,
                available,
                requested: coin.clone(),
            });
        }

        self.balances.insert(key, available - coin.amount());
        *self
            .module
            .entry(coin.denom().to_string())
            .or_insert(Decimal::ZERO) += coin.amount();
        self.total_received += coin.amount();
        Ok(())
    }

    fn send_from_module(&mut self, to: AccountId, coin: &Coin) -> Result<(), CustodyError> {
        if let Some(reason) = self.fail_next_release.take() {
            return Err(CustodyError::TransferRejected { reason });
        }
        if !coin.is_positive() {
            return Err(CustodyError::InvalidAmount);
        }
        let available = self.module_balance(coin.denom());
        if coin.amount() > available {
            return Err(CustodyError::ModuleUnderfunded {
                denom: coin.denom().to_string(),
                available,
                requested: coin.clone(),
            });
        }

        self.module
            .insert(coin.denom().to_string(), available - coin.amount());
        self.fund(to, coin);
        self.total_released += coin.amount();
        Ok(())
    }
}
