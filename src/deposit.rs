// 2.0: the deposit ledger. one record per (position, depositor), stored under its own namespace.
// key = prefix | position id (be) | depositor (be), so one position's deposits are one range scan.
// 2.1 has the ledger ops, 2.2 the key layout.

use crate::store::KvStore;
use crate::types::{AccountId, Coin, PositionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEPOSIT_KEY_PREFIX: u8 = 0x03;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub position_id: PositionId,
    pub depositor: AccountId,
    pub amount: Coin,
}

impl Deposit {
    pub fn new(position_id: PositionId, depositor: AccountId, amount: Coin) -> Self {
        Self {
            position_id,
            depositor,
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Corrupt deposit record at key {key:?}: {reason}")]
    Corrupt { key: Vec<u8>, reason: String },

    #[error("Failed to encode deposit for position {position_id}: {reason}")]
    Encode { position_id: PositionId, reason: String },

    #[error("Refusing to store zero deposit for position {position_id}, depositor {depositor}")]
    ZeroDeposit {
        position_id: PositionId,
        depositor: AccountId,
    },
}

// 2.1: ledger over any ordered store
#[derive(Debug, Clone, Default)]
pub struct DepositLedger<S> {
    store: S,
}

impl<S: KvStore> DepositLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get(
        &self,
        position_id: PositionId,
        depositor: AccountId,
    ) -> Result<Option<Deposit>, LedgerError> {
        let key = deposit_key(position_id, depositor);
        match self.store.get(&key) {
            Some(bytes) => decode(&key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    // upsert. a zero amount never reaches the store; callers delete instead
    pub fn set(&mut self, deposit: &Deposit) -> Result<(), LedgerError> {
        if deposit.amount.is_zero() {
            return Err(LedgerError::ZeroDeposit {
                position_id: deposit.position_id,
                depositor: deposit.depositor,
            });
        }
        let bytes = serde_json::to_vec(deposit).map_err(|e| LedgerError::Encode {
            position_id: deposit.position_id,
            reason: e.to_string(),
        })?;
        self.store
            .set(deposit_key(deposit.position_id, deposit.depositor), bytes);
        Ok(())
    }

    pub fn delete(&mut self, position_id: PositionId, depositor: AccountId) {
        self.store.delete(&deposit_key(position_id, depositor));
    }

    /// Visits the deposits of one position in depositor order. Returning `true`
    /// from `visit` stops the scan; nothing past that point is decoded.
    pub fn iterate<F>(&self, position_id: PositionId, mut visit: F) -> Result<(), LedgerError>
    where
        F: FnMut(&Deposit) -> bool,
    {
        for (key, bytes) in self.store.prefix_iter(&position_prefix(position_id)) {
            let deposit = decode(key, bytes)?;
            if visit(&deposit) {
                break;
            }
        }
        Ok(())
    }

    pub fn list(&self, position_id: PositionId) -> Result<Vec<Deposit>, LedgerError> {
        let mut deposits = Vec::new();
        self.iterate(position_id, |d| {
            deposits.push(d.clone());
            false
        })?;
        Ok(deposits)
    }

    // sum of every depositor's contribution. should always equal the position's collateral
    pub fn total(&self, position_id: PositionId) -> Result<Decimal, LedgerError> {
        let mut total = Decimal::ZERO;
        self.iterate(position_id, |d| {
            total = total.saturating_add(d.amount.amount());
            false
        })?;
        Ok(total)
    }
}

// 2.2: key layout
pub fn position_prefix(position_id: PositionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(DEPOSIT_KEY_PREFIX);
    key.extend_from_slice(&position_id.to_be_bytes());
    key
}

pub fn deposit_key(position_id: PositionId, depositor: AccountId) -> Vec<u8> {
    let mut key = position_prefix(position_id);
    key.extend_from_slice(&depositor.to_be_bytes());
    key
}

fn decode(key: &[u8], bytes: &[u8]) -> Result<Deposit, LedgerError> {
    serde_json::from_slice(bytes).map_err(|e| LedgerError::Corrupt {
        key: key.to_vec(),
        reason: e.to_string(),
    })
}
