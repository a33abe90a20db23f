// 1.0: all the primitives live here. nothing in the keeper works without these types.
// IDs, prices, coins, timestamps. each is a newtype so the compiler catches type mixups.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionId(pub u64);

impl PositionId {
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ordering is the byte ordering of the big-endian encoding, so ledger scans come back sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl AccountId {
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct{}", self.0)
    }
}

// 1.1: price of one unit of collateral in debt units. must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn new_unchecked(value: Decimal) -> Self {
        debug_assert!(value > Decimal::ZERO);
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.2: an amount of one denom. never negative. collateral, principal, fees and deposits all use this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    denom: String,
    amount: Decimal,
}

impl Coin {
    #[must_use]
    pub fn new(denom: impl Into<String>, amount: Decimal) -> Option<Self> {
        if amount < Decimal::ZERO {
            return None;
        }
        Some(Self {
            denom: denom.into(),
            amount,
        })
    }

    pub fn zero(denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: Decimal::ZERO,
        }
    }

    pub fn denom(&self) -> &str {
        &self.denom
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn same_denom(&self, other: &Coin) -> bool {
        self.denom == other.denom
    }

    // None when the denoms differ or the sum leaves Decimal's range
    #[must_use]
    pub fn checked_add(&self, other: &Coin) -> Option<Self> {
        if !self.same_denom(other) {
            return None;
        }
        Some(Self {
            denom: self.denom.clone(),
            amount: self.amount.checked_add(other.amount)?,
        })
    }

    // pins at Decimal::MAX instead of overflowing. only for amounts where more is never safer
    pub fn saturating_add(&self, other: &Coin) -> Self {
        debug_assert!(self.same_denom(other), "adding {} to {}", other, self);
        Self {
            denom: self.denom.clone(),
            amount: self.amount.saturating_add(other.amount),
        }
    }

    // None when the denoms differ or the result would go below zero
    #[must_use]
    pub fn checked_sub(&self, other: &Coin) -> Option<Self> {
        if !self.same_denom(other) || other.amount > self.amount {
            return None;
        }
        Some(Self {
            denom: self.denom.clone(),
            amount: self.amount - other.amount,
        })
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// 1.3: millisecond block timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn from_secs(secs: i64) -> Self {
        Self(secs * 1000)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    // whole seconds from self to later. zero if later is actually earlier
    pub fn elapsed_secs(&self, later: &Timestamp) -> u64 {
        if later.0 <= self.0 {
            return 0;
        }
        ((later.0 - self.0) / 1000) as u64
    }
}
