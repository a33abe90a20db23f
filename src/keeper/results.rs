// 8.0.2: errors for keeper operations. everything here is recoverable except Fatal/Halted.

use crate::custody::CustodyError;
use crate::deposit::LedgerError;
use crate::index::IndexError;
use crate::price_feed::PriceFeedError;
use crate::types::{AccountId, Coin, PositionId};
use rust_decimal::Decimal;
use std::fmt;

// why a collateral coin failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollateralRejection {
    UnknownType,
    DenomMismatch { expected: String },
    NonPositiveAmount,
    PricefeedDown(PriceFeedError),
}

impl fmt::Display for CollateralRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollateralRejection::UnknownType => write!(f, "collateral type not supported"),
            CollateralRejection::DenomMismatch { expected } => {
                write!(f, "denom does not match type, expected {}", expected)
            }
            CollateralRejection::NonPositiveAmount => write!(f, "amount must be positive"),
            CollateralRejection::PricefeedDown(e) => write!(f, "pricefeed down: {}", e),
        }
    }
}

/// Conditions that should be impossible once validation passed. The keeper stops
/// accepting operations after one of these; the host has to escalate, not retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FatalError {
    #[error("Releasing {amount} from position {position_id} to {depositor} failed after validation: {source}")]
    CustodyTransfer {
        position_id: PositionId,
        depositor: AccountId,
        amount: Coin,
        source: CustodyError,
    },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CdpError {
    #[error("Invalid collateral {amount} for type {collateral_type}: {reason}")]
    InvalidCollateral {
        collateral_type: String,
        amount: Coin,
        reason: CollateralRejection,
    },

    #[error("No position for owner {owner} with collateral type {collateral_type}")]
    PositionNotFound {
        owner: AccountId,
        collateral_type: String,
    },

    #[error("No deposit by {depositor} on position {position_id}")]
    DepositNotFound {
        position_id: PositionId,
        depositor: AccountId,
    },

    #[error("Insufficient funds: {account} has {available} spendable, deposit needs {requested}")]
    InsufficientFunds {
        account: AccountId,
        requested: Coin,
        available: Decimal,
    },

    #[error("Cannot withdraw {requested}, only {deposited} deposited")]
    InvalidWithdrawAmount { requested: Coin, deposited: Coin },

    #[error("Withdrawing {amount} from position {position_id} leaves ratio {ratio}, below liquidation ratio {liquidation_ratio}")]
    InvalidCollateralRatio {
        position_id: PositionId,
        amount: Coin,
        ratio: Decimal,
        liquidation_ratio: Decimal,
    },

    #[error("Amounts on {collateral_type} are out of range for {operation}")]
    Overflow {
        collateral_type: String,
        operation: &'static str,
    },

    #[error("Price unavailable: {0}")]
    Pricing(#[from] PriceFeedError),

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Position index error: {0}")]
    Index(#[from] IndexError),

    #[error("Deposit ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Fatal: {0}")]
    Fatal(FatalError),

    #[error("Keeper halted after fatal error: {0}")]
    Halted(FatalError),
}

impl CdpError {
    // fatal errors must be escalated by the host, never retried
    pub fn is_fatal(&self) -> bool {
        matches!(self, CdpError::Fatal(_) | CdpError::Halted(_))
    }
}
