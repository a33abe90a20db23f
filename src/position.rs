// 3.0: a collateralized debt position. collateral locked against borrowed principal.
// the deposit ledger partitions `collateral` by depositor; this struct only holds the aggregate.

use crate::types::{AccountId, Coin, PositionId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub owner: AccountId,
    // collateral type tag, e.g. "bnb-a". one denom may back several types
    pub collateral_type: String,
    pub collateral: Coin,
    pub principal: Coin,
    pub accumulated_fees: Coin,
    pub fees_updated: Timestamp,
}

impl Position {
    pub fn new(
        id: PositionId,
        owner: AccountId,
        collateral_type: impl Into<String>,
        collateral: Coin,
        principal: Coin,
        timestamp: Timestamp,
    ) -> Self {
        let accumulated_fees = Coin::zero(principal.denom());
        Self {
            id,
            owner,
            collateral_type: collateral_type.into(),
            collateral,
            principal,
            accumulated_fees,
            fees_updated: timestamp,
        }
    }

    // 3.1: principal + fees. this is the debt the ratios are measured against; pinned at MAX, never wraps
    pub fn total_principal(&self) -> Coin {
        self.principal.saturating_add(&self.accumulated_fees)
    }

    pub fn has_debt(&self) -> bool {
        !self.total_principal().is_zero()
    }
}
