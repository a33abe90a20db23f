//! Position storage and the collateral ratio index.
//!
//! Positions are owned outside the deposit core; the keeper reads them through
//! [`PositionStore`] and writes them back together with their new collateral-to-debt
//! ratio so liquidation scans can walk positions from riskiest to safest.

use crate::position::Position;
use crate::types::{AccountId, Coin, PositionId, Timestamp};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("Position {0} does not exist")]
    UnknownPosition(PositionId),

    #[error("Owner {owner} already has a {collateral_type} position")]
    AlreadyOpen {
        owner: AccountId,
        collateral_type: String,
    },

    #[error("Position {0} cannot change owner or collateral type")]
    KeyChanged(PositionId),

    #[error("Index update rejected: {0}")]
    Rejected(String),
}

pub trait PositionStore {
    fn get(&self, id: PositionId) -> Option<Position>;

    fn get_by_owner_and_type(&self, owner: AccountId, collateral_type: &str) -> Option<Position>;

    /// Persists the position and moves its index entry to `ratio`.
    fn update_position_and_ratio_index(
        &mut self,
        position: Position,
        ratio: Decimal,
    ) -> Result<(), IndexError>;
}

/// In-memory positions with an ordered `(type, ratio, id)` index.
#[derive(Debug, Default)]
pub struct MemPositionStore {
    positions: HashMap<PositionId, Position>,
    by_owner: HashMap<(AccountId, String), PositionId>,
    ratio_index: BTreeSet<(String, Decimal, PositionId)>,
    ratios: HashMap<PositionId, Decimal>,
    next_id: u64,
    fail_next_update: Option<String>,
}

impl MemPositionStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Opens an empty position. Borrowing and the initial collateral lock happen elsewhere;
    /// this only gives the deposit core something to point at.
    pub fn open_position(
        &mut self,
        owner: AccountId,
        collateral_type: &str,
        collateral_denom: &str,
        principal: Coin,
        timestamp: Timestamp,
    ) -> Result<PositionId, IndexError> {
        let key = (owner, collateral_type.to_string());
        if self.by_owner.contains_key(&key) {
            return Err(IndexError::AlreadyOpen {
                owner,
                collateral_type: collateral_type.to_string(),
            });
        }

        let id = PositionId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        let position = Position::new(
            id,
            owner,
            collateral_type,
            Coin::zero(collateral_denom),
            principal,
            timestamp,
        );
        // nothing locked yet, so it sorts first
        self.index(&position, Decimal::ZERO);
        self.by_owner.insert(key, id);
        self.positions.insert(id, position);
        Ok(id)
    }

    /// Positions of one type whose indexed ratio is strictly below `cutoff`, riskiest first.
    pub fn positions_below_ratio(&self, collateral_type: &str, cutoff: Decimal) -> Vec<PositionId> {
        let start = (collateral_type.to_string(), Decimal::MIN, PositionId(0));
        self.ratio_index
            .range(start..)
            .take_while(|(t, ratio, _)| t == collateral_type && *ratio < cutoff)
            .map(|(_, _, id)| *id)
            .collect()
    }

    pub fn indexed_ratio(&self, id: PositionId) -> Option<Decimal> {
        self.ratios.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn fail_next_update(&mut self, reason: &str) {
        self.fail_next_update = Some(reason.to_string());
    }

    fn index(&mut self, position: &Position, ratio: Decimal) {
        if let Some(old) = self.ratios.insert(position.id, ratio) {
            self.ratio_index
                .remove(&(position.collateral_type.clone(), old, position.id));
        }
        self.ratio_index
            .insert((position.collateral_type.clone(), ratio, position.id));
    }
}

impl PositionStore for MemPositionStore {
    fn get(&self, id: PositionId) -> Option<Position> {
        self.positions.get(&id).cloned()
    }

    fn get_by_owner_and_type(&self, owner: AccountId, collateral_type: &str) -> Option<Position> {
        self.by_owner
            .get(&(owner, collateral_type.to_string()))
            .and_then(|id| self.positions.get(id))
            .cloned()
    }

    fn update_position_and_ratio_index(
        &mut self,
        position: Position,
        ratio: Decimal,
    ) -> Result<(), IndexError> {
        if let Some(reason) = self.fail_next_update.take() {
            return Err(IndexError::Rejected(reason));
        }
        let existing = self
            .positions
            .get(&position.id)
            .ok_or(IndexError::UnknownPosition(position.id))?;
        if existing.owner != position.owner || existing.collateral_type != position.collateral_type {
            return Err(IndexError::KeyChanged(position.id));
        }

        self.index(&position, ratio);
        self.positions.insert(position.id, position);
        Ok(())
    }
}
