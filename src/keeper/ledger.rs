//! Deposit ledger queries exposed on the keeper.

use super::core::Keeper;
use super::results::CdpError;
use crate::deposit::Deposit;
use crate::store::KvStore;
use crate::types::{AccountId, PositionId};
use rust_decimal::Decimal;

impl<S: KvStore> Keeper<S> {
    /// The deposit `depositor` holds on `position_id`, if any.
    pub fn get_deposit(
        &self,
        position_id: PositionId,
        depositor: AccountId,
    ) -> Result<Option<Deposit>, CdpError> {
        Ok(self.deposits.get(position_id, depositor)?)
    }

    pub fn set_deposit(&mut self, deposit: &Deposit) -> Result<(), CdpError> {
        Ok(self.deposits.set(deposit)?)
    }

    pub fn delete_deposit(&mut self, position_id: PositionId, depositor: AccountId) {
        self.deposits.delete(position_id, depositor);
    }

    /// Walks a position's deposits in depositor order until `visit` returns `true`.
    pub fn iterate_deposits<F>(&self, position_id: PositionId, visit: F) -> Result<(), CdpError>
    where
        F: FnMut(&Deposit) -> bool,
    {
        Ok(self.deposits.iterate(position_id, visit)?)
    }

    pub fn get_deposits(&self, position_id: PositionId) -> Result<Vec<Deposit>, CdpError> {
        Ok(self.deposits.list(position_id)?)
    }

    // what the ledger says the position should hold in aggregate
    pub fn total_deposited(&self, position_id: PositionId) -> Result<Decimal, CdpError> {
        Ok(self.deposits.total(position_id)?)
    }
}
