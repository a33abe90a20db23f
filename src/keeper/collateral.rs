//! Collateral deposits and withdrawals.
//!
//! Both paths validate everything that can be rejected before custody moves. The only
//! state touched ahead of the checks is interest synchronization, which has to run first
//! because accrued fees feed the withdrawal ratio guard. Nothing is persisted until the
//! transfer succeeded.

use super::core::{Keeper, ModuleContext};
use super::results::{CdpError, CollateralRejection, FatalError};
use crate::deposit::Deposit;
use crate::events::{CollateralMovedEvent, EventPayload};
use crate::store::KvStore;
use crate::types::{AccountId, Coin};

impl<S: KvStore> Keeper<S> {
    /// Adds `collateral` from `depositor` to the `collateral_type` position owned by `owner`.
    /// Depositor and owner may differ; the contribution is tracked under the depositor.
    pub fn deposit_collateral(
        &mut self,
        ctx: &mut ModuleContext<'_>,
        owner: AccountId,
        depositor: AccountId,
        collateral: Coin,
        collateral_type: &str,
    ) -> Result<(), CdpError> {
        self.ensure_running()?;

        let param = self.validate_collateral(ctx, &collateral, collateral_type)?;
        let position = ctx
            .positions
            .get_by_owner_and_type(owner, collateral_type)
            .ok_or_else(|| CdpError::PositionNotFound {
                owner,
                collateral_type: collateral_type.to_string(),
            })?;
        self.validate_balance(ctx, &collateral, depositor)?;

        ctx.hooks.before_position_modified(&position);
        let mut position = ctx
            .interest
            .synchronize_interest(position, &param, ctx.block_time);

        let overflow = || CdpError::Overflow {
            collateral_type: collateral_type.to_string(),
            operation: "deposit",
        };
        let deposit = match self.deposits.get(position.id, depositor)? {
            Some(mut existing) => {
                existing.amount = existing.amount.checked_add(&collateral).ok_or_else(overflow)?;
                existing
            }
            None => Deposit::new(position.id, depositor, collateral.clone()),
        };
        let total_collateral = position.collateral.checked_add(&collateral).ok_or_else(overflow)?;
        let ratio = self.calculate_collateral_to_debt_ratio(
            &total_collateral,
            &position.collateral_type,
            &position.total_principal(),
        )?;

        ctx.bank.send_to_module(depositor, &collateral)?;

        self.deposits.set(&deposit)?;

        position.collateral = total_collateral;
        let position_id = position.id;
        ctx.positions.update_position_and_ratio_index(position, ratio)?;

        self.emit_event(
            ctx,
            EventPayload::CdpDeposit(CollateralMovedEvent {
                position_id,
                amount: collateral,
            }),
        );

        Ok(())
    }

    /// Returns `collateral` to `depositor` out of their own contribution to `owner`'s position,
    /// provided the position stays at or above its liquidation ratio.
    pub fn withdraw_collateral(
        &mut self,
        ctx: &mut ModuleContext<'_>,
        owner: AccountId,
        depositor: AccountId,
        collateral: Coin,
        collateral_type: &str,
    ) -> Result<(), CdpError> {
        self.ensure_running()?;

        let param = self.validate_collateral(ctx, &collateral, collateral_type)?;
        let position = ctx
            .positions
            .get_by_owner_and_type(owner, collateral_type)
            .ok_or_else(|| CdpError::PositionNotFound {
                owner,
                collateral_type: collateral_type.to_string(),
            })?;
        let mut deposit = self
            .deposits
            .get(position.id, depositor)?
            .ok_or(CdpError::DepositNotFound {
                position_id: position.id,
                depositor,
            })?;
        let remaining = deposit
            .amount
            .checked_sub(&collateral)
            .ok_or_else(|| CdpError::InvalidWithdrawAmount {
                requested: collateral.clone(),
                deposited: deposit.amount.clone(),
            })?;

        ctx.hooks.before_position_modified(&position);
        let mut position = ctx
            .interest
            .synchronize_interest(position, &param, ctx.block_time);

        // the deposit is part of the aggregate, so this only fails if the two drifted apart
        let projected = position
            .collateral
            .checked_sub(&collateral)
            .ok_or_else(|| CdpError::InvalidWithdrawAmount {
                requested: collateral.clone(),
                deposited: position.collateral.clone(),
            })?;

        let ratio = self.calculate_collateralization_ratio(
            ctx,
            &projected,
            &position.collateral_type,
            &position.principal,
            &position.accumulated_fees,
        )?;
        let liquidation_ratio = self
            .liquidation_ratio(&position.collateral_type)
            .ok_or_else(|| CdpError::InvalidCollateral {
                collateral_type: position.collateral_type.clone(),
                amount: collateral.clone(),
                reason: CollateralRejection::UnknownType,
            })?;
        if ratio < liquidation_ratio {
            return Err(CdpError::InvalidCollateralRatio {
                position_id: position.id,
                amount: collateral,
                ratio,
                liquidation_ratio,
            });
        }

        if let Err(source) = ctx.bank.send_from_module(depositor, &collateral) {
            return Err(self.halt(FatalError::CustodyTransfer {
                position_id: position.id,
                depositor,
                amount: collateral,
                source,
            }));
        }

        position.collateral = projected;
        let ratio = self.calculate_collateral_to_debt_ratio(
            &position.collateral,
            &position.collateral_type,
            &position.total_principal(),
        )?;

        let position_id = position.id;
        ctx.positions.update_position_and_ratio_index(position, ratio)?;

        if remaining.is_zero() {
            self.deposits.delete(position_id, depositor);
        } else {
            deposit.amount = remaining;
            self.deposits.set(&deposit)?;
        }

        self.emit_event(
            ctx,
            EventPayload::CdpWithdrawal(CollateralMovedEvent {
                position_id,
                amount: collateral,
            }),
        );

        Ok(())
    }
}
